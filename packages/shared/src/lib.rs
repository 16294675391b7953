//! Shared utilities for the Confab workspace.

pub mod logger;
pub mod time;
