//! Collaborator implementations backing the hub.

pub mod inmemory;

pub use inmemory::{ConversationSeed, InMemoryMessagingService, SeedError};
