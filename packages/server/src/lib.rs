//! Confab messaging hub library.
//!
//! Real-time fan-out of conversation events over WebSocket: connection
//! registry, lazily loaded conversation membership, per-connection frame
//! dispatch and heartbeat, plus a small authenticated HTTP API for
//! conversations and message history.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
