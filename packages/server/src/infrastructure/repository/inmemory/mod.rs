//! InMemory implementations.

pub mod messaging;
pub mod seed;

pub use messaging::InMemoryMessagingService;
pub use seed::{ConversationSeed, SeedError};
