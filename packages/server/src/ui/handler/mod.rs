//! Request handlers.

pub mod auth;
pub mod http;
pub mod websocket;

pub use auth::AuthenticatedUser;
pub use http::{create_conversation, get_conversations, get_messages, get_presence, health_check};
pub use websocket::{CloseReason, websocket_handler};
