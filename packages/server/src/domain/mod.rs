//! Domain layer of the messaging hub.
//!
//! Value objects, entities and the interfaces (traits) the hub depends on.
//! Concrete implementations live in the infrastructure layer.

pub mod collaborator;
pub mod connection;
pub mod entity;
pub mod error;
pub mod message_pusher;
pub mod value_object;

pub use collaborator::{Authenticator, ConversationService, Credentials, MessageUsecase};
pub use connection::{ConnectionHandle, PushFrame, PusherChannel};
pub use entity::{Conversation, Frame, FrameKind, Message};
pub use error::{AuthError, FrameDecodeError, MessagePushError, MessagingError, ValueObjectError};
pub use message_pusher::MessagePusher;
pub use value_object::{ConnectionId, ConversationId, Page, UserId};

#[cfg(test)]
pub use collaborator::{MockAuthenticator, MockConversationService, MockMessageUsecase};
#[cfg(test)]
pub use message_pusher::MockMessagePusher;
