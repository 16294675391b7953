//! Collaborator contracts consumed by the hub.
//!
//! The hub does not own persistence or authentication. It calls into these
//! narrow interfaces, and the infrastructure layer (or an external service)
//! provides the implementations (依存性の逆転).

use async_trait::async_trait;

use super::{
    entity::{Conversation, Message},
    error::{AuthError, MessagingError},
    value_object::{ConversationId, Page, UserId},
};

/// Messaging business logic consumed by the hub.
///
/// These are the only calls the hub makes into the persistence layer.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageUsecase: Send + Sync {
    /// Persist a new message authored by `sender_id`
    async fn send_message(
        &self,
        sender_id: &UserId,
        conversation_id: &ConversationId,
        content: &str,
    ) -> Result<Message, MessagingError>;

    /// Fetch the authoritative conversation record
    async fn get_conversation(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Conversation, MessagingError>;
}

/// Conversation management exposed over the HTTP API.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConversationService: Send + Sync {
    /// Create a conversation; the creator is always one of its participants
    async fn create_conversation(
        &self,
        creator: &UserId,
        participant_ids: Vec<UserId>,
    ) -> Result<Conversation, MessagingError>;

    /// Conversations `user_id` takes part in, most recently updated first
    async fn get_user_conversations(
        &self,
        user_id: &UserId,
        page: Page,
    ) -> Result<Vec<Conversation>, MessagingError>;

    /// Messages of a conversation, newest first
    ///
    /// Only participants may read them (`Forbidden` otherwise).
    async fn get_messages(
        &self,
        user_id: &UserId,
        conversation_id: &ConversationId,
        page: Page,
    ) -> Result<Vec<Message>, MessagingError>;
}

/// Credentials carried by a connecting request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// Bearer token from the `Authorization` header or the `token` query parameter
    pub token: Option<String>,
}

impl Credentials {
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }
}

/// Resolves a connecting request to a user identity.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, credentials: &Credentials) -> Result<UserId, AuthError>;
}
