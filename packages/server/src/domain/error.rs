//! Domain errors.

use thiserror::Error;

/// Value object construction errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("user id must not be empty")]
    EmptyUserId,
    #[error("conversation id must not be empty")]
    EmptyConversationId,
}

/// Errors returned by the messaging collaborator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagingError {
    #[error("conversation '{0}' not found")]
    ConversationNotFound(String),
    #[error("forbidden")]
    Forbidden,
    #[error("message content cannot be empty")]
    EmptyContent,
    #[error("messaging backend unavailable: {0}")]
    Unavailable(String),
}

/// Handshake failures: no user identity could be resolved
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("missing credentials")]
    MissingCredentials,
    #[error("invalid token")]
    InvalidToken,
}

/// Inbound frame decode failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameDecodeError {
    #[error("malformed frame: {0}")]
    Malformed(String),
    #[error("binary frame is not valid UTF-8")]
    NotUtf8,
    #[error("invalid frame field: {0}")]
    InvalidField(#[from] ValueObjectError),
}

/// Errors when pushing a frame to a single connection
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("connection '{0}' is closed")]
    ConnectionClosed(String),
    #[error("write to connection '{0}' timed out")]
    WriteTimeout(String),
}
