//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::MessagingError;

/// メッセージ送信の失敗
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendMessageError {
    #[error("failed to persist message: {0}")]
    Persistence(#[from] MessagingError),
    #[error("failed to encode message event: {0}")]
    Encode(String),
}

/// typing / read 通知の失敗
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotifyError {
    #[error("failed to encode activity event: {0}")]
    Encode(String),
}
