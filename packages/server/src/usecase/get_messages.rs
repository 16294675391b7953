//! UseCase: 会話のメッセージ履歴の取得
//!
//! 参加者のみが履歴を閲覧できる。判定はコラボレータが行い、
//! 参加者でない場合は `MessagingError::Forbidden` が返る。

use std::sync::Arc;

use crate::domain::{ConversationId, ConversationService, Message, MessagingError, Page, UserId};

pub struct GetMessagesUseCase {
    conversations: Arc<dyn ConversationService>,
}

impl GetMessagesUseCase {
    pub fn new(conversations: Arc<dyn ConversationService>) -> Self {
        Self { conversations }
    }

    /// 新しい順に `page` の範囲のメッセージを返す
    pub async fn execute(
        &self,
        user_id: &UserId,
        conversation_id: &ConversationId,
        page: Page,
    ) -> Result<Vec<Message>, MessagingError> {
        let result = self
            .conversations
            .get_messages(user_id, conversation_id, page)
            .await;
        if let Err(MessagingError::Forbidden) = &result {
            tracing::warn!(
                user_id = %user_id,
                conversation_id = %conversation_id,
                "Non-participant requested message history"
            );
        }
        result
    }
}
