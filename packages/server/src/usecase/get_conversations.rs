//! UseCase: ユーザーが参加している会話の一覧取得

use std::sync::Arc;

use crate::domain::{Conversation, ConversationService, MessagingError, Page, UserId};

pub struct GetConversationsUseCase {
    conversations: Arc<dyn ConversationService>,
}

impl GetConversationsUseCase {
    pub fn new(conversations: Arc<dyn ConversationService>) -> Self {
        Self { conversations }
    }

    /// 更新日時の新しい順に `page` の範囲を返す
    pub async fn execute(
        &self,
        user_id: &UserId,
        page: Page,
    ) -> Result<Vec<Conversation>, MessagingError> {
        self.conversations.get_user_conversations(user_id, page).await
    }
}
