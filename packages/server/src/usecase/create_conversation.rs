//! UseCase: 会話の作成
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - CreateConversationUseCase::execute() メソッド
//!
//! ### なぜこのテストが必要か
//! - 作成者の追加はコラボレータの責務であり、ユースケースは参加者リストをそのまま渡すこと
//! - コラボレータのエラーがそのまま呼び出し元に返ること

use std::sync::Arc;

use crate::domain::{Conversation, ConversationService, MessagingError, UserId};

/// 会話作成のユースケース
pub struct CreateConversationUseCase {
    conversations: Arc<dyn ConversationService>,
}

impl CreateConversationUseCase {
    pub fn new(conversations: Arc<dyn ConversationService>) -> Self {
        Self { conversations }
    }

    /// `creator` が作成者となる会話を作成する
    ///
    /// # Arguments
    ///
    /// * `creator` - リクエストしたユーザー（必ず参加者に含まれる）
    /// * `participant_ids` - 作成者以外の参加者
    pub async fn execute(
        &self,
        creator: &UserId,
        participant_ids: Vec<UserId>,
    ) -> Result<Conversation, MessagingError> {
        let conversation = self
            .conversations
            .create_conversation(creator, participant_ids)
            .await?;
        tracing::info!(
            conversation_id = %conversation.id,
            creator = %creator,
            participants = conversation.participant_ids.len(),
            "Conversation created"
        );
        Ok(conversation)
    }
}
