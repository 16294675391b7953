//! UseCase: メッセージ送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - 永続化 → `message` イベントのブロードキャスト
//!
//! ### なぜこのテストが必要か
//! - 1 フレームにつき永続化は 1 回、ブロードキャストは永続化済みメッセージを包むこと
//! - 永続化に失敗した場合はブロードキャストしないこと
//!
//! ### どのような状況を想定しているか
//! - 正常系：メッセージの永続化とブロードキャスト
//! - 異常系：永続化の失敗（非参加者、空の本文など）

use std::sync::Arc;

use crate::{
    domain::{ConversationId, Message, MessagePusher, MessageUsecase, UserId},
    infrastructure::dto::websocket::OutboundEvent,
};

use super::error::SendMessageError;

/// 送信結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    /// 永続化されたメッセージ
    pub message: Message,
    /// 書き込めた接続数
    pub delivered: usize,
}

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    /// メッセージの永続化を担う外部コラボレータ
    messaging: Arc<dyn MessageUsecase>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl SendMessageUseCase {
    pub fn new(messaging: Arc<dyn MessageUsecase>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            messaging,
            message_pusher,
        }
    }

    /// メッセージ送信を実行
    ///
    /// # Arguments
    ///
    /// * `sender_id` - 送信者（接続のユーザー）
    /// * `conversation_id` - 宛先の会話
    /// * `content` - メッセージ本文
    ///
    /// # Returns
    ///
    /// * `Ok(SentMessage)` - 永続化済みメッセージと配信数
    /// * `Err(SendMessageError)` - 永続化失敗（ブロードキャストは行われない）
    pub async fn execute(
        &self,
        sender_id: &UserId,
        conversation_id: &ConversationId,
        content: &str,
    ) -> Result<SentMessage, SendMessageError> {
        // 1. コラボレータ経由でメッセージを永続化
        let message = self
            .messaging
            .send_message(sender_id, conversation_id, content)
            .await?;

        // 2. 永続化済みメッセージを包んだイベントを一度だけシリアライズ
        let event = OutboundEvent::Message {
            message: message.clone().into(),
        };
        let payload = event
            .encode()
            .map_err(|e| SendMessageError::Encode(e.to_string()))?;

        // 3. 会話の全参加者にブロードキャスト（参加者リストは必要に応じて遅延ロード）
        let delivered = self
            .message_pusher
            .broadcast(conversation_id, sender_id, payload)
            .await;

        Ok(SentMessage { message, delivered })
    }
}
