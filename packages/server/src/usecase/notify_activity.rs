//! UseCase: typing / read の一時的な通知
//!
//! どちらも永続化は行わず、サーバーで付与した時刻とともに会話の参加者へ
//! ブロードキャストするだけ。

use std::sync::Arc;

use confab_shared::time::Clock;

use crate::{
    domain::{ConversationId, MessagePusher, UserId},
    infrastructure::dto::websocket::OutboundEvent,
};

use super::error::NotifyError;

pub struct NotifyActivityUseCase {
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl NotifyActivityUseCase {
    pub fn new(message_pusher: Arc<dyn MessagePusher>, clock: Arc<dyn Clock>) -> Self {
        Self {
            message_pusher,
            clock,
        }
    }

    /// `{"type":"typing","userId":..,"ts":..}` をブロードキャスト
    pub async fn typing(
        &self,
        sender_id: &UserId,
        conversation_id: &ConversationId,
    ) -> Result<usize, NotifyError> {
        let event = OutboundEvent::Typing {
            user_id: sender_id.to_string(),
            ts: self.clock.now(),
        };
        self.broadcast(conversation_id, sender_id, &event).await
    }

    /// `{"type":"read","userId":..,"conversationId":..,"ts":..}` をブロードキャスト
    pub async fn read(
        &self,
        sender_id: &UserId,
        conversation_id: &ConversationId,
    ) -> Result<usize, NotifyError> {
        let event = OutboundEvent::Read {
            user_id: sender_id.to_string(),
            conversation_id: conversation_id.to_string(),
            ts: self.clock.now(),
        };
        self.broadcast(conversation_id, sender_id, &event).await
    }

    async fn broadcast(
        &self,
        conversation_id: &ConversationId,
        sender_id: &UserId,
        event: &OutboundEvent,
    ) -> Result<usize, NotifyError> {
        let payload = event
            .encode()
            .map_err(|e| NotifyError::Encode(e.to_string()))?;
        Ok(self
            .message_pusher
            .broadcast(conversation_id, sender_id, payload)
            .await)
    }
}
