//! UseCase: 受信フレームの振り分け
//!
//! 読み込みループから受け取った 1 フレームをデコードし、種別ごとのユースケースへ渡す。
//! デコードに失敗したフレームや永続化に失敗したフレームは破棄し、接続は維持する。
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - FrameDispatcher::dispatch_text() / dispatch_binary() メソッド
//!
//! ### なぜこのテストが必要か
//! - 不正なフレームで永続化やブロードキャストが起きないこと
//! - 1 つの message フレームにつき永続化 1 回、ブロードキャスト 1 回であること
//!
//! ### どのような状況を想定しているか
//! - 正常系：message / typing / read フレーム
//! - 異常系：JSON として不正、UTF-8 でないバイナリ、空の会話 ID、永続化の失敗

use std::sync::Arc;

use crate::{
    domain::{Frame, FrameDecodeError, FrameKind, UserId},
    infrastructure::dto::websocket::InboundFrame,
};

use super::{notify_activity::NotifyActivityUseCase, send_message::SendMessageUseCase};

/// 1 フレームの処理結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// ブロードキャストまで完了した
    Broadcast { kind: FrameKind, delivered: usize },
    /// デコードできず破棄した
    Discarded(FrameDecodeError),
    /// デコードはできたが処理に失敗した
    Dropped { kind: FrameKind, reason: String },
}

pub struct FrameDispatcher {
    send_message: Arc<SendMessageUseCase>,
    notify_activity: Arc<NotifyActivityUseCase>,
}

impl FrameDispatcher {
    pub fn new(
        send_message: Arc<SendMessageUseCase>,
        notify_activity: Arc<NotifyActivityUseCase>,
    ) -> Self {
        Self {
            send_message,
            notify_activity,
        }
    }

    /// テキストフレームを処理
    pub async fn dispatch_text(&self, sender_id: &UserId, text: &str) -> DispatchOutcome {
        let decoded = InboundFrame::decode(text).and_then(Frame::try_from);
        self.dispatch_decoded(sender_id, decoded).await
    }

    /// バイナリフレーム（UTF-8 の JSON）を処理
    pub async fn dispatch_binary(&self, sender_id: &UserId, bytes: &[u8]) -> DispatchOutcome {
        let decoded = InboundFrame::decode_bytes(bytes).and_then(Frame::try_from);
        self.dispatch_decoded(sender_id, decoded).await
    }

    async fn dispatch_decoded(
        &self,
        sender_id: &UserId,
        decoded: Result<Frame, FrameDecodeError>,
    ) -> DispatchOutcome {
        match decoded {
            Ok(frame) => self.dispatch(sender_id, frame).await,
            Err(e) => {
                tracing::debug!(user_id = %sender_id, error = %e, "discarding undecodable frame");
                DispatchOutcome::Discarded(e)
            }
        }
    }

    /// デコード済みフレームを種別ごとに処理
    pub async fn dispatch(&self, sender_id: &UserId, frame: Frame) -> DispatchOutcome {
        let kind = frame.kind();
        let result = match &frame {
            Frame::Message {
                conversation_id,
                content,
            } => self
                .send_message
                .execute(sender_id, conversation_id, content)
                .await
                .map(|sent| sent.delivered)
                .map_err(|e| e.to_string()),
            Frame::Typing { conversation_id } => self
                .notify_activity
                .typing(sender_id, conversation_id)
                .await
                .map_err(|e| e.to_string()),
            Frame::Read { conversation_id } => self
                .notify_activity
                .read(sender_id, conversation_id)
                .await
                .map_err(|e| e.to_string()),
        };

        match result {
            Ok(delivered) => {
                tracing::debug!(
                    user_id = %sender_id,
                    conversation_id = %frame.conversation_id(),
                    kind = ?kind,
                    delivered,
                    "frame dispatched"
                );
                DispatchOutcome::Broadcast { kind, delivered }
            }
            Err(reason) => {
                tracing::warn!(
                    user_id = %sender_id,
                    conversation_id = %frame.conversation_id(),
                    kind = ?kind,
                    error = %reason,
                    "dropping frame"
                );
                DispatchOutcome::Dropped { kind, reason }
            }
        }
    }
}
