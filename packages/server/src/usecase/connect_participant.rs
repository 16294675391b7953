//! UseCase: 接続の登録処理
//!
//! 認証済みユーザーの接続を Connection Registry に登録する。
//! 同一ユーザーの複数接続（複数端末・複数タブ）を許容するため、重複チェックは行わない。

use std::sync::Arc;

use chrono::{DateTime, Utc};
use confab_shared::time::Clock;

use crate::domain::{ConnectionHandle, MessagePusher, UserId};

/// 接続登録のユースケース
pub struct ConnectParticipantUseCase {
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl ConnectParticipantUseCase {
    pub fn new(message_pusher: Arc<dyn MessagePusher>, clock: Arc<dyn Clock>) -> Self {
        Self {
            message_pusher,
            clock,
        }
    }

    /// 接続を登録し、接続時刻を返す
    pub async fn execute(&self, user_id: UserId, handle: ConnectionHandle) -> DateTime<Utc> {
        let connected_at = self.clock.now();
        self.message_pusher
            .register_connection(user_id, handle)
            .await;
        connected_at
    }
}
