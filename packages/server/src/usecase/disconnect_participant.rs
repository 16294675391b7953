//! UseCase: 接続の切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectParticipantUseCase::execute() メソッド
//!
//! ### なぜこのテストが必要か
//! - 読み込みループの後始末と外部からの切断要求が重なっても、
//!   Registry からの削除が一度だけ行われることを保証する
//!
//! ### どのような状況を想定しているか
//! - 正常系：登録済み接続の切断
//! - エッジケース：同じ接続に対する二重の切断

use std::sync::Arc;

use crate::domain::{ConnectionHandle, MessagePusher, UserId};

/// 接続切断のユースケース
pub struct DisconnectParticipantUseCase {
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl DisconnectParticipantUseCase {
    pub fn new(message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self { message_pusher }
    }

    /// 接続を閉じて登録を解除する
    ///
    /// # Returns
    ///
    /// * `true` - この呼び出しで登録を解除した
    /// * `false` - 既に解除済み（または未登録）
    pub async fn execute(&self, user_id: &UserId, handle: &ConnectionHandle) -> bool {
        // 1. 接続に紐づく全タスク（read / writer / heartbeat）を停止
        handle.close();

        // 2. Registry から削除
        self.message_pusher
            .unregister_connection(user_id, &handle.id())
            .await
    }

    /// ユーザーの残りの接続数を取得
    pub async fn count_remaining_connections(&self, user_id: &UserId) -> usize {
        self.message_pusher.connection_count_of(user_id).await
    }
}
