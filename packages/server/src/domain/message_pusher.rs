//! MessagePusher trait 定義
//!
//! 接続中のクライアントへのメッセージ通知のインターフェース。
//! UseCase 層はこの trait に依存し、WebSocket などの具体的な実装には依存しない。

use std::sync::Arc;

use async_trait::async_trait;

use super::{
    connection::ConnectionHandle,
    value_object::{ConnectionId, ConversationId, UserId},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// 接続をユーザーに紐付けて登録
    async fn register_connection(&self, user_id: UserId, handle: ConnectionHandle);

    /// 接続の登録を解除
    ///
    /// 登録済みの接続を実際に削除した場合のみ `true` を返す。
    async fn unregister_connection(&self, user_id: &UserId, connection_id: &ConnectionId)
    -> bool;

    /// ユーザーの接続数を取得
    async fn connection_count_of(&self, user_id: &UserId) -> usize;

    /// 会話の全参加者の全接続にブロードキャストし、書き込めた接続数を返す
    ///
    /// 個々の接続への書き込み失敗は呼び出し元に伝搬しない。
    async fn broadcast(
        &self,
        conversation_id: &ConversationId,
        requester: &UserId,
        content: Arc<str>,
    ) -> usize;
}
