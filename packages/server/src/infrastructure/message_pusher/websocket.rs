//! WebSocket を使った MessagePusher 実装（Broadcast Fan-out）
//!
//! ## 責務
//!
//! - 接続ハンドルを Connection Registry に登録・解除
//! - 会話の参加者を Membership Cache から解決し、各参加者の全接続へ送信
//!
//! ## 設計ノート
//!
//! WebSocket の生成と書き込みは UI 層（`ui/handler/websocket.rs`）の writer
//! タスクが担当します。この実装は各接続の送信キューに積むだけで、1 接続あたり
//! `write_timeout` を超えて待つことはありません。ある受信者への送信失敗は他の
//! 受信者への配信にも送信者にも影響しません。

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use futures_util::future::join_all;

use crate::{
    domain::{
        ConnectionHandle, ConnectionId, ConversationId, MessagePusher, PushFrame, UserId,
    },
    infrastructure::registry::{ConnectionRegistry, MembershipCache},
};

pub struct WebSocketMessagePusher {
    registry: Arc<ConnectionRegistry>,
    membership: Arc<MembershipCache>,
    write_timeout: Duration,
}

impl WebSocketMessagePusher {
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        membership: Arc<MembershipCache>,
        write_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            membership,
            write_timeout,
        }
    }

    /// Push `content` to every handle concurrently; returns the number of successful writes.
    async fn deliver(&self, targets: Vec<(UserId, ConnectionHandle)>, content: Arc<str>) -> usize {
        let writes = targets.into_iter().map(|(user_id, handle)| {
            let frame = PushFrame::Text(content.clone());
            async move {
                match handle.push(frame, self.write_timeout).await {
                    Ok(()) => true,
                    Err(e) => {
                        tracing::warn!(
                            user_id = %user_id,
                            connection_id = %handle.id(),
                            error = %e,
                            "Failed to push message to connection"
                        );
                        false
                    }
                }
            }
        });

        join_all(writes).await.into_iter().filter(|ok| *ok).count()
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_connection(&self, user_id: UserId, handle: ConnectionHandle) {
        let connection_id = handle.id();
        if !self.registry.register(user_id.clone(), handle) {
            return;
        }
        tracing::debug!(
            user_id = %user_id,
            connection_id = %connection_id,
            "Connection registered to MessagePusher"
        );
    }

    async fn unregister_connection(&self, user_id: &UserId, connection_id: &ConnectionId) -> bool {
        let removed = self.registry.unregister(user_id, connection_id);
        if removed {
            tracing::debug!(
                user_id = %user_id,
                connection_id = %connection_id,
                "Connection unregistered from MessagePusher"
            );
        }
        removed
    }

    async fn connection_count_of(&self, user_id: &UserId) -> usize {
        self.registry.connection_count_of(user_id)
    }

    async fn broadcast(
        &self,
        conversation_id: &ConversationId,
        requester: &UserId,
        content: Arc<str>,
    ) -> usize {
        let participants = self
            .membership
            .participants_of(conversation_id, requester)
            .await;

        // 参加者ごとの接続のスナップショットを取得（以降に接続したものには届かない）
        let targets: Vec<(UserId, ConnectionHandle)> = participants
            .iter()
            .flat_map(|user_id| {
                self.registry
                    .connections_of(user_id)
                    .into_iter()
                    .map(move |handle| (user_id.clone(), handle))
            })
            .collect();

        let attempted = targets.len();
        let delivered = self.deliver(targets, content).await;
        tracing::debug!(
            conversation_id = %conversation_id,
            participants = participants.len(),
            attempted,
            delivered,
            "Broadcasted to conversation"
        );
        delivered
    }
}
