//! UseCase: ユーザーの接続状況の取得

use std::sync::Arc;

use crate::domain::{MessagePusher, UserId};

/// 接続状況
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presence {
    pub user_id: UserId,
    pub connections: usize,
}

impl Presence {
    pub fn is_online(&self) -> bool {
        self.connections > 0
    }
}

pub struct GetPresenceUseCase {
    message_pusher: Arc<dyn MessagePusher>,
}

impl GetPresenceUseCase {
    pub fn new(message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self { message_pusher }
    }

    pub async fn execute(&self, user_id: UserId) -> Presence {
        let connections = self.message_pusher.connection_count_of(&user_id).await;
        Presence {
            user_id,
            connections,
        }
    }
}
