//! Shared application state.

use std::sync::Arc;

use confab_shared::time::Clock;
use tokio_util::{sync::CancellationToken, task::TaskTracker};

use crate::{
    domain::{Authenticator, ConversationService, MessagePusher, MessageUsecase},
    infrastructure::{
        message_pusher::WebSocketMessagePusher,
        registry::{ConnectionRegistry, MembershipCache},
    },
    usecase::{
        ConnectParticipantUseCase, CreateConversationUseCase, DisconnectParticipantUseCase,
        FrameDispatcher, GetConversationsUseCase, GetMessagesUseCase, GetPresenceUseCase,
        NotifyActivityUseCase, SendMessageUseCase,
    },
};

use super::config::HubConfig;

/// Shared application state
///
/// UseCase 層を経由してビジネスロジックを実行する。
pub struct AppState {
    pub config: HubConfig,
    pub authenticator: Arc<dyn Authenticator>,
    pub registry: Arc<ConnectionRegistry>,
    pub membership: Arc<MembershipCache>,
    pub connect_participant_usecase: Arc<ConnectParticipantUseCase>,
    pub disconnect_participant_usecase: Arc<DisconnectParticipantUseCase>,
    pub frame_dispatcher: Arc<FrameDispatcher>,
    pub get_presence_usecase: Arc<GetPresenceUseCase>,
    pub create_conversation_usecase: Arc<CreateConversationUseCase>,
    pub get_conversations_usecase: Arc<GetConversationsUseCase>,
    pub get_messages_usecase: Arc<GetMessagesUseCase>,
    /// 全接続のキャンセルトークンの親
    pub shutdown: CancellationToken,
    /// 接続ごとのタスク（読み込み・書き込み・ハートビート）
    pub tracker: TaskTracker,
}

impl AppState {
    /// Wire the hub in dependency order:
    ///
    /// 1. Connection Registry / Membership Cache
    /// 2. MessagePusher (WebSocket implementation)
    /// 3. UseCases
    pub fn new(
        config: HubConfig,
        authenticator: Arc<dyn Authenticator>,
        messaging: Arc<dyn MessageUsecase>,
        conversations: Arc<dyn ConversationService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        // 1. Registry and cache
        let registry = Arc::new(ConnectionRegistry::new());
        let membership = Arc::new(MembershipCache::with_ttl(
            messaging.clone(),
            config.membership_ttl,
        ));

        // 2. MessagePusher
        let message_pusher: Arc<dyn MessagePusher> = Arc::new(WebSocketMessagePusher::new(
            registry.clone(),
            membership.clone(),
            config.write_timeout,
        ));

        // 3. UseCases
        let connect_participant_usecase = Arc::new(ConnectParticipantUseCase::new(
            message_pusher.clone(),
            clock.clone(),
        ));
        let disconnect_participant_usecase =
            Arc::new(DisconnectParticipantUseCase::new(message_pusher.clone()));
        let send_message_usecase = Arc::new(SendMessageUseCase::new(
            messaging,
            message_pusher.clone(),
        ));
        let notify_activity_usecase =
            Arc::new(NotifyActivityUseCase::new(message_pusher.clone(), clock));
        let frame_dispatcher = Arc::new(FrameDispatcher::new(
            send_message_usecase,
            notify_activity_usecase,
        ));
        let get_presence_usecase = Arc::new(GetPresenceUseCase::new(message_pusher));
        let create_conversation_usecase =
            Arc::new(CreateConversationUseCase::new(conversations.clone()));
        let get_conversations_usecase =
            Arc::new(GetConversationsUseCase::new(conversations.clone()));
        let get_messages_usecase = Arc::new(GetMessagesUseCase::new(conversations));

        Self {
            config,
            authenticator,
            registry,
            membership,
            connect_participant_usecase,
            disconnect_participant_usecase,
            frame_dispatcher,
            get_presence_usecase,
            create_conversation_usecase,
            get_conversations_usecase,
            get_messages_usecase,
            shutdown: CancellationToken::new(),
            tracker: TaskTracker::new(),
        }
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}
