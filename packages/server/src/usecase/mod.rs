//! UseCase 層
//!
//! フレーム駆動・HTTP API のアプリケーションロジック。ドメイン層の trait
//! （`MessageUsecase`, `ConversationService`, `MessagePusher`）にのみ依存する。

mod connect_participant;
mod create_conversation;
mod disconnect_participant;
mod dispatch_frame;
mod error;
mod get_conversations;
mod get_messages;
mod get_presence;
mod notify_activity;
mod send_message;

pub use connect_participant::ConnectParticipantUseCase;
pub use create_conversation::CreateConversationUseCase;
pub use disconnect_participant::DisconnectParticipantUseCase;
pub use dispatch_frame::{DispatchOutcome, FrameDispatcher};
pub use error::{NotifyError, SendMessageError};
pub use get_conversations::GetConversationsUseCase;
pub use get_messages::GetMessagesUseCase;
pub use get_presence::{GetPresenceUseCase, Presence};
pub use notify_activity::NotifyActivityUseCase;
pub use send_message::{SendMessageUseCase, SentMessage};
