//! Domain entities.

use chrono::{DateTime, Utc};

use super::value_object::{ConversationId, UserId};

/// A persisted chat message.
///
/// Created by the messaging collaborator; the hub never mutates or deletes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: String,
    pub conversation_id: ConversationId,
    pub sender_id: UserId,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// A conversation and its participants, as owned by the messaging collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    pub id: ConversationId,
    pub participant_ids: Vec<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    pub fn has_participant(&self, user_id: &UserId) -> bool {
        self.participant_ids.iter().any(|id| id == user_id)
    }
}

/// A decoded inbound frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Chat message to be persisted and fanned out
    Message {
        conversation_id: ConversationId,
        content: String,
    },
    /// Transient "user is typing" signal
    Typing { conversation_id: ConversationId },
    /// Transient "user has read the conversation" signal
    Read { conversation_id: ConversationId },
}

/// Discriminant of [`Frame`], used for logging and dispatch outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Message,
    Typing,
    Read,
}

impl Frame {
    pub fn kind(&self) -> FrameKind {
        match self {
            Frame::Message { .. } => FrameKind::Message,
            Frame::Typing { .. } => FrameKind::Typing,
            Frame::Read { .. } => FrameKind::Read,
        }
    }

    pub fn conversation_id(&self) -> &ConversationId {
        match self {
            Frame::Message {
                conversation_id, ..
            }
            | Frame::Typing { conversation_id }
            | Frame::Read { conversation_id } => conversation_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversation_has_participant() {
        // テスト項目: 参加者に含まれるユーザーのみ true になる
        // given (前提条件):
        let now = Utc::now();
        let conversation = Conversation {
            id: ConversationId::try_from("c1").unwrap(),
            participant_ids: vec![
                UserId::try_from("alice").unwrap(),
                UserId::try_from("bob").unwrap(),
            ],
            created_at: now,
            updated_at: now,
        };

        // when (操作):
        let alice = conversation.has_participant(&UserId::try_from("alice").unwrap());
        let mallory = conversation.has_participant(&UserId::try_from("mallory").unwrap());

        // then (期待する結果):
        assert!(alice);
        assert!(!mallory);
    }

    #[test]
    fn test_frame_kind_and_conversation_id() {
        // テスト項目: Frame から種別と会話 ID が取り出せる
        // given (前提条件):
        let conversation_id = ConversationId::try_from("c1").unwrap();
        let frame = Frame::Typing {
            conversation_id: conversation_id.clone(),
        };

        // when (操作):
        let kind = frame.kind();

        // then (期待する結果):
        assert_eq!(kind, FrameKind::Typing);
        assert_eq!(frame.conversation_id(), &conversation_id);
    }
}
