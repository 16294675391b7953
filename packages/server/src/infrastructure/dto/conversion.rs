//! Conversion logic between DTOs and domain entities.

use crate::domain::{Conversation, ConversationId, Frame, FrameDecodeError, Message, Page};
use crate::infrastructure::dto::{http, websocket as dto};

// ========================================
// DTO → Domain Entity
// ========================================

impl TryFrom<dto::InboundFrame> for Frame {
    type Error = FrameDecodeError;

    fn try_from(frame: dto::InboundFrame) -> Result<Self, Self::Error> {
        let frame = match frame {
            dto::InboundFrame::Message {
                conversation_id,
                content,
            } => Frame::Message {
                conversation_id: ConversationId::new(conversation_id)?,
                content,
            },
            dto::InboundFrame::Typing { conversation_id } => Frame::Typing {
                conversation_id: ConversationId::new(conversation_id)?,
            },
            dto::InboundFrame::Read { conversation_id } => Frame::Read {
                conversation_id: ConversationId::new(conversation_id)?,
            },
        };
        Ok(frame)
    }
}

impl From<http::PageQuery> for Page {
    fn from(query: http::PageQuery) -> Self {
        let parse = |value: Option<String>| value.and_then(|v| v.trim().parse::<i64>().ok());
        Page::new(parse(query.limit), parse(query.offset))
    }
}

// ========================================
// Domain Entity → DTO
// ========================================

impl From<Conversation> for http::ConversationDto {
    fn from(model: Conversation) -> Self {
        Self {
            id: model.id.into_string(),
            participant_ids: model
                .participant_ids
                .into_iter()
                .map(|id| id.into_string())
                .collect(),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<Message> for dto::MessageDto {
    fn from(model: Message) -> Self {
        Self {
            id: model.id,
            conversation_id: model.conversation_id.into_string(),
            sender_id: model.sender_id.into_string(),
            content: model.content,
            created_at: model.created_at,
        }
    }
}
