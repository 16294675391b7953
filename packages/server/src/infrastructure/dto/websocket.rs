//! WebSocket wire format (frame codec).
//!
//! Inbound frames are JSON objects tagged by `type`:
//!
//! ```text
//! {"type": "message", "conversationId": "<id>", "content": "<text>"}
//! {"type": "typing",  "conversationId": "<id>"}
//! {"type": "read",    "conversationId": "<id>"}
//! ```
//!
//! Unknown fields are ignored. A missing or unknown `type` fails to decode.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::FrameDecodeError;

/// Inbound frame as received from a client
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum InboundFrame {
    Message {
        #[serde(rename = "conversationId")]
        conversation_id: String,
        content: String,
    },
    Typing {
        #[serde(rename = "conversationId")]
        conversation_id: String,
    },
    Read {
        #[serde(rename = "conversationId")]
        conversation_id: String,
    },
}

impl InboundFrame {
    /// Decode a text frame
    pub fn decode(text: &str) -> Result<Self, FrameDecodeError> {
        serde_json::from_str(text).map_err(|e| FrameDecodeError::Malformed(e.to_string()))
    }

    /// Decode a binary frame carrying UTF-8 JSON
    pub fn decode_bytes(bytes: &[u8]) -> Result<Self, FrameDecodeError> {
        let text = std::str::from_utf8(bytes).map_err(|_| FrameDecodeError::NotUtf8)?;
        Self::decode(text)
    }
}

/// Persisted message as sent to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDto {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Outbound event written to every live connection of a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutboundEvent {
    Message {
        message: MessageDto,
    },
    Typing {
        #[serde(rename = "userId")]
        user_id: String,
        ts: DateTime<Utc>,
    },
    Read {
        #[serde(rename = "userId")]
        user_id: String,
        #[serde(rename = "conversationId")]
        conversation_id: String,
        ts: DateTime<Utc>,
    },
}

impl OutboundEvent {
    /// Serialize once; the result is shared across all recipients.
    pub fn encode(&self) -> Result<Arc<str>, serde_json::Error> {
        serde_json::to_string(self).map(Arc::from)
    }
}
