//! Value objects: identifiers used throughout the hub.

use std::fmt;

use uuid::Uuid;

use super::error::ValueObjectError;

/// Opaque user identifier, stable for the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(String);

impl UserId {
    /// Create a new UserId. Blank identifiers are rejected.
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.trim().is_empty() {
            return Err(ValueObjectError::EmptyUserId);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for UserId {
    type Error = ValueObjectError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value.to_string())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque conversation identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConversationId(String);

impl ConversationId {
    /// Create a new ConversationId. Blank identifiers are rejected.
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.trim().is_empty() {
            return Err(ValueObjectError::EmptyConversationId);
        }
        Ok(Self(value))
    }

    /// Generate a fresh random identifier (UUID v4)
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for ConversationId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for ConversationId {
    type Error = ValueObjectError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value.to_string())
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Server-assigned identifier of one live connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Generate a fresh random identifier (UUID v4)
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A window into a listing: skip `offset` items, return at most `limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    limit: usize,
    offset: usize,
}

impl Page {
    pub const DEFAULT_LIMIT: usize = 20;
    pub const MAX_LIMIT: usize = 100;

    /// Build a page from raw query values.
    ///
    /// A missing limit, or one outside `1..=MAX_LIMIT`, falls back to
    /// `DEFAULT_LIMIT`. A missing or negative offset becomes 0.
    pub fn new(limit: Option<i64>, offset: Option<i64>) -> Self {
        let limit = limit
            .and_then(|limit| usize::try_from(limit).ok())
            .filter(|limit| (1..=Self::MAX_LIMIT).contains(limit))
            .unwrap_or(Self::DEFAULT_LIMIT);
        let offset = offset
            .and_then(|offset| usize::try_from(offset).ok())
            .unwrap_or(0);
        Self { limit, offset }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_rejects_blank_value() {
        // テスト項目: 空白のみの UserId は作成できない
        // given (前提条件):
        let value = "   ".to_string();

        // when (操作):
        let result = UserId::new(value);

        // then (期待する結果):
        assert_eq!(result, Err(ValueObjectError::EmptyUserId));
    }

    #[test]
    fn test_conversation_id_keeps_original_value() {
        // テスト項目: ConversationId は渡された値をそのまま保持する
        // given (前提条件):
        let value = "64f1c2a9e4b0a1b2c3d4e5f6".to_string();

        // when (操作):
        let id = ConversationId::try_from(value.clone()).unwrap();

        // then (期待する結果):
        assert_eq!(id.as_str(), value);
        assert_eq!(id.to_string(), value);
    }

    #[test]
    fn test_conversation_id_rejects_empty_value() {
        // テスト項目: 空の ConversationId は作成できない
        // given (前提条件):
        let value = "";

        // when (操作):
        let result = ConversationId::try_from(value);

        // then (期待する結果):
        assert_eq!(result, Err(ValueObjectError::EmptyConversationId));
    }

    #[test]
    fn test_connection_ids_are_unique() {
        // テスト項目: 生成された ConnectionId は毎回異なる
        // given (前提条件):

        // when (操作):
        let a = ConnectionId::generate();
        let b = ConnectionId::generate();

        // then (期待する結果):
        assert_ne!(a, b);
    }

    #[test]
    fn test_page_defaults() {
        // テスト項目: limit / offset を省略すると 20 件目までの先頭ページになる
        // given (前提条件):

        // when (操作):
        let page = Page::default();

        // then (期待する結果):
        assert_eq!(page.limit(), 20);
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn test_page_clamps_out_of_range_values() {
        // テスト項目: 範囲外の limit はデフォルト値に、負の offset は 0 に補正される
        // given (前提条件):
        let cases = [
            (Some(0), Some(-5), 20, 0),
            (Some(-1), None, 20, 0),
            (Some(101), Some(3), 20, 3),
            (Some(100), Some(40), 100, 40),
            (Some(1), Some(0), 1, 0),
        ];

        for (limit, offset, expected_limit, expected_offset) in cases {
            // when (操作):
            let page = Page::new(limit, offset);

            // then (期待する結果):
            assert_eq!(page.limit(), expected_limit, "limit={limit:?}");
            assert_eq!(page.offset(), expected_offset, "offset={offset:?}");
        }
    }
}
