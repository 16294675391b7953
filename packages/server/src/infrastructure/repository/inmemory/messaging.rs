//! InMemory messaging collaborator
//!
//! ドメイン層が定義する `MessageUsecase` / `ConversationService` trait の具体的な実装。
//! HashMap をインメモリ DB として使用します。プロセス再起動でデータは失われます。
//!
//! ## ビジネスルール
//!
//! - メッセージ本文は前後の空白を除去し、空の場合は `EmptyContent`
//! - 会話が存在しない場合は `ConversationNotFound`
//! - 送信者・閲覧者が会話の参加者でない場合は `Forbidden`
//! - 会話の作成者は必ず参加者に含まれる
//! - メッセージを保存すると会話の `updated_at` が更新される
//! - 会話一覧は `updated_at` の新しい順、メッセージ一覧は `created_at` の新しい順

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use confab_shared::time::Clock;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::{
    Conversation, ConversationId, ConversationService, Message, MessageUsecase, MessagingError,
    Page, UserId,
};

#[derive(Debug, Default)]
struct MessagingStore {
    conversations: HashMap<ConversationId, Conversation>,
    messages: Vec<Message>,
}

/// インメモリ MessageUsecase / ConversationService 実装
pub struct InMemoryMessagingService {
    store: Mutex<MessagingStore>,
    clock: Arc<dyn Clock>,
}

impl InMemoryMessagingService {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            store: Mutex::new(MessagingStore::default()),
            clock,
        }
    }

    /// 指定した ID で会話を登録（既存の場合は置き換え）
    pub async fn insert_conversation(
        &self,
        id: ConversationId,
        participants: Vec<UserId>,
    ) -> Conversation {
        let now = self.clock.now();
        let conversation = Conversation {
            id: id.clone(),
            participant_ids: dedup(participants),
            created_at: now,
            updated_at: now,
        };

        let mut store = self.store.lock().await;
        store.conversations.insert(id, conversation.clone());
        conversation
    }
}

fn paginate<T>(items: Vec<T>, page: Page) -> Vec<T> {
    items
        .into_iter()
        .skip(page.offset())
        .take(page.limit())
        .collect()
}

fn dedup(participants: Vec<UserId>) -> Vec<UserId> {
    let mut unique: Vec<UserId> = Vec::with_capacity(participants.len());
    for id in participants {
        if !unique.contains(&id) {
            unique.push(id);
        }
    }
    unique
}

#[async_trait]
impl MessageUsecase for InMemoryMessagingService {
    async fn send_message(
        &self,
        sender_id: &UserId,
        conversation_id: &ConversationId,
        content: &str,
    ) -> Result<Message, MessagingError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(MessagingError::EmptyContent);
        }

        let now = self.clock.now();
        let mut store = self.store.lock().await;
        let conversation = store
            .conversations
            .get_mut(conversation_id)
            .ok_or_else(|| MessagingError::ConversationNotFound(conversation_id.to_string()))?;
        if !conversation.has_participant(sender_id) {
            return Err(MessagingError::Forbidden);
        }
        conversation.updated_at = now;

        let message = Message {
            id: Uuid::new_v4().to_string(),
            conversation_id: conversation_id.clone(),
            sender_id: sender_id.clone(),
            content: content.to_string(),
            created_at: now,
        };
        store.messages.push(message.clone());
        Ok(message)
    }

    async fn get_conversation(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Conversation, MessagingError> {
        let store = self.store.lock().await;
        store
            .conversations
            .get(conversation_id)
            .cloned()
            .ok_or_else(|| MessagingError::ConversationNotFound(conversation_id.to_string()))
    }
}

#[async_trait]
impl ConversationService for InMemoryMessagingService {
    async fn create_conversation(
        &self,
        creator: &UserId,
        participant_ids: Vec<UserId>,
    ) -> Result<Conversation, MessagingError> {
        let mut participants = participant_ids;
        if !participants.contains(creator) {
            participants.push(creator.clone());
        }
        Ok(self
            .insert_conversation(ConversationId::generate(), participants)
            .await)
    }

    async fn get_user_conversations(
        &self,
        user_id: &UserId,
        page: Page,
    ) -> Result<Vec<Conversation>, MessagingError> {
        let store = self.store.lock().await;
        let mut conversations: Vec<Conversation> = store
            .conversations
            .values()
            .filter(|c| c.has_participant(user_id))
            .cloned()
            .collect();
        // 同時刻の場合も結果が安定するよう ID で並べる
        conversations.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(a.id.cmp(&b.id)));
        Ok(paginate(conversations, page))
    }

    async fn get_messages(
        &self,
        user_id: &UserId,
        conversation_id: &ConversationId,
        page: Page,
    ) -> Result<Vec<Message>, MessagingError> {
        let store = self.store.lock().await;
        let conversation = store
            .conversations
            .get(conversation_id)
            .ok_or_else(|| MessagingError::ConversationNotFound(conversation_id.to_string()))?;
        if !conversation.has_participant(user_id) {
            return Err(MessagingError::Forbidden);
        }

        // 同時刻のメッセージは後に保存したものが先
        let mut messages: Vec<Message> = store
            .messages
            .iter()
            .rev()
            .filter(|m| &m.conversation_id == conversation_id)
            .cloned()
            .collect();
        messages.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(paginate(messages, page))
    }
}
