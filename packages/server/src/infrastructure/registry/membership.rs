//! Room Membership Cache: conversation → participant list.
//!
//! Entries are populated lazily from the messaging collaborator on first
//! reference. With the default policy (`ttl == None`) an entry is never
//! refreshed, so membership changes made after the first load are invisible
//! until the entry is invalidated or the process restarts. Set a TTL or call
//! [`MembershipCache::invalidate`] to bound that staleness.

use std::{sync::Arc, time::Duration};

use dashmap::DashMap;
use tokio::time::Instant;

use crate::domain::{ConversationId, MessageUsecase, UserId};

#[derive(Debug, Clone)]
struct CachedMembership {
    participants: Arc<[UserId]>,
    loaded_at: Instant,
}

pub struct MembershipCache {
    messaging: Arc<dyn MessageUsecase>,
    entries: DashMap<ConversationId, CachedMembership>,
    ttl: Option<Duration>,
}

impl MembershipCache {
    /// Create a cache whose entries never expire
    pub fn new(messaging: Arc<dyn MessageUsecase>) -> Self {
        Self::with_ttl(messaging, None)
    }

    pub fn with_ttl(messaging: Arc<dyn MessageUsecase>, ttl: Option<Duration>) -> Self {
        Self {
            messaging,
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Participants of `conversation_id`, loading them on a cache miss.
    ///
    /// If the collaborator cannot provide the conversation, the result
    /// degrades to `[requester]` so the caller still gets a (sender-only)
    /// delivery. The degraded list is not cached.
    pub async fn participants_of(
        &self,
        conversation_id: &ConversationId,
        requester: &UserId,
    ) -> Arc<[UserId]> {
        if let Some(participants) = self.cached(conversation_id) {
            return participants;
        }

        // No shard lock is held across the external call.
        match self.messaging.get_conversation(conversation_id).await {
            Ok(conversation) => {
                let participants: Arc<[UserId]> = conversation.participant_ids.into();
                self.entries.insert(
                    conversation_id.clone(),
                    CachedMembership {
                        participants: participants.clone(),
                        loaded_at: Instant::now(),
                    },
                );
                tracing::debug!(
                    conversation_id = %conversation_id,
                    participants = participants.len(),
                    "Membership cached"
                );
                participants
            }
            Err(e) => {
                tracing::warn!(
                    conversation_id = %conversation_id,
                    requester = %requester,
                    error = %e,
                    "Failed to load conversation membership, falling back to sender-only delivery"
                );
                Arc::from(vec![requester.clone()])
            }
        }
    }

    /// Drop the cached entry so the next lookup reloads it.
    pub fn invalidate(&self, conversation_id: &ConversationId) -> bool {
        self.entries.remove(conversation_id).is_some()
    }

    pub fn is_cached(&self, conversation_id: &ConversationId) -> bool {
        self.cached(conversation_id).is_some()
    }

    pub fn cached_len(&self) -> usize {
        self.entries.len()
    }

    fn cached(&self, conversation_id: &ConversationId) -> Option<Arc<[UserId]>> {
        let entry = self.entries.get(conversation_id)?;
        match self.ttl {
            Some(ttl) if entry.loaded_at.elapsed() >= ttl => {
                drop(entry);
                self.entries
                    .remove_if(conversation_id, |_, cached| cached.loaded_at.elapsed() >= ttl);
                None
            }
            _ => Some(entry.participants.clone()),
        }
    }
}
