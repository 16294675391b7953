//! Connection Registry: user → set of live connections.

use std::collections::HashMap;

use dashmap::{DashMap, mapref::entry::Entry};

use crate::domain::{ConnectionHandle, ConnectionId, UserId};

/// Maps each user to the set of their currently open connections.
///
/// A user may hold several connections at once (multiple devices or tabs).
/// The per-user set is keyed by `ConnectionId`, so registering the same
/// handle twice is absorbed. A connection belongs to at most one user.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: DashMap<UserId, HashMap<ConnectionId, ConnectionHandle>>,
    /// connection id → 所有ユーザー
    owners: DashMap<ConnectionId, UserId>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `handle` to the set of `user_id`, creating the set if absent.
    ///
    /// Returns `false` and leaves the registry unchanged when the connection
    /// is already registered under another user.
    pub fn register(&self, user_id: UserId, handle: ConnectionHandle) -> bool {
        let connection_id = handle.id();
        match self.owners.entry(connection_id) {
            Entry::Occupied(owner) if owner.get() != &user_id => {
                tracing::warn!(
                    user_id = %user_id,
                    owner = %owner.get(),
                    connection_id = %connection_id,
                    "Connection already registered to another user"
                );
                return false;
            }
            Entry::Occupied(_) => {}
            Entry::Vacant(slot) => {
                slot.insert(user_id.clone());
            }
        }

        self.connections
            .entry(user_id)
            .or_default()
            .insert(connection_id, handle);
        true
    }

    /// Remove a connection; the user entry is dropped once its set is empty.
    ///
    /// Returns `true` only if the connection was registered, so concurrent or
    /// repeated calls for the same connection observe `true` exactly once.
    pub fn unregister(&self, user_id: &UserId, connection_id: &ConnectionId) -> bool {
        let removed = match self.connections.get_mut(user_id) {
            Some(mut set) => set.remove(connection_id).is_some(),
            None => return false,
        };
        self.connections.remove_if(user_id, |_, set| set.is_empty());
        if removed {
            self.owners.remove(connection_id);
        }
        removed
    }

    /// Snapshot of the live connections of `user_id`.
    pub fn connections_of(&self, user_id: &UserId) -> Vec<ConnectionHandle> {
        self.connections
            .get(user_id)
            .map(|set| set.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn is_online(&self, user_id: &UserId) -> bool {
        self.connections.contains_key(user_id)
    }

    pub fn connection_count_of(&self, user_id: &UserId) -> usize {
        self.connections
            .get(user_id)
            .map(|set| set.len())
            .unwrap_or(0)
    }

    /// Total number of live connections across all users
    pub fn connection_count(&self) -> usize {
        self.connections.iter().map(|entry| entry.value().len()).sum()
    }

    /// Cancel every registered connection.
    ///
    /// Entries are removed by each connection's own cleanup path.
    pub fn close_all(&self) -> usize {
        let mut closed = 0;
        for entry in self.connections.iter() {
            for handle in entry.value().values() {
                handle.close();
                closed += 1;
            }
        }
        closed
    }
}
