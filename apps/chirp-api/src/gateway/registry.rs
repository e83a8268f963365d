//! Session registry: one live connection handle per authenticated identity.

use std::sync::Arc;

use dashmap::DashMap;

use super::events::ServerEvent;
use super::session::ConnectionHandle;

/// Shared registry of live connections, keyed by user id.
///
/// The registry holds the invariant that an identity has at most one live
/// handle: registering over an existing entry atomically replaces it and
/// signals the evicted connection to shut down.
pub struct SessionRegistry {
    connections: DashMap<String, Arc<ConnectionHandle>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    /// Install a handle for its identity. Last handshake wins: any prior
    /// handle is evicted, sent a `disconnected` signal, and returned.
    pub fn register(&self, handle: Arc<ConnectionHandle>) -> Option<Arc<ConnectionHandle>> {
        let evicted = self.connections.insert(handle.user_id.clone(), handle);
        if let Some(old) = &evicted {
            old.send(ServerEvent::Disconnected {
                reason: "session-replaced".to_string(),
            });
        }
        evicted
    }

    /// The live handle for an identity, if connected. Absence is not an
    /// error: offline targets are skipped, not retried.
    pub fn lookup(&self, user_id: &str) -> Option<Arc<ConnectionHandle>> {
        self.connections.get(user_id).map(|e| e.value().clone())
    }

    /// Forcibly remove an identity's handle, signalling it to disconnect.
    pub fn evict(&self, user_id: &str) -> Option<Arc<ConnectionHandle>> {
        let removed = self.connections.remove(user_id).map(|(_, h)| h);
        if let Some(handle) = &removed {
            handle.send(ServerEvent::Disconnected {
                reason: "evicted".to_string(),
            });
        }
        removed
    }

    /// Remove the entry only if it still belongs to `session_id`.
    ///
    /// Teardown of a replaced connection must not remove the replacement
    /// that took its slot.
    pub fn remove_if(&self, user_id: &str, session_id: &str) {
        self.connections
            .remove_if(user_id, |_, handle| handle.session_id == session_id);
    }

    pub fn connected_count(&self) -> usize {
        self.connections.len()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
