//! Room-scoped delivery groups.
//!
//! A room is a named set of live connections: a chat id, a post id (item
//! viewers), or a user id (that identity's notification channel). Rooms are
//! created lazily on first join and never destroyed; membership is
//! in-memory only, so a reconnecting client re-joins everything it cares
//! about.

use std::collections::HashMap;

use dashmap::DashMap;
use tokio::sync::mpsc;

use super::events::ServerEvent;

/// The room id notifications for `user_id` are pushed to.
pub fn self_channel(user_id: &str) -> String {
    user_id.to_string()
}

type Outbound = mpsc::UnboundedSender<ServerEvent>;

pub struct RoomManager {
    rooms: DashMap<String, HashMap<String, Outbound>>,
}

impl RoomManager {
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
        }
    }

    /// Add a session to a room. Joining twice is a no-op.
    pub fn join(&self, room_id: &str, session_id: &str, sender: Outbound) {
        self.rooms
            .entry(room_id.to_string())
            .or_default()
            .entry(session_id.to_string())
            .or_insert(sender);
    }

    pub fn leave(&self, room_id: &str, session_id: &str) {
        if let Some(mut members) = self.rooms.get_mut(room_id) {
            members.remove(session_id);
        }
    }

    /// Remove a session from every room it joined (connection teardown).
    pub fn leave_all(&self, session_id: &str) {
        for mut entry in self.rooms.iter_mut() {
            entry.value_mut().remove(session_id);
        }
    }

    /// Deliver an event to every current member. Best-effort: members whose
    /// connection loop is gone are skipped and pruned. Returns the number
    /// of members the event was queued for.
    pub fn broadcast(&self, room_id: &str, event: &ServerEvent) -> usize {
        let Some(mut members) = self.rooms.get_mut(room_id) else {
            return 0;
        };
        let mut delivered = 0;
        members.retain(|_, sender| {
            if sender.send(event.clone()).is_ok() {
                delivered += 1;
                true
            } else {
                false
            }
        });
        delivered
    }

    pub fn member_count(&self, room_id: &str) -> usize {
        self.rooms.get(room_id).map(|m| m.len()).unwrap_or(0)
    }
}

impl Default for RoomManager {
    fn default() -> Self {
        Self::new()
    }
}
