//! Interaction fan-out engine.
//!
//! After a like/repost/save/comment mutation has been applied by its route
//! handler, the engine announces the post-mutation authoritative count to
//! the item's room. It never performs mutations and never retries: events
//! carry no sequence number, so clients treat every push as an
//! authoritative overwrite.

use std::sync::Arc;

use super::events::ServerEvent;
use super::rooms::RoomManager;

/// The room id an item's viewers subscribe to is the item id itself.
pub struct InteractionFanout {
    rooms: Arc<RoomManager>,
}

impl InteractionFanout {
    pub fn new(rooms: Arc<RoomManager>) -> Self {
        Self { rooms }
    }

    pub fn announce_likes(&self, item_id: &str, updated_count: u64) {
        self.announce(
            item_id,
            ServerEvent::UpdatedLikes {
                item_id: item_id.to_string(),
                updated_count,
            },
        );
    }

    pub fn announce_reposts(&self, item_id: &str, updated_count: u64) {
        self.announce(
            item_id,
            ServerEvent::UpdatedReposts {
                item_id: item_id.to_string(),
                updated_count,
            },
        );
    }

    pub fn announce_saves(&self, item_id: &str, updated_count: u64) {
        self.announce(
            item_id,
            ServerEvent::UpdatedSaves {
                item_id: item_id.to_string(),
                updated_count,
            },
        );
    }

    pub fn announce_comments(&self, item_id: &str, updated_count: u64) {
        self.announce(
            item_id,
            ServerEvent::UpdatedComments {
                item_id: item_id.to_string(),
                updated_count,
            },
        );
    }

    fn announce(&self, item_id: &str, event: ServerEvent) {
        let delivered = self.rooms.broadcast(item_id, &event);
        tracing::debug!(%item_id, delivered, "interaction fan-out");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn announce_reaches_item_room_members() {
        let rooms = Arc::new(RoomManager::new());
        let fanout = InteractionFanout::new(rooms.clone());

        let (tx, mut rx) = mpsc::unbounded_channel();
        rooms.join("post_1", "gw_a", tx);

        fanout.announce_likes("post_1", 4);

        match rx.try_recv().unwrap() {
            ServerEvent::UpdatedLikes {
                item_id,
                updated_count,
            } => {
                assert_eq!(item_id, "post_1");
                assert_eq!(updated_count, 4);
            }
            other => panic!("expected updated-likes, got {other:?}"),
        }
    }

    #[test]
    fn announce_without_viewers_is_silent() {
        let rooms = Arc::new(RoomManager::new());
        let fanout = InteractionFanout::new(rooms);
        // No members joined; the broadcast simply reaches nobody.
        fanout.announce_comments("post_1", 2);
    }
}
