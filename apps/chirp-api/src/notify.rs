//! Notification pipeline: persist, then push if the acceptor is connected.

use std::sync::Arc;

use crate::error::ApiError;
use crate::gateway::events::ServerEvent;
use crate::gateway::registry::SessionRegistry;
use crate::gateway::rooms::{self, RoomManager};
use crate::models::{Notification, NotificationKind};
use crate::store::{DataStore, NotificationStore};

pub struct NotificationPipeline {
    store: Arc<dyn DataStore>,
    sessions: Arc<SessionRegistry>,
    rooms: Arc<RoomManager>,
}

impl NotificationPipeline {
    pub fn new(
        store: Arc<dyn DataStore>,
        sessions: Arc<SessionRegistry>,
        rooms: Arc<RoomManager>,
    ) -> Self {
        Self {
            store,
            sessions,
            rooms,
        }
    }

    /// Persist a notification record, then push it to the acceptor's
    /// self-channel if they are connected. An offline acceptor is not an
    /// error: the record remains as the durable fallback.
    pub async fn notify(
        &self,
        acceptor_id: &str,
        sender_id: &str,
        kind: NotificationKind,
    ) -> Result<Notification, ApiError> {
        let notification = Notification::new(acceptor_id, sender_id, kind);
        self.store.insert_notification(notification.clone()).await?;

        if self.sessions.lookup(acceptor_id).is_some() {
            let delivered = self.rooms.broadcast(
                &rooms::self_channel(acceptor_id),
                &ServerEvent::NewNotification {
                    notification: notification.clone(),
                },
            );
            tracing::debug!(%acceptor_id, ?kind, delivered, "notification pushed");
        } else {
            tracing::debug!(%acceptor_id, ?kind, "acceptor offline, record kept");
        }

        Ok(notification)
    }
}
