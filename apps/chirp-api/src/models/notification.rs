use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The closed set of events that produce a notification record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Message,
    Follow,
    Like,
    Comment,
}

/// A persisted notification. Exactly one acceptor; the kind is fixed at
/// creation. The record is the durable fallback when the acceptor is
/// offline at delivery time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub acceptor_id: String,
    pub sender_id: String,
    pub kind: NotificationKind,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        acceptor_id: impl Into<String>,
        sender_id: impl Into<String>,
        kind: NotificationKind,
    ) -> Self {
        Self {
            id: chirp_common::id::prefixed_ulid(chirp_common::id::prefix::NOTIFICATION),
            acceptor_id: acceptor_id.into(),
            sender_id: sender_id.into(),
            kind,
            read: false,
            created_at: Utc::now(),
        }
    }
}
