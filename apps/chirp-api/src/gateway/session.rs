//! Per-connection outbound handle.

use tokio::sync::mpsc;

use super::events::ServerEvent;

/// The write side of one live connection. Owned by the Session Registry;
/// rooms hold only clones of the underlying sender.
pub struct ConnectionHandle {
    /// Unique session identifier (`gw_` prefixed ULID).
    pub session_id: String,
    /// Authenticated user ID.
    pub user_id: String,
    sender: mpsc::UnboundedSender<ServerEvent>,
}

impl ConnectionHandle {
    /// Create a handle and the receiver its connection loop drains.
    pub fn new(user_id: String) -> (Self, mpsc::UnboundedReceiver<ServerEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let handle = Self {
            session_id: chirp_common::id::prefixed_ulid(chirp_common::id::prefix::SESSION),
            user_id,
            sender,
        };
        (handle, receiver)
    }

    /// Queue an event for delivery. Returns `false` when the connection
    /// loop is gone; callers treat that as a skipped recipient.
    pub fn send(&self, event: ServerEvent) -> bool {
        self.sender.send(event).is_ok()
    }

    /// Clone of the outbound sender, used for room membership.
    pub fn sender(&self) -> mpsc::UnboundedSender<ServerEvent> {
        self.sender.clone()
    }
}
