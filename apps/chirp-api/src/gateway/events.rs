//! Wire-format events for the connection layer.
//!
//! Both directions are closed enumerations dispatched through one typed
//! handler, so an unrecognized event is a deserialization error at the
//! boundary rather than a silently ignored callback name.

use serde::{Deserialize, Serialize};

use crate::models::{ChatMessage, Notification, User};

// ---------------------------------------------------------------------------
// Client → Server
// ---------------------------------------------------------------------------

/// Events a client may send over the connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", content = "d", rename_all = "kebab-case")]
pub enum ClientEvent {
    /// Handshake: must be the first frame on every connection.
    Identify { token: String },
    JoinRoom { room_id: String },
    LeaveRoom { room_id: String },
    SendMessage { chat_id: String, content: String },
    Heartbeat,
}

// ---------------------------------------------------------------------------
// Server → Client
// ---------------------------------------------------------------------------

/// Events the server pushes to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", content = "d", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// Handshake succeeded; the session is registered.
    Connected {
        session_id: String,
        user: User,
        heartbeat_interval: u64,
    },
    /// Chat history, sent once after a successful chat-room join.
    PreviousMessages {
        chat_id: String,
        messages: Vec<ChatMessage>,
    },
    ReceiveMessage {
        chat_id: String,
        message: ChatMessage,
    },
    UpdatedLikes {
        item_id: String,
        updated_count: u64,
    },
    UpdatedReposts {
        item_id: String,
        updated_count: u64,
    },
    UpdatedSaves {
        item_id: String,
        updated_count: u64,
    },
    UpdatedComments {
        item_id: String,
        updated_count: u64,
    },
    NewNotification { notification: Notification },
    HeartbeatAck,
    /// Acknowledged to the offending sender only; never broadcast.
    Error { code: String, message: String },
    /// The connection is about to be torn down.
    Disconnected { reason: String },
}

impl ServerEvent {
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Error {
            code: code.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_events_deserialize_from_tagged_json() {
        let event: ClientEvent =
            serde_json::from_str(r#"{"t":"join-room","d":{"room_id":"chat_1"}}"#).unwrap();
        assert!(matches!(event, ClientEvent::JoinRoom { room_id } if room_id == "chat_1"));

        let event: ClientEvent = serde_json::from_str(r#"{"t":"heartbeat"}"#).unwrap();
        assert!(matches!(event, ClientEvent::Heartbeat));
    }

    #[test]
    fn unknown_event_name_is_a_deserialization_error() {
        assert!(serde_json::from_str::<ClientEvent>(r#"{"t":"bogus","d":{}}"#).is_err());
    }

    #[test]
    fn server_events_serialize_with_kebab_case_tags() {
        let json = serde_json::to_value(ServerEvent::UpdatedLikes {
            item_id: "post_1".to_string(),
            updated_count: 4,
        })
        .unwrap();
        assert_eq!(json["t"], "updated-likes");
        assert_eq!(json["d"]["item_id"], "post_1");
        assert_eq!(json["d"]["updated_count"], 4);
    }
}
