use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A two-party conversation. The participant pair is stored sorted so the
/// unordered pair maps to exactly one chat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    pub id: String,
    pub participants: [String; 2],
    pub created_at: DateTime<Utc>,
}

impl Chat {
    /// Build a chat for an unordered participant pair.
    pub fn new(a: &str, b: &str) -> Self {
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        Self {
            id: chirp_common::id::prefixed_ulid(chirp_common::id::prefix::CHAT),
            participants: [first.to_string(), second.to_string()],
            created_at: Utc::now(),
        }
    }

    pub fn is_participant(&self, user_id: &str) -> bool {
        self.participants.iter().any(|p| p == user_id)
    }

    /// The participant other than `user_id`.
    pub fn other_participant(&self, user_id: &str) -> &str {
        if self.participants[0] == user_id {
            &self.participants[1]
        } else {
            &self.participants[0]
        }
    }
}

/// A message within a chat. Immutable once created; `seq` is the
/// server-assigned ordering key, monotonic per chat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub chat_id: String,
    pub sender_id: String,
    pub content: String,
    pub seq: u64,
    pub created_at: DateTime<Utc>,
}
