use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An authenticated identity. Created by the (external) registration flow;
/// the id is immutable and the handle unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub handle: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: impl Into<String>, handle: impl Into<String>) -> Self {
        Self {
            id: chirp_common::id::prefixed_ulid(chirp_common::id::prefix::USER),
            name: name.into(),
            handle: handle.into(),
            created_at: Utc::now(),
        }
    }
}
