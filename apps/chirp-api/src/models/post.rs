use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A feed item that interactions target. The like/repost/save membership
/// sets are authoritative; every published count is a set cardinality.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub author_id: String,
    pub content: String,
    pub likes: HashSet<String>,
    pub reposts: HashSet<String>,
    pub saves: HashSet<String>,
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
}

impl Post {
    pub fn new(author_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: chirp_common::id::prefixed_ulid(chirp_common::id::prefix::POST),
            author_id: author_id.into(),
            content: content.into(),
            likes: HashSet::new(),
            reposts: HashSet::new(),
            saves: HashSet::new(),
            comments: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn like_count(&self) -> u64 {
        self.likes.len() as u64
    }

    pub fn repost_count(&self) -> u64 {
        self.reposts.len() as u64
    }

    pub fn save_count(&self) -> u64 {
        self.saves.len() as u64
    }

    pub fn comment_count(&self) -> u64 {
        self.comments.len() as u64
    }
}

/// A comment on a post. Content is immutable; only the author may delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub post_id: String,
    pub author_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(
        post_id: impl Into<String>,
        author_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: chirp_common::id::prefixed_ulid(chirp_common::id::prefix::COMMENT),
            post_id: post_id.into(),
            author_id: author_id.into(),
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}
