//! Persistence seam for the real-time layer.
//!
//! Backed by a real database in production and an in-memory map in tests.
//! Every mutation is atomic inside the store, so callers can broadcast the
//! returned post-mutation state without observing a stale value.

use async_trait::async_trait;

use crate::error::ApiError;
use crate::models::{Chat, ChatMessage, Comment, Notification, Post, User};

mod memory;

pub use memory::MemoryStore;

/// Result of a like/save toggle: whether the caller is now in the set, and
/// the set's new cardinality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub active: bool,
    pub count: u64,
}

/// Result of a comment deletion attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentDeletion {
    Deleted { updated_count: u64 },
    NotFound,
    NotAuthor,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert_user(&self, user: User) -> Result<(), ApiError>;
    async fn get_user(&self, user_id: &str) -> Result<Option<User>, ApiError>;
}

#[async_trait]
pub trait ChatStore: Send + Sync {
    /// Resolve or create the chat for an unordered participant pair.
    ///
    /// Concurrent first-contact from both ends must converge on a single
    /// chat id; a duplicate creation attempt returns the existing chat.
    async fn get_or_create_chat(&self, a: &str, b: &str) -> Result<Chat, ApiError>;

    async fn get_chat(&self, chat_id: &str) -> Result<Option<Chat>, ApiError>;

    /// Append a message with the chat's next monotonic sequence.
    /// Returns `None` when the chat does not exist.
    async fn append_message(
        &self,
        chat_id: &str,
        sender_id: &str,
        content: &str,
    ) -> Result<Option<ChatMessage>, ApiError>;

    /// Messages in ascending sequence order. `None` when the chat does not
    /// exist.
    async fn load_history(&self, chat_id: &str) -> Result<Option<Vec<ChatMessage>>, ApiError>;
}

#[async_trait]
pub trait PostStore: Send + Sync {
    async fn insert_post(&self, post: Post) -> Result<(), ApiError>;
    async fn get_post(&self, post_id: &str) -> Result<Option<Post>, ApiError>;

    /// Flip `user_id`'s membership in the like set. `None` when the post
    /// does not exist.
    async fn toggle_like(
        &self,
        post_id: &str,
        user_id: &str,
    ) -> Result<Option<ToggleOutcome>, ApiError>;

    /// Flip `user_id`'s membership in the save set.
    async fn toggle_save(
        &self,
        post_id: &str,
        user_id: &str,
    ) -> Result<Option<ToggleOutcome>, ApiError>;

    /// Insert `user_id` into the repost set (idempotent, never reversed).
    /// Returns the set's new cardinality.
    async fn add_repost(&self, post_id: &str, user_id: &str) -> Result<Option<u64>, ApiError>;

    /// Append a comment. Returns the comment and the new comment count.
    async fn add_comment(
        &self,
        post_id: &str,
        author_id: &str,
        content: &str,
    ) -> Result<Option<(Comment, u64)>, ApiError>;

    /// Delete a comment; only its author may do so.
    async fn delete_comment(
        &self,
        post_id: &str,
        comment_id: &str,
        author_id: &str,
    ) -> Result<CommentDeletion, ApiError>;
}

#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn insert_notification(&self, notification: Notification) -> Result<(), ApiError>;

    /// All notifications for an acceptor, newest first.
    async fn list_notifications(&self, acceptor_id: &str) -> Result<Vec<Notification>, ApiError>;
}

/// The full persistence surface the application state carries.
pub trait DataStore: UserStore + ChatStore + PostStore + NotificationStore {}

impl<T: UserStore + ChatStore + PostStore + NotificationStore> DataStore for T {}
