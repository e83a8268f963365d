//! In-memory `DataStore` implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::ApiError;
use crate::models::{Chat, ChatMessage, Comment, Notification, Post, User};

use super::{ChatStore, CommentDeletion, NotificationStore, PostStore, ToggleOutcome, UserStore};

/// Chat records, pair index, messages, and sequence counters live under one
/// lock so pair creation and sequence assignment are atomic.
#[derive(Default)]
struct ChatTable {
    by_id: HashMap<String, Chat>,
    by_pair: HashMap<(String, String), String>,
    messages: HashMap<String, Vec<ChatMessage>>,
    next_seq: HashMap<String, u64>,
}

pub struct MemoryStore {
    users: Mutex<HashMap<String, User>>,
    chats: Mutex<ChatTable>,
    posts: Mutex<HashMap<String, Post>>,
    notifications: Mutex<Vec<Notification>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
            chats: Mutex::new(ChatTable::default()),
            posts: Mutex::new(HashMap::new()),
            notifications: Mutex::new(Vec::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn pair_key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: User) -> Result<(), ApiError> {
        self.users.lock().insert(user.id.clone(), user);
        Ok(())
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<User>, ApiError> {
        Ok(self.users.lock().get(user_id).cloned())
    }
}

#[async_trait]
impl ChatStore for MemoryStore {
    async fn get_or_create_chat(&self, a: &str, b: &str) -> Result<Chat, ApiError> {
        let mut table = self.chats.lock();
        let key = pair_key(a, b);

        if let Some(chat_id) = table.by_pair.get(&key) {
            let chat = table
                .by_id
                .get(chat_id)
                .cloned()
                .ok_or_else(|| ApiError::internal("chat index out of sync"))?;
            return Ok(chat);
        }

        let chat = Chat::new(a, b);
        table.by_pair.insert(key, chat.id.clone());
        table.by_id.insert(chat.id.clone(), chat.clone());
        table.messages.insert(chat.id.clone(), Vec::new());
        table.next_seq.insert(chat.id.clone(), 1);
        Ok(chat)
    }

    async fn get_chat(&self, chat_id: &str) -> Result<Option<Chat>, ApiError> {
        Ok(self.chats.lock().by_id.get(chat_id).cloned())
    }

    async fn append_message(
        &self,
        chat_id: &str,
        sender_id: &str,
        content: &str,
    ) -> Result<Option<ChatMessage>, ApiError> {
        let mut table = self.chats.lock();
        if !table.by_id.contains_key(chat_id) {
            return Ok(None);
        }

        let seq = table.next_seq.entry(chat_id.to_string()).or_insert(1);
        let message = ChatMessage {
            id: chirp_common::id::prefixed_ulid(chirp_common::id::prefix::MESSAGE),
            chat_id: chat_id.to_string(),
            sender_id: sender_id.to_string(),
            content: content.to_string(),
            seq: *seq,
            created_at: chrono::Utc::now(),
        };
        *seq += 1;

        table
            .messages
            .entry(chat_id.to_string())
            .or_default()
            .push(message.clone());
        Ok(Some(message))
    }

    async fn load_history(&self, chat_id: &str) -> Result<Option<Vec<ChatMessage>>, ApiError> {
        let table = self.chats.lock();
        if !table.by_id.contains_key(chat_id) {
            return Ok(None);
        }
        // Messages are appended in sequence order under the table lock.
        Ok(Some(table.messages.get(chat_id).cloned().unwrap_or_default()))
    }
}

#[async_trait]
impl PostStore for MemoryStore {
    async fn insert_post(&self, post: Post) -> Result<(), ApiError> {
        self.posts.lock().insert(post.id.clone(), post);
        Ok(())
    }

    async fn get_post(&self, post_id: &str) -> Result<Option<Post>, ApiError> {
        Ok(self.posts.lock().get(post_id).cloned())
    }

    async fn toggle_like(
        &self,
        post_id: &str,
        user_id: &str,
    ) -> Result<Option<ToggleOutcome>, ApiError> {
        let mut posts = self.posts.lock();
        let Some(post) = posts.get_mut(post_id) else {
            return Ok(None);
        };
        let active = if post.likes.remove(user_id) {
            false
        } else {
            post.likes.insert(user_id.to_string());
            true
        };
        Ok(Some(ToggleOutcome {
            active,
            count: post.like_count(),
        }))
    }

    async fn toggle_save(
        &self,
        post_id: &str,
        user_id: &str,
    ) -> Result<Option<ToggleOutcome>, ApiError> {
        let mut posts = self.posts.lock();
        let Some(post) = posts.get_mut(post_id) else {
            return Ok(None);
        };
        let active = if post.saves.remove(user_id) {
            false
        } else {
            post.saves.insert(user_id.to_string());
            true
        };
        Ok(Some(ToggleOutcome {
            active,
            count: post.save_count(),
        }))
    }

    async fn add_repost(&self, post_id: &str, user_id: &str) -> Result<Option<u64>, ApiError> {
        let mut posts = self.posts.lock();
        let Some(post) = posts.get_mut(post_id) else {
            return Ok(None);
        };
        post.reposts.insert(user_id.to_string());
        Ok(Some(post.repost_count()))
    }

    async fn add_comment(
        &self,
        post_id: &str,
        author_id: &str,
        content: &str,
    ) -> Result<Option<(Comment, u64)>, ApiError> {
        let mut posts = self.posts.lock();
        let Some(post) = posts.get_mut(post_id) else {
            return Ok(None);
        };
        let comment = Comment::new(post_id, author_id, content);
        post.comments.push(comment.clone());
        Ok(Some((comment, post.comment_count())))
    }

    async fn delete_comment(
        &self,
        post_id: &str,
        comment_id: &str,
        author_id: &str,
    ) -> Result<CommentDeletion, ApiError> {
        let mut posts = self.posts.lock();
        let Some(post) = posts.get_mut(post_id) else {
            return Ok(CommentDeletion::NotFound);
        };
        let Some(index) = post.comments.iter().position(|c| c.id == comment_id) else {
            return Ok(CommentDeletion::NotFound);
        };
        if post.comments[index].author_id != author_id {
            return Ok(CommentDeletion::NotAuthor);
        }
        post.comments.remove(index);
        Ok(CommentDeletion::Deleted {
            updated_count: post.comment_count(),
        })
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn insert_notification(&self, notification: Notification) -> Result<(), ApiError> {
        self.notifications.lock().push(notification);
        Ok(())
    }

    async fn list_notifications(&self, acceptor_id: &str) -> Result<Vec<Notification>, ApiError> {
        let notifications = self.notifications.lock();
        let mut result: Vec<Notification> = notifications
            .iter()
            .filter(|n| n.acceptor_id == acceptor_id)
            .cloned()
            .collect();
        result.reverse();
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::models::NotificationKind;

    #[tokio::test]
    async fn get_or_create_is_idempotent_across_pair_order() {
        let store = MemoryStore::new();

        let chat = store.get_or_create_chat("usr_a", "usr_b").await.unwrap();
        let again = store.get_or_create_chat("usr_b", "usr_a").await.unwrap();
        assert_eq!(chat.id, again.id);
        assert!(chat.is_participant("usr_a"));
        assert!(chat.is_participant("usr_b"));
    }

    #[tokio::test]
    async fn concurrent_first_contact_creates_one_chat() {
        let store = Arc::new(MemoryStore::new());

        let mut handles = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                if i % 2 == 0 {
                    store.get_or_create_chat("usr_x", "usr_y").await.unwrap().id
                } else {
                    store.get_or_create_chat("usr_y", "usr_x").await.unwrap().id
                }
            }));
        }

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap());
        }
        ids.dedup();
        assert_eq!(ids.len(), 1, "all callers must converge on one chat id");
    }

    #[tokio::test]
    async fn message_sequences_are_monotonic_and_gap_free() {
        let store = MemoryStore::new();
        let chat = store.get_or_create_chat("usr_a", "usr_b").await.unwrap();

        for i in 0..5 {
            let msg = store
                .append_message(&chat.id, "usr_a", &format!("m{i}"))
                .await
                .unwrap()
                .unwrap();
            assert_eq!(msg.seq, i + 1);
        }

        let history = store.load_history(&chat.id).await.unwrap().unwrap();
        let seqs: Vec<u64> = history.iter().map(|m| m.seq).collect();
        assert_eq!(seqs, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn append_to_unknown_chat_returns_none() {
        let store = MemoryStore::new();
        assert!(store
            .append_message("chat_missing", "usr_a", "hi")
            .await
            .unwrap()
            .is_none());
        assert!(store.load_history("chat_missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn toggle_like_flips_membership() {
        let store = MemoryStore::new();
        let post = Post::new("usr_author", "hello");
        let post_id = post.id.clone();
        store.insert_post(post).await.unwrap();

        let on = store.toggle_like(&post_id, "usr_a").await.unwrap().unwrap();
        assert!(on.active);
        assert_eq!(on.count, 1);

        let off = store.toggle_like(&post_id, "usr_a").await.unwrap().unwrap();
        assert!(!off.active);
        assert_eq!(off.count, 0);
    }

    #[tokio::test]
    async fn repost_is_idempotent() {
        let store = MemoryStore::new();
        let post = Post::new("usr_author", "hello");
        let post_id = post.id.clone();
        store.insert_post(post).await.unwrap();

        assert_eq!(store.add_repost(&post_id, "usr_a").await.unwrap(), Some(1));
        assert_eq!(store.add_repost(&post_id, "usr_a").await.unwrap(), Some(1));
        assert_eq!(store.add_repost(&post_id, "usr_b").await.unwrap(), Some(2));
    }

    #[tokio::test]
    async fn only_the_author_deletes_a_comment() {
        let store = MemoryStore::new();
        let post = Post::new("usr_author", "hello");
        let post_id = post.id.clone();
        store.insert_post(post).await.unwrap();

        let (comment, count) = store
            .add_comment(&post_id, "usr_a", "nice")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(count, 1);

        let denied = store
            .delete_comment(&post_id, &comment.id, "usr_b")
            .await
            .unwrap();
        assert_eq!(denied, CommentDeletion::NotAuthor);

        let deleted = store
            .delete_comment(&post_id, &comment.id, "usr_a")
            .await
            .unwrap();
        assert_eq!(deleted, CommentDeletion::Deleted { updated_count: 0 });
    }

    #[tokio::test]
    async fn notifications_list_newest_first() {
        let store = MemoryStore::new();
        store
            .insert_notification(Notification::new("usr_a", "usr_b", NotificationKind::Follow))
            .await
            .unwrap();
        store
            .insert_notification(Notification::new("usr_a", "usr_c", NotificationKind::Like))
            .await
            .unwrap();
        store
            .insert_notification(Notification::new(
                "usr_other",
                "usr_b",
                NotificationKind::Message,
            ))
            .await
            .unwrap();

        let list = store.list_notifications("usr_a").await.unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].sender_id, "usr_c");
        assert_eq!(list[1].sender_id, "usr_b");
    }
}
