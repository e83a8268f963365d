//! Chat session service: pair resolution, history, and message delivery.

use std::sync::Arc;

use crate::error::{ApiError, FieldError};
use crate::gateway::events::ServerEvent;
use crate::gateway::rooms::RoomManager;
use crate::models::{Chat, ChatMessage, NotificationKind};
use crate::notify::NotificationPipeline;
use crate::store::{ChatStore, DataStore, UserStore};

/// Maximum message length in characters.
const MAX_CONTENT_LEN: usize = 4000;

pub struct ChatService {
    store: Arc<dyn DataStore>,
    rooms: Arc<RoomManager>,
    notifier: Arc<NotificationPipeline>,
}

impl ChatService {
    pub fn new(
        store: Arc<dyn DataStore>,
        rooms: Arc<RoomManager>,
        notifier: Arc<NotificationPipeline>,
    ) -> Self {
        Self {
            store,
            rooms,
            notifier,
        }
    }

    /// Resolve or create the chat for an unordered identity pair.
    ///
    /// Idempotent, and safe under concurrent first-contact from both ends:
    /// the store guarantees a single chat id per pair.
    pub async fn get_or_create(&self, a: &str, b: &str) -> Result<Chat, ApiError> {
        if a == b {
            return Err(ApiError::validation(vec![FieldError {
                field: "user_id".to_string(),
                message: "A chat requires two distinct participants".to_string(),
            }]));
        }
        for user_id in [a, b] {
            if self.store.get_user(user_id).await?.is_none() {
                return Err(ApiError::not_found("User not found"));
            }
        }
        self.store.get_or_create_chat(a, b).await
    }

    /// Append a message and deliver it.
    ///
    /// The message and its notification record are persisted before any
    /// broadcast, so no client ever observes a message that would be lost
    /// on reconnect.
    pub async fn send_message(
        &self,
        chat_id: &str,
        sender_id: &str,
        content: &str,
    ) -> Result<ChatMessage, ApiError> {
        let content = content.trim();
        let mut errors = Vec::new();
        if content.is_empty() {
            errors.push(FieldError {
                field: "content".to_string(),
                message: "Message content is required".to_string(),
            });
        } else if content.len() > MAX_CONTENT_LEN {
            errors.push(FieldError {
                field: "content".to_string(),
                message: format!("Message content must be {MAX_CONTENT_LEN} characters or fewer"),
            });
        }
        if !errors.is_empty() {
            return Err(ApiError::validation(errors));
        }

        let chat = self
            .store
            .get_chat(chat_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Chat not found"))?;
        if !chat.is_participant(sender_id) {
            return Err(ApiError::forbidden("Not a participant in this chat"));
        }

        let message = self
            .store
            .append_message(chat_id, sender_id, content)
            .await?
            .ok_or_else(|| ApiError::not_found("Chat not found"))?;

        let acceptor = chat.other_participant(sender_id);
        self.notifier
            .notify(acceptor, sender_id, NotificationKind::Message)
            .await?;

        let delivered = self.rooms.broadcast(
            chat_id,
            &ServerEvent::ReceiveMessage {
                chat_id: chat_id.to_string(),
                message: message.clone(),
            },
        );
        tracing::debug!(%chat_id, seq = message.seq, delivered, "chat message delivered");

        Ok(message)
    }

    /// Messages in ascending sequence order.
    pub async fn load_history(&self, chat_id: &str) -> Result<Vec<ChatMessage>, ApiError> {
        self.store
            .load_history(chat_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Chat not found"))
    }
}
