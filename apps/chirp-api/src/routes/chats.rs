//! Chat lookup/creation and history endpoints.
//!
//! These are the synchronous counterparts to the connection layer: a client
//! resolves the chat id here before joining the chat's room.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::auth::middleware::AuthUser;
use crate::error::ApiError;
use crate::models::{Chat, ChatMessage};
use crate::store::ChatStore;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/chats/with/{user_id}", get(get_or_create_chat))
        .route("/chats/{chat_id}/messages", get(list_messages))
}

// ---------------------------------------------------------------------------
// GET /api/v1/chats/with/{user_id}
// ---------------------------------------------------------------------------

async fn get_or_create_chat(
    AuthUser { user_id }: AuthUser,
    State(state): State<AppState>,
    Path(peer_id): Path<String>,
) -> Result<Json<Chat>, ApiError> {
    let chat = state.chat.get_or_create(&user_id, &peer_id).await?;
    Ok(Json(chat))
}

// ---------------------------------------------------------------------------
// GET /api/v1/chats/{chat_id}/messages
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct ListMessagesResponse {
    pub data: Vec<ChatMessage>,
}

async fn list_messages(
    AuthUser { user_id }: AuthUser,
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
) -> Result<Json<ListMessagesResponse>, ApiError> {
    let chat = state
        .store
        .get_chat(&chat_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Chat not found"))?;
    if !chat.is_participant(&user_id) {
        return Err(ApiError::forbidden("Not a participant in this chat"));
    }

    let data = state.chat.load_history(&chat_id).await?;
    Ok(Json(ListMessagesResponse { data }))
}
