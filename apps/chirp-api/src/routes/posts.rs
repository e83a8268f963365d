//! Interaction mutation endpoints.
//!
//! Every mutation writes through the store first, then announces the new
//! authoritative count through the fan-out engine, and notifies the item's
//! author where a notification kind exists for the action.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::auth::middleware::AuthUser;
use crate::error::{ApiError, FieldError};
use crate::models::{Comment, NotificationKind, Post};
use crate::store::{CommentDeletion, PostStore};
use crate::AppState;

/// Maximum post/comment length in characters.
const MAX_CONTENT_LEN: usize = 4000;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/posts", post(create_post))
        .route("/posts/{post_id}", get(get_post))
        .route("/posts/{post_id}/like", post(like_post))
        .route("/posts/{post_id}/save", post(save_post))
        .route("/posts/{post_id}/repost", post(repost_post))
        .route("/posts/{post_id}/comments", post(add_comment))
        .route(
            "/posts/{post_id}/comments/{comment_id}",
            delete(delete_comment),
        )
}

fn validate_content(content: &str) -> Result<&str, ApiError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(ApiError::validation(vec![FieldError {
            field: "content".to_string(),
            message: "Content is required".to_string(),
        }]));
    }
    if content.len() > MAX_CONTENT_LEN {
        return Err(ApiError::validation(vec![FieldError {
            field: "content".to_string(),
            message: format!("Content must be {MAX_CONTENT_LEN} characters or fewer"),
        }]));
    }
    Ok(content)
}

// ---------------------------------------------------------------------------
// POST /api/v1/posts
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub content: String,
}

async fn create_post(
    AuthUser { user_id }: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<Post>), ApiError> {
    let content = validate_content(&body.content)?;
    let post = Post::new(&user_id, content);
    state.store.insert_post(post.clone()).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

// ---------------------------------------------------------------------------
// GET /api/v1/posts/{post_id}
// ---------------------------------------------------------------------------

async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> Result<Json<Post>, ApiError> {
    let post = state
        .store
        .get_post(&post_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Post not found"))?;
    Ok(Json(post))
}

// ---------------------------------------------------------------------------
// POST /api/v1/posts/{post_id}/like
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub active: bool,
    pub count: u64,
}

async fn like_post(
    AuthUser { user_id }: AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> Result<Json<ToggleResponse>, ApiError> {
    let post = state
        .store
        .get_post(&post_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Post not found"))?;

    let outcome = state
        .store
        .toggle_like(&post_id, &user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Post not found"))?;

    state.fanout.announce_likes(&post_id, outcome.count);

    // The author hears about new likes, not about retractions or their own.
    if outcome.active && post.author_id != user_id {
        state
            .notifier
            .notify(&post.author_id, &user_id, NotificationKind::Like)
            .await?;
    }

    Ok(Json(ToggleResponse {
        active: outcome.active,
        count: outcome.count,
    }))
}

// ---------------------------------------------------------------------------
// POST /api/v1/posts/{post_id}/save
// ---------------------------------------------------------------------------

async fn save_post(
    AuthUser { user_id }: AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> Result<Json<ToggleResponse>, ApiError> {
    let outcome = state
        .store
        .toggle_save(&post_id, &user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Post not found"))?;

    state.fanout.announce_saves(&post_id, outcome.count);

    Ok(Json(ToggleResponse {
        active: outcome.active,
        count: outcome.count,
    }))
}

// ---------------------------------------------------------------------------
// POST /api/v1/posts/{post_id}/repost
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct RepostResponse {
    pub count: u64,
}

async fn repost_post(
    AuthUser { user_id }: AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> Result<Json<RepostResponse>, ApiError> {
    let count = state
        .store
        .add_repost(&post_id, &user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Post not found"))?;

    state.fanout.announce_reposts(&post_id, count);

    Ok(Json(RepostResponse { count }))
}

// ---------------------------------------------------------------------------
// POST /api/v1/posts/{post_id}/comments
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct AddCommentRequest {
    pub content: String,
}

async fn add_comment(
    AuthUser { user_id }: AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    Json(body): Json<AddCommentRequest>,
) -> Result<(StatusCode, Json<Comment>), ApiError> {
    let content = validate_content(&body.content)?;

    let post = state
        .store
        .get_post(&post_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Post not found"))?;

    let (comment, count) = state
        .store
        .add_comment(&post_id, &user_id, content)
        .await?
        .ok_or_else(|| ApiError::not_found("Post not found"))?;

    state.fanout.announce_comments(&post_id, count);

    if post.author_id != user_id {
        state
            .notifier
            .notify(&post.author_id, &user_id, NotificationKind::Comment)
            .await?;
    }

    Ok((StatusCode::CREATED, Json(comment)))
}

// ---------------------------------------------------------------------------
// DELETE /api/v1/posts/{post_id}/comments/{comment_id}
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CommentPath {
    pub post_id: String,
    pub comment_id: String,
}

async fn delete_comment(
    AuthUser { user_id }: AuthUser,
    State(state): State<AppState>,
    Path(path): Path<CommentPath>,
) -> Result<StatusCode, ApiError> {
    match state
        .store
        .delete_comment(&path.post_id, &path.comment_id, &user_id)
        .await?
    {
        CommentDeletion::Deleted { updated_count } => {
            state.fanout.announce_comments(&path.post_id, updated_count);
            Ok(StatusCode::NO_CONTENT)
        }
        CommentDeletion::NotFound => Err(ApiError::not_found("Comment not found")),
        CommentDeletion::NotAuthor => {
            Err(ApiError::forbidden("You can only delete your own comments"))
        }
    }
}
