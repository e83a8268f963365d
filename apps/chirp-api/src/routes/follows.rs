//! Follow endpoint: the follow relation itself is profile territory; this
//! route exists to hand the accepted action to the notification pipeline.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::Router;

use crate::auth::middleware::AuthUser;
use crate::error::{ApiError, FieldError};
use crate::models::NotificationKind;
use crate::store::UserStore;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/users/{user_id}/follow", post(follow_user))
}

async fn follow_user(
    AuthUser { user_id }: AuthUser,
    State(state): State<AppState>,
    Path(target_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if target_id == user_id {
        return Err(ApiError::validation(vec![FieldError {
            field: "user_id".to_string(),
            message: "You cannot follow yourself".to_string(),
        }]));
    }

    state
        .store
        .get_user(&target_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    state
        .notifier
        .notify(&target_id, &user_id, NotificationKind::Follow)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
