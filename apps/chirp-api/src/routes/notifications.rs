//! Notification retrieval: the durable fallback for offline delivery.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::auth::middleware::AuthUser;
use crate::error::ApiError;
use crate::models::Notification;
use crate::store::NotificationStore;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/notifications", get(list_notifications))
}

#[derive(Debug, Serialize)]
pub struct ListNotificationsResponse {
    pub data: Vec<Notification>,
}

async fn list_notifications(
    AuthUser { user_id }: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ListNotificationsResponse>, ApiError> {
    let data = state.store.list_notifications(&user_id).await?;
    Ok(Json(ListNotificationsResponse { data }))
}
