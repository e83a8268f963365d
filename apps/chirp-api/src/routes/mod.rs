pub mod chats;
pub mod follows;
pub mod health;
pub mod notifications;
pub mod posts;

use axum::Router;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(crate::gateway::server::router())
        .nest(
            "/api/v1",
            chats::router()
                .merge(posts::router())
                .merge(follows::router())
                .merge(notifications::router()),
        )
}
