pub mod auth;
pub mod chat;
pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod notify;
pub mod routes;
pub mod store;

use std::sync::Arc;

use chat::ChatService;
use config::Config;
use gateway::fanout::InteractionFanout;
use gateway::registry::SessionRegistry;
use gateway::rooms::RoomManager;
use notify::NotificationPipeline;
use store::DataStore;

/// Shared application state available to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DataStore>,
    pub config: Arc<Config>,
    pub sessions: Arc<SessionRegistry>,
    pub rooms: Arc<RoomManager>,
    pub fanout: Arc<InteractionFanout>,
    pub notifier: Arc<NotificationPipeline>,
    pub chat: Arc<ChatService>,
}

impl AppState {
    /// Wire the component graph over a store and config.
    pub fn new(store: Arc<dyn DataStore>, config: Arc<Config>) -> Self {
        let sessions = Arc::new(SessionRegistry::new());
        let rooms = Arc::new(RoomManager::new());
        let fanout = Arc::new(InteractionFanout::new(rooms.clone()));
        let notifier = Arc::new(NotificationPipeline::new(
            store.clone(),
            sessions.clone(),
            rooms.clone(),
        ));
        let chat = Arc::new(ChatService::new(
            store.clone(),
            rooms.clone(),
            notifier.clone(),
        ));
        Self {
            store,
            config,
            sessions,
            rooms,
            fanout,
            notifier,
            chat,
        }
    }
}
