use std::sync::Arc;

use sitepulse_tracker::Collaborators;

use crate::auth::hub::AuthHub;
use crate::chat::ChatRegistry;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// Record store, object storage and text generator handles.
    pub collaborators: Collaborators,
    /// Open chat sessions.
    pub chats: Arc<ChatRegistry>,
    /// Per-user current-user streams.
    pub auth_hub: Arc<AuthHub>,
}

impl AppState {
    pub fn new(config: ServerConfig, collaborators: Collaborators) -> Self {
        Self {
            config: Arc::new(config),
            collaborators,
            chats: Arc::new(ChatRegistry::new()),
            auth_hub: Arc::new(AuthHub::new()),
        }
    }
}
