pub mod auth;
pub mod chat;
pub mod dashboard;
pub mod health;
pub mod project;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/logout                                     logout (requires auth)
///
/// /dashboard                                       project-manager dashboard
///
/// /projects                                        contractor list, create
/// /projects/{id}                                   project details
/// /projects/{id}/updates                           status update history
///
/// /chat/sessions                                   open a chat session
/// /chat/sessions/{id}                              session view, close
/// /chat/sessions/{id}/messages                     submit a status update
/// ```
///
/// Every route requires a Bearer token.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/dashboard", dashboard::router())
        .nest("/projects", project::router())
        .nest("/chat/sessions", chat::router())
}
