//! Route definitions for contractor chat sessions.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::chat;
use crate::state::AppState;

/// Routes mounted at `/chat/sessions`.
///
/// ```text
/// POST   /                  -> open
/// GET    /{id}              -> get_session
/// DELETE /{id}              -> close
/// POST   /{id}/messages     -> submit
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(chat::open))
        .route("/{id}", get(chat::get_session).delete(chat::close))
        .route("/{id}/messages", post(chat::submit))
}
