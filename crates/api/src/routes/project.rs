//! Route definitions for the `/projects` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::project;
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /?search=          -> list
/// POST   /                  -> create (multipart)
/// GET    /{id}              -> get_by_id
/// GET    /{id}/updates      -> list_updates
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(project::list).post(project::create))
        .route("/{id}", get(project::get_by_id))
        .route("/{id}/updates", get(project::list_updates))
}
