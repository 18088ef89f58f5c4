//! Handlers for the project-manager dashboard.

use axum::extract::{Query, State};
use axum::Json;
use sitepulse_tracker::dashboard;
use sitepulse_tracker::ProjectListing;

use crate::error::AppResult;
use crate::handlers::SearchParams;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/dashboard?search=
///
/// The caller's own projects plus summary statistics.
pub async fn manager_dashboard(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<DataResponse<ProjectListing>>> {
    let listing = dashboard::manager_dashboard(
        state.collaborators.store.as_ref(),
        &user.user_id,
        params.search.as_deref(),
    )
    .await?;
    Ok(Json(DataResponse { data: listing }))
}
