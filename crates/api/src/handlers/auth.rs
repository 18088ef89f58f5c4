//! Handlers for the `/auth` resource.

use axum::extract::State;
use axum::http::StatusCode;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// POST /api/v1/auth/logout
///
/// Publishes "no user" on the caller's stream, so open chat sessions stop
/// accepting messages, and drops those sessions from the registry. The
/// presented token is refused from now on.
pub async fn logout(State(state): State<AppState>, user: AuthUser) -> AppResult<StatusCode> {
    state.auth_hub.sign_out(&user.user_id).await;
    let closed = state.chats.remove_user(&user.user_id).await;
    tracing::info!(user_id = %user.user_id, closed, "Closed chat sessions on logout");
    Ok(StatusCode::NO_CONTENT)
}
