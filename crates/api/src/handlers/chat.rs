//! Handlers for contractor chat sessions.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use sitepulse_core::error::CoreError;
use sitepulse_core::transcript::Message;
use sitepulse_core::types::DbId;
use sitepulse_db::models::project::Project;
use sitepulse_tracker::{
    ConversationSession, HistoryMode, IgnoredReason, SessionState, SubmitOutcome, TurnOutcome,
};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /chat/sessions`.
#[derive(Debug, Deserialize)]
pub struct OpenSessionRequest {
    pub project_id: DbId,
    /// Rebuild the transcript from the caller's recorded updates.
    #[serde(default)]
    pub replay_history: bool,
}

/// Request body for `POST /chat/sessions/{id}/messages`.
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub text: String,
}

/// A session as the chat screen renders it.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub id: Uuid,
    pub state: SessionState,
    pub project: Option<Project>,
    pub has_schedule_analysis: bool,
    pub messages: Vec<Message>,
}

impl SessionView {
    async fn of(session: &ConversationSession) -> Self {
        Self {
            id: session.id(),
            state: session.state(),
            project: session.project().cloned(),
            has_schedule_analysis: session.has_schedule_analysis(),
            messages: session.transcript().await.messages().to_vec(),
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/chat/sessions
///
/// Opens a session bound to the caller's auth stream. Unknown projects are
/// rejected with 404 and nothing is registered.
pub async fn open(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<OpenSessionRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<SessionView>>)> {
    let mode = if input.replay_history {
        HistoryMode::Replay
    } else {
        HistoryMode::Fresh
    };
    let subscription = state.auth_hub.subscribe(&user.user_id).await;
    let session = ConversationSession::open(
        state.collaborators.clone(),
        state.config.ai.generation.clone(),
        state.config.persist,
        subscription,
        input.project_id,
        mode,
    )
    .await;

    match session.state() {
        SessionState::Ready => {}
        SessionState::NotFound => {
            return Err(AppError::Core(CoreError::NotFound {
                entity: "Project",
                id: input.project_id,
            }))
        }
        SessionState::Unauthenticated => {
            return Err(AppError::Core(CoreError::Unauthorized(
                "No signed-in user".into(),
            )))
        }
        other => {
            return Err(AppError::InternalError(format!(
                "Chat session stuck in {other:?}"
            )))
        }
    }

    let session = state.chats.insert(&user.user_id, session).await;
    tracing::info!(
        session_id = %session.id(),
        project_id = %input.project_id,
        user_id = %user.user_id,
        ?mode,
        "Chat session opened"
    );
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: SessionView::of(&session).await,
        }),
    ))
}

/// GET /api/v1/chat/sessions/{id}
pub async fn get_session(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<DataResponse<SessionView>>> {
    let session = state.chats.get(id, &user.user_id).await?;
    Ok(Json(DataResponse {
        data: SessionView::of(&session).await,
    }))
}

/// POST /api/v1/chat/sessions/{id}/messages
///
/// Runs one turn. The turn runs on its own task so a dropped request does
/// not cancel generation or persistence midway.
pub async fn submit(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(input): Json<SubmitRequest>,
) -> AppResult<Json<DataResponse<TurnOutcome>>> {
    let session = state.chats.get(id, &user.user_id).await?;

    let outcome = tokio::spawn({
        let session = Arc::clone(&session);
        async move { session.submit(&input.text).await }
    })
    .await
    .map_err(|e| AppError::InternalError(format!("Chat turn task failed: {e}")))?;

    match outcome {
        SubmitOutcome::Completed(turn) => Ok(Json(DataResponse { data: turn })),
        SubmitOutcome::Ignored(reason) => Err(ignored_to_error(reason)),
    }
}

/// DELETE /api/v1/chat/sessions/{id}
pub async fn close(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.chats.remove(id, &user.user_id).await?;
    tracing::info!(session_id = %id, user_id = %user.user_id, "Chat session closed");
    Ok(StatusCode::NO_CONTENT)
}

fn ignored_to_error(reason: IgnoredReason) -> AppError {
    match reason {
        IgnoredReason::EmptyMessage => {
            AppError::Core(CoreError::Validation("Message text must not be empty".into()))
        }
        IgnoredReason::InFlight => AppError::InFlight,
        IgnoredReason::Unauthenticated => {
            AppError::Core(CoreError::Unauthorized("No signed-in user".into()))
        }
        IgnoredReason::NotReady => {
            AppError::Core(CoreError::Conflict("Chat session is not ready".into()))
        }
    }
}
