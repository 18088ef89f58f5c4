//! Handlers for the `/projects` resource.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use sitepulse_core::error::CoreError;
use sitepulse_core::project::ProjectDraft;
use sitepulse_core::schedule::ScheduleFile;
use sitepulse_core::types::DbId;
use sitepulse_db::models::project::Project;
use sitepulse_db::models::status_update::StatusUpdate;
use sitepulse_tracker::dashboard::{self, ProjectDetails};
use sitepulse_tracker::{CreatedProject, ProjectCreator};

use crate::error::{AppError, AppResult};
use crate::handlers::SearchParams;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/projects?search=
///
/// Every project, newest first.
pub async fn list(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<DataResponse<Vec<Project>>>> {
    let projects =
        dashboard::contractor_projects(state.collaborators.store.as_ref(), params.search.as_deref())
            .await?;
    Ok(Json(DataResponse { data: projects }))
}

/// POST /api/v1/projects
///
/// Multipart form with `project_name`, `description`,
/// `tracking_focus_areas` and an optional `schedule_file`. A schedule with
/// an unsupported extension is ignored and the project is created without
/// one.
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<CreatedProject>>)> {
    let mut draft = ProjectDraft {
        name: String::new(),
        description: String::new(),
        tracking_focus_areas: String::new(),
    };
    let mut schedule = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "project_name" | "description" | "tracking_focus_areas" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                match name.as_str() {
                    "project_name" => draft.name = value,
                    "description" => draft.description = value,
                    _ => draft.tracking_focus_areas = value,
                }
            }
            "schedule_file" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                if file_name.is_empty() && bytes.is_empty() {
                    continue;
                }
                schedule = ScheduleFile::select(file_name.as_str(), bytes.to_vec());
                if schedule.is_none() {
                    tracing::info!(%file_name, "Ignoring schedule with unsupported extension");
                }
            }
            other => {
                tracing::debug!(field = %other, "Ignoring unknown multipart field");
            }
        }
    }

    let creator = ProjectCreator::new(
        state.collaborators.clone(),
        state.config.ai.generation.clone(),
        state.config.public_base_url.clone(),
    );
    let created = creator
        .create(&user.current_user(), draft, schedule)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

/// GET /api/v1/projects/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ProjectDetails>>> {
    let details = dashboard::project_details(state.collaborators.store.as_ref(), id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;
    Ok(Json(DataResponse { data: details }))
}

/// GET /api/v1/projects/{id}/updates
pub async fn list_updates(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<StatusUpdate>>>> {
    let store = &state.collaborators.store;
    if store.find_project(id).await?.is_none() {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }));
    }
    let updates = store.list_status_updates(id).await?;
    Ok(Json(DataResponse { data: updates }))
}
