use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use sitepulse_cloud::StorageError;
use sitepulse_core::error::CoreError;
use sitepulse_db::StoreError;
use sitepulse_tracker::CreateProjectError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `sitepulse_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A record-store error from either backend.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The schedule upload was rejected by object storage.
    #[error("Upload failed: {0}")]
    Upload(#[from] StorageError),

    /// A chat submission is already waiting on generation.
    #[error("A message is already being processed for this session")]
    InFlight,

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<CreateProjectError> for AppError {
    fn from(err: CreateProjectError) -> Self {
        match err {
            CreateProjectError::Invalid(core) => AppError::Core(core),
            CreateProjectError::Upload(storage) => AppError::Upload(storage),
            CreateProjectError::Store(store) => AppError::Store(store),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
            },

            // --- Store errors ---
            AppError::Store(err) => classify_store_error(err),

            // --- Object storage ---
            AppError::Upload(StorageError::InvalidPath(path)) => (
                StatusCode::BAD_REQUEST,
                "BAD_REQUEST",
                format!("Invalid file name: {path}"),
            ),
            AppError::Upload(err) => {
                tracing::error!(error = %err, "Schedule upload failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "UPLOAD_FAILED",
                    "The schedule file could not be stored".to_string(),
                )
            }

            // --- HTTP-specific errors ---
            AppError::InFlight => (StatusCode::CONFLICT, "IN_FLIGHT", self.to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

fn classify_store_error(err: &StoreError) -> (StatusCode, &'static str, String) {
    match err {
        StoreError::Database(db) => classify_sqlx_error(db),
        StoreError::MissingProject(id) => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("Project with id {id} not found"),
        ),
        StoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
        StoreError::Io(_) | StoreError::Corrupt(_) => {
            tracing::error!(error = %err, "Local store error");
            internal()
        }
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`) map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if constraint.starts_with("uq_") {
                    return (
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        format!("Duplicate value violates unique constraint: {constraint}"),
                    );
                }
            }
            tracing::error!(error = %db_err, "Database error");
            internal()
        }
        other => {
            tracing::error!(error = %other, "Database error");
            internal()
        }
    }
}
