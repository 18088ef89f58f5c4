//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods
//! that accept `&PgPool` as the first argument.

pub mod project_analysis_repo;
pub mod project_repo;
pub mod status_update_repo;

pub use project_analysis_repo::ProjectAnalysisRepo;
pub use project_repo::ProjectRepo;
pub use status_update_repo::StatusUpdateRepo;
