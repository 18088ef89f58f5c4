//! Project-status tracking flows.
//!
//! - [`conversation`]: one contractor chat session per project, the core
//!   status-update pipeline.
//! - [`creation`]: project creation with optional schedule upload and
//!   one-off schedule analysis.
//! - [`dashboard`]: read-side listings and details.
//!
//! Flows never reach a collaborator through globals; they receive a
//! [`Collaborators`] handle built once at startup.

use std::sync::Arc;

use sitepulse_ai::TextGenerator;
use sitepulse_cloud::ObjectStore;
use sitepulse_db::RecordStore;

pub mod auth;
pub mod conversation;
pub mod creation;
pub mod dashboard;
pub mod persist;

pub use auth::{AuthSession, AuthSubscription, CurrentUser};
pub use conversation::{
    ConversationSession, HistoryMode, IgnoredReason, PersistenceReport, SessionState,
    SubmitOutcome, TurnOutcome,
};
pub use creation::{CreateProjectError, CreatedProject, ProjectCreator};
pub use dashboard::{ProjectDetails, ProjectListing};
pub use persist::PersistPolicy;

/// Explicitly constructed handles to every external collaborator.
///
/// Cheap to clone; dropping the last clone releases the underlying clients.
#[derive(Clone)]
pub struct Collaborators {
    pub store: Arc<dyn RecordStore>,
    pub storage: Arc<dyn ObjectStore>,
    pub generator: Arc<dyn TextGenerator>,
}

/// Model selection and token budgets for generation calls.
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub model: String,
    /// Budget for each chat reply.
    pub chat_max_tokens: Option<u32>,
    /// Budget for the one-off schedule analysis.
    pub analysis_max_tokens: Option<u32>,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            chat_max_tokens: Some(500),
            analysis_max_tokens: Some(1200),
        }
    }
}
