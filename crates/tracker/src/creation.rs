//! Project creation: optional schedule upload, project record, and a
//! one-off schedule analysis.

use chrono::Utc;
use serde::Serialize;
use sitepulse_ai::GenerationRequest;
use sitepulse_cloud::StorageError;
use sitepulse_core::error::CoreError;
use sitepulse_core::project::{contractor_link, ProjectDraft};
use sitepulse_core::prompt;
use sitepulse_core::schedule::{storage_path, ScheduleFile};
use sitepulse_core::types::new_id;
use sitepulse_db::models::project::{CreateProject, Project};
use sitepulse_db::models::project_analysis::{CreateProjectAnalysis, ProjectAnalysis};
use sitepulse_db::StoreError;

use crate::auth::CurrentUser;
use crate::{Collaborators, GenerationSettings};

#[derive(Debug, thiserror::Error)]
pub enum CreateProjectError {
    #[error(transparent)]
    Invalid(#[from] CoreError),

    #[error("Schedule upload failed: {0}")]
    Upload(#[from] StorageError),

    #[error("Failed to save project: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatedProject {
    pub project: Project,
    /// Present only when a schedule was uploaded and its analysis was stored.
    pub analysis: Option<ProjectAnalysis>,
}

pub struct ProjectCreator {
    collaborators: Collaborators,
    generation: GenerationSettings,
    public_base_url: String,
}

impl ProjectCreator {
    pub fn new(
        collaborators: Collaborators,
        generation: GenerationSettings,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            collaborators,
            generation,
            public_base_url: public_base_url.into(),
        }
    }

    /// Create a project owned by `owner`.
    ///
    /// The schedule (if any) is uploaded before the project row is written,
    /// so a failed write leaves an orphaned object behind. Analysis is best
    /// effort and never fails the creation.
    pub async fn create(
        &self,
        owner: &CurrentUser,
        draft: ProjectDraft,
        schedule: Option<ScheduleFile>,
    ) -> Result<CreatedProject, CreateProjectError> {
        let draft = draft.normalized()?;

        let uploaded = match schedule {
            Some(file) => {
                let path = storage_path(&file.file_name, Utc::now());
                tracing::debug!(%path, size = file.size(), "Uploading schedule");
                let stored = self
                    .collaborators
                    .storage
                    .upload(file.bytes, &path, true)
                    .await?;
                Some((file.file_name, stored))
            }
            None => None,
        };

        let id = new_id();
        let input = CreateProject {
            id,
            owner_id: owner.id.clone(),
            name: draft.name.clone(),
            description: draft.description.clone(),
            tracking_focus_areas: draft.tracking_focus_areas.clone(),
            schedule_file_name: uploaded.as_ref().map(|(name, _)| name.clone()),
            schedule_file_url: uploaded.as_ref().map(|(_, obj)| obj.public_url.clone()),
            contractor_link: contractor_link(&self.public_base_url, id),
        };

        let project = match self.collaborators.store.create_project(&input).await {
            Ok(project) => project,
            Err(e) => {
                if let Some((_, obj)) = &uploaded {
                    tracing::error!(path = %obj.path, error = %e, "Project save failed after upload, object orphaned");
                }
                return Err(e.into());
            }
        };
        tracing::info!(project_id = %project.id, owner_id = %owner.id, "Project created");

        let analysis = if uploaded.is_some() {
            self.analyze_schedule(&project).await
        } else {
            None
        };

        Ok(CreatedProject { project, analysis })
    }

    async fn analyze_schedule(&self, project: &Project) -> Option<ProjectAnalysis> {
        let request = GenerationRequest {
            prompt: prompt::schedule_analysis_prompt(
                &project.name,
                &project.description,
                &project.tracking_focus_areas,
            ),
            model: self.generation.model.clone(),
            max_tokens: self.generation.analysis_max_tokens,
        };
        let text = match self.collaborators.generator.generate(request).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(project_id = %project.id, error = %e, "Schedule analysis generation failed");
                return None;
            }
        };

        let input = CreateProjectAnalysis {
            project_id: project.id,
            schedule_analysis: text,
        };
        match self.collaborators.store.create_analysis(&input).await {
            Ok(analysis) => Some(analysis),
            Err(e) => {
                tracing::warn!(project_id = %project.id, error = %e, "Failed to store schedule analysis");
                None
            }
        }
    }
}
