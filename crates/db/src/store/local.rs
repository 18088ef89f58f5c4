use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sitepulse_core::types::{new_id, DbId, Timestamp};
use tokio::sync::Mutex;

use super::{RecordStore, StoreError};
use crate::models::project::{CreateProject, Project};
use crate::models::project_analysis::{CreateProjectAnalysis, ProjectAnalysis};
use crate::models::status_update::{CreateStatusUpdate, StatusUpdate};

/// On-disk layout: each collection is one JSON array under a fixed key.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Document {
    #[serde(default)]
    projects: Vec<Project>,
    #[serde(default, rename = "projectAnalysis")]
    project_analysis: Vec<ProjectAnalysis>,
    #[serde(default, rename = "statusUpdates")]
    status_updates: Vec<StatusUpdate>,
}

/// [`RecordStore`] persisted as a single JSON file.
///
/// Every operation reads the whole document and writes it back under one
/// process-wide lock. Writes go to a sibling temp file first and are renamed
/// into place. Not meant to be shared between processes.
pub struct LocalStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl LocalStore {
    /// Open (or lazily create) the store at `path`, creating parent directories.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(Self {
            path,
            lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Document, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(Document::default()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Document::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, doc: &Document) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(doc)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

fn newest_first(projects: &mut [Project]) {
    projects.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}

#[async_trait]
impl RecordStore for LocalStore {
    fn backend(&self) -> &'static str {
        "local"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        self.load().await.map(|_| ())
    }

    async fn create_project(&self, input: &CreateProject) -> Result<Project, StoreError> {
        let _guard = self.lock.lock().await;
        let mut doc = self.load().await?;
        if doc.projects.iter().any(|p| p.id == input.id) {
            return Err(StoreError::Conflict(format!(
                "project {} already exists",
                input.id
            )));
        }
        let project = Project {
            id: input.id,
            owner_id: input.owner_id.clone(),
            name: input.name.clone(),
            description: input.description.clone(),
            tracking_focus_areas: input.tracking_focus_areas.clone(),
            schedule_file_name: input.schedule_file_name.clone(),
            schedule_file_url: input.schedule_file_url.clone(),
            contractor_link: input.contractor_link.clone(),
            updates_count: 0,
            last_update: None,
            created_at: Utc::now(),
        };
        doc.projects.push(project.clone());
        self.save(&doc).await?;
        Ok(project)
    }

    async fn find_project(&self, id: DbId) -> Result<Option<Project>, StoreError> {
        let _guard = self.lock.lock().await;
        let doc = self.load().await?;
        Ok(doc.projects.into_iter().find(|p| p.id == id))
    }

    async fn list_projects(&self, owner_id: Option<&str>) -> Result<Vec<Project>, StoreError> {
        let _guard = self.lock.lock().await;
        let doc = self.load().await?;
        let mut projects: Vec<Project> = doc
            .projects
            .into_iter()
            .filter(|p| owner_id.map_or(true, |owner| p.owner_id == owner))
            .collect();
        newest_first(&mut projects);
        Ok(projects)
    }

    async fn record_project_update(
        &self,
        id: DbId,
        at: Timestamp,
    ) -> Result<Option<Project>, StoreError> {
        let _guard = self.lock.lock().await;
        let mut doc = self.load().await?;
        let Some(project) = doc.projects.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        project.updates_count += 1;
        project.last_update = Some(at);
        let updated = project.clone();
        self.save(&doc).await?;
        Ok(Some(updated))
    }

    async fn create_analysis(
        &self,
        input: &CreateProjectAnalysis,
    ) -> Result<ProjectAnalysis, StoreError> {
        let _guard = self.lock.lock().await;
        let mut doc = self.load().await?;
        if !doc.projects.iter().any(|p| p.id == input.project_id) {
            return Err(StoreError::MissingProject(input.project_id));
        }
        if doc
            .project_analysis
            .iter()
            .any(|a| a.project_id == input.project_id)
        {
            return Err(StoreError::Conflict(format!(
                "project {} already has a schedule analysis",
                input.project_id
            )));
        }
        let analysis = ProjectAnalysis {
            id: new_id(),
            project_id: input.project_id,
            schedule_analysis: input.schedule_analysis.clone(),
            created_at: Utc::now(),
        };
        doc.project_analysis.push(analysis.clone());
        self.save(&doc).await?;
        Ok(analysis)
    }

    async fn find_analysis(&self, project_id: DbId) -> Result<Option<ProjectAnalysis>, StoreError> {
        let _guard = self.lock.lock().await;
        let doc = self.load().await?;
        Ok(doc
            .project_analysis
            .into_iter()
            .find(|a| a.project_id == project_id))
    }

    async fn create_status_update(
        &self,
        input: &CreateStatusUpdate,
    ) -> Result<StatusUpdate, StoreError> {
        let _guard = self.lock.lock().await;
        let mut doc = self.load().await?;
        if !doc.projects.iter().any(|p| p.id == input.project_id) {
            return Err(StoreError::MissingProject(input.project_id));
        }
        let update = StatusUpdate {
            id: new_id(),
            project_id: input.project_id,
            user_id: input.user_id.clone(),
            message: input.message.clone(),
            reply: input.reply.clone(),
            created_at: input.created_at,
        };
        doc.status_updates.push(update.clone());
        self.save(&doc).await?;
        Ok(update)
    }

    async fn list_status_updates(&self, project_id: DbId) -> Result<Vec<StatusUpdate>, StoreError> {
        let _guard = self.lock.lock().await;
        let doc = self.load().await?;
        let mut updates: Vec<StatusUpdate> = doc
            .status_updates
            .into_iter()
            .filter(|u| u.project_id == project_id)
            .collect();
        updates.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(updates)
    }
}
