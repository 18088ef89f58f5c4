#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sitepulse_ai::{GenerationError, GenerationRequest, TextGenerator};
use sitepulse_cloud::{ObjectStore, StorageError, StoredObject};
use sitepulse_core::types::{DbId, Timestamp};
use sitepulse_db::models::project::{CreateProject, Project};
use sitepulse_db::models::project_analysis::{CreateProjectAnalysis, ProjectAnalysis};
use sitepulse_db::models::status_update::{CreateStatusUpdate, StatusUpdate};
use sitepulse_db::{LocalStore, RecordStore, StoreError};
use sitepulse_tracker::{Collaborators, GenerationSettings, PersistPolicy};
use tokio::sync::Semaphore;

// ---------------------------------------------------------------------------
// Text generation doubles
// ---------------------------------------------------------------------------

/// Replies from a queue (or echoes when empty) and records every request.
///
/// With a gate installed, each call waits for one permit before answering.
#[derive(Default)]
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<Result<String, String>>>,
    requests: Mutex<Vec<GenerationRequest>>,
    gate: Option<Arc<Semaphore>>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replying(replies: &[&str]) -> Self {
        let generator = Self::new();
        for reply in replies {
            generator.push_reply(reply);
        }
        generator
    }

    pub fn gated(gate: Arc<Semaphore>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    pub fn push_reply(&self, reply: &str) {
        self.replies.lock().unwrap().push_back(Ok(reply.to_string()));
    }

    pub fn push_failure(&self, message: &str) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.prompt).collect()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
        let next = self.replies.lock().unwrap().pop_front();
        match next {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => Err(GenerationError::Other(message)),
            None => Ok(format!("ack {}", request.prompt.len())),
        }
    }
}

/// Always fails with a provider error.
pub struct FailingGenerator;

#[async_trait]
impl TextGenerator for FailingGenerator {
    async fn generate(&self, _request: GenerationRequest) -> Result<String, GenerationError> {
        Err(GenerationError::ApiError {
            status: 503,
            body: "unavailable".to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Storage double
// ---------------------------------------------------------------------------

/// Accepts every upload in memory and counts them.
#[derive(Default)]
pub struct RecordingStorage {
    uploads: Mutex<Vec<(String, usize, bool)>>,
    fail: bool,
}

impl RecordingStorage {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// `(path, size, overwrite)` per call.
    pub fn uploads(&self) -> Vec<(String, usize, bool)> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStore for RecordingStorage {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        path: &str,
        overwrite: bool,
    ) -> Result<StoredObject, StorageError> {
        self.uploads
            .lock()
            .unwrap()
            .push((path.to_string(), bytes.len(), overwrite));
        if self.fail {
            return Err(StorageError::S3("bucket unavailable".to_string()));
        }
        Ok(StoredObject {
            path: path.to_string(),
            public_url: format!("https://files.test/{path}"),
        })
    }
}

// ---------------------------------------------------------------------------
// Store double
// ---------------------------------------------------------------------------

/// Wraps a [`LocalStore`], counting calls and optionally failing the
/// post-turn writes a fixed number of times.
pub struct FlakyStore {
    inner: LocalStore,
    calls: AtomicUsize,
    status_update_failures: AtomicUsize,
    counter_failures: AtomicUsize,
    fail_analysis: bool,
}

impl FlakyStore {
    pub fn new(inner: LocalStore) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
            status_update_failures: AtomicUsize::new(0),
            counter_failures: AtomicUsize::new(0),
            fail_analysis: false,
        }
    }

    pub fn failing_analysis(mut self) -> Self {
        self.fail_analysis = true;
        self
    }

    pub fn fail_status_updates(&self, times: usize) {
        self.status_update_failures.store(times, Ordering::SeqCst);
    }

    pub fn fail_counter(&self, times: usize) {
        self.counter_failures.store(times, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn take_failure(counter: &AtomicUsize) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

fn injected() -> StoreError {
    StoreError::Io(std::io::Error::other("injected failure"))
}

#[async_trait]
impl RecordStore for FlakyStore {
    fn backend(&self) -> &'static str {
        "flaky"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.inner.ping().await
    }

    async fn create_project(&self, input: &CreateProject) -> Result<Project, StoreError> {
        self.hit();
        self.inner.create_project(input).await
    }

    async fn find_project(&self, id: DbId) -> Result<Option<Project>, StoreError> {
        self.hit();
        self.inner.find_project(id).await
    }

    async fn list_projects(&self, owner_id: Option<&str>) -> Result<Vec<Project>, StoreError> {
        self.hit();
        self.inner.list_projects(owner_id).await
    }

    async fn record_project_update(
        &self,
        id: DbId,
        at: Timestamp,
    ) -> Result<Option<Project>, StoreError> {
        self.hit();
        if Self::take_failure(&self.counter_failures) {
            return Err(injected());
        }
        self.inner.record_project_update(id, at).await
    }

    async fn create_analysis(
        &self,
        input: &CreateProjectAnalysis,
    ) -> Result<ProjectAnalysis, StoreError> {
        self.hit();
        if self.fail_analysis {
            return Err(injected());
        }
        self.inner.create_analysis(input).await
    }

    async fn find_analysis(&self, project_id: DbId) -> Result<Option<ProjectAnalysis>, StoreError> {
        self.hit();
        self.inner.find_analysis(project_id).await
    }

    async fn create_status_update(
        &self,
        input: &CreateStatusUpdate,
    ) -> Result<StatusUpdate, StoreError> {
        self.hit();
        if Self::take_failure(&self.status_update_failures) {
            return Err(injected());
        }
        self.inner.create_status_update(input).await
    }

    async fn list_status_updates(&self, project_id: DbId) -> Result<Vec<StatusUpdate>, StoreError> {
        self.hit();
        self.inner.list_status_updates(project_id).await
    }
}

// ---------------------------------------------------------------------------
// Wiring
// ---------------------------------------------------------------------------

/// A local store in a fresh temp directory. Keep the `TempDir` alive.
pub async fn local_store() -> (tempfile::TempDir, LocalStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::open(dir.path().join("store.json")).await.unwrap();
    (dir, store)
}

pub fn collaborators(
    store: Arc<dyn RecordStore>,
    storage: Arc<dyn ObjectStore>,
    generator: Arc<dyn TextGenerator>,
) -> Collaborators {
    Collaborators {
        store,
        storage,
        generator,
    }
}

pub fn settings() -> GenerationSettings {
    GenerationSettings::default()
}

pub fn fast_retries(attempts: u32) -> PersistPolicy {
    PersistPolicy::with_attempts(attempts, std::time::Duration::from_millis(1))
}

/// Insert a project straight into the store.
pub async fn seed_project(store: &dyn RecordStore, owner: &str, name: &str) -> Project {
    let id = sitepulse_core::types::new_id();
    store
        .create_project(&CreateProject {
            id,
            owner_id: owner.to_string(),
            name: name.to_string(),
            description: format!("{name} description"),
            tracking_focus_areas: "percent complete, blockers".to_string(),
            schedule_file_name: None,
            schedule_file_url: None,
            contractor_link: format!("http://localhost:5173/chat/{id}"),
        })
        .await
        .unwrap()
}
