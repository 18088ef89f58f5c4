//! Contractor chat session for one project.
//!
//! A session owns an in-memory [`Transcript`]. Each accepted submission
//! appends the contractor's message, asks the text generator for a reply
//! (falling back to a fixed apology on failure), appends the reply, and then
//! records the turn as a status update. The transcript is authoritative for
//! display; the persisted status updates are an audit trail that may lag or
//! miss turns when the store misbehaves.

use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use sitepulse_ai::GenerationRequest;
use sitepulse_core::prompt::{self, ProjectContext};
use sitepulse_core::transcript::{Message, Role, Transcript};
use sitepulse_core::types::{DbId, Timestamp};
use sitepulse_db::models::project::Project;
use sitepulse_db::models::project_analysis::ProjectAnalysis;
use sitepulse_db::models::status_update::CreateStatusUpdate;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::auth::{AuthSubscription, CurrentUser};
use crate::persist::PersistPolicy;
use crate::{Collaborators, GenerationSettings};

/// Externally visible session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Uninitialized,
    Loading,
    Ready,
    /// A submission is waiting on the text generator.
    AwaitingGeneration,
    NotFound,
    Unauthenticated,
}

/// Whether a session starts from the greeting alone or replays the caller's
/// recorded turns after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryMode {
    #[default]
    Fresh,
    Replay,
}

/// Why a submission was dropped without touching the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoredReason {
    EmptyMessage,
    InFlight,
    Unauthenticated,
    NotReady,
}

/// Which of the two post-turn writes went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PersistenceReport {
    pub status_update_saved: bool,
    pub counter_updated: bool,
}

/// Result of an accepted submission.
#[derive(Debug, Clone, Serialize)]
pub struct TurnOutcome {
    pub user_message: Message,
    pub reply: Message,
    /// `true` when the reply is the fixed fallback because generation failed.
    pub fell_back: bool,
    pub persistence: PersistenceReport,
}

#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    Completed(TurnOutcome),
    Ignored(IgnoredReason),
}

/// Load phase; `AwaitingGeneration` is derived from the in-flight flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Uninitialized,
    Loading,
    Ready,
    NotFound,
    Unauthenticated,
}

/// Clears the in-flight flag when dropped, including on cancellation.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn claim(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct ConversationSession {
    id: Uuid,
    collaborators: Collaborators,
    generation: GenerationSettings,
    persist: PersistPolicy,
    auth: AuthSubscription,
    phase: Phase,
    project: Option<Project>,
    analysis: Option<ProjectAnalysis>,
    transcript: Mutex<Transcript>,
    in_flight: AtomicBool,
}

impl ConversationSession {
    /// Create an uninitialized session bound to an auth stream.
    pub fn new(
        collaborators: Collaborators,
        generation: GenerationSettings,
        persist: PersistPolicy,
        auth: AuthSubscription,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            collaborators,
            generation,
            persist,
            auth,
            phase: Phase::Uninitialized,
            project: None,
            analysis: None,
            transcript: Mutex::new(Transcript::new()),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Create and initialize in one step.
    pub async fn open(
        collaborators: Collaborators,
        generation: GenerationSettings,
        persist: PersistPolicy,
        auth: AuthSubscription,
        project_id: DbId,
        mode: HistoryMode,
    ) -> Self {
        let mut session = Self::new(collaborators, generation, persist, auth);
        session.initialize(project_id, mode).await;
        session
    }

    /// Load the project (and its schedule analysis) and reset the transcript
    /// to the greeting.
    ///
    /// Never fails: a missing user leaves the session `Unauthenticated`, an
    /// unknown or unreadable project leaves it `NotFound`, both with an
    /// empty transcript.
    pub async fn initialize(&mut self, project_id: DbId, mode: HistoryMode) {
        self.phase = Phase::Loading;
        self.project = None;
        self.analysis = None;
        *self.transcript.get_mut() = Transcript::new();

        let Some(user) = self.auth.current() else {
            tracing::info!(session_id = %self.id, %project_id, "No signed-in user, chat not started");
            self.phase = Phase::Unauthenticated;
            return;
        };

        let store = &self.collaborators.store;
        let project = match store.find_project(project_id).await {
            Ok(Some(project)) => project,
            Ok(None) => {
                tracing::info!(session_id = %self.id, %project_id, "Chat requested for unknown project");
                self.phase = Phase::NotFound;
                return;
            }
            Err(e) => {
                tracing::error!(session_id = %self.id, %project_id, error = %e, "Failed to load project for chat");
                self.phase = Phase::NotFound;
                return;
            }
        };

        self.analysis = match store.find_analysis(project_id).await {
            Ok(analysis) => analysis,
            Err(e) => {
                tracing::warn!(%project_id, error = %e, "Schedule analysis unavailable, continuing without it");
                None
            }
        };

        let mut transcript = Transcript::new();
        transcript.push(Message::assistant(prompt::greeting(&project.name)));
        if mode == HistoryMode::Replay {
            self.replay_into(&mut transcript, project_id, &user).await;
        }

        tracing::debug!(
            session_id = %self.id,
            %project_id,
            has_analysis = self.analysis.is_some(),
            entries = transcript.len(),
            "Chat session ready"
        );
        *self.transcript.get_mut() = transcript;
        self.project = Some(project);
        self.phase = Phase::Ready;
    }

    /// Append the caller's recorded turns, oldest first.
    async fn replay_into(&self, transcript: &mut Transcript, project_id: DbId, user: &CurrentUser) {
        match self.collaborators.store.list_status_updates(project_id).await {
            Ok(updates) => {
                for update in updates.into_iter().filter(|u| u.user_id == user.id) {
                    transcript.push(Message::at(Role::User, update.message, update.created_at));
                    transcript.push(Message::at(Role::Assistant, update.reply, update.created_at));
                }
            }
            Err(e) => {
                tracing::warn!(%project_id, error = %e, "Could not replay status updates, starting fresh");
            }
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn project(&self) -> Option<&Project> {
        self.project.as_ref()
    }

    pub fn has_schedule_analysis(&self) -> bool {
        self.analysis.is_some()
    }

    /// Current state, combining the load phase with the live auth stream and
    /// the in-flight flag.
    pub fn state(&self) -> SessionState {
        match self.phase {
            Phase::Uninitialized => SessionState::Uninitialized,
            Phase::Loading => SessionState::Loading,
            Phase::NotFound => SessionState::NotFound,
            Phase::Unauthenticated => SessionState::Unauthenticated,
            Phase::Ready if self.auth.current().is_none() => SessionState::Unauthenticated,
            Phase::Ready if self.in_flight.load(Ordering::Acquire) => {
                SessionState::AwaitingGeneration
            }
            Phase::Ready => SessionState::Ready,
        }
    }

    /// The user currently published on this session's auth stream.
    pub fn current_user(&self) -> Option<CurrentUser> {
        self.auth.current()
    }

    /// Snapshot of the transcript.
    pub async fn transcript(&self) -> Transcript {
        self.transcript.lock().await.clone()
    }

    /// Run one turn. See the module docs for the sequence.
    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        let text = text.trim();
        if text.is_empty() {
            return SubmitOutcome::Ignored(IgnoredReason::EmptyMessage);
        }
        let project = match (&self.phase, &self.project) {
            (Phase::Ready, Some(project)) => project,
            (Phase::Unauthenticated, _) => {
                return SubmitOutcome::Ignored(IgnoredReason::Unauthenticated)
            }
            _ => return SubmitOutcome::Ignored(IgnoredReason::NotReady),
        };
        let Some(user) = self.auth.current() else {
            return SubmitOutcome::Ignored(IgnoredReason::Unauthenticated);
        };
        let Some(guard) = InFlightGuard::claim(&self.in_flight) else {
            return SubmitOutcome::Ignored(IgnoredReason::InFlight);
        };

        let user_message = Message::user(text);
        let prompt = {
            let mut transcript = self.transcript.lock().await;
            let context = ProjectContext {
                name: &project.name,
                description: &project.description,
                tracking_focus_areas: &project.tracking_focus_areas,
                schedule_analysis: self.analysis.as_ref().map(|a| a.schedule_analysis.as_str()),
            };
            let prompt = prompt::chat_prompt(&context, transcript.context_window(), text);
            transcript.push(user_message.clone());
            prompt
        };

        let request = GenerationRequest {
            prompt,
            model: self.generation.model.clone(),
            max_tokens: self.generation.chat_max_tokens,
        };
        let (reply_text, fell_back) = match self.collaborators.generator.generate(request).await {
            Ok(text) => (text, false),
            Err(e) => {
                tracing::warn!(session_id = %self.id, project_id = %project.id, error = %e, "Generation failed, using fallback reply");
                (prompt::FALLBACK_REPLY.to_string(), true)
            }
        };

        let reply = Message::assistant(reply_text);
        self.transcript.lock().await.push(reply.clone());
        drop(guard);

        let persistence = self
            .persist_turn(project.id, &user, text, &reply.content, reply.timestamp)
            .await;

        SubmitOutcome::Completed(TurnOutcome {
            user_message,
            reply,
            fell_back,
            persistence,
        })
    }

    /// Record the turn and bump the project counter. The two writes are
    /// independent and run concurrently; failures are logged and reported,
    /// never raised.
    async fn persist_turn(
        &self,
        project_id: DbId,
        user: &CurrentUser,
        message: &str,
        reply: &str,
        at: Timestamp,
    ) -> PersistenceReport {
        let store = &self.collaborators.store;
        let record = CreateStatusUpdate {
            project_id,
            user_id: user.id.clone(),
            message: message.to_string(),
            reply: reply.to_string(),
            created_at: at,
        };

        let (saved, counted) = futures::join!(
            self.persist
                .run("status_update", || store.create_status_update(&record)),
            self.persist
                .run("update_counter", || store.record_project_update(project_id, at)),
        );

        let status_update_saved = match saved {
            Ok(_) => true,
            Err(e) => {
                tracing::error!(%project_id, user_id = %user.id, error = %e, "Failed to record status update");
                false
            }
        };
        let counter_updated = match counted {
            Ok(Some(_)) => true,
            Ok(None) => {
                tracing::warn!(%project_id, "Project disappeared before its update counter could be bumped");
                false
            }
            Err(e) => {
                tracing::error!(%project_id, error = %e, "Failed to bump project update counter");
                false
            }
        };

        PersistenceReport {
            status_update_saved,
            counter_updated,
        }
    }
}
