//! Live chat sessions, keyed by session id.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use sitepulse_core::error::CoreError;
use sitepulse_core::types::UserId;
use sitepulse_tracker::ConversationSession;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Interval between idle-session sweeps (in seconds).
const SWEEP_INTERVAL_SECS: u64 = 60;

struct ChatEntry {
    owner: UserId,
    session: Arc<ConversationSession>,
    last_access: Mutex<Instant>,
}

impl ChatEntry {
    fn touch(&self) {
        if let Ok(mut last) = self.last_access.lock() {
            *last = Instant::now();
        }
    }

    fn idle_for(&self) -> Duration {
        self.last_access
            .lock()
            .map(|last| last.elapsed())
            .unwrap_or_default()
    }
}

/// In-memory registry of open chat sessions.
///
/// Sessions live until closed, until their owner logs out, or until they sit
/// idle past the sweep threshold. Transcripts are never written back as a
/// whole.
pub struct ChatRegistry {
    sessions: RwLock<HashMap<Uuid, ChatEntry>>,
}

impl ChatRegistry {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Register a session owned by `owner` and return a shared handle.
    pub async fn insert(&self, owner: &str, session: ConversationSession) -> Arc<ConversationSession> {
        let session = Arc::new(session);
        self.sessions.write().await.insert(
            session.id(),
            ChatEntry {
                owner: owner.to_string(),
                session: Arc::clone(&session),
                last_access: Mutex::new(Instant::now()),
            },
        );
        session
    }

    /// Look up a session on behalf of `user_id`, marking it as used.
    pub async fn get(&self, id: Uuid, user_id: &str) -> Result<Arc<ConversationSession>, CoreError> {
        let sessions = self.sessions.read().await;
        let entry = sessions.get(&id).ok_or(CoreError::NotFound {
            entity: "ChatSession",
            id,
        })?;
        if entry.owner != user_id {
            return Err(CoreError::Forbidden(
                "Chat session belongs to another user".into(),
            ));
        }
        entry.touch();
        Ok(Arc::clone(&entry.session))
    }

    /// Close a session. Dropping it releases its auth subscription once
    /// in-flight requests finish.
    pub async fn remove(&self, id: Uuid, user_id: &str) -> Result<(), CoreError> {
        let mut sessions = self.sessions.write().await;
        match sessions.get(&id) {
            None => Err(CoreError::NotFound {
                entity: "ChatSession",
                id,
            }),
            Some(entry) if entry.owner != user_id => Err(CoreError::Forbidden(
                "Chat session belongs to another user".into(),
            )),
            Some(_) => {
                sessions.remove(&id);
                Ok(())
            }
        }
    }

    /// Drop every session owned by `user_id`. Returns how many were removed.
    pub async fn remove_user(&self, user_id: &str) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| entry.owner != user_id);
        before - sessions.len()
    }

    /// Drop sessions not used for at least `max_idle`. Returns how many were
    /// removed.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| entry.idle_for() < max_idle);
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

impl Default for ChatRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawn a background task that periodically evicts sessions idle for at
/// least `max_idle`.
///
/// The returned `JoinHandle` is aborted at shutdown.
pub fn start_idle_sweep(chats: Arc<ChatRegistry>, max_idle: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(SWEEP_INTERVAL_SECS));

        loop {
            interval.tick().await;
            let evicted = chats.evict_idle(max_idle).await;
            if evicted > 0 {
                let remaining = chats.len().await;
                tracing::info!(evicted, remaining, "Evicted idle chat sessions");
            } else {
                tracing::debug!("Chat session sweep found nothing idle");
            }
        }
    })
}
