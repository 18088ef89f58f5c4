use std::collections::HashMap;

use sitepulse_core::types::UserId;
use sitepulse_tracker::{AuthSession, AuthSubscription, CurrentUser};
use tokio::sync::RwLock;

struct UserStream {
    session: AuthSession,
    /// Issued-at cutoff set by logout; older tokens are refused.
    signed_out_at: Option<i64>,
}

impl UserStream {
    fn empty() -> Self {
        Self {
            session: AuthSession::new(None),
            signed_out_at: None,
        }
    }
}

/// One current-user stream per user id.
///
/// Every authenticated request publishes its user; logout publishes "no
/// user" and refuses tokens issued at or before that moment. Chat sessions
/// subscribe to their owner's stream.
pub struct AuthHub {
    streams: RwLock<HashMap<UserId, UserStream>>,
}

impl AuthHub {
    pub fn new() -> Self {
        Self {
            streams: RwLock::new(HashMap::new()),
        }
    }

    /// Publish `user` for a token issued at `issued_at`.
    ///
    /// Returns `false` (and publishes nothing) if the token predates the
    /// user's last logout.
    pub async fn sign_in(&self, user: &CurrentUser, issued_at: i64) -> bool {
        let mut streams = self.streams.write().await;
        let stream = streams.entry(user.id.clone()).or_insert_with(UserStream::empty);
        if stream.signed_out_at.is_some_and(|cutoff| issued_at <= cutoff) {
            return false;
        }
        stream.session.publish(Some(user.clone()));
        true
    }

    /// Publish "no user" on the stream and revoke tokens issued up to now.
    ///
    /// The cutoff has one-second granularity: token `iat` is whole seconds,
    /// so a token issued in the same second as the logout is refused too.
    pub async fn sign_out(&self, user_id: &str) {
        let now = chrono::Utc::now().timestamp();
        let mut streams = self.streams.write().await;
        let stream = streams.entry(user_id.to_string()).or_insert_with(UserStream::empty);
        stream.signed_out_at = Some(now);
        stream.session.publish(None);
        tracing::info!(%user_id, subscribers = stream.session.subscriber_count(), "User signed out");
    }

    /// Subscribe to `user_id`'s stream, creating an empty one if needed.
    pub async fn subscribe(&self, user_id: &str) -> AuthSubscription {
        let mut streams = self.streams.write().await;
        streams
            .entry(user_id.to_string())
            .or_insert_with(UserStream::empty)
            .session
            .subscribe()
    }
}

impl Default for AuthHub {
    fn default() -> Self {
        Self::new()
    }
}
