//! Current-user stream.
//!
//! The external auth provider owns login and logout. This module only models
//! "who is signed in right now" as a watch channel: publishers overwrite the
//! value (last write wins) and every subscriber sees the latest one.
//! Dropping an [`AuthSubscription`] unsubscribes.

use serde::Serialize;
use sitepulse_core::types::UserId;
use tokio::sync::watch;

/// Identity of the signed-in user as reported by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub email: Option<String>,
}

impl CurrentUser {
    pub fn new(id: impl Into<UserId>) -> Self {
        Self {
            id: id.into(),
            email: None,
        }
    }
}

/// Publisher side of one user's session stream.
#[derive(Debug)]
pub struct AuthSession {
    tx: watch::Sender<Option<CurrentUser>>,
}

impl AuthSession {
    pub fn new(initial: Option<CurrentUser>) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// Replace the current user. Subscribers are notified only when the value
    /// actually changes.
    pub fn publish(&self, user: Option<CurrentUser>) {
        self.tx.send_if_modified(|current| {
            if *current == user {
                false
            } else {
                *current = user;
                true
            }
        });
    }

    pub fn current(&self) -> Option<CurrentUser> {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> AuthSubscription {
        AuthSubscription {
            rx: self.tx.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// Subscriber side: reads the latest published user.
#[derive(Debug, Clone)]
pub struct AuthSubscription {
    rx: watch::Receiver<Option<CurrentUser>>,
}

impl AuthSubscription {
    /// A subscription that never changes, for callers without a live session.
    pub fn fixed(user: Option<CurrentUser>) -> Self {
        let (_tx, rx) = watch::channel(user);
        Self { rx }
    }

    pub fn current(&self) -> Option<CurrentUser> {
        self.rx.borrow().clone()
    }

    /// Wait for the next change. Returns `None` once the publisher is gone.
    pub async fn changed(&mut self) -> Option<Option<CurrentUser>> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn last_write_wins() {
        let session = AuthSession::new(None);
        let mut sub = session.subscribe();
        assert_eq!(sub.current(), None);

        session.publish(Some(CurrentUser::new("a")));
        session.publish(None);
        session.publish(Some(CurrentUser::new("b")));

        assert_eq!(sub.changed().await, Some(Some(CurrentUser::new("b"))));
        assert_eq!(sub.current(), Some(CurrentUser::new("b")));
    }

    #[tokio::test]
    async fn republishing_same_user_does_not_notify() {
        let session = AuthSession::new(Some(CurrentUser::new("a")));
        let mut sub = session.subscribe();
        session.publish(Some(CurrentUser::new("a")));
        let waited =
            tokio::time::timeout(std::time::Duration::from_millis(20), sub.changed()).await;
        assert!(waited.is_err());
    }

    #[tokio::test]
    async fn dropping_subscription_unsubscribes() {
        let session = AuthSession::new(None);
        let sub = session.subscribe();
        assert_eq!(session.subscriber_count(), 1);
        drop(sub);
        assert_eq!(session.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn changed_ends_when_publisher_dropped() {
        let session = AuthSession::new(Some(CurrentUser::new("a")));
        let mut sub = session.subscribe();
        drop(session);
        assert_eq!(sub.changed().await, None);
        assert_eq!(sub.current(), Some(CurrentUser::new("a")));
    }

    #[test]
    fn fixed_subscription_keeps_value() {
        let sub = AuthSubscription::fixed(Some(CurrentUser::new("x")));
        assert_eq!(sub.current().map(|u| u.id), Some("x".to_string()));
    }
}
