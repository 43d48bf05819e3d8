// src/session.rs
//! Immutable session snapshots and the process-wide session holder

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Identity of the signed-in user. Every store call is scoped by `user_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub email: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn new(user_id: &str, email: &str, expires_at: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.to_string(),
            email: email.to_string(),
            expires_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// The auth check has not completed yet.
    Loading,
    SignedOut,
    SignedIn(Arc<Session>),
}

impl SessionState {
    pub fn session(&self) -> Option<Arc<Session>> {
        match self {
            SessionState::SignedIn(session) => Some(Arc::clone(session)),
            _ => None,
        }
    }
}

/// Holder of the current session. Consumers take snapshots with
/// [`SessionContext::current`] or follow changes through
/// [`SessionContext::subscribe`].
pub struct SessionContext {
    tx: watch::Sender<SessionState>,
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionContext {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(SessionState::Loading);
        Self { tx }
    }

    pub fn sign_in(&self, session: Session) {
        self.tx.send_replace(SessionState::SignedIn(Arc::new(session)));
    }

    pub fn sign_out(&self) {
        self.tx.send_replace(SessionState::SignedOut);
    }

    pub fn current(&self) -> SessionState {
        self.tx.borrow().clone()
    }

    pub fn session(&self) -> Option<Arc<Session>> {
        self.current().session()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.tx.subscribe()
    }

    /// Wait until the state leaves `Loading`. On timeout the state is
    /// returned as-is, so callers see `Loading` instead of a signed-out view.
    pub async fn wait_until_resolved(&self, timeout: Duration) -> SessionState {
        let mut rx = self.subscribe();
        let waited = tokio::time::timeout(
            timeout,
            rx.wait_for(|state| !matches!(state, SessionState::Loading)),
        )
        .await;

        match waited {
            Ok(Ok(state)) => (*state).clone(),
            _ => self.current(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    fn session() -> Session {
        Session::new("user-1", "ada@example.com", Utc::now() + ChronoDuration::hours(1))
    }

    #[test]
    fn test_starts_loading_without_session() {
        let ctx = SessionContext::new();
        assert_eq!(ctx.current(), SessionState::Loading);
        assert!(ctx.session().is_none());
    }

    #[test]
    fn test_snapshots_are_immutable_after_sign_out() {
        let ctx = SessionContext::new();
        ctx.sign_in(session());
        let snapshot = ctx.session().unwrap();
        ctx.sign_out();

        assert_eq!(snapshot.user_id, "user-1");
        assert_eq!(ctx.current(), SessionState::SignedOut);
    }

    #[tokio::test]
    async fn test_timeout_reports_loading_not_signed_out() {
        let ctx = SessionContext::new();
        let state = ctx.wait_until_resolved(Duration::from_millis(20)).await;
        assert_eq!(state, SessionState::Loading);
    }

    #[tokio::test]
    async fn test_wait_sees_sign_in_from_another_task() {
        let ctx = Arc::new(SessionContext::new());
        let publisher = Arc::clone(&ctx);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            publisher.sign_in(session());
        });

        let state = ctx.wait_until_resolved(Duration::from_secs(2)).await;
        assert_eq!(state.session().unwrap().email, "ada@example.com");
    }
}
