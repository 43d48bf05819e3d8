// src/board/controller.rs
//! Board intents (add, move, delete) for one session. Every mutation is
//! followed by a full re-fetch; nothing is patched in place.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use super::builder::{build_board, Column};
use super::transitions::is_allowed;
use graflog::app_log;
use crate::applications::{ApplicationDataClient, Notification, Notifier};
use crate::session::Session;
use crate::types::{ApplicationStatus, NewApplication};

const PENDING_DELETION_TTL_MINUTES: i64 = 5;

/// A delete awaiting the user's confirm/cancel answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingDeletion {
    pub token: Uuid,
    pub application_id: String,
    #[serde(skip)]
    pub user_id: String,
    pub company: String,
    pub position: String,
    pub expires_at: DateTime<Utc>,
}

/// Outstanding delete confirmations, shared across requests.
pub struct DeletionGate {
    pending: Mutex<HashMap<Uuid, PendingDeletion>>,
    ttl: Duration,
}

impl Default for DeletionGate {
    fn default() -> Self {
        Self::new()
    }
}

impl DeletionGate {
    pub fn new() -> Self {
        Self::with_ttl(Duration::minutes(PENDING_DELETION_TTL_MINUTES))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, PendingDeletion>> {
        match self.pending.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn register(
        &self,
        user_id: &str,
        application_id: &str,
        company: &str,
        position: &str,
        now: DateTime<Utc>,
    ) -> PendingDeletion {
        let pending = PendingDeletion {
            token: Uuid::new_v4(),
            application_id: application_id.to_string(),
            user_id: user_id.to_string(),
            company: company.to_string(),
            position: position.to_string(),
            expires_at: now + self.ttl,
        };

        let mut map = self.lock();
        map.retain(|_, p| p.expires_at > now);
        map.insert(pending.token, pending.clone());
        pending
    }

    /// Remove and return the confirmation if it belongs to `user_id` and has
    /// not expired. Tokens of other users are left in place.
    pub fn take(&self, token: Uuid, user_id: &str, now: DateTime<Utc>) -> Option<PendingDeletion> {
        let mut map = self.lock();
        match map.get(&token) {
            Some(p) if p.user_id != user_id => None,
            Some(p) if p.expires_at <= now => {
                map.remove(&token);
                None
            }
            Some(_) => map.remove(&token),
            None => None,
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteOutcome {
    Deleted,
    /// Unknown, expired or foreign token.
    NoPendingRequest,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteResult {
    pub outcome: DeleteOutcome,
    pub columns: Vec<Column>,
}

pub struct BoardController<'a> {
    client: ApplicationDataClient<'a>,
    notifier: &'a dyn Notifier,
    session: &'a Session,
    gate: &'a DeletionGate,
}

impl<'a> BoardController<'a> {
    pub fn new(
        pool: &'a SqlitePool,
        notifier: &'a dyn Notifier,
        session: &'a Session,
        gate: &'a DeletionGate,
    ) -> Self {
        Self {
            client: ApplicationDataClient::new(pool, notifier),
            notifier,
            session,
            gate,
        }
    }

    pub async fn refresh(&self) -> Vec<Column> {
        let applications = self.client.fetch(self.session).await;
        build_board(&applications, Utc::now())
    }

    /// Add a card to the column the user clicked.
    pub async fn add_card(&self, column: ApplicationStatus, new: NewApplication) -> Vec<Column> {
        self.client.create(self.session, new.with_status(column)).await;
        self.refresh().await
    }

    pub async fn move_card(&self, id: &str, to: ApplicationStatus) -> Vec<Column> {
        let applications = self.client.fetch(self.session).await;
        let Some(current) = applications.iter().find(|a| a.id == id) else {
            self.notifier
                .notify(Notification::error("Application not found"));
            return build_board(&applications, Utc::now());
        };

        match current.known_status() {
            Some(from) if from == to => {
                app_log!(debug, "Application {} already in {}", id, to);
            }
            Some(from) if !is_allowed(from, to) => {
                self.notifier.notify(Notification::error(format!(
                    "Cannot move from {} to {}",
                    from.title(),
                    to.title()
                )));
            }
            _ => {
                self.client.update_status(self.session, id, to).await;
            }
        }

        self.refresh().await
    }

    /// First step of a delete: nothing is removed until the returned token is
    /// confirmed.
    pub async fn request_delete(&self, id: &str) -> Option<PendingDeletion> {
        let applications = self.client.fetch(self.session).await;
        let Some(application) = applications.iter().find(|a| a.id == id) else {
            self.notifier
                .notify(Notification::error("Application not found"));
            return None;
        };

        let pending = self.gate.register(
            &self.session.user_id,
            &application.id,
            &application.company,
            &application.position,
            Utc::now(),
        );
        app_log!(
            info,
            "Delete of {} requested by {} (token {})",
            id,
            self.session.email,
            pending.token
        );
        Some(pending)
    }

    pub fn cancel_delete(&self, token: Uuid) -> bool {
        let cancelled = self
            .gate
            .take(token, &self.session.user_id, Utc::now())
            .is_some();
        if cancelled {
            app_log!(info, "Delete cancelled by {}", self.session.email);
        }
        cancelled
    }

    pub async fn confirm_delete(&self, token: Uuid) -> DeleteResult {
        let outcome = match self.gate.take(token, &self.session.user_id, Utc::now()) {
            Some(pending) => {
                if self
                    .client
                    .delete(self.session, &pending.application_id)
                    .await
                {
                    DeleteOutcome::Deleted
                } else {
                    DeleteOutcome::Failed
                }
            }
            None => {
                self.notifier.notify(Notification::error(
                    "Delete confirmation expired or unknown",
                ));
                DeleteOutcome::NoPendingRequest
            }
        };

        DeleteResult {
            outcome,
            columns: self.refresh().await,
        }
    }
}
