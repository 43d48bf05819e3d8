// src/applications/client.rs
//! Session-scoped CRUD over the application store with notification
//! semantics: every call is a single best-effort attempt, failures are
//! reported to the user and never escalate.

use sqlx::SqlitePool;

use super::notify::{Notification, Notifier};
use super::repository::{ApplicationRepository, ApplicationUpdate};
use graflog::app_log;
use crate::session::Session;
use crate::types::{ApplicationStatus, JobApplication, NewApplication};

pub struct ApplicationDataClient<'a> {
    repo: ApplicationRepository<'a>,
    notifier: &'a dyn Notifier,
}

impl<'a> ApplicationDataClient<'a> {
    pub fn new(pool: &'a SqlitePool, notifier: &'a dyn Notifier) -> Self {
        Self {
            repo: ApplicationRepository::new(pool),
            notifier,
        }
    }

    /// All applications of the session user, newest `applied_date` first.
    /// On failure the user is notified and an empty list is returned.
    pub async fn fetch(&self, session: &Session) -> Vec<JobApplication> {
        match self.repo.list_for_user(&session.user_id).await {
            Ok(applications) => {
                app_log!(
                    debug,
                    "Fetched {} applications for {}",
                    applications.len(),
                    session.email
                );
                applications
            }
            Err(e) => {
                app_log!(error, "Failed to fetch applications for {}: {}", session.email, e);
                self.notifier
                    .notify(Notification::error("Failed to load applications"));
                Vec::new()
            }
        }
    }

    pub async fn create(
        &self,
        session: &Session,
        new: NewApplication,
    ) -> Option<JobApplication> {
        if let Err(e) = new.validate() {
            self.notifier.notify(Notification::error(e.to_string()));
            return None;
        }

        match self.repo.insert(&session.user_id, new).await {
            Ok(application) => {
                app_log!(
                    info,
                    "Created application {} at {} for {}",
                    application.id,
                    application.company,
                    session.email
                );
                self.notifier.notify(Notification::success(format!(
                    "Added {} at {}",
                    application.position, application.company
                )));
                Some(application)
            }
            Err(e) => {
                app_log!(error, "Failed to create application: {}", e);
                self.notifier
                    .notify(Notification::error("Failed to add application"));
                None
            }
        }
    }

    pub async fn update_status(
        &self,
        session: &Session,
        id: &str,
        status: ApplicationStatus,
    ) -> bool {
        match self.repo.update_status(&session.user_id, id, status).await {
            Ok(true) => {
                app_log!(info, "Application {} moved to {}", id, status);
                self.notifier.notify(Notification::success(format!(
                    "Application moved to {}",
                    status.title()
                )));
                true
            }
            Ok(false) => {
                app_log!(warn, "Status update for unknown application {}", id);
                self.notifier
                    .notify(Notification::error("Application not found"));
                false
            }
            Err(e) => {
                app_log!(error, "Failed to update status of {}: {}", id, e);
                self.notifier
                    .notify(Notification::error("Failed to update application status"));
                false
            }
        }
    }

    pub async fn update_details(
        &self,
        session: &Session,
        id: &str,
        update: ApplicationUpdate,
    ) -> Option<JobApplication> {
        match self.repo.update_details(&session.user_id, id, update).await {
            Ok(Some(application)) => {
                self.notifier
                    .notify(Notification::success("Application updated"));
                Some(application)
            }
            Ok(None) => {
                self.notifier
                    .notify(Notification::error("Application not found"));
                None
            }
            Err(e) => {
                app_log!(error, "Failed to update application {}: {}", id, e);
                self.notifier.notify(Notification::error(format!(
                    "Failed to update application: {}",
                    e
                )));
                None
            }
        }
    }

    pub async fn delete(&self, session: &Session, id: &str) -> bool {
        match self.repo.delete(&session.user_id, id).await {
            Ok(true) => {
                app_log!(info, "Deleted application {} for {}", id, session.email);
                self.notifier
                    .notify(Notification::success("Application deleted"));
                true
            }
            Ok(false) => {
                self.notifier
                    .notify(Notification::error("Application not found"));
                false
            }
            Err(e) => {
                app_log!(error, "Failed to delete application {}: {}", id, e);
                self.notifier
                    .notify(Notification::error("Failed to delete application"));
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::applications::notify::{NotificationBuffer, NotificationLevel};
    use crate::core::Database;
    use chrono::{Duration, Utc};

    fn session() -> Session {
        Session::new("alice", "alice@example.com", Utc::now() + Duration::hours(1))
    }

    #[tokio::test]
    async fn test_fetch_fails_closed_with_error_notification() {
        let db = Database::in_memory().await.unwrap();
        let buffer = NotificationBuffer::new();
        let client = ApplicationDataClient::new(db.pool(), &buffer);

        db.pool().close().await;

        let apps = client.fetch(&session()).await;
        assert!(apps.is_empty());
        let notes = buffer.take();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].level, NotificationLevel::Error);
    }

    #[tokio::test]
    async fn test_status_update_notifies_success() {
        let db = Database::in_memory().await.unwrap();
        let buffer = NotificationBuffer::new();
        let client = ApplicationDataClient::new(db.pool(), &buffer);
        let s = session();

        let app = client
            .create(&s, NewApplication::new("Acme", "Engineer"))
            .await
            .unwrap();
        assert!(
            client
                .update_status(&s, &app.id, ApplicationStatus::Interview)
                .await
        );

        let notes = buffer.take();
        assert_eq!(notes.last().unwrap().message, "Application moved to Interview");
        assert_eq!(client.fetch(&s).await[0].status, "interview");
    }

    #[tokio::test]
    async fn test_failed_delete_leaves_state_unchanged() {
        let db = Database::in_memory().await.unwrap();
        let buffer = NotificationBuffer::new();
        let client = ApplicationDataClient::new(db.pool(), &buffer);
        let s = session();

        client
            .create(&s, NewApplication::new("Acme", "Engineer"))
            .await
            .unwrap();
        assert!(!client.delete(&s, "missing-id").await);
        assert!(buffer.has_errors());
        assert_eq!(client.fetch(&s).await.len(), 1);
    }

    #[tokio::test]
    async fn test_create_rejects_blank_fields() {
        let db = Database::in_memory().await.unwrap();
        let buffer = NotificationBuffer::new();
        let client = ApplicationDataClient::new(db.pool(), &buffer);

        let created = client
            .create(&session(), NewApplication::new("", "Engineer"))
            .await;
        assert!(created.is_none());
        assert_eq!(buffer.take()[0].message, "Company is required");
    }
}
