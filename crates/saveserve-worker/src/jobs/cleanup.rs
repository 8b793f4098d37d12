//! Cleanup jobs: old notifications and stale sessions.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde_json::Value;

use saveserve_database::repositories::notification::NotificationRepository;
use saveserve_database::repositories::session::SessionRepository;

use crate::executor::{JobExecutionError, JobHandler};

/// Deletes read notifications older than the retention window.
#[derive(Debug)]
pub struct NotificationCleanupHandler {
    notif_repo: Arc<NotificationRepository>,
    retention_days: i64,
}

impl NotificationCleanupHandler {
    /// Create a new notification cleanup handler.
    pub fn new(notif_repo: Arc<NotificationRepository>, retention_days: i64) -> Self {
        Self {
            notif_repo,
            retention_days,
        }
    }
}

#[async_trait]
impl JobHandler for NotificationCleanupHandler {
    fn job_type(&self) -> &str {
        "notification_cleanup"
    }

    async fn execute(&self) -> Result<Option<Value>, JobExecutionError> {
        let cutoff = Utc::now() - Duration::days(self.retention_days);
        let deleted = self.notif_repo.cleanup_read_before(cutoff).await?;
        Ok(Some(serde_json::json!({ "deleted": deleted })))
    }
}

/// Deletes revoked and expired session rows past the retention window.
#[derive(Debug)]
pub struct SessionCleanupHandler {
    session_repo: Arc<SessionRepository>,
    retention_days: i64,
}

impl SessionCleanupHandler {
    /// Create a new session cleanup handler.
    pub fn new(session_repo: Arc<SessionRepository>, retention_days: i64) -> Self {
        Self {
            session_repo,
            retention_days,
        }
    }
}

#[async_trait]
impl JobHandler for SessionCleanupHandler {
    fn job_type(&self) -> &str {
        "session_cleanup"
    }

    async fn execute(&self) -> Result<Option<Value>, JobExecutionError> {
        let cutoff = Utc::now() - Duration::days(self.retention_days);
        let deleted = self.session_repo.delete_stale_before(cutoff).await?;
        Ok(Some(serde_json::json!({ "deleted": deleted })))
    }
}
