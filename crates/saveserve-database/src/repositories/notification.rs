//! Notification repository implementation.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use saveserve_core::error::{AppError, ErrorKind};
use saveserve_core::result::AppResult;
use saveserve_core::types::pagination::{PageRequest, PageResponse};
use saveserve_entity::notification::{NewNotification, Notification};

/// Repository for notification CRUD operations.
#[derive(Debug, Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    /// Create a new notification repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List undismissed notifications for a user, newest first.
    pub async fn find_by_user(
        &self,
        user_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Notification>> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND NOT is_dismissed",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count notifications", e)
        })?;

        let notifs = sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications WHERE user_id = $1 AND NOT is_dismissed \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(user_id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list notifications", e)
        })?;

        Ok(PageResponse::new(
            notifs,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    /// Count unread notifications for a user.
    pub async fn count_unread(&self, user_id: Uuid) -> AppResult<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications \
             WHERE user_id = $1 AND NOT is_read AND NOT is_dismissed",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count unread", e))
    }

    /// Create a notification.
    pub async fn create(&self, notification: &NewNotification) -> AppResult<Notification> {
        sqlx::query_as::<_, Notification>(
            "INSERT INTO notifications \
                (user_id, category, event_type, title, message, payload, actor_id, \
                 resource_type, resource_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING *",
        )
        .bind(notification.user_id)
        .bind(notification.category)
        .bind(&notification.event_type)
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(&notification.payload)
        .bind(notification.actor_id)
        .bind(&notification.resource_type)
        .bind(notification.resource_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to create notification", e)
        })
    }

    /// Mark a notification as read.
    pub async fn mark_read(&self, notification_id: Uuid, user_id: Uuid) -> AppResult<()> {
        sqlx::query(
            "UPDATE notifications SET is_read = TRUE, read_at = NOW() \
             WHERE id = $1 AND user_id = $2",
        )
        .bind(notification_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to mark read", e))?;
        Ok(())
    }

    /// Mark all notifications as read for a user.
    pub async fn mark_all_read(&self, user_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE, read_at = NOW() \
             WHERE user_id = $1 AND NOT is_read",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to mark all read", e))?;
        Ok(result.rows_affected())
    }

    /// Dismiss a notification.
    pub async fn dismiss(&self, notification_id: Uuid, user_id: Uuid) -> AppResult<()> {
        sqlx::query(
            "UPDATE notifications SET is_dismissed = TRUE WHERE id = $1 AND user_id = $2",
        )
        .bind(notification_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to dismiss notification", e)
        })?;
        Ok(())
    }

    /// Clean up read notifications older than the cutoff.
    pub async fn cleanup_read_before(&self, before: DateTime<Utc>) -> AppResult<u64> {
        let result =
            sqlx::query("DELETE FROM notifications WHERE is_read AND created_at < $1")
                .bind(before)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to cleanup notifications", e)
                })?;
        Ok(result.rows_affected())
    }
}
