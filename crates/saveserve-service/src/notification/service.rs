//! Notification inbox management and push dispatch.

use std::sync::Arc;

use tracing::error;
use uuid::Uuid;

use saveserve_core::error::AppError;
use saveserve_core::types::pagination::{PageRequest, PageResponse};
use saveserve_database::repositories::notification::NotificationRepository;
use saveserve_entity::notification::{NewNotification, Notification};
use saveserve_realtime::{OutboundMessage, RealtimeHub};

use crate::context::RequestContext;

/// Manages user notifications: the persisted inbox plus the realtime push
/// channel.
///
/// `dispatch` is the at-most-once side-effect entry point used by the
/// booking and listing flows: it persists the inbox record and pushes to
/// any online sockets, and its failures are logged, never surfaced, never
/// retried.
#[derive(Debug, Clone)]
pub struct NotificationService {
    /// Notification repository.
    notif_repo: Arc<NotificationRepository>,
    /// Realtime push hub.
    hub: Arc<RealtimeHub>,
}

impl NotificationService {
    /// Creates a new notification service.
    pub fn new(notif_repo: Arc<NotificationRepository>, hub: Arc<RealtimeHub>) -> Self {
        Self { notif_repo, hub }
    }

    /// Lists notifications for the current user.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        page: PageRequest,
    ) -> Result<PageResponse<Notification>, AppError> {
        self.notif_repo.find_by_user(ctx.user_id, &page).await
    }

    /// Gets the unread notification count.
    pub async fn unread_count(&self, ctx: &RequestContext) -> Result<i64, AppError> {
        self.notif_repo.count_unread(ctx.user_id).await
    }

    /// Marks a notification as read.
    pub async fn mark_read(
        &self,
        ctx: &RequestContext,
        notification_id: Uuid,
    ) -> Result<(), AppError> {
        self.notif_repo.mark_read(notification_id, ctx.user_id).await
    }

    /// Marks all notifications as read for the current user.
    pub async fn mark_all_read(&self, ctx: &RequestContext) -> Result<u64, AppError> {
        self.notif_repo.mark_all_read(ctx.user_id).await
    }

    /// Dismisses (soft-deletes) a notification.
    pub async fn dismiss(
        &self,
        ctx: &RequestContext,
        notification_id: Uuid,
    ) -> Result<(), AppError> {
        self.notif_repo.dismiss(notification_id, ctx.user_id).await
    }

    /// Persists a notification and pushes it to the user's live sockets.
    pub async fn dispatch(&self, notification: NewNotification) -> Result<(), AppError> {
        let user_id = notification.user_id;
        let stored = self.notif_repo.create(&notification).await?;

        self.hub.send_to_user(
            user_id,
            &OutboundMessage::Notification {
                notification: stored,
            },
        );
        if let Ok(count) = self.notif_repo.count_unread(user_id).await {
            self.hub
                .send_to_user(user_id, &OutboundMessage::UnreadCount { count });
        }

        Ok(())
    }

    /// Fire-and-forget variant of [`Self::dispatch`] for post-commit side
    /// effects: failures are logged and dropped.
    pub fn dispatch_best_effort(&self, notification: NewNotification) {
        let service = self.clone();
        tokio::spawn(async move {
            let user_id = notification.user_id;
            let event_type = notification.event_type.clone();
            if let Err(e) = service.dispatch(notification).await {
                error!(%user_id, event_type, "Failed to dispatch notification: {e}");
            }
        });
    }
}
