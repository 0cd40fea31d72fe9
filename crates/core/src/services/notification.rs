//! Notification service.

use peekhour_common::{AppError, AppResult, IdGenerator};
use peekhour_db::{
    entities::notification::{self, NotificationType},
    repositories::NotificationRepository,
};
use sea_orm::Set;

/// Largest page a client may request.
pub const MAX_PAGE_SIZE: u64 = 100;

/// A notification about to be delivered.
#[derive(Debug, Clone)]
pub struct NewNotification<'a> {
    pub notifiee_id: &'a str,
    pub notifier_id: Option<&'a str>,
    pub notification_type: NotificationType,
    pub content: String,
    pub post_id: Option<&'a str>,
    pub comment_id: Option<&'a str>,
}

/// Notification service for business logic.
#[derive(Clone)]
pub struct NotificationService {
    notification_repo: NotificationRepository,
    id_gen: IdGenerator,
}

impl NotificationService {
    /// Create a new notification service.
    #[must_use]
    pub const fn new(notification_repo: NotificationRepository) -> Self {
        Self {
            notification_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Store a notification. Returns `None` when the recipient triggered it
    /// themself.
    pub async fn notify(
        &self,
        new: NewNotification<'_>,
    ) -> AppResult<Option<notification::Model>> {
        if new.notifier_id == Some(new.notifiee_id) {
            return Ok(None);
        }

        let model = notification::ActiveModel {
            id: Set(self.id_gen.generate()),
            notifiee_id: Set(new.notifiee_id.to_string()),
            notifier_id: Set(new.notifier_id.map(ToString::to_string)),
            notification_type: Set(new.notification_type),
            content: Set(new.content),
            post_id: Set(new.post_id.map(ToString::to_string)),
            comment_id: Set(new.comment_id.map(ToString::to_string)),
            is_read: Set(false),
            created_at: Set(chrono::Utc::now().into()),
        };

        self.notification_repo.create(model).await.map(Some)
    }

    /// Like [`Self::notify`], but a failure is logged instead of returned so
    /// the triggering action still succeeds.
    pub async fn notify_best_effort(&self, new: NewNotification<'_>) {
        let notifiee_id = new.notifiee_id.to_string();
        let notification_type = new.notification_type;

        if let Err(e) = self.notify(new).await {
            tracing::warn!(
                error = %e,
                notifiee_id = %notifiee_id,
                notification_type = ?notification_type,
                "Failed to create notification"
            );
        }
    }

    /// Get notifications for a user, newest first.
    pub async fn get_notifications(
        &self,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
        unread_only: bool,
    ) -> AppResult<Vec<notification::Model>> {
        self.notification_repo
            .find_by_user(user_id, limit.clamp(1, MAX_PAGE_SIZE), until_id, unread_only)
            .await
    }

    /// Mark one of the user's notifications as read.
    pub async fn mark_as_read(&self, user_id: &str, notification_id: &str) -> AppResult<()> {
        let updated = self
            .notification_repo
            .mark_as_read(notification_id, user_id)
            .await?;

        if updated == 0 {
            return Err(AppError::NotFound("Notification not found".to_string()));
        }

        Ok(())
    }

    /// Mark all notifications as read for a user.
    pub async fn mark_all_as_read(&self, user_id: &str) -> AppResult<u64> {
        self.notification_repo.mark_all_as_read(user_id).await
    }

    /// Count unread notifications for a user.
    pub async fn count_unread(&self, user_id: &str) -> AppResult<u64> {
        self.notification_repo.count_unread(user_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn create_test_notification(id: &str) -> notification::Model {
        notification::Model {
            id: id.to_string(),
            notifiee_id: "user1".to_string(),
            notifier_id: Some("user2".to_string()),
            notification_type: NotificationType::Comment,
            content: "bob commented on your post".to_string(),
            post_id: Some("post1".to_string()),
            comment_id: Some("c1".to_string()),
            is_read: false,
            created_at: Utc::now().into(),
        }
    }

    fn comment_notification<'a>(notifiee: &'a str, notifier: &'a str) -> NewNotification<'a> {
        NewNotification {
            notifiee_id: notifiee,
            notifier_id: Some(notifier),
            notification_type: NotificationType::Comment,
            content: "bob commented on your post".to_string(),
            post_id: Some("post1"),
            comment_id: Some("c1"),
        }
    }

    #[tokio::test]
    async fn test_notify_self_is_skipped() {
        // No query results: any insert attempt would fail
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = NotificationService::new(NotificationRepository::new(db));

        let result = service
            .notify(comment_notification("user1", "user1"))
            .await
            .unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_notify_creates_row() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_notification("n1")]])
                .into_connection(),
        );
        let service = NotificationService::new(NotificationRepository::new(db));

        let created = service
            .notify(comment_notification("user1", "user2"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(created.notifiee_id, "user1");
        assert_eq!(created.notification_type, NotificationType::Comment);
    }

    #[tokio::test]
    async fn test_notify_best_effort_swallows_errors() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = NotificationService::new(NotificationRepository::new(db));

        service
            .notify_best_effort(comment_notification("user1", "user2"))
            .await;
    }

    #[tokio::test]
    async fn test_mark_as_read_other_users_notification_is_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );
        let service = NotificationService::new(NotificationRepository::new(db));

        let result = service.mark_as_read("intruder", "n1").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
