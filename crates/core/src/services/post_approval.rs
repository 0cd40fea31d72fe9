//! Post approval workflow.
//!
//! A submission moves from `pending` to `approved` or `rejected` exactly once.
//! Submitting hides the post; approving publishes it again in the same
//! transaction as the status change.

use crate::services::moderator::ModeratorService;
use crate::services::notification::{NewNotification, NotificationService};
use peekhour_common::{AppError, AppResult, IdGenerator};
use peekhour_db::{
    entities::{
        department_moderator::ModeratorPermission,
        notification::NotificationType,
        pending_post::{self, PendingStatus},
    },
    repositories::{DepartmentRepository, PendingPostRepository, PostRepository, ReviewDecision},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// Largest page of the review queue.
pub const MAX_QUEUE_PAGE: u64 = 100;

/// Input for submitting a post for review.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitPostInput {
    #[validate(length(min = 1))]
    pub post_id: String,
    #[validate(length(min = 1))]
    pub department_id: String,
}

/// Input for reviewing a submission.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReviewInput {
    pub action: String,
    #[validate(length(max = 1000))]
    pub rejection_reason: Option<String>,
}

/// Map a review action onto its terminal status.
pub fn parse_action(action: &str) -> AppResult<PendingStatus> {
    match action {
        "approve" => Ok(PendingStatus::Approved),
        "reject" => Ok(PendingStatus::Rejected),
        _ => Err(AppError::BadRequest(
            "Action must be either 'approve' or 'reject'".to_string(),
        )),
    }
}

/// Post approval service for business logic.
#[derive(Clone)]
pub struct PostApprovalService {
    pending_repo: PendingPostRepository,
    post_repo: PostRepository,
    department_repo: DepartmentRepository,
    moderator_service: ModeratorService,
    notification_service: NotificationService,
    id_gen: IdGenerator,
}

impl PostApprovalService {
    /// Create a new post approval service.
    #[must_use]
    pub const fn new(
        pending_repo: PendingPostRepository,
        post_repo: PostRepository,
        department_repo: DepartmentRepository,
        moderator_service: ModeratorService,
        notification_service: NotificationService,
    ) -> Self {
        Self {
            pending_repo,
            post_repo,
            department_repo,
            moderator_service,
            notification_service,
            id_gen: IdGenerator::new(),
        }
    }

    /// Queue one of the caller's posts for review.
    pub async fn submit(
        &self,
        user_id: &str,
        input: SubmitPostInput,
    ) -> AppResult<pending_post::Model> {
        input.validate()?;

        let post = self.post_repo.get_by_id(&input.post_id).await?;
        if post.user_id != user_id {
            return Err(AppError::Forbidden(
                "You can only submit your own posts".to_string(),
            ));
        }

        let department = self
            .department_repo
            .get_by_id(&input.department_id)
            .await?;

        if post.department_id.as_deref() != Some(department.id.as_str()) {
            return Err(AppError::BadRequest(
                "Post does not belong to this department".to_string(),
            ));
        }

        if self
            .pending_repo
            .find_pending_by_post(&post.id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(
                "Post is already pending approval".to_string(),
            ));
        }

        let pending = self
            .pending_repo
            .submit(pending_post::ActiveModel {
                id: Set(self.id_gen.generate()),
                post_id: Set(post.id.clone()),
                department_id: Set(department.id.clone()),
                submitted_by: Set(user_id.to_string()),
                status: Set(PendingStatus::Pending),
                reviewed_by: Set(None),
                reviewed_at: Set(None),
                rejection_reason: Set(None),
                created_at: Set(chrono::Utc::now().into()),
            })
            .await?;

        tracing::info!(
            pending_id = %pending.id,
            post_id = %post.id,
            department_id = %department.id,
            "Post submitted for approval"
        );

        Ok(pending)
    }

    /// Oldest-first review queue of a department.
    pub async fn list_pending(
        &self,
        user_id: &str,
        department_id: &str,
        limit: u64,
        since_id: Option<&str>,
    ) -> AppResult<Vec<pending_post::Model>> {
        let department = self
            .moderator_service
            .authorize_in(department_id, user_id, ModeratorPermission::ApprovePost)
            .await?;

        self.pending_repo
            .find_pending_by_department(&department.id, limit.clamp(1, MAX_QUEUE_PAGE), since_id)
            .await
    }

    /// Approve or reject the pending submission of a post.
    pub async fn review(
        &self,
        reviewer_id: &str,
        post_id: &str,
        input: ReviewInput,
    ) -> AppResult<pending_post::Model> {
        input.validate()?;
        let status = parse_action(&input.action)?;

        let not_found = || AppError::NotFound("No pending submission for this post".to_string());

        let pending = self
            .pending_repo
            .find_pending_by_post(post_id)
            .await?
            .ok_or_else(not_found)?;

        self.moderator_service
            .authorize_in(&pending.department_id, reviewer_id, ModeratorPermission::ApprovePost)
            .await?;

        let rejection_reason = match status {
            PendingStatus::Rejected => input
                .rejection_reason
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty()),
            _ => None,
        };

        let reviewed = self
            .pending_repo
            .review(
                pending,
                ReviewDecision {
                    status,
                    reviewed_by: reviewer_id.to_string(),
                    rejection_reason,
                },
            )
            .await?
            .ok_or_else(not_found)?;

        tracing::info!(
            pending_id = %reviewed.id,
            post_id = %reviewed.post_id,
            status = ?reviewed.status,
            reviewer_id = %reviewer_id,
            "Reviewed pending post"
        );

        let (notification_type, content) = match (&reviewed.status, &reviewed.rejection_reason) {
            (PendingStatus::Approved, _) => (
                NotificationType::PostApproved,
                "Your post was approved".to_string(),
            ),
            (_, Some(reason)) => (
                NotificationType::PostRejected,
                format!("Your post was rejected: {reason}"),
            ),
            (_, None) => (
                NotificationType::PostRejected,
                "Your post was rejected".to_string(),
            ),
        };

        self.notification_service
            .notify_best_effort(NewNotification {
                notifiee_id: &reviewed.submitted_by,
                notifier_id: Some(reviewer_id),
                notification_type,
                content,
                post_id: Some(&reviewed.post_id),
                comment_id: None,
            })
            .await;

        Ok(reviewed)
    }
}
