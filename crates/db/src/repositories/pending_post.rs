//! Pending post repository (department approval queue).

use std::sync::Arc;

use crate::entities::{
    PendingPost, Post,
    pending_post::{self, PendingStatus},
    post,
};
use peekhour_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait, sea_query::Expr,
};

/// Outcome applied to a pending submission.
#[derive(Debug, Clone)]
pub struct ReviewDecision {
    pub status: PendingStatus,
    pub reviewed_by: String,
    pub rejection_reason: Option<String>,
}

/// Pending post repository for database operations.
#[derive(Clone)]
pub struct PendingPostRepository {
    db: Arc<DatabaseConnection>,
}

impl PendingPostRepository {
    /// Create a new pending post repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// The open submission for a post, if any.
    pub async fn find_pending_by_post(
        &self,
        post_id: &str,
    ) -> AppResult<Option<pending_post::Model>> {
        PendingPost::find()
            .filter(pending_post::Column::PostId.eq(post_id))
            .filter(pending_post::Column::Status.eq(PendingStatus::Pending))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Open submissions of a department, oldest first.
    pub async fn find_pending_by_department(
        &self,
        department_id: &str,
        limit: u64,
        since_id: Option<&str>,
    ) -> AppResult<Vec<pending_post::Model>> {
        let mut query = PendingPost::find()
            .filter(pending_post::Column::DepartmentId.eq(department_id))
            .filter(pending_post::Column::Status.eq(PendingStatus::Pending))
            .order_by_asc(pending_post::Column::Id)
            .limit(limit);

        if let Some(since) = since_id {
            query = query.filter(pending_post::Column::Id.gt(since));
        }

        query
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Queue a post for review and hide it, atomically.
    pub async fn submit(&self, model: pending_post::ActiveModel) -> AppResult<pending_post::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let pending = model
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Post::update_many()
            .col_expr(post::Column::IsActive, Expr::value(false))
            .filter(post::Column::Id.eq(pending.post_id.as_str()))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(pending)
    }

    /// Store a new hidden post together with its queue entry, atomically.
    pub async fn create_queued(
        &self,
        post: post::ActiveModel,
        pending: pending_post::ActiveModel,
    ) -> AppResult<(post::Model, pending_post::Model)> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let post = post
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let pending = pending
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok((post, pending))
    }

    /// Apply a review decision to a pending submission.
    ///
    /// The status change only matches while the row is still pending, and an
    /// approval publishes the post in the same transaction. Returns `None`
    /// when another review got there first; nothing is written in that case.
    pub async fn review(
        &self,
        pending: pending_post::Model,
        decision: ReviewDecision,
    ) -> AppResult<Option<pending_post::Model>> {
        let reviewed_at = chrono::Utc::now().fixed_offset();

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let updated = PendingPost::update_many()
            .col_expr(pending_post::Column::Status, Expr::value(decision.status))
            .col_expr(
                pending_post::Column::ReviewedBy,
                Expr::value(decision.reviewed_by.as_str()),
            )
            .col_expr(pending_post::Column::ReviewedAt, Expr::value(reviewed_at))
            .col_expr(
                pending_post::Column::RejectionReason,
                Expr::value(decision.rejection_reason.clone()),
            )
            .filter(pending_post::Column::Id.eq(pending.id.as_str()))
            .filter(pending_post::Column::Status.eq(PendingStatus::Pending))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if updated.rows_affected == 0 {
            return Ok(None);
        }

        if decision.status == PendingStatus::Approved {
            Post::update_many()
                .col_expr(post::Column::IsActive, Expr::value(true))
                .col_expr(post::Column::UpdatedAt, Expr::value(reviewed_at))
                .filter(post::Column::Id.eq(pending.post_id.as_str()))
                .exec(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(Some(pending_post::Model {
            status: decision.status,
            reviewed_by: Some(decision.reviewed_by),
            reviewed_at: Some(reviewed_at),
            rejection_reason: decision.rejection_reason,
            ..pending
        }))
    }
}
