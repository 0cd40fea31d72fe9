//! Reaction repository.

use std::sync::Arc;

use crate::entities::{
    Reaction,
    reaction::{self, ReactionTarget, ReactionType},
};
use peekhour_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, QueryFilter,
    QueryOrder, QuerySelect,
};

/// Number of reactions of one type on a target.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct ReactionCount {
    pub reaction_type: ReactionType,
    pub count: i64,
}

/// Reaction repository for database operations.
#[derive(Clone)]
pub struct ReactionRepository {
    db: Arc<DatabaseConnection>,
}

impl ReactionRepository {
    /// Create a new reaction repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find the reaction a user left on a target.
    pub async fn find_by_user_and_target(
        &self,
        user_id: &str,
        target: &ReactionTarget,
    ) -> AppResult<Option<reaction::Model>> {
        Reaction::find()
            .filter(reaction::Column::UserId.eq(user_id))
            .filter(target.column().eq(target.id()))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// The user's reactions on any of the given comments.
    pub async fn find_by_user_and_comments(
        &self,
        user_id: &str,
        comment_ids: &[String],
    ) -> AppResult<Vec<reaction::Model>> {
        if comment_ids.is_empty() {
            return Ok(vec![]);
        }

        Reaction::find()
            .filter(reaction::Column::UserId.eq(user_id))
            .filter(reaction::Column::CommentId.is_in(comment_ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new reaction.
    pub async fn create(&self, model: reaction::ActiveModel) -> AppResult<reaction::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a reaction.
    pub async fn update(&self, model: reaction::ActiveModel) -> AppResult<reaction::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a reaction.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Reaction::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    /// Reaction counts per type on a target, most used first.
    pub async fn count_by_type(&self, target: &ReactionTarget) -> AppResult<Vec<ReactionCount>> {
        Reaction::find()
            .select_only()
            .column(reaction::Column::ReactionType)
            .column_as(reaction::Column::Id.count(), "count")
            .filter(target.column().eq(target.id()))
            .group_by(reaction::Column::ReactionType)
            .order_by_desc(reaction::Column::Id.count())
            .into_model::<ReactionCount>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
