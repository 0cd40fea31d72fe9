//! Comment repository.

use std::collections::HashMap;
use std::sync::Arc;

use crate::entities::{Comment, comment};
use peekhour_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbBackend, EntityTrait, FromQueryResult,
    QueryFilter, QueryOrder, QuerySelect, Statement, sea_query::Expr,
};

/// Number of direct children of one comment.
#[derive(Debug, FromQueryResult)]
struct ChildCount {
    parent_comment_id: String,
    count: i64,
}

/// Comment repository for database operations.
#[derive(Clone)]
pub struct CommentRepository {
    db: Arc<DatabaseConnection>,
}

impl CommentRepository {
    /// Create a new comment repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a comment by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<comment::Model>> {
        Comment::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a comment by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<comment::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::CommentNotFound(id.to_string()))
    }

    /// Create a new comment.
    pub async fn create(&self, model: comment::ActiveModel) -> AppResult<comment::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a comment.
    pub async fn update(&self, model: comment::ActiveModel) -> AppResult<comment::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a comment permanently. Replies go with it through the
    /// cascading `parent_comment_id` foreign key.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Comment::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    /// Mark a comment inactive. Returns the number of rows changed.
    pub async fn soft_delete(&self, id: &str) -> AppResult<u64> {
        let result = Comment::update_many()
            .col_expr(comment::Column::IsActive, Expr::value(false))
            .col_expr(
                comment::Column::UpdatedAt,
                Expr::value(chrono::Utc::now().fixed_offset()),
            )
            .filter(comment::Column::Id.eq(id))
            .filter(comment::Column::IsActive.eq(true))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    /// Active root comments of a post, oldest first.
    pub async fn find_roots_by_post(
        &self,
        post_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<comment::Model>> {
        Comment::find()
            .filter(comment::Column::PostId.eq(post_id))
            .filter(comment::Column::ParentCommentId.is_null())
            .filter(comment::Column::IsActive.eq(true))
            .order_by_asc(comment::Column::CreatedAt)
            .order_by_asc(comment::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Direct replies to a comment, oldest first.
    pub async fn find_children(&self, parent_id: &str) -> AppResult<Vec<comment::Model>> {
        Comment::find()
            .filter(comment::Column::ParentCommentId.eq(parent_id))
            .order_by_asc(comment::Column::CreatedAt)
            .order_by_asc(comment::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Number of direct replies for each of the given comments.
    ///
    /// Comments without replies are absent from the map.
    pub async fn count_children(&self, parent_ids: &[String]) -> AppResult<HashMap<String, u64>> {
        if parent_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = Comment::find()
            .select_only()
            .column(comment::Column::ParentCommentId)
            .column_as(comment::Column::Id.count(), "count")
            .filter(comment::Column::ParentCommentId.is_in(parent_ids.to_vec()))
            .group_by(comment::Column::ParentCommentId)
            .into_model::<ChildCount>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|row| (row.parent_comment_id, u64::try_from(row.count).unwrap_or(0)))
            .collect())
    }

    /// A comment together with every descendant at most `max_levels` below
    /// it, in a single recursive query. Rows come back in creation order;
    /// tree order is rebuilt by the caller.
    pub async fn find_subtree(
        &self,
        root_id: &str,
        max_levels: i32,
    ) -> AppResult<Vec<comment::Model>> {
        let sql = r"
            WITH RECURSIVE subtree AS (
                SELECT c.*, 0 AS level
                FROM comment c
                WHERE c.id = $1

                UNION ALL

                SELECT c.*, s.level + 1
                FROM comment c
                INNER JOIN subtree s ON c.parent_comment_id = s.id
                WHERE s.level < $2
            )
            SELECT
                id, post_id, user_id, parent_comment_id, depth, content,
                is_active, edited_at, created_at, updated_at
            FROM subtree
            ORDER BY created_at ASC, id ASC
        ";

        Comment::find()
            .from_raw_sql(Statement::from_sql_and_values(
                DbBackend::Postgres,
                sql,
                [root_id.into(), max_levels.into()],
            ))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
