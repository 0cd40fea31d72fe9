//! Department moderator repository.

use std::sync::Arc;

use crate::entities::{
    DepartmentModerator,
    department_moderator::{self, ModeratorPermissions},
};
use peekhour_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

/// Moderator repository for database operations.
#[derive(Clone)]
pub struct ModeratorRepository {
    db: Arc<DatabaseConnection>,
}

impl ModeratorRepository {
    /// Create a new moderator repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find the moderator grant of a user in a department.
    pub async fn find(
        &self,
        department_id: &str,
        user_id: &str,
    ) -> AppResult<Option<department_moderator::Model>> {
        DepartmentModerator::find()
            .filter(department_moderator::Column::DepartmentId.eq(department_id))
            .filter(department_moderator::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Moderators of a department in assignment order.
    pub async fn find_by_department(
        &self,
        department_id: &str,
    ) -> AppResult<Vec<department_moderator::Model>> {
        DepartmentModerator::find()
            .filter(department_moderator::Column::DepartmentId.eq(department_id))
            .order_by_asc(department_moderator::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new moderator grant.
    pub async fn create(
        &self,
        model: department_moderator::ActiveModel,
    ) -> AppResult<department_moderator::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Replace the permission set of an existing grant.
    pub async fn update_permissions(
        &self,
        moderator: department_moderator::Model,
        permissions: ModeratorPermissions,
    ) -> AppResult<department_moderator::Model> {
        let mut active: department_moderator::ActiveModel = moderator.into();
        active.permissions = Set(permissions);
        active.updated_at = Set(Some(chrono::Utc::now().into()));

        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Revoke a grant. Returns the number of rows removed.
    pub async fn delete(&self, department_id: &str, user_id: &str) -> AppResult<u64> {
        let result = DepartmentModerator::delete_many()
            .filter(department_moderator::Column::DepartmentId.eq(department_id))
            .filter(department_moderator::Column::UserId.eq(user_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }
}
