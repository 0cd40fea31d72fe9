//! Department and membership repository.

use std::sync::Arc;

use crate::entities::{
    Department, DepartmentMember, DepartmentModerator, department, department_member,
    department_moderator,
};
use peekhour_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, TransactionTrait, sea_query::Expr,
};

/// Department repository for database operations.
#[derive(Clone)]
pub struct DepartmentRepository {
    db: Arc<DatabaseConnection>,
}

impl DepartmentRepository {
    /// Create a new department repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    async fn begin(&self) -> AppResult<DatabaseTransaction> {
        self.db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a department by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<department::Model>> {
        Department::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a department by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<department::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::DepartmentNotFound(id.to_string()))
    }

    /// Create a department together with its creator's membership.
    pub async fn create(
        &self,
        model: department::ActiveModel,
        creator_membership: department_member::ActiveModel,
    ) -> AppResult<department::Model> {
        let txn = self.begin().await?;

        let created = model
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        creator_membership
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(created)
    }

    /// Update a department.
    pub async fn update(&self, model: department::ActiveModel) -> AppResult<department::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ==================== Members ====================

    /// Find a user's membership row in a department (banned rows included).
    pub async fn find_member(
        &self,
        department_id: &str,
        user_id: &str,
    ) -> AppResult<Option<department_member::Model>> {
        DepartmentMember::find()
            .filter(department_member::Column::DepartmentId.eq(department_id))
            .filter(department_member::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Add a member and bump the member count.
    pub async fn add_member(
        &self,
        model: department_member::ActiveModel,
    ) -> AppResult<department_member::Model> {
        let txn = self.begin().await?;

        let member = model
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Department::update_many()
            .col_expr(
                department::Column::MembersCount,
                Expr::col(department::Column::MembersCount).add(1),
            )
            .filter(department::Column::Id.eq(member.department_id.as_str()))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(member)
    }

    /// Remove a non-banned member. Returns whether a membership was removed.
    pub async fn remove_member(&self, department_id: &str, user_id: &str) -> AppResult<bool> {
        let txn = self.begin().await?;

        let deleted = DepartmentMember::delete_many()
            .filter(department_member::Column::DepartmentId.eq(department_id))
            .filter(department_member::Column::UserId.eq(user_id))
            .filter(department_member::Column::IsBanned.eq(false))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if deleted.rows_affected == 0 {
            return Ok(false);
        }

        decrement_members_count(&txn, department_id).await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(true)
    }

    /// Ban a user from a department.
    ///
    /// An existing membership is flagged and stops counting as a member; a
    /// user who never joined gets a banned row so they cannot join later.
    /// Any moderator grant the user holds is revoked in the same transaction.
    pub async fn ban_member(
        &self,
        department_id: &str,
        user_id: &str,
        banned_by: &str,
        new_row: department_member::ActiveModel,
    ) -> AppResult<()> {
        let txn = self.begin().await?;

        let flagged = DepartmentMember::update_many()
            .col_expr(department_member::Column::IsBanned, Expr::value(true))
            .col_expr(department_member::Column::BannedBy, Expr::value(banned_by))
            .filter(department_member::Column::DepartmentId.eq(department_id))
            .filter(department_member::Column::UserId.eq(user_id))
            .filter(department_member::Column::IsBanned.eq(false))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if flagged.rows_affected > 0 {
            decrement_members_count(&txn, department_id).await?;
        } else {
            let already_banned = DepartmentMember::find()
                .filter(department_member::Column::DepartmentId.eq(department_id))
                .filter(department_member::Column::UserId.eq(user_id))
                .one(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?
                .is_some();

            if !already_banned {
                new_row
                    .insert(&txn)
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
            }
        }

        DepartmentModerator::delete_many()
            .filter(department_moderator::Column::DepartmentId.eq(department_id))
            .filter(department_moderator::Column::UserId.eq(user_id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

async fn decrement_members_count(txn: &DatabaseTransaction, department_id: &str) -> AppResult<()> {
    Department::update_many()
        .col_expr(
            department::Column::MembersCount,
            Expr::cust("GREATEST(members_count - 1, 0)"),
        )
        .filter(department::Column::Id.eq(department_id))
        .exec(txn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(())
}
