//! Department event repository.

use std::sync::Arc;

use crate::entities::{DepartmentEvent, department_event};
use peekhour_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

/// Department event repository for database operations.
#[derive(Clone)]
pub struct DepartmentEventRepository {
    db: Arc<DatabaseConnection>,
}

impl DepartmentEventRepository {
    /// Create a new department event repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Create a new event.
    pub async fn create(
        &self,
        model: department_event::ActiveModel,
    ) -> AppResult<department_event::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Events of a department ordered by start time.
    pub async fn find_by_department(
        &self,
        department_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<department_event::Model>> {
        DepartmentEvent::find()
            .filter(department_event::Column::DepartmentId.eq(department_id))
            .order_by_asc(department_event::Column::StartsAt)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
