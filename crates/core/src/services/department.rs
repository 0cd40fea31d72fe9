//! Department service.

use peekhour_common::{AppError, AppResult, IdGenerator};
use peekhour_db::{
    entities::{department, department_member},
    repositories::DepartmentRepository,
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// Input for creating a department.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateDepartmentInput {
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    #[validate(length(max = 2048))]
    pub description: Option<String>,
    #[validate(length(max = 8192))]
    pub rules: Option<String>,
    #[serde(default)]
    pub require_post_approval: bool,
}

/// Department service for business logic.
#[derive(Clone)]
pub struct DepartmentService {
    department_repo: DepartmentRepository,
    id_gen: IdGenerator,
}

impl DepartmentService {
    /// Create a new department service.
    #[must_use]
    pub const fn new(department_repo: DepartmentRepository) -> Self {
        Self {
            department_repo,
            id_gen: IdGenerator::new(),
        }
    }

    fn membership(&self, department_id: &str, user_id: &str) -> department_member::ActiveModel {
        department_member::ActiveModel {
            id: Set(self.id_gen.generate()),
            department_id: Set(department_id.to_string()),
            user_id: Set(user_id.to_string()),
            is_banned: Set(false),
            banned_by: Set(None),
            joined_at: Set(chrono::Utc::now().into()),
        }
    }

    /// Create a department. The creator becomes its first member.
    pub async fn create(
        &self,
        creator_id: &str,
        input: CreateDepartmentInput,
    ) -> AppResult<department::Model> {
        input.validate()?;

        let name = input.name.trim();
        if name.is_empty() {
            return Err(AppError::Validation(
                "Department name is required".to_string(),
            ));
        }

        let id = self.id_gen.generate();
        let model = department::ActiveModel {
            id: Set(id.clone()),
            creator_id: Set(creator_id.to_string()),
            name: Set(name.to_string()),
            description: Set(input.description),
            rules: Set(input.rules),
            require_post_approval: Set(input.require_post_approval),
            members_count: Set(1),
            created_at: Set(chrono::Utc::now().into()),
            updated_at: Set(None),
        };

        let created = self
            .department_repo
            .create(model, self.membership(&id, creator_id))
            .await?;

        tracing::info!(department_id = %created.id, creator_id = %creator_id, "Created department");
        Ok(created)
    }

    /// Get a department by ID.
    pub async fn get(&self, id: &str) -> AppResult<department::Model> {
        self.department_repo.get_by_id(id).await
    }

    /// Join a department.
    pub async fn join(
        &self,
        user_id: &str,
        department_id: &str,
    ) -> AppResult<department_member::Model> {
        let department = self.department_repo.get_by_id(department_id).await?;

        match self.department_repo.find_member(&department.id, user_id).await? {
            Some(m) if m.is_banned => Err(AppError::Forbidden(
                "You are banned from this department".to_string(),
            )),
            Some(_) => Err(AppError::Conflict(
                "Already a member of this department".to_string(),
            )),
            None => {
                self.department_repo
                    .add_member(self.membership(&department.id, user_id))
                    .await
            }
        }
    }

    /// Leave a department. The creator cannot leave.
    pub async fn leave(&self, user_id: &str, department_id: &str) -> AppResult<()> {
        let department = self.department_repo.get_by_id(department_id).await?;

        if department.is_admin(user_id) {
            return Err(AppError::BadRequest(
                "The department creator cannot leave".to_string(),
            ));
        }

        if !self
            .department_repo
            .remove_member(&department.id, user_id)
            .await?
        {
            return Err(AppError::NotFound(
                "Not a member of this department".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::moderator::tests::create_test_department;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn member(user_id: &str, is_banned: bool) -> department_member::Model {
        department_member::Model {
            id: format!("m-{user_id}"),
            department_id: "dept1".to_string(),
            user_id: user_id.to_string(),
            is_banned,
            banned_by: is_banned.then(|| "creator".to_string()),
            joined_at: Utc::now().into(),
        }
    }

    fn service(db: Arc<DatabaseConnection>) -> DepartmentService {
        DepartmentService::new(DepartmentRepository::new(db))
    }

    #[tokio::test]
    async fn test_create_department() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_department("dept1", "creator")]])
                .append_query_results([[member("creator", false)]])
                .into_connection(),
        );

        let created = service(db)
            .create(
                "creator",
                CreateDepartmentInput {
                    name: "  Night Photographers ".to_string(),
                    description: None,
                    rules: None,
                    require_post_approval: true,
                },
            )
            .await
            .unwrap();

        assert_eq!(created.creator_id, "creator");
    }

    #[tokio::test]
    async fn test_create_with_blank_name_is_rejected() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let result = service(db)
            .create(
                "creator",
                CreateDepartmentInput {
                    name: "   ".to_string(),
                    description: None,
                    rules: None,
                    require_post_approval: false,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_banned_user_cannot_join() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_department("dept1", "creator")]])
                .append_query_results([[member("user2", true)]])
                .into_connection(),
        );

        let result = service(db).join("user2", "dept1").await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_join_twice_is_conflict() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_department("dept1", "creator")]])
                .append_query_results([[member("user2", false)]])
                .into_connection(),
        );

        let result = service(db).join("user2", "dept1").await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_join() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_department("dept1", "creator")]])
                .append_query_results([Vec::<department_member::Model>::new()])
                .append_query_results([[member("user2", false)]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let joined = service(db).join("user2", "dept1").await.unwrap();

        assert_eq!(joined.user_id, "user2");
        assert!(!joined.is_banned);
    }

    #[tokio::test]
    async fn test_creator_cannot_leave() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_department("dept1", "creator")]])
                .into_connection(),
        );

        let result = service(db).leave("creator", "dept1").await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_leave_without_membership_is_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_department("dept1", "creator")]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let result = service(db).leave("user2", "dept1").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
