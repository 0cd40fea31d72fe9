//! Department moderator service.
//!
//! A department's creator holds every permission. Everyone else holds exactly
//! what their moderator grant says, and the grant is read again on every
//! check so a revoked permission takes effect on the next request.

use peekhour_common::{AppError, AppResult, IdGenerator};
use peekhour_db::{
    entities::{
        department,
        department_moderator::{self, ModeratorPermission, ModeratorPermissions},
    },
    repositories::{DepartmentRepository, ModeratorRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// Input for granting moderator rights.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddModeratorInput {
    #[validate(length(min = 1, max = 64))]
    pub user_id: String,
    /// Raw permission object; missing keys default to `false`.
    pub permissions: Option<serde_json::Value>,
}

/// Parse a permission object, rejecting unknown keys and non-boolean values.
pub fn parse_permissions(value: serde_json::Value) -> AppResult<ModeratorPermissions> {
    serde_json::from_value(value)
        .map_err(|e| AppError::Validation(format!("Invalid permissions: {e}")))
}

const fn denied_message(permission: ModeratorPermission) -> &'static str {
    match permission {
        ModeratorPermission::ApprovePost => "You do not have permission to review posts.",
        ModeratorPermission::DeletePost => "You do not have permission to remove posts.",
        ModeratorPermission::DeleteComment => "You do not have permission to remove comments.",
        ModeratorPermission::BanUser => "You do not have permission to ban users.",
        ModeratorPermission::CreateEvent => "You do not have permission to create events.",
        ModeratorPermission::EditRules => "You do not have permission to edit rules.",
    }
}

/// Moderator service for business logic.
#[derive(Clone)]
pub struct ModeratorService {
    moderator_repo: ModeratorRepository,
    department_repo: DepartmentRepository,
    id_gen: IdGenerator,
}

impl ModeratorService {
    /// Create a new moderator service.
    #[must_use]
    pub const fn new(
        moderator_repo: ModeratorRepository,
        department_repo: DepartmentRepository,
    ) -> Self {
        Self {
            moderator_repo,
            department_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Check that `user_id` may use `permission` in `department`.
    pub async fn authorize(
        &self,
        department: &department::Model,
        user_id: &str,
        permission: ModeratorPermission,
    ) -> AppResult<()> {
        if department.is_admin(user_id) {
            return Ok(());
        }

        let grant = self.moderator_repo.find(&department.id, user_id).await?;
        if grant.is_some_and(|m| m.permissions.allows(permission)) {
            return Ok(());
        }

        tracing::debug!(
            department_id = %department.id,
            user_id = %user_id,
            permission = permission.key(),
            "Moderator permission denied"
        );

        Err(AppError::Forbidden(denied_message(permission).to_string()))
    }

    /// Load a department and authorize `user_id` for `permission` in it.
    pub async fn authorize_in(
        &self,
        department_id: &str,
        user_id: &str,
        permission: ModeratorPermission,
    ) -> AppResult<department::Model> {
        let department = self.department_repo.get_by_id(department_id).await?;
        self.authorize(&department, user_id, permission).await?;
        Ok(department)
    }

    async fn creator_department(
        &self,
        department_id: &str,
        user_id: &str,
    ) -> AppResult<department::Model> {
        let department = self.department_repo.get_by_id(department_id).await?;
        if !department.is_admin(user_id) {
            return Err(AppError::Forbidden(
                "Only the department creator can manage moderators".to_string(),
            ));
        }
        Ok(department)
    }

    /// Grant moderator rights to a member.
    pub async fn add(
        &self,
        actor_id: &str,
        department_id: &str,
        input: AddModeratorInput,
    ) -> AppResult<department_moderator::Model> {
        input.validate()?;

        let department = self.creator_department(department_id, actor_id).await?;
        let permissions = input
            .permissions
            .map(parse_permissions)
            .transpose()?
            .unwrap_or_default();

        if department.is_admin(&input.user_id) {
            return Err(AppError::BadRequest(
                "The department creator cannot be made a moderator".to_string(),
            ));
        }

        let is_member = self
            .department_repo
            .find_member(&department.id, &input.user_id)
            .await?
            .is_some_and(|m| !m.is_banned);
        if !is_member {
            return Err(AppError::BadRequest(
                "User is not a member of this department".to_string(),
            ));
        }

        if self
            .moderator_repo
            .find(&department.id, &input.user_id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict("User is already a moderator".to_string()));
        }

        let model = department_moderator::ActiveModel {
            id: Set(self.id_gen.generate()),
            department_id: Set(department.id.clone()),
            user_id: Set(input.user_id.clone()),
            permissions: Set(permissions),
            assigned_by: Set(actor_id.to_string()),
            created_at: Set(chrono::Utc::now().into()),
            updated_at: Set(None),
        };

        let created = self.moderator_repo.create(model).await?;
        tracing::info!(
            department_id = %department.id,
            user_id = %created.user_id,
            "Added department moderator"
        );

        Ok(created)
    }

    /// Revoke a moderator grant.
    pub async fn remove(&self, actor_id: &str, department_id: &str, user_id: &str) -> AppResult<()> {
        let department = self.creator_department(department_id, actor_id).await?;

        if self.moderator_repo.delete(&department.id, user_id).await? == 0 {
            return Err(AppError::NotFound("Moderator not found".to_string()));
        }

        tracing::info!(department_id = %department.id, user_id = %user_id, "Removed department moderator");
        Ok(())
    }

    /// Replace a moderator's permission set.
    pub async fn update_permissions(
        &self,
        actor_id: &str,
        department_id: &str,
        user_id: &str,
        permissions: serde_json::Value,
    ) -> AppResult<department_moderator::Model> {
        let department = self.creator_department(department_id, actor_id).await?;
        let permissions = parse_permissions(permissions)?;

        let moderator = self
            .moderator_repo
            .find(&department.id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Moderator not found".to_string()))?;

        self.moderator_repo
            .update_permissions(moderator, permissions)
            .await
    }

    /// Moderators of a department.
    pub async fn list(&self, department_id: &str) -> AppResult<Vec<department_moderator::Model>> {
        let department = self.department_repo.get_by_id(department_id).await?;
        self.moderator_repo.find_by_department(&department.id).await
    }

    /// Effective permissions of a user in a department.
    pub async fn get_permissions(
        &self,
        department_id: &str,
        user_id: &str,
    ) -> AppResult<ModeratorPermissions> {
        let department = self.department_repo.get_by_id(department_id).await?;
        if department.is_admin(user_id) {
            return Ok(ModeratorPermissions::all());
        }

        Ok(self
            .moderator_repo
            .find(&department.id, user_id)
            .await?
            .map(|m| m.permissions)
            .unwrap_or_default())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;
    use chrono::Utc;
    use peekhour_db::entities::department_member;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use serde_json::json;
    use std::sync::Arc;

    pub(crate) fn create_test_department(id: &str, creator_id: &str) -> department::Model {
        department::Model {
            id: id.to_string(),
            creator_id: creator_id.to_string(),
            name: "Night Photographers".to_string(),
            description: None,
            rules: None,
            require_post_approval: false,
            members_count: 3,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    pub(crate) fn create_test_moderator(
        department_id: &str,
        user_id: &str,
        permissions: ModeratorPermissions,
    ) -> department_moderator::Model {
        department_moderator::Model {
            id: format!("mod-{user_id}"),
            department_id: department_id.to_string(),
            user_id: user_id.to_string(),
            permissions,
            assigned_by: "creator".to_string(),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_member(user_id: &str, is_banned: bool) -> department_member::Model {
        department_member::Model {
            id: format!("m-{user_id}"),
            department_id: "dept1".to_string(),
            user_id: user_id.to_string(),
            is_banned,
            banned_by: None,
            joined_at: Utc::now().into(),
        }
    }

    fn empty_db() -> Arc<DatabaseConnection> {
        Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
    }

    fn service(
        moderator_db: Arc<DatabaseConnection>,
        department_db: Arc<DatabaseConnection>,
    ) -> ModeratorService {
        ModeratorService::new(
            ModeratorRepository::new(moderator_db),
            DepartmentRepository::new(department_db),
        )
    }

    #[test]
    fn test_parse_permissions_rejects_unknown_keys() {
        let result = parse_permissions(json!({ "canApprovePost": true, "isRoot": true }));
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_parse_permissions_defaults_missing_keys() {
        let perms = parse_permissions(json!({ "canBanUser": true })).unwrap();
        assert!(perms.can_ban_user);
        assert!(!perms.can_approve_post);
    }

    #[tokio::test]
    async fn test_creator_is_always_authorized() {
        let service = service(empty_db(), empty_db());
        let department = create_test_department("dept1", "creator");

        service
            .authorize(&department, "creator", ModeratorPermission::EditRules)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_moderator_without_create_event_is_forbidden() {
        let moderator_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_moderator(
                    "dept1",
                    "mod1",
                    ModeratorPermissions {
                        can_approve_post: true,
                        ..Default::default()
                    },
                )]])
                .into_connection(),
        );

        let service = service(moderator_db, empty_db());
        let department = create_test_department("dept1", "creator");
        let result = service
            .authorize(&department, "mod1", ModeratorPermission::CreateEvent)
            .await;

        match result {
            Err(AppError::Forbidden(msg)) => {
                assert_eq!(msg, "You do not have permission to create events.");
            }
            other => panic!("Expected Forbidden, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_grant_is_read_on_every_check() {
        // First check sees the permission, second sees it revoked
        let moderator_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_moderator(
                    "dept1",
                    "mod1",
                    ModeratorPermissions {
                        can_delete_post: true,
                        ..Default::default()
                    },
                )]])
                .append_query_results([[create_test_moderator(
                    "dept1",
                    "mod1",
                    ModeratorPermissions::default(),
                )]])
                .into_connection(),
        );

        let service = service(moderator_db, empty_db());
        let department = create_test_department("dept1", "creator");

        assert!(service
            .authorize(&department, "mod1", ModeratorPermission::DeletePost)
            .await
            .is_ok());
        assert!(matches!(
            service
                .authorize(&department, "mod1", ModeratorPermission::DeletePost)
                .await,
            Err(AppError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_non_moderator_is_forbidden() {
        let moderator_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<department_moderator::Model>::new()])
                .into_connection(),
        );

        let service = service(moderator_db, empty_db());
        let department = create_test_department("dept1", "creator");
        let result = service
            .authorize(&department, "stranger", ModeratorPermission::ApprovePost)
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_add_by_non_creator_is_forbidden() {
        let department_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_department("dept1", "creator")]])
                .into_connection(),
        );

        let service = service(empty_db(), department_db);
        let result = service
            .add(
                "mod1",
                "dept1",
                AddModeratorInput {
                    user_id: "user2".to_string(),
                    permissions: None,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_add_duplicate_is_conflict() {
        let department_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_department("dept1", "creator")]])
                .append_query_results([[create_test_member("user2", false)]])
                .into_connection(),
        );
        let moderator_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_moderator(
                    "dept1",
                    "user2",
                    ModeratorPermissions::default(),
                )]])
                .into_connection(),
        );

        let service = service(moderator_db, department_db);
        let result = service
            .add(
                "creator",
                "dept1",
                AddModeratorInput {
                    user_id: "user2".to_string(),
                    permissions: Some(json!({ "canApprovePost": true })),
                },
            )
            .await;

        match result {
            Err(AppError::Conflict(msg)) => assert_eq!(msg, "User is already a moderator"),
            other => panic!("Expected Conflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_add_banned_member_is_rejected() {
        let department_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_department("dept1", "creator")]])
                .append_query_results([[create_test_member("user2", true)]])
                .into_connection(),
        );

        let service = service(empty_db(), department_db);
        let result = service
            .add(
                "creator",
                "dept1",
                AddModeratorInput {
                    user_id: "user2".to_string(),
                    permissions: None,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_add_with_invalid_permissions_is_rejected() {
        let department_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_department("dept1", "creator")]])
                .into_connection(),
        );

        let service = service(empty_db(), department_db);
        let result = service
            .add(
                "creator",
                "dept1",
                AddModeratorInput {
                    user_id: "user2".to_string(),
                    permissions: Some(json!({ "canBanUser": "yes" })),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_missing_grant_is_not_found() {
        let department_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_department("dept1", "creator")]])
                .into_connection(),
        );
        let moderator_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<department_moderator::Model>::new()])
                .into_connection(),
        );

        let service = service(moderator_db, department_db);
        let result = service
            .update_permissions("creator", "dept1", "user2", json!({}))
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_creator_gets_all_permissions() {
        let department_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_department("dept1", "creator")]])
                .into_connection(),
        );

        let service = service(empty_db(), department_db);
        let perms = service.get_permissions("dept1", "creator").await.unwrap();

        assert_eq!(perms, ModeratorPermissions::all());
    }

    #[tokio::test]
    async fn test_non_moderator_gets_no_permissions() {
        let department_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_department("dept1", "creator")]])
                .into_connection(),
        );
        let moderator_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<department_moderator::Model>::new()])
                .into_connection(),
        );

        let service = service(moderator_db, department_db);
        let perms = service.get_permissions("dept1", "someone").await.unwrap();

        assert_eq!(perms, ModeratorPermissions::default());
    }
}
