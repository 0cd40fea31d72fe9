//! Moderator actions inside a department.
//!
//! Every action names the single permission it needs and is authorized
//! against the current moderator grant.

use crate::services::moderator::ModeratorService;
use peekhour_common::{AppError, AppResult, IdGenerator};
use peekhour_db::{
    entities::{department, department_member, department_moderator::ModeratorPermission},
    repositories::{CommentRepository, DepartmentRepository, PostRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// Input for banning a user.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BanInput {
    #[validate(length(min = 1, max = 64))]
    pub user_id: String,
}

/// Input for replacing department rules. `None` clears them.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EditRulesInput {
    #[validate(length(max = 8192))]
    pub rules: Option<String>,
}

/// Department moderation service.
#[derive(Clone)]
pub struct DepartmentModerationService {
    moderator_service: ModeratorService,
    department_repo: DepartmentRepository,
    post_repo: PostRepository,
    comment_repo: CommentRepository,
    id_gen: IdGenerator,
}

impl DepartmentModerationService {
    /// Create a new department moderation service.
    #[must_use]
    pub const fn new(
        moderator_service: ModeratorService,
        department_repo: DepartmentRepository,
        post_repo: PostRepository,
        comment_repo: CommentRepository,
    ) -> Self {
        Self {
            moderator_service,
            department_repo,
            post_repo,
            comment_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Hide a post of the department.
    pub async fn remove_post(&self, actor_id: &str, department_id: &str, post_id: &str) -> AppResult<()> {
        let department = self
            .moderator_service
            .authorize_in(department_id, actor_id, ModeratorPermission::DeletePost)
            .await?;

        let post = self.post_repo.get_by_id(post_id).await?;
        if post.department_id.as_deref() != Some(department.id.as_str()) {
            return Err(AppError::PostNotFound(post_id.to_string()));
        }

        self.post_repo.set_active(&post.id, false).await?;

        tracing::info!(
            department_id = %department.id,
            post_id = %post.id,
            moderator_id = %actor_id,
            "Moderator removed post"
        );
        Ok(())
    }

    /// Soft delete a comment on one of the department's posts.
    pub async fn remove_comment(
        &self,
        actor_id: &str,
        department_id: &str,
        comment_id: &str,
    ) -> AppResult<()> {
        let department = self
            .moderator_service
            .authorize_in(department_id, actor_id, ModeratorPermission::DeleteComment)
            .await?;

        let comment = self.comment_repo.get_by_id(comment_id).await?;
        let post = self.post_repo.get_by_id(&comment.post_id).await?;
        if post.department_id.as_deref() != Some(department.id.as_str()) {
            return Err(AppError::CommentNotFound(comment_id.to_string()));
        }

        if self.comment_repo.soft_delete(&comment.id).await? == 0 {
            return Err(AppError::CommentNotFound(comment_id.to_string()));
        }

        tracing::info!(
            department_id = %department.id,
            comment_id = %comment.id,
            moderator_id = %actor_id,
            "Moderator removed comment"
        );
        Ok(())
    }

    /// Ban a user from the department. A banned moderator loses the grant.
    pub async fn ban(&self, actor_id: &str, department_id: &str, input: BanInput) -> AppResult<()> {
        input.validate()?;

        let department = self
            .moderator_service
            .authorize_in(department_id, actor_id, ModeratorPermission::BanUser)
            .await?;

        if department.is_admin(&input.user_id) {
            return Err(AppError::BadRequest(
                "The department creator cannot be banned".to_string(),
            ));
        }
        if input.user_id == actor_id {
            return Err(AppError::BadRequest("You cannot ban yourself".to_string()));
        }

        let new_row = department_member::ActiveModel {
            id: Set(self.id_gen.generate()),
            department_id: Set(department.id.clone()),
            user_id: Set(input.user_id.clone()),
            is_banned: Set(true),
            banned_by: Set(Some(actor_id.to_string())),
            joined_at: Set(chrono::Utc::now().into()),
        };

        self.department_repo
            .ban_member(&department.id, &input.user_id, actor_id, new_row)
            .await?;

        tracing::info!(
            department_id = %department.id,
            user_id = %input.user_id,
            moderator_id = %actor_id,
            "Banned user from department"
        );
        Ok(())
    }

    /// Replace the department rules.
    pub async fn edit_rules(
        &self,
        actor_id: &str,
        department_id: &str,
        input: EditRulesInput,
    ) -> AppResult<department::Model> {
        input.validate()?;

        let department = self
            .moderator_service
            .authorize_in(department_id, actor_id, ModeratorPermission::EditRules)
            .await?;

        let rules = input
            .rules
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());

        let mut active: department::ActiveModel = department.into();
        active.rules = Set(rules);
        active.updated_at = Set(Some(chrono::Utc::now().into()));

        self.department_repo.update(active).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::moderator::tests::{create_test_department, create_test_moderator};
    use crate::services::post::tests::create_test_post;
    use peekhour_db::entities::department_moderator::{self, ModeratorPermissions};
    use peekhour_db::repositories::ModeratorRepository;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn empty_db() -> Arc<DatabaseConnection> {
        Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
    }

    fn exec(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    fn service(
        department_db: Arc<DatabaseConnection>,
        moderator_db: Arc<DatabaseConnection>,
        post_db: Arc<DatabaseConnection>,
        comment_db: Arc<DatabaseConnection>,
    ) -> DepartmentModerationService {
        let department_repo = DepartmentRepository::new(department_db);
        DepartmentModerationService::new(
            ModeratorService::new(ModeratorRepository::new(moderator_db), department_repo.clone()),
            department_repo,
            PostRepository::new(post_db),
            CommentRepository::new(comment_db),
        )
    }

    fn department_db() -> Arc<DatabaseConnection> {
        Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_department("dept1", "creator")]])
                .into_connection(),
        )
    }

    #[tokio::test]
    async fn test_remove_post_requires_delete_permission() {
        let moderator_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_moderator(
                    "dept1",
                    "mod1",
                    ModeratorPermissions {
                        can_delete_comment: true,
                        ..Default::default()
                    },
                )]])
                .into_connection(),
        );

        let service = service(department_db(), moderator_db, empty_db(), empty_db());
        let result = service.remove_post("mod1", "dept1", "post1").await;

        match result {
            Err(AppError::Forbidden(msg)) => {
                assert_eq!(msg, "You do not have permission to remove posts.");
            }
            other => panic!("Expected Forbidden, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_remove_post_of_other_department_is_not_found() {
        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_post("post1", "author", Some("dept2"), true)]])
                .into_connection(),
        );

        let service = service(department_db(), empty_db(), post_db, empty_db());
        let result = service.remove_post("creator", "dept1", "post1").await;

        assert!(matches!(result, Err(AppError::PostNotFound(_))));
    }

    #[tokio::test]
    async fn test_remove_post_hides_it() {
        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_post("post1", "author", Some("dept1"), true)]])
                .append_exec_results([exec(1)])
                .into_connection(),
        );

        let service = service(department_db(), empty_db(), post_db, empty_db());

        service.remove_post("creator", "dept1", "post1").await.unwrap();
    }

    #[tokio::test]
    async fn test_creator_cannot_be_banned() {
        let moderator_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_moderator(
                    "dept1",
                    "mod1",
                    ModeratorPermissions {
                        can_ban_user: true,
                        ..Default::default()
                    },
                )]])
                .into_connection(),
        );

        let service = service(department_db(), moderator_db, empty_db(), empty_db());
        let result = service
            .ban(
                "mod1",
                "dept1",
                BanInput {
                    user_id: "creator".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_ban_member() {
        let department_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_department("dept1", "creator")]])
                .append_exec_results([exec(1), exec(1), exec(0)])
                .into_connection(),
        );

        let service = service(department_db, empty_db(), empty_db(), empty_db());

        service
            .ban(
                "creator",
                "dept1",
                BanInput {
                    user_id: "troll".to_string(),
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_edit_rules_without_permission_is_forbidden() {
        let moderator_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<department_moderator::Model>::new()])
                .into_connection(),
        );

        let service = service(department_db(), moderator_db, empty_db(), empty_db());
        let result = service
            .edit_rules(
                "someone",
                "dept1",
                EditRulesInput {
                    rules: Some("Be kind".to_string()),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_edit_rules() {
        let mut updated = create_test_department("dept1", "creator");
        updated.rules = Some("Be kind".to_string());

        let department_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_department("dept1", "creator")]])
                .append_query_results([[updated]])
                .into_connection(),
        );

        let service = service(department_db, empty_db(), empty_db(), empty_db());
        let result = service
            .edit_rules(
                "creator",
                "dept1",
                EditRulesInput {
                    rules: Some("  Be kind ".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(result.rules.as_deref(), Some("Be kind"));
    }
}
