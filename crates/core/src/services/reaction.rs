//! Reaction service.

use crate::services::notification::{NewNotification, NotificationService};
use peekhour_common::{AppError, AppResult, IdGenerator};
use peekhour_db::{
    entities::{
        notification::NotificationType,
        post,
        reaction::{self, ReactionTarget, ReactionType},
        user,
    },
    repositories::{CommentRepository, PostRepository, ReactionCount, ReactionRepository},
};
use sea_orm::Set;

/// What a toggle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReactionOutcome {
    Added(reaction::Model),
    Changed(reaction::Model),
    Removed,
}

impl ReactionOutcome {
    /// The reaction now held by the user, if any.
    #[must_use]
    pub const fn reaction_type(&self) -> Option<ReactionType> {
        match self {
            Self::Added(r) | Self::Changed(r) => Some(r.reaction_type),
            Self::Removed => None,
        }
    }
}

/// Parse a `post` / `comment` target from a path segment.
pub fn parse_target(target_type: &str, target_id: &str) -> AppResult<ReactionTarget> {
    match target_type {
        "post" => Ok(ReactionTarget::Post(target_id.to_string())),
        "comment" => Ok(ReactionTarget::Comment(target_id.to_string())),
        _ => Err(AppError::BadRequest("Invalid target type".to_string())),
    }
}

/// Reaction service for business logic.
#[derive(Clone)]
pub struct ReactionService {
    reaction_repo: ReactionRepository,
    post_repo: PostRepository,
    comment_repo: CommentRepository,
    notification_service: NotificationService,
    id_gen: IdGenerator,
}

impl ReactionService {
    /// Create a new reaction service.
    #[must_use]
    pub const fn new(
        reaction_repo: ReactionRepository,
        post_repo: PostRepository,
        comment_repo: CommentRepository,
        notification_service: NotificationService,
    ) -> Self {
        Self {
            reaction_repo,
            post_repo,
            comment_repo,
            notification_service,
            id_gen: IdGenerator::new(),
        }
    }

    /// A post the actor may see. Hidden posts are missing to everyone but
    /// their author.
    async fn visible_post(&self, actor_id: &str, post_id: &str) -> AppResult<post::Model> {
        let post = self.post_repo.get_by_id(post_id).await?;
        if !post.is_active && post.user_id != actor_id {
            return Err(AppError::PostNotFound(post.id));
        }
        Ok(post)
    }

    /// Owner of the reacted-to post or comment. Hidden targets are missing.
    async fn target_owner(&self, actor_id: &str, target: &ReactionTarget) -> AppResult<String> {
        match target {
            ReactionTarget::Post(id) => Ok(self.visible_post(actor_id, id).await?.user_id),
            ReactionTarget::Comment(id) => {
                let comment = self.comment_repo.get_by_id(id).await?;
                if !comment.is_active {
                    return Err(AppError::CommentNotFound(id.clone()));
                }
                self.visible_post(actor_id, &comment.post_id).await?;
                Ok(comment.user_id)
            }
        }
    }

    /// Toggle a reaction.
    ///
    /// No reaction adds one, the same type removes it and a different type
    /// replaces it in place.
    pub async fn toggle(
        &self,
        actor: &user::Model,
        target: ReactionTarget,
        reaction_type: &str,
    ) -> AppResult<ReactionOutcome> {
        let reaction_type = ReactionType::parse(reaction_type)
            .ok_or_else(|| AppError::BadRequest("Invalid reaction type".to_string()))?;

        let owner_id = self.target_owner(&actor.id, &target).await?;

        let existing = self
            .reaction_repo
            .find_by_user_and_target(&actor.id, &target)
            .await?;

        let outcome = match existing {
            Some(existing) if existing.reaction_type == reaction_type => {
                self.reaction_repo.delete(&existing.id).await?;
                ReactionOutcome::Removed
            }
            Some(existing) => {
                let mut active: reaction::ActiveModel = existing.into();
                active.reaction_type = Set(reaction_type);
                active.updated_at = Set(Some(chrono::Utc::now().into()));
                ReactionOutcome::Changed(self.reaction_repo.update(active).await?)
            }
            None => {
                let (post_id, comment_id) = match &target {
                    ReactionTarget::Post(id) => (Some(id.clone()), None),
                    ReactionTarget::Comment(id) => (None, Some(id.clone())),
                };
                let model = reaction::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    user_id: Set(actor.id.clone()),
                    post_id: Set(post_id),
                    comment_id: Set(comment_id),
                    reaction_type: Set(reaction_type),
                    created_at: Set(chrono::Utc::now().into()),
                    updated_at: Set(None),
                };
                ReactionOutcome::Added(self.reaction_repo.create(model).await?)
            }
        };

        tracing::debug!(
            user_id = %actor.id,
            target_id = %target.id(),
            outcome = ?outcome.reaction_type(),
            "Toggled reaction"
        );

        if outcome != ReactionOutcome::Removed {
            let (post_id, comment_id, noun) = match &target {
                ReactionTarget::Post(id) => (Some(id.as_str()), None, "post"),
                ReactionTarget::Comment(id) => (None, Some(id.as_str()), "comment"),
            };
            self.notification_service
                .notify_best_effort(NewNotification {
                    notifiee_id: &owner_id,
                    notifier_id: Some(&actor.id),
                    notification_type: NotificationType::Reaction,
                    content: format!(
                        "{} reacted {} to your {noun}",
                        actor.display_name(),
                        reaction_type.as_str()
                    ),
                    post_id,
                    comment_id,
                })
                .await;
        }

        Ok(outcome)
    }

    /// Reaction counts per type for a target.
    pub async fn counts(&self, target: &ReactionTarget) -> AppResult<Vec<ReactionCount>> {
        self.reaction_repo.count_by_type(target).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use peekhour_db::entities::comment;
    use peekhour_db::repositories::NotificationRepository;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn empty_db() -> Arc<DatabaseConnection> {
        Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
    }

    fn service(
        reaction_db: Arc<DatabaseConnection>,
        post_db: Arc<DatabaseConnection>,
        comment_db: Arc<DatabaseConnection>,
    ) -> ReactionService {
        ReactionService::new(
            ReactionRepository::new(reaction_db),
            PostRepository::new(post_db),
            CommentRepository::new(comment_db),
            NotificationService::new(NotificationRepository::new(empty_db())),
        )
    }

    fn actor() -> user::Model {
        user::Model {
            id: "user1".to_string(),
            username: "alice".to_string(),
            username_lower: "alice".to_string(),
            email: "alice@example.com".to_string(),
            token: None,
            name: Some("Alice".to_string()),
            avatar_url: None,
            is_active: true,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn test_post() -> post::Model {
        post::Model {
            id: "post1".to_string(),
            user_id: "owner".to_string(),
            department_id: None,
            content: Some("sunset".to_string()),
            media_url: None,
            media_type: post::MediaType::Text,
            location_name: None,
            latitude: None,
            longitude: None,
            is_active: true,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn test_reaction(reaction_type: ReactionType) -> reaction::Model {
        reaction::Model {
            id: "r1".to_string(),
            user_id: "user1".to_string(),
            post_id: Some("post1".to_string()),
            comment_id: None,
            reaction_type,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn post_db() -> Arc<DatabaseConnection> {
        Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_post()]])
                .into_connection(),
        )
    }

    #[test]
    fn test_parse_target() {
        assert_eq!(
            parse_target("post", "p1").unwrap(),
            ReactionTarget::Post("p1".to_string())
        );
        assert_eq!(
            parse_target("comment", "c1").unwrap(),
            ReactionTarget::Comment("c1".to_string())
        );
        assert!(matches!(
            parse_target("note", "n1"),
            Err(AppError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_type_is_rejected() {
        let service = service(empty_db(), empty_db(), empty_db());

        let result = service
            .toggle(&actor(), ReactionTarget::Post("post1".to_string()), "thumbsup")
            .await;

        match result {
            Err(AppError::BadRequest(msg)) => assert_eq!(msg, "Invalid reaction type"),
            other => panic!("Expected BadRequest, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_toggle_adds_when_absent() {
        let reaction_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<reaction::Model>::new()])
                .append_query_results([[test_reaction(ReactionType::Like)]])
                .into_connection(),
        );

        let service = service(reaction_db, post_db(), empty_db());
        let outcome = service
            .toggle(&actor(), ReactionTarget::Post("post1".to_string()), "like")
            .await
            .unwrap();

        assert!(matches!(outcome, ReactionOutcome::Added(_)));
        assert_eq!(outcome.reaction_type(), Some(ReactionType::Like));
    }

    #[tokio::test]
    async fn test_toggle_same_type_removes() {
        let reaction_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_reaction(ReactionType::Like)]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let service = service(reaction_db, post_db(), empty_db());
        let outcome = service
            .toggle(&actor(), ReactionTarget::Post("post1".to_string()), "like")
            .await
            .unwrap();

        assert_eq!(outcome, ReactionOutcome::Removed);
        assert_eq!(outcome.reaction_type(), None);
    }

    #[tokio::test]
    async fn test_toggle_other_type_replaces() {
        let reaction_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_reaction(ReactionType::Like)]])
                .append_query_results([[test_reaction(ReactionType::Love)]])
                .into_connection(),
        );

        let service = service(reaction_db, post_db(), empty_db());
        let outcome = service
            .toggle(&actor(), ReactionTarget::Post("post1".to_string()), "love")
            .await
            .unwrap();

        match outcome {
            ReactionOutcome::Changed(r) => {
                assert_eq!(r.id, "r1");
                assert_eq!(r.reaction_type, ReactionType::Love);
            }
            other => panic!("Expected Changed, got {other:?}"),
        }
    }

    fn test_comment(is_active: bool) -> comment::Model {
        comment::Model {
            id: "c1".to_string(),
            post_id: "post1".to_string(),
            user_id: "owner".to_string(),
            parent_comment_id: None,
            depth: 0,
            content: if is_active { "nice".to_string() } else { String::new() },
            is_active,
            edited_at: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_toggle_on_comment_of_hidden_post_is_not_found() {
        let comment_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_comment(true)]])
                .into_connection(),
        );
        let mut hidden = test_post();
        hidden.is_active = false;
        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[hidden]])
                .into_connection(),
        );

        let service = service(empty_db(), post_db, comment_db);
        let result = service
            .toggle(&actor(), ReactionTarget::Comment("c1".to_string()), "like")
            .await;

        assert!(matches!(result, Err(AppError::PostNotFound(id)) if id == "post1"));
    }

    #[tokio::test]
    async fn test_toggle_on_removed_comment_is_not_found() {
        let comment_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_comment(false)]])
                .into_connection(),
        );

        let service = service(empty_db(), empty_db(), comment_db);
        let result = service
            .toggle(&actor(), ReactionTarget::Comment("c1".to_string()), "wow")
            .await;

        assert!(matches!(result, Err(AppError::CommentNotFound(_))));
    }
}
