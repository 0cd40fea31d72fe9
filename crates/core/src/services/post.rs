//! Post service.

use peekhour_common::{AppError, AppResult, IdGenerator};
use peekhour_db::{
    entities::{
        pending_post::{self, PendingStatus},
        post::{self, MediaType},
    },
    repositories::{DepartmentRepository, PendingPostRepository, PostRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// Largest feed page.
pub const MAX_FEED_LIMIT: u64 = 100;

/// Input for creating a post.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostInput {
    #[validate(length(max = 5000))]
    pub content: Option<String>,
    #[validate(url)]
    pub media_url: Option<String>,
    pub media_type: Option<MediaType>,
    #[validate(length(max = 256))]
    pub location_name: Option<String>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
    pub department_id: Option<String>,
}

/// A newly created post and, for moderated departments, its queue entry.
#[derive(Debug, Clone)]
pub struct CreatedPost {
    pub post: post::Model,
    pub pending: Option<pending_post::Model>,
}

/// Post service for business logic.
#[derive(Clone)]
pub struct PostService {
    post_repo: PostRepository,
    department_repo: DepartmentRepository,
    pending_repo: PendingPostRepository,
    id_gen: IdGenerator,
}

impl PostService {
    /// Create a new post service.
    #[must_use]
    pub const fn new(
        post_repo: PostRepository,
        department_repo: DepartmentRepository,
        pending_repo: PendingPostRepository,
    ) -> Self {
        Self {
            post_repo,
            department_repo,
            pending_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a post.
    ///
    /// Posts into a department that requires approval are stored hidden and
    /// queued for review, unless the author created the department.
    pub async fn create(&self, author_id: &str, input: CreatePostInput) -> AppResult<CreatedPost> {
        input.validate()?;

        let content = input
            .content
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(ToString::to_string);

        if content.is_none() && input.media_url.is_none() {
            return Err(AppError::Validation(
                "A post needs content or media".to_string(),
            ));
        }

        let media_type = match (&input.media_url, input.media_type) {
            (None, _) => MediaType::Text,
            (Some(_), Some(MediaType::Text)) => {
                return Err(AppError::Validation(
                    "mediaType must describe the attached media".to_string(),
                ));
            }
            (Some(_), Some(t)) => t,
            (Some(_), None) => MediaType::Photo,
        };

        let mut requires_approval = false;
        if let Some(department_id) = &input.department_id {
            let department = self.department_repo.get_by_id(department_id).await?;

            let banned = self
                .department_repo
                .find_member(&department.id, author_id)
                .await?
                .is_some_and(|m| m.is_banned);
            if banned {
                return Err(AppError::Forbidden(
                    "You are banned from this department".to_string(),
                ));
            }

            requires_approval =
                department.require_post_approval && !department.is_admin(author_id);
        }

        let post_id = self.id_gen.generate();
        let model = post::ActiveModel {
            id: Set(post_id.clone()),
            user_id: Set(author_id.to_string()),
            department_id: Set(input.department_id.clone()),
            content: Set(content),
            media_url: Set(input.media_url),
            media_type: Set(media_type),
            location_name: Set(input.location_name),
            latitude: Set(input.latitude),
            longitude: Set(input.longitude),
            is_active: Set(!requires_approval),
            created_at: Set(chrono::Utc::now().into()),
            updated_at: Set(None),
        };

        let (created, pending) = match input.department_id {
            Some(department_id) if requires_approval => {
                let entry = pending_post::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    post_id: Set(post_id),
                    department_id: Set(department_id),
                    submitted_by: Set(author_id.to_string()),
                    status: Set(PendingStatus::Pending),
                    reviewed_by: Set(None),
                    reviewed_at: Set(None),
                    rejection_reason: Set(None),
                    created_at: Set(chrono::Utc::now().into()),
                };
                let (created, queued) = self.pending_repo.create_queued(model, entry).await?;
                (created, Some(queued))
            }
            _ => (self.post_repo.create(model).await?, None),
        };

        tracing::debug!(
            post_id = %created.id,
            pending = pending.is_some(),
            "Created post"
        );

        Ok(CreatedPost {
            post: created,
            pending,
        })
    }

    /// Get a post. Hidden posts are only visible to their author.
    pub async fn get(&self, id: &str, viewer_id: Option<&str>) -> AppResult<post::Model> {
        let post = self.post_repo.get_by_id(id).await?;

        if !post.is_active && viewer_id != Some(post.user_id.as_str()) {
            return Err(AppError::PostNotFound(id.to_string()));
        }

        Ok(post)
    }

    /// Newest visible posts.
    pub async fn recent(&self, limit: u64, until_id: Option<&str>) -> AppResult<Vec<post::Model>> {
        self.post_repo
            .find_recent(limit.clamp(1, MAX_FEED_LIMIT), until_id)
            .await
    }

    /// Newest visible posts of a department.
    pub async fn department_feed(
        &self,
        department_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<post::Model>> {
        let department = self.department_repo.get_by_id(department_id).await?;

        self.post_repo
            .find_by_department(&department.id, limit.clamp(1, MAX_FEED_LIMIT), until_id)
            .await
    }
}
