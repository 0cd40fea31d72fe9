//! Comment service.
//!
//! Root comments, nested replies (bounded by [`MAX_COMMENT_DEPTH`]), reply
//! listings and full thread reads.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use crate::services::comment_thread::CommentThread;
use crate::services::notification::{NewNotification, NotificationService};
use peekhour_common::{AppError, AppResult, IdGenerator};
use peekhour_db::{
    entities::{comment, notification::NotificationType, post, reaction::ReactionType, user},
    repositories::{CommentRepository, PostRepository, ReactionRepository, UserRepository},
};
use regex::Regex;
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// Deepest allowed reply. A root comment has depth 0.
pub const MAX_COMMENT_DEPTH: i32 = 5;

/// Default page size for comment listings.
pub const DEFAULT_PAGE_SIZE: u64 = 20;

#[allow(clippy::expect_used)]
static MENTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^A-Za-z0-9_@])@([A-Za-z0-9_]{1,32})").expect("valid mention pattern")
});

/// Input for creating or editing a comment.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CommentInput {
    #[validate(length(max = 5000))]
    pub content: String,
}

/// A comment with the data listings attach to it.
#[derive(Debug, Clone)]
pub struct CommentView {
    /// The comment. Content is blanked for removed comments.
    pub comment: comment::Model,
    pub replies_count: u64,
    /// The requester's own reaction, when authenticated.
    pub user_reaction: Option<ReactionType>,
}

/// A comment in thread order.
#[derive(Debug, Clone)]
pub struct ThreadComment {
    pub view: CommentView,
    pub depth: usize,
    pub path: String,
}

/// Comment service for business logic.
#[derive(Clone)]
pub struct CommentService {
    comment_repo: CommentRepository,
    post_repo: PostRepository,
    user_repo: UserRepository,
    reaction_repo: ReactionRepository,
    notification_service: NotificationService,
    id_gen: IdGenerator,
}

/// Lowercased, de-duplicated usernames mentioned in `text`.
#[must_use]
pub fn extract_mentions(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    MENTION_RE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_lowercase())
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

fn normalize_content(input: &CommentInput) -> AppResult<String> {
    input.validate()?;

    let content = input.content.trim();
    if content.is_empty() {
        return Err(AppError::Validation(
            "Comment content is required".to_string(),
        ));
    }

    Ok(content.to_string())
}

/// Hidden posts behave as missing for everyone but their author.
fn ensure_visible(post: &post::Model, viewer_id: Option<&str>) -> AppResult<()> {
    if post.is_active || viewer_id == Some(post.user_id.as_str()) {
        Ok(())
    } else {
        Err(AppError::PostNotFound(post.id.clone()))
    }
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub const fn new(
        comment_repo: CommentRepository,
        post_repo: PostRepository,
        user_repo: UserRepository,
        reaction_repo: ReactionRepository,
        notification_service: NotificationService,
    ) -> Self {
        Self {
            comment_repo,
            post_repo,
            user_repo,
            reaction_repo,
            notification_service,
            id_gen: IdGenerator::new(),
        }
    }

    /// Comment directly on a post.
    pub async fn create_comment(
        &self,
        author: &user::Model,
        post_id: &str,
        input: CommentInput,
    ) -> AppResult<comment::Model> {
        let content = normalize_content(&input)?;

        let post = self.post_repo.get_by_id(post_id).await?;
        ensure_visible(&post, Some(&author.id))?;

        let created = self
            .insert(author, &post.id, None, 0, content)
            .await?;

        tracing::debug!(comment_id = %created.id, post_id = %post.id, "Created comment");

        self.notification_service
            .notify_best_effort(NewNotification {
                notifiee_id: &post.user_id,
                notifier_id: Some(&author.id),
                notification_type: NotificationType::Comment,
                content: format!("{} commented on your post", author.display_name()),
                post_id: Some(&post.id),
                comment_id: Some(&created.id),
            })
            .await;

        self.notify_mentions(author, &created, &[&post.user_id]).await;

        Ok(created)
    }

    /// Reply to an existing comment of the same post.
    pub async fn create_reply(
        &self,
        author: &user::Model,
        post_id: &str,
        parent_comment_id: &str,
        input: CommentInput,
    ) -> AppResult<comment::Model> {
        let content = normalize_content(&input)?;

        let post = self.post_repo.get_by_id(post_id).await?;
        ensure_visible(&post, Some(&author.id))?;

        let parent = self
            .comment_repo
            .find_by_id(parent_comment_id)
            .await?
            .filter(|c| c.post_id == post.id && c.is_active)
            .ok_or_else(|| AppError::CommentNotFound(parent_comment_id.to_string()))?;

        let depth = parent.depth + 1;
        if depth > MAX_COMMENT_DEPTH {
            return Err(AppError::Validation(
                "Maximum nesting depth reached".to_string(),
            ));
        }

        let created = self
            .insert(author, &post.id, Some(&parent.id), depth, content)
            .await?;

        tracing::debug!(
            comment_id = %created.id,
            parent_id = %parent.id,
            depth = depth,
            "Created reply"
        );

        self.notification_service
            .notify_best_effort(NewNotification {
                notifiee_id: &parent.user_id,
                notifier_id: Some(&author.id),
                notification_type: NotificationType::Reply,
                content: format!("{} replied to your comment", author.display_name()),
                post_id: Some(&post.id),
                comment_id: Some(&created.id),
            })
            .await;

        self.notify_mentions(author, &created, &[&parent.user_id])
            .await;

        Ok(created)
    }

    async fn insert(
        &self,
        author: &user::Model,
        post_id: &str,
        parent_comment_id: Option<&str>,
        depth: i32,
        content: String,
    ) -> AppResult<comment::Model> {
        let now = chrono::Utc::now();
        let model = comment::ActiveModel {
            id: Set(self.id_gen.generate()),
            post_id: Set(post_id.to_string()),
            user_id: Set(author.id.clone()),
            parent_comment_id: Set(parent_comment_id.map(ToString::to_string)),
            depth: Set(depth),
            content: Set(content),
            is_active: Set(true),
            edited_at: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(None),
        };

        self.comment_repo.create(model).await
    }

    /// Notify users mentioned in a new comment, skipping the author and
    /// anyone in `already_notified`.
    async fn notify_mentions(
        &self,
        author: &user::Model,
        comment: &comment::Model,
        already_notified: &[&str],
    ) {
        let usernames = extract_mentions(&comment.content);
        if usernames.is_empty() {
            return;
        }

        let users = match self.user_repo.find_by_usernames(&usernames).await {
            Ok(users) => users,
            Err(e) => {
                tracing::warn!(error = %e, comment_id = %comment.id, "Failed to resolve mentions");
                return;
            }
        };

        for mentioned in users {
            if mentioned.id == author.id || already_notified.contains(&mentioned.id.as_str()) {
                continue;
            }

            self.notification_service
                .notify_best_effort(NewNotification {
                    notifiee_id: &mentioned.id,
                    notifier_id: Some(&author.id),
                    notification_type: NotificationType::Mention,
                    content: format!("{} mentioned you in a comment", author.display_name()),
                    post_id: Some(&comment.post_id),
                    comment_id: Some(&comment.id),
                })
                .await;
        }
    }

    /// Comments of a hidden post are as hidden as the post.
    async fn ensure_post_visible(&self, post_id: &str, viewer_id: Option<&str>) -> AppResult<()> {
        let post = self.post_repo.get_by_id(post_id).await?;
        ensure_visible(&post, viewer_id)
    }

    /// Direct replies of a comment, oldest first.
    pub async fn get_replies(
        &self,
        comment_id: &str,
        viewer_id: Option<&str>,
    ) -> AppResult<Vec<CommentView>> {
        let parent = self.comment_repo.get_by_id(comment_id).await?;
        self.ensure_post_visible(&parent.post_id, viewer_id).await?;

        let replies = self.comment_repo.find_children(&parent.id).await?;

        self.annotate(replies, viewer_id).await
    }

    /// A comment and all of its descendants in pre-order.
    pub async fn get_thread(
        &self,
        comment_id: &str,
        viewer_id: Option<&str>,
    ) -> AppResult<Vec<ThreadComment>> {
        let root = self.comment_repo.get_by_id(comment_id).await?;
        self.ensure_post_visible(&root.post_id, viewer_id).await?;

        let rows = self
            .comment_repo
            .find_subtree(&root.id, MAX_COMMENT_DEPTH)
            .await?;

        let entries = CommentThread::build(&root.id, rows, MAX_COMMENT_DEPTH as usize)
            .ok_or_else(|| AppError::CommentNotFound(root.id.clone()))?
            .into_entries();

        let mut placement = Vec::with_capacity(entries.len());
        let mut comments = Vec::with_capacity(entries.len());
        for entry in entries {
            placement.push((entry.depth, entry.path));
            comments.push(entry.comment);
        }

        let views = self.annotate(comments, viewer_id).await?;

        Ok(views
            .into_iter()
            .zip(placement)
            .map(|(view, (depth, path))| ThreadComment { view, depth, path })
            .collect())
    }

    /// Active root comments of a post, oldest first.
    pub async fn list_post_comments(
        &self,
        post_id: &str,
        viewer_id: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<CommentView>> {
        let post = self.post_repo.get_by_id(post_id).await?;
        ensure_visible(&post, viewer_id)?;

        let roots = self
            .comment_repo
            .find_roots_by_post(&post.id, limit.clamp(1, 100), offset)
            .await?;

        self.annotate(roots, viewer_id).await
    }

    /// Attach reply counts and the viewer's reactions.
    async fn annotate(
        &self,
        comments: Vec<comment::Model>,
        viewer_id: Option<&str>,
    ) -> AppResult<Vec<CommentView>> {
        if comments.is_empty() {
            return Ok(vec![]);
        }

        let ids: Vec<String> = comments.iter().map(|c| c.id.clone()).collect();
        let counts = self.comment_repo.count_children(&ids).await?;

        let reactions: HashMap<String, ReactionType> = match viewer_id {
            Some(viewer) => self
                .reaction_repo
                .find_by_user_and_comments(viewer, &ids)
                .await?
                .into_iter()
                .filter_map(|r| r.comment_id.map(|id| (id, r.reaction_type)))
                .collect(),
            None => HashMap::new(),
        };

        Ok(comments
            .into_iter()
            .map(|mut comment| {
                if !comment.is_active {
                    comment.content.clear();
                }
                CommentView {
                    replies_count: counts.get(&comment.id).copied().unwrap_or(0),
                    user_reaction: reactions.get(&comment.id).copied(),
                    comment,
                }
            })
            .collect())
    }

    /// Edit the content of one's own comment.
    pub async fn update(
        &self,
        user_id: &str,
        comment_id: &str,
        input: CommentInput,
    ) -> AppResult<comment::Model> {
        let content = normalize_content(&input)?;

        let existing = self.comment_repo.get_by_id(comment_id).await?;
        if !existing.is_active {
            return Err(AppError::CommentNotFound(comment_id.to_string()));
        }
        if existing.user_id != user_id {
            return Err(AppError::Forbidden(
                "You can only edit your own comments".to_string(),
            ));
        }

        let now = chrono::Utc::now();
        let mut active: comment::ActiveModel = existing.into();
        active.content = Set(content);
        active.edited_at = Set(Some(now.into()));
        active.updated_at = Set(Some(now.into()));

        self.comment_repo.update(active).await
    }

    /// Permanently delete one's own comment together with its replies.
    pub async fn delete(&self, user_id: &str, comment_id: &str) -> AppResult<()> {
        let existing = self.comment_repo.get_by_id(comment_id).await?;
        if existing.user_id != user_id {
            return Err(AppError::Forbidden(
                "You can only delete your own comments".to_string(),
            ));
        }

        self.comment_repo.delete(&existing.id).await?;
        tracing::debug!(comment_id = %existing.id, "Deleted comment and its replies");

        Ok(())
    }

    /// Hide one's own comment on a post. Replies stay in place.
    pub async fn soft_delete(
        &self,
        user_id: &str,
        post_id: &str,
        comment_id: &str,
    ) -> AppResult<()> {
        let existing = self
            .comment_repo
            .find_by_id(comment_id)
            .await?
            .filter(|c| c.post_id == post_id && c.is_active)
            .ok_or_else(|| AppError::CommentNotFound(comment_id.to_string()))?;

        if existing.user_id != user_id {
            return Err(AppError::Forbidden(
                "You can only delete your own comments".to_string(),
            ));
        }

        self.comment_repo.soft_delete(&existing.id).await?;
        Ok(())
    }
}
