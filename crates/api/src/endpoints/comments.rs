//! Comment endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post, put},
};
use peekhour_common::AppResult;
use peekhour_core::{CommentInput, CommentView, ThreadComment};
use peekhour_db::entities::{comment, reaction::ReactionType};
use serde::Serialize;

use crate::{
    endpoints::reactions,
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::ApiResponse,
};

/// Comment response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: String,
    pub post_id: String,
    pub user_id: String,
    pub parent_comment_id: Option<String>,
    pub depth: i32,
    pub content: String,
    pub is_deleted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edited_at: Option<String>,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replies_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_reaction: Option<ReactionType>,
}

impl From<comment::Model> for CommentResponse {
    fn from(c: comment::Model) -> Self {
        Self {
            id: c.id,
            post_id: c.post_id,
            user_id: c.user_id,
            parent_comment_id: c.parent_comment_id,
            depth: c.depth,
            is_deleted: !c.is_active,
            content: c.content,
            edited_at: c.edited_at.map(|t| t.to_rfc3339()),
            created_at: c.created_at.to_rfc3339(),
            replies_count: None,
            user_reaction: None,
        }
    }
}

impl From<CommentView> for CommentResponse {
    fn from(view: CommentView) -> Self {
        Self {
            replies_count: Some(view.replies_count),
            user_reaction: view.user_reaction,
            ..view.comment.into()
        }
    }
}

/// A comment placed in a thread.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadCommentResponse {
    #[serde(flatten)]
    pub comment: CommentResponse,
    /// Distance below the requested comment.
    pub thread_depth: usize,
    pub path: String,
}

impl From<ThreadComment> for ThreadCommentResponse {
    fn from(entry: ThreadComment) -> Self {
        Self {
            comment: entry.view.into(),
            thread_depth: entry.depth,
            path: entry.path,
        }
    }
}

/// Direct replies of a comment.
async fn replies(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(comment_id): Path<String>,
) -> AppResult<ApiResponse<Vec<CommentResponse>>> {
    let replies = state
        .comment_service
        .get_replies(&comment_id, viewer.id())
        .await?;

    Ok(ApiResponse::ok(replies.into_iter().map(Into::into).collect()))
}

/// A comment and every descendant, in reading order.
async fn thread(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(comment_id): Path<String>,
) -> AppResult<ApiResponse<Vec<ThreadCommentResponse>>> {
    let thread = state
        .comment_service
        .get_thread(&comment_id, viewer.id())
        .await?;

    Ok(ApiResponse::ok(thread.into_iter().map(Into::into).collect()))
}

/// Edit one's own comment.
async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(comment_id): Path<String>,
    Json(input): Json<CommentInput>,
) -> AppResult<ApiResponse<CommentResponse>> {
    let updated = state
        .comment_service
        .update(&user.id, &comment_id, input)
        .await?;

    Ok(ApiResponse::ok(updated.into()).with_message("Comment updated"))
}

/// Delete one's own comment and its replies.
async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(comment_id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.comment_service.delete(&user.id, &comment_id).await?;

    Ok(ApiResponse::message("Comment deleted"))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{comment_id}", put(update).delete(delete))
        .route("/{comment_id}/replies", get(replies))
        .route("/{comment_id}/thread", get(thread))
        .route("/{comment_id}/reactions", post(reactions::toggle_comment))
}
