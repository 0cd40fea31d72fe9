//! Post endpoints, including the comments of a post.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, post},
};
use peekhour_common::AppResult;
use peekhour_core::{CommentInput, CreatePostInput, CreatedPost, comment::DEFAULT_PAGE_SIZE};
use peekhour_db::entities::post::{self, MediaType};
use serde::{Deserialize, Serialize};

use crate::{
    endpoints::{comments::CommentResponse, reactions},
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::ApiResponse,
};

/// Post response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: String,
    pub user_id: String,
    pub department_id: Option<String>,
    pub content: Option<String>,
    pub media_url: Option<String>,
    pub media_type: MediaType,
    pub location_name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub is_active: bool,
    pub created_at: String,
}

impl From<post::Model> for PostResponse {
    fn from(p: post::Model) -> Self {
        Self {
            id: p.id,
            user_id: p.user_id,
            department_id: p.department_id,
            content: p.content,
            media_url: p.media_url,
            media_type: p.media_type,
            location_name: p.location_name,
            latitude: p.latitude,
            longitude: p.longitude,
            is_active: p.is_active,
            created_at: p.created_at.to_rfc3339(),
        }
    }
}

/// Created post response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostResponse {
    pub post: PostResponse,
    /// Set when the post waits for department approval.
    pub pending_post_id: Option<String>,
}

/// Cursor pagination for feeds.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedQuery {
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub until_id: Option<String>,
}

/// Offset pagination for comment listings.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

const fn default_limit() -> u64 {
    DEFAULT_PAGE_SIZE
}

async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreatePostInput>,
) -> AppResult<ApiResponse<CreatePostResponse>> {
    let CreatedPost { post, pending } = state.post_service.create(&user.id, input).await?;

    let response = ApiResponse::created(CreatePostResponse {
        post: post.into(),
        pending_post_id: pending.as_ref().map(|p| p.id.clone()),
    });

    Ok(if pending.is_some() {
        response.with_message("Post submitted for approval")
    } else {
        response
    })
}

async fn recent(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> AppResult<ApiResponse<Vec<PostResponse>>> {
    let posts = state
        .post_service
        .recent(query.limit, query.until_id.as_deref())
        .await?;

    Ok(ApiResponse::ok(posts.into_iter().map(Into::into).collect()))
}

async fn show(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> AppResult<ApiResponse<PostResponse>> {
    let post = state.post_service.get(&post_id, viewer.id()).await?;

    Ok(ApiResponse::ok(post.into()))
}

async fn list_comments(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<ApiResponse<Vec<CommentResponse>>> {
    let comments = state
        .comment_service
        .list_post_comments(&post_id, viewer.id(), query.limit, query.offset)
        .await?;

    Ok(ApiResponse::ok(comments.into_iter().map(Into::into).collect()))
}

async fn create_comment(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    Json(input): Json<CommentInput>,
) -> AppResult<ApiResponse<CommentResponse>> {
    let created = state
        .comment_service
        .create_comment(&user, &post_id, input)
        .await?;

    Ok(ApiResponse::created(created.into()))
}

async fn reply(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path((post_id, parent_comment_id)): Path<(String, String)>,
    Json(input): Json<CommentInput>,
) -> AppResult<ApiResponse<CommentResponse>> {
    let created = state
        .comment_service
        .create_reply(&user, &post_id, &parent_comment_id, input)
        .await?;

    Ok(ApiResponse::created(created.into()).with_message("Reply created"))
}

async fn delete_comment(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path((post_id, comment_id)): Path<(String, String)>,
) -> AppResult<ApiResponse<()>> {
    state
        .comment_service
        .soft_delete(&user.id, &post_id, &comment_id)
        .await?;

    Ok(ApiResponse::message("Comment deleted"))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(recent).post(create))
        .route("/{post_id}", get(show))
        .route("/{post_id}/reactions", post(reactions::toggle_post))
        .route(
            "/{post_id}/comments",
            get(list_comments).post(create_comment),
        )
        .route("/{post_id}/comments/{comment_id}", delete(delete_comment))
        .route("/{post_id}/comments/{comment_id}/reply", post(reply))
}
