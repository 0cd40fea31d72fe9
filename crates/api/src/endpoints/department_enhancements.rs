//! Department moderation endpoints: the approval queue, moderator grants
//! and moderator-gated actions.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, post, put},
};
use peekhour_common::AppResult;
use peekhour_core::{AddModeratorInput, BanInput, EditRulesInput, ReviewInput, SubmitPostInput};
use peekhour_db::entities::{
    department_moderator::{self, ModeratorPermissions},
    pending_post::{self, PendingStatus},
};
use serde::{Deserialize, Serialize};

use crate::{
    endpoints::departments::DepartmentResponse, extractors::AuthUser, middleware::AppState,
    response::ApiResponse,
};

/// Pending post response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingPostResponse {
    pub id: String,
    pub post_id: String,
    pub department_id: String,
    pub submitted_by: String,
    pub status: PendingStatus,
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<String>,
    pub rejection_reason: Option<String>,
    pub created_at: String,
}

impl From<pending_post::Model> for PendingPostResponse {
    fn from(p: pending_post::Model) -> Self {
        Self {
            id: p.id,
            post_id: p.post_id,
            department_id: p.department_id,
            submitted_by: p.submitted_by,
            status: p.status,
            reviewed_by: p.reviewed_by,
            reviewed_at: p.reviewed_at.map(|t| t.to_rfc3339()),
            rejection_reason: p.rejection_reason,
            created_at: p.created_at.to_rfc3339(),
        }
    }
}

/// Moderator response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeratorResponse {
    pub id: String,
    pub department_id: String,
    pub user_id: String,
    pub permissions: ModeratorPermissions,
    pub assigned_by: String,
    pub created_at: String,
}

impl From<department_moderator::Model> for ModeratorResponse {
    fn from(m: department_moderator::Model) -> Self {
        Self {
            id: m.id,
            department_id: m.department_id,
            user_id: m.user_id,
            permissions: m.permissions,
            assigned_by: m.assigned_by,
            created_at: m.created_at.to_rfc3339(),
        }
    }
}

/// Review queue pagination.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueQuery {
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub since_id: Option<String>,
}

const fn default_limit() -> u64 {
    20
}

/// Permission update request.
#[derive(Debug, Deserialize)]
pub struct UpdatePermissionsRequest {
    pub permissions: serde_json::Value,
}

async fn submit(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<SubmitPostInput>,
) -> AppResult<ApiResponse<PendingPostResponse>> {
    let pending = state.post_approval_service.submit(&user.id, input).await?;

    Ok(ApiResponse::created(pending.into()).with_message("Post submitted for approval"))
}

async fn list_pending(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(department_id): Path<String>,
    Query(query): Query<QueueQuery>,
) -> AppResult<ApiResponse<Vec<PendingPostResponse>>> {
    let pending = state
        .post_approval_service
        .list_pending(&user.id, &department_id, query.limit, query.since_id.as_deref())
        .await?;

    Ok(ApiResponse::ok(pending.into_iter().map(Into::into).collect()))
}

async fn review(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    Json(input): Json<ReviewInput>,
) -> AppResult<ApiResponse<PendingPostResponse>> {
    let reviewed = state
        .post_approval_service
        .review(&user.id, &post_id, input)
        .await?;

    let message = match reviewed.status {
        PendingStatus::Approved => "Post approved",
        _ => "Post rejected",
    };

    Ok(ApiResponse::ok(reviewed.into()).with_message(message))
}

async fn add_moderator(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(department_id): Path<String>,
    Json(input): Json<AddModeratorInput>,
) -> AppResult<ApiResponse<ModeratorResponse>> {
    let moderator = state
        .moderator_service
        .add(&user.id, &department_id, input)
        .await?;

    Ok(ApiResponse::created(moderator.into()))
}

async fn list_moderators(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Path(department_id): Path<String>,
) -> AppResult<ApiResponse<Vec<ModeratorResponse>>> {
    let moderators = state.moderator_service.list(&department_id).await?;

    Ok(ApiResponse::ok(
        moderators.into_iter().map(Into::into).collect(),
    ))
}

async fn remove_moderator(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path((department_id, user_id)): Path<(String, String)>,
) -> AppResult<ApiResponse<()>> {
    state
        .moderator_service
        .remove(&user.id, &department_id, &user_id)
        .await?;

    Ok(ApiResponse::message("Moderator removed"))
}

async fn get_permissions(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Path((department_id, user_id)): Path<(String, String)>,
) -> AppResult<ApiResponse<ModeratorPermissions>> {
    let permissions = state
        .moderator_service
        .get_permissions(&department_id, &user_id)
        .await?;

    Ok(ApiResponse::ok(permissions))
}

async fn update_permissions(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path((department_id, user_id)): Path<(String, String)>,
    Json(req): Json<UpdatePermissionsRequest>,
) -> AppResult<ApiResponse<ModeratorResponse>> {
    let moderator = state
        .moderator_service
        .update_permissions(&user.id, &department_id, &user_id, req.permissions)
        .await?;

    Ok(ApiResponse::ok(moderator.into()).with_message("Permissions updated"))
}

async fn remove_post(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path((department_id, post_id)): Path<(String, String)>,
) -> AppResult<ApiResponse<()>> {
    state
        .moderation_service
        .remove_post(&user.id, &department_id, &post_id)
        .await?;

    Ok(ApiResponse::message("Post removed"))
}

async fn remove_comment(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path((department_id, comment_id)): Path<(String, String)>,
) -> AppResult<ApiResponse<()>> {
    state
        .moderation_service
        .remove_comment(&user.id, &department_id, &comment_id)
        .await?;

    Ok(ApiResponse::message("Comment removed"))
}

async fn ban(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(department_id): Path<String>,
    Json(input): Json<BanInput>,
) -> AppResult<ApiResponse<()>> {
    state
        .moderation_service
        .ban(&user.id, &department_id, input)
        .await?;

    Ok(ApiResponse::message("User banned"))
}

async fn edit_rules(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(department_id): Path<String>,
    Json(input): Json<EditRulesInput>,
) -> AppResult<ApiResponse<DepartmentResponse>> {
    let department = state
        .moderation_service
        .edit_rules(&user.id, &department_id, input)
        .await?;

    Ok(ApiResponse::ok(department.into()).with_message("Rules updated"))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/posts/submit", post(submit))
        .route("/posts/{post_id}/review", post(review))
        .route("/{department_id}/pending-posts", get(list_pending))
        .route(
            "/{department_id}/moderators",
            get(list_moderators).post(add_moderator),
        )
        .route(
            "/{department_id}/moderators/{user_id}",
            delete(remove_moderator),
        )
        .route(
            "/{department_id}/moderators/{user_id}/permissions",
            get(get_permissions).put(update_permissions),
        )
        .route("/{department_id}/posts/{post_id}", delete(remove_post))
        .route(
            "/{department_id}/comments/{comment_id}",
            delete(remove_comment),
        )
        .route("/{department_id}/bans", post(ban))
        .route("/{department_id}/rules", put(edit_rules))
}
