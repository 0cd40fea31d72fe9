//! Department endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use peekhour_common::AppResult;
use peekhour_core::{CreateDepartmentInput, CreateEventInput};
use peekhour_db::entities::{department, department_event};
use serde::Serialize;

use crate::{
    endpoints::{
        department_enhancements,
        posts::{FeedQuery, PageQuery, PostResponse},
    },
    extractors::AuthUser,
    middleware::AppState,
    response::ApiResponse,
};

/// Department response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentResponse {
    pub id: String,
    pub creator_id: String,
    pub name: String,
    pub description: Option<String>,
    pub rules: Option<String>,
    pub require_post_approval: bool,
    pub members_count: i64,
    pub created_at: String,
}

impl From<department::Model> for DepartmentResponse {
    fn from(d: department::Model) -> Self {
        Self {
            id: d.id,
            creator_id: d.creator_id,
            name: d.name,
            description: d.description,
            rules: d.rules,
            require_post_approval: d.require_post_approval,
            members_count: d.members_count,
            created_at: d.created_at.to_rfc3339(),
        }
    }
}

/// Event response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub id: String,
    pub department_id: String,
    pub created_by: String,
    pub title: String,
    pub description: Option<String>,
    pub location_name: Option<String>,
    pub starts_at: String,
    pub ends_at: Option<String>,
    pub created_at: String,
}

impl From<department_event::Model> for EventResponse {
    fn from(e: department_event::Model) -> Self {
        Self {
            id: e.id,
            department_id: e.department_id,
            created_by: e.created_by,
            title: e.title,
            description: e.description,
            location_name: e.location_name,
            starts_at: e.starts_at.to_rfc3339(),
            ends_at: e.ends_at.map(|t| t.to_rfc3339()),
            created_at: e.created_at.to_rfc3339(),
        }
    }
}

/// Membership response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipResponse {
    pub department_id: String,
    pub user_id: String,
    pub joined_at: String,
}

async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateDepartmentInput>,
) -> AppResult<ApiResponse<DepartmentResponse>> {
    let department = state.department_service.create(&user.id, input).await?;

    Ok(ApiResponse::created(department.into()))
}

async fn show(
    State(state): State<AppState>,
    Path(department_id): Path<String>,
) -> AppResult<ApiResponse<DepartmentResponse>> {
    let department = state.department_service.get(&department_id).await?;

    Ok(ApiResponse::ok(department.into()))
}

async fn join(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(department_id): Path<String>,
) -> AppResult<ApiResponse<MembershipResponse>> {
    let member = state.department_service.join(&user.id, &department_id).await?;

    Ok(ApiResponse::ok(MembershipResponse {
        department_id: member.department_id,
        user_id: member.user_id,
        joined_at: member.joined_at.to_rfc3339(),
    })
    .with_message("Joined department"))
}

async fn leave(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(department_id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.department_service.leave(&user.id, &department_id).await?;

    Ok(ApiResponse::message("Left department"))
}

async fn feed(
    State(state): State<AppState>,
    Path(department_id): Path<String>,
    Query(query): Query<FeedQuery>,
) -> AppResult<ApiResponse<Vec<PostResponse>>> {
    let posts = state
        .post_service
        .department_feed(&department_id, query.limit, query.until_id.as_deref())
        .await?;

    Ok(ApiResponse::ok(posts.into_iter().map(Into::into).collect()))
}

async fn list_events(
    State(state): State<AppState>,
    Path(department_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<ApiResponse<Vec<EventResponse>>> {
    let events = state
        .event_service
        .list(&department_id, query.limit, query.offset)
        .await?;

    Ok(ApiResponse::ok(events.into_iter().map(Into::into).collect()))
}

async fn create_event(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(department_id): Path<String>,
    Json(input): Json<CreateEventInput>,
) -> AppResult<ApiResponse<EventResponse>> {
    let event = state
        .event_service
        .create(&user.id, &department_id, input)
        .await?;

    Ok(ApiResponse::created(event.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create))
        .route("/{department_id}", get(show))
        .route("/{department_id}/join", post(join))
        .route("/{department_id}/leave", post(leave))
        .route("/{department_id}/posts", get(feed))
        .route(
            "/{department_id}/events",
            get(list_events).post(create_event),
        )
        .nest("/enhancements", department_enhancements::router())
}
