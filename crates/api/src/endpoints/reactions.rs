//! Reaction endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use peekhour_common::AppResult;
use peekhour_core::{ReactionOutcome, reaction::parse_target};
use peekhour_db::{
    entities::reaction::{ReactionTarget, ReactionType},
    repositories::ReactionCount,
};
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Toggle reaction request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleReactionRequest {
    pub reaction_type: String,
}

/// Toggle result.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleReactionResponse {
    /// `added`, `changed` or `removed`.
    pub action: &'static str,
    /// Reaction the user holds now.
    pub reaction_type: Option<ReactionType>,
}

impl From<ReactionOutcome> for ToggleReactionResponse {
    fn from(outcome: ReactionOutcome) -> Self {
        let action = match &outcome {
            ReactionOutcome::Added(_) => "added",
            ReactionOutcome::Changed(_) => "changed",
            ReactionOutcome::Removed => "removed",
        };
        Self {
            action,
            reaction_type: outcome.reaction_type(),
        }
    }
}

/// Reaction count for one type.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionCountResponse {
    pub reaction_type: ReactionType,
    pub count: i64,
}

impl From<ReactionCount> for ReactionCountResponse {
    fn from(c: ReactionCount) -> Self {
        Self {
            reaction_type: c.reaction_type,
            count: c.count,
        }
    }
}

async fn toggle(
    state: &AppState,
    user: &peekhour_db::entities::user::Model,
    target: ReactionTarget,
    reaction_type: &str,
) -> AppResult<ApiResponse<ToggleReactionResponse>> {
    let outcome = state
        .reaction_service
        .toggle(user, target, reaction_type)
        .await?;

    Ok(ApiResponse::ok(outcome.into()))
}

/// Toggle a reaction on a post.
pub async fn toggle_post(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    Json(req): Json<ToggleReactionRequest>,
) -> AppResult<ApiResponse<ToggleReactionResponse>> {
    toggle(&state, &user, ReactionTarget::Post(post_id), &req.reaction_type).await
}

/// Toggle a reaction on a comment.
pub async fn toggle_comment(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(comment_id): Path<String>,
    Json(req): Json<ToggleReactionRequest>,
) -> AppResult<ApiResponse<ToggleReactionResponse>> {
    toggle(
        &state,
        &user,
        ReactionTarget::Comment(comment_id),
        &req.reaction_type,
    )
    .await
}

/// Reaction counts of a post or comment.
async fn counts(
    State(state): State<AppState>,
    Path((target_type, target_id)): Path<(String, String)>,
) -> AppResult<ApiResponse<Vec<ReactionCountResponse>>> {
    let target = parse_target(&target_type, &target_id)?;
    let counts = state.reaction_service.counts(&target).await?;

    Ok(ApiResponse::ok(counts.into_iter().map(Into::into).collect()))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/{target_type}/{target_id}", get(counts))
}
