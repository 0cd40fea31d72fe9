//! API middleware.

#![allow(missing_docs)]

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use peekhour_core::{
    CommentService, DepartmentModerationService, DepartmentService, EventService,
    ModeratorService, NotificationService, PostApprovalService, PostService, ReactionService,
    UserService,
};
use peekhour_db::repositories::{
    CommentRepository, DepartmentEventRepository, DepartmentRepository, ModeratorRepository,
    NotificationRepository, PendingPostRepository, PostRepository, ReactionRepository,
    UserRepository,
};
use sea_orm::DatabaseConnection;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub post_service: PostService,
    pub comment_service: CommentService,
    pub reaction_service: ReactionService,
    pub notification_service: NotificationService,
    pub department_service: DepartmentService,
    pub moderator_service: ModeratorService,
    pub moderation_service: DepartmentModerationService,
    pub post_approval_service: PostApprovalService,
    pub event_service: EventService,
}

impl AppState {
    /// Wire every repository and service onto one connection pool.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        let user_repo = UserRepository::new(Arc::clone(&db));
        let post_repo = PostRepository::new(Arc::clone(&db));
        let comment_repo = CommentRepository::new(Arc::clone(&db));
        let reaction_repo = ReactionRepository::new(Arc::clone(&db));
        let notification_repo = NotificationRepository::new(Arc::clone(&db));
        let department_repo = DepartmentRepository::new(Arc::clone(&db));
        let moderator_repo = ModeratorRepository::new(Arc::clone(&db));
        let pending_repo = PendingPostRepository::new(Arc::clone(&db));
        let event_repo = DepartmentEventRepository::new(db);

        let notification_service = NotificationService::new(notification_repo);
        let moderator_service =
            ModeratorService::new(moderator_repo, department_repo.clone());

        Self {
            user_service: UserService::new(user_repo.clone()),
            post_service: PostService::new(
                post_repo.clone(),
                department_repo.clone(),
                pending_repo.clone(),
            ),
            comment_service: CommentService::new(
                comment_repo.clone(),
                post_repo.clone(),
                user_repo,
                reaction_repo.clone(),
                notification_service.clone(),
            ),
            reaction_service: ReactionService::new(
                reaction_repo,
                post_repo.clone(),
                comment_repo.clone(),
                notification_service.clone(),
            ),
            department_service: DepartmentService::new(department_repo.clone()),
            moderation_service: DepartmentModerationService::new(
                moderator_service.clone(),
                department_repo.clone(),
                post_repo.clone(),
                comment_repo,
            ),
            post_approval_service: PostApprovalService::new(
                pending_repo,
                post_repo,
                department_repo.clone(),
                moderator_service.clone(),
                notification_service.clone(),
            ),
            event_service: EventService::new(
                event_repo,
                department_repo,
                moderator_service.clone(),
            ),
            moderator_service,
            notification_service,
        }
    }
}

/// Authentication middleware.
///
/// Resolves `Authorization: Bearer <token>` and stores the user in request
/// extensions. Requests without a valid token continue anonymously.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get(header::AUTHORIZATION)
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        match state.user_service.authenticate(token.trim()).await {
            Ok(Some(user)) => {
                req.extensions_mut().insert(user);
            }
            Ok(None) => tracing::debug!("Unknown bearer token"),
            Err(e) => tracing::warn!(error = %e, "Token lookup failed"),
        }
    }

    next.run(req).await
}
