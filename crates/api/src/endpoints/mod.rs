//! API endpoints.

mod comments;
mod department_enhancements;
mod departments;
mod notifications;
mod posts;
mod reactions;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/posts", posts::router())
        .nest("/comments", comments::router())
        .nest("/reactions", reactions::router())
        .nest("/departments", departments::router())
        .nest("/notifications", notifications::router())
}
