//! HTTP API layer for peekhour.
//!
//! - **Endpoints**: posts, threaded comments, reactions, departments and
//!   their moderation surface, notifications
//! - **Extractors**: bearer-token authentication
//! - **Middleware**: application state and token resolution
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::{AppState, auth_middleware};
