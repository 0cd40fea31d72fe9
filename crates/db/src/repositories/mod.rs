//! Database repositories.

pub mod comment;
pub mod department;
pub mod department_event;
pub mod moderator;
pub mod notification;
pub mod pending_post;
pub mod post;
pub mod reaction;
pub mod user;

pub use comment::CommentRepository;
pub use department::DepartmentRepository;
pub use department_event::DepartmentEventRepository;
pub use moderator::ModeratorRepository;
pub use notification::NotificationRepository;
pub use pending_post::{PendingPostRepository, ReviewDecision};
pub use post::PostRepository;
pub use reaction::{ReactionCount, ReactionRepository};
pub use user::UserRepository;
