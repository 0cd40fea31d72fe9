//! Business logic services.

#![allow(missing_docs)]

pub mod comment;
pub mod comment_thread;
pub mod department;
pub mod department_moderation;
pub mod event;
pub mod moderator;
pub mod notification;
pub mod post;
pub mod post_approval;
pub mod reaction;
pub mod user;

pub use comment::{CommentInput, CommentService, CommentView, MAX_COMMENT_DEPTH, ThreadComment};
pub use comment_thread::{CommentThread, ThreadEntry};
pub use department::{CreateDepartmentInput, DepartmentService};
pub use department_moderation::{BanInput, DepartmentModerationService, EditRulesInput};
pub use event::{CreateEventInput, EventService};
pub use moderator::{AddModeratorInput, ModeratorService};
pub use notification::{NewNotification, NotificationService};
pub use post::{CreatePostInput, CreatedPost, PostService};
pub use post_approval::{PostApprovalService, ReviewInput, SubmitPostInput};
pub use reaction::{ReactionOutcome, ReactionService};
pub use user::UserService;
