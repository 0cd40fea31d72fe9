//! Database entities.

#![allow(missing_docs)]

pub mod comment;
pub mod department;
pub mod department_event;
pub mod department_member;
pub mod department_moderator;
pub mod notification;
pub mod pending_post;
pub mod post;
pub mod reaction;
pub mod user;

pub use comment::Entity as Comment;
pub use department::Entity as Department;
pub use department_event::Entity as DepartmentEvent;
pub use department_member::Entity as DepartmentMember;
pub use department_moderator::Entity as DepartmentModerator;
pub use notification::Entity as Notification;
pub use pending_post::Entity as PendingPost;
pub use post::Entity as Post;
pub use reaction::Entity as Reaction;
pub use user::Entity as User;
