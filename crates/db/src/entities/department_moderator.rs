//! Department moderator entity.
//!
//! A grant of a fixed set of capabilities to one member of one department.

use sea_orm::FromJsonQueryResult;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A single capability a department admin can delegate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeratorPermission {
    ApprovePost,
    DeletePost,
    DeleteComment,
    BanUser,
    CreateEvent,
    EditRules,
}

impl ModeratorPermission {
    /// Key of the permission in the stored JSON document.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::ApprovePost => "canApprovePost",
            Self::DeletePost => "canDeletePost",
            Self::DeleteComment => "canDeleteComment",
            Self::BanUser => "canBanUser",
            Self::CreateEvent => "canCreateEvent",
            Self::EditRules => "canEditRules",
        }
    }
}

/// Permission set of a moderator. Each flag is independent; nothing implies
/// anything else.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult,
)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct ModeratorPermissions {
    pub can_approve_post: bool,
    pub can_delete_post: bool,
    pub can_delete_comment: bool,
    pub can_ban_user: bool,
    pub can_create_event: bool,
    pub can_edit_rules: bool,
}

impl ModeratorPermissions {
    /// Every capability granted. What the department creator holds.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            can_approve_post: true,
            can_delete_post: true,
            can_delete_comment: true,
            can_ban_user: true,
            can_create_event: true,
            can_edit_rules: true,
        }
    }

    /// Whether this set grants `permission`.
    #[must_use]
    pub const fn allows(&self, permission: ModeratorPermission) -> bool {
        match permission {
            ModeratorPermission::ApprovePost => self.can_approve_post,
            ModeratorPermission::DeletePost => self.can_delete_post,
            ModeratorPermission::DeleteComment => self.can_delete_comment,
            ModeratorPermission::BanUser => self.can_ban_user,
            ModeratorPermission::CreateEvent => self.can_create_event,
            ModeratorPermission::EditRules => self.can_edit_rules,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "department_moderator")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub department_id: String,

    #[sea_orm(indexed)]
    pub user_id: String,

    #[sea_orm(column_type = "JsonBinary")]
    pub permissions: ModeratorPermissions,

    /// Admin who granted the role
    pub assigned_by: String,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::department::Entity",
        from = "Column::DepartmentId",
        to = "super::department::Column::Id",
        on_delete = "Cascade"
    )]
    Department,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::department::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Department.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_keys_default_to_false() {
        let perms: ModeratorPermissions =
            serde_json::from_str(r#"{"canApprovePost": true}"#).unwrap();

        assert!(perms.allows(ModeratorPermission::ApprovePost));
        assert!(!perms.allows(ModeratorPermission::CreateEvent));
        assert!(!perms.allows(ModeratorPermission::EditRules));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let result = serde_json::from_str::<ModeratorPermissions>(r#"{"canDoAnything": true}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_non_boolean_values_are_rejected() {
        let result = serde_json::from_str::<ModeratorPermissions>(r#"{"canBanUser": "yes"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_serializes_with_camel_case_keys() {
        let perms = ModeratorPermissions {
            can_create_event: true,
            ..Default::default()
        };
        let value = serde_json::to_value(perms).unwrap();

        assert_eq!(value[ModeratorPermission::CreateEvent.key()], true);
        assert_eq!(value[ModeratorPermission::ApprovePost.key()], false);
    }
}
