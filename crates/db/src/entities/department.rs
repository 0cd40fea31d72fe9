//! Department entity - a community users can join and post into.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "department")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Creator of the department. Always an implicit admin.
    #[sea_orm(indexed)]
    pub creator_id: String,

    pub name: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    /// Community rules shown to members.
    #[sea_orm(column_type = "Text", nullable)]
    pub rules: Option<String>,

    /// Posts stay hidden until a reviewer approves them.
    #[sea_orm(default_value = false)]
    pub require_post_approval: bool,

    /// Number of members (denormalized).
    #[sea_orm(default_value = 0)]
    pub members_count: i64,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CreatorId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Creator,
    #[sea_orm(has_many = "super::department_member::Entity")]
    Members,
    #[sea_orm(has_many = "super::department_moderator::Entity")]
    Moderators,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Creator.def()
    }
}

impl Related<super::department_member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl Related<super::department_moderator::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Moderators.def()
    }
}

impl Model {
    /// Whether `user_id` is the department's implicit admin.
    #[must_use]
    pub fn is_admin(&self, user_id: &str) -> bool {
        self.creator_id == user_id
    }
}

impl ActiveModelBehavior for ActiveModel {}
