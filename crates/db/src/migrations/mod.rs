//! Database migrations.
//!
//! Schema migrations for the database.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20250101_000001_create_user_table;
mod m20250101_000002_create_department_table;
mod m20250101_000003_create_post_table;
mod m20250101_000004_create_comment_table;
mod m20250101_000005_create_reaction_table;
mod m20250101_000006_create_department_moderator_table;
mod m20250101_000007_create_pending_post_table;
mod m20250101_000008_create_department_event_table;
mod m20250101_000009_create_notification_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_user_table::Migration),
            Box::new(m20250101_000002_create_department_table::Migration),
            Box::new(m20250101_000003_create_post_table::Migration),
            Box::new(m20250101_000004_create_comment_table::Migration),
            Box::new(m20250101_000005_create_reaction_table::Migration),
            Box::new(m20250101_000006_create_department_moderator_table::Migration),
            Box::new(m20250101_000007_create_pending_post_table::Migration),
            Box::new(m20250101_000008_create_department_event_table::Migration),
            Box::new(m20250101_000009_create_notification_table::Migration),
        ]
    }
}
