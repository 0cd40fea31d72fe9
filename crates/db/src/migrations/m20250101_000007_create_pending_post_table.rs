//! Create pending post table migration.

use sea_orm_migration::prelude::*;

use super::m20250101_000002_create_department_table::Department;
use super::m20250101_000003_create_post_table::Post;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PendingPost::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PendingPost::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PendingPost::PostId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(PendingPost::DepartmentId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PendingPost::SubmittedBy)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PendingPost::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(PendingPost::ReviewedBy).string_len(32))
                    .col(ColumnDef::new(PendingPost::ReviewedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(PendingPost::RejectionReason).text())
                    .col(
                        ColumnDef::new(PendingPost::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_pending_post_post")
                            .from(PendingPost::Table, PendingPost::PostId)
                            .to(Post::Table, Post::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_pending_post_department")
                            .from(PendingPost::Table, PendingPost::DepartmentId)
                            .to(Department::Table, Department::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Review queue per department
        manager
            .create_index(
                Index::create()
                    .name("idx_pending_post_department_status")
                    .table(PendingPost::Table)
                    .col(PendingPost::DepartmentId)
                    .col(PendingPost::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_pending_post_post_id")
                    .table(PendingPost::Table)
                    .col(PendingPost::PostId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PendingPost::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum PendingPost {
    Table,
    Id,
    PostId,
    DepartmentId,
    SubmittedBy,
    Status,
    ReviewedBy,
    ReviewedAt,
    RejectionReason,
    CreatedAt,
}
