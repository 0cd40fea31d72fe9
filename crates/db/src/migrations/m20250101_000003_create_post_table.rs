//! Create post table migration.

use sea_orm_migration::prelude::*;

use super::m20250101_000001_create_user_table::User;
use super::m20250101_000002_create_department_table::Department;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Post::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Post::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Post::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(Post::DepartmentId).string_len(32))
                    .col(ColumnDef::new(Post::Content).text())
                    .col(ColumnDef::new(Post::MediaUrl).string_len(512))
                    .col(
                        ColumnDef::new(Post::MediaType)
                            .string_len(16)
                            .not_null()
                            .default("text"),
                    )
                    .col(ColumnDef::new(Post::LocationName).string_len(256))
                    .col(ColumnDef::new(Post::Latitude).double())
                    .col(ColumnDef::new(Post::Longitude).double())
                    .col(
                        ColumnDef::new(Post::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Post::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Post::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_post_user")
                            .from(Post::Table, Post::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_post_department")
                            .from(Post::Table, Post::DepartmentId)
                            .to(Department::Table, Department::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_post_user_id")
                    .table(Post::Table)
                    .col(Post::UserId)
                    .to_owned(),
            )
            .await?;

        // Department feeds list visible posts newest first
        manager
            .create_index(
                Index::create()
                    .name("idx_post_department_active")
                    .table(Post::Table)
                    .col(Post::DepartmentId)
                    .col(Post::IsActive)
                    .col(Post::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Post::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Post {
    Table,
    Id,
    UserId,
    DepartmentId,
    Content,
    MediaUrl,
    MediaType,
    LocationName,
    Latitude,
    Longitude,
    IsActive,
    CreatedAt,
    UpdatedAt,
}
