//! Create department and department member tables.

use sea_orm_migration::prelude::*;

use super::m20250101_000001_create_user_table::User;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Department::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Department::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Department::CreatorId).string_len(32).not_null())
                    .col(ColumnDef::new(Department::Name).string_len(128).not_null())
                    .col(ColumnDef::new(Department::Description).text())
                    .col(ColumnDef::new(Department::Rules).text())
                    .col(
                        ColumnDef::new(Department::RequirePostApproval)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Department::MembersCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Department::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Department::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_department_creator")
                            .from(Department::Table, Department::CreatorId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_department_creator_id")
                    .table(Department::Table)
                    .col(Department::CreatorId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DepartmentMember::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DepartmentMember::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DepartmentMember::DepartmentId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DepartmentMember::UserId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DepartmentMember::IsBanned)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(DepartmentMember::BannedBy).string_len(32))
                    .col(
                        ColumnDef::new(DepartmentMember::JoinedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_department_member_department")
                            .from(DepartmentMember::Table, DepartmentMember::DepartmentId)
                            .to(Department::Table, Department::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_department_member_user")
                            .from(DepartmentMember::Table, DepartmentMember::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One membership row per (department, user)
        manager
            .create_index(
                Index::create()
                    .name("idx_department_member_unique")
                    .table(DepartmentMember::Table)
                    .col(DepartmentMember::DepartmentId)
                    .col(DepartmentMember::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_department_member_user_id")
                    .table(DepartmentMember::Table)
                    .col(DepartmentMember::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DepartmentMember::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Department::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Department {
    Table,
    Id,
    CreatorId,
    Name,
    Description,
    Rules,
    RequirePostApproval,
    MembersCount,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum DepartmentMember {
    Table,
    Id,
    DepartmentId,
    UserId,
    IsBanned,
    BannedBy,
    JoinedAt,
}
