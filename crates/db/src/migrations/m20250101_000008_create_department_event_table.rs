//! Create department event table migration.

use sea_orm_migration::prelude::*;

use super::m20250101_000002_create_department_table::Department;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DepartmentEvent::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DepartmentEvent::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DepartmentEvent::DepartmentId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DepartmentEvent::CreatedBy)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(DepartmentEvent::Title).string_len(256).not_null())
                    .col(ColumnDef::new(DepartmentEvent::Description).text())
                    .col(ColumnDef::new(DepartmentEvent::LocationName).string_len(256))
                    .col(
                        ColumnDef::new(DepartmentEvent::StartsAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(DepartmentEvent::EndsAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(DepartmentEvent::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_department_event_department")
                            .from(DepartmentEvent::Table, DepartmentEvent::DepartmentId)
                            .to(Department::Table, Department::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_department_event_department_starts")
                    .table(DepartmentEvent::Table)
                    .col(DepartmentEvent::DepartmentId)
                    .col(DepartmentEvent::StartsAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DepartmentEvent::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum DepartmentEvent {
    Table,
    Id,
    DepartmentId,
    CreatedBy,
    Title,
    Description,
    LocationName,
    StartsAt,
    EndsAt,
    CreatedAt,
}
