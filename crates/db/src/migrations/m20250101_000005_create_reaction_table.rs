//! Create reaction table migration.

use sea_orm_migration::prelude::*;

use super::m20250101_000001_create_user_table::User;
use super::m20250101_000003_create_post_table::Post;
use super::m20250101_000004_create_comment_table::Comment;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Reaction::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Reaction::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Reaction::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(Reaction::PostId).string_len(32))
                    .col(ColumnDef::new(Reaction::CommentId).string_len(32))
                    .col(
                        ColumnDef::new(Reaction::ReactionType)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Reaction::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Reaction::UpdatedAt).timestamp_with_time_zone())
                    // Exactly one target column is set
                    .check(Expr::cust("(post_id IS NULL) <> (comment_id IS NULL)"))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reaction_user")
                            .from(Reaction::Table, Reaction::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reaction_post")
                            .from(Reaction::Table, Reaction::PostId)
                            .to(Post::Table, Post::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reaction_comment")
                            .from(Reaction::Table, Reaction::CommentId)
                            .to(Comment::Table, Comment::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One reaction per user per post; NULL post_id rows never collide
        manager
            .create_index(
                Index::create()
                    .name("idx_reaction_user_post")
                    .table(Reaction::Table)
                    .col(Reaction::UserId)
                    .col(Reaction::PostId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // One reaction per user per comment
        manager
            .create_index(
                Index::create()
                    .name("idx_reaction_user_comment")
                    .table(Reaction::Table)
                    .col(Reaction::UserId)
                    .col(Reaction::CommentId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reaction_post_id")
                    .table(Reaction::Table)
                    .col(Reaction::PostId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reaction_comment_id")
                    .table(Reaction::Table)
                    .col(Reaction::CommentId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Reaction::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Reaction {
    Table,
    Id,
    UserId,
    PostId,
    CommentId,
    ReactionType,
    CreatedAt,
    UpdatedAt,
}
