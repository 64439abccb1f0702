//! Create review table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Review::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Review::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Review::BookId).string_len(64).not_null())
                    .col(ColumnDef::new(Review::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(Review::UserName).string_len(256).not_null())
                    .col(
                        ColumnDef::new(Review::Rating)
                            .small_integer()
                            .not_null()
                            .check(Expr::col(Review::Rating).between(1, 5)),
                    )
                    .col(ColumnDef::new(Review::Comment).text().not_null())
                    .col(
                        ColumnDef::new(Review::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Review::Upvotes).integer().not_null().default(0))
                    .col(ColumnDef::new(Review::Downvotes).integer().not_null().default(0))
                    .col(ColumnDef::new(Review::Version).big_integer().not_null().default(0))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_review_user")
                            .from(Review::Table, Review::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: book_id (public listing per book)
        manager
            .create_index(
                Index::create()
                    .name("idx_review_book_id")
                    .table(Review::Table)
                    .col(Review::BookId)
                    .to_owned(),
            )
            .await?;

        // Index: user_id (profile listing)
        manager
            .create_index(
                Index::create()
                    .name("idx_review_user_id")
                    .table(Review::Table)
                    .col(Review::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Review::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Review {
    Table,
    Id,
    BookId,
    UserId,
    UserName,
    Rating,
    Comment,
    CreatedAt,
    Upvotes,
    Downvotes,
    Version,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
