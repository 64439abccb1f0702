//! Create review vote table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ReviewVote::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ReviewVote::ReviewId).string_len(32).not_null())
                    .col(ColumnDef::new(ReviewVote::VoterId).string_len(32).not_null())
                    .col(ColumnDef::new(ReviewVote::Direction).string_len(8).not_null())
                    .col(
                        ColumnDef::new(ReviewVote::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    // One active vote per voter per review
                    .primary_key(
                        Index::create()
                            .col(ReviewVote::ReviewId)
                            .col(ReviewVote::VoterId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_review_vote_review")
                            .from(ReviewVote::Table, ReviewVote::ReviewId)
                            .to(Review::Table, Review::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: voter_id (a user's votes across reviews)
        manager
            .create_index(
                Index::create()
                    .name("idx_review_vote_voter_id")
                    .table(ReviewVote::Table)
                    .col(ReviewVote::VoterId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ReviewVote::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ReviewVote {
    Table,
    ReviewId,
    VoterId,
    Direction,
    UpdatedAt,
}

#[derive(Iden)]
enum Review {
    Table,
    Id,
}
