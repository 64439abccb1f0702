//! Review repository.

use std::sync::Arc;

use crate::entities::{Review, ReviewVote, review, review_vote};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
    sea_query::{Expr, OnConflict},
};
use shelf_common::{AppError, AppResult};

/// A single vote write against one review.
///
/// `expected_version` is the review version the tallies were computed from;
/// `direction` is the voter's vote after the write (`None` retracts it).
#[derive(Debug, Clone)]
pub struct VoteWrite {
    pub review_id: String,
    pub expected_version: i64,
    pub upvotes: i32,
    pub downvotes: i32,
    pub voter_id: String,
    pub direction: Option<review_vote::Direction>,
}

/// Review repository for database operations.
#[derive(Clone)]
pub struct ReviewRepository {
    db: Arc<DatabaseConnection>,
}

impl ReviewRepository {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a review by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<review::Model>> {
        Review::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a review by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<review::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::ReviewNotFound(id.to_string()))
    }

    /// Reviews of a catalog book, newest first.
    pub async fn find_by_book(&self, book_id: &str) -> AppResult<Vec<review::Model>> {
        Review::find()
            .filter(review::Column::BookId.eq(book_id))
            .order_by_desc(review::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Reviews written by a user, newest first.
    pub async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<review::Model>> {
        Review::find()
            .filter(review::Column::UserId.eq(user_id))
            .order_by_desc(review::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new review.
    pub async fn create(&self, model: review::ActiveModel) -> AppResult<review::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Apply a vote write atomically.
    ///
    /// The tallies are written only if the stored version still equals
    /// `expected_version`; the vote row is upserted or deleted in the same
    /// transaction. Returns `false` when another write got there first, in
    /// which case nothing is changed.
    pub async fn save_vote(&self, write: &VoteWrite) -> AppResult<bool> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let updated = Review::update_many()
            .col_expr(review::Column::Upvotes, Expr::value(write.upvotes))
            .col_expr(review::Column::Downvotes, Expr::value(write.downvotes))
            .col_expr(
                review::Column::Version,
                Expr::col(review::Column::Version).add(1),
            )
            .filter(review::Column::Id.eq(write.review_id.as_str()))
            .filter(review::Column::Version.eq(write.expected_version))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if updated.rows_affected != 1 {
            txn.rollback()
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            return Ok(false);
        }

        match write.direction {
            Some(direction) => {
                let vote = review_vote::ActiveModel {
                    review_id: Set(write.review_id.clone()),
                    voter_id: Set(write.voter_id.clone()),
                    direction: Set(direction),
                    updated_at: Set(Utc::now().into()),
                };
                ReviewVote::insert(vote)
                    .on_conflict(
                        OnConflict::columns([
                            review_vote::Column::ReviewId,
                            review_vote::Column::VoterId,
                        ])
                        .update_columns([
                            review_vote::Column::Direction,
                            review_vote::Column::UpdatedAt,
                        ])
                        .to_owned(),
                    )
                    .exec_without_returning(&txn)
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
            }
            None => {
                ReviewVote::delete_many()
                    .filter(review_vote::Column::ReviewId.eq(write.review_id.as_str()))
                    .filter(review_vote::Column::VoterId.eq(write.voter_id.as_str()))
                    .exec(&txn)
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
            }
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(true)
    }
}
