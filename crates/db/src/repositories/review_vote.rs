//! Review vote repository (read side; writes go through `ReviewRepository::save_vote`).

use std::sync::Arc;

use crate::entities::{ReviewVote, review_vote};
use shelf_common::{AppError, AppResult};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

/// Review vote repository for database operations.
#[derive(Clone)]
pub struct ReviewVoteRepository {
    db: Arc<DatabaseConnection>,
}

impl ReviewVoteRepository {
    /// Create a new review vote repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find the active vote of a voter on a review.
    pub async fn find(
        &self,
        review_id: &str,
        voter_id: &str,
    ) -> AppResult<Option<review_vote::Model>> {
        ReviewVote::find_by_id((review_id.to_string(), voter_id.to_string()))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All active votes on a review.
    pub async fn find_by_review(&self, review_id: &str) -> AppResult<Vec<review_vote::Model>> {
        ReviewVote::find()
            .filter(review_vote::Column::ReviewId.eq(review_id))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All active votes on a set of reviews, for batch loading listings.
    pub async fn find_by_reviews(&self, review_ids: &[String]) -> AppResult<Vec<review_vote::Model>> {
        if review_ids.is_empty() {
            return Ok(vec![]);
        }

        ReviewVote::find()
            .filter(review_vote::Column::ReviewId.is_in(review_ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
