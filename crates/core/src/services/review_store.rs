//! [`ReviewStore`] implementations.

use std::collections::HashMap;

use async_trait::async_trait;
use shelf_common::AppResult;
use shelf_db::repositories::{ReviewRepository, ReviewVoteRepository, VoteWrite};
use tokio::sync::RwLock;

use super::{
    review::Review,
    vote_ledger::{ReviewStore, SaveOutcome, VoteChange},
};

/// In-memory review store.
#[derive(Default)]
pub struct MemoryReviewStore {
    reviews: RwLock<HashMap<String, Review>>,
}

impl MemoryReviewStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a review as-is.
    pub async fn insert(&self, review: Review) {
        self.reviews.write().await.insert(review.id.clone(), review);
    }

    /// Snapshot of a stored review.
    pub async fn get(&self, id: &str) -> Option<Review> {
        self.reviews.read().await.get(id).cloned()
    }
}

#[async_trait]
impl ReviewStore for MemoryReviewStore {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Review>> {
        Ok(self.get(id).await)
    }

    async fn save(&self, review: &Review, _change: &VoteChange) -> AppResult<SaveOutcome> {
        let mut reviews = self.reviews.write().await;

        let Some(stored) = reviews.get_mut(&review.id) else {
            return Ok(SaveOutcome::Stale);
        };
        if stored.version != review.version {
            return Ok(SaveOutcome::Stale);
        }

        stored.upvotes = review.upvotes;
        stored.downvotes = review.downvotes;
        stored.user_votes.clone_from(&review.user_votes);
        stored.version += 1;

        Ok(SaveOutcome::Saved)
    }
}

/// Review store backed by the `review` and `review_vote` tables.
#[derive(Clone)]
pub struct DbReviewStore {
    review_repo: ReviewRepository,
    vote_repo: ReviewVoteRepository,
}

impl DbReviewStore {
    /// Create a new database-backed store.
    #[must_use]
    pub const fn new(review_repo: ReviewRepository, vote_repo: ReviewVoteRepository) -> Self {
        Self {
            review_repo,
            vote_repo,
        }
    }
}

#[async_trait]
impl ReviewStore for DbReviewStore {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Review>> {
        let Some(model) = self.review_repo.find_by_id(id).await? else {
            return Ok(None);
        };
        let votes = self.vote_repo.find_by_review(id).await?;

        Ok(Some(Review::from_parts(model, votes)))
    }

    async fn save(&self, review: &Review, change: &VoteChange) -> AppResult<SaveOutcome> {
        let write = VoteWrite {
            review_id: review.id.clone(),
            expected_version: review.version,
            upvotes: review.upvotes,
            downvotes: review.downvotes,
            voter_id: change.voter_id.clone(),
            direction: change.direction.map(Into::into),
        };

        if self.review_repo.save_vote(&write).await? {
            Ok(SaveOutcome::Saved)
        } else {
            Ok(SaveOutcome::Stale)
        }
    }
}
