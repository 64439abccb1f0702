//! Vote ledger: up/down votes on reviews.
//!
//! Every (review, voter) pair is in one of three states: no vote, voted up,
//! or voted down. Casting the direction already held retracts the vote;
//! casting the other direction moves it. Tallies always equal the number of
//! matching entries in the review's vote map.

use std::{fmt, str::FromStr, sync::Arc};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shelf_common::{AppError, AppResult};
use shelf_db::entities::review_vote::Direction;

use super::review::Review;

/// Attempts before a contended vote gives up with [`AppError::Conflict`].
const MAX_ATTEMPTS: usize = 5;

/// Vote direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    /// Wire form, `"up"` or `"down"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

impl fmt::Display for VoteDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoteDirection {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            other => Err(AppError::InvalidDirection(other.to_string())),
        }
    }
}

impl From<Direction> for VoteDirection {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Up => Self::Up,
            Direction::Down => Self::Down,
        }
    }
}

impl From<VoteDirection> for Direction {
    fn from(direction: VoteDirection) -> Self {
        match direction {
            VoteDirection::Up => Self::Up,
            VoteDirection::Down => Self::Down,
        }
    }
}

/// The voter's direction after casting `requested` on top of `previous`.
///
/// `None` means the voter ends up with no vote.
#[must_use]
pub fn next_vote(
    previous: Option<VoteDirection>,
    requested: VoteDirection,
) -> Option<VoteDirection> {
    if previous == Some(requested) {
        None
    } else {
        Some(requested)
    }
}

/// The entry a vote leaves behind for one voter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteChange {
    pub voter_id: String,
    pub direction: Option<VoteDirection>,
}

/// Apply a vote to a review in memory and report the voter's new entry.
pub fn apply_vote(review: &mut Review, voter_id: &str, requested: VoteDirection) -> VoteChange {
    let previous = review.user_votes.get(voter_id).copied();

    match previous {
        Some(VoteDirection::Up) => review.upvotes = (review.upvotes - 1).max(0),
        Some(VoteDirection::Down) => review.downvotes = (review.downvotes - 1).max(0),
        None => {}
    }

    let next = next_vote(previous, requested);
    match next {
        Some(direction) => {
            match direction {
                VoteDirection::Up => review.upvotes += 1,
                VoteDirection::Down => review.downvotes += 1,
            }
            review.user_votes.insert(voter_id.to_string(), direction);
        }
        None => {
            review.user_votes.remove(voter_id);
        }
    }

    VoteChange {
        voter_id: voter_id.to_string(),
        direction: next,
    }
}

/// Result of a conditional save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    /// The stored review moved past the version that was read.
    Stale,
}

/// Persistence for reviews as seen by the vote ledger.
///
/// `save` must write only if the stored version still equals
/// `review.version`, and must apply the tallies and the voter's entry
/// together or not at all.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Load a review with its vote map.
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Review>>;

    /// Conditionally persist the tallies of `review` and the voter's entry.
    async fn save(&self, review: &Review, change: &VoteChange) -> AppResult<SaveOutcome>;
}

/// Applies votes against a [`ReviewStore`].
pub struct VoteLedger<S> {
    store: Arc<S>,
}

impl<S> Clone for VoteLedger<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: ReviewStore> VoteLedger<S> {
    /// Create a new vote ledger over a store.
    #[must_use]
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Cast a vote given its wire form. Unknown directions are rejected
    /// without reading the store.
    pub async fn cast_vote(
        &self,
        review_id: &str,
        voter_id: &str,
        direction: &str,
    ) -> AppResult<Review> {
        let direction: VoteDirection = direction.parse()?;
        self.cast(review_id, voter_id, direction).await
    }

    /// Cast a vote and return the updated review.
    pub async fn cast(
        &self,
        review_id: &str,
        voter_id: &str,
        direction: VoteDirection,
    ) -> AppResult<Review> {
        for attempt in 1..=MAX_ATTEMPTS {
            let mut review = self
                .store
                .find_by_id(review_id)
                .await?
                .ok_or_else(|| AppError::ReviewNotFound(review_id.to_string()))?;

            let change = apply_vote(&mut review, voter_id, direction);

            match self.store.save(&review, &change).await? {
                SaveOutcome::Saved => {
                    review.version += 1;
                    tracing::debug!(
                        review_id,
                        voter_id,
                        direction = %direction,
                        result = ?change.direction,
                        "Vote applied"
                    );
                    return Ok(review);
                }
                SaveOutcome::Stale => {
                    tracing::debug!(review_id, attempt, "Review changed concurrently, retrying vote");
                }
            }
        }

        tracing::warn!(review_id, voter_id, "Vote abandoned after repeated contention");
        Err(AppError::Conflict(format!(
            "Review {review_id} is being voted on too heavily, try again"
        )))
    }
}
