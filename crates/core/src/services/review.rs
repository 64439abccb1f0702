//! Review service: submission and listings.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use shelf_common::{AppError, AppResult, IdGenerator};
use shelf_db::{
    entities::{review, review_vote},
    repositories::{ReviewRepository, ReviewVoteRepository},
};

use super::vote_ledger::VoteDirection;

/// Name shown for authors who did not give one.
pub const ANONYMOUS_NAME: &str = "Anonymous Reader";

/// Minimum comment length, counted in characters after trimming.
pub const MIN_COMMENT_CHARS: usize = 10;

/// A review with its vote map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub book_id: String,
    #[serde(skip)]
    pub user_id: String,
    pub user_name: String,
    pub rating: i16,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub upvotes: i32,
    pub downvotes: i32,
    pub user_votes: BTreeMap<String, VoteDirection>,
    #[serde(skip)]
    pub version: i64,
}

impl Review {
    /// Build from a stored row and its vote rows.
    #[must_use]
    pub fn from_parts(model: review::Model, votes: Vec<review_vote::Model>) -> Self {
        Self {
            id: model.id,
            book_id: model.book_id,
            user_id: model.user_id,
            user_name: model.user_name,
            rating: model.rating,
            comment: model.comment,
            created_at: model.created_at.with_timezone(&Utc),
            upvotes: model.upvotes,
            downvotes: model.downvotes,
            user_votes: votes
                .into_iter()
                .map(|v| (v.voter_id, v.direction.into()))
                .collect(),
            version: model.version,
        }
    }

    /// Net score used for ranking.
    #[must_use]
    pub const fn score(&self) -> i32 {
        self.upvotes - self.downvotes
    }
}

/// Input for submitting a review.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    pub book_id: String,
    pub rating: i64,
    pub comment: String,
}

/// Average rating and review count for a book.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    pub average_rating: f64,
    pub total_reviews: usize,
}

impl RatingSummary {
    /// Summarize ratings; the average is rounded to one decimal.
    #[must_use]
    pub fn from_reviews(reviews: &[Review]) -> Self {
        if reviews.is_empty() {
            return Self {
                average_rating: 0.0,
                total_reviews: 0,
            };
        }

        let sum: f64 = reviews.iter().map(|r| f64::from(r.rating)).sum();
        let average = sum / reviews.len() as f64;

        Self {
            average_rating: (average * 10.0).round() / 10.0,
            total_reviews: reviews.len(),
        }
    }
}

/// Clamp a requested rating into 1..=5.
#[must_use]
pub fn clamp_rating(rating: i64) -> i16 {
    rating.clamp(1, 5) as i16
}

/// Ranking for a book page: higher score first, newer first on ties.
pub fn sort_by_score(reviews: &mut [Review]) {
    reviews.sort_by(|a, b| {
        b.score()
            .cmp(&a.score())
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
}

/// Review service for business logic.
#[derive(Clone)]
pub struct ReviewService {
    review_repo: ReviewRepository,
    vote_repo: ReviewVoteRepository,
    id_gen: IdGenerator,
}

impl ReviewService {
    /// Create a new review service.
    #[must_use]
    pub const fn new(review_repo: ReviewRepository, vote_repo: ReviewVoteRepository) -> Self {
        Self {
            review_repo,
            vote_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Validate and store a new review.
    pub async fn submit(
        &self,
        author_id: &str,
        author_name: &str,
        input: NewReview,
    ) -> AppResult<Review> {
        let book_id = input.book_id.trim();
        if book_id.is_empty() {
            return Err(AppError::Validation("bookId is required".to_string()));
        }

        let comment = input.comment.trim();
        if comment.chars().count() < MIN_COMMENT_CHARS {
            return Err(AppError::Validation(format!(
                "Comment must be at least {MIN_COMMENT_CHARS} characters"
            )));
        }

        let user_name = match author_name.trim() {
            "" => ANONYMOUS_NAME,
            name => name,
        };

        let model = review::ActiveModel {
            id: Set(self.id_gen.generate()),
            book_id: Set(book_id.to_string()),
            user_id: Set(author_id.to_string()),
            user_name: Set(user_name.to_string()),
            rating: Set(clamp_rating(input.rating)),
            comment: Set(comment.to_string()),
            created_at: Set(Utc::now().into()),
            upvotes: Set(0),
            downvotes: Set(0),
            version: Set(0),
        };

        let created = self.review_repo.create(model).await?;
        tracing::info!(review_id = %created.id, book_id = %created.book_id, "Review submitted");

        Ok(Review::from_parts(created, vec![]))
    }

    /// Reviews of a book, best first.
    pub async fn list_for_book(&self, book_id: &str) -> AppResult<Vec<Review>> {
        let models = self.review_repo.find_by_book(book_id).await?;
        let mut reviews = self.attach_votes(models).await?;
        sort_by_score(&mut reviews);
        Ok(reviews)
    }

    /// Reviews written by a user, newest first.
    pub async fn list_for_author(&self, user_id: &str) -> AppResult<Vec<Review>> {
        let models = self.review_repo.find_by_user(user_id).await?;
        self.attach_votes(models).await
    }

    /// Average rating and count for a book.
    pub async fn rating_summary(&self, book_id: &str) -> AppResult<RatingSummary> {
        let reviews = self.list_for_book(book_id).await?;
        Ok(RatingSummary::from_reviews(&reviews))
    }

    async fn attach_votes(&self, models: Vec<review::Model>) -> AppResult<Vec<Review>> {
        let ids: Vec<String> = models.iter().map(|m| m.id.clone()).collect();
        let mut votes_by_review: HashMap<String, Vec<review_vote::Model>> = HashMap::new();
        for vote in self.vote_repo.find_by_reviews(&ids).await? {
            votes_by_review
                .entry(vote.review_id.clone())
                .or_default()
                .push(vote);
        }

        Ok(models
            .into_iter()
            .map(|m| {
                let votes = votes_by_review.remove(&m.id).unwrap_or_default();
                Review::from_parts(m, votes)
            })
            .collect())
    }
}
