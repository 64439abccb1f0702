//! Business logic services.

#![allow(missing_docs)]

pub mod account;
pub mod catalog;
pub mod favorite;
pub mod review;
pub mod review_store;
pub mod vote_ledger;

pub use account::{AccountService, RegisterInput, Session};
pub use catalog::CatalogClient;
pub use favorite::FavoriteService;
pub use review::{NewReview, RatingSummary, Review, ReviewService};
pub use review_store::{DbReviewStore, MemoryReviewStore};
pub use vote_ledger::{
    ReviewStore, SaveOutcome, VoteChange, VoteDirection, VoteLedger, apply_vote, next_vote,
};
