//! Repositories wrapping sea-orm queries per table.

pub mod favorite;
pub mod review;
pub mod review_vote;
pub mod user;

pub use favorite::FavoriteRepository;
pub use review::{ReviewRepository, VoteWrite};
pub use review_vote::ReviewVoteRepository;
pub use user::UserRepository;
