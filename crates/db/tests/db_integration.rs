//! Database integration tests.
//!
//! These tests require a running `PostgreSQL` instance.
//! Run with: `cargo test --test db_integration -- --ignored`
//!
//! Environment variables:
//!   `TEST_DB_HOST` (default: localhost)
//!   `TEST_DB_PORT` (default: 5433)
//!   `TEST_DB_USER` (default: `shelf_test`)
//!   `TEST_DB_PASSWORD` (default: `shelf_test`)
//!   `TEST_DB_NAME` (default: `shelf_test`)

#![allow(clippy::unwrap_used, clippy::expect_used)]

use chrono::Utc;
use sea_orm::Set;
use shelf_common::AppError;
use shelf_db::{
    entities::{favorite, review, review_vote::Direction, user},
    repositories::{
        FavoriteRepository, ReviewRepository, ReviewVoteRepository, UserRepository, VoteWrite,
        favorite::DUPLICATE_FAVORITE,
    },
    test_utils::{TestDatabase, TestDbConfig},
};

async fn seed_review(db: &TestDatabase) -> review::Model {
    let users = UserRepository::new(db.shared());
    let reviews = ReviewRepository::new(db.shared());

    let author = users
        .create(user::ActiveModel {
            id: Set("author1".to_string()),
            email: Set("author@example.com".to_string()),
            name: Set("Author".to_string()),
            password_hash: Set("x".to_string()),
            token: Set(None),
            token_expires_at: Set(None),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        })
        .await
        .unwrap();

    reviews
        .create(review::ActiveModel {
            id: Set("r1".to_string()),
            book_id: Set("zyTCAlFPjgYC".to_string()),
            user_id: Set(author.id),
            user_name: Set(author.name),
            rating: Set(4),
            comment: Set("A thoughtful and moving read.".to_string()),
            created_at: Set(Utc::now().into()),
            upvotes: Set(0),
            downvotes: Set(0),
            version: Set(0),
        })
        .await
        .unwrap()
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_database_connection() {
    let result = TestDatabase::with_config(TestDbConfig::default()).await;
    assert!(result.is_ok(), "Failed to connect: {:?}", result.err());
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_ping() {
    let db = TestDatabase::new().await.expect("Failed to connect");
    assert!(shelf_db::ping(db.connection()).await.is_ok());
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_save_vote_bumps_version_and_records_vote() {
    let db = TestDatabase::create_unique().await.expect("Failed to create");
    let seeded = seed_review(&db).await;
    let reviews = ReviewRepository::new(db.shared());
    let votes = ReviewVoteRepository::new(db.shared());

    let saved = reviews
        .save_vote(&VoteWrite {
            review_id: seeded.id.clone(),
            expected_version: seeded.version,
            upvotes: 1,
            downvotes: 0,
            voter_id: "alice".to_string(),
            direction: Some(Direction::Up),
        })
        .await
        .unwrap();
    assert!(saved);

    let stored = reviews.get_by_id(&seeded.id).await.unwrap();
    assert_eq!(stored.upvotes, 1);
    assert_eq!(stored.version, seeded.version + 1);

    let vote = votes.find(&seeded.id, "alice").await.unwrap().unwrap();
    assert_eq!(vote.direction, Direction::Up);

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_save_vote_with_stale_version_changes_nothing() {
    let db = TestDatabase::create_unique().await.expect("Failed to create");
    let seeded = seed_review(&db).await;
    let reviews = ReviewRepository::new(db.shared());
    let votes = ReviewVoteRepository::new(db.shared());

    let saved = reviews
        .save_vote(&VoteWrite {
            review_id: seeded.id.clone(),
            expected_version: seeded.version + 7,
            upvotes: 0,
            downvotes: 1,
            voter_id: "bob".to_string(),
            direction: Some(Direction::Down),
        })
        .await
        .unwrap();
    assert!(!saved);

    let stored = reviews.get_by_id(&seeded.id).await.unwrap();
    assert_eq!(stored.downvotes, 0);
    assert_eq!(stored.version, seeded.version);
    assert!(votes.find(&seeded.id, "bob").await.unwrap().is_none());

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_second_insert_of_same_favorite_is_duplicate() {
    let db = TestDatabase::create_unique().await.expect("Failed to create");
    seed_review(&db).await;
    let favorites = FavoriteRepository::new(db.shared());

    let model = |id: &str| favorite::ActiveModel {
        id: Set(id.to_string()),
        user_id: Set("author1".to_string()),
        book_id: Set("zyTCAlFPjgYC".to_string()),
        added_at: Set(Utc::now().into()),
    };

    favorites.create(model("fav1")).await.unwrap();
    let second = favorites.create(model("fav2")).await;

    assert!(matches!(second, Err(AppError::BadRequest(msg)) if msg == DUPLICATE_FAVORITE));
    assert_eq!(favorites.find_by_user("author1").await.unwrap().len(), 1);

    db.drop_database().await.unwrap();
}

#[test]
fn test_config_from_env() {
    let config = TestDbConfig::default();
    assert!(!config.host.is_empty());
    assert!(config.port > 0);
    assert!(!config.username.is_empty());
    assert!(!config.database.is_empty());
}
