//! API integration tests.
//!
//! Requests run through the full router and auth middleware against a mock
//! database; each test queues exactly the rows its request will read.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    middleware,
};
use chrono::{Duration, Utc};
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
use serde_json::Value;
use shelf_api::{AppState, auth_middleware, router as api_router};
use shelf_common::config::{AuthConfig, CatalogConfig};
use shelf_core::{
    AccountService, CatalogClient, DbReviewStore, FavoriteService, ReviewService, VoteLedger,
};
use shelf_db::{
    entities::{favorite, review, review_vote, user},
    repositories::{FavoriteRepository, ReviewRepository, ReviewVoteRepository, UserRepository},
};
use tower::ServiceExt;

const TOKEN: &str = "0123456789abcdef0123456789abcdef";

/// Create test app state over a mock database.
fn create_test_state(db: MockDatabase) -> AppState {
    let db = Arc::new(db.into_connection());
    let auth = AuthConfig::default();

    let user_repo = UserRepository::new(Arc::clone(&db));
    let review_repo = ReviewRepository::new(Arc::clone(&db));
    let review_vote_repo = ReviewVoteRepository::new(Arc::clone(&db));
    let favorite_repo = FavoriteRepository::new(Arc::clone(&db));

    // Nothing listens here; tests only hit paths that never call out.
    let catalog = CatalogClient::new(&CatalogConfig {
        base_url: "http://127.0.0.1:9/volumes".to_string(),
        max_results: 40,
        timeout_secs: 1,
    })
    .expect("Failed to create catalog client");

    AppState {
        db,
        account_service: AccountService::new(user_repo, &auth),
        review_service: ReviewService::new(review_repo.clone(), review_vote_repo.clone()),
        vote_ledger: VoteLedger::new(Arc::new(DbReviewStore::new(review_repo, review_vote_repo))),
        favorite_service: FavoriteService::new(favorite_repo),
        catalog,
        auth,
    }
}

/// Create the test router with session resolution.
fn create_test_router(db: MockDatabase) -> Router {
    let state = create_test_state(db);
    api_router()
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}

fn mock_db() -> MockDatabase {
    MockDatabase::new(DatabaseBackend::Postgres)
}

/// Mock database whose first query resolves the session token.
fn signed_in_db() -> MockDatabase {
    mock_db().append_query_results([[signed_in_user()]])
}

fn signed_in_user() -> user::Model {
    user::Model {
        id: "alice".to_string(),
        email: "alice@example.com".to_string(),
        name: "Alice".to_string(),
        password_hash: "$argon2id$stub".to_string(),
        token: Some(TOKEN.to_string()),
        token_expires_at: Some((Utc::now() + Duration::hours(1)).into()),
        created_at: Utc::now().into(),
        updated_at: None,
    }
}

fn review_model(id: &str) -> review::Model {
    review::Model {
        id: id.to_string(),
        book_id: "zyTCAlFPjgYC".to_string(),
        user_id: "author1".to_string(),
        user_name: "BookLover123".to_string(),
        rating: 5,
        comment: "Absolutely amazing book!".to_string(),
        created_at: Utc::now().into(),
        upvotes: 0,
        downvotes: 0,
        version: 0,
    }
}

const fn exec(rows_affected: u64) -> MockExecResult {
    MockExecResult {
        last_insert_id: 0,
        rows_affected,
    }
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method(method)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_reports_database() {
    let app = create_test_router(mock_db());

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn test_unknown_endpoint_returns_404() {
    let app = create_test_router(mock_db());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/nonexistent/endpoint")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_reviews_for_book_is_public() {
    let db = mock_db()
        .append_query_results([[review_model("r1")]])
        .append_query_results([[review_vote::Model {
            review_id: "r1".to_string(),
            voter_id: "bob".to_string(),
            direction: review_vote::Direction::Down,
            updated_at: Utc::now().into(),
        }]]);
    let app = create_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/reviews?bookId=zyTCAlFPjgYC")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let first = &body["data"][0];
    assert_eq!(first["id"], "r1");
    assert_eq!(first["bookId"], "zyTCAlFPjgYC");
    assert_eq!(first["userVotes"]["bob"], "down");
    assert!(first.get("version").is_none());
}

#[tokio::test]
async fn test_own_reviews_require_sign_in() {
    let app = create_test_router(mock_db());

    let response = app
        .oneshot(Request::builder().uri("/reviews").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_submit_review_requires_sign_in() {
    let app = create_test_router(mock_db());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/reviews")
                .method("POST")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"bookId":"zyTCAlFPjgYC","rating":4,"comment":"A long enough comment"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_submit_review_short_comment_is_rejected() {
    let app = create_test_router(signed_in_db());

    let response = app
        .oneshot(json_request(
            "POST",
            "/reviews",
            r#"{"bookId":"zyTCAlFPjgYC","rating":4,"comment":"short"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_submit_review_returns_created() {
    let mut stored = review_model("new");
    stored.user_id = "alice".to_string();
    stored.user_name = "Alice".to_string();
    stored.rating = 5;
    stored.comment = "A long enough comment".to_string();
    let app = create_test_router(signed_in_db().append_query_results([[stored]]));

    let response = app
        .oneshot(json_request(
            "POST",
            "/reviews",
            r#"{"bookId":"zyTCAlFPjgYC","rating":10,"comment":"A long enough comment"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["data"]["rating"], 5);
    assert_eq!(body["data"]["upvotes"], 0);
}

#[tokio::test]
async fn test_vote_with_invalid_direction() {
    let app = create_test_router(signed_in_db());

    let response = app
        .oneshot(json_request("POST", "/reviews/r1/vote", r#"{"voteType":"sideways"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "INVALID_DIRECTION");
}

#[tokio::test]
async fn test_vote_without_string_direction_is_invalid_direction() {
    for body in [r"{}", r#"{"voteType":5}"#, r#"{"voteType":null}"#] {
        let app = create_test_router(signed_in_db());

        let response = app
            .oneshot(json_request("POST", "/reviews/r1/vote", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body}");
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "INVALID_DIRECTION", "body: {body}");
    }
}

#[tokio::test]
async fn test_vote_on_unknown_review() {
    let app = create_test_router(
        signed_in_db().append_query_results([Vec::<review::Model>::new()]),
    );

    let response = app
        .oneshot(json_request("POST", "/reviews/missing/vote", r#"{"voteType":"up"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "REVIEW_NOT_FOUND");
}

#[tokio::test]
async fn test_vote_records_voter_from_session() {
    let db = signed_in_db()
        .append_query_results([[review_model("r1")]])
        .append_query_results([Vec::<review_vote::Model>::new()])
        .append_exec_results([exec(1), exec(1)]);
    let app = create_test_router(db);

    let response = app
        .oneshot(json_request("POST", "/reviews/r1/vote", r#"{"direction":"up"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["upvotes"], 1);
    assert_eq!(body["data"]["downvotes"], 0);
    assert_eq!(body["data"]["userVotes"]["alice"], "up");
}

#[tokio::test]
async fn test_vote_requires_sign_in() {
    let app = create_test_router(mock_db());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/reviews/r1/vote")
                .method("POST")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"voteType":"up"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_favorites_via_session_cookie() {
    let db = signed_in_db().append_query_results([[favorite::Model {
        id: "fav1".to_string(),
        user_id: "alice".to_string(),
        book_id: "zyTCAlFPjgYC".to_string(),
        added_at: Utc::now().into(),
    }]]);
    let app = create_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/favorites")
                .header(header::COOKIE, format!("shelf_session={TOKEN}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"][0]["bookId"], "zyTCAlFPjgYC");
}

#[tokio::test]
async fn test_remove_favorite_without_book_id() {
    let app = create_test_router(signed_in_db());

    let response = app
        .oneshot(json_request("DELETE", "/favorites", ""))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_add_duplicate_favorite() {
    let existing = favorite::Model {
        id: "fav1".to_string(),
        user_id: "alice".to_string(),
        book_id: "zyTCAlFPjgYC".to_string(),
        added_at: Utc::now().into(),
    };
    let app = create_test_router(signed_in_db().append_query_results([[existing]]));

    let response = app
        .oneshot(json_request("POST", "/favorites", r#"{"bookId":"zyTCAlFPjgYC"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["message"], "Bad request: Book already in favorites");
}

#[tokio::test]
async fn test_expired_session_is_anonymous() {
    let mut expired = signed_in_user();
    expired.token_expires_at = Some((Utc::now() - Duration::minutes(5)).into());
    let app = create_test_router(mock_db().append_query_results([[expired]]));

    let response = app
        .oneshot(json_request("GET", "/favorites", ""))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_with_invalid_email() {
    let app = create_test_router(mock_db());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/register")
                .method("POST")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"email":"not-an-email","password":"secret1","name":"Reader"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_signin_with_unknown_email() {
    let app = create_test_router(mock_db().append_query_results([Vec::<user::Model>::new()]));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/signin")
                .method("POST")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"email":"nobody@example.com","password":"secret1"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_signin_cookie_lasts_as_long_as_the_session() {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(b"secret1", &salt)
        .unwrap()
        .to_string();
    let stored = user::Model {
        password_hash: hash,
        token: None,
        token_expires_at: None,
        ..signed_in_user()
    };
    let app = create_test_router(
        mock_db()
            .append_query_results([[stored]])
            .append_query_results([[signed_in_user()]]),
    );

    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/signin")
                .method("POST")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"email":"alice@example.com","password":"secret1"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    let max_age = AuthConfig::default().session_max_age_secs;
    assert!(cookie.contains("HttpOnly"), "cookie: {cookie}");
    assert!(cookie.contains(&format!("Max-Age={max_age}")), "cookie: {cookie}");
}

#[tokio::test]
async fn test_blank_search_returns_empty_list() {
    let app = create_test_router(mock_db());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/books/search?q=")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"], Value::Array(vec![]));
}
