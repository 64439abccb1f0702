//! Review and vote endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::Value;
use shelf_common::{AppError, AppResult};
use shelf_core::{NewReview, Review};

use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::{ApiResponse, Created},
};

/// List reviews query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListReviewsQuery {
    pub book_id: Option<String>,
}

/// Reviews for a book, or the caller's own reviews when no book is given.
async fn list(
    MaybeAuthUser(user): MaybeAuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListReviewsQuery>,
) -> AppResult<ApiResponse<Vec<Review>>> {
    let reviews = match query.book_id.as_deref().map(str::trim) {
        Some(book_id) if !book_id.is_empty() => {
            state.review_service.list_for_book(book_id).await?
        }
        _ => {
            let user = user.ok_or(AppError::Unauthorized)?;
            state.review_service.list_for_author(&user.id).await?
        }
    };

    Ok(ApiResponse::ok(reviews))
}

/// Submit a review as the signed-in user.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<NewReview>,
) -> AppResult<Created<Review>> {
    let review = state.review_service.submit(&user.id, &user.name, req).await?;
    Ok(Created(review))
}

/// Vote request. Accepts `voteType` or `direction`; any value that is not
/// a string is an invalid direction.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    #[serde(default, alias = "direction")]
    pub vote_type: Option<Value>,
}

impl VoteRequest {
    /// The requested direction as text, or `InvalidDirection`.
    fn direction(&self) -> AppResult<&str> {
        match &self.vote_type {
            Some(Value::String(direction)) => Ok(direction.as_str()),
            Some(other) => Err(AppError::InvalidDirection(other.to_string())),
            None => Err(AppError::InvalidDirection("missing".to_string())),
        }
    }
}

/// Cast, move, or retract the caller's vote on a review.
async fn vote(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(review_id): Path<String>,
    Json(req): Json<VoteRequest>,
) -> AppResult<ApiResponse<Review>> {
    let direction = req.direction()?;
    let review = state
        .vote_ledger
        .cast_vote(&review_id, &user.id, direction)
        .await?;

    Ok(ApiResponse::ok(review))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}/vote", post(vote))
}
