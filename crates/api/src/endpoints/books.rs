//! Catalog endpoints.

use axum::{
    Router,
    extract::{Path, Query, State},
    routing::get,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shelf_common::AppResult;
use shelf_core::{RatingSummary, Review};

use crate::{middleware::AppState, response::ApiResponse};

/// Search query.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// Book detail: the catalog volume plus local reviews.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookDetailResponse {
    pub book: Value,
    pub reviews: Vec<Review>,
    pub average_rating: f64,
    pub total_reviews: usize,
}

/// Search the catalog.
async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<ApiResponse<Vec<Value>>> {
    let books = state.catalog.search(&query.q).await?;
    Ok(ApiResponse::ok(books))
}

/// One catalog volume with its reviews and rating summary.
async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<BookDetailResponse>> {
    let book = state.catalog.get_book(&id).await?;
    let reviews = state.review_service.list_for_book(&id).await?;
    let summary = RatingSummary::from_reviews(&reviews);

    Ok(ApiResponse::ok(BookDetailResponse {
        book,
        reviews,
        average_rating: summary.average_rating,
        total_reviews: summary.total_reviews,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/search", get(search))
        .route("/{id}", get(show))
}
