//! Favorite books endpoints.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::{Deserialize, Serialize};
use shelf_common::{AppError, AppResult};
use shelf_db::entities::favorite;

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, Created},
};

/// Favorite request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteRequest {
    pub book_id: String,
}

/// Remove favorite query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveFavoriteQuery {
    pub book_id: Option<String>,
}

/// Favorite response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteResponse {
    pub id: String,
    pub book_id: String,
    pub added_at: String,
}

impl From<favorite::Model> for FavoriteResponse {
    fn from(favorite: favorite::Model) -> Self {
        Self {
            id: favorite.id,
            book_id: favorite.book_id,
            added_at: favorite.added_at.to_rfc3339(),
        }
    }
}

/// Removal response.
#[derive(Serialize)]
pub struct RemovedResponse {
    pub ok: bool,
}

/// List the caller's favorites.
async fn list(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<FavoriteResponse>>> {
    let favorites = state.favorite_service.list(&user.id).await?;
    Ok(ApiResponse::ok(
        favorites.into_iter().map(FavoriteResponse::from).collect(),
    ))
}

/// Add a book to favorites.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<FavoriteRequest>,
) -> AppResult<Created<FavoriteResponse>> {
    let favorite = state.favorite_service.add(&user.id, &req.book_id).await?;
    Ok(Created(favorite.into()))
}

/// Remove a book from favorites.
async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<RemoveFavoriteQuery>,
) -> AppResult<ApiResponse<RemovedResponse>> {
    let book_id = query
        .book_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("bookId is required".to_string()))?;

    state.favorite_service.remove(&user.id, &book_id).await?;
    Ok(ApiResponse::ok(RemovedResponse { ok: true }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list).post(create).delete(delete))
}
