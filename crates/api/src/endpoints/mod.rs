//! API endpoints.

mod auth;
mod books;
mod favorites;
mod health;
mod reviews;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/reviews", reviews::router())
        .nest("/favorites", favorites::router())
        .nest("/books", books::router())
        .nest("/health", health::router())
}
