//! API middleware.

#![allow(missing_docs)]

use std::sync::Arc;

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use axum_extra::extract::cookie::CookieJar;
use sea_orm::DatabaseConnection;
use shelf_common::config::AuthConfig;
use shelf_core::{
    AccountService, CatalogClient, DbReviewStore, FavoriteService, ReviewService, VoteLedger,
};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub account_service: AccountService,
    pub review_service: ReviewService,
    pub vote_ledger: VoteLedger<DbReviewStore>,
    pub favorite_service: FavoriteService,
    pub catalog: CatalogClient,
    pub auth: AuthConfig,
}

/// Authentication middleware.
///
/// Resolves the session from `Authorization: Bearer <token>`, falling back to
/// the session cookie. Requests without a valid session pass through
/// anonymously.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let bearer = req
        .headers()
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string);

    let token = bearer.or_else(|| {
        CookieJar::from_headers(req.headers())
            .get(&state.auth.cookie_name)
            .map(|cookie| cookie.value().to_string())
    });

    if let Some(token) = token {
        match state.account_service.authenticate_by_token(&token).await {
            Ok(user) => {
                req.extensions_mut().insert(user);
            }
            Err(e) => tracing::debug!(error = %e, "Ignoring invalid session token"),
        }
    }

    next.run(req).await
}
