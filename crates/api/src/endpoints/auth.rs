//! Authentication endpoints.

use axum::{Json, Router, extract::State, routing::post};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use shelf_common::AppResult;
use shelf_core::RegisterInput;
use shelf_db::entities::user;

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, Created},
};

/// Public account fields.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub created_at: String,
}

impl From<user::Model> for AccountResponse {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// Create a new account.
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterInput>,
) -> AppResult<Created<AccountResponse>> {
    let user = state.account_service.register(req).await?;
    Ok(Created(user.into()))
}

/// Signin request.
#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

/// Signin response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SigninResponse {
    pub user: AccountResponse,
    pub token: String,
    pub expires_at: String,
}

/// Sign in and set the session cookie.
async fn signin(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<SigninRequest>,
) -> AppResult<(CookieJar, ApiResponse<SigninResponse>)> {
    let session = state
        .account_service
        .sign_in(&req.email, &req.password)
        .await?;

    let cookie = Cookie::build((state.auth.cookie_name.clone(), session.token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.auth.secure_cookies)
        .max_age(time::Duration::seconds(state.auth.session_max_age_secs));

    Ok((
        jar.add(cookie),
        ApiResponse::ok(SigninResponse {
            user: session.user.into(),
            token: session.token,
            expires_at: session.expires_at.to_rfc3339(),
        }),
    ))
}

/// Signout response.
#[derive(Serialize)]
pub struct SignoutResponse {
    pub ok: bool,
}

/// Sign out: drop the token and clear the cookie.
async fn signout(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<(CookieJar, ApiResponse<SignoutResponse>)> {
    state.account_service.sign_out(&user.id).await?;

    let jar = jar.remove(Cookie::build(state.auth.cookie_name.clone()).path("/"));
    Ok((jar, ApiResponse::ok(SignoutResponse { ok: true })))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/signin", post(signin))
        .route("/signout", post(signout))
}
