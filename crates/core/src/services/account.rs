//! Account service: registration and credential sessions.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{DateTime, Duration, Utc};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use shelf_common::{AppError, AppResult, IdGenerator, config::AuthConfig};
use shelf_db::{entities::user, repositories::UserRepository};
use validator::Validate;

/// Input for registering an account.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterInput {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 6, max = 128, message = "Password must be at least 6 characters"))]
    pub password: String,

    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
}

/// A signed-in session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user: user::Model,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Account service for business logic.
#[derive(Clone)]
pub struct AccountService {
    user_repo: UserRepository,
    id_gen: IdGenerator,
    session_max_age: Duration,
}

impl AccountService {
    /// Create a new account service.
    #[must_use]
    pub fn new(user_repo: UserRepository, auth: &AuthConfig) -> Self {
        Self {
            user_repo,
            id_gen: IdGenerator::new(),
            session_max_age: Duration::seconds(auth.session_max_age_secs),
        }
    }

    /// Register a new account.
    pub async fn register(&self, mut input: RegisterInput) -> AppResult<user::Model> {
        input.email = input.email.trim().to_lowercase();
        input.name = input.name.trim().to_string();
        input.validate()?;

        if self.user_repo.find_by_email(&input.email).await?.is_some() {
            return Err(AppError::BadRequest(
                "An account with this email already exists".to_string(),
            ));
        }

        let password_hash = hash_password(&input.password)?;

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            email: Set(input.email),
            name: Set(input.name),
            password_hash: Set(password_hash),
            token: Set(None),
            token_expires_at: Set(None),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let user = self.user_repo.create(model).await?;
        tracing::info!(user_id = %user.id, "Account registered");

        Ok(user)
    }

    /// Verify credentials and start a new session.
    pub async fn sign_in(&self, email: &str, password: &str) -> AppResult<Session> {
        let user = self
            .user_repo
            .find_by_email(&email.trim().to_lowercase())
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AppError::Unauthorized);
        }

        let token = self.id_gen.generate_token();
        let now = Utc::now();
        let expires_at = now + self.session_max_age;

        let mut active: user::ActiveModel = user.into();
        active.token = Set(Some(token.clone()));
        active.token_expires_at = Set(Some(expires_at.into()));
        active.updated_at = Set(Some(now.into()));
        let user = self.user_repo.update(active).await?;

        Ok(Session {
            user,
            token,
            expires_at,
        })
    }

    /// Resolve a session token to its user.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        let user = self
            .user_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)?;

        match user.token_expires_at {
            Some(expires_at) if expires_at > Utc::now() => Ok(user),
            _ => Err(AppError::Unauthorized),
        }
    }

    /// End the user's session.
    pub async fn sign_out(&self, user_id: &str) -> AppResult<()> {
        let user = self.user_repo.get_by_id(user_id).await?;

        let mut active: user::ActiveModel = user.into();
        active.token = Set(None);
        active.token_expires_at = Set(None);
        active.updated_at = Set(Some(Utc::now().into()));
        self.user_repo.update(active).await?;

        Ok(())
    }
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
