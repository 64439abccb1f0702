//! Favorite books service.

use shelf_common::{AppError, AppResult, IdGenerator};
use shelf_db::{
    entities::favorite,
    repositories::{FavoriteRepository, favorite::DUPLICATE_FAVORITE},
};
use sea_orm::Set;

/// Favorite service for a user's saved books.
#[derive(Clone)]
pub struct FavoriteService {
    favorite_repo: FavoriteRepository,
    id_gen: IdGenerator,
}

impl FavoriteService {
    /// Create a new favorite service.
    #[must_use]
    pub const fn new(favorite_repo: FavoriteRepository) -> Self {
        Self {
            favorite_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Save a book to the user's favorites.
    pub async fn add(&self, user_id: &str, book_id: &str) -> AppResult<favorite::Model> {
        let book_id = book_id.trim();
        if book_id.is_empty() {
            return Err(AppError::Validation("bookId is required".to_string()));
        }

        if self.favorite_repo.is_favorite(user_id, book_id).await? {
            return Err(AppError::BadRequest(DUPLICATE_FAVORITE.to_string()));
        }

        let model = favorite::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            book_id: Set(book_id.to_string()),
            added_at: Set(chrono::Utc::now().into()),
        };

        self.favorite_repo.create(model).await
    }

    /// Remove a book from favorites. Removing an absent favorite is a no-op.
    pub async fn remove(&self, user_id: &str, book_id: &str) -> AppResult<()> {
        let removed = self
            .favorite_repo
            .delete_by_user_and_book(user_id, book_id)
            .await?;
        tracing::debug!(user_id, book_id, removed, "Favorite removed");
        Ok(())
    }

    /// The user's favorites, newest first.
    pub async fn list(&self, user_id: &str) -> AppResult<Vec<favorite::Model>> {
        self.favorite_repo.find_by_user(user_id).await
    }

    /// Check if a book is in the user's favorites.
    pub async fn is_favorite(&self, user_id: &str, book_id: &str) -> AppResult<bool> {
        self.favorite_repo.is_favorite(user_id, book_id).await
    }
}
