//! Favorite repository.

use std::sync::Arc;

use crate::entities::{Favorite, favorite};
use shelf_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    SqlErr,
};

/// Message for a book the user has already saved.
pub const DUPLICATE_FAVORITE: &str = "Book already in favorites";

/// Favorite repository for database operations.
#[derive(Clone)]
pub struct FavoriteRepository {
    db: Arc<DatabaseConnection>,
}

impl FavoriteRepository {
    /// Create a new favorite repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a favorite by user and book.
    pub async fn find_by_user_and_book(
        &self,
        user_id: &str,
        book_id: &str,
    ) -> AppResult<Option<favorite::Model>> {
        Favorite::find()
            .filter(favorite::Column::UserId.eq(user_id))
            .filter(favorite::Column::BookId.eq(book_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if a book is in the user's favorites.
    pub async fn is_favorite(&self, user_id: &str, book_id: &str) -> AppResult<bool> {
        Ok(self
            .find_by_user_and_book(user_id, book_id)
            .await?
            .is_some())
    }

    /// Create a new favorite.
    ///
    /// A concurrent insert of the same `(user, book)` pair loses on the unique
    /// index and is reported as a duplicate, not a database failure.
    pub async fn create(&self, model: favorite::ActiveModel) -> AppResult<favorite::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(insert_error)
    }

    /// Delete a favorite by user and book. Returns the number of rows removed.
    pub async fn delete_by_user_and_book(&self, user_id: &str, book_id: &str) -> AppResult<u64> {
        let result = Favorite::delete_many()
            .filter(favorite::Column::UserId.eq(user_id))
            .filter(favorite::Column::BookId.eq(book_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected)
    }

    /// Get a user's favorites, newest first.
    pub async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<favorite::Model>> {
        Favorite::find()
            .filter(favorite::Column::UserId.eq(user_id))
            .order_by_desc(favorite::Column::AddedAt)
            .order_by_desc(favorite::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

fn insert_error(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::BadRequest(DUPLICATE_FAVORITE.to_string())
        }
        _ => AppError::Database(err.to_string()),
    }
}
