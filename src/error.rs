//! Store-level failures and their mapping onto HTTP errors.

use libris_http::AppError;
use thiserror::Error;

use crate::utils::field_error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The referenced book points at an author that does not exist
    #[error("author {0} does not exist")]
    AuthorMissing(i64),

    /// The author cannot be deleted while books still reference it
    #[error("author {author_id} still has {books} book(s)")]
    AuthorInUse { author_id: i64, books: i64 },

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Map a write failure, turning foreign-key violations into [`StoreError::AuthorMissing`]
    pub(crate) fn on_author_write(err: sqlx::Error, author_id: i64) -> Self {
        if is_foreign_key_violation(&err) {
            StoreError::AuthorMissing(author_id)
        } else {
            StoreError::Database(err)
        }
    }
}

pub(crate) fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err)
            if db_err.kind() == sqlx::error::ErrorKind::ForeignKeyViolation
    )
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::AuthorMissing(_) => {
                let message = err.to_string();
                AppError::validation(vec![field_error("authorId", "unknown author")], message)
            }
            StoreError::AuthorInUse { author_id, books } => AppError::conflict(
                vec![serde_json::json!({ "authorId": author_id, "books": books })],
                err.to_string(),
            ),
            StoreError::Database(e) => AppError::Internal(anyhow::Error::new(e)),
        }
    }
}
