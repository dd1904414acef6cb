use async_trait::async_trait;
use libris_db::Db;
use libris_kernel::settings::AuthorDeletePolicy;
use sqlx::{Executor, Sqlite};

use super::models::{Author, NewAuthor};
use crate::error::{is_foreign_key_violation, StoreError};

/// Persistence seam for authors; handlers only ever see this trait.
#[async_trait]
pub trait AuthorStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Author>, StoreError>;

    async fn get(&self, id: i64) -> Result<Option<Author>, StoreError>;

    async fn create(&self, author: &NewAuthor) -> Result<Author, StoreError>;

    /// Returns `None` when no author has this id
    async fn update(&self, id: i64, author: &NewAuthor) -> Result<Option<Author>, StoreError>;

    /// Returns true if the author existed and was deleted
    async fn delete(&self, id: i64) -> Result<bool, StoreError>;
}

/// SQLite-backed author store.
pub struct SqliteAuthorStore {
    db: Db,
    delete_policy: AuthorDeletePolicy,
}

impl SqliteAuthorStore {
    pub fn new(db: Db, delete_policy: AuthorDeletePolicy) -> Self {
        Self { db, delete_policy }
    }
}

async fn count_books<'e, E>(executor: E, author_id: i64) -> Result<i64, StoreError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let (books,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM book WHERE author_id = ?1")
        .bind(author_id)
        .fetch_one(executor)
        .await?;

    Ok(books)
}

#[async_trait]
impl AuthorStore for SqliteAuthorStore {
    async fn list(&self) -> Result<Vec<Author>, StoreError> {
        let authors = sqlx::query_as::<_, Author>(
            "SELECT id, first_name, last_name FROM author ORDER BY id",
        )
        .fetch_all(self.db.pool())
        .await?;

        Ok(authors)
    }

    async fn get(&self, id: i64) -> Result<Option<Author>, StoreError> {
        let author = sqlx::query_as::<_, Author>(
            "SELECT id, first_name, last_name FROM author WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(author)
    }

    async fn create(&self, author: &NewAuthor) -> Result<Author, StoreError> {
        let created = sqlx::query_as::<_, Author>(
            r#"
            INSERT INTO author (first_name, last_name)
            VALUES (?1, ?2)
            RETURNING id, first_name, last_name
            "#,
        )
        .bind(&author.first_name)
        .bind(&author.last_name)
        .fetch_one(self.db.pool())
        .await?;

        Ok(created)
    }

    async fn update(&self, id: i64, author: &NewAuthor) -> Result<Option<Author>, StoreError> {
        let updated = sqlx::query_as::<_, Author>(
            r#"
            UPDATE author SET first_name = ?1, last_name = ?2
            WHERE id = ?3
            RETURNING id, first_name, last_name
            "#,
        )
        .bind(&author.first_name)
        .bind(&author.last_name)
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(updated)
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let mut tx = self.db.pool().begin().await?;

        let books = count_books(&mut *tx, id).await?;

        if books > 0 {
            match self.delete_policy {
                AuthorDeletePolicy::Restrict => {
                    return Err(StoreError::AuthorInUse {
                        author_id: id,
                        books,
                    });
                }
                AuthorDeletePolicy::Cascade => {
                    sqlx::query("DELETE FROM book WHERE author_id = ?1")
                        .bind(id)
                        .execute(&mut *tx)
                        .await?;
                    tracing::info!(author_id = id, books, "cascading author delete to books");
                }
            }
        }

        // A book inserted after the count still trips the ON DELETE RESTRICT key.
        let result = match sqlx::query("DELETE FROM author WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await
        {
            Err(err) if is_foreign_key_violation(&err) => {
                tx.rollback().await?;
                let books = count_books(self.db.pool(), id).await?;
                return Err(StoreError::AuthorInUse {
                    author_id: id,
                    books,
                });
            }
            result => result?,
        };
        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }
}
