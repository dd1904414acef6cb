use async_trait::async_trait;
use libris_db::Db;
use sqlx::{Sqlite, Transaction};

use super::models::{Book, BookRow, NewBook};
use crate::error::StoreError;

/// Persistence seam for books; every read embeds the book's author.
#[async_trait]
pub trait BookStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Book>, StoreError>;

    async fn get(&self, id: i64) -> Result<Option<Book>, StoreError>;

    /// Fails with [`StoreError::AuthorMissing`] if `book.author_id` is unknown
    async fn create(&self, book: &NewBook) -> Result<Book, StoreError>;

    /// Full replace; returns `None` when no book has this id
    async fn update(&self, id: i64, book: &NewBook) -> Result<Option<Book>, StoreError>;

    /// Returns true if the book existed and was deleted
    async fn delete(&self, id: i64) -> Result<bool, StoreError>;
}

fn select_books(filter: &str) -> String {
    format!(
        r#"
        SELECT b.id, b.title, b.date_published, b.is_fiction,
               a.id AS author_id,
               a.first_name AS author_first_name,
               a.last_name AS author_last_name
        FROM book b
        JOIN author a ON a.id = b.author_id
        {filter}
        "#
    )
}

/// SQLite-backed book store.
pub struct SqliteBookStore {
    db: Db,
}

impl SqliteBookStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Insert (`id == None`) or replace a book, then read it back with its author.
    ///
    /// Create and update share this path so the author link is always a plain
    /// `author_id` checked by the foreign key.
    async fn write(&self, id: Option<i64>, book: &NewBook) -> Result<Option<Book>, StoreError> {
        let mut tx = self.db.pool().begin().await?;

        let written: Option<(i64,)> = match id {
            None => {
                sqlx::query_as(
                    r#"
                    INSERT INTO book (title, date_published, is_fiction, author_id)
                    VALUES (?1, ?2, ?3, ?4)
                    RETURNING id
                    "#,
                )
                .bind(&book.title)
                .bind(book.date_published)
                .bind(book.is_fiction)
                .bind(book.author_id)
                .fetch_optional(&mut *tx)
                .await
            }
            Some(id) => {
                sqlx::query_as(
                    r#"
                    UPDATE book
                    SET title = ?1, date_published = ?2, is_fiction = ?3, author_id = ?4
                    WHERE id = ?5
                    RETURNING id
                    "#,
                )
                .bind(&book.title)
                .bind(book.date_published)
                .bind(book.is_fiction)
                .bind(book.author_id)
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
            }
        }
        .map_err(|e| StoreError::on_author_write(e, book.author_id))?;

        let Some((book_id,)) = written else {
            return Ok(None);
        };

        let written = fetch_one(&mut tx, book_id).await?;
        tx.commit().await?;

        Ok(written)
    }
}

async fn fetch_one(
    tx: &mut Transaction<'_, Sqlite>,
    id: i64,
) -> Result<Option<Book>, StoreError> {
    let sql = select_books("WHERE b.id = ?1");
    let row = sqlx::query_as::<_, BookRow>(&sql)
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;

    Ok(row.map(Book::from))
}

#[async_trait]
impl BookStore for SqliteBookStore {
    async fn list(&self) -> Result<Vec<Book>, StoreError> {
        let sql = select_books("ORDER BY b.id");
        let rows = sqlx::query_as::<_, BookRow>(&sql)
            .fetch_all(self.db.pool())
            .await?;

        Ok(rows.into_iter().map(Book::from).collect())
    }

    async fn get(&self, id: i64) -> Result<Option<Book>, StoreError> {
        let sql = select_books("WHERE b.id = ?1");
        let row = sqlx::query_as::<_, BookRow>(&sql)
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(row.map(Book::from))
    }

    async fn create(&self, book: &NewBook) -> Result<Book, StoreError> {
        self.write(None, book)
            .await?
            .ok_or(StoreError::Database(sqlx::Error::RowNotFound))
    }

    async fn update(&self, id: i64, book: &NewBook) -> Result<Option<Book>, StoreError> {
        self.write(Some(id), book).await
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM book WHERE id = ?1")
            .bind(id)
            .execute(self.db.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
