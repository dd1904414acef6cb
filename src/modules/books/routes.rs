use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use libris_http::AppError;

use super::models::{Book, BookPayload};
use super::store::BookStore;

type Store = Arc<dyn BookStore>;

pub fn router(store: Store) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route("/health", get(health_check))
        .route("/{id}", get(get_book).put(update_book).delete(delete_book))
        .with_state(store)
}

async fn health_check() -> &'static str {
    "books module is healthy"
}

async fn list_books(State(store): State<Store>) -> Result<Json<Vec<Book>>, AppError> {
    let books = store.list().await?;
    tracing::debug!(count = books.len(), "listed books");
    Ok(Json(books))
}

async fn get_book(
    State(store): State<Store>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Book>, AppError> {
    let Path(id) = id?;
    store
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Book not found"))
}

async fn create_book(
    State(store): State<Store>,
    payload: Result<Json<BookPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<Book>), AppError> {
    let Json(payload) = payload?;
    let book = store.create(&payload.validate()?).await?;
    tracing::info!(book_id = book.id, author_id = book.author.id, "book created");
    Ok((StatusCode::CREATED, Json(book)))
}

async fn update_book(
    State(store): State<Store>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<BookPayload>, JsonRejection>,
) -> Result<Json<Book>, AppError> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    let book = store
        .update(id, &payload.validate()?)
        .await?
        .ok_or_else(|| AppError::not_found("Book not found"))?;
    tracing::info!(book_id = id, author_id = book.author.id, "book updated");
    Ok(Json(book))
}

async fn delete_book(
    State(store): State<Store>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path(id) = id?;
    if !store.delete(id).await? {
        return Err(AppError::not_found("Book not found"));
    }
    tracing::info!(book_id = id, "book deleted");
    Ok(StatusCode::NO_CONTENT)
}
