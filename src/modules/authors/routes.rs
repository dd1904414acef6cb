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

use super::models::{Author, AuthorPayload};
use super::store::AuthorStore;

type Store = Arc<dyn AuthorStore>;

pub fn router(store: Store) -> Router {
    Router::new()
        .route("/", get(list_authors).post(create_author))
        .route("/health", get(health_check))
        .route(
            "/{id}",
            get(get_author).put(update_author).delete(delete_author),
        )
        .with_state(store)
}

async fn health_check() -> &'static str {
    "authors module is healthy"
}

async fn list_authors(State(store): State<Store>) -> Result<Json<Vec<Author>>, AppError> {
    let authors = store.list().await?;
    tracing::debug!(count = authors.len(), "listed authors");
    Ok(Json(authors))
}

async fn get_author(
    State(store): State<Store>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Author>, AppError> {
    let Path(id) = id?;
    match store.get(id).await? {
        Some(author) => Ok(Json(author)),
        None => Err(AppError::not_found("Author not found")),
    }
}

async fn create_author(
    State(store): State<Store>,
    payload: Result<Json<AuthorPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<Author>), AppError> {
    let Json(payload) = payload?;
    let author = store.create(&payload.validate()?).await?;
    tracing::info!(author_id = author.id, "author created");
    Ok((StatusCode::CREATED, Json(author)))
}

async fn update_author(
    State(store): State<Store>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<AuthorPayload>, JsonRejection>,
) -> Result<Json<Author>, AppError> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    let author = store
        .update(id, &payload.validate()?)
        .await?
        .ok_or_else(|| AppError::not_found("Author not found"))?;
    tracing::info!(author_id = id, "author updated");
    Ok(Json(author))
}

async fn delete_author(
    State(store): State<Store>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path(id) = id?;
    if !store.delete(id).await? {
        return Err(AppError::not_found("Author not found"));
    }
    tracing::info!(author_id = id, "author deleted");
    Ok(StatusCode::NO_CONTENT)
}
