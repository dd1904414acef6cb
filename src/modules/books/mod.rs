pub mod models;
mod routes;
pub mod store;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use libris_kernel::{InitCtx, Migration, Module};
use serde_json::json;

pub use models::{Book, BookPayload, NewBook};
pub use store::{BookStore, SqliteBookStore};

use super::{error_response, id_parameter, json_response, schema_ref};

/// Books resource; every book carries its author inline
pub struct BooksModule {
    store: Arc<dyn BookStore>,
}

impl BooksModule {
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.store.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let book = schema_ref("Book");
        let payload = json!({
            "required": true,
            "content": { "application/json": { "schema": schema_ref("BookPayload") } }
        });

        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List books with their authors",
                        "tags": ["Books"],
                        "responses": {
                            "200": json_response("List of books", json!({ "type": "array", "items": book })),
                            "500": error_response("Internal server error")
                        }
                    },
                    "post": {
                        "summary": "Create a book for an existing author",
                        "tags": ["Books"],
                        "requestBody": payload,
                        "responses": {
                            "201": json_response("Created book", book.clone()),
                            "400": error_response("Missing field, invalid date or unknown author"),
                            "500": error_response("Internal server error")
                        }
                    }
                },
                "/{id}": {
                    "parameters": [id_parameter("Book id")],
                    "get": {
                        "summary": "Get a book",
                        "tags": ["Books"],
                        "responses": {
                            "200": json_response("Book", book.clone()),
                            "404": error_response("Book not found"),
                            "500": error_response("Internal server error")
                        }
                    },
                    "put": {
                        "summary": "Replace a book",
                        "tags": ["Books"],
                        "requestBody": payload,
                        "responses": {
                            "200": json_response("Updated book", book),
                            "400": error_response("Missing field, invalid date or unknown author"),
                            "404": error_response("Book not found"),
                            "500": error_response("Internal server error")
                        }
                    },
                    "delete": {
                        "summary": "Delete a book",
                        "tags": ["Books"],
                        "responses": {
                            "204": { "description": "Deleted" },
                            "404": error_response("Book not found"),
                            "500": error_response("Internal server error")
                        }
                    }
                },
                "/health": {
                    "get": {
                        "summary": "Books health check",
                        "tags": ["Books"],
                        "responses": {
                            "200": {
                                "description": "OK",
                                "content": { "text/plain": { "schema": { "type": "string" } } }
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer", "format": "int64" },
                            "title": { "type": "string" },
                            "datePublished": { "type": "string", "format": "date-time" },
                            "isFiction": { "type": "boolean" },
                            "author": schema_ref("Author")
                        },
                        "required": ["id", "title", "datePublished", "isFiction", "author"]
                    },
                    "BookPayload": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string" },
                            "datePublished": {
                                "type": "string",
                                "description": "RFC 3339 timestamp or YYYY-MM-DD date"
                            },
                            "isFiction": { "type": "boolean" },
                            "authorId": { "type": "integer", "format": "int64" }
                        },
                        "required": ["title", "datePublished", "isFiction", "authorId"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_init",
            up: r#"
                CREATE TABLE book (
                    id             INTEGER PRIMARY KEY AUTOINCREMENT,
                    title          TEXT NOT NULL,
                    date_published TEXT NOT NULL,
                    is_fiction     BOOLEAN NOT NULL,
                    author_id      INTEGER NOT NULL REFERENCES author (id) ON DELETE RESTRICT
                );
                CREATE INDEX book_author_id ON book (author_id);
                "#,
        }]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create a new instance of the books module
pub fn create_module(store: Arc<dyn BookStore>) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(store))
}
