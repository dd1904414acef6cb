pub mod models;
mod routes;
pub mod store;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use libris_kernel::{InitCtx, Migration, Module};
use serde_json::json;

pub use models::{Author, AuthorPayload, NewAuthor};
pub use store::{AuthorStore, SqliteAuthorStore};

use super::{error_response, id_parameter, json_response, schema_ref};

/// Authors resource: list, get, create, replace and delete authors
pub struct AuthorsModule {
    store: Arc<dyn AuthorStore>,
}

impl AuthorsModule {
    pub fn new(store: Arc<dyn AuthorStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Module for AuthorsModule {
    fn name(&self) -> &'static str {
        "authors"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            delete_policy = ?ctx.settings.database.author_delete_policy,
            "authors module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.store.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let author = schema_ref("Author");
        let payload = json!({
            "required": true,
            "content": { "application/json": { "schema": schema_ref("AuthorPayload") } }
        });

        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List authors",
                        "tags": ["Authors"],
                        "responses": {
                            "200": json_response("List of authors", json!({ "type": "array", "items": author })),
                            "500": error_response("Internal server error")
                        }
                    },
                    "post": {
                        "summary": "Create an author",
                        "tags": ["Authors"],
                        "requestBody": payload,
                        "responses": {
                            "201": json_response("Created author", author.clone()),
                            "400": error_response("Missing field or malformed body"),
                            "500": error_response("Internal server error")
                        }
                    }
                },
                "/{id}": {
                    "parameters": [id_parameter("Author id")],
                    "get": {
                        "summary": "Get an author",
                        "tags": ["Authors"],
                        "responses": {
                            "200": json_response("Author", author.clone()),
                            "404": error_response("Author not found"),
                            "500": error_response("Internal server error")
                        }
                    },
                    "put": {
                        "summary": "Replace an author's names",
                        "tags": ["Authors"],
                        "requestBody": payload,
                        "responses": {
                            "200": json_response("Updated author", author),
                            "400": error_response("Missing field or malformed body"),
                            "404": error_response("Author not found"),
                            "500": error_response("Internal server error")
                        }
                    },
                    "delete": {
                        "summary": "Delete an author",
                        "tags": ["Authors"],
                        "responses": {
                            "204": { "description": "Deleted" },
                            "404": error_response("Author not found"),
                            "409": error_response("Author still has books"),
                            "500": error_response("Internal server error")
                        }
                    }
                },
                "/health": {
                    "get": {
                        "summary": "Authors health check",
                        "tags": ["Authors"],
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
                    "Author": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer", "format": "int64" },
                            "firstName": { "type": "string" },
                            "lastName": { "type": "string" }
                        },
                        "required": ["id", "firstName", "lastName"]
                    },
                    "AuthorPayload": {
                        "type": "object",
                        "properties": {
                            "firstName": { "type": "string" },
                            "lastName": { "type": "string" }
                        },
                        "required": ["firstName", "lastName"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_init",
            up: r#"
                CREATE TABLE author (
                    id         INTEGER PRIMARY KEY AUTOINCREMENT,
                    first_name TEXT NOT NULL,
                    last_name  TEXT NOT NULL
                );
                "#,
        }]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "authors module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "authors module stopped");
        Ok(())
    }
}

/// Create a new instance of the authors module
pub fn create_module(store: Arc<dyn AuthorStore>) -> Arc<dyn Module> {
    Arc::new(AuthorsModule::new(store))
}
