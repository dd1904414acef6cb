pub mod authors;
pub mod books;

use std::sync::Arc;

use libris_db::Db;
use libris_kernel::{settings::Settings, ModuleRegistry};
use serde_json::{json, Value};

/// Register the resource modules. Authors go first because `book` references `author`.
pub fn register_all(
    registry: &mut ModuleRegistry,
    db: &Db,
    settings: &Settings,
) -> anyhow::Result<()> {
    let author_store = authors::SqliteAuthorStore::new(
        db.clone(),
        settings.database.author_delete_policy,
    );
    registry.register(authors::create_module(Arc::new(author_store)))?;

    let book_store = books::SqliteBookStore::new(db.clone());
    registry.register(books::create_module(Arc::new(book_store)))?;

    Ok(())
}

/// OpenAPI response object with a JSON body
fn json_response(description: &str, schema: Value) -> Value {
    json!({
        "description": description,
        "content": { "application/json": { "schema": schema } }
    })
}

fn error_response(description: &str) -> Value {
    json_response(
        description,
        json!({ "$ref": "#/components/schemas/ErrorResponse" }),
    )
}

fn schema_ref(name: &str) -> Value {
    json!({ "$ref": format!("#/components/schemas/{}", name) })
}

fn id_parameter(description: &str) -> Value {
    json!({
        "name": "id",
        "in": "path",
        "required": true,
        "description": description,
        "schema": { "type": "integer", "format": "int64" }
    })
}
