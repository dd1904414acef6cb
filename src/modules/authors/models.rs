use libris_http::AppError;
use serde::{Deserialize, Serialize};

use crate::utils::required;

/// Author as stored and returned by every author operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
}

/// Validated fields for creating or fully replacing an author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuthor {
    pub first_name: String,
    pub last_name: String,
}

/// Request body for `POST /` and `PUT /{id}`.
///
/// Fields are optional here so a missing one becomes a validation error
/// instead of an extractor rejection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorPayload {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl AuthorPayload {
    pub fn validate(self) -> Result<NewAuthor, AppError> {
        let mut details = Vec::new();
        let first_name = required(self.first_name, "firstName", &mut details);
        let last_name = required(self.last_name, "lastName", &mut details);

        match (first_name, last_name) {
            (Some(first_name), Some(last_name)) => Ok(NewAuthor {
                first_name,
                last_name,
            }),
            _ => Err(AppError::validation(details, "author payload is incomplete")),
        }
    }
}
