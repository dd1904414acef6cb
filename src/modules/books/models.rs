use libris_http::AppError;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::modules::authors::Author;
use crate::utils::{field_error, parse_date, required};

/// Book as returned by every book operation, with its author embedded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: i64,
    pub title: String,
    #[serde(with = "time::serde::rfc3339")]
    pub date_published: OffsetDateTime,
    pub is_fiction: bool,
    pub author: Author,
}

/// Flat row produced by the book/author join.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct BookRow {
    pub id: i64,
    pub title: String,
    pub date_published: OffsetDateTime,
    pub is_fiction: bool,
    pub author_id: i64,
    pub author_first_name: String,
    pub author_last_name: String,
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            date_published: row.date_published,
            is_fiction: row.is_fiction,
            author: Author {
                id: row.author_id,
                first_name: row.author_first_name,
                last_name: row.author_last_name,
            },
        }
    }
}

/// Validated fields for creating or fully replacing a book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub date_published: OffsetDateTime,
    pub is_fiction: bool,
    pub author_id: i64,
}

/// Request body for `POST /` and `PUT /{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookPayload {
    pub title: Option<String>,
    pub date_published: Option<String>,
    pub is_fiction: Option<bool>,
    pub author_id: Option<i64>,
}

impl BookPayload {
    /// Check presence of every field and parse the publication date.
    pub fn validate(self) -> Result<NewBook, AppError> {
        let mut details = Vec::new();
        let title = required(self.title, "title", &mut details);
        let date_published = required(self.date_published, "datePublished", &mut details)
            .and_then(|raw| {
                let parsed = parse_date(&raw);
                if parsed.is_none() {
                    details.push(field_error("datePublished", "invalid date"));
                }
                parsed
            });
        let is_fiction = required(self.is_fiction, "isFiction", &mut details);
        let author_id = required(self.author_id, "authorId", &mut details);

        match (title, date_published, is_fiction, author_id) {
            (Some(title), Some(date_published), Some(is_fiction), Some(author_id)) => Ok(NewBook {
                title,
                date_published,
                is_fiction,
                author_id,
            }),
            _ => Err(AppError::validation(details, "book payload is invalid")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::datetime;

    #[test]
    fn complete_payload_validates() {
        let payload: BookPayload = serde_json::from_value(json!({
            "title": "Emma",
            "datePublished": "1815-12-23",
            "isFiction": true,
            "authorId": 1
        }))
        .unwrap();

        assert_eq!(
            payload.validate().unwrap(),
            NewBook {
                title: "Emma".to_string(),
                date_published: datetime!(1815-12-23 0:00 UTC),
                is_fiction: true,
                author_id: 1,
            }
        );
    }

    #[test]
    fn false_fiction_flag_is_present() {
        let payload: BookPayload = serde_json::from_value(json!({
            "title": "On the Origin of Species",
            "datePublished": "1859-11-24",
            "isFiction": false,
            "authorId": 2
        }))
        .unwrap();
        assert!(!payload.validate().unwrap().is_fiction);
    }

    #[test]
    fn every_problem_is_reported() {
        let payload: BookPayload = serde_json::from_value(json!({
            "datePublished": "someday",
            "isFiction": true
        }))
        .unwrap();

        match payload.validate().unwrap_err() {
            AppError::Validation { details, .. } => {
                assert_eq!(
                    details,
                    vec![
                        field_error("title", "required"),
                        field_error("datePublished", "invalid date"),
                        field_error("authorId", "required"),
                    ]
                );
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn book_serializes_with_embedded_author() {
        let book = Book {
            id: 1,
            title: "Emma".to_string(),
            date_published: datetime!(1815-12-23 0:00 UTC),
            is_fiction: true,
            author: Author {
                id: 1,
                first_name: "Jane".to_string(),
                last_name: "Austen".to_string(),
            },
        };

        assert_eq!(
            serde_json::to_value(&book).unwrap(),
            json!({
                "id": 1,
                "title": "Emma",
                "datePublished": "1815-12-23T00:00:00Z",
                "isFiction": true,
                "author": { "id": 1, "firstName": "Jane", "lastName": "Austen" }
            })
        );
    }
}
