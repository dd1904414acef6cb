//! Input helpers shared by the resource modules.

use serde_json::{json, Value};
use time::{
    format_description::well_known::Rfc3339, macros::format_description, Date, OffsetDateTime,
    UtcOffset,
};

/// Parse a publication date.
///
/// Accepts RFC 3339 timestamps (shifted to UTC) or plain `YYYY-MM-DD` dates,
/// which become midnight UTC. Timestamps whose UTC instant falls outside the
/// representable year range are rejected.
pub fn parse_date(raw: &str) -> Option<OffsetDateTime> {
    let raw = raw.trim();
    if let Ok(timestamp) = OffsetDateTime::parse(raw, &Rfc3339) {
        return timestamp.checked_to_offset(UtcOffset::UTC);
    }

    let date = Date::parse(raw, format_description!("[year]-[month]-[day]")).ok()?;
    Some(date.midnight().assume_utc())
}

/// Validation detail entry for a single field
pub fn field_error(field: &str, error: &str) -> Value {
    json!({ "field": field, "error": error })
}

/// Take a required field, recording a `required` detail when it is absent
pub fn required<T>(value: Option<T>, field: &str, details: &mut Vec<Value>) -> Option<T> {
    if value.is_none() {
        details.push(field_error(field, "required"));
    }
    value
}
