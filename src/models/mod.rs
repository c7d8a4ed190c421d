use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serializer};
use time::format_description::FormatItem;
use time::macros::format_description;
use time::{Date, PrimitiveDateTime};

use crate::error::{ClubError, ClubResult};

pub mod community;
pub mod contact;
pub mod event;
pub mod member;
pub mod stats;

pub const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");
pub const TIMESTAMP_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]Z");

/// The body of every `PUT .../:id/status` request.
#[derive(Debug, Deserialize)]
pub struct StatusUpdate<S> {
    pub status: S,
}

pub(crate) fn serialize_date<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
    let formatted = date
        .format(DATE_FORMAT)
        .map_err(serde::ser::Error::custom)?;
    serializer.serialize_str(&formatted)
}

/// Timestamps are stored in UTC without an offset.
pub(crate) fn serialize_timestamp<S: Serializer>(
    timestamp: &PrimitiveDateTime,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let formatted = timestamp
        .format(TIMESTAMP_FORMAT)
        .map_err(serde::ser::Error::custom)?;
    serializer.serialize_str(&formatted)
}

/// Accepts `true`, `"true"`, `"on"` (an HTML checkbox), `1` and friends.
pub(crate) fn flexible_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Number(i64),
        Text(String),
    }

    Ok(match Option::<Flag>::deserialize(deserializer)? {
        Some(Flag::Bool(flag)) => flag,
        Some(Flag::Number(number)) => number != 0,
        Some(Flag::Text(text)) => matches!(
            text.trim().to_ascii_lowercase().as_str(),
            "true" | "on" | "yes" | "1"
        ),
        None => false,
    })
}

pub fn require(field: &str, value: &str) -> ClubResult<()> {
    if value.trim().is_empty() {
        Err(ClubError::BadRequest(format!("{} is required", field)))
    } else {
        Ok(())
    }
}

pub fn require_email(field: &str, value: &str) -> ClubResult<()> {
    require(field, value)?;

    let trimmed = value.trim();
    match trimmed.split_once('@') {
        Some((user, domain)) if !user.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(ClubError::BadRequest(format!(
            "{} must be an email address",
            field
        ))),
    }
}

/// Session years look like `2025-26`.
pub fn check_session_year(value: &str) -> ClubResult<()> {
    static SESSION_YEAR: OnceLock<Regex> = OnceLock::new();
    let pattern = SESSION_YEAR
        .get_or_init(|| Regex::new(r"^\d{4}-\d{2}$").expect("session year pattern is valid"));

    if pattern.is_match(value) {
        Ok(())
    } else {
        Err(ClubError::BadRequest(format!(
            "session_year must look like YYYY-YY (e.g. 2025-26), got {:?}",
            value
        )))
    }
}

pub fn parse_date(field: &str, value: &str) -> ClubResult<Date> {
    Date::parse(value.trim(), DATE_FORMAT).map_err(|_| {
        ClubError::BadRequest(format!(
            "{} must be a date formatted as YYYY-MM-DD, got {:?}",
            field, value
        ))
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use time::macros::date;

    use super::*;

    #[test]
    fn session_years_must_match_the_pattern() {
        assert!(check_session_year("2025-26").is_ok());
        assert!(check_session_year("2026-27").is_ok());
        assert!(check_session_year("2025-2026").is_err());
        assert!(check_session_year("25-26").is_err());
        assert!(check_session_year(" 2025-26").is_err());
    }

    #[test]
    fn dates_parse_as_calendar_dates() {
        assert_eq!(parse_date("event_date", "2025-02-28").unwrap(), date!(2025 - 02 - 28));
        assert!(parse_date("event_date", "2025-02-30").is_err());
        assert!(parse_date("event_date", "28/02/2025").is_err());
    }

    #[test]
    fn blank_required_fields_are_rejected() {
        assert!(require("name", "Ada").is_ok());
        assert!(require("name", "   ").is_err());
        assert!(require_email("email", "ada@example.com").is_ok());
        assert!(require_email("email", "ada.example.com").is_err());
        assert!(require_email("email", "@example.com").is_err());
    }

    #[derive(Deserialize)]
    struct Newsletter {
        #[serde(default, deserialize_with = "flexible_bool")]
        newsletter: bool,
    }

    #[test]
    fn checkbox_values_become_booleans() {
        let parse = |value| {
            serde_json::from_value::<Newsletter>(value)
                .unwrap()
                .newsletter
        };

        assert!(parse(json!({ "newsletter": true })));
        assert!(parse(json!({ "newsletter": "true" })));
        assert!(parse(json!({ "newsletter": "on" })));
        assert!(parse(json!({ "newsletter": 1 })));
        assert!(!parse(json!({ "newsletter": "false" })));
        assert!(!parse(json!({ "newsletter": null })));
        assert!(!parse(json!({})));
    }
}
