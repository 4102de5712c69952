//! Shared Serde defaults and lenient deserializers for request types

use serde::{Deserialize, Deserializer};

/// Default page size for paginated listings
pub const DEFAULT_PAGE_SIZE: usize = 100;

pub fn bool_true() -> bool {
    true
}

/// First page of a 1-indexed listing
pub fn first_page() -> usize {
    1
}

pub fn page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

/// Boolean from a native bool, `0`/`1`, or a `true`/`false`/`yes`/`no`
/// string (case-insensitive). Query strings always arrive as text.
pub fn deserialize_bool_flexible<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flexible {
        Bool(bool),
        Int(i64),
        Text(String),
    }

    match Flexible::deserialize(deserializer)? {
        Flexible::Bool(b) => Ok(b),
        Flexible::Int(0) => Ok(false),
        Flexible::Int(1) => Ok(true),
        Flexible::Int(i) => Err(D::Error::custom(format!(
            "invalid boolean {}, expected 0 or 1",
            i
        ))),
        Flexible::Text(s) => match s.trim() {
            t if t == "1" || t.eq_ignore_ascii_case("true") || t.eq_ignore_ascii_case("yes") => {
                Ok(true)
            },
            t if t.is_empty()
                || t == "0"
                || t.eq_ignore_ascii_case("false")
                || t.eq_ignore_ascii_case("no") =>
            {
                Ok(false)
            },
            _ => Err(D::Error::custom(format!("invalid boolean '{}'", s))),
        },
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Flag {
        #[serde(deserialize_with = "deserialize_bool_flexible")]
        value: bool,
    }

    fn parse(json: &str) -> Result<bool, serde_json::Error> {
        serde_json::from_str::<Flag>(json).map(|f| f.value)
    }

    #[test]
    fn test_bool_flexible_accepts_variants() {
        assert!(parse(r#"{"value": true}"#).unwrap());
        assert!(parse(r#"{"value": 1}"#).unwrap());
        assert!(parse(r#"{"value": "TRUE"}"#).unwrap());
        assert!(parse(r#"{"value": " yes "}"#).unwrap());
        assert!(!parse(r#"{"value": "0"}"#).unwrap());
        assert!(!parse(r#"{"value": ""}"#).unwrap());
        assert!(!parse(r#"{"value": "no"}"#).unwrap());
    }

    #[test]
    fn test_bool_flexible_rejects_garbage() {
        assert!(parse(r#"{"value": 2}"#).is_err());
        assert!(parse(r#"{"value": "maybe"}"#).is_err());
    }
}
