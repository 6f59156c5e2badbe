//! Field-level checking of raw JSON documents before they are decoded into
//! typed inbound schemas.

use chrono::DateTime;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{FieldIssue, ValidationError};

/// The JSON shape a field must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Integer,
    /// An integer that must also fit in 32 bits.
    SmallInteger,
    /// An RFC 3339 string.
    Timestamp,
}

impl FieldKind {
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            FieldKind::Text => value.is_string(),
            FieldKind::Integer | FieldKind::SmallInteger => value.as_i64().is_some(),
            FieldKind::Timestamp => value
                .as_str()
                .is_some_and(|s| DateTime::parse_from_rfc3339(s).is_ok()),
        }
    }

    /// Range problem of a value that already has the right JSON type.
    pub fn range_issue(&self, value: &Value) -> Option<&'static str> {
        match self {
            FieldKind::SmallInteger => value
                .as_i64()
                .filter(|n| i32::try_from(*n).is_err())
                .map(|_| "out of range for a 32-bit integer"),
            _ => None,
        }
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FieldKind::Text => "string",
            FieldKind::Integer | FieldKind::SmallInteger => "integer",
            FieldKind::Timestamp => "RFC 3339 timestamp",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldSpec {
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind, required: true }
    }

    pub const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind, required: false }
    }
}

/// An inbound record type with a declared field layout.
///
/// `validate` checks presence and JSON type of every declared field, reports
/// all problems at once, and only then hands the document to serde. A `null`
/// value counts as absent. Undeclared fields are ignored.
pub trait Schema: DeserializeOwned {
    const FIELDS: &'static [FieldSpec];

    fn validate(raw: Value) -> Result<Self, ValidationError> {
        let Value::Object(map) = &raw else {
            return Err(ValidationError::body("expected a JSON object"));
        };

        let mut issues = Vec::new();
        for spec in Self::FIELDS {
            match map.get(spec.name) {
                None | Some(Value::Null) => {
                    if spec.required {
                        issues.push(FieldIssue::missing(spec.name));
                    }
                }
                Some(value) if !spec.kind.accepts(value) => {
                    issues.push(FieldIssue::wrong_type(spec.name, spec.kind));
                }
                Some(value) => {
                    if let Some(reason) = spec.kind.range_issue(value) {
                        issues.push(FieldIssue::malformed(spec.name, reason));
                    }
                }
            }
        }
        if !issues.is_empty() {
            return Err(ValidationError { issues });
        }

        serde_json::from_value(raw).map_err(|e| ValidationError::body(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn integer_kind_rejects_floats_and_strings() {
        assert!(FieldKind::Integer.accepts(&json!(1999)));
        assert!(!FieldKind::Integer.accepts(&json!(19.5)));
        assert!(!FieldKind::Integer.accepts(&json!("1999")));
    }

    #[test]
    fn small_integer_range_is_checked_separately() {
        assert!(FieldKind::SmallInteger.accepts(&json!(10_000_000_000i64)));
        assert_eq!(FieldKind::SmallInteger.range_issue(&json!(2001)), None);
        assert!(FieldKind::SmallInteger.range_issue(&json!(10_000_000_000i64)).is_some());
        assert!(FieldKind::SmallInteger.range_issue(&json!(-3_000_000_000i64)).is_some());
        assert_eq!(FieldKind::Integer.range_issue(&json!(10_000_000_000i64)), None);
    }

    #[test]
    fn timestamp_kind_requires_rfc3339() {
        assert!(FieldKind::Timestamp.accepts(&json!("2024-03-01T12:00:00Z")));
        assert!(FieldKind::Timestamp.accepts(&json!("2024-03-01T12:00:00+07:00")));
        assert!(!FieldKind::Timestamp.accepts(&json!("yesterday")));
        assert!(!FieldKind::Timestamp.accepts(&json!(1_700_000_000)));
    }
}
