//! Sanitization and validation of raw provider output
//!
//! Provider text is untrusted: it may arrive wrapped in markdown fences, be
//! malformed JSON, or drift from the requested schema. Nothing here coerces
//! values; a wrong type is always a validation failure.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt::Display;

use crate::models::{Destination, RecommendationResult};

/// JSON value kinds used in schema checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonKind {
    Object,
    Array,
    String,
    Number,
    Boolean,
    Null,
}

impl JsonKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Object(_) => JsonKind::Object,
            Value::Array(_) => JsonKind::Array,
            Value::String(_) => JsonKind::String,
            Value::Number(_) => JsonKind::Number,
            Value::Bool(_) => JsonKind::Boolean,
            Value::Null => JsonKind::Null,
        }
    }
}

impl Display for JsonKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            JsonKind::Object => "object",
            JsonKind::Array => "array",
            JsonKind::String => "string",
            JsonKind::Number => "number",
            JsonKind::Boolean => "boolean",
            JsonKind::Null => "null",
        };
        f.write_str(name)
    }
}

/// What was wrong at a schema path
#[derive(Debug, Clone, PartialEq)]
pub enum Violation {
    Missing,
    WrongType { expected: JsonKind, actual: JsonKind },
    Invalid(String),
}

/// Structural mismatch between provider output and the required contract
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaViolation {
    pub path: String,
    pub violation: Violation,
}

impl Display for SchemaViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.violation {
            Violation::Missing => write!(f, "Missing required field: {}", self.path),
            Violation::WrongType { expected, actual } => write!(
                f,
                "Invalid type for {}: expected {}, got {}",
                self.path, expected, actual
            ),
            Violation::Invalid(reason) => write!(f, "Invalid value for {}: {}", self.path, reason),
        }
    }
}

/// Failures while turning provider text into typed values
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Failed to parse response: {message}")]
    InvalidJson { message: String, raw: String },

    #[error("Invalid response format: {0}")]
    SchemaViolation(SchemaViolation),
}

impl ValidationError {
    fn missing(path: impl Into<String>) -> Self {
        Self::SchemaViolation(SchemaViolation {
            path: path.into(),
            violation: Violation::Missing,
        })
    }

    fn wrong_type(path: impl Into<String>, expected: JsonKind, actual: JsonKind) -> Self {
        Self::SchemaViolation(SchemaViolation {
            path: path.into(),
            violation: Violation::WrongType { expected, actual },
        })
    }

    fn invalid(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SchemaViolation(SchemaViolation {
            path: path.into(),
            violation: Violation::Invalid(reason.into()),
        })
    }

    /// Path named by a schema violation
    pub fn path(&self) -> Option<&str> {
        match self {
            ValidationError::SchemaViolation(violation) => Some(&violation.path),
            ValidationError::InvalidJson { .. } => None,
        }
    }
}

/// Required fields of a personalized suggestion, checked in order
pub const RECOMMENDATION_REQUIRED_FIELDS: &[(&str, JsonKind)] = &[
    ("data", JsonKind::Object),
    ("data.destination", JsonKind::Object),
    ("data.destination.city", JsonKind::String),
    ("data.startDate", JsonKind::String),
    ("data.endDate", JsonKind::String),
    ("explanation", JsonKind::Object),
    ("explanation.summary", JsonKind::String),
    ("explanation.highlights", JsonKind::Array),
];

/// Fields every destination entry must carry
const DESTINATION_FIELDS: &[(&str, JsonKind)] = &[
    ("destination", JsonKind::Object),
    ("description", JsonKind::String),
    ("highlights", JsonKind::Array),
];

/// Removes a surrounding markdown code fence and whitespace
pub fn strip_code_fence(raw: &str) -> &str {
    let mut content = raw.trim();

    if let Some(rest) = content.strip_prefix("```json") {
        content = rest;
    } else if let Some(rest) = content.strip_prefix("```") {
        content = rest;
    }

    if let Some(rest) = content.strip_suffix("```") {
        content = rest;
    }

    content.trim()
}

/// Strips formatting artifacts and parses the remainder as JSON
pub fn parse_json(raw: &str) -> Result<Value, ValidationError> {
    let content = strip_code_fence(raw);
    serde_json::from_str(content).map_err(|e| ValidationError::InvalidJson {
        message: e.to_string(),
        raw: raw.to_string(),
    })
}

/// Checks dotted paths against expected kinds, failing on the first mismatch
pub fn check_required_fields(
    value: &Value,
    fields: &[(&str, JsonKind)],
) -> Result<(), ValidationError> {
    for (path, expected) in fields {
        let mut current = value;
        for key in path.split('.') {
            current = match current {
                Value::Object(map) => map
                    .get(key)
                    .ok_or_else(|| ValidationError::missing(*path))?,
                _ => return Err(ValidationError::missing(*path)),
            };
        }

        let actual = JsonKind::of(current);
        if actual != *expected {
            return Err(ValidationError::wrong_type(*path, *expected, actual));
        }
    }

    Ok(())
}

/// Parses and validates a destinations response
///
/// The whole batch is rejected on the first bad entry; callers never see a
/// partially accepted list.
pub fn parse_destinations(raw: &str) -> Result<Vec<Destination>, ValidationError> {
    let value = parse_json(raw)?;

    let entries = match value.get("destinations") {
        Some(Value::Array(entries)) => entries,
        Some(other) => {
            return Err(ValidationError::wrong_type(
                "destinations",
                JsonKind::Array,
                JsonKind::of(other),
            ))
        }
        None => return Err(ValidationError::missing("destinations")),
    };

    if entries.is_empty() {
        return Err(ValidationError::invalid(
            "destinations",
            "expected at least one destination",
        ));
    }

    let mut destinations = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let path = format!("destinations[{index}]");

        let fields = match entry {
            Value::Object(fields) => fields,
            other => {
                return Err(ValidationError::wrong_type(
                    path,
                    JsonKind::Object,
                    JsonKind::of(other),
                ))
            }
        };

        for (key, expected) in DESTINATION_FIELDS {
            let field = fields
                .get(*key)
                .ok_or_else(|| ValidationError::missing(format!("{path}.{key}")))?;
            let actual = JsonKind::of(field);
            if actual != *expected {
                return Err(ValidationError::wrong_type(
                    format!("{path}.{key}"),
                    *expected,
                    actual,
                ));
            }
        }

        let mut destination: Destination = decode(entry, &path)?;
        // Images are attached by the pipeline, never taken from the model
        destination.image_url = None;
        destinations.push(destination);
    }

    Ok(destinations)
}

/// Parses and validates a personalized suggestion response
pub fn parse_recommendation(raw: &str) -> Result<RecommendationResult, ValidationError> {
    let value = parse_json(raw)?;
    check_required_fields(&value, RECOMMENDATION_REQUIRED_FIELDS)?;
    decode(&value, "")
}

/// Strict decode that reports the exact path of the offending value
///
/// `prefix` is the path of `value` inside the response; empty for the root.
fn decode<T: DeserializeOwned>(value: &Value, prefix: &str) -> Result<T, ValidationError> {
    serde_path_to_error::deserialize(value).map_err(|e| {
        let path = join_path(prefix, &e.path().to_string());
        ValidationError::invalid(path, e.into_inner().to_string())
    })
}

fn join_path(prefix: &str, inner: &str) -> String {
    match (prefix.is_empty(), inner) {
        (true, ".") => "response".to_string(),
        (true, _) => inner.to_string(),
        (false, ".") => prefix.to_string(),
        (false, _) if inner.starts_with('[') => format!("{prefix}{inner}"),
        (false, _) => format!("{prefix}.{inner}"),
    }
}
