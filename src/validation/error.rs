//! Validation errors.

use std::fmt;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::ast::{Pos, Span};
use crate::diag::Diag;

/// One validation rule violation.
///
/// Serializes to the GraphQL response error shape:
///
/// ```json
/// { "message": "...", "locations": [{ "line": 1, "column": 3 }],
///   "extensions": { "code": "NO_UNUSED_VARIABLES" } }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub message: String,
    /// Source positions, in the order the rule reports them.
    pub locations: Vec<Pos>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<String>>,
    /// Stable upper-snake-case code of the rule that reported the error.
    #[serde(rename = "extensions", serialize_with = "serialize_code")]
    pub code: &'static str,
    /// Byte spans matching `locations`, used for diagnostics rendering.
    #[serde(skip)]
    pub spans: Vec<Span>,
}

fn serialize_code<S: Serializer>(code: &&'static str, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(1))?;
    map.serialize_entry("code", code)?;
    map.end()
}

impl ValidationError {
    /// Creates an error without locations.
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            locations: Vec::new(),
            path: None,
            code,
            spans: Vec::new(),
        }
    }

    /// Adds a location.
    pub fn with_location(mut self, span: Span, pos: Pos) -> Self {
        self.spans.push(span);
        self.locations.push(pos);
        self
    }

    /// Sets the path of the error.
    pub fn with_path(mut self, path: Vec<String>) -> Self {
        self.path = Some(path);
        self
    }

    /// Converts the error into a diagnostic for miette rendering. The first
    /// location becomes the primary label.
    pub fn to_diag(&self) -> Diag {
        let mut diag = Diag::error(self.message.clone()).with_code(self.code);
        let mut spans = self.spans.iter();
        if let Some(primary) = spans.next() {
            diag = diag.with_primary_label(primary.clone(), "");
        }
        for span in spans {
            diag = diag.with_secondary_label(span.clone(), "");
        }
        diag
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        for (i, pos) in self.locations.iter().enumerate() {
            f.write_str(if i == 0 { " (at " } else { ", " })?;
            write!(f, "{pos}")?;
        }
        if !self.locations.is_empty() {
            f.write_str(")")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_to_response_shape() {
        let error = ValidationError::new("NO_UNUSED_VARIABLES", "Variable '$a' is never used.")
            .with_location(6..8, Pos::new(1, 7));
        let json = serde_json::to_value(&error).expect("serializes");
        assert_eq!(
            json,
            serde_json::json!({
                "message": "Variable '$a' is never used.",
                "locations": [{ "line": 1, "column": 7 }],
                "extensions": { "code": "NO_UNUSED_VARIABLES" }
            })
        );
    }

    #[test]
    fn display_lists_locations() {
        let error = ValidationError::new("CODE", "Boom.")
            .with_location(0..1, Pos::new(1, 1))
            .with_location(4..5, Pos::new(2, 3));
        assert_eq!(error.to_string(), "Boom. (at 1:1, 2:3)");
    }

    #[test]
    fn converts_to_diag() {
        let error = ValidationError::new("CODE", "Boom.")
            .with_location(0..1, Pos::new(1, 1))
            .with_location(4..5, Pos::new(2, 3));
        let diag = error.to_diag();
        assert_eq!(diag.code.as_deref(), Some("CODE"));
        assert_eq!(diag.labels.len(), 2);
    }
}
