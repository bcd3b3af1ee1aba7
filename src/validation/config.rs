use serde::{Deserialize, Serialize};

/// Configuration for document validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Check argument literals structurally (`VALUES_OF_CORRECT_TYPE`)
    /// instead of by coercion (`ARGUMENTS_OF_CORRECT_TYPE`).
    pub literal_type_checking: bool,

    /// Maximum number of "did you mean" suggestions per error.
    pub max_suggestions: usize,

    /// Maximum number of errors kept in the result. The walk always
    /// completes.
    pub max_errors: Option<usize>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            literal_type_checking: false,
            max_suggestions: 5,
            max_errors: None,
        }
    }
}

impl ValidationConfig {
    /// Enables structured literal type checking.
    pub fn with_literal_type_checking(mut self, enabled: bool) -> Self {
        self.literal_type_checking = enabled;
        self
    }

    /// Sets the suggestion limit.
    pub fn with_max_suggestions(mut self, max: usize) -> Self {
        self.max_suggestions = max;
        self
    }

    /// Caps the number of reported errors.
    pub fn with_max_errors(mut self, max: usize) -> Self {
        self.max_errors = Some(max);
        self
    }
}
