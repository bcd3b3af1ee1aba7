//! Coercion failures.

use std::fmt;

use smol_str::SmolStr;
use thiserror::Error;

use crate::ast::{Span, TypeRef};

/// One step into a nested input value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// An input object field.
    Key(SmolStr),
    /// A list element.
    Index(usize),
}

/// Location of a failure inside a nested input value, outermost first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputPath(pub Vec<PathSegment>);

impl InputPath {
    /// Returns true at the root of the value.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Renders the path as `a.b[0]`.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for segment in &self.0 {
            match segment {
                PathSegment::Key(key) if out.is_empty() => out.push_str(key),
                PathSegment::Key(key) => {
                    out.push('.');
                    out.push_str(key);
                }
                PathSegment::Index(index) => {
                    out.push('[');
                    out.push_str(&index.to_string());
                    out.push(']');
                }
            }
        }
        out
    }
}

/// Displays as a message prefix, empty at the root.
impl fmt::Display for InputPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            Ok(())
        } else {
            write!(f, "At '{}': ", self.render())
        }
    }
}

/// Where a `@oneOf` value came from; the two get distinct wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OneOfOrigin {
    /// An argument literal in the document.
    Argument,
    /// A raw variable value from the request.
    Variable,
}

impl fmt::Display for OneOfOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OneOfOrigin::Argument => "Argument",
            OneOfOrigin::Variable => "Variable",
        })
    }
}

/// What went wrong while coercing a value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoercionErrorKind {
    #[error("Expected non-nullable type '{ty}' not to be null.")]
    NullForNonNull { ty: TypeRef },

    #[error("Expected type '{ty}' to be an object.")]
    NotAnObject { ty: SmolStr },

    #[error("Field '{field}' is not defined by type '{ty}'.")]
    UnknownField { field: SmolStr, ty: SmolStr },

    #[error("Field '{ty}.{field}' of required type '{field_type}' was not provided.")]
    MissingField {
        ty: SmolStr,
        field: SmolStr,
        field_type: TypeRef,
    },

    /// The scalar's parse function rejected the value.
    #[error("Unable to convert '{value}' to '{ty}': {reason}")]
    InvalidScalar {
        ty: SmolStr,
        value: String,
        reason: String,
    },

    #[error("Value '{value}' does not exist in '{ty}' enum.")]
    UnknownEnumValue { ty: SmolStr, value: String },

    #[error("Enum '{ty}' cannot represent non-enum value: {value}.")]
    NotAnEnumValue { ty: SmolStr, value: String },

    #[error("{origin} value for OneOf input object '{ty}' must specify exactly one non-null value.")]
    OneOf { ty: SmolStr, origin: OneOfOrigin },

    #[error("Type '{ty}' is not an input type.")]
    NotInputType { ty: SmolStr },

    #[error("Unknown type '{ty}'.")]
    UnknownType { ty: SmolStr },

    #[error("Variable '${variable}' of required type '{ty}' was not provided a runtime value.")]
    MissingVariableValue { variable: SmolStr, ty: TypeRef },

    #[error("Argument '{argument}' of required type '{ty}' was not provided.")]
    MissingArgument { argument: SmolStr, ty: TypeRef },

    #[error(
        "Argument '{argument}' of required type '{ty}' was provided the variable '${variable}' which was not provided a runtime value."
    )]
    MissingArgumentVariable {
        argument: SmolStr,
        ty: TypeRef,
        variable: SmolStr,
    },

    #[error("Argument '{argument}' of non-null type '{ty}' must not be null.")]
    NullArgument { argument: SmolStr, ty: TypeRef },
}

/// A coercion failure and where in the value it happened.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{path}{kind}")]
pub struct CoercionError {
    pub kind: CoercionErrorKind,
    pub path: InputPath,
}

impl CoercionError {
    /// Prepends a path segment while unwinding out of a nested value.
    pub(crate) fn within(mut self, segment: PathSegment) -> Self {
        self.path.0.insert(0, segment);
        self
    }
}

impl From<CoercionErrorKind> for CoercionError {
    fn from(kind: CoercionErrorKind) -> Self {
        Self {
            kind,
            path: InputPath::default(),
        }
    }
}

/// Result type for coercion.
pub type CoercionResult<T> = Result<T, CoercionError>;

/// A request variable that cannot be coerced to its declared type.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VariableError {
    #[error("Variable '${name}' of required type '{ty}' was not provided.")]
    Missing { name: SmolStr, ty: TypeRef, span: Span },

    #[error("Variable '${name}' of non-null type '{ty}' must not be null.")]
    Null { name: SmolStr, ty: TypeRef, span: Span },

    #[error("Variable '${name}' got invalid value {value}; {error}")]
    Invalid {
        name: SmolStr,
        value: String,
        error: CoercionError,
        span: Span,
    },
}

impl VariableError {
    /// The variable name, without `$`.
    pub fn name(&self) -> &SmolStr {
        match self {
            VariableError::Missing { name, .. }
            | VariableError::Null { name, .. }
            | VariableError::Invalid { name, .. } => name,
        }
    }

    /// Span of the variable definition.
    pub fn span(&self) -> &Span {
        match self {
            VariableError::Missing { span, .. }
            | VariableError::Null { span, .. }
            | VariableError::Invalid { span, .. } => span,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_renders_as_prefix() {
        let error = CoercionError::from(CoercionErrorKind::NullForNonNull {
            ty: TypeRef::named("Int").non_null(),
        })
        .within(PathSegment::Index(1))
        .within(PathSegment::Key("list".into()))
        .within(PathSegment::Key("input".into()));
        assert_eq!(error.path.render(), "input.list[1]");
        assert_eq!(
            error.to_string(),
            "At 'input.list[1]': Expected non-nullable type 'Int!' not to be null."
        );
    }

    #[test]
    fn one_of_wording_depends_on_origin() {
        let literal = CoercionErrorKind::OneOf {
            ty: "Pick".into(),
            origin: OneOfOrigin::Argument,
        };
        let variable = CoercionErrorKind::OneOf {
            ty: "Pick".into(),
            origin: OneOfOrigin::Variable,
        };
        assert!(literal.to_string().starts_with("Argument value for OneOf"));
        assert!(variable.to_string().starts_with("Variable value for OneOf"));
        for message in [literal.to_string(), variable.to_string()] {
            assert!(message.contains("exactly one non-null value"));
        }
    }
}
