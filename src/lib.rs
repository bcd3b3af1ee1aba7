//! GraphQL document validation with rich diagnostics.
//!
//! This library parses GraphQL executable documents, checks them against a
//! schema with the standard validation rules, and coerces request variables
//! and argument literals to their declared input types. Errors carry 1-based
//! source positions and convert to miette diagnostics.
//!
//! # Example
//!
//! ```
//! use graphql_validator::{Schema, parse, validate};
//!
//! let schema = Schema::parse("type Query { dog(name: String): Dog } type Dog { name: String }")
//!     .expect("schema builds");
//! let document = parse("{ dog(name: 3) { name color } }").ast.expect("document parses");
//!
//! let result = validate(&schema, &document);
//! assert!(!result.is_valid());
//! assert_eq!(result.errors.len(), 2);
//! assert_eq!(result.errors[1].message, "Cannot query field 'color' on type 'Dog'.");
//! ```

pub mod ast;
pub mod coercion;
pub mod diag;
pub mod lexer;
pub mod parser;
pub mod schema;
pub mod validation;

// Re-export syntax span primitives.
pub use ast::{Document, Pos, Span, Spanned};

pub use diag::{Diag, DiagLabel, DiagSeverity, LabelRole};
pub use lexer::token::{Token, TokenKind};
pub use lexer::{Lexer, LexerResult, tokenize};
pub use parser::{ParseResult, Parser, parse};

pub use coercion::{CoercionError, VariableValues, coerce_argument_values, coerce_variable_values};
pub use schema::{Schema, SchemaBuilder, SchemaError};
pub use validation::{
    DocumentValidator, ValidationConfig, ValidationError, ValidationRequest, ValidationResult,
    ValidationRule,
};

/// Validates `document` against `schema` with every built-in rule and the
/// default configuration.
pub fn validate(schema: &Schema, document: &Document) -> ValidationResult {
    DocumentValidator::new().validate(&ValidationRequest::new(schema, document))
}

/// Builds a schema from SDL text; shorthand for [`Schema::parse`].
pub fn parse_schema(sdl: &str) -> Result<Schema, SchemaError> {
    Schema::parse(sdl)
}
