//! Errors raised while building a schema.

use smol_str::SmolStr;
use thiserror::Error;

use crate::diag::Diag;

/// A schema that cannot be built.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// The SDL does not parse.
    #[error("invalid schema syntax: {message}")]
    Syntax {
        /// The first syntax error.
        message: String,
        /// Every syntax diagnostic, for rendering.
        diagnostics: Vec<Diag>,
    },

    #[error("There can be only one type named '{0}'.")]
    DuplicateType(SmolStr),

    #[error("There can be only one directive named '@{0}'.")]
    DuplicateDirective(SmolStr),

    #[error("Unknown type '{name}' referenced by '{referenced_by}'.")]
    UnknownType { name: SmolStr, referenced_by: String },

    #[error("Cannot extend type '{0}' because it is not defined.")]
    ExtensionOfUnknownType(SmolStr),

    #[error("Cannot extend {actual} '{name}' with a '{extension}' extension.")]
    InvalidExtension {
        name: SmolStr,
        actual: &'static str,
        extension: &'static str,
    },

    #[error("The type of '{coordinate}' must be an input type but got '{ty}'.")]
    NotInputType { coordinate: String, ty: String },

    #[error("The type of '{coordinate}' must be an output type but got '{ty}'.")]
    NotOutputType { coordinate: String, ty: String },

    #[error("Union '{union}' can only include object types, it cannot include '{member}'.")]
    InvalidUnionMember { union: SmolStr, member: SmolStr },

    #[error("Type '{ty}' can only implement interfaces, it cannot implement '{interface}'.")]
    InvalidImplementation { ty: SmolStr, interface: SmolStr },

    #[error("Root type '{name}' for {operation} must be an object type.")]
    InvalidRootType { operation: &'static str, name: SmolStr },

    #[error("Query root type must be provided.")]
    MissingQueryRoot,

    #[error("Unknown directive location '{0}'.")]
    UnknownDirectiveLocation(SmolStr),
}

/// Result type for schema building.
pub type SchemaResult<T> = Result<T, SchemaError>;
