//! Type system (SDL) AST: schema, type and directive definitions.

use smol_str::SmolStr;

use super::document::{Directive, OperationType};
use super::span::{Span, Spanned};
use super::types::TypeRef;
use super::value::Value;

/// A type system definition or extension.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeSystemDefinition {
    /// `schema { ... }` or `extend schema ...`.
    Schema(SchemaDefinition),
    /// A named type definition or extension.
    Type(TypeDefinition),
    /// `directive @name ... on LOCATIONS`.
    Directive(DirectiveDefinition),
}

impl TypeSystemDefinition {
    /// Returns the span of the definition.
    pub fn span(&self) -> &Span {
        match self {
            TypeSystemDefinition::Schema(schema) => &schema.span,
            TypeSystemDefinition::Type(ty) => &ty.span,
            TypeSystemDefinition::Directive(directive) => &directive.span,
        }
    }

    /// Returns the name used when reporting this definition: the type or
    /// directive name, or `schema` for schema definitions.
    pub fn display_name(&self) -> &str {
        match self {
            TypeSystemDefinition::Schema(_) => "schema",
            TypeSystemDefinition::Type(ty) => &ty.name.node,
            TypeSystemDefinition::Directive(directive) => &directive.name.node,
        }
    }
}

/// A schema definition naming the root operation types.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDefinition {
    /// True for `extend schema`.
    pub extend: bool,
    /// Applied directives.
    pub directives: Vec<Directive>,
    /// Root operation type bindings.
    pub root_operations: Vec<(OperationType, Spanned<SmolStr>)>,
    /// Span covering the definition.
    pub span: Span,
}

/// A named type definition.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDefinition {
    /// True for `extend type ...` and friends.
    pub extend: bool,
    /// Description string, if any.
    pub description: Option<String>,
    /// The type name.
    pub name: Spanned<SmolStr>,
    /// Applied directives.
    pub directives: Vec<Directive>,
    /// Kind-specific contents.
    pub kind: TypeDefinitionKind,
    /// Span covering the definition.
    pub span: Span,
}

/// Kind-specific contents of a type definition.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDefinitionKind {
    /// `scalar Name`.
    Scalar,
    /// `type Name implements ... { fields }`.
    Object {
        /// Implemented interfaces.
        implements: Vec<Spanned<SmolStr>>,
        /// Field definitions.
        fields: Vec<FieldDefinition>,
    },
    /// `interface Name implements ... { fields }`.
    Interface {
        /// Implemented interfaces.
        implements: Vec<Spanned<SmolStr>>,
        /// Field definitions.
        fields: Vec<FieldDefinition>,
    },
    /// `union Name = A | B`.
    Union {
        /// Member types.
        members: Vec<Spanned<SmolStr>>,
    },
    /// `enum Name { VALUES }`.
    Enum {
        /// Enum values.
        values: Vec<EnumValueDefinition>,
    },
    /// `input Name { fields }`.
    InputObject {
        /// Input field definitions.
        fields: Vec<InputValueDefinition>,
    },
}

impl TypeDefinitionKind {
    /// Returns the SDL keyword introducing this kind.
    pub fn keyword(&self) -> &'static str {
        match self {
            TypeDefinitionKind::Scalar => "scalar",
            TypeDefinitionKind::Object { .. } => "type",
            TypeDefinitionKind::Interface { .. } => "interface",
            TypeDefinitionKind::Union { .. } => "union",
            TypeDefinitionKind::Enum { .. } => "enum",
            TypeDefinitionKind::InputObject { .. } => "input",
        }
    }
}

/// An output field definition.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDefinition {
    /// Description string, if any.
    pub description: Option<String>,
    /// Field name.
    pub name: Spanned<SmolStr>,
    /// Argument definitions.
    pub arguments: Vec<InputValueDefinition>,
    /// Field type.
    pub ty: Spanned<TypeRef>,
    /// Applied directives.
    pub directives: Vec<Directive>,
    /// Span covering the definition.
    pub span: Span,
}

/// An argument or input field definition.
#[derive(Debug, Clone, PartialEq)]
pub struct InputValueDefinition {
    /// Description string, if any.
    pub description: Option<String>,
    /// Name.
    pub name: Spanned<SmolStr>,
    /// Declared type.
    pub ty: Spanned<TypeRef>,
    /// Default value literal.
    pub default_value: Option<Spanned<Value>>,
    /// Applied directives.
    pub directives: Vec<Directive>,
    /// Span covering the definition.
    pub span: Span,
}

/// An enum value definition.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumValueDefinition {
    /// Description string, if any.
    pub description: Option<String>,
    /// Value name.
    pub name: Spanned<SmolStr>,
    /// Applied directives.
    pub directives: Vec<Directive>,
    /// Span covering the definition.
    pub span: Span,
}

/// A directive definition.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectiveDefinition {
    /// Description string, if any.
    pub description: Option<String>,
    /// Directive name without `@`.
    pub name: Spanned<SmolStr>,
    /// Argument definitions.
    pub arguments: Vec<InputValueDefinition>,
    /// Whether the directive may appear more than once per location.
    pub repeatable: bool,
    /// Location names as written, e.g. `FIELD`.
    pub locations: Vec<Spanned<SmolStr>>,
    /// Span covering the definition.
    pub span: Span,
}
