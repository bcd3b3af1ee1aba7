//! Executable document AST: operations, fragments and selections.

use std::fmt;

use smol_str::SmolStr;

use super::span::{LineIndex, Pos, Span, Spanned};
use super::type_system::TypeSystemDefinition;
use super::types::TypeRef;
use super::value::Value;

/// A parsed GraphQL document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Definitions in source order.
    pub definitions: Vec<Definition>,
    /// Line index of the source the document was parsed from.
    pub line_index: LineIndex,
}

impl Document {
    /// Creates a document from definitions and the source they came from.
    pub fn new(definitions: Vec<Definition>, source: &str) -> Self {
        Self {
            definitions,
            line_index: LineIndex::new(source),
        }
    }

    /// Iterates over operation definitions in source order.
    pub fn operations(&self) -> impl Iterator<Item = &OperationDefinition> {
        self.definitions.iter().filter_map(|definition| match definition {
            Definition::Operation(operation) => Some(operation),
            _ => None,
        })
    }

    /// Iterates over fragment definitions in source order.
    pub fn fragments(&self) -> impl Iterator<Item = &FragmentDefinition> {
        self.definitions.iter().filter_map(|definition| match definition {
            Definition::Fragment(fragment) => Some(fragment),
            _ => None,
        })
    }

    /// Finds the operation selected by `name`.
    ///
    /// Without a name, the document must contain exactly one operation.
    pub fn operation(&self, name: Option<&str>) -> Option<&OperationDefinition> {
        match name {
            Some(name) => self
                .operations()
                .find(|op| op.name.as_ref().is_some_and(|n| n.node == name)),
            None => {
                let mut operations = self.operations();
                let first = operations.next()?;
                operations.next().is_none().then_some(first)
            }
        }
    }

    /// Returns the line/column position of a byte offset.
    pub fn position(&self, offset: usize) -> Pos {
        self.line_index.position(offset)
    }
}

/// A top-level definition.
#[derive(Debug, Clone, PartialEq)]
pub enum Definition {
    /// An operation (query, mutation or subscription).
    Operation(OperationDefinition),
    /// A named fragment.
    Fragment(FragmentDefinition),
    /// A type system definition or extension; not executable.
    TypeSystem(TypeSystemDefinition),
}

impl Definition {
    /// Returns the span of the definition.
    pub fn span(&self) -> &Span {
        match self {
            Definition::Operation(op) => &op.span,
            Definition::Fragment(fragment) => &fragment.span,
            Definition::TypeSystem(definition) => definition.span(),
        }
    }
}

/// The kind of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationType {
    /// `query`, also used for the shorthand `{ ... }` form.
    Query,
    /// `mutation`.
    Mutation,
    /// `subscription`.
    Subscription,
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationType::Query => write!(f, "query"),
            OperationType::Mutation => write!(f, "mutation"),
            OperationType::Subscription => write!(f, "subscription"),
        }
    }
}

/// An operation definition.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationDefinition {
    /// The operation kind.
    pub operation: OperationType,
    /// The operation name, absent for anonymous operations.
    pub name: Option<Spanned<SmolStr>>,
    /// Declared variables.
    pub variable_definitions: Vec<VariableDefinition>,
    /// Directives applied to the operation.
    pub directives: Vec<Directive>,
    /// The root selection set.
    pub selection_set: SelectionSet,
    /// Span covering the whole operation.
    pub span: Span,
}

impl OperationDefinition {
    /// Returns the operation name as a string slice, if any.
    pub fn name_str(&self) -> Option<&str> {
        self.name.as_ref().map(|name| name.node.as_str())
    }
}

/// A variable declaration, `$name: Type = default @directives`.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDefinition {
    /// Variable name without `$`; the span includes the `$`.
    pub variable: Spanned<SmolStr>,
    /// Declared type.
    pub ty: Spanned<TypeRef>,
    /// Optional default value.
    pub default_value: Option<Spanned<Value>>,
    /// Directives applied to the variable definition.
    pub directives: Vec<Directive>,
    /// Span covering the whole definition.
    pub span: Span,
}

/// A `{ ... }` selection set.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionSet {
    /// Selections in source order.
    pub selections: Vec<Selection>,
    /// Span from `{` to `}`.
    pub span: Span,
}

/// One entry of a selection set.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// A field selection.
    Field(Field),
    /// A named fragment spread, `...Name`.
    FragmentSpread(FragmentSpread),
    /// An inline fragment, `... on Type { }`.
    InlineFragment(InlineFragment),
}

impl Selection {
    /// Returns the span of the selection.
    pub fn span(&self) -> &Span {
        match self {
            Selection::Field(field) => &field.span,
            Selection::FragmentSpread(spread) => &spread.span,
            Selection::InlineFragment(fragment) => &fragment.span,
        }
    }

    /// Returns the directives applied to the selection.
    pub fn directives(&self) -> &[Directive] {
        match self {
            Selection::Field(field) => &field.directives,
            Selection::FragmentSpread(spread) => &spread.directives,
            Selection::InlineFragment(fragment) => &fragment.directives,
        }
    }
}

/// A field selection.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Optional alias.
    pub alias: Option<Spanned<SmolStr>>,
    /// Field name.
    pub name: Spanned<SmolStr>,
    /// Arguments in source order.
    pub arguments: Vec<Argument>,
    /// Applied directives.
    pub directives: Vec<Directive>,
    /// Sub-selection, if any.
    pub selection_set: Option<SelectionSet>,
    /// Span covering the whole field.
    pub span: Span,
}

impl Field {
    /// Returns the response key: the alias if present, the name otherwise.
    pub fn response_key(&self) -> &SmolStr {
        self.alias
            .as_ref()
            .map(|alias| &alias.node)
            .unwrap_or(&self.name.node)
    }

    /// Looks up an argument by name.
    pub fn argument(&self, name: &str) -> Option<&Argument> {
        self.arguments.iter().find(|arg| arg.name.node == name)
    }
}

/// An argument, `name: value`.
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    /// Argument name.
    pub name: Spanned<SmolStr>,
    /// Argument value.
    pub value: Spanned<Value>,
    /// Span covering the whole argument.
    pub span: Span,
}

/// A named fragment spread.
#[derive(Debug, Clone, PartialEq)]
pub struct FragmentSpread {
    /// Name of the spread fragment.
    pub fragment_name: Spanned<SmolStr>,
    /// Applied directives.
    pub directives: Vec<Directive>,
    /// Span starting at `...`.
    pub span: Span,
}

/// An inline fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineFragment {
    /// Optional type condition.
    pub type_condition: Option<Spanned<SmolStr>>,
    /// Applied directives.
    pub directives: Vec<Directive>,
    /// The fragment's selections.
    pub selection_set: SelectionSet,
    /// Span starting at `...`.
    pub span: Span,
}

/// A named fragment definition.
#[derive(Debug, Clone, PartialEq)]
pub struct FragmentDefinition {
    /// Fragment name.
    pub name: Spanned<SmolStr>,
    /// The type condition after `on`.
    pub type_condition: Spanned<SmolStr>,
    /// Applied directives.
    pub directives: Vec<Directive>,
    /// The fragment's selections.
    pub selection_set: SelectionSet,
    /// Span covering the whole definition.
    pub span: Span,
}

/// A directive application, `@name(args)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Directive {
    /// Directive name without `@`.
    pub name: Spanned<SmolStr>,
    /// Arguments in source order.
    pub arguments: Vec<Argument>,
    /// Span starting at `@`.
    pub span: Span,
}

impl Directive {
    /// Looks up an argument by name.
    pub fn argument(&self, name: &str) -> Option<&Argument> {
        self.arguments.iter().find(|arg| arg.name.node == name)
    }
}
