//! AST foundation types and node structures.
//!
//! Executable documents ([`Document`]) and type system definitions share the
//! same [`Directive`], [`Value`] and [`TypeRef`] nodes. Every node carries a
//! byte [`Span`]; [`LineIndex`] turns spans into the 1-based positions used in
//! validation errors.

mod document;
mod span;
mod type_system;
mod types;
mod value;
pub mod visit;

pub use document::{
    Argument, Definition, Directive, Document, Field, FragmentDefinition, FragmentSpread,
    InlineFragment, OperationDefinition, OperationType, Selection, SelectionSet,
    VariableDefinition,
};
pub use span::{LineIndex, Pos, Span, Spanned};
pub use type_system::{
    DirectiveDefinition, EnumValueDefinition, FieldDefinition, InputValueDefinition,
    SchemaDefinition, TypeDefinition, TypeDefinitionKind, TypeSystemDefinition,
};
pub use types::TypeRef;
pub use value::{ConstValue, ObjectField, Value};
pub use visit::{Node, Visit};
