//! Immutable AST traversal.
//!
//! Every executable node kind is one variant of the closed [`Node`] union.
//! The `walk_*` functions perform a depth-first traversal, calling
//! [`Visit::enter`] before a node's children and [`Visit::leave`] after them.
//! Children are visited in GraphQL field order (for a field: arguments,
//! directives, then the selection set).

use super::document::{
    Argument, Definition, Directive, Document, Field, FragmentDefinition, FragmentSpread,
    InlineFragment, OperationDefinition, Selection, SelectionSet, VariableDefinition,
};
use super::span::{Span, Spanned};
use super::type_system::TypeSystemDefinition;
use super::value::{ObjectField, Value};

/// A reference to one AST node.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    /// The document root.
    Document(&'a Document),
    /// An operation definition.
    OperationDefinition(&'a OperationDefinition),
    /// A variable definition of an operation.
    VariableDefinition(&'a VariableDefinition),
    /// A selection set.
    SelectionSet(&'a SelectionSet),
    /// A field selection.
    Field(&'a Field),
    /// An argument of a field or directive.
    Argument(&'a Argument),
    /// A named fragment spread.
    FragmentSpread(&'a FragmentSpread),
    /// An inline fragment.
    InlineFragment(&'a InlineFragment),
    /// A fragment definition.
    FragmentDefinition(&'a FragmentDefinition),
    /// A directive application.
    Directive(&'a Directive),
    /// A value literal (argument value, default value, list item or object field value).
    Value(&'a Spanned<Value>),
    /// A field of an input object literal.
    ObjectField(&'a ObjectField),
    /// A type system definition embedded in an executable document.
    TypeSystemDefinition(&'a TypeSystemDefinition),
}

impl<'a> Node<'a> {
    /// Returns the source span of the node.
    pub fn span(&self) -> &'a Span {
        match *self {
            Node::Document(_) => &EMPTY_SPAN,
            Node::OperationDefinition(node) => &node.span,
            Node::VariableDefinition(node) => &node.span,
            Node::SelectionSet(node) => &node.span,
            Node::Field(node) => &node.span,
            Node::Argument(node) => &node.span,
            Node::FragmentSpread(node) => &node.span,
            Node::InlineFragment(node) => &node.span,
            Node::FragmentDefinition(node) => &node.span,
            Node::Directive(node) => &node.span,
            Node::Value(node) => &node.span,
            Node::ObjectField(node) => &node.span,
            Node::TypeSystemDefinition(node) => node.span(),
        }
    }

    /// Returns the directives applied to the node; empty for node kinds that
    /// take none.
    pub fn directives(&self) -> &'a [Directive] {
        match *self {
            Node::OperationDefinition(node) => &node.directives,
            Node::VariableDefinition(node) => &node.directives,
            Node::Field(node) => &node.directives,
            Node::FragmentSpread(node) => &node.directives,
            Node::InlineFragment(node) => &node.directives,
            Node::FragmentDefinition(node) => &node.directives,
            _ => &[],
        }
    }
}

static EMPTY_SPAN: Span = 0..0;

/// Callbacks invoked while walking the AST.
pub trait Visit<'a> {
    /// Called before the node's children are walked.
    fn enter(&mut self, _node: Node<'a>) {}

    /// Called after the node's children are walked.
    fn leave(&mut self, _node: Node<'a>) {}
}

/// Walks a whole document.
pub fn walk_document<'a, V: Visit<'a> + ?Sized>(visitor: &mut V, document: &'a Document) {
    visitor.enter(Node::Document(document));
    for definition in &document.definitions {
        walk_definition(visitor, definition);
    }
    visitor.leave(Node::Document(document));
}

/// Walks a top-level definition.
pub fn walk_definition<'a, V: Visit<'a> + ?Sized>(visitor: &mut V, definition: &'a Definition) {
    match definition {
        Definition::Operation(operation) => walk_operation(visitor, operation),
        Definition::Fragment(fragment) => walk_fragment_definition(visitor, fragment),
        Definition::TypeSystem(definition) => {
            visitor.enter(Node::TypeSystemDefinition(definition));
            visitor.leave(Node::TypeSystemDefinition(definition));
        }
    }
}

/// Walks an operation definition.
pub fn walk_operation<'a, V: Visit<'a> + ?Sized>(
    visitor: &mut V,
    operation: &'a OperationDefinition,
) {
    visitor.enter(Node::OperationDefinition(operation));
    for definition in &operation.variable_definitions {
        walk_variable_definition(visitor, definition);
    }
    walk_directives(visitor, &operation.directives);
    walk_selection_set(visitor, &operation.selection_set);
    visitor.leave(Node::OperationDefinition(operation));
}

/// Walks a variable definition, including its default value.
pub fn walk_variable_definition<'a, V: Visit<'a> + ?Sized>(
    visitor: &mut V,
    definition: &'a VariableDefinition,
) {
    visitor.enter(Node::VariableDefinition(definition));
    if let Some(default_value) = &definition.default_value {
        walk_value(visitor, default_value);
    }
    walk_directives(visitor, &definition.directives);
    visitor.leave(Node::VariableDefinition(definition));
}

/// Walks a fragment definition.
pub fn walk_fragment_definition<'a, V: Visit<'a> + ?Sized>(
    visitor: &mut V,
    fragment: &'a FragmentDefinition,
) {
    visitor.enter(Node::FragmentDefinition(fragment));
    walk_directives(visitor, &fragment.directives);
    walk_selection_set(visitor, &fragment.selection_set);
    visitor.leave(Node::FragmentDefinition(fragment));
}

/// Walks a selection set and every selection in it.
pub fn walk_selection_set<'a, V: Visit<'a> + ?Sized>(
    visitor: &mut V,
    selection_set: &'a SelectionSet,
) {
    visitor.enter(Node::SelectionSet(selection_set));
    for selection in &selection_set.selections {
        match selection {
            Selection::Field(field) => walk_field(visitor, field),
            Selection::FragmentSpread(spread) => walk_fragment_spread(visitor, spread),
            Selection::InlineFragment(fragment) => walk_inline_fragment(visitor, fragment),
        }
    }
    visitor.leave(Node::SelectionSet(selection_set));
}

/// Walks a field selection.
pub fn walk_field<'a, V: Visit<'a> + ?Sized>(visitor: &mut V, field: &'a Field) {
    visitor.enter(Node::Field(field));
    walk_arguments(visitor, &field.arguments);
    walk_directives(visitor, &field.directives);
    if let Some(selection_set) = &field.selection_set {
        walk_selection_set(visitor, selection_set);
    }
    visitor.leave(Node::Field(field));
}

/// Walks a fragment spread. The spread fragment itself is not entered.
pub fn walk_fragment_spread<'a, V: Visit<'a> + ?Sized>(
    visitor: &mut V,
    spread: &'a FragmentSpread,
) {
    visitor.enter(Node::FragmentSpread(spread));
    walk_directives(visitor, &spread.directives);
    visitor.leave(Node::FragmentSpread(spread));
}

/// Walks an inline fragment.
pub fn walk_inline_fragment<'a, V: Visit<'a> + ?Sized>(
    visitor: &mut V,
    fragment: &'a InlineFragment,
) {
    visitor.enter(Node::InlineFragment(fragment));
    walk_directives(visitor, &fragment.directives);
    walk_selection_set(visitor, &fragment.selection_set);
    visitor.leave(Node::InlineFragment(fragment));
}

/// Walks a list of directives.
pub fn walk_directives<'a, V: Visit<'a> + ?Sized>(visitor: &mut V, directives: &'a [Directive]) {
    for directive in directives {
        walk_directive(visitor, directive);
    }
}

/// Walks a directive and its arguments.
pub fn walk_directive<'a, V: Visit<'a> + ?Sized>(visitor: &mut V, directive: &'a Directive) {
    visitor.enter(Node::Directive(directive));
    walk_arguments(visitor, &directive.arguments);
    visitor.leave(Node::Directive(directive));
}

fn walk_arguments<'a, V: Visit<'a> + ?Sized>(visitor: &mut V, arguments: &'a [Argument]) {
    for argument in arguments {
        visitor.enter(Node::Argument(argument));
        walk_value(visitor, &argument.value);
        visitor.leave(Node::Argument(argument));
    }
}

/// Walks a value and, for lists and objects, its nested values.
pub fn walk_value<'a, V: Visit<'a> + ?Sized>(visitor: &mut V, value: &'a Spanned<Value>) {
    visitor.enter(Node::Value(value));
    match &value.node {
        Value::List(items) => {
            for item in items {
                walk_value(visitor, item);
            }
        }
        Value::Object(fields) => {
            for field in fields {
                visitor.enter(Node::ObjectField(field));
                walk_value(visitor, &field.value);
                visitor.leave(Node::ObjectField(field));
            }
        }
        _ => {}
    }
    visitor.leave(Node::Value(value));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
        depth: usize,
        max_depth: usize,
    }

    impl<'a> Visit<'a> for Recorder {
        fn enter(&mut self, node: Node<'a>) {
            self.depth += 1;
            self.max_depth = self.max_depth.max(self.depth);
            let label = match node {
                Node::Field(field) => format!("field:{}", field.name.node),
                Node::Argument(arg) => format!("arg:{}", arg.name.node),
                Node::Value(value) => format!("value:{}", value.node),
                Node::Directive(directive) => format!("directive:{}", directive.name.node),
                _ => return,
            };
            self.events.push(label);
        }

        fn leave(&mut self, _node: Node<'a>) {
            self.depth -= 1;
        }
    }

    #[test]
    fn walks_in_field_order() {
        let document = parse("{ dog(a: [1, 2]) @skip(if: true) { name } }")
            .ast
            .expect("expected AST");

        let mut recorder = Recorder::default();
        walk_document(&mut recorder, &document);

        assert_eq!(
            recorder.events,
            vec![
                "field:dog",
                "arg:a",
                "value:[1, 2]",
                "value:1",
                "value:2",
                "directive:skip",
                "arg:if",
                "value:true",
                "field:name",
            ]
        );
        assert_eq!(recorder.depth, 0, "enter and leave must balance");
        assert!(recorder.max_depth >= 6);
    }
}
