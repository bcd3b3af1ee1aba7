//! State shared by all rules during one validation run.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use serde_json::{Map, Value as JsonValue};
use smol_str::SmolStr;

use crate::ast::visit::{Visit, walk_fragment_definition, walk_operation};
use crate::ast::{
    Document, FragmentDefinition, FragmentSpread, Node, OperationDefinition, Selection,
    SelectionSet, Span, TypeRef, Value,
};
use crate::coercion::VariableValues;
use crate::schema::Schema;

use super::config::ValidationConfig;
use super::error::ValidationError;
use super::suggestion::suggestion_list;
use super::type_info::TypeInfo;

/// A variable reference and the type expected where it appears.
#[derive(Debug, Clone)]
pub struct VariableUsage<'a> {
    /// Variable name without `$`.
    pub name: &'a SmolStr,
    /// Span of the `$name` value.
    pub span: &'a Span,
    /// Expected input type at the usage, if known.
    pub ty: Option<TypeRef>,
    /// Whether the argument or input field receiving the variable declares a
    /// default value.
    pub has_default: bool,
}

/// An operation or fragment whose variable usages are collected.
#[derive(Debug, Clone, Copy)]
pub enum UsageScope<'a> {
    Operation(&'a OperationDefinition),
    Fragment(&'a FragmentDefinition),
}

impl UsageScope<'_> {
    fn key(&self) -> usize {
        match self {
            UsageScope::Operation(operation) => operation.span.start,
            UsageScope::Fragment(fragment) => fragment.span.start,
        }
    }
}

/// Context of one validation run.
///
/// Errors are append-only and kept in detection order. Fragment reachability
/// and variable usages are computed on first request and memoized for the
/// rest of the run.
pub struct ValidationContext<'a> {
    schema: &'a Schema,
    document: &'a Document,
    config: ValidationConfig,
    pub(crate) type_info: TypeInfo<'a>,
    errors: Vec<ValidationError>,
    variables: Option<&'a Map<String, JsonValue>>,
    operation_name: Option<&'a str>,
    coerced_variables: Option<VariableValues>,
    fragments: HashMap<&'a str, &'a FragmentDefinition>,
    fragment_spreads: HashMap<usize, Rc<[&'a FragmentSpread]>>,
    recursive_fragments: HashMap<usize, Rc<[&'a FragmentDefinition]>>,
    variable_usages: HashMap<usize, Rc<[VariableUsage<'a>]>>,
    recursive_variable_usages: HashMap<usize, Rc<[VariableUsage<'a>]>>,
}

impl<'a> ValidationContext<'a> {
    pub fn new(
        schema: &'a Schema,
        document: &'a Document,
        config: ValidationConfig,
        variables: Option<&'a Map<String, JsonValue>>,
        operation_name: Option<&'a str>,
    ) -> Self {
        let mut fragments = HashMap::new();
        for fragment in document.fragments() {
            fragments.entry(fragment.name.node.as_str()).or_insert(fragment);
        }

        Self {
            schema,
            document,
            config,
            type_info: TypeInfo::new(schema),
            errors: Vec::new(),
            variables,
            operation_name,
            coerced_variables: None,
            fragments,
            fragment_spreads: HashMap::new(),
            recursive_fragments: HashMap::new(),
            variable_usages: HashMap::new(),
            recursive_variable_usages: HashMap::new(),
        }
    }

    pub fn schema(&self) -> &'a Schema {
        self.schema
    }

    pub fn document(&self) -> &'a Document {
        self.document
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// The type context of the node being visited.
    pub fn type_info(&self) -> &TypeInfo<'a> {
        &self.type_info
    }

    /// Raw request variables, if the request carried any.
    pub fn variables(&self) -> Option<&'a Map<String, JsonValue>> {
        self.variables
    }

    /// The operation selected by the request, if named.
    pub fn operation_name(&self) -> Option<&'a str> {
        self.operation_name
    }

    /// Stores the coerced variables of the selected operation.
    pub fn set_coerced_variables(&mut self, values: VariableValues) {
        self.coerced_variables = Some(values);
    }

    pub fn coerced_variables(&self) -> Option<&VariableValues> {
        self.coerced_variables.as_ref()
    }

    /// Appends an error.
    pub fn report_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Appends an error located at `spans`, in order.
    pub fn report<'s>(
        &mut self,
        code: &'static str,
        message: impl Into<String>,
        spans: impl IntoIterator<Item = &'s Span>,
    ) {
        let mut error = ValidationError::new(code, message);
        for span in spans {
            error = error.with_location(span.clone(), self.document.position(span.start));
        }
        self.report_error(error);
    }

    /// Errors reported so far.
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub(crate) fn into_parts(self) -> (Vec<ValidationError>, Option<VariableValues>) {
        (self.errors, self.coerced_variables)
    }

    /// Ranks `options` by similarity to `input`, up to the configured limit.
    pub fn suggestions<'o>(&self, input: &str, options: impl IntoIterator<Item = &'o str>) -> Vec<&'o str> {
        suggestion_list(input, options, self.config.max_suggestions)
    }

    /// Looks up a fragment definition. With duplicates, the first wins.
    pub fn fragment(&self, name: &str) -> Option<&'a FragmentDefinition> {
        self.fragments.get(name).copied()
    }

    /// Fragment spreads directly inside `selection_set`, including those
    /// nested in fields and inline fragments, in document order.
    pub fn fragment_spreads(&mut self, selection_set: &'a SelectionSet) -> Rc<[&'a FragmentSpread]> {
        if let Some(spreads) = self.fragment_spreads.get(&selection_set.span.start) {
            return Rc::clone(spreads);
        }
        let mut spreads = Vec::new();
        collect_spreads(selection_set, &mut spreads);
        let spreads: Rc<[&'a FragmentSpread]> = spreads.into();
        self.fragment_spreads
            .insert(selection_set.span.start, Rc::clone(&spreads));
        spreads
    }

    /// Every fragment reachable from `operation` through spreads, each once,
    /// in discovery order. Unknown fragment names are skipped.
    pub fn recursively_referenced_fragments(
        &mut self,
        operation: &'a OperationDefinition,
    ) -> Rc<[&'a FragmentDefinition]> {
        if let Some(fragments) = self.recursive_fragments.get(&operation.span.start) {
            return Rc::clone(fragments);
        }

        let mut fragments = Vec::new();
        let mut collected = HashSet::new();
        let mut pending = vec![&operation.selection_set];
        while let Some(selection_set) = pending.pop() {
            for spread in self.fragment_spreads(selection_set).iter().copied() {
                let name = spread.fragment_name.node.as_str();
                if collected.insert(name) {
                    if let Some(fragment) = self.fragment(name) {
                        fragments.push(fragment);
                        pending.push(&fragment.selection_set);
                    }
                }
            }
        }

        let fragments: Rc<[&'a FragmentDefinition]> = fragments.into();
        self.recursive_fragments
            .insert(operation.span.start, Rc::clone(&fragments));
        fragments
    }

    /// Variable usages inside one operation or fragment, not following
    /// spreads.
    pub fn variable_usages(&mut self, scope: UsageScope<'a>) -> Rc<[VariableUsage<'a>]> {
        if let Some(usages) = self.variable_usages.get(&scope.key()) {
            return Rc::clone(usages);
        }

        let mut collector = UsageCollector {
            type_info: TypeInfo::new(self.schema),
            usages: Vec::new(),
        };
        match scope {
            UsageScope::Operation(operation) => walk_operation(&mut collector, operation),
            UsageScope::Fragment(fragment) => walk_fragment_definition(&mut collector, fragment),
        }

        let usages: Rc<[VariableUsage<'a>]> = collector.usages.into();
        self.variable_usages.insert(scope.key(), Rc::clone(&usages));
        usages
    }

    /// Variable usages of `operation`, including those in every fragment it
    /// reaches.
    pub fn recursive_variable_usages(
        &mut self,
        operation: &'a OperationDefinition,
    ) -> Rc<[VariableUsage<'a>]> {
        if let Some(usages) = self.recursive_variable_usages.get(&operation.span.start) {
            return Rc::clone(usages);
        }

        let mut usages = self.variable_usages(UsageScope::Operation(operation)).to_vec();
        for fragment in self.recursively_referenced_fragments(operation).iter().copied() {
            usages.extend(
                self.variable_usages(UsageScope::Fragment(fragment))
                    .iter()
                    .cloned(),
            );
        }

        let usages: Rc<[VariableUsage<'a>]> = usages.into();
        self.recursive_variable_usages
            .insert(operation.span.start, Rc::clone(&usages));
        usages
    }
}

fn collect_spreads<'a>(selection_set: &'a SelectionSet, spreads: &mut Vec<&'a FragmentSpread>) {
    for selection in &selection_set.selections {
        match selection {
            Selection::FragmentSpread(spread) => spreads.push(spread),
            Selection::Field(field) => {
                if let Some(selection_set) = &field.selection_set {
                    collect_spreads(selection_set, spreads);
                }
            }
            Selection::InlineFragment(fragment) => collect_spreads(&fragment.selection_set, spreads),
        }
    }
}

struct UsageCollector<'a> {
    type_info: TypeInfo<'a>,
    usages: Vec<VariableUsage<'a>>,
}

impl<'a> Visit<'a> for UsageCollector<'a> {
    fn enter(&mut self, node: Node<'a>) {
        self.type_info.enter(node);
        if let Node::Value(value) = node {
            if let Value::Variable(name) = &value.node {
                self.usages.push(VariableUsage {
                    name,
                    span: &value.span,
                    ty: self.type_info.input_type().cloned(),
                    has_default: self.type_info.has_default_value(),
                });
            }
        }
    }

    fn leave(&mut self, node: Node<'a>) {
        self.type_info.leave(node);
    }
}
