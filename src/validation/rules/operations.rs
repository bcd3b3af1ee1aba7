//! Rules over operation definitions as a whole.

use std::collections::{HashMap, HashSet};

use smol_str::SmolStr;

use crate::ast::{
    Definition, Field, Node, OperationDefinition, OperationType, Selection, SelectionSet, Span,
};
use crate::validation::{ValidationContext, Visitor};

declare_rule!(
    /// Only operations and fragments may appear in an executable document.
    ExecutableDefinitions,
    "EXECUTABLE_DEFINITIONS",
    ExecutableDefinitionsVisitor
);

#[derive(Default)]
struct ExecutableDefinitionsVisitor;

impl<'a> Visitor<'a> for ExecutableDefinitionsVisitor {
    fn enter(&mut self, ctx: &mut ValidationContext<'a>, node: Node<'a>) {
        let Node::Document(document) = node else {
            return;
        };
        for definition in &document.definitions {
            if let Definition::TypeSystem(definition) = definition {
                ctx.report(
                    ExecutableDefinitions::CODE,
                    format!(
                        "The '{}' definition is not executable.",
                        definition.display_name()
                    ),
                    [definition.span()],
                );
            }
        }
    }
}

declare_rule!(
    /// Operation names are unique within a document.
    UniqueOperationNames,
    "UNIQUE_OPERATION_NAMES",
    UniqueOperationNamesVisitor
);

#[derive(Default)]
struct UniqueOperationNamesVisitor<'a> {
    known: HashMap<&'a str, &'a Span>,
}

impl<'a> Visitor<'a> for UniqueOperationNamesVisitor<'a> {
    fn enter(&mut self, ctx: &mut ValidationContext<'a>, node: Node<'a>) {
        let Node::OperationDefinition(operation) = node else {
            return;
        };
        let Some(name) = &operation.name else {
            return;
        };
        match self.known.get(name.node.as_str()) {
            Some(first) => ctx.report(
                UniqueOperationNames::CODE,
                format!("There can be only one operation named '{}'.", name.node),
                [*first, &name.span],
            ),
            None => {
                self.known.insert(name.node.as_str(), &name.span);
            }
        }
    }
}

declare_rule!(
    /// An anonymous operation must be the only operation in its document.
    LoneAnonymousOperation,
    "LONE_ANONYMOUS_OPERATION",
    LoneAnonymousOperationVisitor
);

#[derive(Default)]
struct LoneAnonymousOperationVisitor {
    operations: usize,
}

impl<'a> Visitor<'a> for LoneAnonymousOperationVisitor {
    fn enter(&mut self, ctx: &mut ValidationContext<'a>, node: Node<'a>) {
        match node {
            Node::Document(document) => self.operations = document.operations().count(),
            Node::OperationDefinition(operation)
                if operation.name.is_none() && self.operations > 1 =>
            {
                ctx.report(
                    LoneAnonymousOperation::CODE,
                    "This anonymous operation must be the only defined operation.",
                    [&operation.span],
                );
            }
            _ => {}
        }
    }
}

declare_rule!(
    /// A subscription selects exactly one root field, and not an
    /// introspection field.
    SingleRootFieldSubscriptions,
    "SINGLE_ROOT_FIELD_SUBSCRIPTIONS",
    SingleRootFieldSubscriptionsVisitor
);

#[derive(Default)]
struct SingleRootFieldSubscriptionsVisitor;

impl<'a> Visitor<'a> for SingleRootFieldSubscriptionsVisitor {
    fn enter(&mut self, ctx: &mut ValidationContext<'a>, node: Node<'a>) {
        let Node::OperationDefinition(operation) = node else {
            return;
        };
        if operation.operation != OperationType::Subscription {
            return;
        }

        let mut grouped: Vec<(&'a SmolStr, Vec<&'a Field>)> = Vec::new();
        let mut visited = HashSet::new();
        collect_root_fields(ctx, &operation.selection_set, &mut visited, &mut grouped);

        let subject = subscription_subject(operation);
        if grouped.len() > 1 {
            let extra: Vec<&Span> = grouped[1..]
                .iter()
                .flat_map(|(_, fields)| fields.iter().map(|field| &field.span))
                .collect();
            ctx.report(
                SingleRootFieldSubscriptions::CODE,
                format!("{subject} must select only one top level field."),
                extra,
            );
        }
        for (_, fields) in &grouped {
            let field = fields[0];
            if field.name.node.starts_with("__") {
                ctx.report(
                    SingleRootFieldSubscriptions::CODE,
                    format!("{subject} must not select an introspection top level field."),
                    fields.iter().map(|field| &field.span),
                );
            }
        }
    }
}

fn subscription_subject(operation: &OperationDefinition) -> String {
    match operation.name_str() {
        Some(name) => format!("Subscription '{name}'"),
        None => "Anonymous Subscription".to_string(),
    }
}

/// Root fields by response key, following fragments.
fn collect_root_fields<'a>(
    ctx: &ValidationContext<'a>,
    selection_set: &'a SelectionSet,
    visited: &mut HashSet<&'a str>,
    grouped: &mut Vec<(&'a SmolStr, Vec<&'a Field>)>,
) {
    for selection in &selection_set.selections {
        match selection {
            Selection::Field(field) => {
                let key = field.response_key();
                match grouped.iter_mut().find(|(name, _)| *name == key) {
                    Some((_, fields)) => fields.push(field),
                    None => grouped.push((key, vec![field])),
                }
            }
            Selection::InlineFragment(fragment) => {
                collect_root_fields(ctx, &fragment.selection_set, visited, grouped);
            }
            Selection::FragmentSpread(spread) => {
                let name = spread.fragment_name.node.as_str();
                if !visited.insert(name) {
                    continue;
                }
                if let Some(fragment) = ctx.fragment(name) {
                    collect_root_fields(ctx, &fragment.selection_set, visited, grouped);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::rules::test_support::{errors, locations, messages};

    #[test]
    fn type_system_definitions_are_not_executable() {
        assert_eq!(
            messages(
                ExecutableDefinitions,
                "query Foo { dog { name } } type Cow { name: String } extend type Dog { color: String }"
            ),
            vec![
                "The 'Cow' definition is not executable.",
                "The 'Dog' definition is not executable.",
            ]
        );
        assert!(messages(ExecutableDefinitions, "{ dog { name } } fragment F on Dog { name }").is_empty());
    }

    #[test]
    fn schema_definition_is_named_schema() {
        assert_eq!(
            messages(ExecutableDefinitions, "{ dog { name } } schema { query: QueryRoot }"),
            vec!["The 'schema' definition is not executable."]
        );
    }

    #[test]
    fn duplicate_operation_names() {
        let errors = errors(
            UniqueOperationNames,
            "query Foo { dog { name } }\nquery Foo { cat { name } }",
        );
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "There can be only one operation named 'Foo'.");
        assert_eq!(locations(&errors[0]), vec![(1, 7), (2, 7)]);
    }

    #[test]
    fn operations_of_different_kinds_share_names() {
        assert_eq!(
            messages(
                UniqueOperationNames,
                "query Foo { dog { name } } mutation Foo { dog { name } }"
            )
            .len(),
            1
        );
        assert!(messages(UniqueOperationNames, "query Foo { dog { name } } query Bar { dog { name } }").is_empty());
    }

    #[test]
    fn anonymous_operation_must_be_alone() {
        assert!(messages(LoneAnonymousOperation, "{ dog { name } } fragment F on Dog { name }").is_empty());
        assert_eq!(
            messages(LoneAnonymousOperation, "{ dog { name } } { cat { name } }"),
            vec![
                "This anonymous operation must be the only defined operation.",
                "This anonymous operation must be the only defined operation.",
            ]
        );
        assert_eq!(
            messages(LoneAnonymousOperation, "{ dog { name } } query Named { cat { name } }").len(),
            1
        );
    }

    #[test]
    fn subscription_with_one_field() {
        assert!(messages(SingleRootFieldSubscriptions, "subscription S { importantEmails }").is_empty());
        assert!(
            messages(
                SingleRootFieldSubscriptions,
                "subscription S { ...F } fragment F on SubscriptionRoot { importantEmails }"
            )
            .is_empty()
        );
    }

    #[test]
    fn subscription_with_more_fields() {
        let errors = errors(
            SingleRootFieldSubscriptions,
            "subscription ImportantEmails { importantEmails notImportantEmails }",
        );
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].message,
            "Subscription 'ImportantEmails' must select only one top level field."
        );
        assert_eq!(locations(&errors[0]), vec![(1, 48)]);
    }

    #[test]
    fn anonymous_subscription_through_fragments() {
        assert_eq!(
            messages(
                SingleRootFieldSubscriptions,
                "subscription { ...A } fragment A on SubscriptionRoot { importantEmails ... { notImportantEmails } }"
            ),
            vec!["Anonymous Subscription must select only one top level field."]
        );
    }

    #[test]
    fn subscription_with_introspection_field() {
        assert_eq!(
            messages(SingleRootFieldSubscriptions, "subscription S { __typename }"),
            vec!["Subscription 'S' must not select an introspection top level field."]
        );
    }
}
