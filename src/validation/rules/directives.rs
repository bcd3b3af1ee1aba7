//! Rules over directive applications.

use std::collections::HashMap;

use crate::ast::{Node, OperationType, Span};
use crate::schema::DirectiveLocation;
use crate::validation::{ValidationContext, Visitor, did_you_mean};

/// The directive location a node provides, if it takes directives.
fn location_of(node: Node<'_>) -> Option<DirectiveLocation> {
    Some(match node {
        Node::OperationDefinition(operation) => match operation.operation {
            OperationType::Query => DirectiveLocation::Query,
            OperationType::Mutation => DirectiveLocation::Mutation,
            OperationType::Subscription => DirectiveLocation::Subscription,
        },
        Node::Field(_) => DirectiveLocation::Field,
        Node::FragmentSpread(_) => DirectiveLocation::FragmentSpread,
        Node::InlineFragment(_) => DirectiveLocation::InlineFragment,
        Node::FragmentDefinition(_) => DirectiveLocation::FragmentDefinition,
        Node::VariableDefinition(_) => DirectiveLocation::VariableDefinition,
        _ => return None,
    })
}

declare_rule!(
    /// Directives are defined in the schema and applied where they are
    /// allowed.
    KnownDirectives,
    "KNOWN_DIRECTIVES",
    KnownDirectivesVisitor
);

#[derive(Default)]
struct KnownDirectivesVisitor {
    locations: Vec<DirectiveLocation>,
}

impl<'a> Visitor<'a> for KnownDirectivesVisitor {
    fn enter(&mut self, ctx: &mut ValidationContext<'a>, node: Node<'a>) {
        if let Some(location) = location_of(node) {
            self.locations.push(location);
            return;
        }
        let Node::Directive(directive) = node else {
            return;
        };

        let name = &directive.name.node;
        let schema = ctx.schema();
        let Some(definition) = schema.directive(name) else {
            let suggestions =
                ctx.suggestions(name, schema.directives().map(|known| known.name.as_str()));
            ctx.report(
                KnownDirectives::CODE,
                format!("Unknown directive '@{name}'.{}", did_you_mean(&suggestions)),
                [&directive.span],
            );
            return;
        };
        if let Some(location) = self.locations.last() {
            if !definition.locations.contains(location) {
                ctx.report(
                    KnownDirectives::CODE,
                    format!("Directive '@{name}' may not be used on {location}."),
                    [&directive.span],
                );
            }
        }
    }

    fn leave(&mut self, _ctx: &mut ValidationContext<'a>, node: Node<'a>) {
        if location_of(node).is_some() {
            self.locations.pop();
        }
    }
}

declare_rule!(
    /// A non-repeatable directive appears at most once per location.
    UniqueDirectivesPerLocation,
    "UNIQUE_DIRECTIVES_PER_LOCATION",
    UniqueDirectivesPerLocationVisitor
);

#[derive(Default)]
struct UniqueDirectivesPerLocationVisitor;

impl<'a> Visitor<'a> for UniqueDirectivesPerLocationVisitor {
    fn enter(&mut self, ctx: &mut ValidationContext<'a>, node: Node<'a>) {
        let directives = node.directives();
        if directives.len() < 2 {
            return;
        }

        let schema = ctx.schema();
        let mut seen: HashMap<&str, &Span> = HashMap::new();
        for directive in directives {
            let name = directive.name.node.as_str();
            let repeatable = match schema.directive(name) {
                Some(definition) => definition.repeatable,
                None => continue,
            };
            if repeatable {
                continue;
            }
            match seen.get(name) {
                Some(first) => ctx.report(
                    UniqueDirectivesPerLocation::CODE,
                    format!("The directive '@{name}' can only be used once at this location."),
                    [*first, &directive.span],
                ),
                None => {
                    seen.insert(name, &directive.span);
                }
            }
        }
    }
}
