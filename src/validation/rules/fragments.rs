//! Rules over fragment definitions and spreads.

use std::collections::{HashMap, HashSet};

use crate::ast::{FragmentDefinition, FragmentSpread, Node, Span};
use crate::validation::{ValidationContext, Visitor};

declare_rule!(
    /// Fragment names are unique within a document.
    UniqueFragmentNames,
    "UNIQUE_FRAGMENT_NAMES",
    UniqueFragmentNamesVisitor
);

#[derive(Default)]
struct UniqueFragmentNamesVisitor<'a> {
    known: HashMap<&'a str, &'a Span>,
}

impl<'a> Visitor<'a> for UniqueFragmentNamesVisitor<'a> {
    fn enter(&mut self, ctx: &mut ValidationContext<'a>, node: Node<'a>) {
        let Node::FragmentDefinition(fragment) = node else {
            return;
        };
        let name = &fragment.name;
        match self.known.get(name.node.as_str()) {
            Some(first) => ctx.report(
                UniqueFragmentNames::CODE,
                format!("There can be only one fragment named '{}'.", name.node),
                [*first, &name.span],
            ),
            None => {
                self.known.insert(name.node.as_str(), &name.span);
            }
        }
    }
}

declare_rule!(
    /// Spread fragments are defined in the document.
    KnownFragmentNames,
    "KNOWN_FRAGMENT_NAMES",
    KnownFragmentNamesVisitor
);

#[derive(Default)]
struct KnownFragmentNamesVisitor;

impl<'a> Visitor<'a> for KnownFragmentNamesVisitor {
    fn enter(&mut self, ctx: &mut ValidationContext<'a>, node: Node<'a>) {
        let Node::FragmentSpread(spread) = node else {
            return;
        };
        let name = &spread.fragment_name;
        if ctx.fragment(&name.node).is_none() {
            ctx.report(
                KnownFragmentNames::CODE,
                format!("Unknown fragment '{}'.", name.node),
                [&name.span],
            );
        }
    }
}

declare_rule!(
    /// Every fragment is reachable from some operation.
    NoUnusedFragments,
    "NO_UNUSED_FRAGMENTS",
    NoUnusedFragmentsVisitor
);

#[derive(Default)]
struct NoUnusedFragmentsVisitor;

impl<'a> Visitor<'a> for NoUnusedFragmentsVisitor {
    fn leave(&mut self, ctx: &mut ValidationContext<'a>, node: Node<'a>) {
        let Node::Document(document) = node else {
            return;
        };

        let mut used = HashSet::new();
        for operation in document.operations() {
            for fragment in ctx.recursively_referenced_fragments(operation).iter() {
                used.insert(fragment.name.node.as_str());
            }
        }

        for fragment in document.fragments() {
            if !used.contains(fragment.name.node.as_str()) {
                ctx.report(
                    NoUnusedFragments::CODE,
                    format!("Fragment '{}' is never used.", fragment.name.node),
                    [&fragment.span],
                );
            }
        }
    }
}

declare_rule!(
    /// A fragment is spread only where its type can apply: the possible
    /// types of the fragment and of the enclosing type intersect.
    PossibleFragmentSpreads,
    "POSSIBLE_FRAGMENT_SPREADS",
    PossibleFragmentSpreadsVisitor
);

#[derive(Default)]
struct PossibleFragmentSpreadsVisitor;

impl<'a> Visitor<'a> for PossibleFragmentSpreadsVisitor {
    fn enter(&mut self, ctx: &mut ValidationContext<'a>, node: Node<'a>) {
        let schema = ctx.schema();
        let Some(parent) = ctx.type_info().parent_type() else {
            return;
        };

        match node {
            Node::InlineFragment(fragment) => {
                let Some(condition) = &fragment.type_condition else {
                    return;
                };
                let Some(fragment_type) = schema
                    .type_by_name(&condition.node)
                    .filter(|ty| ty.is_composite())
                else {
                    return;
                };
                if !schema.do_types_overlap(fragment_type, parent) {
                    ctx.report(
                        PossibleFragmentSpreads::CODE,
                        format!(
                            "Fragment cannot be spread here as objects of type '{}' can never be of type '{}'.",
                            parent.name(),
                            fragment_type.name()
                        ),
                        [&fragment.span],
                    );
                }
            }
            Node::FragmentSpread(spread) => {
                let Some(fragment_type) = ctx
                    .fragment(&spread.fragment_name.node)
                    .and_then(|fragment| schema.type_by_name(&fragment.type_condition.node))
                    .filter(|ty| ty.is_composite())
                else {
                    return;
                };
                if !schema.do_types_overlap(fragment_type, parent) {
                    ctx.report(
                        PossibleFragmentSpreads::CODE,
                        format!(
                            "Fragment '{}' cannot be spread here as objects of type '{}' can never be of type '{}'.",
                            spread.fragment_name.node,
                            parent.name(),
                            fragment_type.name()
                        ),
                        [&spread.span],
                    );
                }
            }
            _ => {}
        }
    }
}

declare_rule!(
    /// Fragments do not spread themselves, directly or through other
    /// fragments.
    NoFragmentCycles,
    "NO_FRAGMENT_CYCLES",
    NoFragmentCyclesVisitor
);

/// Depth-first search over the spread graph.
///
/// `visited` is shared by all searches so each fragment is expanded once;
/// `path_index` maps each fragment on the current path to the position of
/// its first outgoing spread in `spread_path`.
#[derive(Default)]
struct NoFragmentCyclesVisitor<'a> {
    visited: HashSet<&'a str>,
    spread_path: Vec<&'a FragmentSpread>,
    path_index: HashMap<&'a str, usize>,
}

impl<'a> NoFragmentCyclesVisitor<'a> {
    fn detect(&mut self, ctx: &mut ValidationContext<'a>, fragment: &'a FragmentDefinition) {
        let name = fragment.name.node.as_str();
        if !self.visited.insert(name) {
            return;
        }
        let spreads = ctx.fragment_spreads(&fragment.selection_set);
        if spreads.is_empty() {
            return;
        }

        self.path_index.insert(name, self.spread_path.len());
        for spread in spreads.iter().copied() {
            let spread_name = spread.fragment_name.node.as_str();
            let cycle_start = self.path_index.get(spread_name).copied();
            self.spread_path.push(spread);

            match cycle_start {
                None => {
                    if let Some(next) = ctx.fragment(spread_name) {
                        self.detect(ctx, next);
                    }
                }
                Some(start) => {
                    let cycle = &self.spread_path[start..];
                    let via: Vec<String> = cycle[..cycle.len() - 1]
                        .iter()
                        .map(|spread| format!("'{}'", spread.fragment_name.node))
                        .collect();
                    let message = if via.is_empty() {
                        format!("Cannot spread fragment '{spread_name}' within itself.")
                    } else {
                        format!(
                            "Cannot spread fragment '{spread_name}' within itself via {}.",
                            via.join(", ")
                        )
                    };
                    ctx.report(
                        NoFragmentCycles::CODE,
                        message,
                        cycle.iter().map(|spread| &spread.span),
                    );
                }
            }

            self.spread_path.pop();
        }
        self.path_index.remove(name);
    }
}

impl<'a> Visitor<'a> for NoFragmentCyclesVisitor<'a> {
    fn enter(&mut self, ctx: &mut ValidationContext<'a>, node: Node<'a>) {
        if let Node::FragmentDefinition(fragment) = node {
            self.detect(ctx, fragment);
        }
    }
}
