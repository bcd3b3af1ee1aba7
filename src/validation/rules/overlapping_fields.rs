//! Fields sharing a response key must be mergeable.
//!
//! Two selections with the same response key are compared pairwise. Unless
//! their parents are distinct object types (and so never both apply), they
//! must name the same field with the same arguments. In every case their
//! return types must have the same shape, and their sub-selections must in
//! turn be mergeable.
//!
//! Field maps are cached per selection set and compared fragment pairs are
//! memoized, which keeps the comparison from going quadratic on documents
//! that spread the same fragments many times.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::ast::{Argument, Field, Node, Selection, SelectionSet, TypeRef};
use crate::schema::{FieldDef, MetaType, Schema};
use crate::validation::{ValidationContext, Visitor};

declare_rule!(
    /// Selections with the same response key can be merged into one field.
    OverlappingFieldsCanBeMerged,
    "OVERLAPPING_FIELDS_CAN_BE_MERGED",
    OverlappingFieldsVisitor
);

/// One selection of a field, with the type it was selected on.
#[derive(Clone, Copy)]
struct FieldEntry<'a> {
    parent: Option<&'a MetaType>,
    node: &'a Field,
    definition: Option<&'a FieldDef>,
}

/// Selections grouped by response key, in first-seen order.
#[derive(Default)]
struct FieldMap<'a>(Vec<(&'a str, Vec<FieldEntry<'a>>)>);

impl<'a> FieldMap<'a> {
    fn push(&mut self, key: &'a str, entry: FieldEntry<'a>) {
        match self.0.iter_mut().find(|(known, _)| *known == key) {
            Some((_, entries)) => entries.push(entry),
            None => self.0.push((key, vec![entry])),
        }
    }

    fn get(&self, key: &str) -> Option<&[FieldEntry<'a>]> {
        self.0
            .iter()
            .find(|(known, _)| *known == key)
            .map(|(_, entries)| entries.as_slice())
    }
}

#[derive(Clone)]
struct FieldsAndFragments<'a> {
    fields: Rc<FieldMap<'a>>,
    fragment_names: Rc<[&'a str]>,
}

/// Unordered pairs of fragment names already compared, remembering whether
/// the comparison assumed mutually exclusive parents.
#[derive(Default)]
struct PairSet<'a>(HashMap<(&'a str, &'a str), bool>);

impl<'a> PairSet<'a> {
    fn key(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
        if a < b { (a, b) } else { (b, a) }
    }

    fn contains(&self, a: &'a str, b: &'a str, mutually_exclusive: bool) -> bool {
        match self.0.get(&Self::key(a, b)) {
            None => false,
            // An exclusive comparison is implied by a non-exclusive one, not
            // the other way around.
            Some(recorded) => mutually_exclusive || !recorded,
        }
    }

    fn insert(&mut self, a: &'a str, b: &'a str, mutually_exclusive: bool) {
        self.0.insert(Self::key(a, b), mutually_exclusive);
    }
}

/// Why two fields conflict.
enum Reason<'a> {
    Message(String),
    Subfields(Vec<(&'a str, Reason<'a>)>),
}

impl fmt::Display for Reason<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reason::Message(message) => f.write_str(message),
            Reason::Subfields(nested) => {
                for (index, (key, reason)) in nested.iter().enumerate() {
                    if index > 0 {
                        f.write_str(" and ")?;
                    }
                    write!(f, "subfields '{key}' conflict because {reason}")?;
                }
                Ok(())
            }
        }
    }
}

struct Conflict<'a> {
    key: &'a str,
    reason: Reason<'a>,
    left: Vec<&'a Field>,
    right: Vec<&'a Field>,
}

#[derive(Default)]
struct OverlappingFieldsVisitor<'a> {
    cache: HashMap<usize, FieldsAndFragments<'a>>,
    compared_fragments: PairSet<'a>,
}

impl<'a> Visitor<'a> for OverlappingFieldsVisitor<'a> {
    fn enter(&mut self, ctx: &mut ValidationContext<'a>, node: Node<'a>) {
        let Node::SelectionSet(selection_set) = node else {
            return;
        };
        let parent = ctx.type_info().parent_type();
        let conflicts = self.find_within(ctx, parent, selection_set);

        for conflict in conflicts {
            let spans = conflict
                .left
                .iter()
                .chain(&conflict.right)
                .map(|field| &field.span);
            ctx.report(
                OverlappingFieldsCanBeMerged::CODE,
                format!(
                    "Fields '{}' conflict because {}. Use different aliases on the fields to fetch both if this was intentional.",
                    conflict.key, conflict.reason
                ),
                spans,
            );
        }
    }
}

impl<'a> OverlappingFieldsVisitor<'a> {
    fn find_within(
        &mut self,
        ctx: &ValidationContext<'a>,
        parent: Option<&'a MetaType>,
        selection_set: &'a SelectionSet,
    ) -> Vec<Conflict<'a>> {
        let mut conflicts = Vec::new();
        let collected = self.fields_and_fragments(ctx, parent, selection_set);

        self.collect_within(ctx, &mut conflicts, &collected.fields);
        let names = &collected.fragment_names;
        for (index, name) in names.iter().enumerate() {
            self.collect_between_fields_and_fragment(
                ctx,
                &mut conflicts,
                false,
                &collected.fields,
                name,
            );
            for other in &names[index + 1..] {
                self.collect_between_fragments(ctx, &mut conflicts, false, name, other);
            }
        }
        conflicts
    }

    fn collect_within(
        &mut self,
        ctx: &ValidationContext<'a>,
        conflicts: &mut Vec<Conflict<'a>>,
        fields: &FieldMap<'a>,
    ) {
        for (key, entries) in &fields.0 {
            if has_conflict(conflicts, key) {
                continue;
            }
            'pairs: for (index, first) in entries.iter().enumerate() {
                for second in &entries[index + 1..] {
                    if let Some(conflict) = self.find_conflict(ctx, false, key, *first, *second) {
                        conflicts.push(conflict);
                        break 'pairs;
                    }
                }
            }
        }
    }

    fn collect_between(
        &mut self,
        ctx: &ValidationContext<'a>,
        conflicts: &mut Vec<Conflict<'a>>,
        mutually_exclusive: bool,
        left: &FieldMap<'a>,
        right: &FieldMap<'a>,
    ) {
        for (key, left_entries) in &left.0 {
            let Some(right_entries) = right.get(key) else {
                continue;
            };
            if has_conflict(conflicts, key) {
                continue;
            }
            'pairs: for first in left_entries {
                for second in right_entries {
                    if let Some(conflict) =
                        self.find_conflict(ctx, mutually_exclusive, key, *first, *second)
                    {
                        conflicts.push(conflict);
                        break 'pairs;
                    }
                }
            }
        }
    }

    fn collect_between_fields_and_fragment(
        &mut self,
        ctx: &ValidationContext<'a>,
        conflicts: &mut Vec<Conflict<'a>>,
        mutually_exclusive: bool,
        fields: &Rc<FieldMap<'a>>,
        fragment_name: &'a str,
    ) {
        let Some(fragment) = self.fragment_fields(ctx, fragment_name) else {
            return;
        };
        if Rc::ptr_eq(fields, &fragment.fields) {
            return;
        }

        self.collect_between(ctx, conflicts, mutually_exclusive, fields, &fragment.fields);
        for referenced in fragment.fragment_names.iter() {
            if self
                .compared_fragments
                .contains(referenced, fragment_name, mutually_exclusive)
            {
                continue;
            }
            self.compared_fragments
                .insert(referenced, fragment_name, mutually_exclusive);
            self.collect_between_fields_and_fragment(
                ctx,
                conflicts,
                mutually_exclusive,
                fields,
                referenced,
            );
        }
    }

    fn collect_between_fragments(
        &mut self,
        ctx: &ValidationContext<'a>,
        conflicts: &mut Vec<Conflict<'a>>,
        mutually_exclusive: bool,
        first_name: &'a str,
        second_name: &'a str,
    ) {
        if first_name == second_name
            || self
                .compared_fragments
                .contains(first_name, second_name, mutually_exclusive)
        {
            return;
        }
        self.compared_fragments
            .insert(first_name, second_name, mutually_exclusive);

        let (Some(first), Some(second)) = (
            self.fragment_fields(ctx, first_name),
            self.fragment_fields(ctx, second_name),
        ) else {
            return;
        };

        self.collect_between(ctx, conflicts, mutually_exclusive, &first.fields, &second.fields);
        for referenced in second.fragment_names.iter() {
            self.collect_between_fragments(ctx, conflicts, mutually_exclusive, first_name, referenced);
        }
        for referenced in first.fragment_names.iter() {
            self.collect_between_fragments(ctx, conflicts, mutually_exclusive, referenced, second_name);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn find_between_sub_selections(
        &mut self,
        ctx: &ValidationContext<'a>,
        mutually_exclusive: bool,
        first_parent: Option<&'a MetaType>,
        first_set: &'a SelectionSet,
        second_parent: Option<&'a MetaType>,
        second_set: &'a SelectionSet,
    ) -> Vec<Conflict<'a>> {
        let mut conflicts = Vec::new();
        let first = self.fields_and_fragments(ctx, first_parent, first_set);
        let second = self.fields_and_fragments(ctx, second_parent, second_set);

        self.collect_between(ctx, &mut conflicts, mutually_exclusive, &first.fields, &second.fields);
        for name in second.fragment_names.iter() {
            self.collect_between_fields_and_fragment(
                ctx,
                &mut conflicts,
                mutually_exclusive,
                &first.fields,
                name,
            );
        }
        for name in first.fragment_names.iter() {
            self.collect_between_fields_and_fragment(
                ctx,
                &mut conflicts,
                mutually_exclusive,
                &second.fields,
                name,
            );
        }
        for first_name in first.fragment_names.iter() {
            for second_name in second.fragment_names.iter() {
                self.collect_between_fragments(
                    ctx,
                    &mut conflicts,
                    mutually_exclusive,
                    first_name,
                    second_name,
                );
            }
        }
        conflicts
    }

    fn find_conflict(
        &mut self,
        ctx: &ValidationContext<'a>,
        parents_mutually_exclusive: bool,
        key: &'a str,
        first: FieldEntry<'a>,
        second: FieldEntry<'a>,
    ) -> Option<Conflict<'a>> {
        let schema = ctx.schema();
        let mutually_exclusive = parents_mutually_exclusive
            || match (first.parent, second.parent) {
                (Some(a), Some(b)) => a.name() != b.name() && a.is_object() && b.is_object(),
                _ => false,
            };
        let conflict = |reason: String| Conflict {
            key,
            reason: Reason::Message(reason),
            left: vec![first.node],
            right: vec![second.node],
        };

        if !mutually_exclusive {
            let (first_name, second_name) = (&first.node.name.node, &second.node.name.node);
            if first_name != second_name {
                return Some(conflict(format!(
                    "'{first_name}' and '{second_name}' are different fields"
                )));
            }
            if !same_arguments(&first.node.arguments, &second.node.arguments) {
                return Some(conflict("they have differing arguments".to_owned()));
            }
        }

        let first_type = first.definition.map(|def| &def.ty);
        let second_type = second.definition.map(|def| &def.ty);
        if let (Some(a), Some(b)) = (first_type, second_type) {
            if types_conflict(schema, a, b) {
                return Some(conflict(format!(
                    "they return conflicting types '{a}' and '{b}'"
                )));
            }
        }

        let (Some(first_set), Some(second_set)) =
            (&first.node.selection_set, &second.node.selection_set)
        else {
            return None;
        };
        let nested = self.find_between_sub_selections(
            ctx,
            mutually_exclusive,
            first_type.and_then(|ty| schema.named_type(ty)),
            first_set,
            second_type.and_then(|ty| schema.named_type(ty)),
            second_set,
        );
        if nested.is_empty() {
            return None;
        }

        let mut left = vec![first.node];
        let mut right = vec![second.node];
        let mut reasons = Vec::with_capacity(nested.len());
        for sub in nested {
            left.extend(sub.left);
            right.extend(sub.right);
            reasons.push((sub.key, sub.reason));
        }
        Some(Conflict {
            key,
            reason: Reason::Subfields(reasons),
            left,
            right,
        })
    }

    fn fields_and_fragments(
        &mut self,
        ctx: &ValidationContext<'a>,
        parent: Option<&'a MetaType>,
        selection_set: &'a SelectionSet,
    ) -> FieldsAndFragments<'a> {
        if let Some(cached) = self.cache.get(&selection_set.span.start) {
            return cached.clone();
        }

        let mut fields = FieldMap::default();
        let mut fragment_names = Vec::new();
        collect_fields(ctx.schema(), parent, selection_set, &mut fields, &mut fragment_names);
        let collected = FieldsAndFragments {
            fields: Rc::new(fields),
            fragment_names: fragment_names.into(),
        };
        self.cache
            .insert(selection_set.span.start, collected.clone());
        collected
    }

    fn fragment_fields(
        &mut self,
        ctx: &ValidationContext<'a>,
        name: &str,
    ) -> Option<FieldsAndFragments<'a>> {
        let fragment = ctx.fragment(name)?;
        let parent = ctx.schema().type_by_name(&fragment.type_condition.node);
        Some(self.fields_and_fragments(ctx, parent, &fragment.selection_set))
    }
}

/// Only the first conflict found for a response key is reported.
fn has_conflict(conflicts: &[Conflict<'_>], key: &str) -> bool {
    conflicts.iter().any(|conflict| conflict.key == key)
}

fn collect_fields<'a>(
    schema: &'a Schema,
    parent: Option<&'a MetaType>,
    selection_set: &'a SelectionSet,
    fields: &mut FieldMap<'a>,
    fragment_names: &mut Vec<&'a str>,
) {
    for selection in &selection_set.selections {
        match selection {
            Selection::Field(field) => {
                let definition = parent.and_then(|parent| parent.field(&field.name.node));
                fields.push(
                    field.response_key(),
                    FieldEntry {
                        parent,
                        node: field,
                        definition,
                    },
                );
            }
            Selection::FragmentSpread(spread) => {
                let name = spread.fragment_name.node.as_str();
                if !fragment_names.contains(&name) {
                    fragment_names.push(name);
                }
            }
            Selection::InlineFragment(fragment) => {
                let parent = match &fragment.type_condition {
                    Some(condition) => schema.type_by_name(&condition.node),
                    None => parent,
                };
                collect_fields(schema, parent, &fragment.selection_set, fields, fragment_names);
            }
        }
    }
}

/// Arguments match by name with identical printed values, in any order.
fn same_arguments(first: &[Argument], second: &[Argument]) -> bool {
    first.len() == second.len()
        && first.iter().all(|a| {
            second
                .iter()
                .find(|b| b.name.node == a.name.node)
                .is_some_and(|b| a.value.node.to_string() == b.value.node.to_string())
        })
}

/// True when two return types cannot be merged into one response shape.
fn types_conflict(schema: &Schema, first: &TypeRef, second: &TypeRef) -> bool {
    match (first, second) {
        (TypeRef::List(a), TypeRef::List(b)) => types_conflict(schema, a, b),
        (TypeRef::List(_), _) | (_, TypeRef::List(_)) => true,
        (TypeRef::NonNull(a), TypeRef::NonNull(b)) => types_conflict(schema, a, b),
        (TypeRef::NonNull(_), _) | (_, TypeRef::NonNull(_)) => true,
        (TypeRef::Named(a), TypeRef::Named(b)) => {
            let is_leaf = |name: &str| schema.type_by_name(name).is_some_and(MetaType::is_leaf);
            (is_leaf(a) || is_leaf(b)) && a != b
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::rules::test_support::{errors, locations, messages};

    fn assert_valid(source: &str) {
        let found = messages(OverlappingFieldsCanBeMerged, source);
        assert!(found.is_empty(), "unexpected conflicts: {found:?}");
    }

    #[test]
    fn identical_fields_merge() {
        assert_valid("fragment f on Dog { name name nickname: nickname doesKnowCommand(dogCommand: SIT) doesKnowCommand(dogCommand: SIT) }");
    }

    #[test]
    fn alias_over_different_fields() {
        let errors = errors(
            OverlappingFieldsCanBeMerged,
            "{ dog { fido: name fido: nickname } }",
        );
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].message,
            "Fields 'fido' conflict because 'name' and 'nickname' are different fields. Use different aliases on the fields to fetch both if this was intentional."
        );
        assert_eq!(locations(&errors[0]), vec![(1, 9), (1, 20)]);
        assert_eq!(errors[0].code, "OVERLAPPING_FIELDS_CAN_BE_MERGED");
    }

    #[test]
    fn differing_arguments() {
        assert_eq!(
            messages(
                OverlappingFieldsCanBeMerged,
                "{ dog { doesKnowCommand(dogCommand: SIT) doesKnowCommand(dogCommand: HEEL) } }"
            ),
            vec!["Fields 'doesKnowCommand' conflict because they have differing arguments. Use different aliases on the fields to fetch both if this was intentional."]
        );
        assert_eq!(
            messages(
                OverlappingFieldsCanBeMerged,
                "{ dog { doesKnowCommand doesKnowCommand(dogCommand: HEEL) } }"
            )
            .len(),
            1
        );
    }

    #[test]
    fn argument_order_does_not_matter() {
        assert_valid("{ dog { isAtLocation(x: 1, y: 2) isAtLocation(y: 2, x: 1) } }");
    }

    #[test]
    fn conflicts_through_fragments() {
        let errors = errors(
            OverlappingFieldsCanBeMerged,
            "{ dog { ...A ...B } } fragment A on Dog { x: name } fragment B on Dog { x: barks }",
        );
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.starts_with(
            "Fields 'x' conflict because 'name' and 'barks' are different fields."
        ));
    }

    #[test]
    fn different_object_parents_may_use_different_fields() {
        assert_valid(
            "{ pet { ... on Dog { name: nickname } ... on Cat { name } } }",
        );
    }

    #[test]
    fn conflicting_return_types_on_exclusive_parents() {
        assert_eq!(
            messages(
                OverlappingFieldsCanBeMerged,
                "{ catOrDog { ... on Dog { volume: barkVolume } ... on Cat { volume: meows } } }"
            ),
            vec!["Fields 'volume' conflict because they return conflicting types 'Int' and 'Boolean'. Use different aliases on the fields to fetch both if this was intentional."]
        );
    }

    #[test]
    fn nested_subfield_conflicts() {
        let errors = errors(
            OverlappingFieldsCanBeMerged,
            "{ dog { name } dog { name: nickname } human { pets { name } } human { pets { name: barks } } }",
        );
        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors[0].message,
            "Fields 'dog' conflict because subfields 'name' conflict because 'name' and 'nickname' are different fields. Use different aliases on the fields to fetch both if this was intentional."
        );
        assert_eq!(errors[0].spans.len(), 4);
    }

    #[test]
    fn one_conflict_per_response_key() {
        let errors = errors(
            OverlappingFieldsCanBeMerged,
            "{ dog { x: name x: nickname x: barkVolume } }",
        );
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.starts_with(
            "Fields 'x' conflict because 'name' and 'nickname' are different fields."
        ));
        assert_eq!(locations(&errors[0]), vec![(1, 9), (1, 17)]);
    }

    #[test]
    fn one_conflict_per_key_across_fragments() {
        let errors = errors(
            OverlappingFieldsCanBeMerged,
            "{ dog { x: name ...A ...B } } fragment A on Dog { x: nickname } fragment B on Dog { x: barkVolume }",
        );
        assert_eq!(errors.len(), 1);
        assert_eq!(locations(&errors[0]), vec![(1, 9), (1, 51)]);
    }

    #[test]
    fn recursive_fragments_terminate() {
        assert_valid(
            "{ dog { ...A } } fragment A on Dog { name ...B } fragment B on Dog { name ...A }",
        );
    }
}
