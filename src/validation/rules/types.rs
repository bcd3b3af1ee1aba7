//! Rules checking that named types and fields exist and fit where they are
//! used.

use std::cmp::Reverse;
use std::collections::HashMap;

use crate::ast::{Node, Span};
use crate::schema::{MetaType, Schema};
use crate::validation::{ValidationContext, Visitor, did_you_mean, quoted_or_list};

declare_rule!(
    /// Type names in variable definitions and type conditions exist in the
    /// schema.
    KnownTypeNames,
    "KNOWN_TYPE_NAMES",
    KnownTypeNamesVisitor
);

#[derive(Default)]
struct KnownTypeNamesVisitor;

impl KnownTypeNamesVisitor {
    fn check(&self, ctx: &mut ValidationContext<'_>, name: &str, span: &Span) {
        let schema = ctx.schema();
        if schema.type_by_name(name).is_some() {
            return;
        }
        let suggestions = ctx.suggestions(name, schema.types().map(|ty| ty.name().as_str()));
        ctx.report(
            KnownTypeNames::CODE,
            format!("Unknown type '{name}'.{}", did_you_mean(&suggestions)),
            [span],
        );
    }
}

impl<'a> Visitor<'a> for KnownTypeNamesVisitor {
    fn enter(&mut self, ctx: &mut ValidationContext<'a>, node: Node<'a>) {
        match node {
            Node::VariableDefinition(definition) => {
                self.check(ctx, definition.ty.node.named_type(), &definition.ty.span);
            }
            Node::InlineFragment(fragment) => {
                if let Some(condition) = &fragment.type_condition {
                    self.check(ctx, &condition.node, &condition.span);
                }
            }
            Node::FragmentDefinition(fragment) => {
                self.check(ctx, &fragment.type_condition.node, &fragment.type_condition.span);
            }
            _ => {}
        }
    }
}

declare_rule!(
    /// Fragments condition on object, interface or union types.
    FragmentsOnCompositeTypes,
    "FRAGMENTS_ON_COMPOSITE_TYPES",
    FragmentsOnCompositeTypesVisitor
);

#[derive(Default)]
struct FragmentsOnCompositeTypesVisitor;

impl<'a> Visitor<'a> for FragmentsOnCompositeTypesVisitor {
    fn enter(&mut self, ctx: &mut ValidationContext<'a>, node: Node<'a>) {
        let (fragment_name, condition) = match node {
            Node::InlineFragment(fragment) => match &fragment.type_condition {
                Some(condition) => (None, condition),
                None => return,
            },
            Node::FragmentDefinition(fragment) => (Some(&fragment.name.node), &fragment.type_condition),
            _ => return,
        };
        let is_composite = match ctx.schema().type_by_name(&condition.node) {
            Some(ty) => ty.is_composite(),
            None => return,
        };
        if is_composite {
            return;
        }
        let message = match fragment_name {
            Some(name) => format!(
                "Fragment '{name}' cannot condition on non composite type '{}'.",
                condition.node
            ),
            None => format!(
                "Fragment cannot condition on non composite type '{}'.",
                condition.node
            ),
        };
        ctx.report(FragmentsOnCompositeTypes::CODE, message, [&condition.span]);
    }
}

declare_rule!(
    /// Variables are declared with input types.
    VariablesAreInputTypes,
    "VARIABLES_ARE_INPUT_TYPES",
    VariablesAreInputTypesVisitor
);

#[derive(Default)]
struct VariablesAreInputTypesVisitor;

impl<'a> Visitor<'a> for VariablesAreInputTypesVisitor {
    fn enter(&mut self, ctx: &mut ValidationContext<'a>, node: Node<'a>) {
        let Node::VariableDefinition(definition) = node else {
            return;
        };
        let Some(ty) = ctx.schema().named_type(&definition.ty.node) else {
            return;
        };
        if !ty.is_input() {
            ctx.report(
                VariablesAreInputTypes::CODE,
                format!(
                    "Variable '${}' cannot be non-input type '{}'.",
                    definition.variable.node, definition.ty.node
                ),
                [&definition.ty.span],
            );
        }
    }
}

declare_rule!(
    /// Leaf fields have no selection set; composite fields have one.
    ScalarLeafs,
    "SCALAR_LEAFS",
    ScalarLeafsVisitor
);

#[derive(Default)]
struct ScalarLeafsVisitor;

impl<'a> Visitor<'a> for ScalarLeafsVisitor {
    fn enter(&mut self, ctx: &mut ValidationContext<'a>, node: Node<'a>) {
        let Node::Field(field) = node else {
            return;
        };
        let Some(ty) = ctx.type_info().current_type().cloned() else {
            return;
        };
        let Some(named) = ctx.schema().named_type(&ty) else {
            return;
        };

        match &field.selection_set {
            Some(selection_set) if named.is_leaf() => ctx.report(
                ScalarLeafs::CODE,
                format!(
                    "Field '{}' must not have a selection since type '{ty}' has no subfields.",
                    field.name.node
                ),
                [&selection_set.span],
            ),
            None if !named.is_leaf() => ctx.report(
                ScalarLeafs::CODE,
                format!(
                    "Field '{name}' of type '{ty}' must have a selection of subfields. Did you mean '{name} {{ ... }}'?",
                    name = field.name.node
                ),
                [&field.span],
            ),
            _ => {}
        }
    }
}

declare_rule!(
    /// Selected fields are defined on the parent type.
    FieldsOnCorrectType,
    "FIELDS_ON_CORRECT_TYPE",
    FieldsOnCorrectTypeVisitor
);

#[derive(Default)]
struct FieldsOnCorrectTypeVisitor;

impl<'a> Visitor<'a> for FieldsOnCorrectTypeVisitor {
    fn enter(&mut self, ctx: &mut ValidationContext<'a>, node: Node<'a>) {
        let Node::Field(field) = node else {
            return;
        };
        let Some(parent) = ctx.type_info().parent_type() else {
            return;
        };
        if ctx.type_info().field_def().is_some() {
            return;
        }

        let name = field.name.node.as_str();
        let schema = ctx.schema();
        let mut types = suggested_type_names(schema, parent, name);
        types.truncate(ctx.config().max_suggestions);
        let hint = if !types.is_empty() {
            format!(
                " Did you mean to use an inline fragment on {}?",
                quoted_or_list(&types)
            )
        } else {
            let fields = parent
                .fields()
                .unwrap_or_default()
                .iter()
                .map(|field| field.name.as_str());
            did_you_mean(&ctx.suggestions(name, fields))
        };

        ctx.report(
            FieldsOnCorrectType::CODE,
            format!("Cannot query field '{name}' on type '{}'.{hint}", parent.name()),
            [&field.span],
        );
    }
}

/// Types under an abstract `parent` that define `field`, most widely shared
/// first.
///
/// Each object type counts once; an interface counts once per possible type
/// implementing it. Interfaces rank ahead of objects with the same count.
fn suggested_type_names<'s>(schema: &'s Schema, parent: &MetaType, field: &str) -> Vec<&'s str> {
    if !parent.is_abstract() {
        return Vec::new();
    }

    let mut suggested: Vec<&'s MetaType> = Vec::new();
    let mut usage: HashMap<&'s str, usize> = HashMap::new();
    for name in schema.possible_types(parent.name()) {
        let Some(possible) = schema.type_by_name(name) else {
            continue;
        };
        if possible.field(field).is_none() {
            continue;
        }
        suggested.push(possible);
        usage.insert(possible.name().as_str(), 1);

        for interface in possible.interfaces() {
            let Some(interface) = schema.type_by_name(interface) else {
                continue;
            };
            if interface.field(field).is_none() {
                continue;
            }
            let count = usage.entry(interface.name().as_str()).or_insert(0);
            if *count == 0 {
                suggested.push(interface);
            }
            *count += 1;
        }
    }

    suggested.sort_by_key(|ty| {
        (
            Reverse(usage.get(ty.name().as_str()).copied().unwrap_or(0)),
            ty.is_object(),
            ty.name().as_str(),
        )
    });
    suggested.into_iter().map(|ty| ty.name().as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::rules::test_support::{errors, locations, messages};

    #[test]
    fn known_type_names() {
        assert!(
            messages(
                KnownTypeNames,
                "query Foo($var: String, $required: [Int!]!) { dog { ... on Dog { name } ...F } } fragment F on Dog { name }"
            )
            .is_empty()
        );
    }

    #[test]
    fn unknown_type_names_with_suggestions() {
        assert_eq!(
            messages(
                KnownTypeNames,
                "query Foo($var: [JumbledUpLetters!]!) { dog { ...PetFields ... on Badger { name } } } fragment PetFields on Peat { name }"
            ),
            vec![
                "Unknown type 'JumbledUpLetters'.",
                "Unknown type 'Badger'.",
                "Unknown type 'Peat'. Did you mean 'Pet' or 'Cat'?",
            ]
        );
    }

    #[test]
    fn fragments_on_scalars() {
        let errors = errors(
            FragmentsOnCompositeTypes,
            "fragment scalarFragment on Boolean { bad } { dog { ... on FurColor { bad } } }",
        );
        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors[0].message,
            "Fragment 'scalarFragment' cannot condition on non composite type 'Boolean'."
        );
        assert_eq!(locations(&errors[0]), vec![(1, 28)]);
        assert_eq!(
            errors[1].message,
            "Fragment cannot condition on non composite type 'FurColor'."
        );
    }

    #[test]
    fn fragments_on_composites_pass() {
        assert!(
            messages(
                FragmentsOnCompositeTypes,
                "fragment a on Dog { name } fragment b on Pet { name } fragment c on CatOrDog { __typename } { dog { ... { name } } }"
            )
            .is_empty()
        );
    }

    #[test]
    fn variables_are_input_types() {
        assert!(
            messages(
                VariablesAreInputTypes,
                "query Foo($a: String, $b: [Boolean!]!, $c: ComplexInput) { dog { name } }"
            )
            .is_empty()
        );
        assert_eq!(
            messages(
                VariablesAreInputTypes,
                "query Foo($a: Dog, $b: [[CatOrDog!]]!, $c: Pet) { dog { name } }"
            ),
            vec![
                "Variable '$a' cannot be non-input type 'Dog'.",
                "Variable '$b' cannot be non-input type '[[CatOrDog!]]!'.",
                "Variable '$c' cannot be non-input type 'Pet'.",
            ]
        );
    }

    #[test]
    fn scalar_leafs() {
        assert!(messages(ScalarLeafs, "{ dog { barks name } }").is_empty());
        assert_eq!(
            messages(ScalarLeafs, "{ human { pets } }"),
            vec!["Field 'pets' of type '[Pet]' must have a selection of subfields. Did you mean 'pets { ... }'?"]
        );
        assert_eq!(
            messages(ScalarLeafs, "{ dog { barks { sinceWhen } } }"),
            vec!["Field 'barks' must not have a selection since type 'Boolean' has no subfields."]
        );
        assert_eq!(
            messages(ScalarLeafs, "{ dog { furColor: barkVolume { inHertz } } }").len(),
            1
        );
    }

    #[test]
    fn scalar_leafs_on_root() {
        assert_eq!(
            messages(ScalarLeafs, "query { dog }"),
            vec!["Field 'dog' of type 'Dog' must have a selection of subfields. Did you mean 'dog { ... }'?"]
        );
    }

    #[test]
    fn fields_on_correct_type() {
        assert!(
            messages(
                FieldsOnCorrectType,
                "{ dog { name __typename ... on Dog { barks } } catOrDog { __typename } __schema { types { name } } }"
            )
            .is_empty()
        );
    }

    #[test]
    fn unknown_field_suggests_field_names() {
        let errors = errors(FieldsOnCorrectType, "{ dog { meowVolume } }");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Cannot query field 'meowVolume' on type 'Dog'. Did you mean 'barkVolume'?");
        assert_eq!(locations(&errors[0]), vec![(1, 9)]);
    }

    #[test]
    fn unknown_field_on_abstract_type_suggests_fragments() {
        assert_eq!(
            messages(FieldsOnCorrectType, "{ pet { meows } }"),
            vec!["Cannot query field 'meows' on type 'Pet'. Did you mean to use an inline fragment on 'Cat'?"]
        );
        assert_eq!(
            messages(FieldsOnCorrectType, "{ catOrDog { name } }"),
            vec![
                "Cannot query field 'name' on type 'CatOrDog'. Did you mean to use an inline fragment on 'Being', 'Pet', 'Canine', 'Cat', or 'Dog'?"
            ]
        );
    }

    #[test]
    fn nested_unknown_fields_are_reported_once() {
        assert_eq!(
            messages(FieldsOnCorrectType, "{ dog { unknown { deeper } } }"),
            vec!["Cannot query field 'unknown' on type 'Dog'."]
        );
    }
}
