//! Input value coercion.
//!
//! One recursive algorithm converts input values to schema types, with two
//! entry points: literals written in a document ([`coerce_literal`],
//! [`check_literal`]) and raw request input ([`coerce_input_value`]). Both
//! follow the same rules:
//!
//! - `T!` rejects `null`, then coerces to `T`.
//! - `[T]` coerces element-wise; a single non-list value becomes a
//!   one-element list.
//! - Input objects must be maps without unknown keys. Omitted fields take
//!   their defaults; omitted required fields are errors. A `@oneOf` object
//!   must end up with exactly one field, and it must not be `null`.
//! - Enums accept their value names.
//! - Scalars delegate to the scalar's parse function.
//!
//! [`coerce_variable_values`] and [`coerce_argument_values`] build on these
//! and tag every value with its [`Provenance`].

mod error;
mod input;
mod literal;
mod request;
mod values;

pub use error::{
    CoercionError, CoercionErrorKind, CoercionResult, InputPath, OneOfOrigin, PathSegment,
    VariableError,
};
pub use input::coerce_input_value;
pub use literal::{check_literal, coerce_literal};
pub use request::{coerce_argument_values, coerce_variable_values};
pub use values::{CoercedArgument, CoercedArguments, Provenance, VariableValue, VariableValues};

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::ast::{ConstValue, Definition, OperationDefinition, TypeRef, Value};
    use crate::schema::Schema;

    const SDL: &str = r#"
        enum Color { RED GREEN BLUE }
        input Point { x: Int! y: Int! = 0 label: String }
        input Pick @oneOf { id: ID name: String }
        type Query {
            point(at: Point!): Int
            color(c: Color = RED): Color
            pick(by: Pick): Int
            names(list: [String!]): Int
        }
    "#;

    fn schema() -> Schema {
        Schema::parse(SDL).expect("schema builds")
    }

    fn literal(source: &str) -> Value {
        let query = format!("{{ f(v: {source}) }}");
        let result = crate::parse(&query);
        let document = result.ast.expect("parses");
        let Some(Definition::Operation(operation)) = document.definitions.into_iter().next() else {
            panic!("expected an operation");
        };
        let Some(crate::ast::Selection::Field(field)) =
            operation.selection_set.selections.into_iter().next()
        else {
            panic!("expected a field");
        };
        field.arguments.into_iter().next().expect("argument").value.node
    }

    fn operation(source: &str) -> OperationDefinition {
        let document = crate::parse(source).ast.expect("parses");
        document.operations().next().expect("operation").clone()
    }

    fn named(name: &str) -> TypeRef {
        TypeRef::named(name)
    }

    #[test]
    fn int_literal_for_string_cites_type_and_value() {
        let schema = schema();
        let error = coerce_literal(&schema, &literal("3"), &named("String"), &VariableValues::new())
            .expect_err("3 is not a String");
        let message = error.to_string();
        assert!(message.contains("'String'"), "{message}");
        assert!(message.contains("'3'"), "{message}");
    }

    #[test]
    fn input_object_defaults_and_required_fields() {
        let schema = schema();
        let value = coerce_literal(&schema, &literal("{x: 1}"), &named("Point"), &VariableValues::new())
            .expect("valid point");
        let ConstValue::Object(fields) = value else {
            panic!("expected an object");
        };
        assert_eq!(fields.get("y"), Some(&ConstValue::Int(0)));
        assert!(!fields.contains_key("label"));

        let missing = coerce_literal(&schema, &literal("{y: 1}"), &named("Point"), &VariableValues::new())
            .expect_err("x is required");
        assert_eq!(
            missing.to_string(),
            "Field 'Point.x' of required type 'Int!' was not provided."
        );

        let unknown = check_literal(&schema, &literal("{x: 1, z: 2}"), &named("Point"))
            .expect_err("z is unknown");
        assert!(matches!(unknown.kind, CoercionErrorKind::UnknownField { ref field, .. } if field == "z"));
    }

    #[test]
    fn lists_wrap_single_values_and_report_indexes() {
        let schema = schema();
        let list = named("String").non_null().list();
        assert_eq!(
            coerce_literal(&schema, &literal("\"a\""), &list, &VariableValues::new()),
            Ok(ConstValue::List(vec![ConstValue::String("a".into())]))
        );
        let error = coerce_literal(&schema, &literal("[\"a\", null]"), &list, &VariableValues::new())
            .expect_err("null item");
        assert_eq!(error.path.0, vec![PathSegment::Index(1)]);
    }

    #[test]
    fn enum_literals() {
        let schema = schema();
        assert_eq!(
            check_literal(&schema, &literal("RED"), &named("Color")),
            Ok(())
        );
        assert!(matches!(
            check_literal(&schema, &literal("PURPLE"), &named("Color")).map_err(|e| e.kind),
            Err(CoercionErrorKind::UnknownEnumValue { .. })
        ));
        assert!(matches!(
            check_literal(&schema, &literal("\"RED\""), &named("Color")).map_err(|e| e.kind),
            Err(CoercionErrorKind::NotAnEnumValue { .. })
        ));
    }

    #[test]
    fn one_of_requires_exactly_one_non_null_field() {
        let schema = schema();
        let pick = named("Pick");
        assert!(check_literal(&schema, &literal("{id: 1}"), &pick).is_ok());
        assert!(check_literal(&schema, &literal("{id: $id}"), &pick).is_ok());
        for source in ["{id: 1, name: \"x\"}", "{}", "{id: null}"] {
            let error = check_literal(&schema, &literal(source), &pick).expect_err(source);
            assert!(error.to_string().contains("exactly one non-null value"), "{source}");
            assert!(error.to_string().starts_with("Argument value"), "{source}");
        }

        let error = coerce_input_value(&schema, &json!({"id": "1", "name": "x"}), &pick)
            .expect_err("two fields");
        assert!(error.to_string().starts_with("Variable value"));
        assert!(error.to_string().contains("exactly one non-null value"));
    }

    #[test]
    fn raw_input_values() {
        let schema = schema();
        assert_eq!(
            coerce_input_value(&schema, &json!("GREEN"), &named("Color")),
            Ok(ConstValue::Enum("GREEN".into()))
        );
        assert_eq!(
            coerce_input_value(&schema, &json!(2), &named("Float")),
            Ok(ConstValue::Float(2.0))
        );
        assert_eq!(
            coerce_input_value(&schema, &json!(2.0), &named("Int")),
            Ok(ConstValue::Int(2))
        );
        let error = coerce_input_value(&schema, &json!(2.5), &named("Int"))
            .expect_err("2.5 is not an Int");
        assert!(error.to_string().contains("non-integer value: 2.5"), "{error}");
        let error = coerce_input_value(&schema, &json!({"x": "no"}), &named("Point"))
            .expect_err("x must be an Int");
        assert_eq!(error.path.render(), "x");
        assert!(matches!(
            coerce_input_value(&schema, &json!(null), &named("Int").non_null()).map_err(|e| e.kind),
            Err(CoercionErrorKind::NullForNonNull { .. })
        ));
    }

    #[test]
    fn variable_values_carry_provenance() {
        let schema = schema();
        let operation = operation(
            "query Q($a: Int, $b: Color = BLUE, $c: String!, $d: String) { color }",
        );
        let raw = json!({"a": 5, "c": "x"});
        let values = coerce_variable_values(&schema, &operation, raw.as_object().expect("map"))
            .expect("variables coerce");
        assert_eq!(values.get("a").map(|v| v.provenance), Some(Provenance::Variable));
        assert_eq!(
            values.get("b"),
            Some(&VariableValue {
                value: ConstValue::Enum("BLUE".into()),
                provenance: Provenance::VariableDefault,
            })
        );
        assert!(values.get("d").is_none());
        assert_eq!(values.to_json().get("c"), Some(&json!("x")));
    }

    #[test]
    fn variable_errors_are_collected() {
        let schema = schema();
        let operation = operation("query Q($a: Int!, $b: Int!, $c: Int) { color }");
        let raw = json!({"b": null, "c": "three"});
        let errors = coerce_variable_values(&schema, &operation, raw.as_object().expect("map"))
            .expect_err("three failures");
        assert_eq!(errors.len(), 3);
        assert!(matches!(&errors[0], VariableError::Missing { name, .. } if name == "a"));
        assert!(matches!(&errors[1], VariableError::Null { name, .. } if name == "b"));
        assert!(matches!(&errors[2], VariableError::Invalid { name, .. } if name == "c"));
    }

    #[test]
    fn argument_values_carry_provenance() {
        let schema = schema();
        let query = schema.query_type().expect("query root");
        let color = schema.field(query, "color").expect("color field");

        let document = crate::parse("query Q($c: Color) { a: color b: color(c: GREEN) c: color(c: $c) }")
            .ast
            .expect("parses");
        let operation = document.operations().next().expect("operation");
        let fields: Vec<_> = operation
            .selection_set
            .selections
            .iter()
            .filter_map(|selection| match selection {
                crate::ast::Selection::Field(field) => Some(field),
                _ => None,
            })
            .collect();

        let mut variables = VariableValues::new();
        let omitted = coerce_argument_values(&schema, &color.arguments, &fields[0].arguments, &variables)
            .expect("default applies");
        assert_eq!(omitted["c"].provenance, Provenance::FieldDefault);
        assert_eq!(omitted["c"].value, ConstValue::Enum("RED".into()));

        let literal = coerce_argument_values(&schema, &color.arguments, &fields[1].arguments, &variables)
            .expect("literal");
        assert_eq!(literal["c"].provenance, Provenance::Literal);

        let unset = coerce_argument_values(&schema, &color.arguments, &fields[2].arguments, &variables)
            .expect("unset variable falls back");
        assert_eq!(unset["c"].provenance, Provenance::FieldDefault);

        variables.insert("c", ConstValue::Enum("BLUE".into()), Provenance::Variable);
        let from_variable =
            coerce_argument_values(&schema, &color.arguments, &fields[2].arguments, &variables)
                .expect("variable");
        assert_eq!(from_variable["c"].provenance, Provenance::Variable);
        assert_eq!(from_variable["c"].value, ConstValue::Enum("BLUE".into()));
    }

    #[test]
    fn missing_required_argument() {
        let schema = schema();
        let query = schema.query_type().expect("query root");
        let point = schema.field(query, "point").expect("point field");
        let error = coerce_argument_values(&schema, &point.arguments, &[], &VariableValues::new())
            .expect_err("at is required");
        assert_eq!(
            error.to_string(),
            "Argument 'at' of required type 'Point!' was not provided."
        );
    }
}
