//! Coercion of literal values written in a document.

use std::collections::BTreeMap;

use smol_str::SmolStr;

use crate::ast::{ConstValue, ObjectField, TypeRef, Value};
use crate::schema::{InputObjectType, MetaType, Schema};

use super::error::{CoercionErrorKind, CoercionResult, OneOfOrigin, PathSegment};
use super::values::VariableValues;

/// How variable references inside a literal are resolved.
#[derive(Debug, Clone, Copy)]
enum Variables<'v> {
    /// Substitute coerced request values.
    Values(&'v VariableValues),
    /// Accept any variable; its value is checked once the request is known.
    Deferred,
}

/// Coerces a literal to `ty`, substituting variables from `variables`.
///
/// Variables must already be coerced to their declared types. A variable
/// without a value is treated as absent: input object fields fall back to
/// their defaults, and nullable positions become `null`.
pub fn coerce_literal(
    schema: &Schema,
    value: &Value,
    ty: &TypeRef,
    variables: &VariableValues,
) -> CoercionResult<ConstValue> {
    coerce(schema, value, ty, Variables::Values(variables))
}

/// Checks that a literal can be coerced to `ty` without knowing the request
/// variables. Variable references are accepted in any position.
pub fn check_literal(schema: &Schema, value: &Value, ty: &TypeRef) -> CoercionResult<()> {
    coerce(schema, value, ty, Variables::Deferred).map(|_| ())
}

fn coerce(
    schema: &Schema,
    value: &Value,
    ty: &TypeRef,
    variables: Variables<'_>,
) -> CoercionResult<ConstValue> {
    if let Value::Variable(name) = value {
        return resolve_variable(name, ty, variables);
    }

    match ty {
        TypeRef::NonNull(inner) => {
            if value.is_null() {
                return Err(CoercionErrorKind::NullForNonNull { ty: ty.clone() }.into());
            }
            coerce(schema, value, inner, variables)
        }
        _ if value.is_null() => Ok(ConstValue::Null),
        TypeRef::List(item) => match value {
            Value::List(items) => items
                .iter()
                .enumerate()
                .map(|(index, element)| {
                    coerce(schema, &element.node, item, variables)
                        .map_err(|error| error.within(PathSegment::Index(index)))
                })
                .collect::<CoercionResult<Vec<_>>>()
                .map(ConstValue::List),
            single => Ok(ConstValue::List(vec![coerce(schema, single, item, variables)?])),
        },
        TypeRef::Named(name) => match schema.type_by_name(name) {
            Some(MetaType::InputObject(input)) => coerce_object(schema, value, input, variables),
            Some(MetaType::Enum(enum_type)) => match value {
                Value::Enum(variant) if enum_type.value(variant).is_some() => {
                    Ok(ConstValue::Enum(variant.clone()))
                }
                Value::Enum(variant) => Err(CoercionErrorKind::UnknownEnumValue {
                    ty: name.clone(),
                    value: variant.to_string(),
                }
                .into()),
                other => Err(CoercionErrorKind::NotAnEnumValue {
                    ty: name.clone(),
                    value: other.to_string(),
                }
                .into()),
            },
            Some(MetaType::Scalar(scalar)) => {
                let raw = to_const(value, variables);
                scalar.parse_value(&raw).map_err(|reason| {
                    CoercionErrorKind::InvalidScalar {
                        ty: name.clone(),
                        value: value.to_string(),
                        reason,
                    }
                    .into()
                })
            }
            Some(_) => Err(CoercionErrorKind::NotInputType { ty: name.clone() }.into()),
            None => Err(CoercionErrorKind::UnknownType { ty: name.clone() }.into()),
        },
    }
}

fn resolve_variable(
    name: &SmolStr,
    ty: &TypeRef,
    variables: Variables<'_>,
) -> CoercionResult<ConstValue> {
    let Variables::Values(values) = variables else {
        return Ok(ConstValue::Null);
    };
    match values.value(name) {
        Some(value) if value.is_null() && ty.is_non_null() => {
            Err(CoercionErrorKind::NullForNonNull { ty: ty.clone() }.into())
        }
        Some(value) => Ok(value.clone()),
        None if ty.is_non_null() => Err(CoercionErrorKind::MissingVariableValue {
            variable: name.clone(),
            ty: ty.clone(),
        }
        .into()),
        None => Ok(ConstValue::Null),
    }
}

fn coerce_object(
    schema: &Schema,
    value: &Value,
    input: &InputObjectType,
    variables: Variables<'_>,
) -> CoercionResult<ConstValue> {
    let Value::Object(fields) = value else {
        return Err(CoercionErrorKind::NotAnObject {
            ty: input.name.clone(),
        }
        .into());
    };

    if let Some(unknown) = fields.iter().find(|field| input.field(&field.name.node).is_none()) {
        return Err(CoercionErrorKind::UnknownField {
            field: unknown.name.node.clone(),
            ty: input.name.clone(),
        }
        .into());
    }

    let mut coerced = BTreeMap::new();
    let mut deferred_variables = 0;
    for definition in &input.fields {
        let provided = fields
            .iter()
            .find(|field| field.name.node == definition.name)
            .filter(|field| !is_absent(field, variables));

        match provided {
            Some(field) => {
                if matches!(variables, Variables::Deferred) && field.value.node.as_variable().is_some() {
                    deferred_variables += 1;
                }
                let value = coerce(schema, &field.value.node, &definition.ty, variables)
                    .map_err(|error| error.within(PathSegment::Key(definition.name.clone())))?;
                coerced.insert(definition.name.clone(), value);
            }
            None => match &definition.default_value {
                Some(default) => {
                    let value = coerce_literal(schema, default, &definition.ty, &VariableValues::default())
                        .map_err(|error| error.within(PathSegment::Key(definition.name.clone())))?;
                    coerced.insert(definition.name.clone(), value);
                }
                None if definition.ty.is_non_null() => {
                    return Err(CoercionErrorKind::MissingField {
                        ty: input.name.clone(),
                        field: definition.name.clone(),
                        field_type: definition.ty.clone(),
                    }
                    .into());
                }
                None => {}
            },
        }
    }

    if input.one_of {
        let non_null = coerced.values().filter(|value| !value.is_null()).count() + deferred_variables;
        if coerced.len() != 1 || non_null != 1 {
            return Err(CoercionErrorKind::OneOf {
                ty: input.name.clone(),
                origin: OneOfOrigin::Argument,
            }
            .into());
        }
    }

    Ok(ConstValue::Object(coerced))
}

/// A field whose value is a variable without a runtime value counts as not
/// provided.
fn is_absent(field: &ObjectField, variables: Variables<'_>) -> bool {
    match (&field.value.node, variables) {
        (Value::Variable(name), Variables::Values(values)) => values.value(name).is_none(),
        _ => false,
    }
}

/// Converts a literal to a runtime value for a scalar parse function.
fn to_const(value: &Value, variables: Variables<'_>) -> ConstValue {
    match value {
        Value::Variable(name) => match variables {
            Variables::Values(values) => values.value(name).cloned().unwrap_or(ConstValue::Null),
            Variables::Deferred => ConstValue::Null,
        },
        Value::Int(raw) => match raw.parse::<i64>() {
            Ok(int) => ConstValue::Int(int),
            Err(_) => ConstValue::Float(raw.parse().unwrap_or(f64::INFINITY)),
        },
        Value::Float(raw) => ConstValue::Float(raw.parse().unwrap_or(f64::NAN)),
        Value::String(s) => ConstValue::String(s.clone()),
        Value::Boolean(b) => ConstValue::Boolean(*b),
        Value::Null => ConstValue::Null,
        Value::Enum(name) => ConstValue::Enum(name.clone()),
        Value::List(items) => {
            ConstValue::List(items.iter().map(|item| to_const(&item.node, variables)).collect())
        }
        Value::Object(fields) => ConstValue::Object(
            fields
                .iter()
                .map(|field| (field.name.node.clone(), to_const(&field.value.node, variables)))
                .collect(),
        ),
    }
}
