//! Coercion of raw request input (JSON) values.

use std::collections::BTreeMap;

use serde_json::Value as JsonValue;

use crate::ast::{ConstValue, TypeRef};
use crate::schema::{InputObjectType, MetaType, Schema};

use super::error::{CoercionErrorKind, CoercionResult, OneOfOrigin, PathSegment};
use super::literal::coerce_literal;
use super::values::VariableValues;

/// Coerces a raw JSON input value to `ty`.
///
/// Enum values arrive as JSON strings naming the value. A value that is not a
/// list is accepted where a list is expected and wrapped in a single-element
/// list.
pub fn coerce_input_value(
    schema: &Schema,
    value: &JsonValue,
    ty: &TypeRef,
) -> CoercionResult<ConstValue> {
    match ty {
        TypeRef::NonNull(inner) => {
            if value.is_null() {
                return Err(CoercionErrorKind::NullForNonNull { ty: ty.clone() }.into());
            }
            coerce_input_value(schema, value, inner)
        }
        _ if value.is_null() => Ok(ConstValue::Null),
        TypeRef::List(item) => match value {
            JsonValue::Array(items) => items
                .iter()
                .enumerate()
                .map(|(index, element)| {
                    coerce_input_value(schema, element, item)
                        .map_err(|error| error.within(PathSegment::Index(index)))
                })
                .collect::<CoercionResult<Vec<_>>>()
                .map(ConstValue::List),
            single => Ok(ConstValue::List(vec![coerce_input_value(schema, single, item)?])),
        },
        TypeRef::Named(name) => match schema.type_by_name(name) {
            Some(MetaType::InputObject(input)) => coerce_object(schema, value, input),
            Some(MetaType::Enum(enum_type)) => match value {
                JsonValue::String(variant) if enum_type.value(variant).is_some() => {
                    Ok(ConstValue::Enum(variant.into()))
                }
                JsonValue::String(variant) => Err(CoercionErrorKind::UnknownEnumValue {
                    ty: name.clone(),
                    value: variant.clone(),
                }
                .into()),
                other => Err(CoercionErrorKind::NotAnEnumValue {
                    ty: name.clone(),
                    value: other.to_string(),
                }
                .into()),
            },
            Some(MetaType::Scalar(scalar)) => scalar
                .parse_value(&ConstValue::from_json(value))
                .map_err(|reason| {
                    CoercionErrorKind::InvalidScalar {
                        ty: name.clone(),
                        value: value.to_string(),
                        reason,
                    }
                    .into()
                }),
            Some(_) => Err(CoercionErrorKind::NotInputType { ty: name.clone() }.into()),
            None => Err(CoercionErrorKind::UnknownType { ty: name.clone() }.into()),
        },
    }
}

fn coerce_object(
    schema: &Schema,
    value: &JsonValue,
    input: &InputObjectType,
) -> CoercionResult<ConstValue> {
    let JsonValue::Object(map) = value else {
        return Err(CoercionErrorKind::NotAnObject {
            ty: input.name.clone(),
        }
        .into());
    };

    if let Some(unknown) = map.keys().find(|key| input.field(key).is_none()) {
        return Err(CoercionErrorKind::UnknownField {
            field: unknown.into(),
            ty: input.name.clone(),
        }
        .into());
    }

    let mut coerced = BTreeMap::new();
    for definition in &input.fields {
        let key = PathSegment::Key(definition.name.clone());
        match map.get(definition.name.as_str()) {
            Some(field) => {
                let value = coerce_input_value(schema, field, &definition.ty)
                    .map_err(|error| error.within(key))?;
                coerced.insert(definition.name.clone(), value);
            }
            None => match &definition.default_value {
                Some(default) => {
                    let value =
                        coerce_literal(schema, default, &definition.ty, &VariableValues::default())
                            .map_err(|error| error.within(key))?;
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
        let non_null = coerced.values().filter(|value| !value.is_null()).count();
        if coerced.len() != 1 || non_null != 1 {
            return Err(CoercionErrorKind::OneOf {
                ty: input.name.clone(),
                origin: OneOfOrigin::Variable,
            }
            .into());
        }
    }

    Ok(ConstValue::Object(coerced))
}
