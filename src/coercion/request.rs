//! Coercion of request variables and of field and directive arguments.

use serde_json::{Map, Value as JsonValue};
use tracing::trace;

use crate::ast::{Argument, OperationDefinition, Value};
use crate::schema::{InputValueDef, Schema};

use super::error::{CoercionErrorKind, CoercionResult, PathSegment, VariableError};
use super::input::coerce_input_value;
use super::literal::coerce_literal;
use super::values::{CoercedArgument, CoercedArguments, Provenance, VariableValues};

/// Coerces the raw request variables of `operation` to their declared types.
///
/// Every variable is checked; all failures are returned together. Variables
/// whose declared type is not a known input type are skipped, validation
/// reports those.
pub fn coerce_variable_values(
    schema: &Schema,
    operation: &OperationDefinition,
    raw: &Map<String, JsonValue>,
) -> Result<VariableValues, Vec<VariableError>> {
    let mut values = VariableValues::new();
    let mut errors = Vec::new();

    for definition in &operation.variable_definitions {
        let name = &definition.variable.node;
        let ty = &definition.ty.node;
        if !schema.is_input_type(ty) {
            trace!(variable = %name, %ty, "skipping variable with a non-input type");
            continue;
        }

        match raw.get(name.as_str()) {
            None => match &definition.default_value {
                Some(default) => {
                    match coerce_literal(schema, &default.node, ty, &VariableValues::default()) {
                        Ok(value) => values.insert(name.clone(), value, Provenance::VariableDefault),
                        Err(error) => errors.push(VariableError::Invalid {
                            name: name.clone(),
                            value: default.node.to_string(),
                            error,
                            span: definition.span.clone(),
                        }),
                    }
                }
                None if ty.is_non_null() => errors.push(VariableError::Missing {
                    name: name.clone(),
                    ty: ty.clone(),
                    span: definition.span.clone(),
                }),
                None => {}
            },
            Some(JsonValue::Null) if ty.is_non_null() => errors.push(VariableError::Null {
                name: name.clone(),
                ty: ty.clone(),
                span: definition.span.clone(),
            }),
            Some(raw_value) => match coerce_input_value(schema, raw_value, ty) {
                Ok(value) => values.insert(name.clone(), value, Provenance::Variable),
                Err(error) => errors.push(VariableError::Invalid {
                    name: name.clone(),
                    value: raw_value.to_string(),
                    error,
                    span: definition.span.clone(),
                }),
            },
        }
    }

    if errors.is_empty() {
        Ok(values)
    } else {
        Err(errors)
    }
}

/// Coerces the arguments of a field or directive.
///
/// `definitions` are the declared arguments, `arguments` the ones written in
/// the document. Stops at the first failure; errors inside a literal carry
/// the argument name as the first path segment.
pub fn coerce_argument_values(
    schema: &Schema,
    definitions: &[InputValueDef],
    arguments: &[Argument],
    variables: &VariableValues,
) -> CoercionResult<CoercedArguments> {
    let mut coerced = CoercedArguments::new();

    for definition in definitions {
        let name = &definition.name;
        let ty = &definition.ty;
        let argument = arguments.iter().find(|argument| &argument.name.node == name);

        let provided = match argument.map(|argument| &argument.value.node) {
            None => None,
            Some(Value::Variable(variable)) => match variables.get(variable) {
                Some(value) => Some(CoercedArgument {
                    value: value.value.clone(),
                    provenance: value.provenance,
                }),
                None if definition.default_value.is_none() && ty.is_non_null() => {
                    return Err(CoercionErrorKind::MissingArgumentVariable {
                        argument: name.clone(),
                        ty: ty.clone(),
                        variable: variable.clone(),
                    }
                    .into());
                }
                None => None,
            },
            Some(literal) => {
                let value = coerce_literal(schema, literal, ty, variables)
                    .map_err(|error| error.within(PathSegment::Key(name.clone())))?;
                Some(CoercedArgument {
                    value,
                    provenance: Provenance::Literal,
                })
            }
        };

        match provided {
            Some(argument) if argument.value.is_null() && ty.is_non_null() => {
                return Err(CoercionErrorKind::NullArgument {
                    argument: name.clone(),
                    ty: ty.clone(),
                }
                .into());
            }
            Some(argument) => {
                coerced.insert(name.clone(), argument);
            }
            None => match &definition.default_value {
                Some(default) => {
                    let value = coerce_literal(schema, default, ty, &VariableValues::default())
                        .map_err(|error| error.within(PathSegment::Key(name.clone())))?;
                    coerced.insert(
                        name.clone(),
                        CoercedArgument {
                            value,
                            provenance: Provenance::FieldDefault,
                        },
                    );
                }
                None if ty.is_non_null() => {
                    return Err(CoercionErrorKind::MissingArgument {
                        argument: name.clone(),
                        ty: ty.clone(),
                    }
                    .into());
                }
                None => {}
            },
        }
    }

    Ok(coerced)
}

