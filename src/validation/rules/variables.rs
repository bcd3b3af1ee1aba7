//! Rules over variable definitions and their usages.

use std::collections::{HashMap, HashSet};

use crate::ast::{Node, OperationDefinition, Span, TypeRef};
use crate::coercion::coerce_variable_values;
use crate::schema::Schema;
use crate::validation::{
    BoxedVisitor, RuleScope, ValidationContext, ValidationRule, VariableUsage, Visitor,
};

declare_rule!(
    /// Variable names are unique within an operation.
    UniqueVariableNames,
    "UNIQUE_VARIABLE_NAMES",
    UniqueVariableNamesVisitor
);

#[derive(Default)]
struct UniqueVariableNamesVisitor;

impl<'a> Visitor<'a> for UniqueVariableNamesVisitor {
    fn enter(&mut self, ctx: &mut ValidationContext<'a>, node: Node<'a>) {
        let Node::OperationDefinition(operation) = node else {
            return;
        };

        let mut grouped: Vec<(&str, Vec<&Span>)> = Vec::new();
        for definition in &operation.variable_definitions {
            let name = definition.variable.node.as_str();
            match grouped.iter_mut().find(|(known, _)| *known == name) {
                Some((_, spans)) => spans.push(&definition.variable.span),
                None => grouped.push((name, vec![&definition.variable.span])),
            }
        }

        for (name, spans) in grouped {
            if spans.len() > 1 {
                ctx.report(
                    UniqueVariableNames::CODE,
                    format!("There can be only one variable named '${name}'."),
                    spans,
                );
            }
        }
    }
}

declare_rule!(
    /// Every variable used by an operation, directly or through fragments,
    /// is defined by it.
    NoUndefinedVariables,
    "NO_UNDEFINED_VARIABLES",
    NoUndefinedVariablesVisitor
);

#[derive(Default)]
struct NoUndefinedVariablesVisitor;

impl<'a> Visitor<'a> for NoUndefinedVariablesVisitor {
    fn leave(&mut self, ctx: &mut ValidationContext<'a>, node: Node<'a>) {
        let Node::OperationDefinition(operation) = node else {
            return;
        };
        let defined: HashSet<&str> = operation
            .variable_definitions
            .iter()
            .map(|definition| definition.variable.node.as_str())
            .collect();

        for usage in ctx.recursive_variable_usages(operation).iter() {
            if defined.contains(usage.name.as_str()) {
                continue;
            }
            let message = match operation.name_str() {
                Some(operation_name) => format!(
                    "Variable '${}' is not defined by operation '{operation_name}'.",
                    usage.name
                ),
                None => format!("Variable '${}' is not defined.", usage.name),
            };
            ctx.report(NoUndefinedVariables::CODE, message, [usage.span, &operation.span]);
        }
    }
}

declare_rule!(
    /// Every variable an operation defines is used by it, directly or
    /// through fragments.
    NoUnusedVariables,
    "NO_UNUSED_VARIABLES",
    NoUnusedVariablesVisitor
);

#[derive(Default)]
struct NoUnusedVariablesVisitor;

impl<'a> Visitor<'a> for NoUnusedVariablesVisitor {
    fn leave(&mut self, ctx: &mut ValidationContext<'a>, node: Node<'a>) {
        let Node::OperationDefinition(operation) = node else {
            return;
        };
        let used: HashSet<&str> = ctx
            .recursive_variable_usages(operation)
            .iter()
            .map(|usage| usage.name.as_str())
            .collect();

        for definition in &operation.variable_definitions {
            let name = &definition.variable.node;
            if used.contains(name.as_str()) {
                continue;
            }
            let message = match operation.name_str() {
                Some(operation_name) => {
                    format!("Variable '${name}' is never used in operation '{operation_name}'.")
                }
                None => format!("Variable '${name}' is never used."),
            };
            ctx.report(NoUnusedVariables::CODE, message, [&definition.span]);
        }
    }
}

declare_rule!(
    /// Variables are used only where their declared type is accepted.
    VariablesInAllowedPosition,
    "VARIABLES_IN_ALLOWED_POSITION",
    VariablesInAllowedPositionVisitor
);

#[derive(Default)]
struct VariablesInAllowedPositionVisitor;

impl<'a> Visitor<'a> for VariablesInAllowedPositionVisitor {
    fn leave(&mut self, ctx: &mut ValidationContext<'a>, node: Node<'a>) {
        let Node::OperationDefinition(operation) = node else {
            return;
        };
        let schema = ctx.schema();
        let mut definitions = HashMap::new();
        for definition in &operation.variable_definitions {
            definitions
                .entry(definition.variable.node.as_str())
                .or_insert(definition);
        }

        for usage in ctx.recursive_variable_usages(operation).iter() {
            let Some(location_type) = &usage.ty else {
                continue;
            };
            let Some(definition) = definitions.get(usage.name.as_str()) else {
                continue;
            };
            let variable_type = &definition.ty.node;
            if schema.named_type(variable_type).is_none() {
                continue;
            }
            let has_default = definition
                .default_value
                .as_ref()
                .is_some_and(|value| !value.node.is_null());

            if !allowed_usage(schema, variable_type, has_default, location_type, usage) {
                ctx.report(
                    VariablesInAllowedPosition::CODE,
                    format!(
                        "Variable '${}' of type '{variable_type}' used in position expecting type '{location_type}'.",
                        usage.name
                    ),
                    [&definition.span, usage.span],
                );
            }
        }
    }
}

/// A nullable variable may flow into a non-null position only when the
/// variable or the position supplies a non-null default.
fn allowed_usage(
    schema: &Schema,
    variable_type: &TypeRef,
    variable_has_default: bool,
    location_type: &TypeRef,
    usage: &VariableUsage<'_>,
) -> bool {
    if let TypeRef::NonNull(nullable_location) = location_type {
        if !variable_type.is_non_null() {
            if !variable_has_default && !usage.has_default {
                return false;
            }
            return schema.is_type_sub_type_of(variable_type, nullable_location);
        }
    }
    schema.is_type_sub_type_of(variable_type, location_type)
}

/// Raw request variables coerce to the declared types of the selected
/// operation.
///
/// Depends on the request rather than the document, so it also runs for
/// cached documents. Opts out when the request carries no variables.
#[derive(Debug, Clone, Copy, Default)]
pub struct VariableValuesOfCorrectType;

impl VariableValuesOfCorrectType {
    pub const CODE: &'static str = "VARIABLE_VALUES_OF_CORRECT_TYPE";
}

impl ValidationRule for VariableValuesOfCorrectType {
    fn name(&self) -> &'static str {
        "VariableValuesOfCorrectType"
    }

    fn code(&self) -> &'static str {
        Self::CODE
    }

    fn scope(&self) -> RuleScope {
        RuleScope::Request
    }

    fn create_visitor<'a>(&self, ctx: &ValidationContext<'a>) -> Option<BoxedVisitor<'a>> {
        ctx.variables()?;
        Some(Box::new(VariableValuesVisitor))
    }
}

struct VariableValuesVisitor;

impl VariableValuesVisitor {
    fn selected_operation<'a>(ctx: &ValidationContext<'a>) -> Option<&'a OperationDefinition> {
        ctx.document().operation(ctx.operation_name())
    }
}

impl<'a> Visitor<'a> for VariableValuesVisitor {
    fn enter(&mut self, ctx: &mut ValidationContext<'a>, node: Node<'a>) {
        let Node::Document(_) = node else {
            return;
        };
        let (Some(raw), Some(operation)) = (ctx.variables(), Self::selected_operation(ctx)) else {
            return;
        };

        match coerce_variable_values(ctx.schema(), operation, raw) {
            Ok(values) => ctx.set_coerced_variables(values),
            Err(errors) => {
                for error in errors {
                    ctx.report(
                        VariableValuesOfCorrectType::CODE,
                        error.to_string(),
                        [error.span()],
                    );
                }
            }
        }
    }
}
