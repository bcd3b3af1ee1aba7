//! Rules over input value literals.

use std::collections::HashMap;

use crate::ast::{Node, Span, Spanned, TypeRef, Value};
use crate::coercion::{CoercionErrorKind, OneOfOrigin, check_literal};
use crate::schema::{MetaType, Schema};
use crate::validation::{ValidationContext, Visitor, did_you_mean, suggestion_list};

declare_rule!(
    /// Argument literals match the argument type structurally.
    ///
    /// Unlike `ArgumentsOfCorrectType` every mismatch inside a literal is
    /// reported at its own position. Runs only when literal type checking is
    /// enabled.
    ValuesOfCorrectType,
    "VALUES_OF_CORRECT_TYPE",
    |ctx| {
        if ctx.config().literal_type_checking {
            Some(Box::new(ValuesOfCorrectTypeVisitor))
        } else {
            None
        }
    }
);

struct ValuesOfCorrectTypeVisitor;

impl<'a> Visitor<'a> for ValuesOfCorrectTypeVisitor {
    fn enter(&mut self, ctx: &mut ValidationContext<'a>, node: Node<'a>) {
        let Node::Argument(argument) = node else {
            return;
        };
        let Some(definition) = ctx.type_info().argument() else {
            return;
        };

        let mut checker = LiteralChecker {
            schema: ctx.schema(),
            max_suggestions: ctx.config().max_suggestions,
            findings: Vec::new(),
        };
        checker.check(&argument.value, &definition.ty);
        for (message, span) in checker.findings {
            ctx.report(ValuesOfCorrectType::CODE, message, [span]);
        }
    }
}

/// Walks a literal against its expected type, collecting one finding per
/// mismatching position.
struct LiteralChecker<'a> {
    schema: &'a Schema,
    max_suggestions: usize,
    findings: Vec<(String, &'a Span)>,
}

impl<'a> LiteralChecker<'a> {
    fn expected(&mut self, ty: &TypeRef, value: &'a Spanned<Value>, hint: String) {
        self.findings.push((
            format!("Expected type {ty}, found {}.{hint}", value.node),
            &value.span,
        ));
    }

    fn check(&mut self, value: &'a Spanned<Value>, ty: &TypeRef) {
        match &value.node {
            Value::Variable(_) => return,
            Value::Null => {
                if ty.is_non_null() {
                    self.expected(ty, value, String::new());
                }
                return;
            }
            _ => {}
        }

        if let TypeRef::List(item) = ty.nullable() {
            match &value.node {
                Value::List(items) => {
                    for element in items {
                        self.check(element, item);
                    }
                }
                _ => self.check(value, item),
            }
            return;
        }

        let Some(named) = self.schema.named_type(ty) else {
            return;
        };
        match named {
            MetaType::InputObject(input) => {
                let Value::Object(fields) = &value.node else {
                    self.expected(ty, value, String::new());
                    return;
                };

                for definition in input.fields.iter().filter(|field| field.is_required()) {
                    if !fields.iter().any(|field| field.name.node == definition.name) {
                        self.findings.push((
                            format!(
                                "Field '{}.{}' of required type '{}' was not provided.",
                                input.name, definition.name, definition.ty
                            ),
                            &value.span,
                        ));
                    }
                }

                for field in fields {
                    match input.field(&field.name.node) {
                        Some(definition) => self.check(&field.value, &definition.ty),
                        None => {
                            let options = input.fields.iter().map(|field| field.name.as_str());
                            let suggestions =
                                suggestion_list(&field.name.node, options, self.max_suggestions);
                            self.findings.push((
                                format!(
                                    "Field '{}' is not defined by type '{}'.{}",
                                    field.name.node,
                                    input.name,
                                    did_you_mean(&suggestions)
                                ),
                                &field.name.span,
                            ));
                        }
                    }
                }

                if input.one_of {
                    let single_non_null =
                        matches!(fields.as_slice(), [only] if !only.value.node.is_null());
                    if !single_non_null {
                        let error = CoercionErrorKind::OneOf {
                            ty: input.name.clone(),
                            origin: OneOfOrigin::Argument,
                        };
                        self.findings.push((error.to_string(), &value.span));
                    }
                }
            }
            MetaType::Enum(enum_type) => match &value.node {
                Value::Enum(name) if enum_type.value(name).is_some() => {}
                Value::Enum(name) => {
                    let options = enum_type.values.iter().map(|value| value.name.as_str());
                    let suggestions = suggestion_list(name, options, self.max_suggestions);
                    self.expected(ty, value, did_you_mean(&suggestions));
                }
                _ => self.expected(ty, value, String::new()),
            },
            MetaType::Scalar(_) => {
                let named_type = TypeRef::Named(named.name().clone());
                if check_literal(self.schema, &value.node, &named_type).is_err() {
                    self.expected(ty, value, String::new());
                }
            }
            _ => {}
        }
    }
}

declare_rule!(
    /// Variable default values coerce to the variable type.
    DefaultValuesOfCorrectType,
    "DEFAULT_VALUES_OF_CORRECT_TYPE",
    DefaultValuesOfCorrectTypeVisitor
);

#[derive(Default)]
struct DefaultValuesOfCorrectTypeVisitor;

impl<'a> Visitor<'a> for DefaultValuesOfCorrectTypeVisitor {
    fn enter(&mut self, ctx: &mut ValidationContext<'a>, node: Node<'a>) {
        let Node::VariableDefinition(definition) = node else {
            return;
        };
        let Some(default) = &definition.default_value else {
            return;
        };
        let ty = &definition.ty.node;
        if !ctx.schema().is_input_type(ty) {
            return;
        }
        if let Err(error) = check_literal(ctx.schema(), &default.node, ty) {
            ctx.report(
                DefaultValuesOfCorrectType::CODE,
                format!(
                    "Variable '${}' of type '{ty}' has invalid default value {}. {error}",
                    definition.variable.node, default.node
                ),
                [&default.span],
            );
        }
    }
}

declare_rule!(
    /// Input object literals give each field at most once.
    UniqueInputFieldNames,
    "UNIQUE_INPUT_FIELD_NAMES",
    UniqueInputFieldNamesVisitor
);

#[derive(Default)]
struct UniqueInputFieldNamesVisitor;

impl<'a> Visitor<'a> for UniqueInputFieldNamesVisitor {
    fn enter(&mut self, ctx: &mut ValidationContext<'a>, node: Node<'a>) {
        let Node::Value(value) = node else {
            return;
        };
        let Value::Object(fields) = &value.node else {
            return;
        };

        let mut seen: HashMap<&str, &Span> = HashMap::new();
        for field in fields {
            let name = field.name.node.as_str();
            match seen.get(name) {
                Some(first) => ctx.report(
                    UniqueInputFieldNames::CODE,
                    format!("There can be only one input field named '{name}'."),
                    [*first, &field.name.span],
                ),
                None => {
                    seen.insert(name, &field.name.span);
                }
            }
        }
    }
}
