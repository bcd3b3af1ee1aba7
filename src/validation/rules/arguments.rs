//! Rules over field and directive arguments.

use crate::ast::{Argument, Node, Span, Value};
use crate::coercion::check_literal;
use crate::validation::{ValidationContext, Visitor, did_you_mean};

declare_rule!(
    /// Arguments are defined by the field or directive they are given to.
    KnownArgumentNames,
    "KNOWN_ARGUMENT_NAMES",
    KnownArgumentNamesVisitor
);

#[derive(Default)]
struct KnownArgumentNamesVisitor;

impl<'a> Visitor<'a> for KnownArgumentNamesVisitor {
    fn enter(&mut self, ctx: &mut ValidationContext<'a>, node: Node<'a>) {
        let Node::Argument(argument) = node else {
            return;
        };
        let type_info = ctx.type_info();
        if type_info.argument().is_some() {
            return;
        }
        let name = argument.name.node.as_str();

        let message = if type_info.in_directive() {
            let Some(directive) = type_info.directive() else {
                return;
            };
            let options = directive.arguments.iter().map(|arg| arg.name.as_str());
            format!(
                "Unknown argument '{name}' on directive '@{}'.{}",
                directive.name,
                did_you_mean(&ctx.suggestions(name, options))
            )
        } else {
            let (Some(field), Some(parent)) = (type_info.field_def(), type_info.parent_type())
            else {
                return;
            };
            let options = field.arguments.iter().map(|arg| arg.name.as_str());
            format!(
                "Unknown argument '{name}' on field '{}.{}'.{}",
                parent.name(),
                field.name,
                did_you_mean(&ctx.suggestions(name, options))
            )
        };
        ctx.report(KnownArgumentNames::CODE, message, [&argument.name.span]);
    }
}

declare_rule!(
    /// A field or directive receives each argument at most once.
    UniqueArgumentNames,
    "UNIQUE_ARGUMENT_NAMES",
    UniqueArgumentNamesVisitor
);

#[derive(Default)]
struct UniqueArgumentNamesVisitor;

impl UniqueArgumentNamesVisitor {
    fn check(&self, ctx: &mut ValidationContext<'_>, arguments: &[Argument]) {
        let mut grouped: Vec<(&str, Vec<&Span>)> = Vec::new();
        for argument in arguments {
            let name = argument.name.node.as_str();
            match grouped.iter_mut().find(|(known, _)| *known == name) {
                Some((_, spans)) => spans.push(&argument.name.span),
                None => grouped.push((name, vec![&argument.name.span])),
            }
        }
        for (name, spans) in grouped {
            if spans.len() > 1 {
                ctx.report(
                    UniqueArgumentNames::CODE,
                    format!("There can be only one argument named '{name}'."),
                    spans,
                );
            }
        }
    }
}

impl<'a> Visitor<'a> for UniqueArgumentNamesVisitor {
    fn enter(&mut self, ctx: &mut ValidationContext<'a>, node: Node<'a>) {
        match node {
            Node::Field(field) => self.check(ctx, &field.arguments),
            Node::Directive(directive) => self.check(ctx, &directive.arguments),
            _ => {}
        }
    }
}

declare_rule!(
    /// Argument literals coerce to the argument type.
    ///
    /// Variables inside literals are not resolved; their positions are
    /// checked by `VariablesInAllowedPosition`. Replaced by
    /// `ValuesOfCorrectType` when literal type checking is enabled.
    ArgumentsOfCorrectType,
    "ARGUMENTS_OF_CORRECT_TYPE",
    |ctx| {
        if ctx.config().literal_type_checking {
            None
        } else {
            Some(Box::new(ArgumentsOfCorrectTypeVisitor))
        }
    }
);

struct ArgumentsOfCorrectTypeVisitor;

impl<'a> Visitor<'a> for ArgumentsOfCorrectTypeVisitor {
    fn enter(&mut self, ctx: &mut ValidationContext<'a>, node: Node<'a>) {
        let Node::Argument(argument) = node else {
            return;
        };
        if let Value::Variable(_) = argument.value.node {
            return;
        }
        let Some(definition) = ctx.type_info().argument() else {
            return;
        };
        if let Err(error) = check_literal(ctx.schema(), &argument.value.node, &definition.ty) {
            ctx.report(
                ArgumentsOfCorrectType::CODE,
                format!(
                    "Argument '{}' has invalid value {}. {error}",
                    argument.name.node, argument.value.node
                ),
                [&argument.value.span],
            );
        }
    }
}

declare_rule!(
    /// Required arguments, non-null without a default, are provided.
    ProvidedRequiredArguments,
    "PROVIDED_REQUIRED_ARGUMENTS",
    ProvidedRequiredArgumentsVisitor
);

#[derive(Default)]
struct ProvidedRequiredArgumentsVisitor;

impl<'a> Visitor<'a> for ProvidedRequiredArgumentsVisitor {
    fn leave(&mut self, ctx: &mut ValidationContext<'a>, node: Node<'a>) {
        match node {
            Node::Field(field) => {
                let Some(definition) = ctx.type_info().field_def() else {
                    return;
                };
                for required in definition.arguments.iter().filter(|arg| arg.is_required()) {
                    if field.argument(&required.name).is_none() {
                        ctx.report(
                            ProvidedRequiredArguments::CODE,
                            format!(
                                "Field '{}' argument '{}' of type '{}' is required, but it was not provided.",
                                field.name.node, required.name, required.ty
                            ),
                            [&field.span],
                        );
                    }
                }
            }
            Node::Directive(directive) => {
                let Some(definition) = ctx.type_info().directive() else {
                    return;
                };
                for required in definition.arguments.iter().filter(|arg| arg.is_required()) {
                    if directive.argument(&required.name).is_none() {
                        ctx.report(
                            ProvidedRequiredArguments::CODE,
                            format!(
                                "Directive '@{}' argument '{}' of type '{}' is required, but it was not provided.",
                                directive.name.node, required.name, required.ty
                            ),
                            [&directive.span],
                        );
                    }
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationConfig;
    use crate::validation::rules::test_support::{errors, errors_with, locations, messages};

    #[test]
    fn known_arguments() {
        assert!(
            messages(
                KnownArgumentNames,
                "{ dog { doesKnowCommand(dogCommand: SIT) name @include(if: true) } }"
            )
            .is_empty()
        );
    }

    #[test]
    fn unknown_field_argument_with_suggestion() {
        let errors = errors(KnownArgumentNames, "{ dog { doesKnowCommand(DogCommand: SIT) } }");
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].message,
            "Unknown argument 'DogCommand' on field 'Dog.doesKnowCommand'. Did you mean 'dogCommand'?"
        );
        assert_eq!(locations(&errors[0]), vec![(1, 25)]);
    }

    #[test]
    fn unknown_directive_argument() {
        assert_eq!(
            messages(KnownArgumentNames, "{ dog @skip(unless: true) { name } }"),
            vec!["Unknown argument 'unless' on directive '@skip'."]
        );
    }

    #[test]
    fn arguments_of_unknown_directives_and_fields_are_ignored() {
        assert!(
            messages(
                KnownArgumentNames,
                "{ dog { name @unknown(whatever: 1) unknownField(arg: 1) } }"
            )
            .is_empty()
        );
    }

    #[test]
    fn duplicate_arguments() {
        let errors = errors(
            UniqueArgumentNames,
            "{ dog { isAtLocation(x: 1, x: 2, y: 3) name @include(if: true, if: false) } }",
        );
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].message, "There can be only one argument named 'x'.");
        assert_eq!(locations(&errors[0]), vec![(1, 22), (1, 28)]);
        assert_eq!(errors[1].message, "There can be only one argument named 'if'.");
    }

    #[test]
    fn int_literal_for_string_argument() {
        let errors = errors(
            ArgumentsOfCorrectType,
            "{ complicatedArgs { stringArgField(stringArg: 3) } }",
        );
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, "ARGUMENTS_OF_CORRECT_TYPE");
        assert!(errors[0].message.contains("'String'"));
        assert!(errors[0].message.contains("'3'"));
        assert_eq!(locations(&errors[0]), vec![(1, 47)]);
    }

    #[test]
    fn valid_argument_literals() {
        assert!(
            messages(
                ArgumentsOfCorrectType,
                "{ complicatedArgs {
                    intArgField(intArg: 2)
                    floatArgField(floatArg: 1)
                    idArgField(idArg: 1)
                    enumArgField(enumArg: BROWN)
                    stringListArgField(stringListArg: \"one\")
                    complexArgField(complexArg: { requiredField: true, intField: 4 })
                    oneOfArgField(oneOfArg: { stringField: \"a\" })
                    nonNullIntArgField(nonNullIntArg: $var)
                } }"
            )
            .is_empty()
        );
    }

    #[test]
    fn invalid_argument_literals() {
        let messages = messages(
            ArgumentsOfCorrectType,
            "{ complicatedArgs {
                enumArgField(enumArg: \"BROWN\")
                nonNullIntArgField(nonNullIntArg: null)
                complexArgField(complexArg: { intField: 4 })
                oneOfArgField(oneOfArg: { stringField: \"a\", intField: 1 })
            } }",
        );
        assert_eq!(messages.len(), 4);
        assert!(messages[0].starts_with("Argument 'enumArg' has invalid value \"BROWN\"."));
        assert_eq!(
            messages[1],
            "Argument 'nonNullIntArg' has invalid value null. Expected non-nullable type 'Int!' not to be null."
        );
        assert!(messages[2].contains("Field 'ComplexInput.requiredField' of required type 'Boolean!' was not provided."));
        assert!(messages[3].contains("exactly one non-null value"));
    }

    #[test]
    fn opts_out_under_literal_type_checking() {
        let errors = errors_with(
            ArgumentsOfCorrectType,
            ValidationConfig::default().with_literal_type_checking(true),
            "{ complicatedArgs { stringArgField(stringArg: 3) } }",
        );
        assert!(errors.is_empty());
    }

    #[test]
    fn missing_required_arguments() {
        assert_eq!(
            messages(
                ProvidedRequiredArguments,
                "{ complicatedArgs { multipleReqs(req1: 1) nonNullFieldWithDefault multipleOpts } }"
            ),
            vec!["Field 'multipleReqs' argument 'req2' of type 'Int!' is required, but it was not provided."]
        );
        assert_eq!(
            messages(ProvidedRequiredArguments, "{ dog @include { name @skip } }"),
            vec![
                "Directive '@include' argument 'if' of type 'Boolean!' is required, but it was not provided.",
                "Directive '@skip' argument 'if' of type 'Boolean!' is required, but it was not provided.",
            ]
        );
    }

    #[test]
    fn unknown_fields_need_no_arguments() {
        assert!(messages(ProvidedRequiredArguments, "{ dog { unknown } }").is_empty());
    }
}
