//! Operations, fragments and selection sets.

use crate::ast::{
    Field, FragmentDefinition, FragmentSpread, InlineFragment, OperationDefinition,
    OperationType, Selection, SelectionSet, Spanned, VariableDefinition,
};
use crate::lexer::token::TokenKind;
use crate::parser::base::{ParseResult, TokenStream, parse_many};
use crate::parser::value::{
    parse_arguments, parse_directives, parse_parenthesized, parse_type_ref, parse_value,
};

/// Maps an operation keyword to its type.
pub fn operation_type(keyword: &str) -> Option<OperationType> {
    match keyword {
        "query" => Some(OperationType::Query),
        "mutation" => Some(OperationType::Mutation),
        "subscription" => Some(OperationType::Subscription),
        _ => None,
    }
}

/// Parses an operation, either the `{ ... }` shorthand or the full form.
pub fn parse_operation(stream: &mut TokenStream<'_>) -> ParseResult<OperationDefinition> {
    let start = stream.current().span.start;

    if stream.check(&TokenKind::LBrace) {
        let selection_set = parse_selection_set(stream)?;
        return Ok(OperationDefinition {
            operation: OperationType::Query,
            name: None,
            variable_definitions: Vec::new(),
            directives: Vec::new(),
            selection_set,
            span: stream.span_from(start),
        });
    }

    let keyword = stream.expect_name()?;
    let operation = operation_type(&keyword.node).ok_or_else(|| {
        stream.error_here(format!(
            "expected 'query', 'mutation' or 'subscription', found '{}'",
            keyword.node
        ))
    })?;

    let name = if matches!(stream.current().kind, TokenKind::Name(_)) {
        Some(stream.expect_name()?)
    } else {
        None
    };
    let variable_definitions = if stream.check(&TokenKind::LParen) {
        parse_parenthesized(stream, parse_variable_definition)?
    } else {
        Vec::new()
    };
    let directives = parse_directives(stream, false)?;
    let selection_set = parse_selection_set(stream)?;

    Ok(OperationDefinition {
        operation,
        name,
        variable_definitions,
        directives,
        selection_set,
        span: stream.span_from(start),
    })
}

fn parse_variable_definition(stream: &mut TokenStream<'_>) -> ParseResult<VariableDefinition> {
    let dollar = stream.expect(TokenKind::Dollar)?;
    let name = stream.expect_name()?;
    let variable = Spanned::new(name.node, dollar.start..name.span.end);
    stream.expect(TokenKind::Colon)?;
    let ty = parse_type_ref(stream)?;
    let default_value = if stream.consume(&TokenKind::Equals) {
        Some(parse_value(stream, true)?)
    } else {
        None
    };
    let directives = parse_directives(stream, true)?;

    Ok(VariableDefinition {
        variable,
        ty,
        default_value,
        directives,
        span: stream.span_from(dollar.start),
    })
}

/// Parses `fragment Name on Type @directives { ... }`.
pub fn parse_fragment_definition(stream: &mut TokenStream<'_>) -> ParseResult<FragmentDefinition> {
    let start = stream.expect_keyword("fragment")?.start;
    if stream.check_keyword("on") {
        return Err(stream.error_here("unexpected 'on', a fragment needs a name"));
    }
    let name = stream.expect_name()?;
    stream.expect_keyword("on")?;
    let type_condition = stream.expect_name()?;
    let directives = parse_directives(stream, false)?;
    let selection_set = parse_selection_set(stream)?;

    Ok(FragmentDefinition {
        name,
        type_condition,
        directives,
        selection_set,
        span: stream.span_from(start),
    })
}

/// Parses a non-empty `{ ... }` selection set.
pub fn parse_selection_set(stream: &mut TokenStream<'_>) -> ParseResult<SelectionSet> {
    let start = stream.current().span.start;
    let selections = parse_many(stream, TokenKind::LBrace, TokenKind::RBrace, parse_selection)?;
    Ok(SelectionSet {
        selections,
        span: stream.span_from(start),
    })
}

fn parse_selection(stream: &mut TokenStream<'_>) -> ParseResult<Selection> {
    if !stream.check(&TokenKind::Spread) {
        return parse_field(stream).map(Selection::Field);
    }

    let start = stream.advance().span.start;
    let named_spread = matches!(&stream.current().kind, TokenKind::Name(name) if name != "on");
    if named_spread {
        let fragment_name = stream.expect_name()?;
        let directives = parse_directives(stream, false)?;
        return Ok(Selection::FragmentSpread(FragmentSpread {
            fragment_name,
            directives,
            span: stream.span_from(start),
        }));
    }

    let type_condition = if stream.consume_keyword("on") {
        Some(stream.expect_name()?)
    } else {
        None
    };
    let directives = parse_directives(stream, false)?;
    let selection_set = parse_selection_set(stream)?;
    Ok(Selection::InlineFragment(InlineFragment {
        type_condition,
        directives,
        selection_set,
        span: stream.span_from(start),
    }))
}

fn parse_field(stream: &mut TokenStream<'_>) -> ParseResult<Field> {
    let first = stream.expect_name()?;
    let (alias, name) = if stream.consume(&TokenKind::Colon) {
        (Some(first), stream.expect_name()?)
    } else {
        (None, first)
    };
    let start = alias.as_ref().unwrap_or(&name).span.start;
    let arguments = parse_arguments(stream, false)?;
    let directives = parse_directives(stream, false)?;
    let selection_set = if stream.check(&TokenKind::LBrace) {
        Some(parse_selection_set(stream)?)
    } else {
        None
    };

    Ok(Field {
        alias,
        name,
        arguments,
        directives,
        selection_set,
        span: stream.span_from(start),
    })
}
