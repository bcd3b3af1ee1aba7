//! Values, type references, arguments and directives.
//!
//! These productions are shared by executable documents and SDL.

use crate::ast::{Argument, Directive, ObjectField, Spanned, TypeRef, Value};
use crate::lexer::token::TokenKind;
use crate::parser::base::{ParseResult, TokenStream, merge_spans, parse_many, parse_optional_many};

/// Parses a value literal. With `is_const`, variables are rejected.
pub fn parse_value(stream: &mut TokenStream<'_>, is_const: bool) -> ParseResult<Spanned<Value>> {
    let token = stream.current().clone();
    let start = token.span.start;

    let value = match token.kind {
        TokenKind::Dollar => {
            if is_const {
                return Err(stream.error_here("unexpected variable in constant value"));
            }
            stream.advance();
            let name = stream.expect_name()?;
            return Ok(Spanned::new(
                Value::Variable(name.node),
                merge_spans(&token.span, &name.span),
            ));
        }
        TokenKind::IntValue(raw) => {
            stream.advance();
            Value::Int(raw)
        }
        TokenKind::FloatValue(raw) => {
            stream.advance();
            Value::Float(raw)
        }
        TokenKind::StringValue(value) | TokenKind::BlockStringValue(value) => {
            stream.advance();
            Value::String(value)
        }
        TokenKind::Name(name) => {
            stream.advance();
            match name.as_str() {
                "true" => Value::Boolean(true),
                "false" => Value::Boolean(false),
                "null" => Value::Null,
                _ => Value::Enum(name),
            }
        }
        TokenKind::LBracket => {
            stream.advance();
            let mut items = Vec::new();
            while !stream.consume(&TokenKind::RBracket) {
                if stream.is_eof() {
                    return Err(stream.error_here("expected ']', found end of input"));
                }
                items.push(parse_value(stream, is_const)?);
            }
            Value::List(items)
        }
        TokenKind::LBrace => {
            stream.advance();
            let mut fields = Vec::new();
            while !stream.consume(&TokenKind::RBrace) {
                if stream.is_eof() {
                    return Err(stream.error_here("expected '}', found end of input"));
                }
                fields.push(parse_object_field(stream, is_const)?);
            }
            Value::Object(fields)
        }
        other => return Err(stream.error_here(format!("expected value, found {other}"))),
    };

    Ok(Spanned::new(value, stream.span_from(start)))
}

fn parse_object_field(stream: &mut TokenStream<'_>, is_const: bool) -> ParseResult<ObjectField> {
    let name = stream.expect_name()?;
    stream.expect(TokenKind::Colon)?;
    let value = parse_value(stream, is_const)?;
    let span = merge_spans(&name.span, &value.span);
    Ok(ObjectField { name, value, span })
}

/// Parses a type reference such as `[String!]!`.
pub fn parse_type_ref(stream: &mut TokenStream<'_>) -> ParseResult<Spanned<TypeRef>> {
    let start = stream.current().span.start;
    let ty = if stream.consume(&TokenKind::LBracket) {
        let inner = parse_type_ref(stream)?;
        stream.expect(TokenKind::RBracket)?;
        inner.node.list()
    } else {
        TypeRef::Named(stream.expect_name()?.node)
    };
    let ty = if stream.consume(&TokenKind::Bang) {
        TypeRef::NonNull(Box::new(ty))
    } else {
        ty
    };
    Ok(Spanned::new(ty, stream.span_from(start)))
}

/// Parses an optional `( name: value ... )` argument list.
pub fn parse_arguments(stream: &mut TokenStream<'_>, is_const: bool) -> ParseResult<Vec<Argument>> {
    parse_optional_many(stream, TokenKind::LParen, TokenKind::RParen, |stream| {
        let name = stream.expect_name()?;
        stream.expect(TokenKind::Colon)?;
        let value = parse_value(stream, is_const)?;
        let span = merge_spans(&name.span, &value.span);
        Ok(Argument { name, value, span })
    })
}

/// Parses zero or more `@name(args)` directives.
pub fn parse_directives(stream: &mut TokenStream<'_>, is_const: bool) -> ParseResult<Vec<Directive>> {
    let mut directives = Vec::new();
    while stream.check(&TokenKind::At) {
        let start = stream.advance().span.start;
        let name = stream.expect_name()?;
        let arguments = parse_arguments(stream, is_const)?;
        directives.push(Directive {
            name,
            arguments,
            span: stream.span_from(start),
        });
    }
    Ok(directives)
}

/// Parses a non-empty `( ... )` list whose items are parsed by `item`.
pub fn parse_parenthesized<T>(
    stream: &mut TokenStream<'_>,
    item: impl FnMut(&mut TokenStream<'_>) -> ParseResult<T>,
) -> ParseResult<Vec<T>> {
    parse_many(stream, TokenKind::LParen, TokenKind::RParen, item)
}
