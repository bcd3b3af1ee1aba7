//! Type system definitions (SDL).

use smol_str::SmolStr;

use crate::ast::{
    DirectiveDefinition, EnumValueDefinition, FieldDefinition, InputValueDefinition,
    SchemaDefinition, Spanned, TypeDefinition, TypeDefinitionKind, TypeSystemDefinition,
};
use crate::lexer::token::TokenKind;
use crate::parser::base::{ParseResult, TokenStream, parse_many};
use crate::parser::executable::operation_type;
use crate::parser::value::{parse_directives, parse_parenthesized, parse_type_ref, parse_value};

/// Keywords that begin a type system definition.
pub const TYPE_SYSTEM_KEYWORDS: &[&str] = &[
    "schema",
    "scalar",
    "type",
    "interface",
    "union",
    "enum",
    "input",
    "directive",
    "extend",
];

/// Returns true if the current token can begin a type system definition.
pub fn at_type_system_definition(stream: &TokenStream<'_>) -> bool {
    match &stream.current().kind {
        TokenKind::StringValue(_) | TokenKind::BlockStringValue(_) => true,
        TokenKind::Name(name) => TYPE_SYSTEM_KEYWORDS.contains(&name.as_str()),
        _ => false,
    }
}

/// Parses one type system definition or extension.
pub fn parse_type_system_definition(
    stream: &mut TokenStream<'_>,
) -> ParseResult<TypeSystemDefinition> {
    let start = stream.current().span.start;
    let description = parse_description(stream);
    let extend = description.is_none() && stream.consume_keyword("extend");

    let keyword = match &stream.current().kind {
        TokenKind::Name(name) => name.clone(),
        other => {
            return Err(stream.error_here(format!(
                "expected a type system definition, found {other}"
            )));
        }
    };

    match keyword.as_str() {
        "schema" => parse_schema_definition(stream, start, extend).map(TypeSystemDefinition::Schema),
        "directive" if !extend => {
            parse_directive_definition(stream, start, description).map(TypeSystemDefinition::Directive)
        }
        "scalar" | "type" | "interface" | "union" | "enum" | "input" => {
            parse_type_definition(stream, start, extend, description).map(TypeSystemDefinition::Type)
        }
        _ => Err(stream.error_here(format!("unexpected name '{keyword}'"))),
    }
}

fn parse_description(stream: &mut TokenStream<'_>) -> Option<String> {
    match &stream.current().kind {
        TokenKind::StringValue(text) | TokenKind::BlockStringValue(text) => {
            let text = text.clone();
            stream.advance();
            Some(text)
        }
        _ => None,
    }
}

fn parse_schema_definition(
    stream: &mut TokenStream<'_>,
    start: usize,
    extend: bool,
) -> ParseResult<SchemaDefinition> {
    stream.expect_keyword("schema")?;
    let directives = parse_directives(stream, true)?;
    let root_operations = if extend && !stream.check(&TokenKind::LBrace) {
        Vec::new()
    } else {
        parse_many(stream, TokenKind::LBrace, TokenKind::RBrace, |stream| {
            let keyword = stream.expect_name()?;
            let operation = operation_type(&keyword.node).ok_or_else(|| {
                stream.error_here(format!(
                    "expected 'query', 'mutation' or 'subscription', found '{}'",
                    keyword.node
                ))
            })?;
            stream.expect(TokenKind::Colon)?;
            Ok((operation, stream.expect_name()?))
        })?
    };

    Ok(SchemaDefinition {
        extend,
        directives,
        root_operations,
        span: stream.span_from(start),
    })
}

fn parse_type_definition(
    stream: &mut TokenStream<'_>,
    start: usize,
    extend: bool,
    description: Option<String>,
) -> ParseResult<TypeDefinition> {
    let keyword = stream.expect_name()?;
    let name = stream.expect_name()?;

    let (kind, directives) = match keyword.node.as_str() {
        "scalar" => (TypeDefinitionKind::Scalar, parse_directives(stream, true)?),
        "type" | "interface" => {
            let implements = parse_implements(stream)?;
            let directives = parse_directives(stream, true)?;
            let fields = parse_optional_block(stream, parse_field_definition)?;
            let kind = if keyword.node == "type" {
                TypeDefinitionKind::Object { implements, fields }
            } else {
                TypeDefinitionKind::Interface { implements, fields }
            };
            (kind, directives)
        }
        "union" => {
            let directives = parse_directives(stream, true)?;
            let mut members = Vec::new();
            if stream.consume(&TokenKind::Equals) {
                stream.consume(&TokenKind::Pipe);
                members.push(stream.expect_name()?);
                while stream.consume(&TokenKind::Pipe) {
                    members.push(stream.expect_name()?);
                }
            }
            (TypeDefinitionKind::Union { members }, directives)
        }
        "enum" => {
            let directives = parse_directives(stream, true)?;
            let values = parse_optional_block(stream, parse_enum_value_definition)?;
            (TypeDefinitionKind::Enum { values }, directives)
        }
        _ => {
            let directives = parse_directives(stream, true)?;
            let fields = parse_optional_block(stream, parse_input_value_definition)?;
            (TypeDefinitionKind::InputObject { fields }, directives)
        }
    };

    Ok(TypeDefinition {
        extend,
        description,
        name,
        directives,
        kind,
        span: stream.span_from(start),
    })
}

fn parse_optional_block<T>(
    stream: &mut TokenStream<'_>,
    item: impl FnMut(&mut TokenStream<'_>) -> ParseResult<T>,
) -> ParseResult<Vec<T>> {
    if stream.check(&TokenKind::LBrace) {
        parse_many(stream, TokenKind::LBrace, TokenKind::RBrace, item)
    } else {
        Ok(Vec::new())
    }
}

fn parse_implements(stream: &mut TokenStream<'_>) -> ParseResult<Vec<Spanned<SmolStr>>> {
    let mut interfaces = Vec::new();
    if stream.consume_keyword("implements") {
        stream.consume(&TokenKind::Amp);
        interfaces.push(stream.expect_name()?);
        while stream.consume(&TokenKind::Amp) {
            interfaces.push(stream.expect_name()?);
        }
    }
    Ok(interfaces)
}

fn parse_field_definition(stream: &mut TokenStream<'_>) -> ParseResult<FieldDefinition> {
    let start = stream.current().span.start;
    let description = parse_description(stream);
    let name = stream.expect_name()?;
    let arguments = if stream.check(&TokenKind::LParen) {
        parse_parenthesized(stream, parse_input_value_definition)?
    } else {
        Vec::new()
    };
    stream.expect(TokenKind::Colon)?;
    let ty = parse_type_ref(stream)?;
    let directives = parse_directives(stream, true)?;

    Ok(FieldDefinition {
        description,
        name,
        arguments,
        ty,
        directives,
        span: stream.span_from(start),
    })
}

fn parse_input_value_definition(stream: &mut TokenStream<'_>) -> ParseResult<InputValueDefinition> {
    let start = stream.current().span.start;
    let description = parse_description(stream);
    let name = stream.expect_name()?;
    stream.expect(TokenKind::Colon)?;
    let ty = parse_type_ref(stream)?;
    let default_value = if stream.consume(&TokenKind::Equals) {
        Some(parse_value(stream, true)?)
    } else {
        None
    };
    let directives = parse_directives(stream, true)?;

    Ok(InputValueDefinition {
        description,
        name,
        ty,
        default_value,
        directives,
        span: stream.span_from(start),
    })
}

fn parse_enum_value_definition(stream: &mut TokenStream<'_>) -> ParseResult<EnumValueDefinition> {
    let start = stream.current().span.start;
    let description = parse_description(stream);
    let name = stream.expect_name()?;
    if matches!(name.node.as_str(), "true" | "false" | "null") {
        return Err(Box::new(
            crate::diag::Diag::error(format!("'{}' is reserved and cannot be an enum value", name.node))
                .with_primary_label(name.span.clone(), "here")
                .with_code("P001"),
        ));
    }
    let directives = parse_directives(stream, true)?;

    Ok(EnumValueDefinition {
        description,
        name,
        directives,
        span: stream.span_from(start),
    })
}

fn parse_directive_definition(
    stream: &mut TokenStream<'_>,
    start: usize,
    description: Option<String>,
) -> ParseResult<DirectiveDefinition> {
    stream.expect_keyword("directive")?;
    let at = stream.expect(TokenKind::At)?;
    let name = stream.expect_name()?;
    let name = Spanned::new(name.node, at.start..name.span.end);
    let arguments = if stream.check(&TokenKind::LParen) {
        parse_parenthesized(stream, parse_input_value_definition)?
    } else {
        Vec::new()
    };
    let repeatable = stream.consume_keyword("repeatable");
    stream.expect_keyword("on")?;
    stream.consume(&TokenKind::Pipe);
    let mut locations = vec![stream.expect_name()?];
    while stream.consume(&TokenKind::Pipe) {
        locations.push(stream.expect_name()?);
    }

    Ok(DirectiveDefinition {
        description,
        name,
        arguments,
        repeatable,
        locations,
        span: stream.span_from(start),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::TypeRef;
    use crate::lexer::tokenize;

    fn definition(source: &str) -> ParseResult<TypeSystemDefinition> {
        let tokens = tokenize(source).tokens;
        let mut stream = TokenStream::new(&tokens, source.len());
        parse_type_system_definition(&mut stream)
    }

    #[test]
    fn object_type_with_interfaces_and_arguments() {
        let parsed = definition(
            r#""A good boy" type Dog implements & Pet & Canine @key {
                name(surname: Boolean = false): String!
                friends: [Dog]
            }"#,
        )
        .expect("definition");
        let TypeSystemDefinition::Type(ty) = parsed else {
            panic!("expected type definition");
        };
        assert_eq!(ty.description.as_deref(), Some("A good boy"));
        assert_eq!(ty.name.node, "Dog");
        assert_eq!(ty.directives.len(), 1);
        let TypeDefinitionKind::Object { implements, fields } = &ty.kind else {
            panic!("expected object kind");
        };
        assert_eq!(implements.len(), 2);
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].arguments[0].name.node, "surname");
        assert!(fields[0].arguments[0].default_value.is_some());
        assert_eq!(fields[1].ty.node, TypeRef::named("Dog").list());
    }

    #[test]
    fn union_with_leading_pipe() {
        let parsed = definition("union CatOrDog = | Cat | Dog").expect("definition");
        let TypeSystemDefinition::Type(ty) = parsed else {
            panic!("expected type definition");
        };
        let TypeDefinitionKind::Union { members } = &ty.kind else {
            panic!("expected union kind");
        };
        let names: Vec<_> = members.iter().map(|m| m.node.as_str()).collect();
        assert_eq!(names, vec!["Cat", "Dog"]);
    }

    #[test]
    fn directive_definition() {
        let parsed = definition("directive @cached(ttl: Int) repeatable on FIELD | QUERY")
            .expect("definition");
        let TypeSystemDefinition::Directive(directive) = parsed else {
            panic!("expected directive definition");
        };
        assert_eq!(directive.name.node, "cached");
        assert!(directive.repeatable);
        assert_eq!(directive.locations.len(), 2);
    }

    #[test]
    fn schema_and_extensions() {
        let parsed = definition("schema { query: Q mutation: M }").expect("definition");
        let TypeSystemDefinition::Schema(schema) = parsed else {
            panic!("expected schema definition");
        };
        assert_eq!(schema.root_operations.len(), 2);
        assert!(!schema.extend);

        let parsed = definition("extend type Dog { age: Int }").expect("definition");
        let TypeSystemDefinition::Type(ty) = parsed else {
            panic!("expected type definition");
        };
        assert!(ty.extend);
    }

    #[test]
    fn enum_values_cannot_be_literals() {
        assert!(definition("enum E { A true }").is_err());
        assert!(definition("enum E { A B }").is_ok());
    }
}
