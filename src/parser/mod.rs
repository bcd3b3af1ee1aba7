//! Parser infrastructure for GraphQL documents.
//!
//! The parser consumes the token stream produced by the lexer and builds a
//! [`Document`]. A syntax error inside one definition is recorded and the
//! parser resynchronizes at the next definition, so a single run reports
//! every broken definition.

pub mod base;
pub mod executable;
pub mod type_system;
pub mod value;

use crate::ast::{Definition, Document, TypeSystemDefinition};
use crate::diag::{Diag, SourceFile, convert_diagnostics_to_reports, has_errors};
use crate::lexer::token::{Token, TokenKind};
use base::TokenStream;
use miette::Report;

/// Result of parsing a GraphQL document.
#[derive(Debug)]
pub struct ParseResult {
    /// The parsed document, or None if nothing could be parsed.
    pub ast: Option<Document>,
    /// All collected diagnostics rendered as miette reports.
    pub diagnostics: Vec<Report>,
}

impl ParseResult {
    /// Returns true when parsing produced a document and no diagnostics.
    pub fn is_clean(&self) -> bool {
        self.ast.is_some() && self.diagnostics.is_empty()
    }
}

/// GraphQL parser with error recovery.
pub struct Parser<'source> {
    tokens: Vec<Token>,
    diagnostics: Vec<Diag>,
    source: &'source str,
}

impl<'source> Parser<'source> {
    /// Creates a new parser from a token stream.
    pub fn new(mut tokens: Vec<Token>, source: &'source str) -> Self {
        if !matches!(tokens.last().map(|t| &t.kind), Some(TokenKind::Eof)) {
            let eof_pos = tokens.last().map(|t| t.span.end).unwrap_or(0);
            tokens.push(Token::new(TokenKind::Eof, eof_pos..eof_pos));
        }

        Self {
            tokens,
            diagnostics: Vec::new(),
            source,
        }
    }

    /// Merges lexer diagnostics with parser diagnostics.
    pub fn with_lexer_diagnostics(mut self, lex_diags: Vec<Diag>) -> Self {
        let mut all_diags = lex_diags;
        all_diags.append(&mut self.diagnostics);
        self.diagnostics = all_diags;
        self
    }

    /// Parses an executable document.
    ///
    /// Type system definitions are accepted and kept as
    /// [`Definition::TypeSystem`]; validation rejects them.
    pub fn parse(mut self) -> ParseResult {
        let definitions = self.parse_definitions(|stream| {
            if stream.check(&TokenKind::LBrace) {
                return executable::parse_operation(stream).map(Definition::Operation);
            }
            if stream.check_keyword("fragment") {
                return executable::parse_fragment_definition(stream).map(Definition::Fragment);
            }
            if matches!(&stream.current().kind, TokenKind::Name(name) if executable::operation_type(name).is_some())
            {
                return executable::parse_operation(stream).map(Definition::Operation);
            }
            if type_system::at_type_system_definition(stream) {
                return type_system::parse_type_system_definition(stream)
                    .map(Definition::TypeSystem);
            }
            Err(stream.error_here(format!(
                "expected an operation or fragment, found {}",
                stream.current().kind
            )))
        });

        let ast = if definitions.is_empty() && has_errors(&self.diagnostics) {
            None
        } else {
            Some(Document::new(definitions, self.source))
        };

        let source = SourceFile::new(self.source);
        ParseResult {
            ast,
            diagnostics: convert_diagnostics_to_reports(&self.diagnostics, &source),
        }
    }

    /// Parses a type system document, returning the definitions and the raw
    /// diagnostics.
    pub fn parse_type_system(mut self) -> (Vec<TypeSystemDefinition>, Vec<Diag>) {
        let definitions = self.parse_definitions(|stream| {
            if type_system::at_type_system_definition(stream) {
                type_system::parse_type_system_definition(stream)
            } else {
                Err(stream.error_here(format!(
                    "expected a type system definition, found {}",
                    stream.current().kind
                )))
            }
        });
        (definitions, self.diagnostics)
    }

    fn parse_definitions<T>(
        &mut self,
        mut definition: impl FnMut(&mut TokenStream<'_>) -> base::ParseResult<T>,
    ) -> Vec<T> {
        let mut stream = TokenStream::new(&self.tokens, self.source.len());
        let mut definitions = Vec::new();

        if stream.is_eof() {
            self.diagnostics.push(
                Diag::error("a document must contain at least one definition")
                    .with_primary_label(stream.current().span.clone(), "here")
                    .with_code("P002"),
            );
            return definitions;
        }

        while !stream.is_eof() {
            let before = stream.position();
            match definition(&mut stream) {
                Ok(parsed) => definitions.push(parsed),
                Err(diag) => {
                    self.diagnostics.push(*diag);
                    synchronize(&mut stream, before);
                }
            }
        }

        definitions
    }
}

/// Skips to the next token that can start a top-level definition.
///
/// A definition start is only trusted at brace depth zero, counted from the
/// start of the failed definition.
fn synchronize(stream: &mut TokenStream<'_>, definition_start: usize) {
    let mut depth = 0i64;
    let tokens = stream.tokens();
    for token in &tokens[definition_start.min(tokens.len())..stream.position()] {
        match token.kind {
            TokenKind::LBrace => depth += 1,
            TokenKind::RBrace => depth -= 1,
            _ => {}
        }
    }

    if stream.position() == definition_start {
        stream.advance();
    }

    while !stream.is_eof() {
        match &stream.current().kind {
            TokenKind::LBrace if depth <= 0 => return,
            TokenKind::Name(name) if depth <= 0 && is_definition_keyword(name) => return,
            TokenKind::LBrace => depth += 1,
            TokenKind::RBrace => depth -= 1,
            _ => {}
        }
        stream.advance();
    }
}

fn is_definition_keyword(name: &str) -> bool {
    executable::operation_type(name).is_some()
        || name == "fragment"
        || type_system::TYPE_SYSTEM_KEYWORDS.contains(&name)
}

/// Parses a GraphQL executable document.
pub fn parse(source: &str) -> ParseResult {
    let lex_result = crate::lexer::tokenize(source);
    Parser::new(lex_result.tokens, source)
        .with_lexer_diagnostics(lex_result.diagnostics)
        .parse()
}

/// Parses a type system (SDL) document.
pub fn parse_type_system(source: &str) -> (Vec<TypeSystemDefinition>, Vec<Diag>) {
    let lex_result = crate::lexer::tokenize(source);
    Parser::new(lex_result.tokens, source)
        .with_lexer_diagnostics(lex_result.diagnostics)
        .parse_type_system()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{AssertUnwindSafe, catch_unwind};

    #[test]
    fn parser_creation_normalizes_missing_eof() {
        let tokens = vec![Token::new(TokenKind::LBrace, 0..1)];
        let parser = Parser::new(tokens, "{");
        assert_eq!(parser.tokens.len(), 2);
        assert_eq!(parser.tokens[1].kind, TokenKind::Eof);
    }

    #[test]
    fn empty_document_is_an_error() {
        let result = parse("  # nothing here\n");
        assert!(result.ast.is_none());
        assert_eq!(result.diagnostics.len(), 1);
    }

    #[test]
    fn mixed_document() {
        let result = parse("query A { a } fragment F on T { b } type T { b: Int } { c }");
        assert!(result.diagnostics.is_empty());
        let document = result.ast.expect("document");
        assert_eq!(document.definitions.len(), 4);
        assert_eq!(document.operations().count(), 2);
        assert_eq!(document.fragments().count(), 1);
        assert!(matches!(document.definitions[2], Definition::TypeSystem(_)));
    }

    #[test]
    fn recovers_at_next_definition() {
        let result = parse("query A { a( } query B { b } fragment F on T { c }");
        assert_eq!(result.diagnostics.len(), 1);
        let document = result.ast.expect("partial document");
        let names: Vec<_> = document
            .definitions
            .iter()
            .map(|d| match d {
                Definition::Operation(op) => op.name_str().unwrap_or("").to_string(),
                Definition::Fragment(f) => f.name.node.to_string(),
                Definition::TypeSystem(t) => t.display_name().to_string(),
            })
            .collect();
        assert_eq!(names, vec!["B", "F"]);
    }

    #[test]
    fn lexer_diagnostics_come_first() {
        let result = parse("{ a ? } query {");
        assert_eq!(result.diagnostics.len(), 2);
        assert!(result.diagnostics[0].to_string().contains("unexpected character"));
    }

    #[test]
    fn type_system_document() {
        let (definitions, diagnostics) = parse_type_system("type Query { a: Int } scalar Date");
        assert!(diagnostics.is_empty());
        assert_eq!(definitions.len(), 2);

        let (_, diagnostics) = parse_type_system("{ a }");
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn parser_never_panics_on_random_inputs() {
        const PIECES: &[&str] = &[
            "{", "}", "(", ")", "query", "fragment", "on", "...", "$", ":", "=", "@", "[", "]",
            "x", "1", "\"s\"", "!", "type", "|",
        ];

        let mut seed = 0xC0FFEE_u64;
        for _ in 0..2_000 {
            seed = seed
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            let count = (seed % 24) as usize;
            let mut source = String::new();
            for _ in 0..count {
                seed = seed
                    .wrapping_mul(6364136223846793005)
                    .wrapping_add(1442695040888963407);
                source.push_str(PIECES[(seed >> 33) as usize % PIECES.len()]);
                source.push(' ');
            }

            let result = catch_unwind(AssertUnwindSafe(|| parse(&source)));
            assert!(result.is_ok(), "parser panicked on `{source}`");
        }
    }
}
