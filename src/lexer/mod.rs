//! Lexical analysis for GraphQL.
//!
//! Token recognition is generated by `logos`; this module wraps it in an
//! error-tolerant driver that keeps scanning after bad input and reports
//! every problem as a [`Diag`].

pub mod token;

use crate::diag::Diag;
use logos::Logos;
use token::{LexError, Token, TokenKind};

/// Result of lexical analysis.
///
/// Contains both the tokens produced and any diagnostics encountered during scanning.
#[derive(Debug, Clone, PartialEq)]
pub struct LexerResult {
    /// The tokens produced, including an EOF token at the end.
    pub tokens: Vec<Token>,
    /// Diagnostics (errors, warnings) encountered during lexing.
    pub diagnostics: Vec<Diag>,
}

/// A lexical analyzer for GraphQL source text.
pub struct Lexer<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    diagnostics: Vec<Diag>,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given source text.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            tokens: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Tokenizes the source text and returns the result.
    ///
    /// This consumes the lexer and returns both tokens and diagnostics.
    pub fn tokenize(mut self) -> LexerResult {
        let mut scanner = TokenKind::lexer(self.source);

        while let Some(next) = scanner.next() {
            let span = scanner.span();
            match next {
                Ok(kind) => self.tokens.push(Token::new(kind, span)),
                Err(err) => self.report(err, span),
            }
        }

        let eof_pos = self.source.len();
        self.tokens.push(Token::new(TokenKind::Eof, eof_pos..eof_pos));

        LexerResult {
            tokens: self.tokens,
            diagnostics: self.diagnostics,
        }
    }

    fn report(&mut self, err: LexError, span: std::ops::Range<usize>) {
        let diag = match err {
            LexError::UnexpectedCharacter => {
                let text = &self.source[span.clone()];
                let message = if text.starts_with('"') {
                    "unterminated string".to_string()
                } else if text.starts_with('.') {
                    "unexpected '.', did you mean '...'?".to_string()
                } else {
                    format!("unexpected character '{}'", text.escape_debug())
                };
                Diag::error(message)
                    .with_primary_label(span, "here")
                    .with_code("L001")
            }
            LexError::InvalidEscape(escape) => {
                Diag::error(format!("invalid escape sequence '{escape}'"))
                    .with_primary_label(span, "in this string")
                    .with_help(r#"valid escapes are \" \\ \/ \b \f \n \r \t and \uXXXX"#)
                    .with_code("L002")
            }
            LexError::InvalidUnicodeEscape(hex) => {
                Diag::error(format!("invalid unicode escape sequence '\\u{hex}'"))
                    .with_primary_label(span, "in this string")
                    .with_code("L002")
            }
            LexError::UnterminatedBlockString => Diag::error("unterminated block string")
                .with_primary_label(span.start..span.start + 3, "opened here")
                .with_code("L002"),
        };
        self.diagnostics.push(diag);
    }
}

/// Convenience function to tokenize source text.
///
/// This is equivalent to `Lexer::new(source).tokenize()`.
pub fn tokenize(source: &str) -> LexerResult {
    Lexer::new(source).tokenize()
}
