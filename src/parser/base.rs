//! Shared parser infrastructure for token stream navigation and error handling.
//!
//! Every grammar module works on a `&mut TokenStream` rather than keeping its
//! own cursor.

use smol_str::SmolStr;

use crate::ast::{Span, Spanned};
use crate::diag::Diag;
use crate::lexer::token::{Token, TokenKind};

/// Common error type for parsing operations.
pub type ParseError = Box<Diag>;

/// Common result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Token stream navigator providing common operations for all parsers.
pub struct TokenStream<'a> {
    tokens: &'a [Token],
    pos: usize,
    eof: Token,
}

impl<'a> TokenStream<'a> {
    /// Creates a new token stream from a token slice.
    ///
    /// `end` is the source length, used for the end-of-input token when the
    /// slice does not already end with one.
    pub fn new(tokens: &'a [Token], end: usize) -> Self {
        Self {
            tokens,
            pos: 0,
            eof: Token::new(TokenKind::Eof, end..end),
        }
    }

    /// Returns the current token, or the end-of-input token past the end.
    pub fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&self.eof)
    }

    /// Returns the next token without consuming the current one.
    pub fn peek(&self) -> &Token {
        self.tokens.get(self.pos + 1).unwrap_or(&self.eof)
    }

    /// Advances to the next token and returns the one just consumed.
    ///
    /// Does nothing if already at end of input.
    pub fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if !self.is_eof() {
            self.pos += 1;
        }
        token
    }

    /// Returns true at end of input.
    pub fn is_eof(&self) -> bool {
        matches!(self.current().kind, TokenKind::Eof)
    }

    /// Checks if the current token matches the given kind.
    pub fn check(&self, kind: &TokenKind) -> bool {
        &self.current().kind == kind
    }

    /// Checks if the current token is the name `keyword`.
    pub fn check_keyword(&self, keyword: &str) -> bool {
        self.current().kind.is_name(keyword)
    }

    /// Consumes the current token if it matches the given kind.
    ///
    /// Returns `true` if the token was consumed, `false` otherwise.
    pub fn consume(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consumes the name `keyword` if it is the current token.
    pub fn consume_keyword(&mut self, keyword: &str) -> bool {
        if self.check_keyword(keyword) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Expects a specific token kind and returns its span.
    pub fn expect(&mut self, kind: TokenKind) -> ParseResult<Span> {
        if self.check(&kind) {
            Ok(self.advance().span)
        } else {
            Err(self.error_here(format!("expected {kind}, found {}", self.current().kind)))
        }
    }

    /// Expects the name `keyword` and returns its span.
    pub fn expect_keyword(&mut self, keyword: &str) -> ParseResult<Span> {
        if self.check_keyword(keyword) {
            Ok(self.advance().span)
        } else {
            Err(self.error_here(format!(
                "expected '{keyword}', found {}",
                self.current().kind
            )))
        }
    }

    /// Expects any name.
    pub fn expect_name(&mut self) -> ParseResult<Spanned<SmolStr>> {
        match &self.current().kind {
            TokenKind::Name(name) => {
                let name = name.clone();
                let span = self.advance().span;
                Ok(Spanned::new(name, span))
            }
            other => Err(self.error_here(format!("expected name, found {other}"))),
        }
    }

    /// Creates an error at the current token position.
    pub fn error_here(&self, message: impl Into<String>) -> ParseError {
        self.error_here_with_code(message, "P001")
    }

    /// Creates an error at the current token position with a specific error code.
    pub fn error_here_with_code(&self, message: impl Into<String>, code: &str) -> ParseError {
        Box::new(
            Diag::error(message.into())
                .with_primary_label(self.current().span.clone(), "here")
                .with_code(code),
        )
    }

    /// Returns the span of the previous token (useful after consuming a token).
    pub fn previous_span(&self) -> Span {
        match self.pos.checked_sub(1).and_then(|prev| self.tokens.get(prev)) {
            Some(token) => token.span.clone(),
            None => self.current().span.clone(),
        }
    }

    /// Returns the span from `start` to the end of the previous token.
    pub fn span_from(&self, start: usize) -> Span {
        start..self.previous_span().end.max(start)
    }

    /// Returns the current position in the token stream.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Returns a reference to the underlying token slice.
    pub fn tokens(&self) -> &'a [Token] {
        self.tokens
    }
}

/// Parses a delimited, non-empty list: `open item+ close`.
pub fn parse_many<T>(
    stream: &mut TokenStream<'_>,
    open: TokenKind,
    close: TokenKind,
    mut item: impl FnMut(&mut TokenStream<'_>) -> ParseResult<T>,
) -> ParseResult<Vec<T>> {
    stream.expect(open)?;
    let mut items = vec![item(stream)?];
    while !stream.consume(&close) {
        if stream.is_eof() {
            return Err(stream.error_here(format!("expected {close}, found end of input")));
        }
        items.push(item(stream)?);
    }
    Ok(items)
}

/// Parses an optional delimited list; absent when `open` is not the current token.
pub fn parse_optional_many<T>(
    stream: &mut TokenStream<'_>,
    open: TokenKind,
    close: TokenKind,
    item: impl FnMut(&mut TokenStream<'_>) -> ParseResult<T>,
) -> ParseResult<Vec<T>> {
    if stream.check(&open) {
        parse_many(stream, open, close, item)
    } else {
        Ok(Vec::new())
    }
}

/// Merges two spans into a single span covering both.
pub fn merge_spans(start: &Span, end: &Span) -> Span {
    start.start..end.end
}
