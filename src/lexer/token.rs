//! Token types and representations for GraphQL lexical analysis.

use crate::ast::Span;
use logos::Logos;
use smol_str::SmolStr;
use std::fmt;

/// Errors produced by token callbacks.
///
/// Anything the patterns do not match at all surfaces as
/// [`LexError::UnexpectedCharacter`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LexError {
    /// A character that cannot start any token.
    #[default]
    UnexpectedCharacter,
    /// A `\` escape that GraphQL does not define.
    InvalidEscape(String),
    /// A `\u` escape that does not name a Unicode scalar value.
    InvalidUnicodeEscape(String),
    /// A block string without its closing `"""`.
    UnterminatedBlockString,
}

/// The kind of a lexical token in GraphQL.
///
/// Whitespace, line terminators, commas, the byte order mark and `#` comments
/// are insignificant and never produce tokens.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(error = LexError)]
#[logos(skip r"[ \t\r\n,\u{FEFF}]+")]
#[logos(skip r"#[^\r\n]*")]
pub enum TokenKind {
    // Punctuators
    #[token("!")]
    Bang,
    #[token("$")]
    Dollar,
    #[token("&")]
    Amp,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("...")]
    Spread,
    #[token(":")]
    Colon,
    #[token("=")]
    Equals,
    #[token("@")]
    At,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("|")]
    Pipe,
    #[token("}")]
    RBrace,

    /// A name. GraphQL has no reserved words; `query`, `on`, `true` and so on
    /// are names whose meaning depends on position.
    #[regex("[_A-Za-z][_0-9A-Za-z]*", |lex| SmolStr::new(lex.slice()))]
    Name(SmolStr),

    /// An integer literal, kept as written.
    #[regex("-?(0|[1-9][0-9]*)", |lex| SmolStr::new(lex.slice()))]
    IntValue(SmolStr),

    /// A float literal, kept as written.
    #[regex(
        r"-?(0|[1-9][0-9]*)(\.[0-9]+[eE][+-]?[0-9]+|\.[0-9]+|[eE][+-]?[0-9]+)",
        |lex| SmolStr::new(lex.slice())
    )]
    FloatValue(SmolStr),

    /// A quoted string literal, unescaped.
    #[regex(r#""([^"\\\r\n]|\\[^\r\n])*""#, string_value)]
    StringValue(String),

    /// A `"""` block string, with common indentation removed.
    #[token("\"\"\"", block_string)]
    BlockStringValue(String),

    /// End of input. Never produced by the scanner; appended by [`super::Lexer`].
    Eof,
}

impl TokenKind {
    /// Returns the name text if this is a name token.
    pub fn as_name(&self) -> Option<&SmolStr> {
        match self {
            TokenKind::Name(name) => Some(name),
            _ => None,
        }
    }

    /// Returns true if this is the name `keyword`.
    pub fn is_name(&self, keyword: &str) -> bool {
        matches!(self, TokenKind::Name(name) if name == keyword)
    }
}

fn string_value(lex: &mut logos::Lexer<TokenKind>) -> Result<String, LexError> {
    let slice = lex.slice();
    unescape(&slice[1..slice.len() - 1])
}

fn block_string(lex: &mut logos::Lexer<TokenKind>) -> Result<String, LexError> {
    let remainder = lex.remainder();
    let mut raw = String::new();
    let mut offset = 0;

    while let Some(ch) = remainder[offset..].chars().next() {
        let rest = &remainder[offset..];
        if rest.starts_with("\\\"\"\"") {
            raw.push_str("\"\"\"");
            offset += 4;
        } else if rest.starts_with("\"\"\"") {
            lex.bump(offset + 3);
            return Ok(block_string_value(&raw));
        } else {
            raw.push(ch);
            offset += ch.len_utf8();
        }
    }

    lex.bump(remainder.len());
    Err(LexError::UnterminatedBlockString)
}

/// Resolves the escape sequences of a quoted string body.
fn unescape(body: &str) -> Result<String, LexError> {
    let mut value = String::with_capacity(body.len());
    let mut chars = body.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            value.push(ch);
            continue;
        }
        match chars.next() {
            Some('"') => value.push('"'),
            Some('\\') => value.push('\\'),
            Some('/') => value.push('/'),
            Some('b') => value.push('\u{8}'),
            Some('f') => value.push('\u{c}'),
            Some('n') => value.push('\n'),
            Some('r') => value.push('\r'),
            Some('t') => value.push('\t'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let decoded = (hex.len() == 4)
                    .then(|| u32::from_str_radix(&hex, 16).ok())
                    .flatten()
                    .and_then(char::from_u32);
                match decoded {
                    Some(c) => value.push(c),
                    None => return Err(LexError::InvalidUnicodeEscape(hex)),
                }
            }
            Some(other) => return Err(LexError::InvalidEscape(format!("\\{other}"))),
            None => return Err(LexError::InvalidEscape("\\".to_string())),
        }
    }

    Ok(value)
}

/// Computes the value of a block string from its raw contents: common
/// indentation of all lines but the first is removed, then leading and
/// trailing blank lines are dropped.
pub(crate) fn block_string_value(raw: &str) -> String {
    let lines: Vec<&str> = raw
        .split("\r\n")
        .flat_map(|chunk| chunk.split(['\n', '\r']))
        .collect();

    let common_indent = lines
        .iter()
        .skip(1)
        .filter_map(|line| {
            let indent = line.len() - line.trim_start_matches([' ', '\t']).len();
            (indent < line.len()).then_some(indent)
        })
        .min();

    let mut stripped: Vec<&str> = lines
        .iter()
        .enumerate()
        .map(|(i, line)| match common_indent {
            Some(indent) if i > 0 => line.get(indent..).unwrap_or(""),
            _ => line,
        })
        .collect();

    let is_blank = |line: &&str| line.trim_matches([' ', '\t']).is_empty();
    while stripped.first().is_some_and(is_blank) {
        stripped.remove(0);
    }
    while stripped.last().is_some_and(is_blank) {
        stripped.pop();
    }

    stripped.join("\n")
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Bang => write!(f, "'!'"),
            TokenKind::Dollar => write!(f, "'$'"),
            TokenKind::Amp => write!(f, "'&'"),
            TokenKind::LParen => write!(f, "'('"),
            TokenKind::RParen => write!(f, "')'"),
            TokenKind::Spread => write!(f, "'...'"),
            TokenKind::Colon => write!(f, "':'"),
            TokenKind::Equals => write!(f, "'='"),
            TokenKind::At => write!(f, "'@'"),
            TokenKind::LBracket => write!(f, "'['"),
            TokenKind::RBracket => write!(f, "']'"),
            TokenKind::LBrace => write!(f, "'{{'"),
            TokenKind::Pipe => write!(f, "'|'"),
            TokenKind::RBrace => write!(f, "'}}'"),
            TokenKind::Name(name) => write!(f, "name '{name}'"),
            TokenKind::IntValue(raw) => write!(f, "integer '{raw}'"),
            TokenKind::FloatValue(raw) => write!(f, "float '{raw}'"),
            TokenKind::StringValue(_) => write!(f, "string"),
            TokenKind::BlockStringValue(_) => write!(f, "block string"),
            TokenKind::Eof => write!(f, "end of input"),
        }
    }
}

/// A token with its location in source text.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The span in source text.
    pub span: Span,
}

impl Token {
    /// Creates a new token.
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Returns the source slice covered by this token.
    pub fn slice<'a>(&self, source: &'a str) -> &'a str {
        &source[self.span.clone()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_creation() {
        let token = Token::new(TokenKind::Spread, 0..3);
        assert_eq!(token.kind, TokenKind::Spread);
        assert_eq!(token.span, 0..3);
        assert_eq!(token.slice("...on"), "...");
    }

    #[test]
    fn display_quotes_punctuators() {
        assert_eq!(TokenKind::LBrace.to_string(), "'{'");
        assert_eq!(TokenKind::Name("dog".into()).to_string(), "name 'dog'");
        assert_eq!(TokenKind::Eof.to_string(), "end of input");
    }

    #[test]
    fn unescape_sequences() {
        assert_eq!(unescape(r#"a\"b\\c\/d\n"#).as_deref(), Ok("a\"b\\c/d\n"));
        assert_eq!(unescape(r"é").as_deref(), Ok("é"));
        assert_eq!(
            unescape(r"\x"),
            Err(LexError::InvalidEscape("\\x".to_string()))
        );
        assert!(matches!(
            unescape(r"\uZZZZ"),
            Err(LexError::InvalidUnicodeEscape(_))
        ));
    }

    #[test]
    fn block_string_removes_common_indent() {
        let raw = "\n    Hello,\n      World!\n\n    Yours,\n      GraphQL.\n  ";
        assert_eq!(
            block_string_value(raw),
            "Hello,\n  World!\n\nYours,\n  GraphQL."
        );
    }

    #[test]
    fn block_string_keeps_first_line_indent() {
        assert_eq!(block_string_value("  first\n  second"), "  first\nsecond");
    }
}
