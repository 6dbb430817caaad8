//! Laconic lexer
//!
//! Converts source text into a flat token stream. The stream always starts
//! with a zero-width `Bof` token and ends with a zero-width `Eof` token.
//!
//! Lexical rules, in priority order at each scan position:
//! - spaces, tabs and line breaks (CR, LF, CRLF) are skipped
//! - `#` as the first non-blank character of a line starts a line comment
//! - `//` starts a line comment anywhere
//! - `/* ... */` and `|* ... *|` are block comments
//! - `$"..."` / `$'...'` are verbatim strings (a doubled quote embeds one)
//! - `"..."` / `'...'` are regular strings with backslash escapes
//! - `{`, `}` and `=` are single-character tokens
//! - anything else is a free-form identifier; the identifier `null` is a
//!   null literal

use std::fmt;

use serde::Serialize;

use crate::error::{Error, LexErrorKind, Result};

/// Token kinds produced by the lexer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    Bof,
    Eof,
    Identifier,
    String,
    Null,
    LBrace,
    RBrace,
    Equals,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::Bof => "BOF",
            TokenKind::Eof => "EOF",
            TokenKind::Identifier => "Identifier",
            TokenKind::String => "String",
            TokenKind::Null => "Null",
            TokenKind::LBrace => "LBrace",
            TokenKind::RBrace => "RBrace",
            TokenKind::Equals => "Equals",
        };
        f.write_str(s)
    }
}

/// Position within the source text
///
/// `line` and `column` are 1-based; `offset` is the byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SourcePosition {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// A lexed token
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    /// Token text; for strings this is the decoded content
    pub text: String,
    pub start: SourcePosition,
    pub end: SourcePosition,
}

impl Token {
    fn new(kind: TokenKind, text: impl Into<String>, start: SourcePosition, end: SourcePosition) -> Self {
        Self {
            kind,
            text: text.into(),
            start,
            end,
        }
    }
}

/// Tokenize source text
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    Lexer::new(source).tokenize()
}

/// Lexer over a borrowed source string
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    line: usize,
    column: usize,
    fresh_line: bool,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given input
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
            column: 1,
            fresh_line: true,
        }
    }

    /// Lex the whole input
    pub fn tokenize(mut self) -> Result<Vec<Token>> {
        let start = self.position();
        let mut tokens = vec![Token::new(TokenKind::Bof, "", start, start)];

        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }

        let end = self.position();
        tokens.push(Token::new(TokenKind::Eof, "", end, end));
        log::trace!("lexed {} tokens", tokens.len());
        Ok(tokens)
    }

    fn position(&self) -> SourcePosition {
        SourcePosition {
            line: self.line,
            column: self.column,
            offset: self.pos,
        }
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn current(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek(&self) -> Option<char> {
        let mut chars = self.input[self.pos..].chars();
        chars.next();
        chars.next()
    }

    /// Advance by one character; CRLF counts as a single line break
    fn advance(&mut self) {
        let Some(c) = self.current() else {
            return;
        };
        self.pos += c.len_utf8();
        match c {
            '\r' => {
                if self.current() == Some('\n') {
                    self.pos += 1;
                }
                self.new_line();
            }
            '\n' => self.new_line(),
            ' ' | '\t' => self.column += 1,
            _ => {
                self.column += 1;
                self.fresh_line = false;
            }
        }
    }

    fn new_line(&mut self) {
        self.line += 1;
        self.column = 1;
        self.fresh_line = true;
    }

    fn skip_to_line_end(&mut self) {
        while let Some(c) = self.current() {
            if c == '\r' || c == '\n' {
                break;
            }
            self.advance();
        }
    }

    /// Produce the next significant token, or None at end of input
    fn next_token(&mut self) -> Result<Option<Token>> {
        while let Some(c) = self.current() {
            let next = self.peek();

            match (c, next) {
                (' ' | '\t' | '\r' | '\n', _) => self.advance(),
                ('#', _) if self.fresh_line => self.skip_to_line_end(),
                ('/', Some('/')) => self.skip_to_line_end(),
                ('/', Some('*')) => self.skip_block_comment("*/")?,
                ('|', Some('*')) => self.skip_block_comment("*|")?,
                ('$', Some(q @ ('"' | '\''))) => return self.lex_verbatim_string(q).map(Some),
                ('"' | '\'', _) => return self.lex_string(c).map(Some),
                ('{' | '}' | '=', _) => {
                    let start = self.position();
                    self.advance();
                    let kind = match c {
                        '{' => TokenKind::LBrace,
                        '}' => TokenKind::RBrace,
                        _ => TokenKind::Equals,
                    };
                    return Ok(Some(Token::new(kind, c.to_string(), start, self.position())));
                }
                _ => return self.lex_identifier().map(Some),
            }
        }
        Ok(None)
    }

    fn skip_block_comment(&mut self, terminator: &str) -> Result<()> {
        let start = self.position();
        self.advance();
        self.advance();
        while !self.is_eof() {
            if self.input[self.pos..].starts_with(terminator) {
                self.advance();
                self.advance();
                return Ok(());
            }
            self.advance();
        }
        Err(Error::lex(LexErrorKind::UnterminatedComment, start))
    }

    fn lex_verbatim_string(&mut self, quote: char) -> Result<Token> {
        let start = self.position();
        self.advance(); // $
        self.advance(); // opening quote
        let mut text = String::new();

        while let Some(c) = self.current() {
            if c == quote {
                if self.peek() == Some(quote) {
                    text.push(quote);
                    self.advance();
                    self.advance();
                    continue;
                }
                let end = self.position();
                self.advance();
                return Ok(Token::new(TokenKind::String, text, start, end));
            }
            text.push(c);
            // CRLF is a single advance but two characters of content
            if c == '\r' && self.peek() == Some('\n') {
                text.push('\n');
            }
            self.advance();
        }

        Err(Error::lex(LexErrorKind::UnterminatedVerbatimString, start))
    }

    fn lex_string(&mut self, quote: char) -> Result<Token> {
        let start = self.position();
        self.advance();
        let mut raw = String::new();

        while let Some(c) = self.current() {
            match c {
                '\r' | '\n' => break,
                '\\' => {
                    raw.push(c);
                    self.advance();
                    if let Some(escaped) = self.current() {
                        raw.push(escaped);
                        self.advance();
                    }
                }
                _ if c == quote => {
                    let end = self.position();
                    self.advance();
                    let text = unescape(&raw, start)?;
                    return Ok(Token::new(TokenKind::String, text, start, end));
                }
                _ => {
                    raw.push(c);
                    self.advance();
                }
            }
        }

        Err(Error::lex(LexErrorKind::UnterminatedString, start))
    }

    fn lex_identifier(&mut self) -> Result<Token> {
        let start = self.position();
        let begin = self.pos;

        while let Some(c) = self.current() {
            let next = self.peek();
            let stop = matches!(c, ' ' | '\t' | '\r' | '\n' | '{' | '}' | '=' | '"' | '\'')
                || matches!((c, next), ('/', Some('/' | '*')) | ('|', Some('*')))
                || matches!((c, next), ('$', Some('"' | '\'')));
            if stop {
                break;
            }
            self.advance();
        }

        let text = &self.input[begin..self.pos];
        if text.is_empty() {
            let c = self.current().unwrap_or('\0');
            return Err(Error::lex(LexErrorKind::UnexpectedCharacter(c), start));
        }

        let kind = if text == "null" {
            TokenKind::Null
        } else {
            TokenKind::Identifier
        };
        Ok(Token::new(kind, text, start, self.position()))
    }
}

/// Decode backslash escapes of a regular string
fn unescape(raw: &str, at: SourcePosition) -> Result<String> {
    let invalid = |seq: String| Error::lex(LexErrorKind::InvalidEscape(seq), at);
    let mut result = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }

        let Some(esc) = chars.next() else {
            return Err(invalid(String::new()));
        };
        let decoded = match esc {
            '"' => '"',
            '\'' => '\'',
            '\\' => '\\',
            '0' => '\0',
            'a' => '\u{07}',
            'b' => '\u{08}',
            'f' => '\u{0C}',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'v' => '\u{0B}',
            'u' => {
                let hex: String = chars.by_ref().take(4).collect();
                if hex.len() != 4 || !hex.chars().all(|h| h.is_ascii_hexdigit()) {
                    return Err(invalid(format!("u{}", hex)));
                }
                u32::from_str_radix(&hex, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(|| invalid(format!("u{}", hex)))?
            }
            'x' => {
                let mut hex = String::new();
                while hex.len() < 4 {
                    match chars.peek() {
                        Some(h) if h.is_ascii_hexdigit() => {
                            hex.push(*h);
                            chars.next();
                        }
                        _ => break,
                    }
                }
                if hex.is_empty() {
                    return Err(invalid("x".to_string()));
                }
                u32::from_str_radix(&hex, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(|| invalid(format!("x{}", hex)))?
            }
            other => return Err(invalid(other.to_string())),
        };
        result.push(decoded);
    }

    Ok(result)
}
