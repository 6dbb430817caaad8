//! Laconic parser
//!
//! Recursive descent over the token stream:
//!
//! ```text
//! root    := name ('=' value)? '{' content '}'
//! content := entry*
//! entry   := name ('=' value)? ('{' content '}')?
//! name    := Identifier | String
//! value   := Identifier | String | Null
//! ```
//!
//! An entry with a body is a section, an entry with only a value is an
//! attribute. `null` reads as an absent value.

use crate::configuration::{ConfigOptions, Configuration};
use crate::error::{Error, Result};
use crate::lexer::{tokenize, Token, TokenKind};
use crate::node::{NodeHandle, NodeId};

/// Maximum nesting of section bodies below the root
pub const MAX_NESTING_DEPTH: usize = 256;

/// Parse Laconic source into a writable configuration
///
/// # Example
///
/// ```
/// let conf = laconic_core::parse("app{ log-level=debug }").unwrap();
/// assert_eq!(conf.root().name(), "app");
/// ```
pub fn parse(source: &str) -> Result<Configuration> {
    parse_with_options(source, ConfigOptions::default())
}

/// Parse Laconic source with custom options
pub fn parse_with_options(source: &str, options: ConfigOptions) -> Result<Configuration> {
    let tokens = tokenize(source)?;
    let read_only = options.read_only;
    let mut conf = Configuration::with_options(ConfigOptions {
        read_only: false,
        ..options
    });

    Parser::new(tokens).parse_into(&mut conf)?;

    conf.root_mut().reset_modified();
    conf.set_read_only(read_only);
    log::debug!("parsed configuration '{}'", conf.root().name());
    Ok(conf)
}

struct Parser {
    tokens: Vec<Token>,
    index: usize,
    depth: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            index: 0,
            depth: 0,
        }
    }

    /// Current token; the stream always ends with `Eof`, which repeats
    fn current(&self) -> &Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.index.min(last)]
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        self.index += 1;
        token
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<Token> {
        if self.at(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn unexpected(&self, expected: &str) -> Error {
        let token = self.current();
        Error::unexpected_token(expected, describe(token), token.start)
    }

    fn parse_into(&mut self, conf: &mut Configuration) -> Result<()> {
        self.expect(TokenKind::Bof, "beginning of file")?;
        let name = self.read_name()?;
        let value = self.read_optional_value()?;
        self.expect(TokenKind::LBrace, "'{'")?;

        let root = match conf.create(&name.text, value.as_deref()) {
            NodeHandle::Section(id) => id,
            _ => return Err(Error::node_missing()),
        };
        self.parse_content(conf, root)?;

        self.expect(TokenKind::RBrace, "'}'")?;
        self.expect(TokenKind::Eof, "end of file")?;
        Ok(())
    }

    fn parse_content(&mut self, conf: &mut Configuration, section: NodeId) -> Result<()> {
        loop {
            match self.current().kind {
                TokenKind::RBrace => return Ok(()),
                TokenKind::Eof => return Err(Error::unexpected_eof(self.current().start)),
                _ => self.parse_entry(conf, section)?,
            }
        }
    }

    fn parse_entry(&mut self, conf: &mut Configuration, section: NodeId) -> Result<()> {
        let name = self.read_name()?;
        let value = self.read_optional_value()?;

        if self.at(TokenKind::LBrace) {
            if self.depth >= MAX_NESTING_DEPTH {
                return Err(Error::nesting_too_deep(MAX_NESTING_DEPTH).with_position(name.start));
            }
            self.advance();
            let child = match conf.insert(section, &name.text, value.as_deref(), true) {
                Some(NodeHandle::Section(id)) => id,
                _ => return Err(Error::node_missing()),
            };
            self.depth += 1;
            self.parse_content(conf, child)?;
            self.depth -= 1;
            self.expect(TokenKind::RBrace, "'}'")?;
            return Ok(());
        }

        match value {
            Some(value) => {
                conf.insert(section, &name.text, Some(&value), false)
                    .ok_or_else(Error::node_missing)?;
                Ok(())
            }
            None => Err(Error::missing_value_or_body(name.text, name.start)),
        }
    }

    fn read_name(&mut self) -> Result<Token> {
        match self.current().kind {
            TokenKind::Identifier | TokenKind::String => Ok(self.advance()),
            _ => Err(self.unexpected("name")),
        }
    }

    /// `= value` if present; `Ok(None)` for a missing clause or `null`
    fn read_optional_value(&mut self) -> Result<Option<String>> {
        if !self.at(TokenKind::Equals) {
            return Ok(None);
        }
        self.advance();
        match self.current().kind {
            TokenKind::Identifier | TokenKind::String => Ok(Some(self.advance().text)),
            TokenKind::Null => {
                self.advance();
                Ok(None)
            }
            _ => Err(self.unexpected("value")),
        }
    }
}

fn describe(token: &Token) -> String {
    match token.kind {
        TokenKind::Identifier | TokenKind::String => format!("{} '{}'", token.kind, token.text),
        _ => token.kind.to_string(),
    }
}
