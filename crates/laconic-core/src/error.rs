//! Error types for laconic
//!
//! Errors are structured: a kind from the taxonomy below plus optional
//! context (tree path, source position, cause) and an actionable help line.

use std::fmt;

use crate::lexer::SourcePosition;

/// Result type alias for laconic operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for laconic operations
#[derive(Debug, Clone)]
pub struct Error {
    /// The kind of error that occurred
    pub kind: ErrorKind,
    /// Tree path (or navigation path) involved in the failure
    pub path: Option<String>,
    /// Source position for lexer and parser failures
    pub position: Option<SourcePosition>,
    /// Actionable help message
    pub help: Option<String>,
    /// Underlying cause (as string for Clone compatibility)
    pub cause: Option<String>,
}

/// Categories of errors that can occur
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorKind {
    #[error("{0}")]
    Lex(LexErrorKind),
    #[error("{0}")]
    Parse(ParseErrorKind),
    #[error("{0}")]
    Navigation(NavigationErrorKind),
    #[error("{0}")]
    Expansion(ExpansionErrorKind),
    /// Value text does not match the target type
    #[error("Invalid {target} value")]
    Coercion { target: &'static str },
    #[error("{0}")]
    Mutation(MutationErrorKind),
    #[error("{0}")]
    Include(IncludeErrorKind),
    #[error("{0}")]
    Resolver(ResolverErrorKind),
    #[error("I/O error")]
    Io,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexErrorKind {
    #[error("Unterminated string")]
    UnterminatedString,
    #[error("Unterminated verbatim string")]
    UnterminatedVerbatimString,
    #[error("Unterminated comment block")]
    UnterminatedComment,
    #[error("Unexpected character '{0}'")]
    UnexpectedCharacter(char),
    #[error("Invalid escape sequence '\\{0}'")]
    InvalidEscape(String),
}

/// Malformed configuration source
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseErrorKind {
    #[error("Expected {expected} but got {found}")]
    UnexpectedToken { expected: String, found: String },
    #[error("Unexpected end of file")]
    UnexpectedEof,
    #[error("Entry '{name}' has neither a value nor a section body")]
    MissingValueOrBody { name: String },
    #[error("Sections nested deeper than {0} levels")]
    TooDeep(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavigationErrorKind {
    #[error("Path is empty")]
    EmptyPath,
    #[error("Required node not found")]
    RequiredNotFound,
    #[error("Invalid index '{0}' in path")]
    InvalidIndex(String),
    #[error("Path segment '{0}' is not a section")]
    NotASection(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExpansionErrorKind {
    #[error("Required environment variable missing: {0}")]
    RequiredEnvMissing(String),
    #[error("Recursive variable expansion: {0}")]
    Recursive(String),
    #[error("Variable expansion exceeded max iterations ({0})")]
    MaxIterations(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MutationErrorKind {
    #[error("Cannot modify a node that does not exist")]
    NodeMissing,
    #[error("Configuration is read-only")]
    ReadOnly,
    #[error("Attributes cannot hold children")]
    NotASection,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IncludeErrorKind {
    #[error("Included file not found: {0}")]
    FileNotFound(String),
    #[error("Include nesting exceeded max depth ({0})")]
    DepthExceeded(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolverErrorKind {
    #[error("Resolver '{0}' is already registered")]
    AlreadyRegistered(String),
    #[error("Resolver '{name}' failed: {message}")]
    Failed { name: String, message: String },
}

impl Error {
    fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            path: None,
            position: None,
            help: None,
            cause: None,
        }
    }

    /// Create a lexer error at a source position
    pub fn lex(kind: LexErrorKind, position: SourcePosition) -> Self {
        let help = match &kind {
            LexErrorKind::UnterminatedString => {
                Some("Close the string with a matching quote on the same line".to_string())
            }
            LexErrorKind::UnterminatedVerbatimString => {
                Some("Close the verbatim string; write a quote twice to embed it".to_string())
            }
            LexErrorKind::UnterminatedComment => {
                Some("Close the block comment with '*/' or '*|'".to_string())
            }
            LexErrorKind::InvalidEscape(_) => Some(
                "Supported escapes: \\\" \\' \\\\ \\0 \\a \\b \\f \\n \\r \\t \\v \\uXXXX \\xH..HHHH"
                    .to_string(),
            ),
            LexErrorKind::UnexpectedCharacter(_) => None,
        };
        Self {
            position: Some(position),
            help,
            ..Self::new(ErrorKind::Lex(kind))
        }
    }

    /// Create a parse error for a token of the wrong kind
    pub fn unexpected_token(
        expected: impl Into<String>,
        found: impl Into<String>,
        position: SourcePosition,
    ) -> Self {
        Self {
            position: Some(position),
            ..Self::new(ErrorKind::Parse(ParseErrorKind::UnexpectedToken {
                expected: expected.into(),
                found: found.into(),
            }))
        }
    }

    /// Create a parse error for input that ends inside a section body
    pub fn unexpected_eof(position: SourcePosition) -> Self {
        Self {
            position: Some(position),
            help: Some("Close every section body with '}'".into()),
            ..Self::new(ErrorKind::Parse(ParseErrorKind::UnexpectedEof))
        }
    }

    /// Create a parse error for sections nested past `limit`
    pub fn nesting_too_deep(limit: usize) -> Self {
        Self::new(ErrorKind::Parse(ParseErrorKind::TooDeep(limit)))
    }

    /// Create a parse error for an entry without value and body
    pub fn missing_value_or_body(name: impl Into<String>, position: SourcePosition) -> Self {
        let name = name.into();
        Self {
            position: Some(position),
            help: Some(format!(
                "Give '{}' a value ({}=value) or a body ({} {{ }})",
                name, name, name
            )),
            ..Self::new(ErrorKind::Parse(ParseErrorKind::MissingValueOrBody { name }))
        }
    }

    /// Create a navigation error
    pub fn navigation(kind: NavigationErrorKind, path: impl Into<String>) -> Self {
        let help = match &kind {
            NavigationErrorKind::RequiredNotFound => {
                Some("Check the path or drop the leading '!' to allow a missing node".to_string())
            }
            NavigationErrorKind::InvalidIndex(_) => {
                Some("Use a non-negative integer inside '[...]'".to_string())
            }
            NavigationErrorKind::NotASection(_) => {
                Some("Attributes are leaves; address them as the last path segment".to_string())
            }
            NavigationErrorKind::EmptyPath => None,
        };
        Self {
            path: Some(path.into()),
            help,
            ..Self::new(ErrorKind::Navigation(kind))
        }
    }

    /// Create a required environment variable error
    pub fn required_env_missing(var_name: impl Into<String>) -> Self {
        let var = var_name.into();
        Self {
            help: Some(format!(
                "Set the {} environment variable or drop the '!' to default to empty",
                var
            )),
            ..Self::new(ErrorKind::Expansion(ExpansionErrorKind::RequiredEnvMissing(var)))
        }
    }

    /// Create a recursive variable expansion error
    pub fn recursive_variable(expression: impl Into<String>, chain: Vec<String>) -> Self {
        Self {
            help: Some("Break the cycle by removing one of the variable references".into()),
            cause: Some(format!("Chain: {}", chain.join(" → "))),
            ..Self::new(ErrorKind::Expansion(ExpansionErrorKind::Recursive(
                expression.into(),
            )))
        }
    }

    /// Create an iteration ceiling error
    pub fn max_iterations(limit: usize) -> Self {
        Self {
            help: Some("A resolver keeps reintroducing variable markers".into()),
            ..Self::new(ErrorKind::Expansion(ExpansionErrorKind::MaxIterations(limit)))
        }
    }

    /// Create a type coercion error
    pub fn coercion(path: impl Into<String>, target: &'static str, got: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            cause: Some(format!("Got: {}", got.into())),
            ..Self::new(ErrorKind::Coercion { target })
        }
    }

    /// Create an error for mutating a sentinel node
    pub fn node_missing() -> Self {
        Self::new(ErrorKind::Mutation(MutationErrorKind::NodeMissing))
    }

    /// Create an error for mutating a read-only configuration
    pub fn read_only(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            help: Some("The configuration was loaded read-only".into()),
            ..Self::new(ErrorKind::Mutation(MutationErrorKind::ReadOnly))
        }
    }

    /// Create an error for a section-only operation on an attribute
    pub fn not_a_section(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::new(ErrorKind::Mutation(MutationErrorKind::NotASection))
        }
    }

    /// Create a missing required include error
    pub fn include_not_found(file: impl Into<String>) -> Self {
        Self {
            help: Some("Check the file exists relative to the include root".into()),
            ..Self::new(ErrorKind::Include(IncludeErrorKind::FileNotFound(file.into())))
        }
    }

    /// Create an include depth error
    pub fn include_depth_exceeded(limit: usize) -> Self {
        Self {
            help: Some("Look for files that include each other".into()),
            ..Self::new(ErrorKind::Include(IncludeErrorKind::DepthExceeded(limit)))
        }
    }

    /// Create an error for a duplicate resolver name
    pub fn resolver_already_registered(name: impl Into<String>) -> Self {
        Self {
            help: Some("Register with force to replace the existing resolver".into()),
            ..Self::new(ErrorKind::Resolver(ResolverErrorKind::AlreadyRegistered(
                name.into(),
            )))
        }
    }

    /// Create an error raised by a custom resolver
    pub fn resolver(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Resolver(ResolverErrorKind::Failed {
            name: name.into(),
            message: message.into(),
        }))
    }

    /// Create an I/O error
    pub fn io(file: impl Into<String>, err: &std::io::Error) -> Self {
        Self {
            path: Some(file.into()),
            cause: Some(err.to_string()),
            ..Self::new(ErrorKind::Io)
        }
    }

    /// Add path context to the error
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Add a source position to the error
    pub fn with_position(mut self, position: SourcePosition) -> Self {
        self.position = Some(position);
        self
    }

    /// Add help message to the error
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Add a cause to the error
    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    /// True for lexer failures
    pub fn is_lex(&self) -> bool {
        matches!(self.kind, ErrorKind::Lex(_))
    }

    /// True for parser failures
    pub fn is_parse(&self) -> bool {
        matches!(self.kind, ErrorKind::Parse(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;

        if let Some(path) = &self.path {
            write!(f, "\n  Path: {}", path)?;
        }

        if let Some(pos) = &self.position {
            write!(f, "\n  At: {}", pos)?;
        }

        if let Some(cause) = &self.cause {
            write!(f, "\n  {}", cause)?;
        }

        if let Some(help) = &self.help {
            write!(f, "\n  Help: {}", help)?;
        }

        Ok(())
    }
}

impl std::error::Error for Error {}
