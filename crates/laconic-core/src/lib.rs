//! laconic-core: Laconic configuration trees
//!
//! This crate lexes and parses the Laconic configuration DSL into a tree of
//! sections and attributes, and provides path navigation, lazy `$(...)`
//! variable expansion and typed value access over that tree.
//!
//! # Example
//!
//! ```rust
//! use laconic_core::parse;
//!
//! let source = r#"
//! app
//! {
//!   home=/var
//!   data=$($home)/data
//!   database { port=5432 }
//! }
//! "#;
//!
//! let conf = parse(source).unwrap();
//! assert_eq!(conf.get("$data").unwrap().value().unwrap().as_deref(), Some("/var/data"));
//! assert_eq!(conf.get("database/$port").unwrap().as_int(0).unwrap(), 5432);
//! ```

pub mod atom;
pub mod entity_id;
pub mod error;
pub mod include;
pub mod lexer;
pub mod resolver;

mod configuration;
mod convert;
mod expansion;
mod navigation;
mod node;
mod parser;
mod render;

#[cfg(test)]
mod proptests;

pub use atom::Atom;
pub use configuration::{
    ConfigOptions, Configuration, EnvLookup, VariableSyntax, MAX_EXPANSION_ITERATIONS,
};
pub use convert::{parse_bool, parse_datetime, parse_float, parse_int};
pub use entity_id::EntityId;
pub use error::{Error, ErrorKind, Result};
pub use include::IncludePreprocessor;
pub use lexer::{tokenize, Token, TokenKind};
pub use node::{NodeHandle, NodeId, NodeMut, NodeRef};
pub use parser::{parse, parse_with_options};
pub use render::{render, AttributeSnapshot, NodeSnapshot};
pub use resolver::{FnResolver, PrefixResolver, ResolverContext, ResolverRegistry, VariableResolver};
