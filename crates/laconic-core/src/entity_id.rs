//! EntityId codec
//!
//! An entity id names an object by address within a type/schema within a
//! system: `type.schema@system::address`, `type@system::address` or
//! `system::address`.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::atom::Atom;

const TYPE_PREFIX: &str = "@";
const SCHEMA_DIV: &str = ".";
const SYSTEM_PREFIX: &str = "::";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EntityIdError {
    #[error("Supplied value is not parsable as EntityId: '{0}'")]
    NotParsable(String),
}

/// Vector of (system, type, schema, address)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct EntityId {
    system: Atom,
    entity_type: Atom,
    schema: Atom,
    address: String,
}

impl EntityId {
    pub fn new(system: Atom, entity_type: Atom, schema: Atom, address: impl Into<String>) -> Self {
        Self {
            system,
            entity_type,
            schema,
            address: address.into(),
        }
    }

    pub fn system(&self) -> Atom {
        self.system
    }

    pub fn entity_type(&self) -> Atom {
        self.entity_type
    }

    pub fn schema(&self) -> Atom {
        self.schema
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Address holds a JSON object (`{...}` with no surrounding spaces)
    pub fn is_composite_address(&self) -> bool {
        self.address.starts_with('{') && self.address.ends_with('}')
    }

    /// Parse, returning `None` for anything malformed
    pub fn try_parse(text: &str) -> Option<Self> {
        if text.len() < 4 {
            return None;
        }
        let (prefix, address) = text.split_once(SYSTEM_PREFIX)?;
        if address.is_empty() {
            return None;
        }

        let Some((type_schema, system)) = prefix.split_once(TYPE_PREFIX) else {
            if prefix.is_empty() {
                return None;
            }
            return Some(Self::new(Atom::encode(prefix).ok()?, Atom::ZERO, Atom::ZERO, address));
        };
        if system.is_empty() || type_schema.is_empty() {
            return None;
        }
        let system = Atom::encode(system).ok()?;

        let (entity_type, schema) = match type_schema.split_once(SCHEMA_DIV) {
            None => (Atom::encode(type_schema).ok()?, Atom::ZERO),
            Some((t, s)) if !t.is_empty() && !s.is_empty() => {
                (Atom::encode(t).ok()?, Atom::encode(s).ok()?)
            }
            Some(_) => return None,
        };
        Some(Self::new(system, entity_type, schema, address))
    }
}

impl FromStr for EntityId {
    type Err = EntityIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_parse(s).ok_or_else(|| EntityIdError::NotParsable(s.to_string()))
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.entity_type.is_zero() {
            write!(f, "{}{}{}", self.system, SYSTEM_PREFIX, self.address)
        } else if self.schema.is_zero() {
            write!(
                f,
                "{}{}{}{}{}",
                self.entity_type, TYPE_PREFIX, self.system, SYSTEM_PREFIX, self.address
            )
        } else {
            write!(
                f,
                "{}{}{}{}{}{}{}",
                self.entity_type,
                SCHEMA_DIV,
                self.schema,
                TYPE_PREFIX,
                self.system,
                SYSTEM_PREFIX,
                self.address
            )
        }
    }
}

impl Serialize for EntityId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
