//! Atom codec
//!
//! An atom is a short identifier (up to 8 ASCII chars from `[0-9A-Za-z_-]`)
//! packed into a `u64`, first char in the lowest byte.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

/// Maximum number of characters in an atom
pub const MAX_ATOM_LENGTH: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AtomError {
    #[error("Atom value is longer than {MAX_ATOM_LENGTH} chars: '{0}'")]
    TooLong(String),
    #[error("Invalid atom char #{code} / `{ch}`")]
    InvalidChar { code: u32, ch: char },
}

/// Integer-backed short identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Atom(u64);

fn is_valid_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_' || c == b'-'
}

impl Atom {
    /// The empty atom
    pub const ZERO: Atom = Atom(0);

    /// Encode a string; the empty string is [`Atom::ZERO`]
    pub fn encode(text: &str) -> Result<Self, AtomError> {
        if text.chars().count() > MAX_ATOM_LENGTH {
            return Err(AtomError::TooLong(text.to_string()));
        }
        let mut id = 0u64;
        for (i, ch) in text.chars().enumerate() {
            let byte = u8::try_from(ch)
                .ok()
                .filter(|b| is_valid_char(*b))
                .ok_or(AtomError::InvalidChar {
                    code: ch as u32,
                    ch,
                })?;
            id |= u64::from(byte) << (8 * i);
        }
        Ok(Atom(id))
    }

    /// Backing integer
    pub fn id(self) -> u64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Decode back to text; decoding stops at the first zero byte
    pub fn value(self) -> String {
        self.0
            .to_le_bytes()
            .iter()
            .take_while(|b| **b != 0)
            .map(|b| char::from(*b))
            .collect()
    }
}

impl TryFrom<u64> for Atom {
    type Error = AtomError;

    fn try_from(id: u64) -> Result<Self, Self::Error> {
        for byte in id.to_le_bytes().into_iter().take_while(|b| *b != 0) {
            if !is_valid_char(byte) {
                return Err(AtomError::InvalidChar {
                    code: u32::from(byte),
                    ch: char::from(byte),
                });
            }
        }
        Ok(Atom(id))
    }
}

impl FromStr for Atom {
    type Err = AtomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Atom::encode(s)
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value())
    }
}

impl Serialize for Atom {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.value())
    }
}
