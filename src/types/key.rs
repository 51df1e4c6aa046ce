//! Recovered A5/1 session key

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{AttackError, Result};

/// The 64-bit ciphering key Kc recovered by the oracle.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionKey([u8; 8]);

impl SessionKey {
    /// Create a key from its bytes, most significant first.
    pub const fn new(bytes: [u8; 8]) -> Self {
        Self(bytes)
    }

    /// Get the key bytes.
    pub fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }
}

impl FromStr for SessionKey {
    type Err = AttackError;

    /// Parse 16 hex digits, optionally separated by spaces as Kraken prints them.
    fn from_str(s: &str) -> Result<Self> {
        let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = hex::decode(&compact)
            .map_err(|e| AttackError::parse("Session key", e.to_string()))?;
        let bytes: [u8; 8] = bytes.try_into().map_err(|_| {
            AttackError::parse("Session key", format!("{:?} is not 8 bytes", s))
        })?;
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for SessionKey {
    type Error = AttackError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<SessionKey> for String {
    fn from(key: SessionKey) -> Self {
        key.to_string()
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode_upper(self.0))
    }
}

impl fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionKey({})", self)
    }
}
