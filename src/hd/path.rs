//! Derivation paths
//!
//! Paths are written as `/`-separated child numbers with an optional
//! leading `m` or `M`, e.g. `M/0'`, `0'/1/5` or `m/44h/0h`. A trailing `'`
//! (or `h`) marks a hardened child. On the wire paths are always rendered
//! with the `M` prefix.

use bitcoin::bip32::{self, ChildNumber};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::error::HdError;

/// A sequence of child numbers relative to some key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DerivationPath(bip32::DerivationPath);

impl DerivationPath {
    /// The empty path, i.e. the key itself
    pub fn root() -> Self {
        Self(bip32::DerivationPath::from(Vec::new()))
    }

    /// `M/<key_index>'`, the primary key path for a key-index epoch
    pub fn for_key_index(key_index: u32) -> Result<Self, HdError> {
        Ok(Self::from(vec![ChildNumber::from_hardened_idx(key_index)?]))
    }

    pub fn indexes(&self) -> &[ChildNumber] {
        self.0.as_ref()
    }

    /// Return a new path with `child` appended
    pub fn child(&self, child: ChildNumber) -> Self {
        Self(self.0.child(child))
    }

    pub(crate) fn as_bip32(&self) -> &bip32::DerivationPath {
        &self.0
    }
}

impl From<Vec<ChildNumber>> for DerivationPath {
    fn from(indexes: Vec<ChildNumber>) -> Self {
        Self(bip32::DerivationPath::from(indexes))
    }
}

impl FromStr for DerivationPath {
    type Err = HdError;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        let trimmed = path.trim();
        if trimmed.is_empty() || trimmed == "m" || trimmed == "M" {
            return Ok(Self::root());
        }

        let body = trimmed
            .strip_prefix("m/")
            .or_else(|| trimmed.strip_prefix("M/"))
            .unwrap_or(trimmed);

        body.split('/')
            .map(ChildNumber::from_str)
            .collect::<Result<Vec<_>, _>>()
            .map(Self::from)
            .map_err(|e| HdError::InvalidPath(format!("{} in '{}'", e, path)))
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "M")?;
        for index in self.indexes() {
            write!(f, "/{}", index)?;
        }
        Ok(())
    }
}

impl Serialize for DerivationPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DerivationPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
