//! Cosigner key sets
//!
//! The coordinator contributes one public key per key-index epoch. Epochs
//! are only ever appended in increasing order; existing entries are never
//! replaced or removed.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::error::WalletError;
use crate::hd::{DerivationPath, ExtendedPublicKey};

/// A public key together with the path it was derived at
///
/// Serialized as a two element array, `["xpub...", "M/0'"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "(ExtendedPublicKey, DerivationPath)",
    into = "(ExtendedPublicKey, DerivationPath)"
)]
pub struct PublicKeyWithPath {
    pub key: ExtendedPublicKey,
    pub path: DerivationPath,
}

impl PublicKeyWithPath {
    pub fn new(key: ExtendedPublicKey, path: DerivationPath) -> Self {
        Self { key, path }
    }
}

impl From<(ExtendedPublicKey, DerivationPath)> for PublicKeyWithPath {
    fn from((key, path): (ExtendedPublicKey, DerivationPath)) -> Self {
        Self { key, path }
    }
}

impl From<PublicKeyWithPath> for (ExtendedPublicKey, DerivationPath) {
    fn from(entry: PublicKeyWithPath) -> Self {
        (entry.key, entry.path)
    }
}

/// Cosigner public keys by key-index epoch
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CosignerKeySet {
    keys: BTreeMap<u32, PublicKeyWithPath>,
}

impl CosignerKeySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// A set holding a single epoch
    pub fn with_epoch(epoch: u32, key: PublicKeyWithPath) -> Self {
        let mut keys = BTreeMap::new();
        keys.insert(epoch, key);
        Self { keys }
    }

    pub fn get(&self, epoch: u32) -> Option<&PublicKeyWithPath> {
        self.keys.get(&epoch)
    }

    /// The highest epoch present, which is the wallet's active key index
    pub fn latest_epoch(&self) -> Option<u32> {
        self.keys.keys().next_back().copied()
    }

    pub fn latest(&self) -> Option<(u32, &PublicKeyWithPath)> {
        self.keys.iter().next_back().map(|(epoch, key)| (*epoch, key))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Epochs in increasing order
    pub fn iter(&self) -> impl Iterator<Item = (u32, &PublicKeyWithPath)> {
        self.keys.iter().map(|(epoch, key)| (*epoch, key))
    }

    /// Append a key for a new epoch, which must exceed every existing one
    pub fn append(&mut self, epoch: u32, key: PublicKeyWithPath) -> Result<(), WalletError> {
        if let Some(current) = self.latest_epoch() {
            if epoch <= current {
                return Err(WalletError::KeyIndexNotIncreasing {
                    current,
                    requested: epoch,
                });
            }
        }
        self.keys.insert(epoch, key);
        Ok(())
    }

    /// Check a coordinator-returned set against this one and produce the
    /// successor set holding exactly one additional `epoch`
    ///
    /// `updated` must repeat every existing entry unchanged, contain `epoch`
    /// and contain nothing else.
    pub fn extend_from(&self, updated: &CosignerKeySet, epoch: u32) -> Result<Self, WalletError> {
        for (existing_epoch, existing_key) in self.iter() {
            match updated.get(existing_epoch) {
                Some(key) if key == existing_key => {}
                Some(_) => {
                    return Err(WalletError::InconsistentKeySet(format!(
                        "coordinator changed the key for epoch {}",
                        existing_epoch
                    )))
                }
                None => {
                    return Err(WalletError::InconsistentKeySet(format!(
                        "coordinator dropped epoch {}",
                        existing_epoch
                    )))
                }
            }
        }

        let new_key = updated.get(epoch).ok_or_else(|| {
            WalletError::InconsistentKeySet(format!("no cosigner key returned for epoch {}", epoch))
        })?;

        if updated.len() != self.len() + 1 {
            return Err(WalletError::InconsistentKeySet(format!(
                "expected {} epochs after upgrade, coordinator returned {}",
                self.len() + 1,
                updated.len()
            )));
        }

        let mut next = self.clone();
        next.append(epoch, new_key.clone())?;
        Ok(next)
    }
}
