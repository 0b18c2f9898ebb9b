//! Operative wallet records
//!
//! A `WalletRecord` is what create and recover hand back: the primary key
//! tree (private, kept only here), the backup public key, and the cosigner
//! keys by epoch. It is held in memory only; all durable state lives with
//! the coordinator.

use crate::client::WalletClient;
use crate::config::Network;
use crate::coordinator::Coordinator;
use crate::crypto::sign_digest;
use crate::hd::{ChecksumBinder, DerivationPath, ExtendedPrivateKey, ExtendedPublicKey};

use super::cosigner::CosignerKeySet;
use super::error::{WalletError, WalletResult};

/// An operative co-signed wallet
#[derive(Debug)]
pub struct WalletRecord {
    identifier: String,
    network: Network,
    key_index: u32,
    primary_private_key: ExtendedPrivateKey,
    backup_public_key: ExtendedPublicKey,
    cosigner_keys: CosignerKeySet,
}

impl WalletRecord {
    /// Assemble a record, checking that the pieces agree with each other
    ///
    /// The active key index must be the highest cosigner epoch and every key
    /// must belong to the same network.
    pub(crate) fn assemble(
        identifier: String,
        primary_private_key: ExtendedPrivateKey,
        backup_public_key: ExtendedPublicKey,
        cosigner_keys: CosignerKeySet,
        key_index: u32,
    ) -> WalletResult<Self> {
        let network = primary_private_key.network();

        if backup_public_key.network() != network {
            return Err(WalletError::NetworkMismatch {
                expected: network,
                actual: backup_public_key.network(),
            });
        }

        if let Some((_, key)) = cosigner_keys.iter().find(|(_, k)| k.key.network() != network) {
            return Err(WalletError::NetworkMismatch {
                expected: network,
                actual: key.key.network(),
            });
        }

        match cosigner_keys.latest_epoch() {
            Some(latest) if latest == key_index => {}
            Some(latest) => {
                return Err(WalletError::InconsistentKeySet(format!(
                    "key index {} is not the latest cosigner epoch {}",
                    key_index, latest
                )))
            }
            None => {
                return Err(WalletError::InconsistentKeySet(
                    "no cosigner keys returned".to_string(),
                ))
            }
        }

        Ok(Self {
            identifier,
            network,
            key_index,
            primary_private_key,
            backup_public_key,
            cosigner_keys,
        })
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn network(&self) -> Network {
        self.network
    }

    /// The active key-index epoch
    pub fn key_index(&self) -> u32 {
        self.key_index
    }

    pub fn backup_public_key(&self) -> &ExtendedPublicKey {
        &self.backup_public_key
    }

    pub fn cosigner_keys(&self) -> &CosignerKeySet {
        &self.cosigner_keys
    }

    /// Checksum recomputed from the primary key
    pub fn checksum(&self) -> String {
        ChecksumBinder::compute(&self.primary_private_key)
    }

    /// The primary public key for an epoch, at `M/<key_index>'`
    pub fn primary_public_key(&self, key_index: u32) -> WalletResult<ExtendedPublicKey> {
        self.derive_primary_public(&DerivationPath::for_key_index(key_index)?)
    }

    /// Public key of the primary tree at `path`
    pub fn derive_primary_public(&self, path: &DerivationPath) -> WalletResult<ExtendedPublicKey> {
        Ok(self.primary_private_key.derive_path(path)?.public_copy())
    }

    /// Sign a transaction digest with the primary key at `path`
    ///
    /// The derived child key only lives for the duration of this call.
    pub fn sign_digest(&self, path: &DerivationPath, digest: &[u8]) -> WalletResult<Vec<u8>> {
        let child = self.primary_private_key.derive_path(path)?;
        Ok(sign_digest(child.secret_key(), digest)?)
    }

    /// Derive the next epoch's primary key and register it with the coordinator
    pub fn upgrade_key_index<C: Coordinator>(
        &mut self,
        client: &WalletClient<C>,
        new_key_index: u32,
    ) -> WalletResult<&CosignerKeySet> {
        if new_key_index <= self.key_index {
            return Err(WalletError::KeyIndexNotIncreasing {
                current: self.key_index,
                requested: new_key_index,
            });
        }
        let primary_public_key = self.primary_public_key(new_key_index)?;
        client.upgrade_key_index(self, new_key_index, &primary_public_key)
    }

    /// Install a verified successor key set
    pub(crate) fn advance_epoch(&mut self, cosigner_keys: CosignerKeySet, key_index: u32) {
        self.cosigner_keys = cosigner_keys;
        self.key_index = key_index;
    }
}
