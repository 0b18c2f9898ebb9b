//! BIP32 extended keys
//!
//! Thin wrappers over `bitcoin::bip32`. `ExtendedPrivateKey` can sign and
//! derive any child. `ExtendedPublicKey` carries no private material and can
//! only derive non-hardened public children, so a public-only key (the backup
//! key, cosigner keys) can never be used to re-derive private keys.

use bitcoin::bip32::{ChildNumber, Xpriv, Xpub};
use secp256k1::{PublicKey, Secp256k1, SecretKey};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use zeroize::Zeroizing;

use super::error::{HdError, HdResult};
use super::path::DerivationPath;
use crate::config::Network;

/// Supported seed lengths in bytes
const MIN_SEED_BYTES: usize = 16;
const MAX_SEED_BYTES: usize = 64;

// =============================================================================
// Extended Private Key
// =============================================================================

/// A private node of a BIP32 key tree
///
/// Not `Clone`: the only way to get a second handle on private material is
/// to derive it again from the seed. The secret key is wiped on drop.
pub struct ExtendedPrivateKey {
    inner: Xpriv,
}

impl ExtendedPrivateKey {
    /// Derive the master key from a seed
    pub fn from_seed(seed: &[u8], network: Network) -> HdResult<Self> {
        if !(MIN_SEED_BYTES..=MAX_SEED_BYTES).contains(&seed.len()) {
            return Err(HdError::InvalidSeed(format!(
                "seed must be {}-{} bytes, got {}",
                MIN_SEED_BYTES,
                MAX_SEED_BYTES,
                seed.len()
            )));
        }

        let inner = Xpriv::new_master(network.to_bitcoin(), seed)
            .map_err(|e| HdError::InvalidSeed(e.to_string()))?;
        Ok(Self { inner })
    }

    /// Derive a single child key
    pub fn derive_child(&self, index: ChildNumber) -> HdResult<Self> {
        let secp = Secp256k1::signing_only();
        let inner = self.inner.derive_priv(&secp, &[index])?;
        Ok(Self { inner })
    }

    /// Derive the key at `path` relative to this key
    pub fn derive_path(&self, path: &DerivationPath) -> HdResult<Self> {
        let secp = Secp256k1::signing_only();
        let inner = self.inner.derive_priv(&secp, path.as_bip32())?;
        Ok(Self { inner })
    }

    /// Strip the private material, keeping only what public derivation needs
    pub fn public_copy(&self) -> ExtendedPublicKey {
        let secp = Secp256k1::signing_only();
        ExtendedPublicKey {
            inner: Xpub::from_priv(&secp, &self.inner),
        }
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_secret_key(&Secp256k1::signing_only(), &self.inner.private_key)
    }

    pub fn network(&self) -> Network {
        Network::from_bitcoin(self.inner.network)
    }

    pub fn depth(&self) -> u8 {
        self.inner.depth
    }

    pub(crate) fn secret_key(&self) -> &SecretKey {
        &self.inner.private_key
    }

    /// Serialize as `xprv`/`tprv` text
    pub fn to_base58(&self) -> Zeroizing<String> {
        Zeroizing::new(self.inner.to_string())
    }
}

impl Drop for ExtendedPrivateKey {
    fn drop(&mut self) {
        self.inner.private_key.non_secure_erase();
    }
}

impl fmt::Debug for ExtendedPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtendedPrivateKey")
            .field("network", &self.network())
            .field("depth", &self.inner.depth)
            .field("fingerprint", &self.inner.fingerprint(&Secp256k1::signing_only()))
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Extended Public Key
// =============================================================================

/// A public-only node of a BIP32 key tree
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExtendedPublicKey {
    inner: Xpub,
}

impl ExtendedPublicKey {
    /// Derive a non-hardened public child
    pub fn derive_child(&self, index: ChildNumber) -> HdResult<Self> {
        let secp = Secp256k1::verification_only();
        let inner = self.inner.ckd_pub(&secp, index)?;
        Ok(Self { inner })
    }

    /// Derive the public key at `path`; every step must be non-hardened
    pub fn derive_path(&self, path: &DerivationPath) -> HdResult<Self> {
        let secp = Secp256k1::verification_only();
        let inner = self.inner.derive_pub(&secp, path.as_bip32())?;
        Ok(Self { inner })
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.inner.public_key
    }

    pub fn network(&self) -> Network {
        Network::from_bitcoin(self.inner.network)
    }

    pub fn depth(&self) -> u8 {
        self.inner.depth
    }

    /// Serialize as `xpub`/`tpub` text
    pub fn to_base58(&self) -> String {
        self.inner.to_string()
    }

    /// Parse `xpub`/`tpub` text; the network comes from the version bytes
    pub fn from_base58(encoded: &str) -> HdResult<Self> {
        match Xpub::from_str(encoded) {
            Ok(inner) => Ok(Self { inner }),
            Err(_) if Xpriv::from_str(encoded).is_ok() => Err(HdError::InvalidExtendedKey(
                "private key supplied where a public key is expected".into(),
            )),
            Err(e) => Err(HdError::InvalidExtendedKey(e.to_string())),
        }
    }
}

impl fmt::Display for ExtendedPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl FromStr for ExtendedPublicKey {
    type Err = HdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_base58(s.trim())
    }
}

impl Serialize for ExtendedPublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.inner)
    }
}

impl<'de> Deserialize<'de> for ExtendedPublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::from_base58(&text).map_err(serde::de::Error::custom)
    }
}
