//! Passphrase checksums
//!
//! The checksum is the P2PKH address of the primary master key. It is
//! stored by the coordinator when a wallet is created and recomputed on
//! recovery: a match proves the mnemonic and passphrase rebuilt the same
//! primary key. It depends on the primary key alone, so it can be checked
//! before any backup or cosigner key is known.

use super::extended::ExtendedPrivateKey;
use crate::crypto::public_key_to_address;

/// Computes the checksum that binds a passphrase to a primary key
pub struct ChecksumBinder;

impl ChecksumBinder {
    /// Address text of the key's compressed public key, for the key's network
    pub fn compute(primary_private_key: &ExtendedPrivateKey) -> String {
        public_key_to_address(
            &primary_private_key.public_key(),
            primary_private_key.network(),
        )
    }

    /// Compare a recomputed checksum with the stored one
    pub fn matches(primary_private_key: &ExtendedPrivateKey, expected: &str) -> bool {
        Self::compute(primary_private_key) == expected
    }
}
