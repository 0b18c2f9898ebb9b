//! Hierarchical deterministic keys
//!
//! This module provides:
//! - BIP39 mnemonic generation and seed derivation
//! - BIP32 private and public key trees
//! - Derivation path parsing
//! - The passphrase checksum bound to the primary key

pub mod checksum;
pub mod error;
pub mod extended;
pub mod mnemonic;
pub mod path;

pub use checksum::ChecksumBinder;
pub use error::{HdError, HdResult};
pub use extended::{ExtendedPrivateKey, ExtendedPublicKey};
pub use mnemonic::{KeySeedGenerator, MnemonicPair, Seed};
pub use bitcoin::bip32::ChildNumber;
pub use path::DerivationPath;
