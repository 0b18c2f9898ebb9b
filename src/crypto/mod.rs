//! Cryptographic utilities
//!
//! This module provides:
//! - SHA-256 hashing
//! - ECDSA signing and P2PKH addresses (secp256k1)

pub mod hash;
pub mod keys;

pub use hash::{double_sha256, sha256};
pub use keys::{public_key_to_address, sign_digest, verify_digest, KeyError};
