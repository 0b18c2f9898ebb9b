//! Errors raised by key generation and derivation

use bitcoin::bip32;
use thiserror::Error;

/// Key generation and derivation errors
///
/// All of these indicate either an unusable entropy source or malformed
/// caller input; none of them is worth retrying.
#[derive(Error, Debug)]
pub enum HdError {
    #[error("Entropy source unavailable: {0}")]
    EntropySource(String),
    #[error("Invalid seed: {0}")]
    InvalidSeed(String),
    #[error("Invalid derivation path: {0}")]
    InvalidPath(String),
    #[error("Invalid mnemonic: {0}")]
    InvalidMnemonic(String),
    #[error("Invalid extended key: {0}")]
    InvalidExtendedKey(String),
}

impl From<bip32::Error> for HdError {
    fn from(e: bip32::Error) -> Self {
        match e {
            bip32::Error::CannotDeriveFromHardenedKey
            | bip32::Error::InvalidChildNumber(_)
            | bip32::Error::InvalidChildNumberFormat
            | bip32::Error::InvalidDerivationPathFormat => HdError::InvalidPath(e.to_string()),
            _ => HdError::InvalidExtendedKey(e.to_string()),
        }
    }
}

/// Result type for key derivation
pub type HdResult<T> = Result<T, HdError>;
