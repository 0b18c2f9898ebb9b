//! Wallet protocol errors

use thiserror::Error;

use crate::config::Network;
use crate::coordinator::CoordinatorError;
use crate::crypto::KeyError;
use crate::hd::HdError;

/// Errors surfaced by wallet operations
///
/// Every failure aborts the operation in progress; no partially built
/// record or key set is ever returned.
#[derive(Error, Debug)]
pub enum WalletError {
    /// Entropy, seed, path, mnemonic or extended key problems
    #[error("Key error: {0}")]
    Hd(#[from] HdError),

    /// The mnemonic and passphrase did not rebuild the registered key
    #[error(
        "Checksum [{computed}] does not match expected checksum [{expected}], \
         most likely due to incorrect passphrase"
    )]
    PassphraseMismatch { expected: String, computed: String },

    /// The coordinator rejected or could not process a request
    #[error("Coordinator error: {0}")]
    Coordinator(#[from] CoordinatorError),

    /// The coordinator judged the fee insufficient on a fee-checked send
    #[error("Fee rejected: {0}")]
    FeeRejected(String),

    #[error("Key index must increase: current {current}, requested {requested}")]
    KeyIndexNotIncreasing { current: u32, requested: u32 },

    #[error("Primary public key does not match the key derived for key index {0}")]
    PrimaryKeyMismatch(u32),

    #[error("Inconsistent cosigner key set: {0}")]
    InconsistentKeySet(String),

    #[error("Network mismatch: expected {expected}, got {actual}")]
    NetworkMismatch { expected: Network, actual: Network },

    #[error("No primary mnemonic available to recover wallet {0}")]
    MnemonicUnavailable(String),

    #[error("No outputs requested")]
    NoOutputs,

    #[error("Invalid pagination: {0}")]
    InvalidPagination(String),

    #[error("Crypto error: {0}")]
    Crypto(#[from] KeyError),
}

/// Result type for wallet operations
pub type WalletResult<T> = Result<T, WalletError>;
