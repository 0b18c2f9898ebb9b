//! Wallet records, cosigner key sets and wallet errors

pub mod cosigner;
pub mod error;
pub mod record;

pub use cosigner::{CosignerKeySet, PublicKeyWithPath};
pub use error::{WalletError, WalletResult};
pub use record::WalletRecord;
