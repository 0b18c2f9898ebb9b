//! Blocktrail Wallet: a co-signed HD wallet client in Rust
//!
//! This crate provides the client side of a 2-of-3 co-signed wallet:
//! - BIP39 mnemonics and BIP32 key trees (secp256k1)
//! - A passphrase checksum bound to the primary key
//! - Cosigner key sets versioned by key-index epoch
//! - The create / recover / upgrade / select / send protocol against a
//!   remote coordinator
//! - An in-process coordinator for tests and local development
//!
//! # Example
//!
//! ```rust
//! use blocktrail_wallet::config::{ClientConfig, Network};
//! use blocktrail_wallet::coordinator::InMemoryCoordinator;
//! use blocktrail_wallet::WalletClient;
//!
//! let coordinator = InMemoryCoordinator::new(Network::Testnet).unwrap();
//! let client = WalletClient::new(coordinator, ClientConfig::for_network(Network::Testnet));
//!
//! // Create a wallet and write the mnemonics down
//! let created = client.create_wallet("my-wallet", "passphrase", 0).unwrap();
//! println!("Checksum: {}", created.record.checksum());
//!
//! // Recover it later from the coordinator's descriptor
//! let recovered = client.recover_wallet("my-wallet", "passphrase").unwrap();
//! assert_eq!(recovered.checksum(), created.record.checksum());
//! ```

pub mod cli;
pub mod client;
pub mod config;
pub mod coordinator;
pub mod crypto;
pub mod hd;
pub mod wallet;

// Re-export commonly used types
pub use client::{CreateOptions, CreatedWallet, WalletClient};
pub use config::{ClientConfig, Network};
pub use coordinator::{Coordinator, CoordinatorError, CoordinatorErrorKind, InMemoryCoordinator};
pub use hd::{
    ChecksumBinder, DerivationPath, ExtendedPrivateKey, ExtendedPublicKey, HdError,
    KeySeedGenerator,
};
pub use wallet::{CosignerKeySet, PublicKeyWithPath, WalletError, WalletRecord};
