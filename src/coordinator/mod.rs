//! Remote coordinator boundary
//!
//! The coordinator is the co-signing service: it stores wallet descriptors,
//! contributes cosigner public keys, selects coins and broadcasts. This
//! crate talks to it only through the [`Coordinator`] trait; request
//! transport and authentication belong to the implementation.
//!
//! Every call is a single synchronous request/response. Implementations
//! must not retry on their own in a way that could hide validation or
//! checksum-related failures.

pub mod error;
pub mod memory;
pub mod types;

pub use error::{CoordinatorError, CoordinatorErrorKind};
pub use memory::{FeeVerdict, InMemoryCoordinator, BASE_FEE, FEE_PER_INPUT};
pub use types::{
    BroadcastResult, CoinSelection, CoinSelectionRequest, CreateWalletRequest,
    CreateWalletResponse, NewDerivation, Paged, Pagination, SelectedUtxo, SendTransactionRequest,
    UpgradeKeyIndexRequest, UpgradeKeyIndexResponse, WalletBalance, WalletDescriptor,
    WalletWebhook, DEFAULT_DISCOVERY_GAP, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT,
};

use crate::hd::DerivationPath;

/// Result type for coordinator calls
pub type CoordinatorResult<T> = Result<T, CoordinatorError>;

/// The remote co-signing service
pub trait Coordinator: Send + Sync {
    /// Register a new wallet
    fn create_wallet(&self, request: CreateWalletRequest) -> CoordinatorResult<CreateWalletResponse>;

    /// Fetch the stored descriptor of a wallet
    fn get_wallet(&self, identifier: &str) -> CoordinatorResult<WalletDescriptor>;

    /// Register the primary key of a new epoch and receive the cosigner keys
    fn upgrade_key_index(
        &self,
        identifier: &str,
        request: UpgradeKeyIndexRequest,
    ) -> CoordinatorResult<UpgradeKeyIndexResponse>;

    /// Pick unspent outputs covering the requested payments
    fn coin_selection(
        &self,
        identifier: &str,
        request: CoinSelectionRequest,
    ) -> CoordinatorResult<CoinSelection>;

    /// Countersign and broadcast a transaction
    fn send_transaction(
        &self,
        identifier: &str,
        request: SendTransactionRequest,
    ) -> CoordinatorResult<BroadcastResult>;

    fn wallet_balance(&self, identifier: &str) -> CoordinatorResult<WalletBalance>;

    /// Scan the wallet's address space up to `gap` unused addresses
    fn wallet_discovery(&self, identifier: &str, gap: u32) -> CoordinatorResult<WalletBalance>;

    /// Issue the next unused path below `path`
    fn new_derivation(
        &self,
        identifier: &str,
        path: &DerivationPath,
    ) -> CoordinatorResult<NewDerivation>;

    fn wallet_transactions(
        &self,
        identifier: &str,
        page: Pagination,
    ) -> CoordinatorResult<Paged<serde_json::Value>>;

    fn wallet_addresses(
        &self,
        identifier: &str,
        page: Pagination,
    ) -> CoordinatorResult<Paged<serde_json::Value>>;

    fn list_wallets(&self, page: Pagination) -> CoordinatorResult<Paged<serde_json::Value>>;

    /// Register a URL that receives this wallet's events
    fn setup_wallet_webhook(
        &self,
        identifier: &str,
        webhook: WalletWebhook,
    ) -> CoordinatorResult<WalletWebhook>;

    /// Remove a wallet webhook, returning whether it existed
    fn delete_wallet_webhook(
        &self,
        identifier: &str,
        webhook_identifier: &str,
    ) -> CoordinatorResult<bool>;
}
