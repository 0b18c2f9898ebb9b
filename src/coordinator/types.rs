//! Request and response types exchanged with the coordinator
//!
//! Field names follow the coordinator's wire vocabulary. Serialization to
//! the actual transport format is left to the transport implementation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::hd::DerivationPath;
use crate::wallet::{CosignerKeySet, PublicKeyWithPath, WalletError};

/// Default address gap scanned by wallet discovery
pub const DEFAULT_DISCOVERY_GAP: u32 = 200;

/// Default page size for paginated listings
pub const DEFAULT_PAGE_LIMIT: u32 = 20;

/// Largest page size the coordinator accepts
pub const MAX_PAGE_LIMIT: u32 = 200;

// =============================================================================
// Wallet Creation & Recovery
// =============================================================================

/// Registration of a new wallet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateWalletRequest {
    pub identifier: String,
    pub primary_public_key: PublicKeyWithPath,
    pub backup_public_key: PublicKeyWithPath,
    /// Only present when the caller chooses to disclose it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_mnemonic: Option<String>,
    pub checksum: String,
    pub key_index: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateWalletResponse {
    pub blocktrail_public_keys: CosignerKeySet,
    pub key_index: u32,
}

/// What the coordinator stores for a wallet, as returned for recovery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletDescriptor {
    #[serde(default)]
    pub primary_mnemonic: Option<String>,
    pub backup_public_key: PublicKeyWithPath,
    pub blocktrail_public_keys: CosignerKeySet,
    pub checksum: String,
    pub key_index: u32,
}

// =============================================================================
// Key Index Upgrade
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeKeyIndexRequest {
    pub key_index: u32,
    pub primary_public_key: PublicKeyWithPath,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeKeyIndexResponse {
    pub blocktrail_public_keys: CosignerKeySet,
}

// =============================================================================
// Coin Selection & Sending
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinSelectionRequest {
    /// Destination address to amount in satoshis
    pub outputs: BTreeMap<String, u64>,
    pub lock: bool,
    pub zeroconf: bool,
}

/// An unspent output picked by the coordinator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedUtxo {
    pub hash: String,
    pub idx: u32,
    pub value: u64,
    pub address: String,
    pub path: DerivationPath,
    #[serde(default)]
    pub confirmations: u32,
}

/// The coordinator's answer to a coin selection request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinSelection {
    pub utxos: Vec<SelectedUtxo>,
    pub fee: u64,
    pub change: u64,
    /// Whether the coordinator reserved `utxos` for this caller
    #[serde(default)]
    pub locked: bool,
}

impl CoinSelection {
    pub fn total_input(&self) -> u64 {
        self.utxos.iter().map(|u| u.value).sum()
    }

    /// True only when the coordinator confirmed the reservation
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Derivation paths of the selected outputs, in input order
    pub fn paths(&self) -> Vec<DerivationPath> {
        self.utxos.iter().map(|u| u.path.clone()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendTransactionRequest {
    /// Hex-encoded, locally signed transaction
    pub raw_transaction: String,
    /// Derivation path of every input, in input order
    pub paths: Vec<DerivationPath>,
    pub check_fee: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastResult {
    pub txid: String,
}

// =============================================================================
// Wallet Queries
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WalletBalance {
    pub confirmed: u64,
    pub unconfirmed: u64,
}

/// A freshly issued receive path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDerivation {
    pub path: DerivationPath,
    pub address: String,
}

// =============================================================================
// Webhooks
// =============================================================================

/// A URL that receives the events of one wallet
///
/// Sent as-is to register the webhook and returned by the coordinator once
/// it is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletWebhook {
    /// Caller-chosen identifier, unique per wallet
    pub identifier: String,
    pub url: String,
}

/// Page selection for listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl Pagination {
    pub fn new(page: u32, limit: u32) -> Self {
        Self { page, limit }
    }

    /// Pages start at 1 and hold between 1 and 200 entries
    pub fn validate(&self) -> Result<(), WalletError> {
        if self.page == 0 {
            return Err(WalletError::InvalidPagination(
                "page numbers start at 1".to_string(),
            ));
        }
        if self.limit == 0 || self.limit > MAX_PAGE_LIMIT {
            return Err(WalletError::InvalidPagination(format!(
                "limit must be between 1 and {}, got {}",
                MAX_PAGE_LIMIT, self.limit
            )));
        }
        Ok(())
    }

    /// Index of the first entry on this page
    pub fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize) * self.limit as usize
    }
}

/// One page of a listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paged<T> {
    pub data: Vec<T>,
    pub current_page: u32,
    pub per_page: u32,
    pub total: u64,
}

impl<T: Clone> Paged<T> {
    /// Cut the requested page out of a full listing
    pub fn from_slice(items: &[T], page: Pagination) -> Self {
        let data = items
            .iter()
            .skip(page.offset())
            .take(page.limit as usize)
            .cloned()
            .collect();

        Self {
            data,
            current_page: page.page,
            per_page: page.limit,
            total: items.len() as u64,
        }
    }
}
