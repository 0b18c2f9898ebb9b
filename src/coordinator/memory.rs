//! In-process coordinator
//!
//! A complete [`Coordinator`] kept in memory. It issues its own cosigner
//! key per epoch from a private master key, holds funded outputs per wallet,
//! reserves outputs when a selection asks for a lock, and judges fees on
//! fee-checked sends according to a configurable verdict. Used for tests and
//! local development.
//!
//! Receive addresses are the P2PKH addresses of the primary key children;
//! the real service derives multisig addresses instead.

use serde_json::json;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use super::error::CoordinatorError;
use super::types::{
    BroadcastResult, CoinSelection, CoinSelectionRequest, CreateWalletRequest,
    CreateWalletResponse, NewDerivation, Paged, Pagination, SelectedUtxo, SendTransactionRequest,
    UpgradeKeyIndexRequest, UpgradeKeyIndexResponse, WalletBalance, WalletDescriptor,
    WalletWebhook,
};
use super::{Coordinator, CoordinatorResult};
use crate::config::Network;
use crate::crypto::{double_sha256, public_key_to_address, sha256};
use crate::hd::{ChildNumber, DerivationPath, ExtendedPrivateKey, HdResult, KeySeedGenerator};
use crate::wallet::{CosignerKeySet, PublicKeyWithPath};

/// Flat part of the fee quoted for a selection
pub const BASE_FEE: u64 = 10_000;

/// Additional fee per selected input
pub const FEE_PER_INPUT: u64 = 5_000;

/// How fee-checked sends are judged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeeVerdict {
    #[default]
    Sufficient,
    Insufficient,
}

#[derive(Debug, Clone)]
struct StoredUtxo {
    utxo: SelectedUtxo,
    locked: bool,
}

#[derive(Debug)]
struct StoredWallet {
    primary_public_keys: BTreeMap<u32, PublicKeyWithPath>,
    backup_public_key: PublicKeyWithPath,
    primary_mnemonic: Option<String>,
    checksum: String,
    key_index: u32,
    cosigner_keys: CosignerKeySet,
    utxos: Vec<StoredUtxo>,
    addresses: Vec<NewDerivation>,
    next_child: HashMap<DerivationPath, u32>,
    transactions: Vec<serde_json::Value>,
    webhooks: BTreeMap<String, String>,
}

impl StoredWallet {
    fn balance(&self) -> WalletBalance {
        self.utxos
            .iter()
            .fold(WalletBalance::default(), |mut balance, stored| {
                let bucket = if stored.utxo.confirmations > 0 {
                    &mut balance.confirmed
                } else {
                    &mut balance.unconfirmed
                };
                *bucket = bucket.saturating_add(stored.utxo.value);
                balance
            })
    }

    /// Split `M/<k>'/rest...` into the epoch key and the non-hardened rest
    fn resolve_path(
        &self,
        path: &DerivationPath,
    ) -> CoordinatorResult<(&PublicKeyWithPath, DerivationPath)> {
        let (first, rest) = path
            .indexes()
            .split_first()
            .ok_or_else(|| CoordinatorError::validation(format!("path {} is too short", path)))?;

        let epoch = match first {
            ChildNumber::Hardened { index } => *index,
            ChildNumber::Normal { .. } => {
                return Err(CoordinatorError::validation(format!(
                    "path {} must start at a hardened key index",
                    path
                )))
            }
        };

        let key = self.primary_public_keys.get(&epoch).ok_or_else(|| {
            CoordinatorError::validation(format!("unknown key index {} in path {}", epoch, path))
        })?;

        Ok((key, DerivationPath::from(rest.to_vec())))
    }

    /// Issue the next child below `parent`
    fn derive_next(&mut self, parent: &DerivationPath) -> CoordinatorResult<NewDerivation> {
        let next = self.next_child.get(parent).copied().unwrap_or(0);
        let child = ChildNumber::from_normal_idx(next)
            .map_err(|e| CoordinatorError::validation(e.to_string()))?;
        let path = parent.child(child);

        let (key, rest) = self.resolve_path(&path)?;
        let public = key
            .key
            .derive_path(&rest)
            .map_err(|e| CoordinatorError::validation(e.to_string()))?;
        let address = public_key_to_address(public.public_key(), public.network());

        let derivation = NewDerivation { path, address };
        self.next_child.insert(parent.clone(), next + 1);
        self.addresses.push(derivation.clone());
        Ok(derivation)
    }
}

#[derive(Debug, Default)]
struct State {
    wallets: BTreeMap<String, StoredWallet>,
    fee_verdict: FeeVerdict,
    funding_counter: u64,
}

/// A coordinator living in the current process
pub struct InMemoryCoordinator {
    network: Network,
    master: ExtendedPrivateKey,
    state: Mutex<State>,
    requests: AtomicUsize,
}

impl InMemoryCoordinator {
    /// Create a coordinator with a freshly generated cosigner master key
    pub fn new(network: Network) -> HdResult<Self> {
        let mnemonic = KeySeedGenerator::generate_pair()?.primary;
        let seed = KeySeedGenerator::derive_seed(&mnemonic, "")?;
        Self::from_seed(&seed[..], network)
    }

    /// Create a coordinator whose cosigner keys come from `seed`
    pub fn from_seed(seed: &[u8], network: Network) -> HdResult<Self> {
        Ok(Self {
            network,
            master: ExtendedPrivateKey::from_seed(seed, network)?,
            state: Mutex::new(State::default()),
            requests: AtomicUsize::new(0),
        })
    }

    pub fn network(&self) -> Network {
        self.network
    }

    /// Number of requests served so far
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Set how subsequent fee-checked sends are judged
    pub fn set_fee_verdict(&self, verdict: FeeVerdict) -> CoordinatorResult<()> {
        self.lock()?.fee_verdict = verdict;
        Ok(())
    }

    /// The cosigner key this coordinator issues for an epoch
    pub fn cosigner_key(&self, epoch: u32) -> HdResult<PublicKeyWithPath> {
        let path = DerivationPath::for_key_index(epoch)?;
        let key = self.master.derive_path(&path)?.public_copy();
        Ok(PublicKeyWithPath::new(key, path))
    }

    /// Credit a new output to the wallet's current receive chain
    pub fn fund(
        &self,
        identifier: &str,
        value: u64,
        confirmations: u32,
    ) -> CoordinatorResult<SelectedUtxo> {
        let mut state = self.lock()?;
        state.funding_counter += 1;
        let counter = state.funding_counter;

        let wallet = Self::wallet_mut(&mut state, identifier)?;
        let receive_chain = DerivationPath::for_key_index(wallet.key_index)
            .map_err(|e| CoordinatorError::validation(e.to_string()))?
            .child(ChildNumber::Normal { index: 0 });
        let derivation = wallet.derive_next(&receive_chain)?;

        let utxo = SelectedUtxo {
            hash: hex::encode(sha256(format!("{}:{}", identifier, counter).as_bytes())),
            idx: 0,
            value,
            address: derivation.address,
            path: derivation.path,
            confirmations,
        };

        wallet.utxos.push(StoredUtxo {
            utxo: utxo.clone(),
            locked: false,
        });
        log::debug!("Funded wallet {} with {} satoshis", identifier, value);

        Ok(utxo)
    }

    /// Number of outputs currently reserved for a wallet
    pub fn locked_outputs(&self, identifier: &str) -> CoordinatorResult<usize> {
        let mut state = self.lock()?;
        let wallet = Self::wallet_mut(&mut state, identifier)?;
        Ok(wallet.utxos.iter().filter(|u| u.locked).count())
    }

    fn lock(&self) -> CoordinatorResult<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| CoordinatorError::transport("coordinator state poisoned"))
    }

    fn wallet_mut<'a>(
        state: &'a mut State,
        identifier: &str,
    ) -> CoordinatorResult<&'a mut StoredWallet> {
        state
            .wallets
            .get_mut(identifier)
            .ok_or_else(|| CoordinatorError::not_found(format!("Wallet {} not found", identifier)))
    }

    fn count_request(&self) {
        self.requests.fetch_add(1, Ordering::SeqCst);
    }

    fn check_network(&self, entry: &PublicKeyWithPath, name: &str) -> CoordinatorResult<()> {
        if entry.key.network() != self.network {
            return Err(CoordinatorError::validation(format!(
                "{} is for {}, coordinator runs on {}",
                name,
                entry.key.network(),
                self.network
            )));
        }
        Ok(())
    }

    fn cosigner_key_or_err(&self, epoch: u32) -> CoordinatorResult<PublicKeyWithPath> {
        self.cosigner_key(epoch)
            .map_err(|e| CoordinatorError::validation(e.to_string()))
    }
}

impl Coordinator for InMemoryCoordinator {
    fn create_wallet(&self, request: CreateWalletRequest) -> CoordinatorResult<CreateWalletResponse> {
        self.count_request();

        if request.identifier.is_empty() {
            return Err(CoordinatorError::validation("identifier must not be empty"));
        }
        if request.checksum.is_empty() {
            return Err(CoordinatorError::validation("checksum must not be empty"));
        }
        let expected_path = DerivationPath::for_key_index(request.key_index)
            .map_err(|e| CoordinatorError::validation(e.to_string()))?;
        if request.primary_public_key.path != expected_path {
            return Err(CoordinatorError::validation(format!(
                "primary public key path {} does not match key index {}",
                request.primary_public_key.path, request.key_index
            )));
        }
        self.check_network(&request.primary_public_key, "primary public key")?;
        self.check_network(&request.backup_public_key, "backup public key")?;

        let cosigner_keys =
            CosignerKeySet::with_epoch(request.key_index, self.cosigner_key_or_err(request.key_index)?);

        let mut state = self.lock()?;
        if state.wallets.contains_key(&request.identifier) {
            return Err(CoordinatorError::validation(format!(
                "Wallet {} already exists",
                request.identifier
            )));
        }

        let mut primary_public_keys = BTreeMap::new();
        primary_public_keys.insert(request.key_index, request.primary_public_key);

        state.wallets.insert(
            request.identifier.clone(),
            StoredWallet {
                primary_public_keys,
                backup_public_key: request.backup_public_key,
                primary_mnemonic: request.primary_mnemonic,
                checksum: request.checksum,
                key_index: request.key_index,
                cosigner_keys: cosigner_keys.clone(),
                utxos: Vec::new(),
                addresses: Vec::new(),
                next_child: HashMap::new(),
                transactions: Vec::new(),
                webhooks: BTreeMap::new(),
            },
        );
        log::debug!("Registered wallet {}", request.identifier);

        Ok(CreateWalletResponse {
            blocktrail_public_keys: cosigner_keys,
            key_index: request.key_index,
        })
    }

    fn get_wallet(&self, identifier: &str) -> CoordinatorResult<WalletDescriptor> {
        self.count_request();
        let mut state = self.lock()?;
        let wallet = Self::wallet_mut(&mut state, identifier)?;

        Ok(WalletDescriptor {
            primary_mnemonic: wallet.primary_mnemonic.clone(),
            backup_public_key: wallet.backup_public_key.clone(),
            blocktrail_public_keys: wallet.cosigner_keys.clone(),
            checksum: wallet.checksum.clone(),
            key_index: wallet.key_index,
        })
    }

    fn upgrade_key_index(
        &self,
        identifier: &str,
        request: UpgradeKeyIndexRequest,
    ) -> CoordinatorResult<UpgradeKeyIndexResponse> {
        self.count_request();
        self.check_network(&request.primary_public_key, "primary public key")?;
        let cosigner_key = self.cosigner_key_or_err(request.key_index)?;

        let mut state = self.lock()?;
        let wallet = Self::wallet_mut(&mut state, identifier)?;

        if request.key_index <= wallet.key_index {
            return Err(CoordinatorError::validation(format!(
                "key index {} must be greater than {}",
                request.key_index, wallet.key_index
            )));
        }

        wallet
            .cosigner_keys
            .append(request.key_index, cosigner_key)
            .map_err(|e| CoordinatorError::validation(e.to_string()))?;
        wallet
            .primary_public_keys
            .insert(request.key_index, request.primary_public_key);
        wallet.key_index = request.key_index;
        log::debug!("Wallet {} upgraded to key index {}", identifier, request.key_index);

        Ok(UpgradeKeyIndexResponse {
            blocktrail_public_keys: wallet.cosigner_keys.clone(),
        })
    }

    fn coin_selection(
        &self,
        identifier: &str,
        request: CoinSelectionRequest,
    ) -> CoordinatorResult<CoinSelection> {
        self.count_request();
        let mut state = self.lock()?;
        let wallet = Self::wallet_mut(&mut state, identifier)?;

        if request.outputs.is_empty() {
            return Err(CoordinatorError::validation("no outputs requested"));
        }
        if let Some((address, _)) = request.outputs.iter().find(|(_, amount)| **amount == 0) {
            return Err(CoordinatorError::validation(format!(
                "output to {} has zero value",
                address
            )));
        }
        let required = request
            .outputs
            .values()
            .try_fold(0u64, |total, amount| total.checked_add(*amount))
            .ok_or_else(|| CoordinatorError::validation("output total overflows"))?;

        let overflow = || CoordinatorError::validation("selection amount overflows");

        // Greedy selection over spendable, unreserved outputs
        let mut selected = Vec::new();
        let mut total = 0u64;
        let mut needed = required.checked_add(BASE_FEE).ok_or_else(overflow)?;
        for (position, stored) in wallet.utxos.iter().enumerate() {
            if stored.locked || (!request.zeroconf && stored.utxo.confirmations == 0) {
                continue;
            }
            selected.push(position);
            total = total.checked_add(stored.utxo.value).ok_or_else(overflow)?;
            needed = required
                .checked_add(BASE_FEE + FEE_PER_INPUT * selected.len() as u64)
                .ok_or_else(overflow)?;
            if total >= needed {
                break;
            }
        }

        if total < needed {
            return Err(CoordinatorError::validation(format!(
                "Insufficient funds: have {}, need {}",
                total, needed
            )));
        }
        let fee = needed - required;

        if request.lock {
            for position in &selected {
                wallet.utxos[*position].locked = true;
            }
        }

        let utxos = selected
            .iter()
            .map(|position| wallet.utxos[*position].utxo.clone())
            .collect();

        Ok(CoinSelection {
            utxos,
            fee,
            change: total - required - fee,
            locked: request.lock,
        })
    }

    fn send_transaction(
        &self,
        identifier: &str,
        request: SendTransactionRequest,
    ) -> CoordinatorResult<BroadcastResult> {
        self.count_request();
        let mut state = self.lock()?;
        let fee_verdict = state.fee_verdict;
        let wallet = Self::wallet_mut(&mut state, identifier)?;

        let raw = hex::decode(&request.raw_transaction)
            .map_err(|_| CoordinatorError::validation("raw transaction is not valid hex"))?;
        if raw.is_empty() {
            return Err(CoordinatorError::validation("raw transaction is empty"));
        }
        if request.paths.is_empty() {
            return Err(CoordinatorError::validation("no input paths supplied"));
        }
        for path in &request.paths {
            wallet.resolve_path(path)?;
        }

        if request.check_fee && fee_verdict == FeeVerdict::Insufficient {
            return Err(CoordinatorError::insufficient_fee(
                "Transaction fee is below the required minimum",
            ));
        }

        let mut txid_bytes = double_sha256(&raw);
        txid_bytes.reverse();
        let txid = hex::encode(txid_bytes);

        // Only reserved outputs named by this broadcast are spent
        wallet
            .utxos
            .retain(|stored| !(stored.locked && request.paths.contains(&stored.utxo.path)));
        wallet.transactions.push(json!({
            "hash": txid,
            "inputs": request.paths.len(),
        }));
        log::debug!("Broadcast {} for wallet {}", txid, identifier);

        Ok(BroadcastResult { txid })
    }

    fn wallet_balance(&self, identifier: &str) -> CoordinatorResult<WalletBalance> {
        self.count_request();
        let mut state = self.lock()?;
        Ok(Self::wallet_mut(&mut state, identifier)?.balance())
    }

    fn wallet_discovery(&self, identifier: &str, gap: u32) -> CoordinatorResult<WalletBalance> {
        self.count_request();
        if gap == 0 {
            return Err(CoordinatorError::validation("gap must be at least 1"));
        }
        let mut state = self.lock()?;
        Ok(Self::wallet_mut(&mut state, identifier)?.balance())
    }

    fn new_derivation(
        &self,
        identifier: &str,
        path: &DerivationPath,
    ) -> CoordinatorResult<NewDerivation> {
        self.count_request();
        let mut state = self.lock()?;
        Self::wallet_mut(&mut state, identifier)?.derive_next(path)
    }

    fn wallet_transactions(
        &self,
        identifier: &str,
        page: Pagination,
    ) -> CoordinatorResult<Paged<serde_json::Value>> {
        self.count_request();
        let mut state = self.lock()?;
        let wallet = Self::wallet_mut(&mut state, identifier)?;
        Ok(Paged::from_slice(&wallet.transactions, page))
    }

    fn wallet_addresses(
        &self,
        identifier: &str,
        page: Pagination,
    ) -> CoordinatorResult<Paged<serde_json::Value>> {
        self.count_request();
        let mut state = self.lock()?;
        let wallet = Self::wallet_mut(&mut state, identifier)?;
        let addresses: Vec<serde_json::Value> = wallet
            .addresses
            .iter()
            .map(|d| json!({ "address": d.address, "path": d.path.to_string() }))
            .collect();
        Ok(Paged::from_slice(&addresses, page))
    }

    fn list_wallets(&self, page: Pagination) -> CoordinatorResult<Paged<serde_json::Value>> {
        self.count_request();
        let state = self.lock()?;
        let wallets: Vec<serde_json::Value> = state
            .wallets
            .iter()
            .map(|(identifier, wallet)| {
                json!({ "identifier": identifier, "key_index": wallet.key_index })
            })
            .collect();
        Ok(Paged::from_slice(&wallets, page))
    }

    fn setup_wallet_webhook(
        &self,
        identifier: &str,
        webhook: WalletWebhook,
    ) -> CoordinatorResult<WalletWebhook> {
        self.count_request();
        if webhook.identifier.is_empty() {
            return Err(CoordinatorError::validation("webhook identifier must not be empty"));
        }
        if webhook.url.is_empty() {
            return Err(CoordinatorError::validation("webhook url must not be empty"));
        }

        let mut state = self.lock()?;
        let wallet = Self::wallet_mut(&mut state, identifier)?;
        if wallet.webhooks.contains_key(&webhook.identifier) {
            return Err(CoordinatorError::validation(format!(
                "Webhook {} already exists",
                webhook.identifier
            )));
        }
        wallet
            .webhooks
            .insert(webhook.identifier.clone(), webhook.url.clone());
        log::debug!("Wallet {} webhook {} -> {}", identifier, webhook.identifier, webhook.url);

        Ok(webhook)
    }

    fn delete_wallet_webhook(
        &self,
        identifier: &str,
        webhook_identifier: &str,
    ) -> CoordinatorResult<bool> {
        self.count_request();
        let mut state = self.lock()?;
        let wallet = Self::wallet_mut(&mut state, identifier)?;
        match wallet.webhooks.remove(webhook_identifier) {
            Some(_) => Ok(true),
            None => Err(CoordinatorError::not_found(format!(
                "Webhook {} not found",
                webhook_identifier
            ))),
        }
    }
}
