//! Wallet protocol client
//!
//! `WalletClient` drives the wallet lifecycle against a [`Coordinator`]:
//! creating and recovering wallets, upgrading the key-index epoch, and the
//! coin selection / send exchange. Key material is generated and derived
//! locally; the coordinator only ever sees public keys, the checksum and,
//! unless disabled, the primary mnemonic.
//!
//! The network is taken from the [`ClientConfig`] and passed explicitly to
//! every key derivation and checksum computation.

use std::collections::BTreeMap;
use zeroize::Zeroizing;

use crate::config::ClientConfig;
use crate::coordinator::{
    BroadcastResult, CoinSelection, CoinSelectionRequest, Coordinator, CoordinatorError,
    CreateWalletRequest, NewDerivation, Paged, Pagination, SendTransactionRequest,
    UpgradeKeyIndexRequest, WalletBalance, WalletWebhook, DEFAULT_DISCOVERY_GAP,
};
use crate::hd::{
    ChecksumBinder, DerivationPath, ExtendedPrivateKey, ExtendedPublicKey, KeySeedGenerator,
};
use crate::wallet::{CosignerKeySet, PublicKeyWithPath, WalletError, WalletRecord, WalletResult};

/// Options for wallet creation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreateOptions {
    /// Epoch of the first primary key
    pub key_index: u32,
    /// Send the primary mnemonic to the coordinator so it can be returned
    /// on recovery
    pub disclose_mnemonic: bool,
}

impl Default for CreateOptions {
    fn default() -> Self {
        Self {
            key_index: 0,
            disclose_mnemonic: true,
        }
    }
}

/// Everything produced by wallet creation
///
/// The mnemonics are shown to the user once and must be written down; the
/// backup mnemonic is the only way to ever rebuild the backup private key.
pub struct CreatedWallet {
    pub record: WalletRecord,
    pub primary_mnemonic: Zeroizing<String>,
    pub backup_mnemonic: Zeroizing<String>,
    pub cosigner_keys: CosignerKeySet,
}

/// Client for the co-signed wallet protocol
pub struct WalletClient<C: Coordinator> {
    coordinator: C,
    config: ClientConfig,
}

impl<C: Coordinator> WalletClient<C> {
    pub fn new(coordinator: C, config: ClientConfig) -> Self {
        Self {
            coordinator,
            config,
        }
    }

    pub fn coordinator(&self) -> &C {
        &self.coordinator
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // =========================================================================
    // Create & Recover
    // =========================================================================

    /// Create and register a new wallet
    pub fn create_wallet(
        &self,
        identifier: &str,
        passphrase: &str,
        key_index: u32,
    ) -> WalletResult<CreatedWallet> {
        self.create_wallet_with(
            identifier,
            passphrase,
            CreateOptions {
                key_index,
                ..Default::default()
            },
        )
    }

    /// Create and register a new wallet with explicit options
    ///
    /// Nothing is returned unless the coordinator accepted the wallet and
    /// its cosigner keys are consistent with the requested epoch.
    pub fn create_wallet_with(
        &self,
        identifier: &str,
        passphrase: &str,
        options: CreateOptions,
    ) -> WalletResult<CreatedWallet> {
        let network = self.config.network;
        log::info!(
            "Creating wallet {} on {} at key index {}",
            identifier,
            network,
            options.key_index
        );

        let mnemonics = KeySeedGenerator::generate_pair()?;

        let primary_seed = KeySeedGenerator::derive_seed(&mnemonics.primary, passphrase)?;
        let primary = ExtendedPrivateKey::from_seed(&primary_seed[..], network)?;
        let primary_path = DerivationPath::for_key_index(options.key_index)?;
        let primary_public_key = primary.derive_path(&primary_path)?.public_copy();

        // The backup private key does not outlive this block
        let backup_public_key = {
            let backup_seed = KeySeedGenerator::derive_seed(&mnemonics.backup, "")?;
            ExtendedPrivateKey::from_seed(&backup_seed[..], network)?.public_copy()
        };

        let checksum = ChecksumBinder::compute(&primary);

        let request = CreateWalletRequest {
            identifier: identifier.to_string(),
            primary_public_key: PublicKeyWithPath::new(primary_public_key, primary_path),
            backup_public_key: PublicKeyWithPath::new(
                backup_public_key.clone(),
                DerivationPath::root(),
            ),
            primary_mnemonic: options
                .disclose_mnemonic
                .then(|| mnemonics.primary.to_string()),
            checksum,
            key_index: options.key_index,
        };

        let response = self.coordinator.create_wallet(request)?;
        let record = WalletRecord::assemble(
            identifier.to_string(),
            primary,
            backup_public_key,
            response.blocktrail_public_keys.clone(),
            response.key_index,
        )?;

        log::info!(
            "Wallet {} created with {} cosigner key(s)",
            identifier,
            response.blocktrail_public_keys.len()
        );

        Ok(CreatedWallet {
            record,
            primary_mnemonic: mnemonics.primary,
            backup_mnemonic: mnemonics.backup,
            cosigner_keys: response.blocktrail_public_keys,
        })
    }

    /// Recover a wallet using the mnemonic stored by the coordinator
    pub fn recover_wallet(&self, identifier: &str, passphrase: &str) -> WalletResult<WalletRecord> {
        self.recover(identifier, None, passphrase)
    }

    /// Recover a wallet from a mnemonic the caller kept
    ///
    /// Needed for wallets created without disclosing the mnemonic.
    pub fn recover_wallet_with_mnemonic(
        &self,
        identifier: &str,
        primary_mnemonic: &str,
        passphrase: &str,
    ) -> WalletResult<WalletRecord> {
        self.recover(identifier, Some(primary_mnemonic), passphrase)
    }

    fn recover(
        &self,
        identifier: &str,
        primary_mnemonic: Option<&str>,
        passphrase: &str,
    ) -> WalletResult<WalletRecord> {
        log::info!("Recovering wallet {}", identifier);

        let descriptor = self.coordinator.get_wallet(identifier)?;
        let mnemonic = match primary_mnemonic.or(descriptor.primary_mnemonic.as_deref()) {
            Some(mnemonic) => Zeroizing::new(mnemonic.to_string()),
            None => return Err(WalletError::MnemonicUnavailable(identifier.to_string())),
        };

        let seed = KeySeedGenerator::derive_seed(&mnemonic, passphrase)?;
        let primary = ExtendedPrivateKey::from_seed(&seed[..], self.config.network)?;

        let computed = ChecksumBinder::compute(&primary);
        if computed != descriptor.checksum {
            log::warn!("Checksum mismatch while recovering wallet {}", identifier);
            return Err(WalletError::PassphraseMismatch {
                expected: descriptor.checksum,
                computed,
            });
        }

        let record = WalletRecord::assemble(
            identifier.to_string(),
            primary,
            descriptor.backup_public_key.key,
            descriptor.blocktrail_public_keys,
            descriptor.key_index,
        )?;
        log::debug!(
            "Wallet {} recovered at key index {}",
            identifier,
            record.key_index()
        );

        Ok(record)
    }

    // =========================================================================
    // Key Index Upgrade
    // =========================================================================

    /// Move a wallet to a new key-index epoch
    ///
    /// `primary_public_key` must be the record's primary key at
    /// `M/<new_key_index>'`. Both that and the epoch increase are checked
    /// before anything is sent. The coordinator's answer must repeat every
    /// existing cosigner key and add exactly one for the new epoch;
    /// otherwise the record is left untouched.
    pub fn upgrade_key_index<'r>(
        &self,
        record: &'r mut WalletRecord,
        new_key_index: u32,
        primary_public_key: &ExtendedPublicKey,
    ) -> WalletResult<&'r CosignerKeySet> {
        self.ensure_network(record)?;

        if new_key_index <= record.key_index() {
            return Err(WalletError::KeyIndexNotIncreasing {
                current: record.key_index(),
                requested: new_key_index,
            });
        }

        if record.primary_public_key(new_key_index)? != *primary_public_key {
            return Err(WalletError::PrimaryKeyMismatch(new_key_index));
        }

        log::info!(
            "Upgrading wallet {} from key index {} to {}",
            record.identifier(),
            record.key_index(),
            new_key_index
        );

        let request = UpgradeKeyIndexRequest {
            key_index: new_key_index,
            primary_public_key: PublicKeyWithPath::new(
                primary_public_key.clone(),
                DerivationPath::for_key_index(new_key_index)?,
            ),
        };
        let response = self
            .coordinator
            .upgrade_key_index(record.identifier(), request)?;

        let next = record
            .cosigner_keys()
            .extend_from(&response.blocktrail_public_keys, new_key_index)?;
        record.advance_epoch(next, new_key_index);

        Ok(record.cosigner_keys())
    }

    // =========================================================================
    // Coin Selection & Sending
    // =========================================================================

    /// Ask the coordinator to select outputs paying `outputs`
    ///
    /// With `lock` set the coordinator is asked to reserve the selection.
    /// Only [`CoinSelection::is_locked`] tells whether it did; nothing is
    /// tracked locally.
    pub fn select_coins(
        &self,
        record: &WalletRecord,
        outputs: &BTreeMap<String, u64>,
        lock: bool,
        allow_zero_conf: bool,
    ) -> WalletResult<CoinSelection> {
        self.ensure_network(record)?;
        if outputs.is_empty() {
            return Err(WalletError::NoOutputs);
        }

        let selection = self.coordinator.coin_selection(
            record.identifier(),
            CoinSelectionRequest {
                outputs: outputs.clone(),
                lock,
                zeroconf: allow_zero_conf,
            },
        )?;

        if lock && !selection.is_locked() {
            log::warn!(
                "Coordinator did not confirm the lock for wallet {}; selection may be reused",
                record.identifier()
            );
        }
        log::debug!(
            "Selected {} output(s) for wallet {}, fee {}",
            selection.utxos.len(),
            record.identifier(),
            selection.fee
        );

        Ok(selection)
    }

    /// Submit a locally signed transaction for countersigning and broadcast
    ///
    /// `paths` lists the derivation path of every input in input order. With
    /// `check_fee` set, a fee rejection surfaces as
    /// [`WalletError::FeeRejected`].
    pub fn send(
        &self,
        record: &WalletRecord,
        raw_transaction: &str,
        paths: &[DerivationPath],
        check_fee: bool,
    ) -> WalletResult<BroadcastResult> {
        self.ensure_network(record)?;

        let request = SendTransactionRequest {
            raw_transaction: raw_transaction.to_string(),
            paths: paths.to_vec(),
            check_fee,
        };

        let result = self
            .coordinator
            .send_transaction(record.identifier(), request)
            .map_err(|e| fee_or_coordinator_error(e, check_fee))?;

        log::info!("Broadcast {} for wallet {}", result.txid, record.identifier());
        Ok(result)
    }

    // =========================================================================
    // Wallet Queries
    // =========================================================================

    pub fn balance(&self, identifier: &str) -> WalletResult<WalletBalance> {
        Ok(self.coordinator.wallet_balance(identifier)?)
    }

    /// Scan for used addresses; `gap` defaults to 200
    pub fn discovery(&self, identifier: &str, gap: Option<u32>) -> WalletResult<WalletBalance> {
        let gap = gap.unwrap_or(DEFAULT_DISCOVERY_GAP);
        log::debug!("Running discovery for wallet {} with gap {}", identifier, gap);
        Ok(self.coordinator.wallet_discovery(identifier, gap)?)
    }

    pub fn new_derivation(
        &self,
        identifier: &str,
        path: &DerivationPath,
    ) -> WalletResult<NewDerivation> {
        Ok(self.coordinator.new_derivation(identifier, path)?)
    }

    pub fn transactions(
        &self,
        identifier: &str,
        page: Pagination,
    ) -> WalletResult<Paged<serde_json::Value>> {
        page.validate()?;
        Ok(self.coordinator.wallet_transactions(identifier, page)?)
    }

    pub fn addresses(
        &self,
        identifier: &str,
        page: Pagination,
    ) -> WalletResult<Paged<serde_json::Value>> {
        page.validate()?;
        Ok(self.coordinator.wallet_addresses(identifier, page)?)
    }

    pub fn list_wallets(&self, page: Pagination) -> WalletResult<Paged<serde_json::Value>> {
        page.validate()?;
        Ok(self.coordinator.list_wallets(page)?)
    }

    // =========================================================================
    // Webhooks
    // =========================================================================

    /// Register `url` to receive the events of a wallet
    pub fn setup_wallet_webhook(
        &self,
        identifier: &str,
        webhook_identifier: &str,
        url: &str,
    ) -> WalletResult<WalletWebhook> {
        let webhook = WalletWebhook {
            identifier: webhook_identifier.to_string(),
            url: url.to_string(),
        };
        let stored = self.coordinator.setup_wallet_webhook(identifier, webhook)?;
        log::info!("Webhook {} set up for wallet {}", stored.identifier, identifier);
        Ok(stored)
    }

    pub fn delete_wallet_webhook(
        &self,
        identifier: &str,
        webhook_identifier: &str,
    ) -> WalletResult<bool> {
        Ok(self
            .coordinator
            .delete_wallet_webhook(identifier, webhook_identifier)?)
    }

    fn ensure_network(&self, record: &WalletRecord) -> WalletResult<()> {
        if record.network() != self.config.network {
            return Err(WalletError::NetworkMismatch {
                expected: self.config.network,
                actual: record.network(),
            });
        }
        Ok(())
    }
}

fn fee_or_coordinator_error(error: CoordinatorError, check_fee: bool) -> WalletError {
    if check_fee && error.is_fee_rejection() {
        WalletError::FeeRejected(error.message)
    } else {
        WalletError::Coordinator(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Network;
    use crate::coordinator::{
        CoordinatorErrorKind, CoordinatorResult, CreateWalletResponse, FeeVerdict,
        InMemoryCoordinator, UpgradeKeyIndexResponse, WalletDescriptor, BASE_FEE, FEE_PER_INPUT,
    };
    use crate::crypto::sha256;

    /// Delegates everything but never confirms a coin selection lock
    struct UnconfirmedLocks(InMemoryCoordinator);

    impl Coordinator for UnconfirmedLocks {
        fn create_wallet(
            &self,
            request: CreateWalletRequest,
        ) -> CoordinatorResult<CreateWalletResponse> {
            self.0.create_wallet(request)
        }

        fn get_wallet(&self, identifier: &str) -> CoordinatorResult<WalletDescriptor> {
            self.0.get_wallet(identifier)
        }

        fn upgrade_key_index(
            &self,
            identifier: &str,
            request: UpgradeKeyIndexRequest,
        ) -> CoordinatorResult<UpgradeKeyIndexResponse> {
            self.0.upgrade_key_index(identifier, request)
        }

        fn coin_selection(
            &self,
            identifier: &str,
            request: CoinSelectionRequest,
        ) -> CoordinatorResult<CoinSelection> {
            let mut selection = self.0.coin_selection(identifier, request)?;
            selection.locked = false;
            Ok(selection)
        }

        fn send_transaction(
            &self,
            identifier: &str,
            request: SendTransactionRequest,
        ) -> CoordinatorResult<BroadcastResult> {
            self.0.send_transaction(identifier, request)
        }

        fn wallet_balance(&self, identifier: &str) -> CoordinatorResult<WalletBalance> {
            self.0.wallet_balance(identifier)
        }

        fn wallet_discovery(&self, identifier: &str, gap: u32) -> CoordinatorResult<WalletBalance> {
            self.0.wallet_discovery(identifier, gap)
        }

        fn new_derivation(
            &self,
            identifier: &str,
            path: &DerivationPath,
        ) -> CoordinatorResult<NewDerivation> {
            self.0.new_derivation(identifier, path)
        }

        fn wallet_transactions(
            &self,
            identifier: &str,
            page: Pagination,
        ) -> CoordinatorResult<Paged<serde_json::Value>> {
            self.0.wallet_transactions(identifier, page)
        }

        fn wallet_addresses(
            &self,
            identifier: &str,
            page: Pagination,
        ) -> CoordinatorResult<Paged<serde_json::Value>> {
            self.0.wallet_addresses(identifier, page)
        }

        fn list_wallets(&self, page: Pagination) -> CoordinatorResult<Paged<serde_json::Value>> {
            self.0.list_wallets(page)
        }

        fn setup_wallet_webhook(
            &self,
            identifier: &str,
            webhook: WalletWebhook,
        ) -> CoordinatorResult<WalletWebhook> {
            self.0.setup_wallet_webhook(identifier, webhook)
        }

        fn delete_wallet_webhook(
            &self,
            identifier: &str,
            webhook_identifier: &str,
        ) -> CoordinatorResult<bool> {
            self.0.delete_wallet_webhook(identifier, webhook_identifier)
        }
    }

    fn client() -> WalletClient<InMemoryCoordinator> {
        let coordinator = InMemoryCoordinator::from_seed(&[9u8; 32], Network::Testnet).unwrap();
        WalletClient::new(coordinator, ClientConfig::for_network(Network::Testnet))
    }

    fn outputs(amount: u64) -> BTreeMap<String, u64> {
        let mut outputs = BTreeMap::new();
        outputs.insert("addrA".to_string(), amount);
        outputs
    }

    fn rederive(mnemonic: &str, passphrase: &str) -> ExtendedPrivateKey {
        let seed = KeySeedGenerator::derive_seed(mnemonic, passphrase).unwrap();
        ExtendedPrivateKey::from_seed(&seed[..], Network::Testnet).unwrap()
    }

    #[test]
    fn test_create_then_recover() {
        let client = client();
        let created = client.create_wallet("w1", "pw", 0).unwrap();

        let primary = rederive(&created.primary_mnemonic, "pw");
        let primary_path = DerivationPath::for_key_index(0).unwrap();
        assert_eq!(created.record.checksum(), ChecksumBinder::compute(&primary));
        assert_eq!(
            created.record.primary_public_key(0).unwrap(),
            primary.derive_path(&primary_path).unwrap().public_copy()
        );
        assert_eq!(created.cosigner_keys.len(), 1);
        assert_eq!(created.record.key_index(), 0);
        assert_ne!(*created.primary_mnemonic, *created.backup_mnemonic);

        let recovered = client.recover_wallet("w1", "pw").unwrap();
        assert_eq!(recovered.checksum(), created.record.checksum());
        assert_eq!(
            recovered.primary_public_key(0).unwrap(),
            created.record.primary_public_key(0).unwrap()
        );
        assert_eq!(recovered.backup_public_key(), created.record.backup_public_key());
        assert_eq!(recovered.cosigner_keys(), &created.cosigner_keys);
    }

    #[test]
    fn test_wrong_passphrase_is_rejected() {
        let client = client();
        let created = client.create_wallet("w1", "pw", 0).unwrap();

        match client.recover_wallet("w1", "pw2") {
            Err(WalletError::PassphraseMismatch { expected, computed }) => {
                assert_eq!(expected, created.record.checksum());
                assert_ne!(computed, expected);
            }
            other => panic!("expected PassphraseMismatch, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_undisclosed_mnemonic_needs_caller_copy() {
        let client = client();
        let created = client
            .create_wallet_with(
                "w1",
                "pw",
                CreateOptions {
                    disclose_mnemonic: false,
                    ..Default::default()
                },
            )
            .unwrap();

        assert!(matches!(
            client.recover_wallet("w1", "pw"),
            Err(WalletError::MnemonicUnavailable(_))
        ));

        let recovered = client
            .recover_wallet_with_mnemonic("w1", &created.primary_mnemonic, "pw")
            .unwrap();
        assert_eq!(recovered.checksum(), created.record.checksum());
    }

    #[test]
    fn test_unknown_wallet_surfaces_coordinator_error() {
        let client = client();
        match client.recover_wallet("missing", "pw") {
            Err(WalletError::Coordinator(e)) => assert_eq!(e.kind, CoordinatorErrorKind::NotFound),
            other => panic!("expected not found, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_upgrade_appends_one_epoch() {
        let client = client();
        let mut record = client.create_wallet("w1", "pw", 0).unwrap().record;
        let before = record.cosigner_keys().clone();

        let keys = record.upgrade_key_index(&client, 1).unwrap();
        assert_eq!(keys.len(), 2);
        assert_eq!(keys.get(0), before.get(0));
        assert_eq!(keys.latest_epoch(), Some(1));
        assert_eq!(record.key_index(), 1);

        let recovered = client.recover_wallet("w1", "pw").unwrap();
        assert_eq!(recovered.key_index(), 1);
        assert_eq!(recovered.cosigner_keys(), record.cosigner_keys());
    }

    #[test]
    fn test_upgrade_rejected_before_any_request() {
        let client = client();
        let mut record = client.create_wallet("w1", "pw", 0).unwrap().record;
        record.upgrade_key_index(&client, 2).unwrap();
        let requests = client.coordinator().request_count();

        for stale in [0, 1, 2] {
            assert!(matches!(
                record.upgrade_key_index(&client, stale),
                Err(WalletError::KeyIndexNotIncreasing { current: 2, .. })
            ));
        }

        let wrong_key = record.primary_public_key(4).unwrap();
        assert!(matches!(
            client.upgrade_key_index(&mut record, 3, &wrong_key),
            Err(WalletError::PrimaryKeyMismatch(3))
        ));

        assert_eq!(client.coordinator().request_count(), requests);
        assert_eq!(record.key_index(), 2);
        assert_eq!(record.cosigner_keys().len(), 2);
    }

    #[test]
    fn test_select_coins_reports_coordinator_lock() {
        let client = client();
        let record = client.create_wallet("w1", "pw", 0).unwrap().record;
        client.coordinator().fund("w1", 100_000, 3).unwrap();
        client.coordinator().fund("w1", 100_000, 3).unwrap();

        let first = client.select_coins(&record, &outputs(50_000), true, false).unwrap();
        assert!(first.is_locked());

        let second = client.select_coins(&record, &outputs(50_000), true, false).unwrap();
        assert!(second.is_locked());
        assert_ne!(first.utxos[0].hash, second.utxos[0].hash);

        let unlocked = client.select_coins(&record, &outputs(1_000), false, false);
        assert!(matches!(unlocked, Err(WalletError::Coordinator(_))));
    }

    #[test]
    fn test_unconfirmed_lock_is_passed_through() {
        let coordinator = InMemoryCoordinator::from_seed(&[9u8; 32], Network::Testnet).unwrap();
        let client = WalletClient::new(
            UnconfirmedLocks(coordinator),
            ClientConfig::for_network(Network::Testnet),
        );
        let record = client.create_wallet("w1", "pw", 0).unwrap().record;
        let funded = client.coordinator().0.fund("w1", 100_000, 3).unwrap();

        let selection = client.select_coins(&record, &outputs(50_000), true, false).unwrap();
        assert!(!selection.is_locked());
        assert_eq!(selection.utxos, vec![funded]);
        assert_eq!(selection.fee, BASE_FEE + FEE_PER_INPUT);
        assert_eq!(selection.change, 100_000 - 50_000 - selection.fee);
    }

    #[test]
    fn test_send_leaves_other_reservations_locked() {
        let client = client();
        let record = client.create_wallet("w1", "pw", 0).unwrap().record;
        client.coordinator().fund("w1", 100_000, 3).unwrap();
        client.coordinator().fund("w1", 100_000, 3).unwrap();

        let first = client.select_coins(&record, &outputs(50_000), true, false).unwrap();
        let second = client.select_coins(&record, &outputs(50_000), true, false).unwrap();
        assert!(first.is_locked() && second.is_locked());

        client.send(&record, "0100", &first.paths(), false).unwrap();

        assert_eq!(client.balance("w1").unwrap().confirmed, 100_000);
        assert_eq!(client.coordinator().locked_outputs("w1").unwrap(), 1);
    }

    #[test]
    fn test_oversized_selection_leaves_coordinator_usable() {
        let client = client();
        let record = client.create_wallet("w1", "pw", 0).unwrap().record;
        client.coordinator().fund("w1", 100_000, 3).unwrap();

        assert!(matches!(
            client.select_coins(&record, &outputs(u64::MAX - 1), false, false),
            Err(WalletError::Coordinator(_))
        ));
        assert_eq!(client.balance("w1").unwrap().confirmed, 100_000);
    }

    #[test]
    fn test_wallet_webhooks() {
        let client = client();
        client.create_wallet("w1", "pw", 0).unwrap();

        let webhook = client
            .setup_wallet_webhook("w1", "payments", "https://example.com/hook")
            .unwrap();
        assert_eq!(webhook.identifier, "payments");
        assert_eq!(webhook.url, "https://example.com/hook");

        assert!(client.delete_wallet_webhook("w1", "payments").unwrap());
        assert!(matches!(
            client.delete_wallet_webhook("w1", "payments"),
            Err(WalletError::Coordinator(e)) if e.kind == CoordinatorErrorKind::NotFound
        ));
    }

    #[test]
    fn test_select_coins_without_outputs() {
        let client = client();
        let record = client.create_wallet("w1", "pw", 0).unwrap().record;
        let requests = client.coordinator().request_count();

        assert!(matches!(
            client.select_coins(&record, &BTreeMap::new(), false, false),
            Err(WalletError::NoOutputs)
        ));
        assert_eq!(client.coordinator().request_count(), requests);
    }

    #[test]
    fn test_send_fee_rejection() {
        let client = client();
        let record = client.create_wallet("w1", "pw", 0).unwrap().record;
        client.coordinator().fund("w1", 100_000, 1).unwrap();

        let selection = client.select_coins(&record, &outputs(50_000), true, false).unwrap();
        let paths = selection.paths();
        let digest = sha256(b"unsigned transaction");
        let raw = hex::encode(record.sign_digest(&paths[0], &digest).unwrap());

        client
            .coordinator()
            .set_fee_verdict(FeeVerdict::Insufficient)
            .unwrap();
        assert!(matches!(
            client.send(&record, &raw, &paths, true),
            Err(WalletError::FeeRejected(_))
        ));

        let broadcast = client.send(&record, &raw, &paths, false).unwrap();
        assert_eq!(broadcast.txid.len(), 64);

        let history = client.transactions("w1", Pagination::default()).unwrap();
        assert_eq!(history.total, 1);
        assert_eq!(client.balance("w1").unwrap(), WalletBalance::default());
    }

    #[test]
    fn test_send_validation_error_is_not_a_fee_error() {
        let client = client();
        let record = client.create_wallet("w1", "pw", 0).unwrap().record;
        let path: DerivationPath = "M/0'/0/0".parse().unwrap();

        match client.send(&record, "not hex", &[path], true) {
            Err(WalletError::Coordinator(e)) => {
                assert_eq!(e.kind, CoordinatorErrorKind::Validation)
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_pagination_checked_locally() {
        let client = client();
        client.create_wallet("w1", "pw", 0).unwrap();
        let requests = client.coordinator().request_count();

        assert!(matches!(
            client.list_wallets(Pagination::new(0, 20)),
            Err(WalletError::InvalidPagination(_))
        ));
        assert!(client.addresses("w1", Pagination::new(1, 500)).is_err());
        assert_eq!(client.coordinator().request_count(), requests);

        let wallets = client.list_wallets(Pagination::default()).unwrap();
        assert_eq!(wallets.total, 1);
        assert_eq!(wallets.data[0]["identifier"], "w1");
    }

    #[test]
    fn test_network_comes_from_config() {
        let testnet = client();
        let created = testnet.create_wallet("w1", "pw", 0).unwrap();
        assert_eq!(created.record.network(), Network::Testnet);
        assert!(created.record.backup_public_key().to_string().starts_with("tpub"));

        let coordinator = InMemoryCoordinator::from_seed(&[9u8; 32], Network::Testnet).unwrap();
        let mainnet = WalletClient::new(coordinator, ClientConfig::for_network(Network::Mainnet));
        assert!(matches!(
            mainnet.create_wallet("w1", "pw", 0),
            Err(WalletError::Coordinator(_))
        ));
    }

    #[test]
    fn test_records_used_from_separate_threads() {
        let client = client();
        let mut records: Vec<WalletRecord> = ["w1", "w2", "w3"]
            .iter()
            .map(|id| client.create_wallet(id, "pw", 0).unwrap().record)
            .collect();

        let client = &client;
        std::thread::scope(|scope| {
            for record in records.iter_mut() {
                scope.spawn(move || {
                    record.upgrade_key_index(client, 1).unwrap();
                    let receive: DerivationPath = "M/1'/0".parse().unwrap();
                    client.new_derivation(record.identifier(), &receive).unwrap();
                });
            }
        });

        for record in &records {
            assert_eq!(record.key_index(), 1);
            let addresses = client
                .addresses(record.identifier(), Pagination::default())
                .unwrap();
            assert_eq!(addresses.total, 1);
        }
    }
}
