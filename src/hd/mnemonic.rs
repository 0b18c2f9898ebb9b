//! Mnemonic and seed generation
//!
//! Wallets are created from two independent BIP39 mnemonics: the primary
//! (combined with the user's passphrase) and the backup (empty passphrase).
//! Mnemonics, seeds and entropy are wrapped in `Zeroizing` so they are wiped
//! when dropped.

use bip39::{Language, Mnemonic};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

use super::error::{HdError, HdResult};

/// Entropy per mnemonic in bytes (256 bits, 24 words)
pub const ENTROPY_BYTES: usize = 32;

/// Length of a BIP39 seed in bytes
pub const SEED_BYTES: usize = 64;

/// A BIP39 seed derived from a mnemonic and passphrase
pub type Seed = Zeroizing<[u8; SEED_BYTES]>;

/// The two mnemonics generated for a new wallet
pub struct MnemonicPair {
    pub primary: Zeroizing<String>,
    pub backup: Zeroizing<String>,
}

/// Source of fresh mnemonics and of seeds for existing ones
pub struct KeySeedGenerator;

impl KeySeedGenerator {
    /// Generate independent primary and backup mnemonics from OS entropy
    pub fn generate_pair() -> HdResult<MnemonicPair> {
        Ok(MnemonicPair {
            primary: Self::generate_mnemonic(&mut OsRng)?,
            backup: Self::generate_mnemonic(&mut OsRng)?,
        })
    }

    /// Generate one 24-word mnemonic from the given randomness source
    pub fn generate_mnemonic<R: RngCore>(rng: &mut R) -> HdResult<Zeroizing<String>> {
        let mut entropy = Zeroizing::new([0u8; ENTROPY_BYTES]);
        rng.try_fill_bytes(&mut entropy[..])
            .map_err(|e| HdError::EntropySource(e.to_string()))?;

        let mnemonic = Mnemonic::from_entropy_in(Language::English, &entropy[..])
            .map_err(|e| HdError::InvalidMnemonic(e.to_string()))?;

        Ok(Zeroizing::new(mnemonic.to_string()))
    }

    /// Derive the seed for a mnemonic and passphrase
    ///
    /// Deterministic: the same words and passphrase always give the same
    /// seed. The phrase is validated against the English word list first.
    pub fn derive_seed(mnemonic: &str, passphrase: &str) -> HdResult<Seed> {
        let parsed = Mnemonic::parse_in_normalized(Language::English, mnemonic)
            .map_err(|e| HdError::InvalidMnemonic(e.to_string()))?;

        Ok(Zeroizing::new(parsed.to_seed(passphrase)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Error as RandError;

    const TREZOR_MNEMONIC: &str = "abandon abandon abandon abandon abandon abandon \
         abandon abandon abandon abandon abandon about";

    struct BrokenRng;

    impl RngCore for BrokenRng {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next_u64(&mut self) -> u64 {
            0
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            dest.fill(0)
        }

        fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), RandError> {
            Err(RandError::new("entropy pool unavailable"))
        }
    }

    #[test]
    fn test_generate_pair_is_24_words_and_distinct() {
        let pair = KeySeedGenerator::generate_pair().unwrap();

        assert_eq!(pair.primary.split_whitespace().count(), 24);
        assert_eq!(pair.backup.split_whitespace().count(), 24);
        assert_ne!(*pair.primary, *pair.backup);
    }

    #[test]
    fn test_broken_entropy_source() {
        let result = KeySeedGenerator::generate_mnemonic(&mut BrokenRng);
        assert!(matches!(result, Err(HdError::EntropySource(_))));
    }

    #[test]
    fn test_bip39_seed_vector() {
        let seed = KeySeedGenerator::derive_seed(TREZOR_MNEMONIC, "TREZOR").unwrap();
        assert_eq!(
            hex::encode(&seed[..]),
            "c55257c360c07c72029aebc1b53c05ed0362ada38ead3e3e9efa3708e5349553\
             1f09a6987599d18264c1e1c92f2cf141630c7a3c4ab7c81b2f001698e7463b04"
        );
    }

    #[test]
    fn test_seed_depends_on_passphrase() {
        let a = KeySeedGenerator::derive_seed(TREZOR_MNEMONIC, "pw").unwrap();
        let b = KeySeedGenerator::derive_seed(TREZOR_MNEMONIC, "pw").unwrap();
        let c = KeySeedGenerator::derive_seed(TREZOR_MNEMONIC, "pw2").unwrap();

        assert_eq!(*a, *b);
        assert_ne!(*a, *c);
    }

    #[test]
    fn test_rejects_invalid_mnemonic() {
        let result = KeySeedGenerator::derive_seed("not a real mnemonic phrase", "");
        assert!(matches!(result, Err(HdError::InvalidMnemonic(_))));
    }
}
