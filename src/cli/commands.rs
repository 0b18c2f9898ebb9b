//! CLI commands for the wallet
//!
//! Every command works offline: keys, paths and checksums are computed
//! locally and no coordinator is contacted.

use crate::config::{ClientConfig, Network};
use crate::hd::{ChecksumBinder, DerivationPath, ExtendedPrivateKey, KeySeedGenerator};

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn primary_key(
    network: Network,
    mnemonic: &str,
    passphrase: &str,
) -> CliResult<ExtendedPrivateKey> {
    let seed = KeySeedGenerator::derive_seed(mnemonic, passphrase)?;
    Ok(ExtendedPrivateKey::from_seed(&seed[..], network)?)
}

/// Extended public key of `mnemonic` + `passphrase` at `path`
pub fn derive_public_key(
    network: Network,
    mnemonic: &str,
    passphrase: &str,
    path: &str,
) -> CliResult<String> {
    let path: DerivationPath = path.parse()?;
    let key = primary_key(network, mnemonic, passphrase)?.derive_path(&path)?;
    Ok(key.public_copy().to_base58())
}

/// Passphrase checksum of `mnemonic` + `passphrase`
pub fn compute_checksum(network: Network, mnemonic: &str, passphrase: &str) -> CliResult<String> {
    Ok(ChecksumBinder::compute(&primary_key(network, mnemonic, passphrase)?))
}

/// Generate a fresh primary/backup mnemonic pair
pub fn cmd_generate(network: Network) -> CliResult<()> {
    let mnemonics = KeySeedGenerator::generate_pair()?;

    println!("🔐 New mnemonics ({})", network);
    println!("   Primary: {}", mnemonics.primary.as_str());
    println!("   Backup:  {}", mnemonics.backup.as_str());
    println!("\n   ⚠️  IMPORTANT: Write both down. The backup mnemonic is never sent anywhere");
    println!("   and is the only way to rebuild the backup key.");

    Ok(())
}

/// Print the extended public key at a path
pub fn cmd_derive(
    network: Network,
    mnemonic: &str,
    passphrase: &str,
    path: &str,
) -> CliResult<()> {
    let xpub = derive_public_key(network, mnemonic, passphrase, path)?;

    println!("🔑 Public key at {}", path);
    println!("   {}", xpub);

    Ok(())
}

/// Print the passphrase checksum
pub fn cmd_checksum(network: Network, mnemonic: &str, passphrase: &str) -> CliResult<()> {
    let checksum = compute_checksum(network, mnemonic, passphrase)?;

    println!("🧾 Checksum ({})", network);
    println!("   {}", checksum);

    Ok(())
}

/// Print the resolved coordinator endpoint
pub fn cmd_endpoint(config: &ClientConfig) -> CliResult<()> {
    println!("🌐 API endpoint: {}", config.api_endpoint());
    Ok(())
}
