//! Blocktrail Wallet CLI Application
//!
//! Offline helpers for co-signed wallet keys.

use blocktrail_wallet::cli;
use blocktrail_wallet::config::{ClientConfig, Network};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "blocktrail-wallet")]
#[command(author = "Darshan")]
#[command(version = "0.1.0")]
#[command(about = "Key tooling for co-signed HD wallets", long_about = None)]
struct Cli {
    /// Use testnet keys and addresses
    #[arg(long, global = true)]
    testnet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a primary and a backup mnemonic
    Generate,

    /// Derive an extended public key
    Derive {
        /// Primary mnemonic
        #[arg(short, long)]
        mnemonic: String,

        /// Wallet passphrase
        #[arg(short, long, default_value = "")]
        passphrase: String,

        /// Derivation path, e.g. M/0'
        #[arg(long, default_value = "M/0'")]
        path: String,
    },

    /// Compute the passphrase checksum
    Checksum {
        /// Primary mnemonic
        #[arg(short, long)]
        mnemonic: String,

        /// Wallet passphrase
        #[arg(short, long, default_value = "")]
        passphrase: String,
    },

    /// Show the coordinator endpoint
    Endpoint,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let network = if cli.testnet {
        Network::Testnet
    } else {
        Network::Mainnet
    };
    log::debug!("Using {}", network);

    match cli.command {
        Commands::Generate => {
            cli::cmd_generate(network)?;
        }

        Commands::Derive {
            mnemonic,
            passphrase,
            path,
        } => {
            cli::cmd_derive(network, &mnemonic, &passphrase, &path)?;
        }

        Commands::Checksum {
            mnemonic,
            passphrase,
        } => {
            cli::cmd_checksum(network, &mnemonic, &passphrase)?;
        }

        Commands::Endpoint => {
            cli::cmd_endpoint(&ClientConfig::for_network(network))?;
        }
    }

    Ok(())
}
