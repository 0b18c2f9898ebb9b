//! Client configuration
//!
//! The network (mainnet or testnet) is an explicit value carried by the
//! client and handed to every key derivation and checksum call. Nothing in
//! this crate selects network parameters globally.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Environment variable overriding the coordinator base URL
pub const API_ENDPOINT_ENV: &str = "BLOCKTRAIL_SDK_API_ENDPOINT";

/// Coordinator base URL used when nothing else is configured
pub const DEFAULT_API_BASE: &str = "https://api.blocktrail.com";

/// Default API version segment
pub const DEFAULT_API_VERSION: &str = "v1";

/// Default coin code
pub const DEFAULT_COIN: &str = "BTC";

// =============================================================================
// Network
// =============================================================================

/// Bitcoin network selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Mainnet,
    Testnet,
}

impl Network {
    /// The matching `bitcoin` network for key and address encoding
    pub(crate) fn to_bitcoin(self) -> bitcoin::Network {
        match self {
            Network::Mainnet => bitcoin::Network::Bitcoin,
            Network::Testnet => bitcoin::Network::Testnet,
        }
    }

    /// Every non-mainnet `bitcoin` network shares testnet key versions
    pub(crate) fn from_bitcoin(network: bitcoin::Network) -> Self {
        match network {
            bitcoin::Network::Bitcoin => Network::Mainnet,
            _ => Network::Testnet,
        }
    }

    pub fn is_testnet(&self) -> bool {
        matches!(self, Network::Testnet)
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Mainnet => write!(f, "mainnet"),
            Network::Testnet => write!(f, "testnet"),
        }
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" | "main" | "bitcoin" => Ok(Network::Mainnet),
            "testnet" | "test" => Ok(Network::Testnet),
            other => Err(format!("unknown network: {}", other)),
        }
    }
}

// =============================================================================
// Client Configuration
// =============================================================================

/// Configuration for a wallet client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Network the wallet keys and checksums are produced for
    pub network: Network,
    /// Coin code, e.g. `BTC`
    pub coin: String,
    /// API version path segment
    pub api_version: String,
    /// Full endpoint override; when set, network/coin/version are not
    /// used to build the URL
    pub api_endpoint: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            network: Network::Mainnet,
            coin: DEFAULT_COIN.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            api_endpoint: None,
        }
    }
}

impl ClientConfig {
    /// Default configuration for the given network
    pub fn for_network(network: Network) -> Self {
        Self {
            network,
            ..Default::default()
        }
    }

    /// Resolve the coordinator endpoint URL
    ///
    /// An explicit override is returned unchanged. Otherwise the base URL
    /// comes from `BLOCKTRAIL_SDK_API_ENDPOINT` (or the default base) and is
    /// suffixed with `/<version>/<coin>`, where testnet coins carry a `t`
    /// prefix (`tBTC`).
    pub fn api_endpoint(&self) -> String {
        let base = std::env::var(API_ENDPOINT_ENV).ok();
        self.api_endpoint_with_base(base.as_deref())
    }

    fn api_endpoint_with_base(&self, base: Option<&str>) -> String {
        if let Some(endpoint) = &self.api_endpoint {
            return endpoint.clone();
        }

        let prefix = if self.network.is_testnet() { "t" } else { "" };
        format!(
            "{}/{}/{}{}",
            base.unwrap_or(DEFAULT_API_BASE).trim_end_matches('/'),
            self.api_version,
            prefix,
            self.coin.to_uppercase()
        )
    }
}
