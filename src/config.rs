//! Configuration for connecting to Bitcoin nodes
//!
//! This module provides a configuration system for connecting stencil to
//! Bitcoin Core nodes via RPC.
//!
//! # Example Configuration File (stencil.toml)
//!
//! ```toml
//! [network]
//! network = "regtest"
//!
//! [rpc]
//! url = "http://127.0.0.1:18443"
//! user = "user"
//! password = "password"
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Network type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Regtest,
    Signet,
    Testnet,
    #[serde(rename = "mainnet")]
    Bitcoin,
}

impl Network {
    /// Get the default RPC port for this network
    #[must_use]
    pub const fn default_rpc_port(self) -> u16 {
        match self {
            Self::Regtest => 18443,
            Self::Signet => 38332,
            Self::Testnet => 18332,
            Self::Bitcoin => 8332,
        }
    }

    /// Get the corresponding `bitcoin` crate network, for address checks
    #[must_use]
    pub const fn to_bitcoin(self) -> bitcoin::Network {
        match self {
            Self::Regtest => bitcoin::Network::Regtest,
            Self::Signet => bitcoin::Network::Signet,
            Self::Testnet => bitcoin::Network::Testnet,
            Self::Bitcoin => bitcoin::Network::Bitcoin,
        }
    }

    /// Get the default RPC URL for this network
    #[must_use]
    pub fn default_rpc_url(self) -> String {
        format!("http://127.0.0.1:{}", self.default_rpc_port())
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Regtest => write!(f, "regtest"),
            Self::Signet => write!(f, "signet"),
            Self::Testnet => write!(f, "testnet"),
            Self::Bitcoin => write!(f, "mainnet"),
        }
    }
}

/// RPC connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    /// RPC URL (e.g., `http://127.0.0.1:18443`)
    pub url: String,
    /// RPC username
    pub user: String,
    /// RPC password
    pub password: String,
    /// Wallet name (defaults to "stencil" if not specified)
    #[serde(default = "default_wallet_name")]
    pub wallet: String,
}

fn default_wallet_name() -> String {
    "stencil".to_string()
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:18443".to_string(),
            user: "user".to_string(),
            password: "password".to_string(),
            wallet: default_wallet_name(),
        }
    }
}

impl RpcConfig {
    /// Get the RPC URL with wallet path appended
    ///
    /// Bitcoin Core RPC uses `/wallet/<name>` for wallet-specific operations
    #[must_use]
    pub fn wallet_url(&self) -> String {
        format!("{}/wallet/{}", self.url.trim_end_matches('/'), self.wallet)
    }

    /// Create RPC config for a specific network with default settings
    #[must_use]
    pub fn for_network(network: Network) -> Self {
        Self {
            url: network.default_rpc_url(),
            ..Default::default()
        }
    }
}

/// Network configuration wrapper (for TOML structure)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct NetworkWrapper {
    network: Network,
}

/// Complete node configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Network selection
    #[serde(default, rename = "network")]
    network_wrapper: NetworkWrapper,
    /// RPC connection settings
    #[serde(default)]
    pub rpc: RpcConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self::regtest()
    }
}

impl NodeConfig {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse configuration from TOML string
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(ConfigError::Parse)
    }

    /// Serialize configuration to TOML string
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Save configuration to a file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let toml_str = self.to_toml()?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }

    /// Get the network type
    #[must_use]
    pub const fn network(&self) -> Network {
        self.network_wrapper.network
    }

    /// Set the network type
    pub fn set_network(&mut self, network: Network) {
        self.network_wrapper.network = network;
    }

    /// Get the `bitcoin` crate network for the configured network
    #[must_use]
    pub const fn bitcoin_network(&self) -> bitcoin::Network {
        self.network().to_bitcoin()
    }

    /// Create a default config for regtest
    #[must_use]
    pub fn regtest() -> Self {
        Self {
            network_wrapper: NetworkWrapper {
                network: Network::Regtest,
            },
            rpc: RpcConfig::for_network(Network::Regtest),
        }
    }

    /// Create a default config for signet
    #[must_use]
    pub fn signet() -> Self {
        Self {
            network_wrapper: NetworkWrapper {
                network: Network::Signet,
            },
            rpc: RpcConfig::for_network(Network::Signet),
        }
    }

    /// Create a default config for testnet
    #[must_use]
    pub fn testnet() -> Self {
        Self {
            network_wrapper: NetworkWrapper {
                network: Network::Testnet,
            },
            rpc: RpcConfig::for_network(Network::Testnet),
        }
    }

    /// Create a default config for mainnet
    #[must_use]
    pub fn mainnet() -> Self {
        Self {
            network_wrapper: NetworkWrapper {
                network: Network::Bitcoin,
            },
            rpc: RpcConfig::for_network(Network::Bitcoin),
        }
    }

    /// Create config with custom RPC settings (preserves existing wallet name)
    #[must_use]
    pub fn with_rpc(mut self, url: &str, user: &str, password: &str) -> Self {
        self.rpc.url = url.to_string();
        self.rpc.user = user.to_string();
        self.rpc.password = password.to_string();
        self
    }

    /// Set the wallet name
    #[must_use]
    pub fn with_wallet(mut self, wallet: &str) -> Self {
        self.rpc.wallet = wallet.to_string();
        self
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = NodeConfig::default();
        assert_eq!(config.network(), Network::Regtest);
        assert_eq!(config.rpc.url, "http://127.0.0.1:18443");
        assert_eq!(config.rpc.wallet, "stencil");
    }

    #[test]
    fn test_wallet_url() {
        let config = NodeConfig::default();
        assert_eq!(
            config.rpc.wallet_url(),
            "http://127.0.0.1:18443/wallet/stencil"
        );

        let custom_config = NodeConfig::default().with_wallet("covenant");
        assert_eq!(
            custom_config.rpc.wallet_url(),
            "http://127.0.0.1:18443/wallet/covenant"
        );
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
[network]
network = "signet"

[rpc]
url = "http://localhost:38332"
user = "myuser"
password = "mypass"
"#;
        let config = NodeConfig::from_toml(toml_str).unwrap();
        assert_eq!(config.network(), Network::Signet);
        assert_eq!(config.rpc.user, "myuser");
        // Wallet defaults to "stencil" when not specified
        assert_eq!(config.rpc.wallet, "stencil");
    }

    #[test]
    fn test_parse_toml_with_wallet() {
        let toml_str = r#"
[network]
network = "regtest"

[rpc]
url = "http://localhost:18443"
wallet = "covenant"
user = "bitcoin"
password = "bitcoinpass"
"#;
        let config = NodeConfig::from_toml(toml_str).unwrap();
        assert_eq!(config.rpc.wallet, "covenant");
        assert_eq!(
            config.rpc.wallet_url(),
            "http://localhost:18443/wallet/covenant"
        );
    }

    #[test]
    fn test_network_params() {
        assert_eq!(Network::Regtest.default_rpc_port(), 18443);
        assert_eq!(Network::Signet.default_rpc_port(), 38332);
        assert_eq!(Network::Testnet.default_rpc_port(), 18332);
        assert_eq!(Network::Bitcoin.default_rpc_port(), 8332);
        assert_eq!(Network::Bitcoin.to_bitcoin(), bitcoin::Network::Bitcoin);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stencil.toml");

        let config = NodeConfig::signet().with_wallet("covenant");
        config.save(&path).unwrap();

        let reloaded = NodeConfig::from_file(&path).unwrap();
        assert_eq!(reloaded.network(), Network::Signet);
        assert_eq!(reloaded.rpc.wallet, "covenant");
    }
}
