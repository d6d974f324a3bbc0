//! RPC-based NodeClient implementation for connecting to Bitcoin Core nodes
//!
//! This module provides an implementation of the `NodeClient` trait that
//! connects to Bitcoin Core nodes via JSON-RPC.
//!
//! # Example
//!
//! ```ignore
//! use stencil::{NodeConfig, RpcClient, NodeClient};
//!
//! // Load config from file
//! let config = NodeConfig::from_file("stencil.toml")?;
//! let client = RpcClient::new(config)?;
//!
//! // Or create programmatically
//! let client = RpcClient::from_url(
//!     "http://localhost:18443",
//!     "user",
//!     "password"
//! )?;
//!
//! // Use the client
//! let address = client.get_new_address()?;
//! let txid = client.send_to_address(&address, Amount::from_sat(100_000_000))?;
//! ```

use bitcoin::consensus::encode::{deserialize, serialize_hex};
use bitcoin::hex::FromHex;
use bitcoin::{Address, Amount, BlockHash, ScriptBuf, Transaction, Txid};
use crate::client::{ClientResult, NodeClient, Utxo};
use crate::config::{Network, NodeConfig};
use crate::error::ClientError;
use std::str::FromStr;

/// RPC client for Bitcoin Core nodes
///
/// This implementation uses JSON-RPC to communicate with the node's wallet
/// endpoint. It implements the `NodeClient` trait, making it compatible with
/// all stencil operations that require node interaction, and can be used as
/// a template for other `NodeClient` implementations (e.g., for different
/// RPC libraries or async frameworks).
pub struct RpcClient {
    client: jsonrpc::Client,
    config: NodeConfig,
}

impl RpcClient {
    /// Create a new RPC client from configuration
    ///
    /// Connects to the wallet endpoint, so wallet-scoped calls work on nodes
    /// with more than one wallet loaded.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured URL is invalid.
    pub fn new(config: NodeConfig) -> Result<Self, ClientError> {
        let transport = jsonrpc::simple_http::SimpleHttpTransport::builder()
            .url(&config.rpc.wallet_url())
            .map_err(|e| ClientError::Rpc(format!("Invalid RPC URL: {e}")))?
            .auth(&config.rpc.user, Some(&config.rpc.password))
            .build();

        let client = jsonrpc::Client::with_transport(transport);

        Ok(Self { client, config })
    }

    /// Create from a config file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or the URL is
    /// invalid.
    pub fn from_config_file(path: &str) -> Result<Self, ClientError> {
        let config = NodeConfig::from_file(path)?;
        Self::new(config)
    }

    /// Create from URL and credentials (uses regtest defaults)
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn from_url(url: &str, user: &str, password: &str) -> Result<Self, ClientError> {
        let config = NodeConfig::regtest().with_rpc(url, user, password);
        Self::new(config)
    }

    /// Create for a specific network with default settings
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn for_network(network: Network, user: &str, password: &str) -> Result<Self, ClientError> {
        let config = match network {
            Network::Regtest => NodeConfig::regtest(),
            Network::Signet => NodeConfig::signet(),
            Network::Testnet => NodeConfig::testnet(),
            Network::Bitcoin => NodeConfig::mainnet(),
        }
        .with_rpc(&network.default_rpc_url(), user, password);

        Self::new(config)
    }

    /// Get the network type
    #[must_use]
    pub fn network(&self) -> Network {
        self.config.network()
    }

    /// Get a reference to the config
    #[must_use]
    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// Make an RPC call
    fn call<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        params: &[serde_json::Value],
    ) -> ClientResult<T> {
        let params_json = serde_json::to_string(params)
            .map_err(|e| ClientError::Rpc(format!("Failed to serialize params: {e}")))?;

        let raw_params: Box<serde_json::value::RawValue> =
            serde_json::value::RawValue::from_string(params_json)
                .map_err(|e| ClientError::Rpc(format!("Failed to create raw value: {e}")))?;

        let request = self.client.build_request(method, Some(&raw_params));
        let response = self
            .client
            .send_request(request)
            .map_err(|e| ClientError::Rpc(format!("RPC request failed: {e}")))?;

        response
            .result()
            .map_err(|e| ClientError::Rpc(format!("RPC error: {e}")))
    }

    fn parse_txid(txid_str: &str) -> ClientResult<Txid> {
        Txid::from_str(txid_str)
            .map_err(|e| ClientError::BadResponse(format!("Invalid txid: {e}")))
    }

    fn parse_address(&self, addr_str: &str) -> ClientResult<Address> {
        Address::from_str(addr_str)
            .map_err(|e| ClientError::BadResponse(format!("Invalid address: {e}")))?
            .require_network(self.config.bitcoin_network())
            .map_err(|e| ClientError::BadResponse(format!("Address network mismatch: {e}")))
    }

    /// Test the connection to the node
    ///
    /// # Errors
    ///
    /// Returns an error if the node is unreachable or rejects the request.
    pub fn test_connection(&self) -> Result<(), ClientError> {
        let _: serde_json::Value = self.call("getblockchaininfo", &[])?;
        Ok(())
    }

    /// Get blockchain info
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub fn get_blockchain_info(&self) -> ClientResult<serde_json::Value> {
        self.call("getblockchaininfo", &[])
    }

    /// Get the current block count
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub fn get_block_count(&self) -> ClientResult<u64> {
        self.call("getblockcount", &[])
    }

    /// Get wallet balance in BTC
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub fn get_balance(&self) -> ClientResult<f64> {
        self.call("getbalance", &[])
    }
}

impl NodeClient for RpcClient {
    fn send_to_address(&self, addr: &Address, amount: Amount) -> ClientResult<Txid> {
        let txid_str: String = self.call(
            "sendtoaddress",
            &[addr.to_string().into(), amount.to_btc().into()],
        )?;
        Self::parse_txid(&txid_str)
    }

    fn get_transaction(&self, txid: &Txid) -> ClientResult<Transaction> {
        let result: serde_json::Value = self.call("gettransaction", &[txid.to_string().into()])?;

        let tx_hex = result
            .get("hex")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ClientError::BadResponse("Missing hex field".to_string()))?;

        let tx_bytes = Vec::<u8>::from_hex(tx_hex)
            .map_err(|e| ClientError::BadResponse(format!("Invalid hex: {e}")))?;

        deserialize(&tx_bytes)
            .map_err(|e| ClientError::BadResponse(format!("Invalid transaction: {e}")))
    }

    fn broadcast(&self, tx: &Transaction) -> ClientResult<Txid> {
        let txid_str: String = self.call("sendrawtransaction", &[serialize_hex(tx).into()])?;
        Self::parse_txid(&txid_str)
    }

    fn generate_blocks(&self, count: u32) -> ClientResult<Vec<BlockHash>> {
        let address: String = self.call("getnewaddress", &[])?;

        let hashes: Vec<String> =
            self.call("generatetoaddress", &[count.into(), address.into()])?;

        hashes
            .iter()
            .map(|s| {
                BlockHash::from_str(s)
                    .map_err(|e| ClientError::BadResponse(format!("Invalid block hash: {e}")))
            })
            .collect()
    }

    fn get_utxos(&self, address: &Address) -> ClientResult<Vec<Utxo>> {
        let result: Vec<serde_json::Value> = self.call(
            "listunspent",
            &[
                serde_json::json!(1),                     // minconf
                serde_json::json!(9_999_999),             // maxconf
                serde_json::json!([address.to_string()]), // addresses
            ],
        )?;

        let mut utxos = Vec::new();
        for item in result {
            let txid_str = item
                .get("txid")
                .and_then(|v| v.as_str())
                .ok_or_else(|| ClientError::BadResponse("Missing txid in listunspent".to_string()))?;
            let txid = Self::parse_txid(txid_str)?;

            let vout = item
                .get("vout")
                .and_then(|v| v.as_u64())
                .ok_or_else(|| ClientError::BadResponse("Missing vout in listunspent".to_string()))?
                as u32;

            let amount_btc = item.get("amount").and_then(|v| v.as_f64()).ok_or_else(|| {
                ClientError::BadResponse("Missing amount in listunspent".to_string())
            })?;
            let amount = Amount::from_btc(amount_btc)
                .map_err(|e| ClientError::BadResponse(format!("Invalid amount: {e}")))?;

            let script_hex = item
                .get("scriptPubKey")
                .and_then(|v| v.as_str())
                .ok_or_else(|| {
                    ClientError::BadResponse("Missing scriptPubKey in listunspent".to_string())
                })?;
            let script_bytes = Vec::<u8>::from_hex(script_hex)
                .map_err(|e| ClientError::BadResponse(format!("Invalid script hex: {e}")))?;
            let script_pubkey = ScriptBuf::from_bytes(script_bytes);

            utxos.push(Utxo {
                txid,
                vout,
                amount,
                script_pubkey,
            });
        }

        Ok(utxos)
    }

    fn get_new_address(&self) -> ClientResult<Address> {
        let addr_str: String = self.call("getnewaddress", &[])?;
        self.parse_address(&addr_str)
    }
}

impl std::fmt::Debug for RpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcClient")
            .field("config", &self.config)
            .finish()
    }
}
