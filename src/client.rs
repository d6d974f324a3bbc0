//! Abstract interface for interacting with Bitcoin nodes

use bitcoin::{Address, Amount, BlockHash, OutPoint, ScriptBuf, Transaction, Txid};
use crate::error::ClientError;

/// Result type for node client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// UTXO representation for funding contracts
#[derive(Debug, Clone)]
pub struct Utxo {
    pub txid: Txid,
    pub vout: u32,
    pub amount: Amount,
    pub script_pubkey: ScriptBuf,
}

impl Utxo {
    /// The outpoint this UTXO sits at, ready to bind a contract below
    #[must_use]
    pub fn outpoint(&self) -> OutPoint {
        OutPoint::new(self.txid, self.vout)
    }
}

/// Abstract interface for interacting with Bitcoin nodes
///
/// This trait allows stencil to work with different network backends
/// (regtest, signet, mainnet) through a unified interface.
pub trait NodeClient {
    /// Send funds to an address
    fn send_to_address(&self, addr: &Address, amount: Amount) -> ClientResult<Txid>;

    /// Get a transaction by its txid
    fn get_transaction(&self, txid: &Txid) -> ClientResult<Transaction>;

    /// Broadcast a transaction to the network
    fn broadcast(&self, tx: &Transaction) -> ClientResult<Txid>;

    /// Generate blocks (regtest only)
    fn generate_blocks(&self, count: u32) -> ClientResult<Vec<BlockHash>>;

    /// Get UTXOs for an address
    fn get_utxos(&self, address: &Address) -> ClientResult<Vec<Utxo>>;

    /// Get a new address from the wallet
    fn get_new_address(&self) -> ClientResult<Address>;
}
