//! Mock NodeClient implementation for testing

#![cfg(test)]

use bitcoin::absolute::LockTime;
use bitcoin::hashes::Hash;
use bitcoin::{
    transaction, Address, Amount, BlockHash, NetworkKind, OutPoint, ScriptBuf, Sequence,
    Transaction, TxIn, TxOut, Txid, Witness,
};
use crate::client::{ClientResult, NodeClient, Utxo};
use crate::error::ClientError;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Mock client for testing without a live node
#[derive(Clone)]
pub struct MockClient {
    inner: Arc<Mutex<MockClientInner>>,
}

struct MockClientInner {
    transactions: HashMap<Txid, Transaction>,
    utxos: HashMap<Address, Vec<Utxo>>,
    block_count: u32,
}

impl MockClient {
    /// Create a new mock client
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockClientInner {
                transactions: HashMap::new(),
                utxos: HashMap::new(),
                block_count: 0,
            })),
        }
    }

    /// Add a pre-existing transaction to the mock
    pub fn add_transaction(&self, txid: Txid, tx: Transaction) {
        let mut inner = self.inner.lock().unwrap();
        inner.transactions.insert(txid, tx);
    }

    /// Add a UTXO for an address
    pub fn add_utxo(&self, address: Address, utxo: Utxo) {
        let mut inner = self.inner.lock().unwrap();
        inner.utxos.entry(address).or_default().push(utxo);
    }

    /// Current mock block height
    #[must_use]
    pub fn block_count(&self) -> u32 {
        self.inner.lock().unwrap().block_count
    }
}

impl Default for MockClient {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeClient for MockClient {
    fn send_to_address(&self, addr: &Address, amount: Amount) -> ClientResult<Txid> {
        let tx = Transaction {
            version: transaction::Version::TWO,
            lock_time: LockTime::ZERO,
            input: vec![TxIn {
                previous_output: OutPoint::null(),
                script_sig: ScriptBuf::new(),
                sequence: Sequence::MAX,
                witness: Witness::new(),
            }],
            output: vec![TxOut {
                value: amount,
                script_pubkey: addr.script_pubkey(),
            }],
        };
        let txid = tx.compute_txid();

        let mut inner = self.inner.lock().unwrap();
        inner.transactions.insert(txid, tx);
        inner.utxos.entry(addr.clone()).or_default().push(Utxo {
            txid,
            vout: 0,
            amount,
            script_pubkey: addr.script_pubkey(),
        });

        Ok(txid)
    }

    fn get_transaction(&self, txid: &Txid) -> ClientResult<Transaction> {
        let inner = self.inner.lock().unwrap();
        inner
            .transactions
            .get(txid)
            .cloned()
            .ok_or_else(|| ClientError::BadResponse("Transaction not found".to_string()))
    }

    fn broadcast(&self, tx: &Transaction) -> ClientResult<Txid> {
        let txid = tx.compute_txid();
        let mut inner = self.inner.lock().unwrap();
        inner.transactions.insert(txid, tx.clone());
        Ok(txid)
    }

    fn generate_blocks(&self, count: u32) -> ClientResult<Vec<BlockHash>> {
        let mut inner = self.inner.lock().unwrap();
        let mut hashes = Vec::new();

        for _ in 0..count {
            inner.block_count += 1;
            hashes.push(BlockHash::from_byte_array(rand::random::<[u8; 32]>()));
        }

        Ok(hashes)
    }

    fn get_utxos(&self, address: &Address) -> ClientResult<Vec<Utxo>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.utxos.get(address).cloned().unwrap_or_default())
    }

    fn get_new_address(&self) -> ClientResult<Address> {
        let secp = secp256k1::Secp256k1::new();
        let secret_bytes: [u8; 32] = rand::random();
        let secret_key = secp256k1::SecretKey::from_slice(&secret_bytes)
            .map_err(|e| ClientError::BadResponse(format!("Key error: {e}")))?;
        let secp_pubkey = secp256k1::PublicKey::from_secret_key(&secp, &secret_key);
        let pubkey = bitcoin::PublicKey::new(secp_pubkey);

        Ok(Address::p2pkh(&pubkey, NetworkKind::Test))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures as fixtures;

    #[test]
    fn test_mock_send_to_address() {
        let client = MockClient::new();
        let addr = fixtures::test_address();

        let txid = client.send_to_address(&addr, Amount::from_sat(100_000_000)).unwrap();

        // Should be able to get the transaction back
        let tx = client.get_transaction(&txid).unwrap();
        assert_eq!(tx.output.len(), 1);
        assert_eq!(tx.compute_txid(), txid);
    }

    #[test]
    fn test_mock_get_utxos() {
        let client = MockClient::new();
        let addr = fixtures::test_address();

        // Initially no UTXOs
        let utxos = client.get_utxos(&addr).unwrap();
        assert!(utxos.is_empty());

        // Send funds
        client.send_to_address(&addr, Amount::from_sat(100_000_000)).unwrap();

        // Now should have a UTXO
        let utxos = client.get_utxos(&addr).unwrap();
        assert_eq!(utxos.len(), 1);
        assert_eq!(utxos[0].amount, Amount::from_sat(100_000_000));
        assert_eq!(utxos[0].outpoint().vout, 0);
    }

    #[test]
    fn test_mock_broadcast_bound_transaction() {
        let client = MockClient::new();

        let contract = fixtures::single_payout_contract(50_000);
        let (txns, _) = contract.bind(fixtures::funding_outpoint()).unwrap();

        let txid = client.broadcast(&txns[0]).unwrap();
        let retrieved = client.get_transaction(&txid).unwrap();
        assert_eq!(retrieved, txns[0]);
    }

    #[test]
    fn test_mock_generate_blocks() {
        let client = MockClient::new();

        let hashes = client.generate_blocks(10).unwrap();
        assert_eq!(hashes.len(), 10);
        assert_eq!(client.block_count(), 10);
    }

    #[test]
    fn test_mock_get_new_address() {
        let client = MockClient::new();

        let addr1 = client.get_new_address().unwrap();
        let addr2 = client.get_new_address().unwrap();

        // Should generate different addresses
        assert_ne!(addr1.to_string(), addr2.to_string());
    }
}
