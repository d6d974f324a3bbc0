//! Test fixtures and constants for stencil tests

#![allow(dead_code)] // Test fixtures may not all be used in every test

use bitcoin::hashes::Hash;
use bitcoin::{Address, Amount, NetworkKind, OutPoint, Txid};
use crate::client::Utxo;
use crate::contract::{BoundContract, ContractBuilder};
use crate::fields::FieldSet;
use crate::template::TransactionTemplate;
use crate::util::public_key;

/// Deterministic outpoint to bind contracts below
#[must_use]
pub fn funding_outpoint() -> OutPoint {
    OutPoint::new(Txid::from_byte_array([2u8; 32]), 0)
}

/// Deterministic P2PKH address for client tests
#[must_use]
pub fn test_address() -> Address {
    Address::p2pkh(&public_key(1), NetworkKind::Test)
}

/// UTXO sitting at the funding outpoint
#[must_use]
pub fn test_utxo() -> Utxo {
    Utxo {
        txid: funding_outpoint().txid,
        vout: 0,
        amount: Amount::from_sat(100_000_000),
        script_pubkey: test_address().script_pubkey(),
    }
}

/// Template paying `sats` to a single plain output
#[must_use]
pub fn payout_template(sats: u64) -> TransactionTemplate {
    let mut template = TransactionTemplate::new("payout");
    template.add_output(Amount::from_sat(sats), None, None);
    template
}

/// Contract with one unconditional guaranteed payout
#[must_use]
pub fn single_payout_contract(sats: u64) -> BoundContract {
    let mut builder = ContractBuilder::new(FieldSet::empty());
    builder.add_guaranteed_path(None, payout_template(sats));
    builder.finish().expect("fixture contract compiles")
}
