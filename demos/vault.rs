//! Example: a two-stage vault built from guaranteed transaction paths
//!
//! Deposited funds can only move through a trigger transaction. From the
//! trigger, spending either waits out a delay and goes to the hot wallet, or
//! sweeps immediately to cold storage. Every transaction in that tree is
//! enumerated before the deposit address is ever funded.

use stencil::bitcoin::hashes::{sha256, Hash};
use stencil::bitcoin::{Amount, OutPoint, Txid};
use stencil::{
    Clause, ContractBuilder, ContractMeta, FieldBuilder, FieldValue, TimeSpec,
    TransactionTemplate,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Stencil Vault Example\n");

    const DEPOSIT: u64 = 100_000;
    const DELAY_BLOCKS: u32 = 144;

    // 1. Declare the vault's parameters
    println!("1. Declaring parameters...");
    let mut fields = FieldBuilder::new(["hot_key", "cold_key", "delay"]);
    fields.assign("hot_key", FieldValue::Key(stencil::util::public_key(1)))?;
    fields.assign("cold_key", FieldValue::Key(stencil::util::public_key(2)))?;
    fields.assign("delay", FieldValue::Time(TimeSpec::Relative(DELAY_BLOCKS)))?;
    let fields = fields.freeze()?;
    println!("   ✓ Fields frozen: {}", fields.names().collect::<Vec<_>>().join(", "));

    // 2. Build the trigger contract: two guaranteed exits
    println!("\n2. Building trigger contract...");
    let mut to_hot = TransactionTemplate::new("to-hot");
    to_hot.add_output(Amount::from_sat(DEPOSIT), None, None);

    let mut to_cold = TransactionTemplate::new("to-cold");
    to_cold.add_output(Amount::from_sat(DEPOSIT), None, None);

    let mut trigger = ContractBuilder::new(fields.clone())
        .metadata(ContractMeta::new("orange", "trigger"));
    trigger.add_guaranteed_path(
        Some(Clause::all([
            Clause::After(fields.variable("delay")?),
            Clause::Signature(fields.variable("hot_key")?),
        ])),
        to_hot,
    );
    trigger.add_guaranteed_path(
        Some(Clause::Signature(fields.variable("cold_key")?)),
        to_cold,
    );
    let trigger = trigger.finish()?;
    println!(
        "   ✓ Compiled, program is {} bytes across {} branches",
        trigger.witness_manager().program().len(),
        trigger.witness_manager().witnesses().len()
    );

    // 3. Build the vault: depositing commits to the trigger
    println!("\n3. Building vault contract...");
    let mut stage = TransactionTemplate::new("stage");
    stage.add_output(Amount::from_sat(DEPOSIT), Some(trigger), None);

    let mut vault = ContractBuilder::new(fields.clone())
        .metadata(ContractMeta::new("purple", "vault"));
    vault.add_guaranteed_path(None, stage);
    let vault = vault.finish()?;

    let (min, max) = vault.amount_range();
    println!("   ✓ Deposit script: {:x}", vault.script_pubkey().as_script());
    println!("   Guaranteed spend range: {min} to {max}");

    // 4. Enumerate the whole tree below a (pretend) funding outpoint
    println!("\n4. Binding to a funding outpoint...");
    let funding = OutPoint::new(
        Txid::from_byte_array(sha256::Hash::hash(b"demo funding").to_byte_array()),
        0,
    );
    let (txns, metadata) = vault.bind(funding)?;
    println!("   ✓ {} transactions pre-committed:", txns.len());
    for (tx, meta) in txns.iter().zip(&metadata) {
        println!(
            "   - {:<18} txid {} ({} witness items)",
            meta.label,
            tx.compute_txid(),
            tx.input[0].witness.len()
        );
    }

    // 5. Render the contract tree as JSON
    println!("\n5. Rendering contract JSON...");
    let json = vault.to_json();
    println!("{json:#}");

    Ok(())
}
