//! Tests for binding contracts and expanding transaction trees

use std::collections::HashSet;
use stencil::bitcoin::hashes::Hash;
use stencil::bitcoin::{Amount, OutPoint, Txid};
use stencil::{
    Clause, ContractBuilder, ContractMeta, FieldBuilder, FieldSet, FieldValue, TransactionTemplate,
    Variable,
};

fn funding() -> OutPoint {
    OutPoint::new(Txid::from_byte_array([9u8; 32]), 1)
}

fn payout(sats: u64) -> TransactionTemplate {
    let mut template = TransactionTemplate::new("payout");
    template.add_output(Amount::from_sat(sats), None, None);
    template
}

fn key_fields(names: &[&str]) -> FieldSet {
    let mut builder = FieldBuilder::new(names.iter().copied());
    for (i, name) in names.iter().enumerate() {
        builder
            .assign(name, FieldValue::Key(stencil::util::public_key(i as u32 + 1)))
            .unwrap();
    }
    builder.freeze().unwrap()
}

#[test]
fn test_single_pair_single_candidate() {
    let mut builder = ContractBuilder::new(FieldSet::empty());
    builder.add_guaranteed_path(None, payout(30_000));
    let contract = builder.finish().unwrap();

    let (txns, metadata) = contract.bind(funding()).unwrap();
    assert_eq!(txns.len(), 1);
    assert_eq!(metadata.len(), 1);

    let tx = &txns[0];
    assert_eq!(tx.input.len(), 1);
    assert_eq!(tx.input[0].previous_output, funding());

    // Witness carries the program and the branch's single selector-free stack
    let stack = tx.input[0].witness.to_vec();
    assert_eq!(stack[0], contract.witness_manager().program().as_bytes());
    assert_eq!(
        stack.len() - 1,
        contract.witness_manager().witnesses()[0].items().len()
    );
}

#[test]
fn test_two_candidates_for_one_shape() {
    let fields = key_fields(&["hot", "cold"]);
    let template = payout(30_000);
    let hash = template.template_hash();

    let mut builder = ContractBuilder::new(fields.clone());
    builder.add_guaranteed_path(
        Some(Clause::Signature(fields.variable("hot").unwrap())),
        template,
    );
    // Second branch committing to the same shape, guarded by the other key.
    builder.add_branch(Clause::all([
        Clause::Signature(fields.variable("cold").unwrap()),
        Clause::Template(Variable::new(
            "recovery_target",
            FieldValue::Hash(hash.to_byte_array()),
        )),
    ]));
    let contract = builder.finish().unwrap();

    let (txns, metadata) = contract.bind(funding()).unwrap();

    // One template, two ways to satisfy it: two transactions, same txid,
    // different witness stacks.
    assert_eq!(txns.len(), 2);
    assert_eq!(metadata.len(), 2);
    assert_eq!(txns[0].compute_txid(), txns[1].compute_txid());
    assert_ne!(
        txns[0].input[0].witness.to_vec(),
        txns[1].input[0].witness.to_vec()
    );
}

#[test]
fn test_sibling_witnesses_are_independent() {
    let fields = key_fields(&["hot", "cold"]);
    let template = payout(30_000);
    let hash = template.template_hash();

    let mut builder = ContractBuilder::new(fields.clone());
    builder.add_guaranteed_path(
        Some(Clause::Signature(fields.variable("hot").unwrap())),
        template,
    );
    builder.add_branch(Clause::all([
        Clause::Signature(fields.variable("cold").unwrap()),
        Clause::Template(Variable::new(
            "recovery_target",
            FieldValue::Hash(hash.to_byte_array()),
        )),
    ]));
    let contract = builder.finish().unwrap();

    let (mut txns, _) = contract.bind(funding()).unwrap();
    let untouched = txns[1].input[0].witness.to_vec();

    txns[0].input[0].witness.push(b"tamper");
    assert_eq!(txns[1].input[0].witness.to_vec(), untouched);
}

#[test]
fn test_open_branch_adds_no_transactions() {
    let fields = key_fields(&["hot", "cold"]);

    let mut builder = ContractBuilder::new(fields.clone());
    builder.add_guaranteed_path(
        Some(Clause::Signature(fields.variable("hot").unwrap())),
        payout(20_000),
    );
    // Escape hatch that promises no particular successor.
    builder.add_branch(Clause::Signature(fields.variable("cold").unwrap()));
    let contract = builder.finish().unwrap();

    assert_eq!(contract.witness_manager().witnesses().len(), 2);
    let (txns, _) = contract.bind(funding()).unwrap();
    assert_eq!(txns.len(), 1);
}

#[test]
fn test_nested_contract_chains_outpoints() {
    let mut child_builder =
        ContractBuilder::new(FieldSet::empty()).metadata(ContractMeta::new("green", "child"));
    child_builder.add_guaranteed_path(None, payout(10_000));
    let child = child_builder.finish().unwrap();

    let mut stage = TransactionTemplate::new("stage");
    stage.add_output(Amount::from_sat(12_000), Some(child.clone()), None);

    let mut root_builder =
        ContractBuilder::new(FieldSet::empty()).metadata(ContractMeta::new("red", "root"));
    root_builder.add_guaranteed_path(None, stage);
    let root = root_builder.finish().unwrap();

    let (txns, metadata) = root.bind(funding()).unwrap();
    assert_eq!(txns.len(), 2);

    // The stage transaction pays the child's locking script, and the child's
    // transaction spends that exact output.
    assert_eq!(txns[0].output[0].script_pubkey, child.script_pubkey());
    let root_txid = txns[0].compute_txid();
    assert_eq!(txns[1].input[0].previous_output, OutPoint::new(root_txid, 0));

    // Labels compose per level; the stage output inherits child metadata.
    assert_eq!(metadata[0].label, "root:stage");
    assert_eq!(metadata[1].label, "child:payout");
    assert_eq!(metadata[0].utxo_metadata[0].color, "green");
    assert_eq!(metadata[0].utxo_metadata[0].label, "child");
}

#[test]
fn test_depth_two_tree_enumerates_all() {
    let leaf = {
        let mut builder =
            ContractBuilder::new(FieldSet::empty()).metadata(ContractMeta::new("gray", "leaf"));
        builder.add_guaranteed_path(None, payout(1_000));
        builder.finish().unwrap()
    };

    let child = {
        let mut fan = TransactionTemplate::new("fan");
        fan.add_output(Amount::from_sat(1_500), Some(leaf.clone()), None);
        fan.add_output(Amount::from_sat(1_500), Some(leaf.clone()), None);
        let mut builder =
            ContractBuilder::new(FieldSet::empty()).metadata(ContractMeta::new("blue", "mid"));
        builder.add_guaranteed_path(None, fan);
        builder.finish().unwrap()
    };

    let root = {
        let mut split = TransactionTemplate::new("split");
        split.add_output(Amount::from_sat(4_000), Some(child.clone()), None);
        split.add_output(Amount::from_sat(4_000), Some(child.clone()), None);
        let mut builder =
            ContractBuilder::new(FieldSet::empty()).metadata(ContractMeta::new("red", "top"));
        builder.add_guaranteed_path(None, split);
        builder.finish().unwrap()
    };

    let (txns, metadata) = root.bind(funding()).unwrap();

    // 1 split + 2 * (1 fan + 2 leaves)
    assert_eq!(txns.len(), 7);
    assert_eq!(metadata.len(), 7);

    // Every enumerated transaction is distinct: each spends a different
    // outpoint even when shapes repeat.
    let txids: HashSet<_> = txns.iter().map(|tx| tx.compute_txid()).collect();
    assert_eq!(txids.len(), 7);

    // Depth-first order, parents before children.
    let labels: Vec<_> = metadata.iter().map(|m| m.label.as_str()).collect();
    assert_eq!(
        labels,
        vec![
            "top:split",
            "mid:fan",
            "leaf:payout",
            "leaf:payout",
            "mid:fan",
            "leaf:payout",
            "leaf:payout",
        ]
    );
}

#[test]
fn test_rebinding_at_new_outpoint_changes_txids() {
    let mut builder = ContractBuilder::new(FieldSet::empty());
    builder.add_guaranteed_path(None, payout(2_000));
    let contract = builder.finish().unwrap();

    let (a, _) = contract.bind(funding()).unwrap();
    let (b, _) = contract
        .bind(OutPoint::new(Txid::from_byte_array([8u8; 32]), 0))
        .unwrap();

    assert_ne!(a[0].compute_txid(), b[0].compute_txid());
    // The shape itself is unchanged; only the funding reference moved.
    assert_eq!(a[0].output, b[0].output);
}

#[test]
fn test_amount_range_reported_per_template() {
    let mut builder = ContractBuilder::new(FieldSet::empty());
    builder.add_guaranteed_path(None, payout(5_000));

    let mut double = TransactionTemplate::new("double");
    double.add_output(Amount::from_sat(3_000), None, None);
    double.add_output(Amount::from_sat(9_000), None, None);
    builder.add_guaranteed_path(None, double);

    let contract = builder.finish().unwrap();
    assert_eq!(
        contract.amount_range(),
        (Amount::from_sat(5_000), Amount::from_sat(12_000))
    );
}
