//! Contract assembly and the transaction-tree binder
//!
//! A [`ContractBuilder`] collects a contract's parameters, spending branches
//! and guaranteed transaction templates, compiles them into a
//! [`BoundContract`], and [`BoundContract::bind`] expands the whole tree of
//! pre-committed transactions below a funding outpoint.

use bitcoin::{Amount, OutPoint, ScriptBuf, Transaction, Witness};
use crate::clause::{Clause, Variable};
use crate::compiler::compile_branches;
use crate::error::{BindError, CompileError};
use crate::fields::{FieldSet, FieldValue};
use crate::template::{OutputMeta, TemplateHash, TransactionTemplate};
use crate::util::p2wsh_script_pubkey;
use crate::witness::WitnessManager;
use log::debug;

/// Display metadata for a contract
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContractMeta {
    pub color: String,
    pub label: String,
}

impl ContractMeta {
    pub fn new(color: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            color: color.into(),
            label: label.into(),
        }
    }
}

impl Default for ContractMeta {
    fn default() -> Self {
        Self::new("brown", "generic")
    }
}

/// Descriptive record paired with each enumerated transaction
///
/// `label` reads `"<contract label>:<template label>"`; `utxo_metadata`
/// holds one entry per output of the transaction, in output order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxMeta {
    pub color: String,
    pub label: String,
    pub utxo_metadata: Vec<OutputMeta>,
}

#[cfg(feature = "serde")]
impl TxMeta {
    /// Render as JSON
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "color": self.color,
            "label": self.label,
            "utxo_metadata": self
                .utxo_metadata
                .iter()
                .map(|meta| serde_json::json!({
                    "color": meta.color,
                    "label": meta.label,
                }))
                .collect::<Vec<_>>(),
        })
    }
}

/// Assembles a contract from fields, branches and guaranteed templates
///
/// # Examples
///
/// ```
/// use stencil::bitcoin::Amount;
/// use stencil::contract::ContractBuilder;
/// use stencil::fields::FieldSet;
/// use stencil::template::TransactionTemplate;
///
/// let mut payout = TransactionTemplate::new("payout");
/// payout.add_output(Amount::from_sat(50_000), None, None);
///
/// let mut builder = ContractBuilder::new(FieldSet::empty());
/// builder.add_guaranteed_path(None, payout);
/// let contract = builder.finish().unwrap();
/// assert_eq!(contract.transactions().len(), 1);
/// ```
pub struct ContractBuilder {
    fields: FieldSet,
    metadata: ContractMeta,
    branches: Vec<Clause>,
    transactions: Vec<TransactionTemplate>,
}

impl ContractBuilder {
    /// Create a builder over a frozen parameter set
    #[must_use]
    pub fn new(fields: FieldSet) -> Self {
        Self {
            fields,
            metadata: ContractMeta::default(),
            branches: Vec::new(),
            transactions: Vec::new(),
        }
    }

    /// Set the contract's display metadata
    #[must_use]
    pub fn metadata(mut self, metadata: ContractMeta) -> Self {
        self.metadata = metadata;
        self
    }

    /// Add a branch that does not commit to a transaction shape
    pub fn add_branch(&mut self, clause: Clause) -> &mut Self {
        self.branches.push(clause);
        self
    }

    /// Add a branch guaranteeing that spending realizes `template`
    ///
    /// The branch commits to the template's hash; `unlock` guards the branch
    /// further, `None` leaves the commitment as its only condition.
    pub fn add_guaranteed_path(
        &mut self,
        unlock: Option<Clause>,
        template: TransactionTemplate,
    ) -> &mut Self {
        let hash = template.template_hash();
        let commit = Clause::Template(Variable::new(
            format!("ctv_{}", self.transactions.len()),
            FieldValue::Hash(hash.to_byte_array()),
        ));
        let branch = match unlock {
            Some(clause) => Clause::all([clause, commit]),
            None => commit,
        };
        self.branches.push(branch);
        self.transactions.push(template);
        self
    }

    /// Compile the branches and seal the contract
    ///
    /// # Errors
    ///
    /// Returns a [`CompileError`] if any branch fails to compile or the
    /// guaranteed amounts overflow.
    pub fn finish(self) -> Result<BoundContract, CompileError> {
        let witness_manager = compile_branches(&self.branches)?;

        let mut amount_range: Option<(Amount, Amount)> = None;
        let mut transactions = Vec::with_capacity(self.transactions.len());
        for template in self.transactions {
            let total = template.total_amount().ok_or(CompileError::AmountOverflow)?;
            amount_range = Some(match amount_range {
                None => (total, total),
                Some((min, max)) => (min.min(total), max.max(total)),
            });
            transactions.push((template.template_hash(), template));
        }

        Ok(BoundContract {
            fields: self.fields,
            metadata: self.metadata,
            amount_range: amount_range.unwrap_or((Amount::ZERO, Amount::ZERO)),
            witness_manager,
            transactions,
        })
    }
}

/// A compiled contract with its guaranteed transaction shapes
#[derive(Debug, Clone)]
pub struct BoundContract {
    fields: FieldSet,
    metadata: ContractMeta,
    amount_range: (Amount, Amount),
    witness_manager: WitnessManager,
    transactions: Vec<(TemplateHash, TransactionTemplate)>,
}

impl BoundContract {
    /// The frozen parameter set the contract was built over
    #[must_use]
    pub fn fields(&self) -> &FieldSet {
        &self.fields
    }

    #[must_use]
    pub fn metadata(&self) -> &ContractMeta {
        &self.metadata
    }

    /// Smallest and largest total guaranteed by any single template
    #[must_use]
    pub fn amount_range(&self) -> (Amount, Amount) {
        self.amount_range
    }

    /// The compiled program and its per-branch witness templates
    #[must_use]
    pub fn witness_manager(&self) -> &WitnessManager {
        &self.witness_manager
    }

    /// Guaranteed templates paired with their hashes, in declaration order
    #[must_use]
    pub fn transactions(&self) -> &[(TemplateHash, TransactionTemplate)] {
        &self.transactions
    }

    /// P2WSH locking script of the compiled program
    ///
    /// Funding this script is what puts the contract on chain.
    #[must_use]
    pub fn script_pubkey(&self) -> ScriptBuf {
        p2wsh_script_pubkey(self.witness_manager.program())
    }

    /// Expand the tree of pre-committed transactions below `funding`
    ///
    /// For each guaranteed template the stored hash is checked against a
    /// recomputation, the unsigned transaction is realized, and one copy is
    /// emitted per witness template committing to the same hash, carrying
    /// the program plus that branch's stack items. Outputs paying nested
    /// contracts are then bound recursively at their own outpoints.
    ///
    /// Returned transactions and metadata run parallel, parents before
    /// children.
    ///
    /// # Examples
    ///
    /// ```
    /// use stencil::bitcoin::{Amount, OutPoint};
    /// use stencil::contract::ContractBuilder;
    /// use stencil::fields::FieldSet;
    /// use stencil::template::TransactionTemplate;
    ///
    /// let mut payout = TransactionTemplate::new("payout");
    /// payout.add_output(Amount::from_sat(50_000), None, None);
    ///
    /// let mut builder = ContractBuilder::new(FieldSet::empty());
    /// builder.add_guaranteed_path(None, payout);
    /// let contract = builder.finish().unwrap();
    ///
    /// let (txns, metadata) = contract.bind(OutPoint::null()).unwrap();
    /// assert_eq!(txns.len(), 1);
    /// assert_eq!(metadata[0].label, "generic:payout");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`BindError::TemplateHashMismatch`] if any stored hash
    /// disagrees with its recomputation.
    pub fn bind(&self, funding: OutPoint) -> Result<(Vec<Transaction>, Vec<TxMeta>), BindError> {
        let mut txns = Vec::new();
        let mut metadata = Vec::new();

        for (hash, template) in &self.transactions {
            let computed = template.template_hash();
            if computed != *hash {
                return Err(BindError::TemplateHashMismatch {
                    expected: *hash,
                    computed,
                });
            }

            let txid = template.realize(funding).compute_txid();
            let label = format!("{}:{}", self.metadata.label, template.label());

            for candidate in self
                .witness_manager
                .witnesses()
                .iter()
                .filter(|witness| witness.template_hash() == Some(*hash))
            {
                // Each candidate gets its own realization; siblings must not
                // share buffers.
                let mut tx = template.realize(funding);
                let mut witness = Witness::new();
                witness.push(self.witness_manager.program().as_bytes());
                for item in candidate.items() {
                    witness.push(item.stack_bytes());
                }
                tx.input[0].witness = witness;

                txns.push(tx);
                metadata.push(TxMeta {
                    color: self.metadata.color.clone(),
                    label: label.clone(),
                    utxo_metadata: template
                        .outputs()
                        .iter()
                        .map(|slot| slot.metadata().clone())
                        .collect(),
                });
            }

            for (vout, slot) in template.outputs().iter().enumerate() {
                if let Some(nested) = slot.contract() {
                    let (nested_txns, nested_meta) =
                        nested.bind(OutPoint::new(txid, vout as u32))?;
                    txns.extend(nested_txns);
                    metadata.extend(nested_meta);
                }
            }
        }

        debug!("bound {} transaction(s) below {funding}", txns.len());
        Ok((txns, metadata))
    }

    /// Render the contract, its program and its transaction tree as JSON
    #[cfg(feature = "serde")]
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let transactions: serde_json::Map<String, serde_json::Value> = self
            .transactions
            .iter()
            .map(|(hash, template)| (hash.to_string(), template.to_json()))
            .collect();

        serde_json::json!({
            "witness_manager": self.witness_manager.to_json(),
            "transactions": transactions,
            "min_amount_spent": self.amount_range.0.to_sat(),
            "max_amount_spent": self.amount_range.1.to_sat(),
            "metadata": {
                "color": self.metadata.color,
                "label": self.metadata.label,
            },
        })
    }
}
