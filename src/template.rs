//! Transaction templates and their commitment hashes
//!
//! A [`TransactionTemplate`] fixes the shape of one future transaction:
//! outputs, version, lock time, and the sole input's sequence. The funding
//! outpoint is the only part left open. [`TransactionTemplate::template_hash`]
//! commits to that shape the way `OP_CHECKTEMPLATEVERIFY` checks it, so a
//! program carrying the hash can only be spent by a transaction of exactly
//! this shape.

use bitcoin::consensus::encode::serialize;
use bitcoin::hashes::{sha256, Hash};
use bitcoin::opcodes::all::OP_PUSHNUM_1;
use bitcoin::script::Builder;
use bitcoin::{
    absolute, transaction, Amount, OutPoint, ScriptBuf, Sequence, Transaction, TxIn, TxOut,
    Witness,
};
use crate::contract::BoundContract;
use std::fmt;

/// 32-byte commitment to a transaction template's shape
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TemplateHash([u8; 32]);

impl TemplateHash {
    #[must_use]
    pub const fn from_byte_array(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn to_byte_array(self) -> [u8; 32] {
        self.0
    }

    #[must_use]
    pub fn as_byte_array(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for TemplateHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for TemplateHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TemplateHash({self})")
    }
}

/// Display metadata attached to an output slot
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OutputMeta {
    pub color: String,
    pub label: String,
}

impl OutputMeta {
    pub fn new(color: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            color: color.into(),
            label: label.into(),
        }
    }
}

impl Default for OutputMeta {
    fn default() -> Self {
        Self::new("brown", "generic")
    }
}

/// One output slot: an amount, the contract it pays (if any), and metadata
#[derive(Debug, Clone)]
pub struct TemplateOutput {
    amount: Amount,
    contract: Option<BoundContract>,
    metadata: OutputMeta,
}

impl TemplateOutput {
    #[must_use]
    pub fn amount(&self) -> Amount {
        self.amount
    }

    /// Nested contract this slot pays, if any
    #[must_use]
    pub fn contract(&self) -> Option<&BoundContract> {
        self.contract.as_ref()
    }

    #[must_use]
    pub fn metadata(&self) -> &OutputMeta {
        &self.metadata
    }

    /// Locking script this slot pays to
    ///
    /// Slots without a nested contract pay a bare `OP_1`.
    #[must_use]
    pub fn script_pubkey(&self) -> ScriptBuf {
        match &self.contract {
            Some(contract) => contract.script_pubkey(),
            None => plain_transfer_script(),
        }
    }
}

pub(crate) fn plain_transfer_script() -> ScriptBuf {
    Builder::new().push_opcode(OP_PUSHNUM_1).into_script()
}

/// Shape of one future transaction, open only at its funding outpoint
///
/// # Examples
///
/// ```
/// use stencil::bitcoin::Amount;
/// use stencil::template::TransactionTemplate;
///
/// let mut template = TransactionTemplate::new("payout");
/// template.add_output(Amount::from_sat(50_000), None, None);
/// let hash = template.template_hash();
/// assert_eq!(hash, template.template_hash());
/// ```
#[derive(Debug, Clone)]
pub struct TransactionTemplate {
    label: String,
    outputs: Vec<TemplateOutput>,
    sequence: Sequence,
    lock_time: absolute::LockTime,
    version: transaction::Version,
}

impl TransactionTemplate {
    /// Create an empty template with the given label
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            outputs: Vec::new(),
            sequence: Sequence::MAX,
            lock_time: absolute::LockTime::ZERO,
            version: transaction::Version::TWO,
        }
    }

    /// Append an output slot
    ///
    /// With `metadata: None` the slot inherits the paid contract's metadata,
    /// or the defaults if it pays no contract.
    pub fn add_output(
        &mut self,
        amount: Amount,
        contract: Option<BoundContract>,
        metadata: Option<OutputMeta>,
    ) -> &mut Self {
        let metadata = metadata.unwrap_or_else(|| match &contract {
            Some(paid) => {
                let meta = paid.metadata();
                OutputMeta::new(meta.color.clone(), meta.label.clone())
            }
            None => OutputMeta::default(),
        });
        self.outputs.push(TemplateOutput {
            amount,
            contract,
            metadata,
        });
        self
    }

    /// Set the sole input's sequence number
    #[must_use]
    pub fn sequence(mut self, sequence: Sequence) -> Self {
        self.sequence = sequence;
        self
    }

    /// Set the lock time
    #[must_use]
    pub fn lock_time(mut self, lock_time: absolute::LockTime) -> Self {
        self.lock_time = lock_time;
        self
    }

    /// Set the transaction version
    #[must_use]
    pub fn version(mut self, version: transaction::Version) -> Self {
        self.version = version;
        self
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn outputs(&self) -> &[TemplateOutput] {
        &self.outputs
    }

    /// Total value across all output slots, `None` on overflow
    #[must_use]
    pub fn total_amount(&self) -> Option<Amount> {
        self.outputs
            .iter()
            .try_fold(Amount::ZERO, |total, slot| total.checked_add(slot.amount))
    }

    /// The `OP_CHECKTEMPLATEVERIFY` default hash of this shape
    ///
    /// Computed for the single-input spend at input index zero with an empty
    /// scriptSig, per BIP-119: the scriptSig hash is omitted entirely when
    /// no input carries one. The funding outpoint is not part of the hash,
    /// which is what lets a template commit to a child before the parent's
    /// txid exists.
    #[must_use]
    pub fn template_hash(&self) -> TemplateHash {
        let tx = self.realize(OutPoint::null());

        let mut sequences = Vec::with_capacity(4 * tx.input.len());
        for input in &tx.input {
            sequences.extend_from_slice(&serialize(&input.sequence));
        }
        let mut outputs = Vec::new();
        for output in &tx.output {
            outputs.extend_from_slice(&serialize(output));
        }

        let mut data = Vec::with_capacity(84);
        data.extend_from_slice(&serialize(&tx.version));
        data.extend_from_slice(&serialize(&tx.lock_time));
        data.extend_from_slice(&serialize(&(tx.input.len() as u32)));
        data.extend_from_slice(sha256::Hash::hash(&sequences).as_byte_array());
        data.extend_from_slice(&serialize(&(tx.output.len() as u32)));
        data.extend_from_slice(sha256::Hash::hash(&outputs).as_byte_array());
        data.extend_from_slice(&serialize(&0u32));

        TemplateHash(sha256::Hash::hash(&data).to_byte_array())
    }

    /// Materialize the unsigned transaction spending `funding`
    #[must_use]
    pub fn realize(&self, funding: OutPoint) -> Transaction {
        Transaction {
            version: self.version,
            lock_time: self.lock_time,
            input: vec![TxIn {
                previous_output: funding,
                script_sig: ScriptBuf::new(),
                sequence: self.sequence,
                witness: Witness::new(),
            }],
            output: self
                .outputs
                .iter()
                .map(|slot| TxOut {
                    value: slot.amount,
                    script_pubkey: slot.script_pubkey(),
                })
                .collect(),
        }
    }

    /// Render as JSON, nested contracts included
    #[cfg(feature = "serde")]
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "label": self.label,
            "version": self.version.0,
            "lock_time": self.lock_time.to_consensus_u32(),
            "sequence": self.sequence.0,
            "outputs": self
                .outputs
                .iter()
                .map(|slot| {
                    serde_json::json!({
                        "amount": slot.amount.to_sat(),
                        "script_pubkey": format!("{:x}", slot.script_pubkey().as_script()),
                        "metadata": {
                            "color": slot.metadata.color,
                            "label": slot.metadata.label,
                        },
                        "contract": slot.contract.as_ref().map(BoundContract::to_json),
                    })
                })
                .collect::<Vec<_>>(),
        })
    }
}
