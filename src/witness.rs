//! Witness templates and the compiled-program manager
//!
//! Compiling a contract produces one shared program and, per spending
//! branch, a [`WitnessTemplate`] describing the stack the spender must
//! supply: placeholder slots for spend-time data, constant selector items,
//! and at most one enforced successor-template hash.

use bitcoin::hashes::{sha256, Hash};
use bitcoin::{Script, ScriptBuf};
use crate::error::CompileError;
use crate::template::TemplateHash;
use std::fmt;
use std::sync::OnceLock;

#[cfg(feature = "serde")]
use bitcoin::hex::DisplayHex;

/// Fixed 32-byte prefix that namespaces witness slots: the SHA-256 of one
/// thousand zero bytes. Prefixed names cannot collide with meaningful stack
/// data a spender would supply.
fn slot_prefix() -> &'static [u8; 32] {
    static PREFIX: OnceLock<[u8; 32]> = OnceLock::new();
    PREFIX.get_or_init(|| sha256::Hash::hash(&[0u8; 1000]).to_byte_array())
}

/// Identifier of one witness-stack slot
///
/// Carries the fixed prefix followed by the slot's name bytes. The full
/// prefixed byte string doubles as the placeholder stack item attached to
/// enumerated transactions, so unfilled slots are recognizable on sight.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct WitnessName(Vec<u8>);

impl WitnessName {
    pub(crate) fn for_slot(name: &str) -> Self {
        let mut bytes = Vec::with_capacity(32 + name.len());
        bytes.extend_from_slice(slot_prefix());
        bytes.extend_from_slice(name.as_bytes());
        Self(bytes)
    }

    /// Full prefixed bytes, as placed on placeholder witness stacks
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Name bytes with the fixed prefix stripped
    #[must_use]
    pub fn suffix(&self) -> &[u8] {
        &self.0[32..]
    }
}

impl fmt::Display for WitnessName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for WitnessName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WitnessName({})", String::from_utf8_lossy(self.suffix()))
    }
}

/// One stack item in a witness template
#[derive(Debug, Clone, PartialEq)]
pub enum WitnessItem {
    /// Placeholder the spender replaces with real data
    Slot(WitnessName),
    /// Constant item, used for branch selectors
    Literal(Vec<u8>),
}

impl WitnessItem {
    /// Bytes attached to enumerated transactions for this item
    #[must_use]
    pub fn stack_bytes(&self) -> &[u8] {
        match self {
            WitnessItem::Slot(name) => name.as_bytes(),
            WitnessItem::Literal(bytes) => bytes,
        }
    }
}

/// Witness requirements of one spending branch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WitnessTemplate {
    items: Vec<WitnessItem>,
    template_hash: Option<TemplateHash>,
}

impl WitnessTemplate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add_slot(&mut self, name: WitnessName) {
        self.items.push(WitnessItem::Slot(name));
    }

    pub(crate) fn add_literal(&mut self, bytes: Vec<u8>) {
        self.items.push(WitnessItem::Literal(bytes));
    }

    /// Record the successor-template hash this branch commits to
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::ConflictingTemplateHash`] if the branch
    /// already commits to a hash. A branch carries at most one commitment,
    /// even if both commitments name the same hash.
    pub(crate) fn enforce_template(&mut self, hash: TemplateHash) -> Result<(), CompileError> {
        match self.template_hash {
            Some(held) => Err(CompileError::ConflictingTemplateHash { held, new: hash }),
            None => {
                self.template_hash = Some(hash);
                Ok(())
            }
        }
    }

    /// Successor-template hash this branch commits to, if any
    #[must_use]
    pub fn template_hash(&self) -> Option<TemplateHash> {
        self.template_hash
    }

    /// Stack items in push order (bottom of the stack first)
    #[must_use]
    pub fn items(&self) -> &[WitnessItem] {
        &self.items
    }

    /// Names of slots awaiting spend-time data, in push order
    pub fn slots(&self) -> impl Iterator<Item = &WitnessName> {
        self.items.iter().filter_map(|item| match item {
            WitnessItem::Slot(name) => Some(name),
            WitnessItem::Literal(_) => None,
        })
    }

    /// Render as JSON, hex-encoding stack items
    #[cfg(feature = "serde")]
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "items": self
                .items
                .iter()
                .map(|item| item.stack_bytes().to_lower_hex_string())
                .collect::<Vec<_>>(),
            "template_hash": self.template_hash.map(|hash| hash.to_string()),
        })
    }
}

/// A compiled program together with its alternative witness templates
#[derive(Debug, Clone, PartialEq)]
pub struct WitnessManager {
    program: ScriptBuf,
    witnesses: Vec<WitnessTemplate>,
}

impl WitnessManager {
    pub(crate) fn new(program: ScriptBuf, witnesses: Vec<WitnessTemplate>) -> Self {
        Self { program, witnesses }
    }

    /// The shared program all branches spend through
    #[must_use]
    pub fn program(&self) -> &Script {
        &self.program
    }

    /// One witness template per spending branch, in declaration order
    #[must_use]
    pub fn witnesses(&self) -> &[WitnessTemplate] {
        &self.witnesses
    }

    /// Render as JSON: program hex plus each branch's witness template
    #[cfg(feature = "serde")]
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "program": format!("{:x}", self.program()),
            "witnesses": self
                .witnesses
                .iter()
                .map(WitnessTemplate::to_json)
                .collect::<Vec<_>>(),
        })
    }
}
