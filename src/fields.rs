//! Typed contract parameters
//!
//! Contracts are parameterized by named, typed values. Construction happens
//! in two phases: a [`FieldBuilder`] accepts assignments for the declared
//! names, then [`FieldBuilder::freeze`] converts it into an immutable
//! [`FieldSet`]. The frozen set exposes no mutating operations, so values
//! observed during compilation cannot drift afterwards.

use crate::clause::{TimeSpec, Variable};
use std::collections::BTreeMap;
use thiserror::Error;

/// A concrete parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Raw bytes, pushed verbatim
    Bytes(Vec<u8>),
    /// Script number
    Int(i64),
    /// Public key
    Key(bitcoin::PublicKey),
    /// 32-byte digest
    Hash([u8; 32]),
    /// Time constraint
    Time(TimeSpec),
}

impl FieldValue {
    /// Short kind name used in error messages
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            FieldValue::Bytes(_) => "bytes",
            FieldValue::Int(_) => "an integer",
            FieldValue::Key(_) => "a key",
            FieldValue::Hash(_) => "a hash",
            FieldValue::Time(_) => "a time constraint",
        }
    }
}

/// Errors raised by field assignment and lookup
#[derive(Debug, Error)]
pub enum FieldError {
    #[error("No declared field named `{name}`")]
    UnknownField { name: String },

    #[error("Field `{name}` was never assigned")]
    Unassigned { name: String },
}

/// Mutable first phase: declared names awaiting assignment
///
/// # Examples
///
/// ```
/// use stencil::fields::{FieldBuilder, FieldValue};
///
/// let mut builder = FieldBuilder::new(["amount"]);
/// builder.assign("amount", FieldValue::Int(50_000)).unwrap();
/// let fields = builder.freeze().unwrap();
/// assert_eq!(fields.get("amount").unwrap(), &FieldValue::Int(50_000));
/// ```
#[derive(Debug, Clone)]
pub struct FieldBuilder {
    slots: BTreeMap<String, Option<FieldValue>>,
}

impl FieldBuilder {
    /// Declare the set of field names this contract accepts
    pub fn new<I, S>(declared: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            slots: declared.into_iter().map(|name| (name.into(), None)).collect(),
        }
    }

    /// Assign a value to a declared field
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::UnknownField`] if `name` was never declared.
    pub fn assign(&mut self, name: &str, value: FieldValue) -> Result<(), FieldError> {
        match self.slots.get_mut(name) {
            Some(slot) => {
                *slot = Some(value);
                Ok(())
            }
            None => Err(FieldError::UnknownField {
                name: name.to_string(),
            }),
        }
    }

    /// End the mutable phase
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::Unassigned`] if any declared field has no value.
    pub fn freeze(self) -> Result<FieldSet, FieldError> {
        let mut values = BTreeMap::new();
        for (name, slot) in self.slots {
            match slot {
                Some(value) => {
                    values.insert(name, value);
                }
                None => return Err(FieldError::Unassigned { name }),
            }
        }
        Ok(FieldSet { values })
    }
}

/// Immutable, fully assigned parameter set
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSet {
    values: BTreeMap<String, FieldValue>,
}

impl FieldSet {
    /// Parameter set with no fields, for contracts that take none
    #[must_use]
    pub fn empty() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }

    /// Look up a field value
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::UnknownField`] if `name` is not part of the set.
    pub fn get(&self, name: &str) -> Result<&FieldValue, FieldError> {
        self.values.get(name).ok_or_else(|| FieldError::UnknownField {
            name: name.to_string(),
        })
    }

    /// Resolved [`Variable`] for use inside a clause
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::UnknownField`] if `name` is not part of the set.
    pub fn variable(&self, name: &str) -> Result<Variable, FieldError> {
        Ok(Variable::new(name, self.get(name)?.clone()))
    }

    /// Declared field names, in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Default for FieldSet {
    fn default() -> Self {
        Self::empty()
    }
}
