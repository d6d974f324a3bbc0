//! Spending-condition AST
//!
//! A [`Clause`] describes one way an output may be spent: a literal push, a
//! signature check, a hash-preimage reveal, a commitment to a successor
//! transaction, a time lock, or a conjunction of those. Clauses reference
//! their parameters through [`Variable`]s, which may be resolved to a
//! concrete [`FieldValue`] or left unresolved until spend time.

use crate::fields::FieldValue;

/// A time constraint, measured either against the chain tip or the age of
/// the spent output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeSpec {
    /// Absolute lock: block height or epoch seconds, consensus encoding
    Absolute(u32),
    /// Relative lock: sequence-encoded age of the input being spent
    Relative(u32),
}

/// A named parameter slot inside a clause
///
/// Resolved variables carry a concrete value that is compiled into the
/// script. Unresolved variables compile to nothing and instead reserve a
/// witness-stack slot the spender fills in later.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    name: String,
    value: Option<FieldValue>,
}

impl Variable {
    /// Create a resolved variable
    pub fn new(name: impl Into<String>, value: FieldValue) -> Self {
        Self {
            name: name.into(),
            value: Some(value),
        }
    }

    /// Create an unresolved variable, to be supplied by the spender
    pub fn unresolved(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn value(&self) -> Option<&FieldValue> {
        self.value.as_ref()
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.value.is_some()
    }
}

/// One spending condition
///
/// Conditions compose with [`Clause::And`]; alternatives are expressed as
/// separate branches of a contract, not inside the clause itself.
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    /// Push the variable's value, or reserve a witness slot if unresolved
    Variable(Variable),
    /// Require a signature by the named key; the signature itself is a
    /// witness slot
    Signature(Variable),
    /// Require the preimage of the named 32-byte digest; the preimage is a
    /// witness slot
    Preimage(Variable),
    /// Commit to the 32-byte hash of a successor transaction template
    Template(Variable),
    /// Require the spending transaction to satisfy a time constraint
    After(Variable),
    /// All conditions must hold
    And(Vec<Clause>),
}

impl Clause {
    /// Conjunction of `clauses` as a single [`Clause::And`]
    pub fn all(clauses: impl IntoIterator<Item = Clause>) -> Self {
        Clause::And(clauses.into_iter().collect())
    }
}
