//! Error types for stencil operations

use crate::template::TemplateHash;
use thiserror::Error;

/// Errors that can occur while lowering clauses into script
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("Variable `{name}` must be resolved before compilation")]
    Unresolved { name: String },

    #[error("Variable `{name}` resolved to {found}, expected {expected}")]
    WrongKind {
        name: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Variable `{name}` holds {len} bytes, expected a 32-byte digest")]
    BadHashLength { name: String, len: usize },

    #[error("Branch already commits to template {held}, cannot also commit to {new}")]
    ConflictingTemplateHash { held: TemplateHash, new: TemplateHash },

    #[error("Variable `{name}` is too large to push onto the stack")]
    OversizedPush { name: String },

    #[error("Total output value overflows the amount range")]
    AmountOverflow,
}

/// Faults surfaced while binding a contract to a funding outpoint
///
/// A bind fault means the contract was constructed inconsistently, not that
/// the caller passed a bad argument.
#[derive(Debug, Error)]
pub enum BindError {
    #[error("Stored template hash {expected} disagrees with recomputed hash {computed}")]
    TemplateHashMismatch {
        expected: TemplateHash,
        computed: TemplateHash,
    },
}

/// Errors that can occur while talking to a node
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("RPC request failed: {0}")]
    Rpc(String),

    #[error("Unexpected node response: {0}")]
    BadResponse(String),

    #[cfg(feature = "rpc")]
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}
