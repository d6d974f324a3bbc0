//! Stencil - SDK for compiling clause-based covenants into CTV transaction trees
//!
//! This crate turns declarative spending conditions into Bitcoin script. A
//! contract is a set of alternative branches over typed, frozen parameters;
//! branches may commit to the exact shape of their successor transactions
//! via `OP_CHECKTEMPLATEVERIFY`, and nested contracts chain those
//! commitments into a tree. Binding a contract to a funding outpoint
//! enumerates every pre-committed transaction in that tree.
//!
//! # Example
//!
//! ```
//! use stencil::{Clause, ContractBuilder, FieldBuilder, FieldValue, TransactionTemplate};
//! use stencil::bitcoin::{Amount, OutPoint};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Declare and assign the contract's parameters
//! let mut fields = FieldBuilder::new(["recovery_key"]);
//! fields.assign("recovery_key", FieldValue::Key(stencil::util::public_key(1)))?;
//! let fields = fields.freeze()?;
//!
//! // A guaranteed payout of 50 000 sats
//! let mut payout = TransactionTemplate::new("payout");
//! payout.add_output(Amount::from_sat(50_000), None, None);
//!
//! // One branch: the recovery key holder can force the payout
//! let mut builder = ContractBuilder::new(fields.clone());
//! builder.add_guaranteed_path(
//!     Some(Clause::Signature(fields.variable("recovery_key")?)),
//!     payout,
//! );
//! let contract = builder.finish()?;
//!
//! // Expand the transaction tree below a funding outpoint
//! let (txns, metadata) = contract.bind(OutPoint::null())?;
//! assert_eq!(txns.len(), 1);
//! assert_eq!(metadata.len(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! # Connecting to Nodes
//!
//! Use the `RpcClient` to fund and broadcast through Bitcoin Core:
//!
//! ```ignore
//! use stencil::{NodeClient, NodeConfig, RpcClient};
//!
//! // From config file
//! let config = NodeConfig::from_file("stencil.toml")?;
//! let client = RpcClient::new(config)?;
//!
//! // Or from URL
//! let client = RpcClient::from_url("http://localhost:18443", "user", "pass")?;
//!
//! // Fund the contract, then broadcast the tree
//! let txid = client.send_to_address(&funding_address, contract.amount_range().1)?;
//! let (txns, _) = contract.bind(utxo.outpoint())?;
//! ```

pub mod clause;
pub mod client;
pub mod compiler;
#[cfg(feature = "rpc")]
pub mod config;
pub mod contract;
pub mod error;
pub mod fields;
#[cfg(feature = "rpc")]
pub mod rpc_client;
pub mod template;
pub mod util;
pub mod witness;

#[cfg(test)]
mod mock_client;
#[cfg(test)]
mod test_fixtures;

// Re-export core types
pub use clause::{Clause, TimeSpec, Variable};
pub use client::NodeClient;
pub use compiler::{compile, compile_branches};
pub use contract::{BoundContract, ContractBuilder, ContractMeta, TxMeta};
pub use error::{BindError, ClientError, CompileError};
pub use fields::{FieldBuilder, FieldError, FieldSet, FieldValue};
pub use template::{OutputMeta, TemplateHash, TransactionTemplate};
pub use witness::{WitnessItem, WitnessManager, WitnessName, WitnessTemplate};

// Re-export config and RPC client when feature is enabled
#[cfg(feature = "rpc")]
pub use config::{ConfigError, Network, NodeConfig, RpcConfig};
#[cfg(feature = "rpc")]
pub use rpc_client::RpcClient;

// Re-export commonly used external types
pub use bitcoin;
pub use bitcoin::{Amount, OutPoint, Transaction, Txid};
