//! Contract TX - submit contract calls and deployments to Ethereum nodes
//!
//! A [`TransactionPipeline`] resolves the contract ABI (compiling Solidity
//! source when needed), encodes the call, fills in gas price, nonce and gas
//! limit from the node, enforces a gas ceiling, then signs and broadcasts the
//! transaction.

pub mod chain;
pub mod config;
pub mod contract;
pub mod error;
pub mod tx;

pub use chain::{EthersClient, NetworkClient};
pub use contract::{AbiDescriptor, ContractArtifact, Compiler, SolcCompiler};
pub use error::{CompilationError, PipelineError, PipelineResult, RpcCall, UsageError};
pub use tx::{DeployRequest, InvokeRequest, PrivateKey, TransactionPipeline};
