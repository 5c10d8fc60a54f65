//! Error types for contract calls and deployments

use ethers::providers::ProviderError;
use ethers::signers::WalletError;
use ethers::types::U256;
use std::fmt;
use thiserror::Error;

/// Main error type for the transaction pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Usage error: {0}")]
    Usage(#[from] UsageError),

    #[error("Compilation error: {0}")]
    Compilation(#[from] CompilationError),

    #[error("Estimated gas {estimated} higher than max gas {ceiling}")]
    GasCeilingExceeded { estimated: U256, ceiling: U256 },

    #[error("Network error during {call}: {source}")]
    Network {
        call: RpcCall,
        #[source]
        source: ProviderError,
    },

    #[error("Signing error: {0}")]
    Signing(#[from] WalletError),
}

impl PipelineError {
    /// Check if the caller can fix this by correcting the request
    pub fn is_usage(&self) -> bool {
        matches!(self, PipelineError::Usage(_))
    }

    /// Check if the failure happened before any network I/O
    pub fn before_network(&self) -> bool {
        matches!(self, PipelineError::Usage(_) | PipelineError::Compilation(_))
    }

    pub(crate) fn network(call: RpcCall) -> impl FnOnce(ProviderError) -> Self {
        move |source| PipelineError::Network { call, source }
    }
}

/// Malformed or incomplete request options
#[derive(Error, Debug)]
pub enum UsageError {
    #[error("Please provide either a contract ABI/JSON or contract source and contract name")]
    MissingContract,

    #[error("Contract source supplied without a contract name")]
    MissingContractName,

    #[error("Invalid contract ABI: {0}")]
    InvalidAbi(#[source] serde_json::Error),

    #[error("Invalid contract JSON: {0}")]
    InvalidArtifact(String),

    #[error("Invalid {field} address {value:?}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("Invalid private key: {0}")]
    InvalidKey(String),

    #[error("Max gas must be greater than zero")]
    ZeroGasCeiling,

    #[error("Method {name} not found in contract ABI")]
    UnknownMethod { name: String },

    #[error("Expected {expected} arguments, got {got}")]
    ArgumentCount { expected: usize, got: usize },

    #[error("Invalid argument {index} for type {param_type}: {message}")]
    InvalidArgument {
        index: usize,
        param_type: String,
        message: String,
    },

    #[error("Contract has no constructor but {got} constructor arguments were given")]
    UnexpectedConstructorArgs { got: usize },

    #[error("Contract bytecode is empty")]
    MissingBytecode,
}

/// Failures reported by the contract compiler
#[derive(Error, Debug)]
pub enum CompilationError {
    #[error("solc failed: {0}")]
    Solc(#[from] ethers::solc::error::SolcError),

    #[error("solc reported errors:\n{}", .0.join("\n"))]
    Diagnostics(Vec<String>),

    #[error("Contract {name} not found in compiler output")]
    ContractNotFound { name: String },

    #[error("Contract {name} compiled without an ABI")]
    MissingAbi { name: String },

    #[error("Contract {name} compiled without bytecode")]
    MissingBytecode { name: String },
}

/// The network round-trips performed by the pipeline, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcCall {
    GasPrice,
    TransactionCount,
    EstimateGas,
    SendSignedTransaction,
}

impl fmt::Display for RpcCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RpcCall::GasPrice => "eth_gasPrice",
            RpcCall::TransactionCount => "eth_getTransactionCount",
            RpcCall::EstimateGas => "eth_estimateGas",
            RpcCall::SendSignedTransaction => "eth_sendRawTransaction",
        };
        f.write_str(name)
    }
}

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ceiling_message_carries_both_values() {
        let err = PipelineError::GasCeilingExceeded {
            estimated: U256::from(200_000),
            ceiling: U256::from(100_000),
        };
        assert_eq!(
            err.to_string(),
            "Estimated gas 200000 higher than max gas 100000"
        );
        assert!(!err.before_network());
    }

    #[test]
    fn test_network_error_keeps_source() {
        let err = PipelineError::network(RpcCall::EstimateGas)(ProviderError::CustomError(
            "execution reverted".to_string(),
        ));
        assert!(err.to_string().contains("eth_estimateGas"));
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert!(source.unwrap_or_default().contains("execution reverted"));
    }

    #[test]
    fn test_usage_classification() {
        let err = PipelineError::from(UsageError::MissingContract);
        assert!(err.is_usage());
        assert!(err.before_network());
    }
}
