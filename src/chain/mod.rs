//! Chain module - the network capabilities the pipeline depends on
//!
//! [`NetworkClient`] is the seam between the pipeline and an Ethereum JSON-RPC
//! node. [`EthersClient`] implements it over an ethers provider, HTTP by default.

pub mod provider;

pub use provider::EthersClient;

use async_trait::async_trait;
use ethers::providers::ProviderError;
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, H256, U256};

/// Network operations needed to submit a transaction
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NetworkClient: Send + Sync {
    /// Current gas price
    async fn get_gas_price(&self) -> Result<U256, ProviderError>;

    /// Number of transactions sent from `address` (its next nonce)
    async fn get_transaction_count(&self, address: Address) -> Result<U256, ProviderError>;

    /// Gas the node expects the transaction to use
    async fn estimate_gas(&self, tx: &TypedTransaction) -> Result<U256, ProviderError>;

    /// Broadcast a signed, 0x-prefixed RLP encoded transaction
    ///
    /// Resolves with the transaction hash as soon as the node accepts it.
    async fn send_signed_transaction(&self, raw_tx: &str) -> Result<H256, ProviderError>;
}
