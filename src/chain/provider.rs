//! JSON-RPC network client built on an ethers HTTP provider

use super::NetworkClient;
use crate::config::NetworkConfig;

use async_trait::async_trait;
use ethers::prelude::*;
use ethers::providers::{Http, JsonRpcClient, Provider};
use ethers::types::transaction::eip2718::TypedTransaction;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Network client talking to a single RPC endpoint
#[derive(Debug, Clone)]
pub struct EthersClient<P = Http> {
    provider: Provider<P>,
}

impl EthersClient<Http> {
    /// Create a client for an RPC url
    pub fn new(rpc_url: &str) -> Result<Self, url::ParseError> {
        let url = Url::parse(rpc_url)?;
        let provider = Provider::new(Http::new(url)).interval(Duration::from_millis(100));
        debug!("Created HTTP provider for {}", rpc_url);
        Ok(Self { provider })
    }

    /// Create a client from network settings
    pub fn from_config(config: &NetworkConfig) -> Result<Self, url::ParseError> {
        Self::new(&config.rpc_url)
    }
}

impl<P: JsonRpcClient> EthersClient<P> {
    /// Wrap an existing provider
    pub fn with_provider(provider: Provider<P>) -> Self {
        Self { provider }
    }

    /// Get the underlying provider
    pub fn provider(&self) -> &Provider<P> {
        &self.provider
    }
}

#[async_trait]
impl<P: JsonRpcClient> NetworkClient for EthersClient<P> {
    async fn get_gas_price(&self) -> Result<U256, ProviderError> {
        self.provider.get_gas_price().await
    }

    async fn get_transaction_count(&self, address: Address) -> Result<U256, ProviderError> {
        self.provider.get_transaction_count(address, None).await
    }

    async fn estimate_gas(&self, tx: &TypedTransaction) -> Result<U256, ProviderError> {
        self.provider.estimate_gas(tx, None).await
    }

    async fn send_signed_transaction(&self, raw_tx: &str) -> Result<H256, ProviderError> {
        self.provider.request("eth_sendRawTransaction", [raw_tx]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::providers::MockProvider;
    use serde_json::json;

    const SENDER: &str = "0x90f8bf6a479f320ead074411a4b0e7944ea8c9c1";

    fn mocked() -> (EthersClient<MockProvider>, MockProvider) {
        let (provider, mock) = Provider::mocked();
        (EthersClient::with_provider(provider), mock)
    }

    #[test]
    fn test_rejects_invalid_url() {
        assert!(EthersClient::new("not a url").is_err());
    }

    #[test]
    fn test_from_config() {
        let config = NetworkConfig {
            rpc_url: "http://localhost:8545".to_string(),
            chain_id: 31337,
        };
        let client = EthersClient::from_config(&config).unwrap();
        assert_eq!(client.provider().url().as_str(), "http://localhost:8545/");
    }

    #[tokio::test]
    async fn test_gas_price_request() {
        let (client, mock) = mocked();
        mock.push(U256::from(1_000_000_000u64)).unwrap();

        let price = client.get_gas_price().await.unwrap();
        assert_eq!(price, U256::from(1_000_000_000u64));
        mock.assert_request("eth_gasPrice", ()).unwrap();
    }

    #[tokio::test]
    async fn test_transaction_count_uses_latest_block() {
        let (client, mock) = mocked();
        mock.push(U256::from(5)).unwrap();

        let sender: Address = SENDER.parse().unwrap();
        let nonce = client.get_transaction_count(sender).await.unwrap();
        assert_eq!(nonce, U256::from(5));
        mock.assert_request(
            "eth_getTransactionCount",
            [serde_json::to_value(sender).unwrap(), json!("latest")],
        )
        .unwrap();
    }

    #[tokio::test]
    async fn test_estimate_gas_sends_draft() {
        let (client, mock) = mocked();
        mock.push(U256::from(21_000)).unwrap();

        let tx: TypedTransaction = TransactionRequest::new()
            .from(SENDER.parse::<Address>().unwrap())
            .to(SENDER.parse::<Address>().unwrap())
            .gas_price(1u64)
            .nonce(5u64)
            .into();
        let estimate = client.estimate_gas(&tx).await.unwrap();
        assert_eq!(estimate, U256::from(21_000));
        mock.assert_request("eth_estimateGas", [&tx]).unwrap();
    }

    #[tokio::test]
    async fn test_send_raw_transaction_returns_node_hash() {
        let (client, mock) = mocked();
        let hash = H256::repeat_byte(0xab);
        mock.push(hash).unwrap();

        let returned = client.send_signed_transaction("0xf86c01").await.unwrap();
        assert_eq!(returned, hash);
        mock.assert_request("eth_sendRawTransaction", ["0xf86c01"]).unwrap();
    }

    #[tokio::test]
    async fn test_missing_response_is_provider_error() {
        let (client, _mock) = mocked();
        assert!(client.get_gas_price().await.is_err());
    }
}
