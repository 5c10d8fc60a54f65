//! Transaction pipeline for contract calls and deployments
//!
//! Every submission runs the same fixed sequence:
//! gas price -> nonce -> gas estimate -> ceiling check -> sign -> broadcast.
//! Nothing is retried; the first failing step ends the submission.

use super::draft::TransactionDraft;
use super::gas::GasCeiling;
use super::request::{parse_address, DeployRequest, InvokeRequest, PrivateKey};
use crate::chain::NetworkClient;
use crate::contract::{Compiler, ContractProxy, SolcCompiler};
use crate::error::{PipelineError, PipelineResult, RpcCall};

use ethers::signers::{LocalWallet, Signer};
use ethers::types::{Address, H256, U256};
use tracing::{debug, info, warn};

/// Submits contract calls and deployments through an injected network client
pub struct TransactionPipeline<N, C = SolcCompiler> {
    /// Network client
    client: N,
    /// Compiler used when a request carries source instead of an ABI
    compiler: C,
    /// Chain id used for replay protected signatures
    chain_id: u64,
}

impl<N: NetworkClient> TransactionPipeline<N, SolcCompiler> {
    /// Create a pipeline that compiles with the local solc
    pub fn new(client: N, chain_id: u64) -> Self {
        Self::with_compiler(client, SolcCompiler::new(), chain_id)
    }
}

impl<N: NetworkClient, C: Compiler> TransactionPipeline<N, C> {
    /// Create a pipeline with a specific compiler
    pub fn with_compiler(client: N, compiler: C, chain_id: u64) -> Self {
        Self {
            client,
            compiler,
            chain_id,
        }
    }

    pub fn client(&self) -> &N {
        &self.client
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Call `method_name` on a deployed contract
    ///
    /// Resolves with the transaction hash once the node accepts the
    /// transaction; it does not wait for the transaction to be mined.
    pub async fn invoke_method(&self, request: InvokeRequest) -> PipelineResult<H256> {
        let abi = request.interface()?.resolve(&self.compiler)?;
        let from = parse_address("from", &request.from)?;
        let to = parse_address("contract", &request.contract_address)?;
        let wallet = signing_wallet(&request.from_key, from)?;
        let ceiling = GasCeiling::new(request.max_gas)?;

        let data = ContractProxy::new(abi).encode_call(&request.method_name, &request.args)?;
        let draft = TransactionDraft::call(from, to, data);

        let (tx_hash, gas_limit) = self.submit(draft, &wallet, ceiling).await?;
        info!(
            "Sent transaction {:?} ({} with {} gas limit) to network to mine",
            tx_hash, request.method_name, gas_limit
        );
        Ok(tx_hash)
    }

    /// Deploy a new contract
    ///
    /// Resolves with the transaction hash once the node accepts the
    /// transaction; it does not wait for the transaction to be mined.
    pub async fn deploy_contract(&self, request: DeployRequest) -> PipelineResult<H256> {
        let contract = request.deployment()?.resolve(&self.compiler)?;
        let from = parse_address("from", &request.from)?;
        let wallet = signing_wallet(&request.from_key, from)?;
        let ceiling = GasCeiling::new(request.max_gas)?;

        let bytecode = contract.bytecode.unwrap_or_default();
        let data = ContractProxy::new(contract.abi).encode_deployment(&bytecode, &request.args)?;
        let draft = TransactionDraft::deployment(from, data);

        let (tx_hash, gas_limit) = self.submit(draft, &wallet, ceiling).await?;
        info!(
            "Sent deployment transaction {:?} ({} with {} gas limit) to network to mine",
            tx_hash,
            request.contract_name.as_deref().unwrap_or("contract"),
            gas_limit
        );
        Ok(tx_hash)
    }

    /// Fill in the network dependent fields, then sign and broadcast
    async fn submit(
        &self,
        mut draft: TransactionDraft,
        wallet: &LocalWallet,
        ceiling: GasCeiling,
    ) -> PipelineResult<(H256, U256)> {
        let gas_price = self
            .client
            .get_gas_price()
            .await
            .map_err(PipelineError::network(RpcCall::GasPrice))?;
        draft.gas_price = Some(gas_price);
        debug!("Gas price: {}", gas_price);

        let nonce = self
            .client
            .get_transaction_count(draft.from)
            .await
            .map_err(PipelineError::network(RpcCall::TransactionCount))?;
        draft.nonce = Some(nonce);
        debug!("Nonce for {:?}: {}", draft.from, nonce);

        let estimate = self
            .client
            .estimate_gas(&draft.to_typed(self.chain_id))
            .await
            .map_err(PipelineError::network(RpcCall::EstimateGas))?;
        debug!("Estimated gas: {} (max {})", estimate, ceiling.max_gas());

        draft.gas_limit = Some(ceiling.check(estimate)?);

        let signed = draft.sign(wallet, self.chain_id)?;
        debug!(
            "Signed transaction {:?}, max fee {} wei",
            signed.hash,
            GasCeiling::calculate_cost(estimate, gas_price)
        );

        let tx_hash = self
            .client
            .send_signed_transaction(&signed.to_hex())
            .await
            .map_err(PipelineError::network(RpcCall::SendSignedTransaction))?;

        if tx_hash != signed.hash {
            warn!(
                "Node returned hash {:?}, expected {:?}",
                tx_hash, signed.hash
            );
        }

        Ok((tx_hash, estimate))
    }
}

fn signing_wallet(key: &PrivateKey, from: Address) -> PipelineResult<LocalWallet> {
    let wallet = key.wallet()?;
    if wallet.address() != from {
        warn!(
            "Sender {:?} does not match signing key address {:?}",
            from,
            wallet.address()
        );
    }
    Ok(wallet)
}
