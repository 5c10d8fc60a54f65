//! Transaction draft filled in step by step before signing

use crate::error::PipelineResult;

use ethers::signers::{LocalWallet, Signer};
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, Bytes, TransactionRequest, H256, U256};

/// Legacy transaction under construction
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDraft {
    pub from: Address,
    /// `None` for contract creation
    pub to: Option<Address>,
    pub data: Bytes,
    pub gas_price: Option<U256>,
    pub nonce: Option<U256>,
    pub gas_limit: Option<U256>,
}

impl TransactionDraft {
    /// Draft a call to a deployed contract
    pub fn call(from: Address, to: Address, data: Bytes) -> Self {
        Self {
            from,
            to: Some(to),
            data,
            gas_price: None,
            nonce: None,
            gas_limit: None,
        }
    }

    /// Draft a contract creation
    pub fn deployment(from: Address, data: Bytes) -> Self {
        Self {
            from,
            to: None,
            data,
            gas_price: None,
            nonce: None,
            gas_limit: None,
        }
    }

    /// Build the typed transaction carrying every field set so far
    pub fn to_typed(&self, chain_id: u64) -> TypedTransaction {
        let mut tx = TransactionRequest::new()
            .from(self.from)
            .data(self.data.clone())
            .chain_id(chain_id);

        if let Some(to) = self.to {
            tx = tx.to(to);
        }
        if let Some(gas_price) = self.gas_price {
            tx = tx.gas_price(gas_price);
        }
        if let Some(nonce) = self.nonce {
            tx = tx.nonce(nonce);
        }
        if let Some(gas_limit) = self.gas_limit {
            tx = tx.gas(gas_limit);
        }

        TypedTransaction::Legacy(tx)
    }

    /// Sign the draft and serialize it to RLP
    pub fn sign(&self, wallet: &LocalWallet, chain_id: u64) -> PipelineResult<SignedTransaction> {
        let tx = self.to_typed(chain_id);
        let wallet = wallet.clone().with_chain_id(chain_id);
        let signature = wallet.sign_transaction_sync(&tx)?;
        let raw = tx.rlp_signed(&signature);

        Ok(SignedTransaction {
            hash: tx.hash(&signature),
            raw,
        })
    }
}

/// Signed transaction ready for broadcast
#[derive(Debug, Clone, PartialEq)]
pub struct SignedTransaction {
    pub hash: H256,
    pub raw: Bytes,
}

impl SignedTransaction {
    /// 0x-prefixed hex wire format
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.raw))
    }
}
