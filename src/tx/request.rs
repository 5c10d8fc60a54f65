//! Request options for contract calls and deployments

use crate::contract::{AbiDescriptor, ContractArtifact, ContractInterface, DeploymentInput};
use crate::error::{PipelineResult, UsageError};

use ethers::signers::LocalWallet;
use ethers::types::{Address, Bytes};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

/// Length of a secp256k1 secret key
const KEY_LENGTH: usize = 32;

/// Raw private key bytes of the caller
#[derive(Clone, Deserialize)]
#[serde(transparent)]
pub struct PrivateKey(Bytes);

impl PrivateKey {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }

    /// Build the signing wallet for this key
    pub(crate) fn wallet(&self) -> PipelineResult<LocalWallet> {
        // from_bytes panics on anything but a 32 byte slice
        if self.0.len() != KEY_LENGTH {
            let reason = format!("expected {} bytes, got {}", KEY_LENGTH, self.0.len());
            return Err(UsageError::InvalidKey(reason).into());
        }
        LocalWallet::from_bytes(&self.0)
            .map_err(|e| UsageError::InvalidKey(e.to_string()).into())
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(..)")
    }
}

/// Options for calling a method on a deployed contract
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvokeRequest {
    pub from: String,
    pub from_key: PrivateKey,
    #[serde(default)]
    pub args: Vec<Value>,
    pub contract_address: String,
    #[serde(rename = "contractABI")]
    pub contract_abi: Option<AbiDescriptor>,
    pub contract_source: Option<String>,
    pub contract_name: Option<String>,
    pub method_name: String,
    pub max_gas: u64,
}

impl InvokeRequest {
    pub(crate) fn interface(&self) -> PipelineResult<ContractInterface> {
        ContractInterface::from_options(
            self.contract_abi.clone(),
            self.contract_source.clone(),
            self.contract_name.clone(),
        )
    }
}

/// Options for deploying a new contract
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployRequest {
    pub from: String,
    pub from_key: PrivateKey,
    #[serde(default)]
    pub args: Vec<Value>,
    #[serde(rename = "contractJSON")]
    pub contract_json: Option<ContractArtifact>,
    pub contract_source: Option<String>,
    pub contract_name: Option<String>,
    pub max_gas: u64,
}

impl DeployRequest {
    pub(crate) fn deployment(&self) -> PipelineResult<DeploymentInput> {
        DeploymentInput::from_options(
            self.contract_json.clone(),
            self.contract_source.clone(),
            self.contract_name.clone(),
        )
    }
}

/// Parse an address field from a request
pub(crate) fn parse_address(field: &'static str, value: &str) -> PipelineResult<Address> {
    value.trim().parse::<Address>().map_err(|_| {
        UsageError::InvalidAddress {
            field,
            value: value.to_string(),
        }
        .into()
    })
}
