//! Contract module - resolves ABI and bytecode from the supported input shapes
//!
//! A request either carries a precompiled interface (ABI, or ABI plus bytecode
//! for deployment) or Solidity source plus the name of the contract to use.
//! Both shapes collapse into a [`ResolvedContract`] before a draft is built.

pub mod compiler;
pub mod proxy;

pub use compiler::{CompiledContract, CompiledContracts, Compiler, SolcCompiler};
pub use proxy::ContractProxy;

use crate::error::{CompilationError, PipelineResult, UsageError};

use ethers::abi::Abi;
use ethers::types::Bytes;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

/// An ABI supplied either as a parsed structure or as JSON
///
/// JSON input goes through [`normalize_abi`] so that hand-written and older
/// ABIs without `outputs` or `stateMutability` still parse.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AbiDescriptor {
    #[serde(skip_deserializing)]
    Parsed(Abi),
    Json(String),
    Raw(Value),
}

impl AbiDescriptor {
    /// Parse the descriptor if it arrived as JSON
    pub fn parse(self) -> Result<Abi, UsageError> {
        match self {
            AbiDescriptor::Parsed(abi) => Ok(abi),
            AbiDescriptor::Json(json) => {
                let value = serde_json::from_str(&json).map_err(UsageError::InvalidAbi)?;
                normalize_abi(value)
            }
            AbiDescriptor::Raw(value) => normalize_abi(value),
        }
    }
}

/// Fill in the fields web3 treats as optional, then parse the ABI
///
/// Entries without `type` are functions. Functions, constructors and events
/// get empty `inputs`, functions get empty `outputs`, and `stateMutability`
/// is derived from the legacy `constant`/`payable` flags.
pub fn normalize_abi(mut value: Value) -> Result<Abi, UsageError> {
    if let Value::Array(entries) = &mut value {
        for entry in entries.iter_mut() {
            let Value::Object(entry) = entry else {
                continue;
            };

            let kind = entry
                .entry("type")
                .or_insert_with(|| Value::String("function".to_string()))
                .as_str()
                .unwrap_or_default()
                .to_string();

            if matches!(kind.as_str(), "function" | "constructor" | "event") {
                entry
                    .entry("inputs")
                    .or_insert_with(|| Value::Array(vec![]));
            }

            if matches!(kind.as_str(), "function" | "constructor")
                && !entry.contains_key("stateMutability")
            {
                let flag = |name: &str| entry.get(name).and_then(Value::as_bool) == Some(true);
                let mutability = if flag("constant") {
                    "view"
                } else if flag("payable") {
                    "payable"
                } else {
                    "nonpayable"
                };
                entry.insert("stateMutability".to_string(), mutability.into());
            }

            if kind == "function" {
                entry
                    .entry("outputs")
                    .or_insert_with(|| Value::Array(vec![]));
            }
        }
    }

    serde_json::from_value(value).map_err(UsageError::InvalidAbi)
}

impl From<Abi> for AbiDescriptor {
    fn from(abi: Abi) -> Self {
        AbiDescriptor::Parsed(abi)
    }
}

/// Bytecode as plain hex or as a `{ "object": "0x.." }` artifact entry
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum BytecodeField {
    Hex(String),
    Object { object: String },
}

impl BytecodeField {
    fn decode(&self) -> Result<Bytes, UsageError> {
        let hex_str = match self {
            BytecodeField::Hex(s) => s,
            BytecodeField::Object { object } => object,
        };
        let hex_str = hex_str.trim();
        let hex_str = hex_str.strip_prefix("0x").unwrap_or(hex_str);
        hex::decode(hex_str)
            .map(Bytes::from)
            .map_err(|e| UsageError::InvalidArtifact(format!("bytecode is not valid hex: {}", e)))
    }
}

/// A compiled contract artifact holding `abi` and `bytecode`
///
/// Accepts the artifact as a JSON object or as a JSON string, and the `abi`
/// entry itself as an array or as a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ContractArtifact {
    Parsed {
        abi: AbiDescriptor,
        bytecode: BytecodeField,
    },
    Json(String),
}

impl ContractArtifact {
    pub fn new(abi: Abi, bytecode: Bytes) -> Self {
        ContractArtifact::Parsed {
            abi: AbiDescriptor::Parsed(abi),
            bytecode: BytecodeField::Hex(bytecode.to_string()),
        }
    }

    fn parse(self) -> Result<ResolvedContract, UsageError> {
        match self {
            ContractArtifact::Parsed { abi, bytecode } => Ok(ResolvedContract {
                abi: abi.parse()?,
                bytecode: Some(bytecode.decode()?),
            }),
            ContractArtifact::Json(json) => {
                let inner: ContractArtifact = serde_json::from_str(&json)
                    .map_err(|e| UsageError::InvalidArtifact(e.to_string()))?;
                match inner {
                    ContractArtifact::Json(_) => Err(UsageError::InvalidArtifact(
                        "expected an object with abi and bytecode".to_string(),
                    )),
                    parsed => parsed.parse(),
                }
            }
        }
    }
}

/// Interface of a contract that is already deployed
#[derive(Debug, Clone)]
pub enum ContractInterface {
    Abi(AbiDescriptor),
    Source { source: String, name: String },
}

impl ContractInterface {
    /// Pick the input shape from optional request fields
    pub fn from_options(
        abi: Option<AbiDescriptor>,
        source: Option<String>,
        name: Option<String>,
    ) -> PipelineResult<Self> {
        if let Some(abi) = abi {
            return Ok(ContractInterface::Abi(abi));
        }
        let (source, name) = source_pair(source, name)?;
        Ok(ContractInterface::Source { source, name })
    }

    /// Resolve the ABI, compiling the source if needed
    pub fn resolve<C: Compiler + ?Sized>(self, compiler: &C) -> PipelineResult<Abi> {
        match self {
            ContractInterface::Abi(descriptor) => Ok(descriptor.parse()?),
            ContractInterface::Source { source, name } => {
                Ok(compile_named(compiler, &source, &name)?.abi)
            }
        }
    }
}

/// Contract to be deployed
#[derive(Debug, Clone)]
pub enum DeploymentInput {
    Artifact(ContractArtifact),
    Source { source: String, name: String },
}

impl DeploymentInput {
    /// Pick the input shape from optional request fields
    pub fn from_options(
        artifact: Option<ContractArtifact>,
        source: Option<String>,
        name: Option<String>,
    ) -> PipelineResult<Self> {
        if let Some(artifact) = artifact {
            return Ok(DeploymentInput::Artifact(artifact));
        }
        let (source, name) = source_pair(source, name)?;
        Ok(DeploymentInput::Source { source, name })
    }

    /// Resolve ABI and bytecode, compiling the source if needed
    pub fn resolve<C: Compiler + ?Sized>(self, compiler: &C) -> PipelineResult<ResolvedContract> {
        let resolved = match self {
            DeploymentInput::Artifact(artifact) => artifact.parse()?,
            DeploymentInput::Source { source, name } => {
                let compiled = compile_named(compiler, &source, &name)?;
                ResolvedContract {
                    abi: compiled.abi,
                    bytecode: Some(compiled.bytecode),
                }
            }
        };

        match &resolved.bytecode {
            Some(code) if !code.is_empty() => Ok(resolved),
            _ => Err(UsageError::MissingBytecode.into()),
        }
    }
}

/// Canonical contract description used to build drafts
#[derive(Debug, Clone)]
pub struct ResolvedContract {
    pub abi: Abi,
    pub bytecode: Option<Bytes>,
}

fn source_pair(
    source: Option<String>,
    name: Option<String>,
) -> Result<(String, String), UsageError> {
    let source = source.filter(|s| !s.trim().is_empty());
    let name = name.filter(|s| !s.trim().is_empty());

    match (source, name) {
        (Some(source), Some(name)) => Ok((source, name)),
        (Some(_), None) => Err(UsageError::MissingContractName),
        _ => Err(UsageError::MissingContract),
    }
}

fn compile_named<C: Compiler + ?Sized>(
    compiler: &C,
    source: &str,
    name: &str,
) -> Result<CompiledContract, CompilationError> {
    // solc's legacy output keys contracts as ":Name"
    let name = name.trim().trim_start_matches(':');
    let mut contracts = compiler.compile(source)?;
    debug!(
        "Compiled {} contracts, selecting {}",
        contracts.len(),
        name
    );

    contracts
        .remove(name)
        .ok_or_else(|| CompilationError::ContractNotFound {
            name: name.to_string(),
        })
}
