//! Solidity compilation through solc

use crate::error::CompilationError;

use ethers::abi::Abi;
use ethers::solc::artifacts::{CompactContract, CompilerInput, Source, Sources};
use ethers::solc::Solc;
use ethers::types::Bytes;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::debug;

/// Virtual file name the source is compiled under
const SOURCE_FILE: &str = "Contract.sol";

/// ABI and creation bytecode of one compiled contract
#[derive(Debug, Clone)]
pub struct CompiledContract {
    pub abi: Abi,
    pub bytecode: Bytes,
}

/// Compiled contracts keyed by contract name
pub type CompiledContracts = BTreeMap<String, CompiledContract>;

/// Compiles contract source text
#[cfg_attr(test, mockall::automock)]
pub trait Compiler: Send + Sync {
    fn compile(&self, source: &str) -> Result<CompiledContracts, CompilationError>;
}

/// Compiler backed by a local solc binary
///
/// Uses `SOLC_PATH` when set, `solc` from `PATH` otherwise.
#[derive(Debug, Clone, Default)]
pub struct SolcCompiler {
    solc: Solc,
}

impl SolcCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific solc installation
    pub fn with_solc(solc: Solc) -> Self {
        Self { solc }
    }
}

impl Compiler for SolcCompiler {
    fn compile(&self, source: &str) -> Result<CompiledContracts, CompilationError> {
        let mut sources = Sources::new();
        sources.insert(PathBuf::from(SOURCE_FILE), Source::new(source));

        let mut compiled = CompiledContracts::new();
        for input in CompilerInput::with_sources(sources) {
            let output = self.solc.compile(&input)?;

            if output.has_error() {
                let diagnostics = output
                    .errors
                    .iter()
                    .filter(|e| e.severity.is_error())
                    .map(|e| e.to_string())
                    .collect();
                return Err(CompilationError::Diagnostics(diagnostics));
            }

            for (_file, contracts) in output.contracts {
                for (name, contract) in contracts {
                    let compact = CompactContract::from(contract);
                    let abi = compact
                        .abi
                        .ok_or_else(|| CompilationError::MissingAbi { name: name.clone() })?;
                    let bytecode = compact
                        .bin
                        .and_then(|bin| bin.into_bytes())
                        .ok_or_else(|| CompilationError::MissingBytecode { name: name.clone() })?;

                    debug!("Compiled contract {} ({} bytes)", name, bytecode.len());
                    compiled.insert(name, CompiledContract { abi, bytecode });
                }
            }
        }

        Ok(compiled)
    }
}
