//! contract-tx - call or deploy a contract from a JSON request file

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::info;

use contract_tx::config::{Settings, WalletConfig};
use contract_tx::{DeployRequest, EthersClient, InvokeRequest, TransactionPipeline};

#[derive(Parser)]
#[command(name = "contract-tx", version, about)]
struct Cli {
    /// Configuration file (defaults to $CONTRACT_TX_CONFIG or config/default.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Call a method on a deployed contract
    Invoke {
        /// JSON file with the call options
        request: PathBuf,
    },
    /// Deploy a new contract
    Deploy {
        /// JSON file with the deployment options
        request: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };

    init_logging(&settings.logging.filter);

    info!("Starting contract-tx v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Using RPC {} (chain {})",
        settings.network.rpc_url, settings.network.chain_id
    );

    let client = EthersClient::from_config(&settings.network)
        .with_context(|| format!("Invalid RPC url: {}", settings.network.rpc_url))?;
    let pipeline = TransactionPipeline::new(client, settings.network.chain_id);

    let tx_hash = match cli.command {
        Command::Invoke { request } => {
            let request: InvokeRequest = read_request(&request, &settings.wallet)?;
            pipeline.invoke_method(request).await?
        }
        Command::Deploy { request } => {
            let request: DeployRequest = read_request(&request, &settings.wallet)?;
            pipeline.deploy_contract(request).await?
        }
    };

    println!("{:?}", tx_hash);
    Ok(())
}

/// Read a request file, filling `fromKey` from the wallet env var when absent
fn read_request<T: DeserializeOwned>(path: &Path, wallet: &WalletConfig) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read request file: {:?}", path))?;
    let mut value: Value = serde_json::from_str(&text)
        .with_context(|| format!("Request file {:?} is not valid JSON", path))?;

    if let Value::Object(options) = &mut value {
        if !options.contains_key("fromKey") {
            let key = std::env::var(&wallet.private_key_env).with_context(|| {
                format!(
                    "Request has no fromKey and {} is not set",
                    wallet.private_key_env
                )
            })?;
            let key = key.trim();
            let key = if key.starts_with("0x") {
                key.to_string()
            } else {
                format!("0x{}", key)
            };
            options.insert("fromKey".to_string(), Value::String(key));
        }
    }

    serde_json::from_value(value).with_context(|| format!("Invalid request in {:?}", path))
}

fn init_logging(default_filter: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // Logs go to stderr so stdout carries only the transaction hash
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .init();
}
