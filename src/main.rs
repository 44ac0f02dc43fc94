//! Command-line shell over the wallet core.
//!
//! Holds no state between runs: every invocation loads the account from the
//! environment (or creates one), acts, and exits.

use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use zeroize::Zeroizing;

use transfer_wallet::config::load_or_default;
use transfer_wallet::observability::{logging, metrics};
use transfer_wallet::{KeyManager, RpcNetworkClient, Session, WalletError};

/// Environment variable holding the hex private key for `address` and `send`.
const PRIVATE_KEY_ENV_VAR: &str = "TRANSFER_WALLET_PRIVATE_KEY";

#[derive(Parser)]
#[command(name = "transfer-wallet")]
#[command(about = "Create accounts and send value transfers", long_about = None)]
struct Cli {
    /// Path to a TOML config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new account
    Create {
        /// Print the private key to stdout
        #[arg(long)]
        reveal_key: bool,
    },
    /// Show the address for the key in TRANSFER_WALLET_PRIVATE_KEY
    Address,
    /// Send ether from the key in TRANSFER_WALLET_PRIVATE_KEY
    Send {
        /// Recipient address
        #[arg(long)]
        to: String,
        /// Amount in ether, e.g. 0.1
        #[arg(long)]
        amount: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_or_default(cli.config.as_deref())?;

    logging::init_logging(&config.observability)?;
    metrics::describe_metrics();

    tracing::info!(
        rpc_url = %config.network.rpc_url,
        chain_id = config.network.chain_id,
        "Configuration loaded"
    );

    match cli.command {
        Commands::Create { reveal_key } => {
            let account = KeyManager::new().create()?;
            let mut out = json!({ "address": account.address_string() });
            if reveal_key {
                let key = account.export_private_key();
                out["private_key"] = json!(key.as_str());
            }
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Commands::Address => {
            let key = read_private_key()?;
            let account = KeyManager::new().import(&key)?;
            println!("{}", account.address_string());
        }
        Commands::Send { to, amount } => {
            let key = read_private_key()?;
            let client = RpcNetworkClient::new(config.network.clone())?;
            if let Err(e) = client.verify_chain_id().await {
                tracing::warn!(error = %e, "Chain verification failed");
            }

            let mut session = Session::new(client);
            session.import_account(&key)?;
            drop(key);

            let result = session.send(&to, &amount).await;
            let history = serde_json::to_value(session.history())?;
            session.logout();

            match result {
                Ok(receipt) => {
                    let out = json!({ "receipt": receipt, "history": history });
                    println!("{}", serde_json::to_string_pretty(&out)?);
                }
                Err(e) => {
                    eprintln!("{}", failure_message(&e));
                    println!("{}", serde_json::to_string_pretty(&json!({ "history": history }))?);
                    return Err(e.into());
                }
            }
        }
    }

    Ok(())
}

fn read_private_key() -> Result<Zeroizing<String>, String> {
    std::env::var(PRIVATE_KEY_ENV_VAR)
        .map(Zeroizing::new)
        .map_err(|_| format!("Environment variable {} not set", PRIVATE_KEY_ENV_VAR))
}

fn failure_message(e: &WalletError) -> String {
    if e.is_transient() {
        format!(
            "Network failure: {}. The transfer can be rebuilt and resent, \
             but the earlier transaction may still be included.",
            e
        )
    } else {
        format!("Transfer failed: {}", e)
    }
}
