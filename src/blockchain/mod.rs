//! Account keys and the transfer pipeline.
//!
//! # Data Flow
//! ```text
//! KeyManager::create / import
//!     → wallet.rs (Account: key + derived address)
//!     → transaction.rs (validate, quote via NetworkClient, sign)
//!     → submitter.rs (broadcast, wait for inclusion, classify)
//!     → Receipt | WalletError
//! ```
//!
//! # Security Constraints
//! - Private keys exist only in memory inside `Account`
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts
//! - No internal retries: the caller decides, and must rebuild to retry

pub mod amount;
pub mod client;
pub mod network;
pub mod submitter;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use amount::Amount;
pub use client::RpcNetworkClient;
pub use network::{GasEstimateRequest, InclusionReport, NetworkClient};
pub use submitter::{Receipt, ReceiptStatus, TransactionSubmitter};
pub use transaction::{FeeQuote, SignedTransaction, TransactionBuilder, UnsignedTransaction};
pub use types::{ChainId, NetworkConfig, WalletError, WalletResult};
pub use wallet::{Account, KeyManager};
