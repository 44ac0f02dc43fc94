//! Transfer Wallet Library
//!
//! Create or import an Ethereum account, then build, sign, and submit value
//! transfers through an injected network client.

pub mod blockchain;
pub mod config;
pub mod observability;
pub mod session;

pub use blockchain::{
    Account, Amount, KeyManager, NetworkClient, Receipt, ReceiptStatus, RpcNetworkClient,
    SignedTransaction, TransactionBuilder, TransactionSubmitter, WalletError, WalletResult,
};
pub use config::WalletConfig;
pub use session::{Session, TransactionLog, TransactionLogEntry};
