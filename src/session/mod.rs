//! User session: the glue a presentation layer drives.
//!
//! # Data Flow
//! ```text
//! create_account / import_account → Account (replaces and clears any previous one)
//! send(to, amount)
//!     → TransactionBuilder::build
//!     → TransactionSubmitter::submit
//!     → Receipt or Rejected → history.rs (one entry)
//!     → any other error    → nothing recorded
//! logout → Account dropped, key zeroized
//! ```
//!
//! `send` takes `&mut self`, so a session can have at most one transfer in
//! flight and nonces cannot collide.

pub mod history;

use crate::blockchain::network::NetworkClient;
use crate::blockchain::submitter::{Receipt, TransactionSubmitter};
use crate::blockchain::transaction::TransactionBuilder;
use crate::blockchain::types::{WalletError, WalletResult};
use crate::blockchain::wallet::{Account, KeyManager};

pub use history::{EntryStatus, TransactionLog, TransactionLogEntry};

/// In-memory session holding at most one account and its transfer log.
pub struct Session<N> {
    network: N,
    keys: KeyManager,
    account: Option<Account>,
    history: TransactionLog,
}

impl<N: NetworkClient> Session<N> {
    pub fn new(network: N) -> Self {
        Self {
            network,
            keys: KeyManager::new(),
            account: None,
            history: TransactionLog::new(),
        }
    }

    /// Generate a new account and make it current.
    pub fn create_account(&mut self) -> WalletResult<&Account> {
        let account = self.keys.create()?;
        Ok(self.replace_account(account))
    }

    /// Import an account from a hex private key and make it current.
    ///
    /// On failure the current account, if any, is kept.
    pub fn import_account(&mut self, private_key_hex: &str) -> WalletResult<&Account> {
        let account = self.keys.import(private_key_hex)?;
        Ok(self.replace_account(account))
    }

    fn replace_account(&mut self, account: Account) -> &Account {
        if let Some(previous) = self.account.take() {
            previous.clear();
        }
        self.account.insert(account)
    }

    pub fn account(&self) -> Option<&Account> {
        self.account.as_ref()
    }

    /// Drop the current account and its key material.
    pub fn logout(&mut self) {
        if let Some(account) = self.account.take() {
            tracing::info!(address = %account.address(), "Logged out");
            account.clear();
        }
    }

    /// Build, sign, and submit a transfer from the current account.
    ///
    /// A receipt (success or revert) or a node rejection adds one entry to
    /// the history; every other failure leaves the history untouched.
    pub async fn send(&mut self, to: &str, amount: &str) -> WalletResult<Receipt> {
        let account = self
            .account
            .as_ref()
            .ok_or_else(|| WalletError::InvalidKey("no account loaded".to_string()))?;

        let signed = TransactionBuilder::new(&self.network)
            .build(account, to, amount)
            .await?;

        match TransactionSubmitter::new(&self.network).submit(&signed).await {
            Ok(receipt) => {
                self.history.append(TransactionLogEntry::from_receipt(&receipt));
                Ok(receipt)
            }
            Err(WalletError::Rejected { code, reason }) => {
                let tx = signed.transaction();
                self.history.append(TransactionLogEntry::rejected(
                    tx.from,
                    tx.to,
                    tx.value,
                    code,
                    reason.clone(),
                ));
                Err(WalletError::Rejected { code, reason })
            }
            Err(e) => Err(e),
        }
    }

    /// Completed transfers in the order they finished.
    pub fn history(&self) -> &TransactionLog {
        &self.history
    }

    pub fn network(&self) -> &N {
        &self.network
    }
}
