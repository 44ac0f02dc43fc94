//! Append-only log of completed transfers.

use alloy::primitives::{Address, TxHash};
use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::blockchain::amount::Amount;
use crate::blockchain::submitter::{Receipt, ReceiptStatus};

/// Outcome recorded for a transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntryStatus {
    /// Included and executed.
    Success,
    /// Included but reverted.
    Failed,
    /// Refused by the node; never included.
    Rejected { code: i64, reason: String },
}

/// One completed submission attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionLogEntry {
    pub id: Uuid,
    pub from: Address,
    pub to: Address,
    pub amount: Amount,
    pub status: EntryStatus,
    pub transaction_hash: Option<TxHash>,
    /// Seconds since the Unix epoch.
    pub timestamp: u64,
}

impl TransactionLogEntry {
    pub fn from_receipt(receipt: &Receipt) -> Self {
        let status = match receipt.status {
            ReceiptStatus::Success => EntryStatus::Success,
            ReceiptStatus::Failure => EntryStatus::Failed,
        };
        Self {
            id: Uuid::new_v4(),
            from: receipt.from_address,
            to: receipt.to_address,
            amount: receipt.amount,
            status,
            transaction_hash: Some(receipt.transaction_hash),
            timestamp: now_secs(),
        }
    }

    pub fn rejected(from: Address, to: Address, amount: Amount, code: i64, reason: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            from,
            to,
            amount,
            status: EntryStatus::Rejected { code, reason },
            transaction_hash: None,
            timestamp: now_secs(),
        }
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Chronological, append-only sequence of log entries.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct TransactionLog {
    entries: Vec<TransactionLogEntry>,
}

impl TransactionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, entry: TransactionLogEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[TransactionLogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&TransactionLogEntry> {
        self.entries.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TransactionLogEntry> {
        self.entries.iter()
    }
}
