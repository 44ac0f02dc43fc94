//! Broadcasting signed transactions and normalizing the outcome.
//!
//! Each call submits exactly once. A `Network` error may be retried by the
//! caller, but only by rebuilding through `TransactionBuilder`; a `Rejected`
//! error is final for that transaction.

use alloy::primitives::{Address, TxHash};
use serde::Serialize;
use std::time::Instant;

use crate::blockchain::amount::Amount;
use crate::blockchain::network::NetworkClient;
use crate::blockchain::transaction::SignedTransaction;
use crate::blockchain::types::{WalletError, WalletResult};
use crate::observability::metrics;

/// Execution result of an included transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiptStatus {
    Success,
    Failure,
}

/// Confirmation record for a transaction the network included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Receipt {
    pub transaction_hash: TxHash,
    pub status: ReceiptStatus,
    pub from_address: Address,
    pub to_address: Address,
    pub amount: Amount,
    pub block_number: Option<u64>,
    pub gas_used: u64,
}

impl Receipt {
    pub fn is_success(&self) -> bool {
        self.status == ReceiptStatus::Success
    }
}

/// Sends signed transactions to a network collaborator.
pub struct TransactionSubmitter<'a, N: ?Sized> {
    network: &'a N,
}

impl<'a, N: NetworkClient + ?Sized> TransactionSubmitter<'a, N> {
    pub fn new(network: &'a N) -> Self {
        Self { network }
    }

    /// Submit `signed` and wait for a terminal result.
    pub async fn submit(&self, signed: &SignedTransaction) -> WalletResult<Receipt> {
        let tx = signed.transaction();
        let started = Instant::now();

        tracing::info!(tx_hash = %signed.hash(), from = %tx.from, to = %tx.to, "Submitting transaction");

        let result = self.network.send_raw_transaction(signed.raw()).await;
        metrics::record_submission_duration(started.elapsed());

        let report = match result {
            Ok(report) => report,
            Err(e @ WalletError::Rejected { .. }) => {
                tracing::warn!(tx_hash = %signed.hash(), error = %e, "Transaction rejected");
                metrics::record_submission("rejected");
                return Err(e);
            }
            Err(WalletError::Network(reason)) => {
                tracing::warn!(tx_hash = %signed.hash(), error = %reason, "Submission failed");
                metrics::record_submission("network_error");
                return Err(WalletError::Network(reason));
            }
            Err(other) => {
                tracing::warn!(tx_hash = %signed.hash(), error = %other, "Submission failed");
                metrics::record_submission("error");
                return Err(other);
            }
        };

        if report.transaction_hash != signed.hash() {
            tracing::warn!(
                expected = %signed.hash(),
                reported = %report.transaction_hash,
                "Network reported a different transaction hash"
            );
        }

        let status = if report.success {
            ReceiptStatus::Success
        } else {
            ReceiptStatus::Failure
        };

        let receipt = Receipt {
            transaction_hash: signed.hash(),
            status,
            from_address: tx.from,
            to_address: tx.to,
            amount: tx.value,
            block_number: report.block_number,
            gas_used: report.gas_used,
        };

        metrics::record_submission(if receipt.is_success() { "success" } else { "failure" });
        tracing::info!(
            tx_hash = %receipt.transaction_hash,
            status = ?receipt.status,
            block_number = ?receipt.block_number,
            gas_used = receipt.gas_used,
            "Transaction included"
        );

        Ok(receipt)
    }
}
