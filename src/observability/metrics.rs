//! Metrics collection.
//!
//! # Metrics
//! - `wallet_accounts_total` (counter): accounts by source (created, imported)
//! - `wallet_transactions_built_total` (counter): signed transactions produced
//! - `wallet_transactions_submitted_total` (counter): submissions by outcome
//! - `wallet_submission_duration_seconds` (histogram): broadcast to terminal result

use std::time::Duration;

pub const ACCOUNTS_TOTAL: &str = "wallet_accounts_total";
pub const TRANSACTIONS_BUILT_TOTAL: &str = "wallet_transactions_built_total";
pub const TRANSACTIONS_SUBMITTED_TOTAL: &str = "wallet_transactions_submitted_total";
pub const SUBMISSION_DURATION_SECONDS: &str = "wallet_submission_duration_seconds";

/// Register metric descriptions with the installed recorder.
pub fn describe_metrics() {
    ::metrics::describe_counter!(ACCOUNTS_TOTAL, "Accounts created or imported");
    ::metrics::describe_counter!(TRANSACTIONS_BUILT_TOTAL, "Transactions assembled and signed");
    ::metrics::describe_counter!(TRANSACTIONS_SUBMITTED_TOTAL, "Transaction submissions by outcome");
    ::metrics::describe_histogram!(
        SUBMISSION_DURATION_SECONDS,
        ::metrics::Unit::Seconds,
        "Time from broadcast to a terminal result"
    );
}

pub fn record_account(source: &'static str) {
    ::metrics::counter!(ACCOUNTS_TOTAL, "source" => source).increment(1);
}

pub fn record_built() {
    ::metrics::counter!(TRANSACTIONS_BUILT_TOTAL).increment(1);
}

/// `outcome` is one of success, failure, rejected, network_error, error.
pub fn record_submission(outcome: &'static str) {
    ::metrics::counter!(TRANSACTIONS_SUBMITTED_TOTAL, "outcome" => outcome).increment(1);
}

pub fn record_submission_duration(elapsed: Duration) {
    ::metrics::histogram!(SUBMISSION_DURATION_SECONDS).record(elapsed.as_secs_f64());
}
