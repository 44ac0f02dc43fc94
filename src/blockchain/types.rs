//! Chain-specific types and error definitions.

use thiserror::Error;

pub use crate::config::schema::NetworkConfig;

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub u64);

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

/// Errors that can occur while managing keys or moving a transfer through
/// the build and submit pipeline.
///
/// Messages never carry key material.
#[derive(Debug, Error)]
pub enum WalletError {
    /// The operating system random source could not be read.
    #[error("Entropy unavailable: {0}")]
    Entropy(String),

    /// Malformed or out-of-range private key.
    #[error("Invalid private key: {0}")]
    InvalidKey(String),

    /// Recipient is not a well-formed address.
    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),

    /// Amount is negative, unparsable, or too precise.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Gas price, gas estimate, nonce, or chain ID could not be obtained.
    #[error("Fee quote unavailable: {0}")]
    QuoteUnavailable(String),

    /// Connection failure or timeout talking to the RPC endpoint.
    #[error("Network error: {0}")]
    Network(String),

    /// The node refused the transaction.
    #[error("Transaction rejected ({code}): {reason}")]
    Rejected { code: i64, reason: String },

    /// Signing failed for otherwise valid inputs.
    #[error("Signing failed: {0}")]
    FatalSigning(String),

    /// Chain configuration mismatch.
    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },
}

impl WalletError {
    /// True when the caller may rebuild and resubmit the whole transfer.
    pub fn is_transient(&self) -> bool {
        matches!(self, WalletError::Network(_))
    }

    /// True when the network gave a final answer for this transaction.
    pub fn is_terminal_rejection(&self) -> bool {
        matches!(self, WalletError::Rejected { .. })
    }
}

/// Result type for wallet operations.
pub type WalletResult<T> = Result<T, WalletError>;
