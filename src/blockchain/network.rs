//! The network collaborator consumed by the transaction pipeline.
//!
//! The builder and submitter never reach for a global client; a
//! `NetworkClient` is passed in, so tests can substitute an in-memory one.

use alloy::primitives::{Address, Bytes, TxHash, U256};
use async_trait::async_trait;

use crate::blockchain::types::WalletResult;

/// Parameters for a gas estimate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GasEstimateRequest {
    pub from: Address,
    pub to: Address,
    pub value: U256,
}

/// What the network reports once a submitted transaction is mined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InclusionReport {
    pub transaction_hash: TxHash,
    /// `true` if execution succeeded, `false` if it reverted.
    pub success: bool,
    pub block_number: Option<u64>,
    pub gas_used: u64,
}

/// Blockchain RPC endpoint as seen by the core.
///
/// Implementations enforce their own timeouts. `send_raw_transaction` must
/// return `WalletError::Network` for transport failures and
/// `WalletError::Rejected` when the node refuses the transaction.
#[async_trait]
pub trait NetworkClient: Send + Sync {
    /// Current gas price in wei.
    async fn gas_price(&self) -> WalletResult<u128>;

    /// Gas needed for the described transfer.
    async fn estimate_gas(&self, request: &GasEstimateRequest) -> WalletResult<u64>;

    /// Next nonce for `address`, counting pending transactions.
    async fn transaction_count(&self, address: Address) -> WalletResult<u64>;

    /// Chain ID used for replay protection.
    async fn chain_id(&self) -> WalletResult<u64>;

    /// Broadcast a signed payload and wait until it is included.
    async fn send_raw_transaction(&self, raw: &Bytes) -> WalletResult<InclusionReport>;
}
