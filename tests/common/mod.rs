//! Shared utilities for integration testing.

#![allow(dead_code)]

use alloy::primitives::{keccak256, Address, Bytes};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use transfer_wallet::blockchain::{GasEstimateRequest, InclusionReport, NetworkClient};
use transfer_wallet::{WalletError, WalletResult};

/// Anvil's first three dev keys.
pub const ANVIL_KEYS: [&str; 3] = [
    "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
    "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d",
    "5de4111afa1a4b94908f83103eb1f1706367c2e68ca870fc3fb9a804cdab365a",
];

/// A well-formed recipient (Anvil account #1).
pub const RECEIVER: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";

/// What the mock does when a transaction is submitted.
#[derive(Debug, Clone)]
pub enum SubmitBehavior {
    /// Include the transaction; `success = false` means it reverted.
    Include { success: bool },
    /// Hang for the given time, then report a connection timeout.
    Timeout(Duration),
    /// Refuse with a JSON-RPC error.
    Reject { code: i64, reason: String },
}

/// Scriptable in-memory network.
pub struct MockNetwork {
    pub gas_price: u128,
    pub gas: u64,
    pub chain_id: u64,
    nonce: AtomicU64,
    quote_available: bool,
    behavior: Mutex<SubmitBehavior>,
    submitted: Mutex<Vec<Bytes>>,
    estimates: Mutex<Vec<GasEstimateRequest>>,
    quote_calls: AtomicU32,
}

impl MockNetwork {
    pub fn new() -> Self {
        Self {
            gas_price: 20_000_000_000,
            gas: 21_000,
            chain_id: 31337,
            nonce: AtomicU64::new(0),
            quote_available: true,
            behavior: Mutex::new(SubmitBehavior::Include { success: true }),
            submitted: Mutex::new(Vec::new()),
            estimates: Mutex::new(Vec::new()),
            quote_calls: AtomicU32::new(0),
        }
    }

    pub fn without_quotes() -> Self {
        Self {
            quote_available: false,
            ..Self::new()
        }
    }

    pub fn set_behavior(&self, behavior: SubmitBehavior) {
        *self.behavior.lock().unwrap() = behavior;
    }

    pub fn submitted(&self) -> Vec<Bytes> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn estimates(&self) -> Vec<GasEstimateRequest> {
        self.estimates.lock().unwrap().clone()
    }

    pub fn quote_calls(&self) -> u32 {
        self.quote_calls.load(Ordering::SeqCst)
    }

    fn quote<T>(&self, value: T) -> WalletResult<T> {
        self.quote_calls.fetch_add(1, Ordering::SeqCst);
        if self.quote_available {
            Ok(value)
        } else {
            Err(WalletError::Network("connection refused".to_string()))
        }
    }
}

#[async_trait]
impl NetworkClient for MockNetwork {
    async fn gas_price(&self) -> WalletResult<u128> {
        self.quote(self.gas_price)
    }

    async fn estimate_gas(&self, request: &GasEstimateRequest) -> WalletResult<u64> {
        self.estimates.lock().unwrap().push(request.clone());
        self.quote(self.gas)
    }

    async fn transaction_count(&self, _address: Address) -> WalletResult<u64> {
        self.quote(self.nonce.load(Ordering::SeqCst))
    }

    async fn chain_id(&self) -> WalletResult<u64> {
        self.quote(self.chain_id)
    }

    async fn send_raw_transaction(&self, raw: &Bytes) -> WalletResult<InclusionReport> {
        self.submitted.lock().unwrap().push(raw.clone());
        let behavior = self.behavior.lock().unwrap().clone();

        match behavior {
            SubmitBehavior::Include { success } => {
                self.nonce.fetch_add(1, Ordering::SeqCst);
                Ok(InclusionReport {
                    transaction_hash: keccak256(raw),
                    success,
                    block_number: Some(1),
                    gas_used: self.gas,
                })
            }
            SubmitBehavior::Timeout(delay) => {
                tokio::time::sleep(delay).await;
                Err(WalletError::Network("connection timed out".to_string()))
            }
            SubmitBehavior::Reject { code, reason } => Err(WalletError::Rejected { code, reason }),
        }
    }
}
