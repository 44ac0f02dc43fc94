//! Blockchain RPC client with timeout and error handling.
//!
//! # Responsibilities
//! - Connect to JSON-RPC endpoints (primary + failovers)
//! - Provide fee quotes (gas price, gas estimate, nonce, chain ID)
//! - Broadcast signed transactions and wait for inclusion
//! - Classify failures as transient (`Network`) or terminal (`Rejected`)

use alloy::network::TransactionBuilder;
use alloy::primitives::{keccak256, Address, Bytes, TxHash};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::{TransactionReceipt, TransactionRequest};
use alloy::transports::RpcError;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, timeout};

use crate::blockchain::network::{GasEstimateRequest, InclusionReport, NetworkClient};
use crate::blockchain::types::{ChainId, NetworkConfig, WalletError, WalletResult};

/// Node messages meaning the payload is already in its mempool.
const ALREADY_KNOWN_MARKERS: [&str; 2] = ["already known", "known transaction"];

/// JSON-RPC network client with failover support.
#[derive(Clone)]
pub struct RpcNetworkClient {
    /// List of providers (primary + failovers).
    providers: Vec<Arc<dyn Provider + Send + Sync>>,
    /// Configuration.
    config: NetworkConfig,
    /// Per-request timeout.
    timeout_duration: Duration,
}

impl RpcNetworkClient {
    /// Create a new client.
    ///
    /// No request is made here; an unreachable endpoint surfaces on first use.
    pub fn new(config: NetworkConfig) -> WalletResult<Self> {
        let timeout_duration = Duration::from_secs(config.rpc_timeout_secs);
        let mut providers = Vec::new();

        let primary_url: url::Url = config.rpc_url.parse().map_err(|e| {
            WalletError::Network(format!("Invalid RPC URL '{}': {}", config.rpc_url, e))
        })?;
        providers.push(
            Arc::new(ProviderBuilder::new().connect_http(primary_url))
                as Arc<dyn Provider + Send + Sync>,
        );

        for url_str in &config.failover_urls {
            match url_str.parse::<url::Url>() {
                Ok(url) => providers.push(
                    Arc::new(ProviderBuilder::new().connect_http(url))
                        as Arc<dyn Provider + Send + Sync>,
                ),
                Err(_) => tracing::warn!(url = %url_str, "Ignoring invalid failover RPC URL"),
            }
        }

        tracing::info!(
            rpc_url = %config.rpc_url,
            failovers = providers.len() - 1,
            chain_id = config.chain_id,
            "Network client initialized"
        );

        Ok(Self {
            providers,
            config,
            timeout_duration,
        })
    }

    /// Verify the connected chain ID matches configuration.
    pub async fn verify_chain_id(&self) -> WalletResult<()> {
        let chain_id = self.get_chain_id().await?;
        if chain_id.0 != self.config.chain_id {
            return Err(WalletError::ChainMismatch {
                expected: self.config.chain_id,
                actual: chain_id.0,
            });
        }
        Ok(())
    }

    /// Get the chain ID from the RPC.
    pub async fn get_chain_id(&self) -> WalletResult<ChainId> {
        for (i, provider) in self.providers.iter().enumerate() {
            let fut = provider.get_chain_id();
            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(result)) => return Ok(ChainId(result)),
                Ok(Err(e)) => {
                    tracing::warn!(provider_idx = i, error = %e, "RPC error, trying next provider");
                }
                Err(_) => {
                    tracing::warn!(provider_idx = i, "RPC timeout, trying next provider");
                }
            }
        }
        Err(WalletError::Network("All RPC providers failed".to_string()))
    }

    /// Get the latest block number.
    pub async fn get_block_number(&self) -> WalletResult<u64> {
        for (i, provider) in self.providers.iter().enumerate() {
            let fut = provider.get_block_number();
            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => tracing::warn!(provider_idx = i, error = %e, "RPC error"),
                Err(_) => tracing::warn!(provider_idx = i, "RPC timeout"),
            }
        }
        Err(WalletError::Network("All providers failed to get block number".to_string()))
    }

    /// Get the pending transaction count (nonce) for an address.
    pub async fn get_transaction_count(&self, address: Address) -> WalletResult<u64> {
        for (i, provider) in self.providers.iter().enumerate() {
            let fut = provider.get_transaction_count(address).pending();
            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => tracing::warn!(provider_idx = i, error = %e, "RPC error"),
                Err(_) => tracing::warn!(provider_idx = i, "RPC timeout"),
            }
        }
        Err(WalletError::Network("All providers failed to get transaction count".to_string()))
    }

    /// Get a transaction receipt by hash.
    pub async fn get_transaction_receipt(
        &self,
        tx_hash: TxHash,
    ) -> WalletResult<Option<TransactionReceipt>> {
        for (i, provider) in self.providers.iter().enumerate() {
            let fut = provider.get_transaction_receipt(tx_hash);
            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => tracing::warn!(provider_idx = i, error = %e, "RPC error"),
                Err(_) => tracing::warn!(provider_idx = i, "RPC timeout"),
            }
        }
        Err(WalletError::Network("All providers failed to get receipt".to_string()))
    }

    /// Get current gas price in wei.
    pub async fn get_gas_price(&self) -> WalletResult<u128> {
        for (i, provider) in self.providers.iter().enumerate() {
            let fut = provider.get_gas_price();
            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => tracing::warn!(provider_idx = i, error = %e, "RPC error"),
                Err(_) => tracing::warn!(provider_idx = i, "RPC timeout"),
            }
        }
        Err(WalletError::Network("All providers failed to get gas price".to_string()))
    }

    /// Estimate gas for a plain value transfer.
    pub async fn get_gas_estimate(&self, request: &GasEstimateRequest) -> WalletResult<u64> {
        let tx = TransactionRequest::default()
            .with_from(request.from)
            .with_to(request.to)
            .with_value(request.value)
            .with_input(Bytes::new());

        for (i, provider) in self.providers.iter().enumerate() {
            let fut = provider.estimate_gas(tx.clone());
            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => tracing::warn!(provider_idx = i, error = %e, "RPC error"),
                Err(_) => tracing::warn!(provider_idx = i, "RPC timeout"),
            }
        }
        Err(WalletError::Network("All providers failed to estimate gas".to_string()))
    }

    /// Broadcast a raw transaction, returning its hash once a node accepts it.
    ///
    /// A JSON-RPC error response is the node refusing the transaction and is
    /// not retried on other providers.
    pub async fn broadcast(&self, raw: &Bytes) -> WalletResult<TxHash> {
        let local_hash = keccak256(raw);

        for (i, provider) in self.providers.iter().enumerate() {
            let fut = provider.send_raw_transaction(raw);
            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(pending)) => return Ok(*pending.tx_hash()),
                Ok(Err(RpcError::ErrorResp(payload))) => {
                    let message = payload.message.to_string();
                    if ALREADY_KNOWN_MARKERS
                        .iter()
                        .any(|m| message.to_lowercase().contains(m))
                    {
                        tracing::debug!(provider_idx = i, tx_hash = %local_hash, "Transaction already in mempool");
                        return Ok(local_hash);
                    }
                    return Err(WalletError::Rejected {
                        code: payload.code,
                        reason: message,
                    });
                }
                Ok(Err(e)) => {
                    tracing::warn!(provider_idx = i, error = %e, "Broadcast failed, trying next provider");
                }
                Err(_) => {
                    tracing::warn!(provider_idx = i, "Broadcast timeout, trying next provider");
                }
            }
        }
        Err(WalletError::Network("All providers failed to broadcast transaction".to_string()))
    }

    /// Wait for a transaction to be included with the configured depth.
    pub async fn wait_for_inclusion(&self, tx_hash: TxHash) -> WalletResult<InclusionReport> {
        let required = u64::from(self.config.confirmation_blocks);
        let timeout_duration = Duration::from_secs(self.config.confirmation_timeout_secs);
        let poll_interval = Duration::from_millis(self.config.receipt_poll_interval_ms);

        let result = timeout(timeout_duration, async {
            let mut ticker = interval(poll_interval);

            loop {
                ticker.tick().await;

                let receipt = match self.get_transaction_receipt(tx_hash).await {
                    Ok(Some(r)) => r,
                    Ok(None) => {
                        tracing::debug!(tx_hash = %tx_hash, "Transaction pending");
                        continue;
                    }
                    Err(e) => {
                        tracing::warn!(tx_hash = %tx_hash, error = %e, "Receipt lookup failed");
                        continue;
                    }
                };

                let tx_block = match receipt.block_number {
                    Some(block) => block,
                    None => continue,
                };

                if required > 1 {
                    let current_block = match self.get_block_number().await {
                        Ok(block) => block,
                        Err(_) => continue,
                    };
                    let confirmations = current_block.saturating_sub(tx_block) + 1;
                    if confirmations < required {
                        tracing::debug!(
                            tx_hash = %tx_hash,
                            confirmations = confirmations,
                            required = required,
                            "Waiting for confirmations"
                        );
                        continue;
                    }
                }

                return InclusionReport {
                    transaction_hash: receipt.transaction_hash,
                    success: receipt.status(),
                    block_number: Some(tx_block),
                    gas_used: receipt.gas_used,
                };
            }
        })
        .await;

        result.map_err(|_| {
            WalletError::Network(format!(
                "Transaction {} not confirmed within {} seconds",
                tx_hash, self.config.confirmation_timeout_secs
            ))
        })
    }

    /// Get the configuration.
    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }
}

#[async_trait]
impl NetworkClient for RpcNetworkClient {
    async fn gas_price(&self) -> WalletResult<u128> {
        self.get_gas_price().await
    }

    async fn estimate_gas(&self, request: &GasEstimateRequest) -> WalletResult<u64> {
        self.get_gas_estimate(request).await
    }

    async fn transaction_count(&self, address: Address) -> WalletResult<u64> {
        self.get_transaction_count(address).await
    }

    async fn chain_id(&self) -> WalletResult<u64> {
        self.get_chain_id().await.map(u64::from)
    }

    async fn send_raw_transaction(&self, raw: &Bytes) -> WalletResult<InclusionReport> {
        let tx_hash = self.broadcast(raw).await?;
        tracing::info!(tx_hash = %tx_hash, "Transaction broadcast, awaiting inclusion");
        self.wait_for_inclusion(tx_hash).await
    }
}

impl std::fmt::Debug for RpcNetworkClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcNetworkClient")
            .field("rpc_url", &self.config.rpc_url)
            .field("providers", &self.providers.len())
            .field("chain_id", &self.config.chain_id)
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .finish()
    }
}
