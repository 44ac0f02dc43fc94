//! Transaction building and signing.
//!
//! # Responsibilities
//! - Validate recipient and amount before touching the network
//! - Obtain a live fee quote (gas price, gas estimate) plus nonce and chain ID
//! - Assemble a legacy EIP-155 transfer and sign it with the account key

use alloy::consensus::{SignableTransaction, TxEnvelope, TxLegacy};
use alloy::eips::eip2718::Encodable2718;
use alloy::network::TxSignerSync;
use alloy::primitives::{Address, Bytes, Signature, TxHash, TxKind};

use crate::blockchain::amount::Amount;
use crate::blockchain::network::{GasEstimateRequest, NetworkClient};
use crate::blockchain::types::{WalletError, WalletResult};
use crate::blockchain::wallet::Account;
use crate::observability::metrics;

/// Price of a transfer as quoted by the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeQuote {
    /// Gas price in wei.
    pub gas_price: u128,
    /// Estimated gas limit.
    pub gas: u64,
}

/// A fully populated transfer awaiting a signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTransaction {
    pub from: Address,
    pub to: Address,
    pub value: Amount,
    pub gas: u64,
    pub gas_price: u128,
    pub nonce: u64,
    pub chain_id: u64,
}

impl UnsignedTransaction {
    fn to_legacy(&self) -> TxLegacy {
        TxLegacy {
            chain_id: Some(self.chain_id),
            nonce: self.nonce,
            gas_price: self.gas_price,
            gas_limit: self.gas,
            to: TxKind::Call(self.to),
            value: self.value.wei(),
            input: Bytes::new(),
        }
    }
}

/// A signed transfer and its wire encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    unsigned: UnsignedTransaction,
    signature: Signature,
    raw: Bytes,
    hash: TxHash,
}

impl SignedTransaction {
    pub fn transaction(&self) -> &UnsignedTransaction {
        &self.unsigned
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// EIP-2718 encoded payload for `eth_sendRawTransaction`.
    pub fn raw(&self) -> &Bytes {
        &self.raw
    }

    pub fn hash(&self) -> TxHash {
        self.hash
    }

    /// Recover the signing address from the signature alone.
    pub fn recover_signer(&self) -> WalletResult<Address> {
        let prehash = self.unsigned.to_legacy().signature_hash();
        self.signature
            .recover_address_from_prehash(&prehash)
            .map_err(|e| WalletError::FatalSigning(format!("Signature recovery failed: {}", e)))
    }
}

/// Parse a recipient address.
///
/// Accepts 40 hex characters with an optional `0x` prefix. Mixed-case input
/// must carry a valid EIP-55 checksum.
pub fn parse_recipient(input: &str) -> WalletResult<Address> {
    let s = input.trim();
    let body = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);

    if body.len() != 40 || !body.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(WalletError::InvalidRecipient(format!(
            "'{}' is not a 20-byte hex address",
            s
        )));
    }

    let has_lower = body.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = body.bytes().any(|b| b.is_ascii_uppercase());
    if has_lower && has_upper {
        return Address::parse_checksummed(format!("0x{}", body), None).map_err(|_| {
            WalletError::InvalidRecipient(format!("'{}' has an invalid checksum", s))
        });
    }

    body.parse::<Address>()
        .map_err(|e| WalletError::InvalidRecipient(format!("'{}': {}", s, e)))
}

/// Builds and signs value transfers against a network collaborator.
pub struct TransactionBuilder<'a, N: ?Sized> {
    network: &'a N,
}

impl<'a, N: NetworkClient + ?Sized> TransactionBuilder<'a, N> {
    /// Create a new transaction builder.
    pub fn new(network: &'a N) -> Self {
        Self { network }
    }

    /// Build and sign a transfer of `amount` ether from `account` to `to`.
    ///
    /// Quote failures are reported as `QuoteUnavailable` and are not retried.
    pub async fn build(
        &self,
        account: &Account,
        to: &str,
        amount: &str,
    ) -> WalletResult<SignedTransaction> {
        let to = parse_recipient(to)?;
        let value: Amount = amount.parse()?;
        self.build_transfer(account, to, value).await
    }

    /// Build and sign a transfer whose inputs are already parsed.
    pub async fn build_transfer(
        &self,
        account: &Account,
        to: Address,
        value: Amount,
    ) -> WalletResult<SignedTransaction> {
        let from = account.address();
        let request = GasEstimateRequest {
            from,
            to,
            value: value.wei(),
        };

        let (quote, nonce, chain_id) = self.quote(&request).await?;

        let unsigned = UnsignedTransaction {
            from,
            to,
            value,
            gas: quote.gas,
            gas_price: quote.gas_price,
            nonce,
            chain_id,
        };

        tracing::info!(
            from = %from,
            to = %to,
            value = %value,
            gas = quote.gas,
            gas_price = quote.gas_price,
            nonce = nonce,
            chain_id = chain_id,
            "Transaction assembled"
        );

        let signed = sign(account, unsigned)?;
        metrics::record_built();
        Ok(signed)
    }

    /// Fetch the fee quote, nonce, and chain ID for a transfer.
    pub async fn quote(&self, request: &GasEstimateRequest) -> WalletResult<(FeeQuote, u64, u64)> {
        let unavailable = |what: &'static str| {
            move |e: WalletError| WalletError::QuoteUnavailable(format!("{}: {}", what, e))
        };

        let (gas_price, gas, nonce, chain_id) = tokio::try_join!(
            async { self.network.gas_price().await.map_err(unavailable("gas price")) },
            async {
                self.network
                    .estimate_gas(request)
                    .await
                    .map_err(unavailable("gas estimate"))
            },
            async {
                self.network
                    .transaction_count(request.from)
                    .await
                    .map_err(unavailable("nonce"))
            },
            async { self.network.chain_id().await.map_err(unavailable("chain id")) },
        )?;

        Ok((FeeQuote { gas_price, gas }, nonce, chain_id))
    }
}

fn sign(account: &Account, unsigned: UnsignedTransaction) -> WalletResult<SignedTransaction> {
    let mut tx = unsigned.to_legacy();
    let signature = account
        .signer()
        .sign_transaction_sync(&mut tx)
        .map_err(|e| WalletError::FatalSigning(e.to_string()))?;

    let signed = tx.into_signed(signature);
    let hash = *signed.hash();
    let raw = Bytes::from(TxEnvelope::from(signed).encoded_2718());

    let signed = SignedTransaction {
        unsigned,
        signature,
        raw,
        hash,
    };

    let recovered = signed.recover_signer()?;
    if recovered != signed.unsigned.from {
        return Err(WalletError::FatalSigning(format!(
            "Signature recovers to {} instead of {}",
            recovered, signed.unsigned.from
        )));
    }

    Ok(signed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::network::InclusionReport;
    use crate::blockchain::wallet::KeyManager;
    use alloy::consensus::transaction::SignerRecoverable;
    use alloy::consensus::Transaction;
    use alloy::eips::eip2718::Decodable2718;
    use alloy::primitives::U256;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    const TEST_PRIVATE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const RECIPIENT: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";

    struct StaticNetwork {
        gas_price_available: bool,
        calls: AtomicU32,
    }

    impl StaticNetwork {
        fn new() -> Self {
            Self {
                gas_price_available: true,
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl NetworkClient for StaticNetwork {
        async fn gas_price(&self) -> WalletResult<u128> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.gas_price_available {
                Ok(20_000_000_000)
            } else {
                Err(WalletError::Network("connection refused".into()))
            }
        }

        async fn estimate_gas(&self, _request: &GasEstimateRequest) -> WalletResult<u64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(21_000)
        }

        async fn transaction_count(&self, _address: Address) -> WalletResult<u64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(7)
        }

        async fn chain_id(&self) -> WalletResult<u64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(31337)
        }

        async fn send_raw_transaction(&self, _raw: &Bytes) -> WalletResult<InclusionReport> {
            unreachable!("builder never submits")
        }
    }

    fn account() -> Account {
        KeyManager::new().import(TEST_PRIVATE_KEY).unwrap()
    }

    #[tokio::test]
    async fn test_build_populates_fields_from_quote() {
        let network = StaticNetwork::new();
        let account = account();
        let signed = TransactionBuilder::new(&network)
            .build(&account, RECIPIENT, "0.1")
            .await
            .unwrap();

        let tx = signed.transaction();
        assert_eq!(tx.from, account.address());
        assert_eq!(tx.to, parse_recipient(RECIPIENT).unwrap());
        assert_eq!(tx.value.wei(), U256::from(100_000_000_000_000_000u64));
        assert_eq!(tx.gas, 21_000);
        assert_eq!(tx.gas_price, 20_000_000_000);
        assert_eq!(tx.nonce, 7);
        assert_eq!(tx.chain_id, 31337);
    }

    #[tokio::test]
    async fn test_signature_recovers_to_sender() {
        let network = StaticNetwork::new();
        let account = account();
        let signed = TransactionBuilder::new(&network)
            .build(&account, RECIPIENT, "1.25")
            .await
            .unwrap();

        assert_eq!(signed.recover_signer().unwrap(), account.address());
    }

    #[tokio::test]
    async fn test_raw_payload_decodes_to_same_transaction() {
        let network = StaticNetwork::new();
        let account = account();
        let signed = TransactionBuilder::new(&network)
            .build(&account, RECIPIENT, "0.5")
            .await
            .unwrap();

        let mut buf: &[u8] = signed.raw();
        let envelope = TxEnvelope::decode_2718(&mut buf).unwrap();
        assert_eq!(*envelope.tx_hash(), signed.hash());
        assert_eq!(envelope.nonce(), 7);
        assert_eq!(envelope.chain_id(), Some(31337));
        assert_eq!(envelope.value(), signed.transaction().value.wei());
        assert_eq!(envelope.recover_signer().unwrap(), account.address());
    }

    #[tokio::test]
    async fn test_zero_amount_is_allowed() {
        let network = StaticNetwork::new();
        let signed = TransactionBuilder::new(&network)
            .build(&account(), RECIPIENT, "0")
            .await
            .unwrap();
        assert!(signed.transaction().value.is_zero());
    }

    #[tokio::test]
    async fn test_negative_amount_rejected_before_quote() {
        let network = StaticNetwork::new();
        let err = TransactionBuilder::new(&network)
            .build(&account(), RECIPIENT, "-1")
            .await
            .unwrap_err();
        assert!(matches!(err, WalletError::InvalidAmount(_)));
        assert_eq!(network.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invalid_recipient_rejected_before_quote() {
        let network = StaticNetwork::new();
        let err = TransactionBuilder::new(&network)
            .build(&account(), "0xRECEIVER", "0.1")
            .await
            .unwrap_err();
        assert!(matches!(err, WalletError::InvalidRecipient(_)));
        assert_eq!(network.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_quote_failure_is_classified() {
        let network = StaticNetwork {
            gas_price_available: false,
            calls: AtomicU32::new(0),
        };
        let err = TransactionBuilder::new(&network)
            .build(&account(), RECIPIENT, "0.1")
            .await
            .unwrap_err();
        assert!(matches!(err, WalletError::QuoteUnavailable(_)));
        assert!(err.to_string().contains("gas price"));
    }

    #[test]
    fn test_parse_recipient_variants() {
        assert!(parse_recipient("0x70997970c51812dc3a010c7d01b50e0d17dc79c8").is_ok());
        assert!(parse_recipient("70997970C51812DC3A010C7D01B50E0D17DC79C8").is_ok());
        assert!(parse_recipient(RECIPIENT).is_ok());
    }

    #[test]
    fn test_parse_recipient_accepts_upper_prefix() {
        let expected = parse_recipient(RECIPIENT).unwrap();
        assert_eq!(
            parse_recipient("0X70997970C51812dc3A010C7d01b50e0d17dc79C8").unwrap(),
            expected
        );
        assert_eq!(
            parse_recipient("0X70997970c51812dc3a010c7d01b50e0d17dc79c8").unwrap(),
            expected
        );
    }

    #[test]
    fn test_parse_recipient_bad_checksum() {
        let err = parse_recipient("0x70997970c51812dc3A010C7d01b50e0d17dc79C8").unwrap_err();
        assert!(err.to_string().contains("checksum"));
    }

    #[test]
    fn test_parse_recipient_malformed() {
        for input in ["", "0x", "0x1234", "RECEIVER_ADDRESS", "0xzz997970c51812dc3a010c7d01b50e0d17dc79c8"] {
            assert!(
                matches!(parse_recipient(input), Err(WalletError::InvalidRecipient(_))),
                "expected '{}' to be rejected",
                input
            );
        }
    }
}
