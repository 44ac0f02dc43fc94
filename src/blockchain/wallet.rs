//! Account key lifecycle: creation, import, and signing access.
//!
//! # Security
//! - Private keys live only inside `Account`, in memory, for one session
//! - Keys are never logged or serialized
//! - Intermediate key buffers are zeroized; the signer zeroizes on drop

use alloy::primitives::{Address, U256};
use alloy::signers::local::PrivateKeySigner;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use zeroize::Zeroizing;

use crate::blockchain::types::{WalletError, WalletResult};
use crate::observability::metrics;

/// Length of a secp256k1 private key in bytes.
pub const PRIVATE_KEY_LEN: usize = 32;

/// secp256k1 group order `n`, little-endian limbs.
pub const SECP256K1_ORDER: U256 = U256::from_limbs([
    0xBFD2_5E8C_D036_4141,
    0xBAAE_DCE6_AF48_A03B,
    0xFFFF_FFFF_FFFF_FFFE,
    0xFFFF_FFFF_FFFF_FFFF,
]);

/// Draws that may land on an invalid scalar before giving up.
const MAX_KEYGEN_ATTEMPTS: usize = 8;

/// A key pair and the address derived from it.
///
/// There is no way to set the address independently: it is always read
/// from the signer that owns the key.
pub struct Account {
    signer: PrivateKeySigner,
}

impl Account {
    fn from_signer(signer: PrivateKeySigner) -> Self {
        Self { signer }
    }

    /// The account address.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// The address in EIP-55 checksum case.
    pub fn address_string(&self) -> String {
        self.signer.address().to_checksum(None)
    }

    /// Hex-encoded private key (`0x`-prefixed), zeroized when dropped.
    ///
    /// Intended for the user to back up their key; do not log the result.
    pub fn export_private_key(&self) -> Zeroizing<String> {
        let bytes = Zeroizing::new(self.signer.to_bytes().0);
        Zeroizing::new(alloy::hex::encode_prefixed(bytes.as_slice()))
    }

    pub(crate) fn signer(&self) -> &PrivateKeySigner {
        &self.signer
    }

    /// Consume the account, releasing its key material.
    pub fn clear(self) {
        tracing::debug!(address = %self.address(), "Account key material released");
        drop(self);
    }
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("address", &self.address())
            .field("private_key", &"[REDACTED]")
            .finish()
    }
}

/// Creates and imports accounts.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyManager;

impl KeyManager {
    pub fn new() -> Self {
        Self
    }

    /// Generate a fresh account from the operating system random source.
    pub fn create(&self) -> WalletResult<Account> {
        self.create_with_rng(&mut OsRng)
    }

    /// Generate a fresh account from the given cryptographic RNG.
    pub fn create_with_rng<R: RngCore + CryptoRng>(&self, rng: &mut R) -> WalletResult<Account> {
        for _ in 0..MAX_KEYGEN_ATTEMPTS {
            let mut bytes = Zeroizing::new([0u8; PRIVATE_KEY_LEN]);
            rng.try_fill_bytes(&mut bytes[..])
                .map_err(|e| WalletError::Entropy(e.to_string()))?;

            if check_scalar(&bytes).is_err() {
                continue;
            }

            let signer = PrivateKeySigner::from_slice(bytes.as_slice())
                .map_err(|e| WalletError::Entropy(format!("Key derivation failed: {}", e)))?;
            let account = Account::from_signer(signer);

            metrics::record_account("created");
            tracing::info!(address = %account.address(), "Account created");
            return Ok(account);
        }

        Err(WalletError::Entropy(
            "Random source kept producing invalid keys".to_string(),
        ))
    }

    /// Import an account from a hex-encoded private key.
    ///
    /// Accepts 64 hex characters with or without a `0x` prefix. The key must
    /// be non-zero and below the secp256k1 group order.
    pub fn import(&self, private_key_hex: &str) -> WalletResult<Account> {
        let key_hex = private_key_hex.trim();
        let key_hex = key_hex
            .strip_prefix("0x")
            .or_else(|| key_hex.strip_prefix("0X"))
            .unwrap_or(key_hex);

        if key_hex.len() != PRIVATE_KEY_LEN * 2 {
            return Err(WalletError::InvalidKey(format!(
                "expected {} hex characters, got {}",
                PRIVATE_KEY_LEN * 2,
                key_hex.len()
            )));
        }

        let mut bytes = Zeroizing::new([0u8; PRIVATE_KEY_LEN]);
        alloy::hex::decode_to_slice(key_hex, &mut bytes[..])
            .map_err(|_| WalletError::InvalidKey("not valid hex".to_string()))?;

        check_scalar(&bytes)?;

        let signer = PrivateKeySigner::from_slice(bytes.as_slice())
            .map_err(|_| WalletError::InvalidKey("not a valid secp256k1 scalar".to_string()))?;
        let account = Account::from_signer(signer);

        metrics::record_account("imported");
        tracing::info!(address = %account.address(), "Account imported");
        Ok(account)
    }
}

/// Reject scalars outside `[1, n)`.
fn check_scalar(bytes: &[u8; PRIVATE_KEY_LEN]) -> WalletResult<()> {
    let value = U256::from_be_bytes(*bytes);
    if value.is_zero() {
        return Err(WalletError::InvalidKey("key must be non-zero".to_string()));
    }
    if value >= SECP256K1_ORDER {
        return Err(WalletError::InvalidKey(
            "key must be less than the curve order".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Well-known test private key (Anvil's first account)
    const TEST_PRIVATE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn test_import_private_key() {
        let account = KeyManager::new().import(TEST_PRIVATE_KEY).unwrap();
        assert_eq!(
            account.address_string(),
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
        );
    }

    #[test]
    fn test_import_with_0x_prefix() {
        let account = KeyManager::new()
            .import(&format!("0x{}", TEST_PRIVATE_KEY))
            .unwrap();
        assert_eq!(
            account.address().to_string().to_lowercase(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
    }

    #[test]
    fn test_import_is_deterministic() {
        let km = KeyManager::new();
        let a = km.import(TEST_PRIVATE_KEY).unwrap();
        let b = km.import(TEST_PRIVATE_KEY).unwrap();
        assert_eq!(a.address(), b.address());
    }

    #[test]
    fn test_import_wrong_length() {
        let err = KeyManager::new().import("abcd").unwrap_err();
        assert!(matches!(err, WalletError::InvalidKey(_)));
        assert!(err.to_string().contains("64 hex characters"));

        let long = format!("{}00", TEST_PRIVATE_KEY);
        assert!(matches!(
            KeyManager::new().import(&long),
            Err(WalletError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_import_non_hex() {
        let bad = "zz".repeat(32);
        let err = KeyManager::new().import(&bad).unwrap_err();
        assert!(err.to_string().contains("not valid hex"));
    }

    #[test]
    fn test_import_zero_key() {
        let zero = "0".repeat(64);
        let err = KeyManager::new().import(&zero).unwrap_err();
        assert!(err.to_string().contains("non-zero"));
    }

    #[test]
    fn test_import_key_at_or_above_order() {
        let order = "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141";
        let err = KeyManager::new().import(order).unwrap_err();
        assert!(err.to_string().contains("curve order"));

        let max = "f".repeat(64);
        assert!(matches!(
            KeyManager::new().import(&max),
            Err(WalletError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_import_order_minus_one_is_valid() {
        let below = "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364140";
        assert!(KeyManager::new().import(below).is_ok());
    }

    #[test]
    fn test_create_then_reimport() {
        let km = KeyManager::new();
        let created = km.create().unwrap();
        let exported = created.export_private_key();
        let imported = km.import(&exported).unwrap();
        assert_eq!(created.address(), imported.address());
    }

    #[test]
    fn test_create_yields_distinct_accounts() {
        let km = KeyManager::new();
        let a = km.create().unwrap();
        let b = km.create().unwrap();
        assert_ne!(a.address(), b.address());
    }

    #[test]
    fn test_debug_redacts_key() {
        let account = KeyManager::new().import(TEST_PRIVATE_KEY).unwrap();
        let debug_str = format!("{:?}", account);
        assert!(!debug_str.contains("ac0974bec"));
        assert!(debug_str.contains("[REDACTED]"));
    }

    #[test]
    fn test_export_round_trips_key() {
        let account = KeyManager::new().import(TEST_PRIVATE_KEY).unwrap();
        assert_eq!(
            account.export_private_key().as_str(),
            format!("0x{}", TEST_PRIVATE_KEY)
        );
    }

    struct BrokenRng;

    impl RngCore for BrokenRng {
        fn next_u32(&mut self) -> u32 {
            0
        }
        fn next_u64(&mut self) -> u64 {
            0
        }
        fn fill_bytes(&mut self, _dest: &mut [u8]) {}
        fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), rand::Error> {
            Err(rand::Error::new(std::io::Error::new(
                std::io::ErrorKind::Other,
                "no entropy",
            )))
        }
    }

    impl CryptoRng for BrokenRng {}

    #[test]
    fn test_create_reports_entropy_failure() {
        let err = KeyManager::new().create_with_rng(&mut BrokenRng).unwrap_err();
        assert!(matches!(err, WalletError::Entropy(_)));
    }
}
