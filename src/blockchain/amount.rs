//! Decimal ether amounts held as exact wei.

use alloy::primitives::U256;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::blockchain::types::WalletError;

/// Number of fractional digits between ether and wei.
pub const ETHER_DECIMALS: usize = 18;

const WEI_PER_ETHER: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

/// A non-negative transfer amount.
///
/// Parsed from a decimal ether string and stored as an integer count of wei,
/// so no precision is lost on the way to the transaction's `value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount {
    wei: U256,
}

impl Amount {
    /// Wrap an amount already expressed in wei.
    pub fn from_wei(wei: U256) -> Self {
        Self { wei }
    }

    /// Amount in wei.
    pub fn wei(&self) -> U256 {
        self.wei
    }

    pub fn is_zero(&self) -> bool {
        self.wei.is_zero()
    }
}

impl FromStr for Amount {
    type Err = WalletError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let s = input.trim();
        if s.is_empty() {
            return Err(WalletError::InvalidAmount("empty amount".to_string()));
        }
        if s.starts_with('-') {
            return Err(WalletError::InvalidAmount(format!("negative amount '{}'", s)));
        }
        if s.starts_with('+') {
            return Err(WalletError::InvalidAmount(format!("unexpected sign in '{}'", s)));
        }

        let (whole, frac) = match s.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (s, ""),
        };

        if whole.is_empty() && frac.is_empty() {
            return Err(WalletError::InvalidAmount(format!("no digits in '{}'", s)));
        }
        if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(WalletError::InvalidAmount(format!("not a decimal number: '{}'", s)));
        }
        if frac.len() > ETHER_DECIMALS {
            return Err(WalletError::InvalidAmount(format!(
                "'{}' has more than {} fractional digits",
                s, ETHER_DECIMALS
            )));
        }

        let overflow = || WalletError::InvalidAmount(format!("'{}' is too large", s));

        let whole_wei = if whole.is_empty() {
            U256::ZERO
        } else {
            U256::from_str_radix(whole, 10)
                .map_err(|_| overflow())?
                .checked_mul(WEI_PER_ETHER)
                .ok_or_else(overflow)?
        };

        let frac_wei = if frac.is_empty() {
            U256::ZERO
        } else {
            let padded = format!("{:0<width$}", frac, width = ETHER_DECIMALS);
            U256::from_str_radix(&padded, 10).map_err(|_| overflow())?
        };

        let wei = whole_wei.checked_add(frac_wei).ok_or_else(overflow)?;
        Ok(Self { wei })
    }
}

impl fmt::Display for Amount {
    /// Canonical decimal ether: no trailing fractional zeros.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.wei / WEI_PER_ETHER;
        let frac = self.wei % WEI_PER_ETHER;
        if frac.is_zero() {
            return write!(f, "{}", whole);
        }
        let digits = format!("{:0>width$}", frac.to_string(), width = ETHER_DECIMALS);
        write!(f, "{}.{}", whole, digits.trim_end_matches('0'))
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}
