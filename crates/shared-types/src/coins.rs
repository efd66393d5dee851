//! # Coins
//!
//! Denominated amounts. `Coins` is kept normalised: sorted by denomination,
//! one entry per denomination, no zero entries.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entities::U256;

/// Minimum denomination length.
pub const MIN_DENOM_LEN: usize = 3;
/// Maximum denomination length.
pub const MAX_DENOM_LEN: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoinError {
    #[error("invalid denomination: {0:?}")]
    InvalidDenom(String),

    #[error("denomination mismatch: {left} vs {right}")]
    DenomMismatch { left: String, right: String },

    #[error("duplicate denomination: {0}")]
    DuplicateDenom(String),

    #[error("amount overflow")]
    Overflow,
}

/// Check a denomination: leading ASCII letter, then alphanumerics or `/:._-`.
pub fn validate_denom(denom: &str) -> Result<(), CoinError> {
    let len = denom.len();
    let mut chars = denom.chars();
    let leading_ok = chars.next().map(|c| c.is_ascii_alphabetic()).unwrap_or(false);
    let rest_ok = chars.all(|c| c.is_ascii_alphanumeric() || "/:._-".contains(c));
    if (MIN_DENOM_LEN..=MAX_DENOM_LEN).contains(&len) && leading_ok && rest_ok {
        Ok(())
    } else {
        Err(CoinError::InvalidDenom(denom.to_string()))
    }
}

// =============================================================================
// COIN
// =============================================================================

/// A single denominated amount.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: U256,
}

impl Coin {
    pub fn new(denom: impl Into<String>, amount: impl Into<U256>) -> Self {
        Self {
            denom: denom.into(),
            amount: amount.into(),
        }
    }

    pub fn zero(denom: impl Into<String>) -> Self {
        Self::new(denom, U256::zero())
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        !self.amount.is_zero()
    }

    pub fn validate(&self) -> Result<(), CoinError> {
        validate_denom(&self.denom)
    }

    pub fn checked_add(&self, other: &Coin) -> Result<Coin, CoinError> {
        self.same_denom(other)?;
        let amount = self
            .amount
            .checked_add(other.amount)
            .ok_or(CoinError::Overflow)?;
        Ok(Coin::new(self.denom.clone(), amount))
    }

    /// Subtract, flooring at zero. Returns the result and whether the floor
    /// was hit.
    pub fn saturating_sub(&self, other: &Coin) -> Result<(Coin, bool), CoinError> {
        self.same_denom(other)?;
        match self.amount.checked_sub(other.amount) {
            Some(amount) => Ok((Coin::new(self.denom.clone(), amount), false)),
            None => Ok((Coin::zero(self.denom.clone()), true)),
        }
    }

    fn same_denom(&self, other: &Coin) -> Result<(), CoinError> {
        if self.denom == other.denom {
            Ok(())
        } else {
            Err(CoinError::DenomMismatch {
                left: self.denom.clone(),
                right: other.denom.clone(),
            })
        }
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

// =============================================================================
// COINS
// =============================================================================

/// A normalised set of coins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coins(Vec<Coin>);

impl Coins {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Build from arbitrary coins, merging duplicates and dropping zeros.
    pub fn from_coins(coins: impl IntoIterator<Item = Coin>) -> Result<Self, CoinError> {
        let mut out = Coins::new();
        for coin in coins {
            out = out.add_coin(&coin)?;
        }
        Ok(out)
    }

    /// Strict constructor used for declared fees: duplicates are rejected
    /// rather than merged.
    pub fn try_from_unique(coins: Vec<Coin>) -> Result<Self, CoinError> {
        let mut seen = std::collections::BTreeSet::new();
        for coin in &coins {
            coin.validate()?;
            if !seen.insert(coin.denom.clone()) {
                return Err(CoinError::DuplicateDenom(coin.denom.clone()));
            }
        }
        Self::from_coins(coins)
    }

    pub fn single(coin: Coin) -> Self {
        if coin.is_zero() {
            Self::new()
        } else {
            Self(vec![coin])
        }
    }

    pub fn amount_of(&self, denom: &str) -> U256 {
        self.0
            .iter()
            .find(|c| c.denom == denom)
            .map(|c| c.amount)
            .unwrap_or_default()
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Coin> {
        self.0.iter()
    }

    pub fn denoms(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|c| c.denom.as_str())
    }

    pub fn validate(&self) -> Result<(), CoinError> {
        self.0.iter().try_for_each(Coin::validate)
    }

    pub fn add_coin(&self, coin: &Coin) -> Result<Coins, CoinError> {
        let mut coins = self.0.clone();
        if coin.is_zero() {
            return Ok(Coins(coins));
        }
        match coins.binary_search_by(|c| c.denom.as_str().cmp(coin.denom.as_str())) {
            Ok(idx) => coins[idx] = coins[idx].checked_add(coin)?,
            Err(idx) => coins.insert(idx, coin.clone()),
        }
        Ok(Coins(coins))
    }

    pub fn add(&self, other: &Coins) -> Result<Coins, CoinError> {
        other.iter().try_fold(self.clone(), |acc, c| acc.add_coin(c))
    }

    /// Subtract `other`, returning `None` if any denomination would go
    /// negative.
    pub fn checked_sub(&self, other: &Coins) -> Option<Coins> {
        let mut coins = self.0.clone();
        for coin in other.iter() {
            let idx = coins
                .binary_search_by(|c| c.denom.as_str().cmp(coin.denom.as_str()))
                .ok()?;
            let remaining = coins[idx].amount.checked_sub(coin.amount)?;
            if remaining.is_zero() {
                coins.remove(idx);
            } else {
                coins[idx].amount = remaining;
            }
        }
        Some(Coins(coins))
    }

    /// True when every coin in `other` is covered by `self`.
    pub fn covers(&self, other: &Coins) -> bool {
        other.iter().all(|c| self.amount_of(&c.denom) >= c.amount)
    }
}

impl From<Coin> for Coins {
    fn from(coin: Coin) -> Self {
        Coins::single(coin)
    }
}

impl fmt::Display for Coins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "{}", parts.join(","))
    }
}
