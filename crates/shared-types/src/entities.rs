//! # Core Domain Entities
//!
//! Identity and time primitives shared by every ledger module.
//!
//! ## Clusters
//!
//! - **Identity**: `Address`, module account derivation
//! - **Time**: `Timestamp`, `BlockInfo`
//! - **Paging**: `page_window` for query results

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

// Re-export U256 from primitive-types for use across all modules
pub use primitive_types::U256;

/// Unix timestamp in seconds.
pub type Timestamp = u64;

/// Length of an account address in bytes.
pub const ADDRESS_LEN: usize = 20;

// =============================================================================
// CLUSTER A: IDENTITY
// =============================================================================

/// A 20-byte account address.
///
/// Rendered as `0x`-prefixed lowercase hex. Ordering is bytewise so that
/// addresses can be used directly inside ordered store keys.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(pub [u8; ADDRESS_LEN]);

/// Failure to parse an address from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("address is empty")]
    Empty,

    #[error("address must be {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("address is not valid hex: {0}")]
    InvalidHex(String),
}

impl Address {
    /// The all-zero address. Never a valid signer.
    pub const ZERO: Address = Address([0u8; ADDRESS_LEN]);

    pub fn new(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// Derive the account address of a named module (escrow, fee collector).
    pub fn module(name: &str) -> Self {
        let digest = Sha256::digest(name.as_bytes());
        let mut bytes = [0u8; ADDRESS_LEN];
        bytes.copy_from_slice(&digest[..ADDRESS_LEN]);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ADDRESS_LEN]
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(AddressError::Empty);
        }
        let body = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let raw = hex::decode(body).map_err(|e| AddressError::InvalidHex(e.to_string()))?;
        if raw.len() != ADDRESS_LEN {
            return Err(AddressError::InvalidLength {
                expected: ADDRESS_LEN,
                actual: raw.len(),
            });
        }
        let mut bytes = [0u8; ADDRESS_LEN];
        bytes.copy_from_slice(&raw);
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(addr: Address) -> Self {
        addr.to_string()
    }
}

// =============================================================================
// CLUSTER B: TIME
// =============================================================================

/// Header data of the block currently being executed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockInfo {
    pub height: u64,
    pub time: Timestamp,
}

impl BlockInfo {
    pub fn new(height: u64, time: Timestamp) -> Self {
        Self { height, time }
    }
}

// =============================================================================
// CLUSTER C: PAGING
// =============================================================================

/// Default and maximum page size for module queries.
pub const MAX_PAGE_LIMIT: usize = 100;

/// `(skip, take)` for a 1-based page. A zero limit means the maximum; page
/// zero is treated as page one.
pub fn page_window(page: usize, limit: usize) -> (usize, usize) {
    let limit = match limit {
        0 => MAX_PAGE_LIMIT,
        l => l.min(MAX_PAGE_LIMIT),
    };
    (page.max(1).saturating_sub(1).saturating_mul(limit), limit)
}
