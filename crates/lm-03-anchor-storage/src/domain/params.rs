//! Anchor fee schedule and storage limits.

use primitive_types::U256;
use serde::{Deserialize, Serialize};
use shared_types::{validate_denom, Coin};

use super::errors::AnchorError;

pub const DEFAULT_FEE_REGISTER: u64 = 1_000_000_000_000;
pub const DEFAULT_FEE_RECORD: u64 = 1_000_000_000;
pub const DEFAULT_FEE_PURCHASE_STORAGE: u64 = 5_000_000_000;
pub const DEFAULT_DENOM: &str = "nund";
pub const DEFAULT_STORAGE_LIMIT: u64 = 50_000;
pub const DEFAULT_MAX_STORAGE_LIMIT: u64 = 600_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorParams {
    pub fee_register: u64,
    pub fee_record: u64,
    /// Per slot.
    pub fee_purchase_storage: u64,
    pub denom: String,
    pub default_storage_limit: u64,
    pub max_storage_limit: u64,
    #[serde(default)]
    pub version: u64,
}

impl Default for AnchorParams {
    fn default() -> Self {
        Self {
            fee_register: DEFAULT_FEE_REGISTER,
            fee_record: DEFAULT_FEE_RECORD,
            fee_purchase_storage: DEFAULT_FEE_PURCHASE_STORAGE,
            denom: DEFAULT_DENOM.to_string(),
            default_storage_limit: DEFAULT_STORAGE_LIMIT,
            max_storage_limit: DEFAULT_MAX_STORAGE_LIMIT,
            version: 1,
        }
    }
}

impl AnchorParams {
    /// Small fees and limits so pruning and capacity are easy to reach.
    pub fn for_testing() -> Self {
        Self {
            fee_register: 1_000,
            fee_record: 10,
            fee_purchase_storage: 5,
            default_storage_limit: 3,
            max_storage_limit: 10,
            ..Default::default()
        }
    }

    pub fn register_fee(&self) -> Coin {
        Coin::new(self.denom.clone(), self.fee_register)
    }

    pub fn record_fee(&self) -> Coin {
        Coin::new(self.denom.clone(), self.fee_record)
    }

    pub fn purchase_fee(&self, slots: u64) -> Coin {
        let amount = U256::from(self.fee_purchase_storage) * U256::from(slots);
        Coin::new(self.denom.clone(), amount)
    }

    pub fn validate(&self) -> Result<(), AnchorError> {
        validate_denom(&self.denom).map_err(|e| AnchorError::InvalidParams(e.to_string()))?;
        for (name, value) in [
            ("register fee", self.fee_register),
            ("record fee", self.fee_record),
            ("purchase storage fee", self.fee_purchase_storage),
            ("default storage limit", self.default_storage_limit),
            ("max storage limit", self.max_storage_limit),
        ] {
            if value == 0 {
                return Err(AnchorError::InvalidParams(format!("{} must be positive", name)));
            }
        }
        if self.default_storage_limit > self.max_storage_limit {
            return Err(AnchorError::InvalidParams(format!(
                "default storage limit {} exceeds max {}",
                self.default_storage_limit, self.max_storage_limit
            )));
        }
        Ok(())
    }
}
