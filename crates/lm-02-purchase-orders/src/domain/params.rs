//! Enterprise configuration.

use serde::{Deserialize, Serialize};
use shared_types::{validate_denom, Address};

use super::errors::OrderError;

pub const DEFAULT_DENOM: &str = "nund";
pub const DEFAULT_MIN_ACCEPTS: u64 = 1;
/// Seconds an order may wait for decisions before it is auto-rejected.
pub const DEFAULT_DECISION_TIME_LIMIT: u64 = 84_600;

/// Tunables of the purchase-order workflow and the escrow denomination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnterpriseParams {
    pub denom: String,
    pub min_accepts: u64,
    pub decision_time_limit: u64,
    pub signers: Vec<Address>,
    /// Bumped on every accepted update.
    #[serde(default)]
    pub version: u64,
}

impl Default for EnterpriseParams {
    fn default() -> Self {
        Self {
            denom: DEFAULT_DENOM.to_string(),
            min_accepts: DEFAULT_MIN_ACCEPTS,
            decision_time_limit: DEFAULT_DECISION_TIME_LIMIT,
            signers: Vec::new(),
            version: 1,
        }
    }
}

impl EnterpriseParams {
    /// Params with the given signer set, everything else default.
    pub fn with_signers(signers: Vec<Address>, min_accepts: u64) -> Self {
        Self {
            signers,
            min_accepts,
            ..Default::default()
        }
    }

    /// Three fixed signers, two accepts needed, one hour to decide.
    pub fn for_testing() -> Self {
        Self {
            min_accepts: 2,
            decision_time_limit: 3_600,
            signers: vec![
                Address::new([0x51; 20]),
                Address::new([0x52; 20]),
                Address::new([0x53; 20]),
            ],
            ..Default::default()
        }
    }

    pub fn is_signer(&self, addr: &Address) -> bool {
        self.signers.contains(addr)
    }

    /// Rejections above this many make acceptance unreachable.
    pub fn reject_threshold(&self) -> u64 {
        (self.signers.len() as u64).saturating_sub(self.min_accepts)
    }

    pub fn validate(&self) -> Result<(), OrderError> {
        validate_denom(&self.denom).map_err(|e| OrderError::InvalidParams(e.to_string()))?;
        if self.min_accepts == 0 {
            return Err(OrderError::InvalidParams("min accepts must be positive".into()));
        }
        if self.decision_time_limit == 0 {
            return Err(OrderError::InvalidParams(
                "decision time limit must be positive".into(),
            ));
        }
        if self.signers.is_empty() {
            return Err(OrderError::InvalidParams("at least one signer required".into()));
        }
        if (self.signers.len() as u64) < self.min_accepts {
            return Err(OrderError::InvalidParams(format!(
                "{} signers cannot reach {} accepts",
                self.signers.len(),
                self.min_accepts
            )));
        }
        let mut seen = std::collections::BTreeSet::new();
        for signer in &self.signers {
            if signer.is_zero() || !seen.insert(*signer) {
                return Err(OrderError::InvalidParams(format!("bad signer entry {}", signer)));
            }
        }
        Ok(())
    }
}
