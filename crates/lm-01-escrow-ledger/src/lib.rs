//! # Escrow Ledger (lm-01)
//!
//! Tracks funds minted against accepted purchase orders and held in escrow
//! until they are consumed as transaction fees.
//!
//! ## Accounting Model
//!
//! ```text
//!   mint_and_lock(recipient, amount)
//!     bank: mint ──▶ enterprise module
//!     bank: send ──▶ recipient
//!     bank: delegate recipient ──▶ enterprise module
//!     ledger: locked[recipient] += amount, total_locked += amount
//!
//!   unlock_for_fees(payer, fee)
//!     bank: undelegate enterprise module ──▶ payer
//!     ledger: locked[payer] -= x, total_locked -= x, spent[payer] += x
//! ```
//!
//! ## Invariants
//!
//! | Invariant | Enforcement |
//! |-----------|-------------|
//! | `total_locked == Σ locked[a] == balance(enterprise)` | `check_invariants`, fatal on mismatch |
//! | Bank steps and counters commit together | `Context::run_atomic` |
//! | Decrements never go below zero | clamped, logged as a warning |
//!
//! ## Unlock Policy
//!
//! When the locked balance covers the fee, exactly the fee is released.
//! When it does not, but locked plus spendable does, the **entire** locked
//! balance is released rather than only the shortfall.

pub mod domain;
pub mod genesis;
pub mod ports;
pub mod service;

pub use domain::{
    EnterpriseUserAccount, EscrowError, EscrowTotals, LockedBalance, SpentBalance, UnlockOutcome,
};
pub use genesis::EscrowGenesis;
pub use ports::EscrowApi;
pub use service::{EscrowLedger, EVENT_FUNDS_LOCKED, EVENT_FUNDS_UNLOCKED, MODULE_NAME};
