//! # Fee Validation (lm-04)
//!
//! The transaction admission pipeline. Each stage is an [`AnteDecorator`];
//! an [`AnteChain`] runs them in order against a branch of the context and
//! keeps the branch only if every stage passes.
//!
//! ## Standard Chain
//!
//! ```text
//!   validate_basic
//!     └─▶ correct_anchor_fee     exact fee, solvency incl. locked, owner, capacity
//!           └─▶ check_locked_funds   escrow unlock_for_fees
//!                 └─▶ deduct_fee         payer ──▶ fee_collector
//!                       └─▶ increment_sequence
//! ```
//!
//! The exact-fee check only runs on mempool admission outside simulation.
//! Every other stage runs on every execution path.

pub mod chain;
pub mod decorators;
pub mod errors;

pub use chain::{AnteChain, AnteDecorator};
pub use decorators::{
    expected_anchor_fee, sequence, CheckLockedFundsDecorator, CorrectAnchorFeeDecorator,
    DeductFeeDecorator, IncrementSequenceDecorator, ValidateBasicDecorator, SEQUENCE_PREFIX,
};
pub use errors::AnteError;

use lm_01_escrow_ledger::EscrowApi;
use lm_03_anchor_storage::AnchorQuery;
use shared_types::BankKeeper;

/// Build the standard admission chain over the given keepers.
pub fn standard_chain<'k>(
    bank: &'k dyn BankKeeper,
    escrow: &'k dyn EscrowApi,
    anchor: &'k dyn AnchorQuery,
) -> AnteChain<'k> {
    AnteChain::new()
        .with(ValidateBasicDecorator)
        .with(CorrectAnchorFeeDecorator::new(bank, escrow, anchor))
        .with(CheckLockedFundsDecorator::new(escrow))
        .with(DeductFeeDecorator::new(bank))
        .with(IncrementSequenceDecorator)
}
