//! The admission stages, in the order the standard chain runs them.

pub mod anchor_fee;
pub mod deduct_fee;
pub mod locked_funds;
pub mod sequence;
pub mod validate_basic;

pub use anchor_fee::{expected_anchor_fee, CorrectAnchorFeeDecorator};
pub use deduct_fee::DeductFeeDecorator;
pub use locked_funds::CheckLockedFundsDecorator;
pub use sequence::{sequence, IncrementSequenceDecorator, SEQUENCE_PREFIX};
pub use validate_basic::ValidateBasicDecorator;
