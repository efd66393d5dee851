//! Stateless transaction checks.

use shared_types::{Context, Tx};

use crate::chain::AnteDecorator;
use crate::errors::AnteError;

#[derive(Debug, Clone, Copy, Default)]
pub struct ValidateBasicDecorator;

impl AnteDecorator for ValidateBasicDecorator {
    fn name(&self) -> &'static str {
        "validate_basic"
    }

    fn ante_handle(&self, ctx: &mut Context<'_>, tx: &Tx, _simulate: bool) -> Result<(), AnteError> {
        // Already checked on admission.
        if ctx.is_recheck_tx() {
            return Ok(());
        }
        tx.validate_basic()?;
        Ok(())
    }
}
