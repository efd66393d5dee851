//! Per-account transaction counter.

use std::collections::BTreeSet;

use shared_types::codec;
use shared_types::{Address, Context, Tx};

use crate::chain::AnteDecorator;
use crate::errors::AnteError;

pub const SEQUENCE_PREFIX: &[u8] = b"auth/seq/";

/// Current sequence of `addr`; zero before its first transaction.
pub fn sequence(ctx: &Context<'_>, addr: &Address) -> Result<u64, AnteError> {
    let key = codec::address_key(SEQUENCE_PREFIX, addr);
    Ok(codec::load::<u64>(ctx.store(), &key)?.unwrap_or(0))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IncrementSequenceDecorator;

impl AnteDecorator for IncrementSequenceDecorator {
    fn name(&self) -> &'static str {
        "increment_sequence"
    }

    fn ante_handle(&self, ctx: &mut Context<'_>, tx: &Tx, _simulate: bool) -> Result<(), AnteError> {
        let signers: BTreeSet<Address> = tx.msgs.iter().map(|m| m.signer()).collect();
        for signer in signers {
            let next = sequence(ctx, &signer)? + 1;
            codec::save(ctx.store_mut(), &codec::address_key(SEQUENCE_PREFIX, &signer), &next)?;
        }
        Ok(())
    }
}
