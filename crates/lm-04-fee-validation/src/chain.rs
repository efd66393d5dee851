//! The decorator trait and the ordered chain that runs them.

use shared_types::{Context, Tx};
use tracing::debug;

use crate::errors::AnteError;

/// One admission stage.
///
/// A decorator may read any state and may write through `ctx`; the chain
/// discards every write if a later stage fails.
pub trait AnteDecorator {
    fn name(&self) -> &'static str;

    fn ante_handle(&self, ctx: &mut Context<'_>, tx: &Tx, simulate: bool) -> Result<(), AnteError>;
}

/// Decorators run in insertion order, stopping at the first error.
#[derive(Default)]
pub struct AnteChain<'k> {
    decorators: Vec<Box<dyn AnteDecorator + 'k>>,
}

impl<'k> AnteChain<'k> {
    pub fn new() -> Self {
        Self {
            decorators: Vec::new(),
        }
    }

    pub fn with(mut self, decorator: impl AnteDecorator + 'k) -> Self {
        self.decorators.push(Box::new(decorator));
        self
    }

    pub fn len(&self) -> usize {
        self.decorators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decorators.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.decorators.iter().map(|d| d.name()).collect()
    }

    /// Run every stage against a branch of `ctx`. The branch is merged only
    /// if all stages pass.
    pub fn run(&self, ctx: &mut Context<'_>, tx: &Tx, simulate: bool) -> Result<(), AnteError> {
        ctx.run_atomic(|ctx| {
            for decorator in &self.decorators {
                decorator.ante_handle(ctx, tx, simulate).map_err(|e| {
                    debug!("[ante] {} rejected tx: {}", decorator.name(), e);
                    e
                })?;
            }
            Ok(())
        })
    }
}
