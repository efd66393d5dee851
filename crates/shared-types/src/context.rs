//! # Execution Context
//!
//! Everything a module operation may touch: the store, the current block
//! header, the execution mode and the event sink.
//!
//! `run_atomic` is the only way to get all-or-nothing semantics. The closure
//! runs against a [`CacheStore`] branch; writes and events are merged into
//! the parent only when it returns `Ok`.

use serde::{Deserialize, Serialize};

use crate::entities::{BlockInfo, Timestamp};
use crate::store::{CacheStore, KvStore};

/// Stage of transaction processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecMode {
    /// Mempool admission.
    Check,
    /// Mempool re-admission after a block commit.
    ReCheck,
    /// Gas estimation.
    Simulate,
    /// Block execution.
    Deliver,
}

/// A typed event with ordered attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub kind: String,
    pub attributes: Vec<(String, String)>,
}

impl Event {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            attributes: Vec::new(),
        }
    }

    pub fn attr(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.attributes.push((key.into(), value.to_string()));
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Execution context for one unit of work.
pub struct Context<'a> {
    store: &'a mut dyn KvStore,
    block: BlockInfo,
    mode: ExecMode,
    events: Vec<Event>,
}

impl<'a> Context<'a> {
    pub fn new(store: &'a mut dyn KvStore, block: BlockInfo, mode: ExecMode) -> Self {
        Self {
            store,
            block,
            mode,
            events: Vec::new(),
        }
    }

    pub fn store(&self) -> &dyn KvStore {
        &*self.store
    }

    pub fn store_mut(&mut self) -> &mut dyn KvStore {
        &mut *self.store
    }

    pub fn block(&self) -> BlockInfo {
        self.block
    }

    pub fn block_height(&self) -> u64 {
        self.block.height
    }

    pub fn block_time(&self) -> Timestamp {
        self.block.time
    }

    pub fn mode(&self) -> ExecMode {
        self.mode
    }

    pub fn with_mode(mut self, mode: ExecMode) -> Self {
        self.mode = mode;
        self
    }

    /// Mempool admission (check or re-check).
    pub fn is_check_tx(&self) -> bool {
        matches!(self.mode, ExecMode::Check | ExecMode::ReCheck)
    }

    pub fn is_recheck_tx(&self) -> bool {
        self.mode == ExecMode::ReCheck
    }

    pub fn is_simulate(&self) -> bool {
        self.mode == ExecMode::Simulate
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events
    }

    /// Run `f` on a branched store. Writes and events reach this context
    /// only if `f` returns `Ok`.
    pub fn run_atomic<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Context<'_>) -> Result<T, E>,
    {
        let block = self.block;
        let mode = self.mode;
        let mut cache = CacheStore::new(&mut *self.store);
        let (result, events) = {
            let mut branch = Context::new(&mut cache, block, mode);
            let result = f(&mut branch);
            (result, branch.into_events())
        };
        if result.is_ok() {
            cache.write();
            self.events.extend(events);
        }
        result
    }
}
