//! SlotSwap Engine - Slot lifecycle, swap negotiation, and read projections.
//!
//! Every mutating operation runs as one [`Store::write`] closure: all
//! preconditions are checked first, then the whole effect is applied, so a
//! failed call never leaves a partial change behind and concurrent calls are
//! serialized against each other.

pub mod lifecycle;
pub mod projection;
pub mod swap;
pub mod users;

pub use projection::{DetailedEvent, DetailedSwapRequest, SwapRequestLists};
pub use slotswap_core::error::Result;

use slotswap_core::{InMemoryStore, Store, Tables};

/// Entry point for all engine operations.
pub struct SwapEngine<S = InMemoryStore> {
    store: S,
}

impl SwapEngine<InMemoryStore> {
    /// Create an engine backed by an empty in-memory store.
    pub fn in_memory() -> Self {
        Self::new(InMemoryStore::new())
    }
}

impl<S: Store> SwapEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Run a read-only closure against one consistent view of the records.
    ///
    /// Mutation only happens through the engine operations.
    pub fn inspect<R>(&self, f: impl FnOnce(&Tables) -> R) -> Result<R> {
        Ok(self.store.read(f)?)
    }
}

impl Default for SwapEngine<InMemoryStore> {
    fn default() -> Self {
        Self::in_memory()
    }
}
