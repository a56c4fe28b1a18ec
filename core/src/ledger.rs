//! The swap ledger: authoritative id allocation and record storage.
//!
//! The compare-and-swap discipline of [`SwapLedger::update_status`] is the
//! central concurrency-correctness mechanism: every transition is an
//! explicit, atomic, checked mutation, so two racing transition requests
//! for the same swap can never both succeed.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::error::SwapError;
use crate::swap::{SwapId, SwapRecord, SwapStatus};
use crate::Result;

/// Narrow storage contract the engine depends on.
///
/// Backed by an in-memory map here; a durable store may substitute as
/// long as it honors the same atomicity guarantees.
pub trait SwapLedger: Send + Sync {
    /// Return the next identifier and advance the counter. Never returns
    /// the same id twice, even under concurrent calls.
    fn allocate_id(&self) -> SwapId;

    /// Store a freshly created record.
    ///
    /// # Panics
    ///
    /// Panics if a record with the same id already exists. Allocation
    /// discipline makes this unreachable; hitting it means the id
    /// allocator is broken, which is a bug in the ledger, not a caller
    /// mistake.
    fn insert(&self, record: SwapRecord);

    /// Snapshot of the record, if present.
    fn get(&self, id: SwapId) -> Option<SwapRecord>;

    /// Compare-and-swap the record's status: succeeds only if the stored
    /// status equals `expected` at the instant of mutation, returning the
    /// updated snapshot.
    ///
    /// # Errors
    ///
    /// [`SwapError::NotFound`] for an unknown id, [`SwapError::StaleState`]
    /// with the observed status if the swap lost the race.
    fn update_status(
        &self,
        id: SwapId,
        expected: SwapStatus,
        new: SwapStatus,
    ) -> Result<SwapRecord>;
}

/// In-memory ledger.
///
/// The map lock is held only for lookup and insertion; each record has
/// its own lock, so transitions on distinct ids do not contend.
#[derive(Debug)]
pub struct MemoryLedger {
    next_id: AtomicU64,
    swaps: RwLock<HashMap<SwapId, Arc<Mutex<SwapRecord>>>>,
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            swaps: RwLock::new(HashMap::new()),
        }
    }

    fn slot(&self, id: SwapId) -> Option<Arc<Mutex<SwapRecord>>> {
        self.swaps.read().get(&id).cloned()
    }
}

impl SwapLedger for MemoryLedger {
    fn allocate_id(&self) -> SwapId {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    fn insert(&self, record: SwapRecord) {
        let mut swaps = self.swaps.write();
        match swaps.entry(record.id) {
            Entry::Occupied(_) => {
                panic!("duplicate swap id {}: id allocation violated", record.id)
            }
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(Mutex::new(record)));
            }
        }
    }

    fn get(&self, id: SwapId) -> Option<SwapRecord> {
        self.slot(id).map(|slot| slot.lock().clone())
    }

    fn update_status(
        &self,
        id: SwapId,
        expected: SwapStatus,
        new: SwapStatus,
    ) -> Result<SwapRecord> {
        let slot = self.slot(id).ok_or(SwapError::NotFound(id))?;
        let mut record = slot.lock();
        if record.status != expected {
            return Err(SwapError::StaleState {
                id,
                expected,
                actual: record.status,
            });
        }
        record.status = new;
        Ok(record.clone())
    }
}
