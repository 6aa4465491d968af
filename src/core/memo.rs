//! Memoized computations with an explicit invalidation hook
//!
//! The query layer itself schedules nothing. Callers that memoize a derived
//! set (an "active campaigns" snapshot, say) hold it in a [`Memoized`] cell
//! and call [`Memoized::invalidate`] when an external notification arrives;
//! recomputation happens lazily on the next read.

use std::sync::RwLock;

/// A lazily computed, explicitly invalidated value
pub struct Memoized<T> {
    slot: RwLock<Option<T>>,
}

impl<T: Clone> Memoized<T> {
    pub fn new() -> Self {
        Self {
            slot: RwLock::new(None),
        }
    }

    /// Return the cached value, computing it first if absent or invalidated
    pub fn get_or_compute(&self, compute: impl FnOnce() -> T) -> T {
        if let Some(value) = self.slot.read().expect("memo lock poisoned").as_ref() {
            return value.clone();
        }
        let mut slot = self.slot.write().expect("memo lock poisoned");
        // Another writer may have filled the slot between the read and
        // write lock.
        if let Some(value) = slot.as_ref() {
            return value.clone();
        }
        let value = compute();
        *slot = Some(value.clone());
        value
    }

    /// Drop the cached value; the next read recomputes
    pub fn invalidate(&self) {
        *self.slot.write().expect("memo lock poisoned") = None;
    }
}

impl<T: Clone> Default for Memoized<T> {
    fn default() -> Self {
        Self::new()
    }
}
