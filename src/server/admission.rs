//! Bounded admission of concurrently served requests.

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Counting semaphore with a fixed number of slots.
///
/// Acquisition never waits: when all slots are taken the caller answers
/// 503 instead of queueing.
#[derive(Debug, Clone)]
pub struct AdmissionController {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

/// One acquired slot. Dropping it releases the slot, exactly once.
#[derive(Debug)]
pub struct AdmissionSlot {
    _permit: OwnedSemaphorePermit,
}

impl AdmissionController {
    pub fn new(capacity: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Takes a slot if one is free; returns `None` immediately otherwise.
    pub fn try_acquire(&self) -> Option<AdmissionSlot> {
        let permit = self.semaphore.clone().try_acquire_owned().ok()?;
        tracing::trace!(remaining = self.available(), "Admission slot acquired");
        Some(AdmissionSlot { _permit: permit })
    }

    /// Slots currently free.
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots currently held by workers.
    pub fn in_use(&self) -> usize {
        self.capacity.saturating_sub(self.available())
    }
}
