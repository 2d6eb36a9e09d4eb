use portable_atomic::{AtomicUsize, Ordering};

use crate::error::ArbiterError;

/// Counting token pool bounding how many holders may be active at once.
///
/// `available` never leaves `0..=capacity`: acquisition is a single
/// compare-and-swap that refuses to go below zero, and tokens can only be
/// returned through a [`Permit`] obtained from this pool. Whoever wins the
/// compare-and-swap gets the token; there is no fairness between callers and
/// a caller that keeps losing the race can starve.
pub struct ResourcePool {
    capacity: usize,
    available: AtomicUsize,
}

impl ResourcePool {
    pub const fn new(capacity: usize) -> Self {
        Self { capacity, available: AtomicUsize::new(capacity) }
    }

    /// Take a token without blocking.
    ///
    /// On failure nothing changes and `ResourceExhausted` is returned.
    pub fn try_acquire(&self) -> Result<Permit<'_>, ArbiterError> {
        self.available
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                n.checked_sub(1)
            })
            .map(|_| Permit { pool: self })
            .map_err(|_| ArbiterError::ResourceExhausted)
    }

    /// Return a token. Equivalent to dropping the permit.
    pub fn release(&self, permit: Permit<'_>) {
        debug_assert!(core::ptr::eq(permit.pool, self));
        drop(permit);
    }

    pub fn available(&self) -> usize {
        self.available.load(Ordering::Acquire)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of outstanding permits.
    pub fn in_use(&self) -> usize {
        self.capacity - self.available()
    }

    fn give_back(&self) {
        // Saturates at capacity.
        let _ = self.available.fetch_update(
            Ordering::AcqRel,
            Ordering::Acquire,
            |n| (n < self.capacity).then_some(n + 1),
        );
    }
}

/// Proof of a successful [`ResourcePool::try_acquire`].
///
/// The token goes back to the pool when the permit is released or dropped,
/// so a release without a matching acquire cannot be written.
#[must_use = "dropping a permit releases it immediately"]
pub struct Permit<'a> {
    pool: &'a ResourcePool,
}

impl Permit<'_> {
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        self.pool.give_back();
    }
}

impl core::fmt::Debug for Permit<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Permit")
            .field("available", &self.pool.available())
            .finish()
    }
}
