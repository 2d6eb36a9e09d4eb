use core::ops::{Deref, DerefMut};

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::mutex::{Mutex, MutexGuard};
use embassy_time::{with_timeout, Duration, Instant};
use portable_atomic::{AtomicBool, Ordering};

use crate::error::ArbiterError;

/// Latest potentiometer reading and when it was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorSample {
    pub value: u16,
    pub timestamp: Instant,
}

impl SensorSample {
    pub const EMPTY: Self = Self { value: 0, timestamp: Instant::from_ticks(0) };
}

impl Default for SensorSample {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// A shared value reachable only while holding its lock.
///
/// Every accessor hands out a [`RecordGuard`]; the lock is released when the
/// guard is dropped, whichever way the holder leaves its scope. The record
/// also tracks whether a guard is alive so availability can be queried with
/// [`is_held`](Self::is_held) instead of a take-then-give check.
pub struct ExclusiveRecord<M: RawMutex, T> {
    inner: Mutex<M, T>,
    held: AtomicBool,
}

impl<M: RawMutex, T> ExclusiveRecord<M, T> {
    pub const fn new(value: T) -> Self {
        Self { inner: Mutex::new(value), held: AtomicBool::new(false) }
    }

    /// Wait as long as it takes.
    pub async fn lock(&self) -> RecordGuard<'_, M, T> {
        let guard = self.inner.lock().await;
        RecordGuard::new(guard, &self.held)
    }

    /// Attempt once without suspending.
    pub fn try_lock(&self) -> Result<RecordGuard<'_, M, T>, ArbiterError> {
        self.inner
            .try_lock()
            .map(|guard| RecordGuard::new(guard, &self.held))
            .map_err(|_| ArbiterError::LockTimeout)
    }

    /// Wait at most `timeout`. A zero timeout never touches the timer.
    pub async fn lock_within(
        &self,
        timeout: Duration,
    ) -> Result<RecordGuard<'_, M, T>, ArbiterError> {
        if timeout.as_ticks() == 0 {
            return self.try_lock();
        }
        with_timeout(timeout, self.lock())
            .await
            .map_err(|_| ArbiterError::LockTimeout)
    }

    /// Run `body` with exclusive access, or return `LockTimeout` without
    /// running it if the lock is not obtained within `timeout`.
    pub async fn with_exclusive_access<F, R>(
        &self,
        timeout: Duration,
        body: F,
    ) -> Result<R, ArbiterError>
    where
        F: FnOnce(&mut T) -> R,
    {
        let mut guard = self.lock_within(timeout).await?;
        Ok(body(&mut guard))
    }

    /// Whether some context currently holds the lock. Never acquires it.
    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::Acquire)
    }
}

impl<M: RawMutex, T: Copy> ExclusiveRecord<M, T> {
    /// Copy the current value out, waiting at most `timeout`.
    pub async fn snapshot(&self, timeout: Duration) -> Result<T, ArbiterError> {
        self.with_exclusive_access(timeout, |value| *value).await
    }
}

/// RAII access to an [`ExclusiveRecord`].
pub struct RecordGuard<'a, M: RawMutex, T> {
    guard: MutexGuard<'a, M, T>,
    held: &'a AtomicBool,
}

impl<'a, M: RawMutex, T> RecordGuard<'a, M, T> {
    fn new(guard: MutexGuard<'a, M, T>, held: &'a AtomicBool) -> Self {
        held.store(true, Ordering::Release);
        Self { guard, held }
    }
}

impl<M: RawMutex, T> Deref for RecordGuard<'_, M, T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<M: RawMutex, T> DerefMut for RecordGuard<'_, M, T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}

impl<M: RawMutex, T> Drop for RecordGuard<'_, M, T> {
    fn drop(&mut self) {
        // The inner guard unlocks right after this, when the field drops.
        self.held.store(false, Ordering::Release);
    }
}
