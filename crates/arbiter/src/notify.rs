use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::signal::Signal;

use crate::debounce::Trigger;

/// Coalescing wake-up from interrupt context to one consumer.
///
/// Holds at most one pending trigger: repeated `notify` calls before the
/// consumer wakes overwrite the slot instead of queueing. The slot is set
/// before the consumer's waker is woken, so a `notify` that precedes
/// `wait_for_trigger` is never missed.
pub struct TriggerNotifier<M: RawMutex> {
    signal: Signal<M, Trigger>,
}

impl<M: RawMutex> TriggerNotifier<M> {
    pub const fn new() -> Self {
        Self { signal: Signal::new() }
    }

    /// Never blocks, never fails.
    #[inline]
    pub fn notify(&self, trigger: Trigger) {
        self.signal.signal(trigger);
    }

    /// Suspend until a trigger is pending, then consume it.
    pub async fn wait_for_trigger(&self) -> Trigger {
        self.signal.wait().await
    }

    /// Consume a pending trigger without suspending.
    pub fn try_take(&self) -> Option<Trigger> {
        self.signal.try_take()
    }

    pub fn is_pending(&self) -> bool {
        self.signal.signaled()
    }
}

impl<M: RawMutex> Default for TriggerNotifier<M> {
    fn default() -> Self {
        Self::new()
    }
}
