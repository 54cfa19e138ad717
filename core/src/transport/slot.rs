use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

/// Capacity-1, newest-wins transport for the most recent value.
///
/// `submit` never blocks and never fails under backpressure: an
/// unconsumed value is silently displaced by the newer one. The consumer
/// is therefore never more than one value behind the fastest producer,
/// at constant memory. Cloning the slot shares the underlying cell.
pub struct FrameSlot<T> {
    inner: Arc<SlotInner<T>>,
}

struct SlotInner<T> {
    cell: Mutex<Option<T>>,
    available: Condvar,
}

impl<T> Clone for FrameSlot<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Default for FrameSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FrameSlot<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SlotInner {
                cell: Mutex::new(None),
                available: Condvar::new(),
            }),
        }
    }

    /// Stores `value`, displacing any unconsumed one. Returns whether a
    /// pending value was dropped, so callers can keep drop counters.
    pub fn submit(&self, value: T) -> bool {
        let displaced = if let Ok(mut cell) = self.inner.cell.lock() {
            cell.replace(value).is_some()
        } else {
            return false;
        };
        self.inner.available.notify_one();
        displaced
    }

    /// Returns the pending value and clears the slot, without blocking.
    pub fn try_take(&self) -> Option<T> {
        self.inner.cell.lock().ok()?.take()
    }

    /// Waits up to `timeout` for a value. Returns `None` on timeout; the
    /// bounded wait is what lets a consumer loop observe shutdown flags.
    pub fn take_timeout(&self, timeout: Duration) -> Option<T> {
        let guard = self.inner.cell.lock().ok()?;
        let (mut guard, _) = self
            .inner
            .available
            .wait_timeout_while(guard, timeout, |cell| cell.is_none())
            .ok()?;
        guard.take()
    }
}
