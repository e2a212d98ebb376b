//! Timer service interface and a deterministic implementation.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// A cancellation handle for a scheduled callback.
///
/// Cancelling is idempotent: cancelling twice (or cancelling a timer that already fired) is a
/// no-op.
#[derive(Debug, Clone)]
pub struct TimerHandle {
    id: u64,
    cancelled: Arc<AtomicBool>,
}

impl TimerHandle {
    pub fn new() -> TimerHandle {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        TimerHandle {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Default for TimerHandle {
    fn default() -> Self {
        TimerHandle::new()
    }
}

impl PartialEq for TimerHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

pub type TimerCallback = Box<dyn FnMut() + Send>;

/// Schedules one-shot or periodic callbacks.
///
/// Callbacks must be delivered on the UI thread; they never run after their handle has been
/// cancelled.
pub trait TimerService {
    fn schedule(&self, delay: Duration, repeat: bool, callback: TimerCallback) -> TimerHandle;
}

struct ManualTimer {
    handle: TimerHandle,
    due: Duration,
    period: Option<Duration>,
    callback: TimerCallback,
}

/// A timer service driven by explicitly advancing a virtual clock.
///
/// Used by tests and by headless hosts.
#[derive(Default)]
pub struct ManualTimers {
    now: Mutex<Duration>,
    timers: Mutex<Vec<ManualTimer>>,
}

impl ManualTimers {
    pub fn new() -> ManualTimers {
        ManualTimers::default()
    }

    /// The current virtual time.
    pub fn now(&self) -> Duration {
        *self.now.lock()
    }

    /// Number of live (not cancelled, not finished) timers.
    pub fn pending(&self) -> usize {
        self.timers
            .lock()
            .iter()
            .filter(|timer| !timer.handle.is_cancelled())
            .count()
    }

    /// Advances the clock, firing every due callback in due order.
    pub fn advance(&self, by: Duration) {
        let target = *self.now.lock() + by;

        loop {
            let next = {
                let mut timers = self.timers.lock();
                timers.retain(|timer| !timer.handle.is_cancelled());
                let index = timers
                    .iter()
                    .enumerate()
                    .filter(|(_, timer)| timer.due <= target)
                    .min_by(|(_, a), (_, b)| a.due.cmp(&b.due))
                    .map(|(i, _)| i);
                index.map(|i| timers.remove(i))
            };

            let mut timer = match next {
                Some(timer) => timer,
                None => break,
            };

            *self.now.lock() = timer.due;
            // called without holding the lock so the callback may schedule more timers
            (timer.callback)();

            if let Some(period) = timer.period {
                if !timer.handle.is_cancelled() {
                    timer.due += period.max(Duration::from_millis(1));
                    self.timers.lock().push(timer);
                }
            }
        }

        *self.now.lock() = target;
    }
}

impl TimerService for ManualTimers {
    fn schedule(&self, delay: Duration, repeat: bool, callback: TimerCallback) -> TimerHandle {
        let handle = TimerHandle::new();
        let due = *self.now.lock() + delay;
        self.timers.lock().push(ManualTimer {
            handle: handle.clone(),
            due,
            period: if repeat { Some(delay) } else { None },
            callback,
        });
        handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_shot_fires_once() {
        let timers = ManualTimers::new();
        let count = Arc::new(Mutex::new(0));
        let c = Arc::clone(&count);
        timers.schedule(
            Duration::from_millis(10),
            false,
            Box::new(move || *c.lock() += 1),
        );

        timers.advance(Duration::from_millis(5));
        assert_eq!(*count.lock(), 0);
        timers.advance(Duration::from_millis(5));
        assert_eq!(*count.lock(), 1);
        timers.advance(Duration::from_millis(100));
        assert_eq!(*count.lock(), 1);
        assert_eq!(timers.pending(), 0);
    }

    #[test]
    fn periodic_fires_until_cancelled() {
        let timers = ManualTimers::new();
        let count = Arc::new(Mutex::new(0));
        let c = Arc::clone(&count);
        let handle = timers.schedule(
            Duration::from_millis(10),
            true,
            Box::new(move || *c.lock() += 1),
        );

        timers.advance(Duration::from_millis(35));
        assert_eq!(*count.lock(), 3);

        handle.cancel();
        handle.cancel();
        assert!(handle.is_cancelled());

        timers.advance(Duration::from_millis(100));
        assert_eq!(*count.lock(), 3);
        assert_eq!(timers.pending(), 0);
    }
}
