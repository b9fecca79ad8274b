//! Throttle and debounce for bursty fix streams.
//!
//! Both are driven by the caller's clock: every call takes `now`, and a
//! debounce only fires when the host loop polls it. Nothing spawns timers.

use std::time::{Duration, Instant};

/// Leading-edge throttle gate
///
/// The first call passes and opens a window of `interval`; calls inside the
/// window are dropped (not queued). The first call after the window passes
/// and opens a new one.
#[derive(Clone, Debug)]
pub struct Throttle {
    interval: Duration,
    window_start: Option<Instant>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Throttle {
            interval,
            window_start: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// True if a call at `now` may pass
    pub fn try_acquire(&mut self, now: Instant) -> bool {
        match self.window_start {
            Some(start) if now.saturating_duration_since(start) < self.interval => false,
            _ => {
                self.window_start = Some(now);
                true
            }
        }
    }

    pub fn reset(&mut self) {
        self.window_start = None;
    }
}

/// Function wrapped in a [`Throttle`]
pub struct Throttled<F> {
    gate: Throttle,
    func: F,
}

impl<F> Throttled<F> {
    pub fn new(func: F, interval: Duration) -> Self {
        Throttled {
            gate: Throttle::new(interval),
            func,
        }
    }

    /// Invoke the function unless throttled; returns its result when it ran
    pub fn call<A, R>(&mut self, now: Instant, arg: A) -> Option<R>
    where
        F: FnMut(A) -> R,
    {
        if self.gate.try_acquire(now) {
            Some((self.func)(arg))
        } else {
            None
        }
    }
}

/// Trailing-edge debounce holding the latest value
///
/// Each call replaces the pending value and restarts the wait. The value is
/// released by [`Debouncer::poll`] once `wait` has passed since the last call.
#[derive(Clone, Debug)]
pub struct Debouncer<T> {
    wait: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(wait: Duration) -> Self {
        Debouncer {
            wait,
            pending: None,
        }
    }

    pub fn call(&mut self, now: Instant, value: T) {
        self.pending = Some((value, now + self.wait));
    }

    /// Release the pending value if its deadline has passed
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, deadline)) if now >= *deadline => self.pending.take().map(|(value, _)| value),
            _ => None,
        }
    }

    /// When the pending value will be released
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }
}

/// Function wrapped in a [`Debouncer`]
pub struct Debounced<T, F> {
    debouncer: Debouncer<T>,
    func: F,
}

impl<T, F> Debounced<T, F>
where
    F: FnMut(T),
{
    pub fn new(func: F, wait: Duration) -> Self {
        Debounced {
            debouncer: Debouncer::new(wait),
            func,
        }
    }

    pub fn call(&mut self, now: Instant, arg: T) {
        self.debouncer.call(now, arg);
    }

    /// Run the function if the wait has elapsed; true when it ran
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.debouncer.poll(now) {
            Some(arg) => {
                (self.func)(arg);
                true
            }
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_throttle_burst_invokes_once() {
        let calls = RefCell::new(Vec::new());
        let mut throttled = Throttled::new(|x: u32| calls.borrow_mut().push(x), ms(1000));
        let t0 = Instant::now();

        for (i, offset) in [0, 50, 100, 150, 200].into_iter().enumerate() {
            throttled.call(t0 + ms(offset), i as u32);
        }
        assert_eq!(*calls.borrow(), vec![0]);

        // Still inside the window
        assert!(throttled.call(t0 + ms(999), 99).is_none());
        assert_eq!(calls.borrow().len(), 1);

        // Window elapsed: next call passes and restarts the window
        assert!(throttled.call(t0 + ms(1000), 7).is_some());
        assert!(throttled.call(t0 + ms(1500), 8).is_none());
        assert!(throttled.call(t0 + ms(2000), 9).is_some());
        assert_eq!(*calls.borrow(), vec![0, 7, 9]);
    }

    #[test]
    fn test_throttled_returns_result() {
        let mut throttled = Throttled::new(|x: u32| x * 2, ms(100));
        let t0 = Instant::now();
        assert_eq!(throttled.call(t0, 21), Some(42));
        assert_eq!(throttled.call(t0 + ms(10), 1), None);
    }

    #[test]
    fn test_throttle_reset_and_backwards_clock() {
        let mut gate = Throttle::new(ms(500));
        let t0 = Instant::now() + ms(1000);
        assert!(gate.try_acquire(t0));
        // Earlier instant saturates to zero elapsed
        assert!(!gate.try_acquire(t0 - ms(100)));
        gate.reset();
        assert!(gate.try_acquire(t0 + ms(1)));
        assert_eq!(gate.interval(), ms(500));
    }

    #[test]
    fn test_debounce_burst_fires_once_after_last_call() {
        let calls = RefCell::new(Vec::new());
        let mut debounced = Debounced::new(|x: u32| calls.borrow_mut().push(x), ms(300));
        let t0 = Instant::now();

        let offsets = [0, 90, 180, 270, 360];
        for (i, offset) in offsets.into_iter().enumerate() {
            debounced.call(t0 + ms(offset), i as u32);
            assert!(!debounced.poll(t0 + ms(offset)));
        }
        assert!(calls.borrow().is_empty());

        // Polled every frame: nothing until 300 ms after the last call
        let mut now = t0 + ms(360);
        while now < t0 + ms(660) {
            assert!(!debounced.poll(now));
            now += ms(16);
        }
        assert!(debounced.poll(t0 + ms(660)));
        assert!(!debounced.poll(t0 + ms(2000)));
        assert_eq!(*calls.borrow(), vec![4]);
        assert!(!debounced.is_pending());
    }

    #[test]
    fn test_debouncer_value_api() {
        let mut debouncer = Debouncer::new(ms(100));
        let t0 = Instant::now();
        assert_eq!(debouncer.poll(t0), None);

        debouncer.call(t0, "a");
        debouncer.call(t0 + ms(50), "b");
        assert_eq!(debouncer.deadline(), Some(t0 + ms(150)));
        assert_eq!(debouncer.poll(t0 + ms(149)), None);
        assert_eq!(debouncer.poll(t0 + ms(150)), Some("b"));
        assert_eq!(debouncer.poll(t0 + ms(151)), None);

        debouncer.call(t0 + ms(200), "c");
        assert_eq!(debouncer.cancel(), Some("c"));
        assert!(!debouncer.is_pending());
    }
}
