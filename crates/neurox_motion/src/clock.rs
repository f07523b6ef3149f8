//! Frame clock
//!
//! The engine reads time from a [`Clock`] once per tick. `SystemClock` is the
//! monotonic wall clock; `ManualClock` is a shared, settable clock for
//! headless drivers and tests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// A source of monotonic time in milliseconds
pub trait Clock: Send {
    fn now_ms(&self) -> f64;
}

/// Milliseconds since the clock was created
#[derive(Clone, Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Manually advanced clock; clones share the same time
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    bits: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start_ms: f64) -> Self {
        Self {
            bits: Arc::new(AtomicU64::new(start_ms.to_bits())),
        }
    }

    pub fn set(&self, ms: f64) {
        self.bits.store(ms.to_bits(), Ordering::Release);
    }

    pub fn advance(&self, ms: f64) {
        self.set(self.now_ms() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Acquire))
    }
}

/// Lifecycle state of the engine's shared frame clock
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameClock {
    running: bool,
    frame: u64,
    last_tick_ms: Option<f64>,
}

impl FrameClock {
    /// Start the clock if it is stopped; returns `true` if it was started
    pub fn ensure_running(&mut self) -> bool {
        let started = !self.running;
        self.running = true;
        started
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.last_tick_ms = None;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Record a frame at `now_ms`, returning the new frame number
    pub fn advance(&mut self, now_ms: f64) -> u64 {
        self.frame += 1;
        self.last_tick_ms = Some(now_ms);
        self.frame
    }

    /// Frames recorded since the engine was created
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn last_tick_ms(&self) -> Option<f64> {
        self.last_tick_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_clones_share_time() {
        let clock = ManualClock::new(10.0);
        let view = clock.clone();
        clock.advance(16.5);
        assert_eq!(view.now_ms(), 26.5);
        view.set(1000.0);
        assert_eq!(clock.now_ms(), 1000.0);
    }

    #[test]
    fn test_frame_clock_lifecycle() {
        let mut clock = FrameClock::default();
        assert!(!clock.is_running());
        assert!(clock.ensure_running());
        assert!(!clock.ensure_running());

        assert_eq!(clock.advance(16.0), 1);
        assert_eq!(clock.last_tick_ms(), Some(16.0));

        clock.stop();
        assert!(!clock.is_running());
        assert_eq!(clock.last_tick_ms(), None);
        assert_eq!(clock.frame(), 1);
    }

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now_ms();
        let b = clock.now_ms();
        assert!(b >= a);
    }
}
