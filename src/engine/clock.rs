//! Tick sources.
//!
//! The animation driver never reads a platform timer directly. It asks a
//! [`TickSource`] for "now" once when it starts and once per frame, so the
//! same driver runs against:
//! - [`WallClock`]: monotonic host time (`std::time::Instant`)
//! - [`ManualClock`]: advanced explicitly by tests
//! - [`FixedStepClock`]: advances by one fixed frame interval per read
//!
//! The browser host adds a `performance.now()` clock in `web`.

use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::engine::SimTime;

/// Source of frame timestamps.
pub trait TickSource {
    /// Current timestamp. Must be monotonically non-decreasing.
    fn now(&mut self) -> SimTime;
}

/// Monotonic wall clock measured from construction.
#[derive(Debug, Clone, Copy)]
pub struct WallClock {
    origin: Instant,
}

impl WallClock {
    /// Create a wall clock whose origin is the current instant.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TickSource for WallClock {
    fn now(&mut self) -> SimTime {
        let elapsed = self.origin.elapsed();
        SimTime::from_nanos(elapsed.as_nanos() as u64)
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualClock {
    current: SimTime,
}

impl ManualClock {
    /// Create a manual clock at time zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            current: SimTime::ZERO,
        }
    }

    /// Advance by a number of seconds.
    pub fn advance_secs(&mut self, secs: f64) {
        self.current = self.current + SimTime::from_secs(secs);
    }

    /// Jump to an absolute time. Times earlier than the current one are ignored.
    pub fn set(&mut self, time: SimTime) {
        if time > self.current {
            self.current = time;
        }
    }

    /// Current time without advancing.
    #[must_use]
    pub const fn current(&self) -> SimTime {
        self.current
    }
}

impl TickSource for ManualClock {
    fn now(&mut self) -> SimTime {
        self.current
    }
}

/// Clock that advances by a fixed interval every time it is read.
///
/// The first read returns the origin; each later read returns one interval
/// further, which models a host delivering frames at a steady refresh rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixedStepClock {
    /// Current simulation time.
    current: SimTime,
    /// Interval in nanoseconds.
    interval_nanos: u64,
    /// Number of reads served.
    reads: u64,
}

impl FixedStepClock {
    /// Create a clock with the given interval in seconds.
    ///
    /// Non-positive or non-finite intervals produce a clock that never advances.
    #[must_use]
    pub fn new(interval_secs: f64) -> Self {
        Self {
            current: SimTime::ZERO,
            interval_nanos: SimTime::from_secs(interval_secs).as_nanos(),
            reads: 0,
        }
    }

    /// Create a clock delivering `fps` frames per second.
    #[must_use]
    pub fn from_fps(fps: u32) -> Self {
        if fps == 0 {
            return Self::new(0.0);
        }
        Self::new(1.0 / f64::from(fps))
    }

    /// Interval as seconds.
    #[must_use]
    pub fn interval_secs(&self) -> f64 {
        self.interval_nanos as f64 / 1_000_000_000.0
    }

    /// Number of timestamps served so far.
    #[must_use]
    pub const fn reads(&self) -> u64 {
        self.reads
    }
}

impl TickSource for FixedStepClock {
    fn now(&mut self) -> SimTime {
        if self.reads > 0 {
            self.current = self.current.add_nanos(self.interval_nanos);
        }
        self.reads += 1;
        self.current
    }
}
