//! Frame timing and safety machinery shared by every simulation.
//!
//! - [`SimTime`]: fixed-point timestamps (nanoseconds) for reproducible Δt
//! - [`clock`]: injectable tick sources (wall clock, manual test clock, fixed step)
//! - [`delta`]: per-frame Δt policy (clamped or unbounded)
//! - [`jidoka`]: stop-the-frame guard against NaN/Inf state

pub mod clock;
pub mod delta;
pub mod jidoka;

use serde::{Deserialize, Serialize};

pub use clock::{FixedStepClock, ManualClock, TickSource, WallClock};
pub use delta::{DeltaPolicy, FrameDelta};
pub use jidoka::{JidokaConfig, JidokaGuard, JidokaVerdict, JidokaViolation};

/// Simulation time representation.
///
/// Internal representation is in nanoseconds so that repeated frame
/// arithmetic is exact and platform independent.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct SimTime {
    /// Time in nanoseconds from the clock origin.
    nanos: u64,
}

impl SimTime {
    /// Zero time (clock origin).
    pub const ZERO: Self = Self { nanos: 0 };

    /// Create time from seconds.
    ///
    /// Negative and non-finite inputs saturate to [`SimTime::ZERO`].
    #[must_use]
    pub fn from_secs(secs: f64) -> Self {
        if !secs.is_finite() || secs <= 0.0 {
            return Self::ZERO;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let nanos = (secs * 1_000_000_000.0) as u64;
        Self { nanos }
    }

    /// Create time from a millisecond timestamp (`performance.now()` style).
    #[must_use]
    pub fn from_millis_f64(millis: f64) -> Self {
        Self::from_secs(millis / 1_000.0)
    }

    /// Create time from nanoseconds.
    #[must_use]
    pub const fn from_nanos(nanos: u64) -> Self {
        Self { nanos }
    }

    /// Get time as seconds (f64).
    #[must_use]
    pub fn as_secs_f64(&self) -> f64 {
        self.nanos as f64 / 1_000_000_000.0
    }

    /// Get time as nanoseconds.
    #[must_use]
    pub const fn as_nanos(&self) -> u64 {
        self.nanos
    }

    /// Add duration to time.
    #[must_use]
    pub const fn add_nanos(self, nanos: u64) -> Self {
        Self {
            nanos: self.nanos.saturating_add(nanos),
        }
    }

    /// Seconds elapsed since `earlier`, zero if `earlier` is in the future.
    #[must_use]
    pub fn secs_since(self, earlier: Self) -> f64 {
        (self - earlier).as_secs_f64()
    }
}

impl std::ops::Add for SimTime {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            nanos: self.nanos.saturating_add(rhs.nanos),
        }
    }
}

impl std::ops::Sub for SimTime {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            nanos: self.nanos.saturating_sub(rhs.nanos),
        }
    }
}

impl std::fmt::Display for SimTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3}s", self.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sim_time_creation() {
        let t = SimTime::from_secs(1.5);
        assert_eq!(t.as_nanos(), 1_500_000_000);
        assert!((t.as_secs_f64() - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_sim_time_from_millis() {
        let t = SimTime::from_millis_f64(16.0);
        assert_eq!(t.as_nanos(), 16_000_000);
    }

    #[test]
    fn test_sim_time_saturates_bad_input() {
        assert_eq!(SimTime::from_secs(-1.0), SimTime::ZERO);
        assert_eq!(SimTime::from_secs(f64::NAN), SimTime::ZERO);
        assert_eq!(SimTime::from_secs(f64::INFINITY), SimTime::ZERO);
    }

    #[test]
    fn test_sim_time_arithmetic() {
        let a = SimTime::from_secs(2.0);
        let b = SimTime::from_secs(0.5);
        assert!(((a + b).as_secs_f64() - 2.5).abs() < 1e-12);
        assert!(((a - b).as_secs_f64() - 1.5).abs() < 1e-12);
        assert_eq!(b - a, SimTime::ZERO);
    }

    #[test]
    fn test_sim_time_secs_since() {
        let earlier = SimTime::from_secs(1.0);
        let later = SimTime::from_secs(1.25);
        assert!((later.secs_since(earlier) - 0.25).abs() < 1e-12);
        assert!(earlier.secs_since(later).abs() < f64::EPSILON);
    }

    #[test]
    fn test_sim_time_display() {
        assert_eq!(SimTime::from_secs(2.0).to_string(), "2.000s");
    }
}
