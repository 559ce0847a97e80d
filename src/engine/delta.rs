//! Per-frame Δt policy.
//!
//! The browser stops delivering frames while a tab is in the background, so
//! the first frame after it returns can carry a Δt of many seconds. One
//! oversized explicit-Euler step is enough to throw a pendulum over the top.
//! [`DeltaPolicy::Clamped`] bounds every step; [`DeltaPolicy::Unclamped`]
//! passes the raw value through for reproducing unbounded frame stalls.

use serde::{Deserialize, Serialize};

/// Default clamp: one frame at 30 fps.
pub const DEFAULT_MAX_DT: f64 = 1.0 / 30.0;

/// How the raw wall-clock delta becomes the integration step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DeltaPolicy {
    /// Clamp Δt into `[0, max_secs]`.
    Clamped {
        /// Largest step handed to an integrator.
        max_secs: f64,
    },
    /// Pass Δt through unchanged (negative values still become zero).
    Unclamped,
}

impl Default for DeltaPolicy {
    fn default() -> Self {
        Self::Clamped {
            max_secs: DEFAULT_MAX_DT,
        }
    }
}

/// Effective step computed from a raw frame delta.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameDelta {
    /// Step handed to the integrator.
    pub dt: f64,
    /// Raw wall-clock delta.
    pub raw: f64,
}

impl FrameDelta {
    /// Whether the policy shortened this step.
    #[must_use]
    pub fn was_clamped(&self) -> bool {
        self.dt < self.raw
    }
}

impl DeltaPolicy {
    /// Apply the policy to a raw delta in seconds.
    #[must_use]
    pub fn apply(&self, raw: f64) -> FrameDelta {
        let non_negative = if raw.is_nan() { 0.0 } else { raw.max(0.0) };
        let dt = match *self {
            Self::Clamped { max_secs } => non_negative.min(max_secs.max(0.0)),
            Self::Unclamped => non_negative,
        };
        FrameDelta { dt, raw }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_is_clamped() {
        assert_eq!(
            DeltaPolicy::default(),
            DeltaPolicy::Clamped {
                max_secs: DEFAULT_MAX_DT
            }
        );
    }

    #[test]
    fn test_clamped_passes_small_deltas() {
        let delta = DeltaPolicy::default().apply(1.0 / 60.0);
        assert!((delta.dt - 1.0 / 60.0).abs() < 1e-15);
        assert!(!delta.was_clamped());
    }

    #[test]
    fn test_clamped_bounds_stalls() {
        let delta = DeltaPolicy::default().apply(5.0);
        assert!((delta.dt - DEFAULT_MAX_DT).abs() < 1e-15);
        assert!(delta.was_clamped());
    }

    #[test]
    fn test_unclamped_keeps_stalls() {
        let delta = DeltaPolicy::Unclamped.apply(5.0);
        assert!((delta.dt - 5.0).abs() < 1e-15);
        assert!(!delta.was_clamped());
    }

    #[test]
    fn test_negative_and_nan_become_zero() {
        assert!(DeltaPolicy::Unclamped.apply(-0.1).dt.abs() < f64::EPSILON);
        assert!(DeltaPolicy::default().apply(f64::NAN).dt.abs() < f64::EPSILON);
    }

    #[test]
    fn test_policy_yaml() {
        let policy: DeltaPolicy = serde_yaml::from_str("mode: clamped\nmax_secs: 0.05\n")
            .expect("deserialize");
        assert_eq!(policy, DeltaPolicy::Clamped { max_secs: 0.05 });

        let policy: DeltaPolicy = serde_yaml::from_str("mode: unclamped\n").expect("deserialize");
        assert_eq!(policy, DeltaPolicy::Unclamped);
    }
}
