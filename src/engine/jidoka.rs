//! Jidoka (自働化) - stop the bad frame before it reaches the canvas.
//!
//! After every integration step the driver hands the new state to the guard:
//!
//! 1. **Non-finite values**: any NaN or Inf freezes the frame. The driver
//!    restores the last good state and keeps showing the last good picture.
//! 2. **Energy drift** (optional): for simulations that expose a conserved
//!    quantity, drift from the value seen at start is classified with
//!    graduated severity and reported, never used to stop the loop.
//!
//! Neither check exists in the browser original, where a NaN silently
//! rendered nothing.

use serde::{Deserialize, Serialize};


/// Severity levels for energy drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ViolationSeverity {
    /// Within tolerance.
    Acceptable,
    /// Approaching tolerance.
    Warning,
    /// Tolerance exceeded.
    Critical,
}

/// Classifier for graduated drift responses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeverityClassifier {
    /// Warning threshold as fraction of tolerance (e.g., 0.8 = warn at 80%).
    pub warning_fraction: f64,
}

impl Default for SeverityClassifier {
    fn default() -> Self {
        Self {
            warning_fraction: 0.8,
        }
    }
}

impl SeverityClassifier {
    /// Classify relative drift against a tolerance.
    #[must_use]
    pub fn classify(&self, drift: f64, tolerance: f64) -> ViolationSeverity {
        if drift > tolerance {
            ViolationSeverity::Critical
        } else if drift > tolerance * self.warning_fraction {
            ViolationSeverity::Warning
        } else {
            ViolationSeverity::Acceptable
        }
    }
}

/// State that can be inspected by the guard.
pub trait Inspect {
    /// Every scalar of the state, labelled for diagnostics.
    fn scalars(&self) -> Vec<(&'static str, f64)>;

    /// Conserved quantity to monitor, if the model has one.
    fn energy(&self) -> Option<f64> {
        None
    }
}

/// Reason a frame was frozen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JidokaViolation {
    /// Non-finite value (NaN or Inf) detected.
    NonFiniteValue {
        /// Location of the non-finite value (e.g., "pendulum.angle").
        location: String,
        /// The non-finite value itself.
        value: f64,
    },
}

/// Outcome of inspecting one frame.
#[derive(Debug, Clone, PartialEq)]
pub enum JidokaVerdict {
    /// State is fine.
    Continue,
    /// Conserved quantity drifted; the frame is still accepted.
    Drifting {
        /// Relative drift from the reference energy.
        drift: f64,
        /// Graduated severity.
        severity: ViolationSeverity,
    },
    /// Frame must be dropped and the previous state restored.
    Freeze(JidokaViolation),
}

/// Jidoka guard configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JidokaConfig {
    /// NaN/Inf detection enabled.
    pub check_finite: bool,
    /// Relative energy drift tolerance; `None` disables drift monitoring.
    #[serde(default)]
    pub energy_tolerance: Option<f64>,
    /// Severity classifier for graduated responses.
    #[serde(default)]
    pub severity_classifier: SeverityClassifier,
}

impl Default for JidokaConfig {
    fn default() -> Self {
        Self {
            check_finite: true,
            energy_tolerance: None,
            severity_classifier: SeverityClassifier::default(),
        }
    }
}

/// Per-frame anomaly guard.
#[derive(Debug, Clone)]
pub struct JidokaGuard {
    config: JidokaConfig,
    reference_energy: Option<f64>,
}

impl JidokaGuard {
    /// Create a new guard.
    #[must_use]
    pub const fn new(config: JidokaConfig) -> Self {
        Self {
            config,
            reference_energy: None,
        }
    }

    /// Record the reference energy from the state the run starts with.
    pub fn arm<S: Inspect + ?Sized>(&mut self, state: &S) {
        self.reference_energy = state.energy().filter(|e| e.is_finite());
    }

    /// Forget the reference energy.
    pub fn reset(&mut self) {
        self.reference_energy = None;
    }

    /// Get current configuration.
    #[must_use]
    pub const fn config(&self) -> &JidokaConfig {
        &self.config
    }

    /// Inspect a freshly integrated state.
    pub fn check<S: Inspect + ?Sized>(&mut self, state: &S) -> JidokaVerdict {
        if self.config.check_finite {
            if let Some((location, value)) =
                state.scalars().into_iter().find(|(_, v)| !v.is_finite())
            {
                return JidokaVerdict::Freeze(JidokaViolation::NonFiniteValue {
                    location: location.to_string(),
                    value,
                });
            }
        }

        let Some(tolerance) = self.config.energy_tolerance else {
            return JidokaVerdict::Continue;
        };
        let (Some(reference), Some(current)) = (self.reference_energy, state.energy()) else {
            return JidokaVerdict::Continue;
        };
        if reference.abs() < f64::EPSILON {
            return JidokaVerdict::Continue;
        }

        let drift = (current - reference).abs() / reference.abs();
        match self.config.severity_classifier.classify(drift, tolerance) {
            ViolationSeverity::Acceptable => JidokaVerdict::Continue,
            severity => JidokaVerdict::Drifting { drift, severity },
        }
    }
}

impl Default for JidokaGuard {
    fn default() -> Self {
        Self::new(JidokaConfig::default())
    }
}
