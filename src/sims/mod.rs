//! Virtual lab simulations.
//!
//! Each simulation owns its configuration (the slider values) and its
//! time-varying state, and exposes three pure-ish steps to the animation
//! driver:
//!
//! 1. **Integrate** - advance state by Δt seconds
//! 2. **Render** - map state to [`RenderCommand`]s for a fixed [`Surface`]
//! 3. **Readouts** - fixed-precision numeric values for display
//!
//! # Simulations
//!
//! 1. [`pendulum`] - explicit Euler on θ'' = −(g/L)·sin θ, free or damped
//! 2. [`projectile`] - closed-form kinematics with ground-contact stop
//! 3. [`wave`] - sine/square waveform sampled across the canvas

pub mod pendulum;
pub mod projectile;
pub mod wave;

use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};
use std::str::FromStr;

use crate::engine::jidoka::Inspect;
use crate::error::{LabError, LabResult};
use crate::render::{Readout, RenderCommand, Surface};

pub use pendulum::{PendulumConfig, PendulumPolicy, PendulumSim, PendulumState};
pub use projectile::{FlightTimePolicy, ProjectileConfig, ProjectileSim, ProjectileState};
pub use wave::{WaveConfig, WaveSim, WaveState, WaveType};

/// Result of one integration step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepOutcome {
    /// Keep animating.
    Continue,
    /// Simulation reached its terminal condition (e.g. projectile landed).
    Finished,
}

/// Common interface for all lab simulations.
pub trait Simulation: Inspect {
    /// User-settable parameters.
    type Config: Clone + PartialEq + Debug + Serialize;
    /// Time-varying physical state.
    type State: Clone + PartialEq + Debug + Serialize;

    /// Which simulation this is.
    fn kind(&self) -> SimulationKind;

    /// Copy of the current configuration.
    fn config(&self) -> Self::Config;

    /// Replace the configuration and reinitialise state from it.
    fn set_config(&mut self, config: Self::Config);

    /// Copy of the current state.
    fn snapshot(&self) -> Self::State;

    /// Overwrite the state (used to roll back a rejected frame).
    fn restore(&mut self, state: Self::State);

    /// Reinitialise state from the current configuration.
    fn reset(&mut self);

    /// Advance the simulation by `dt` seconds.
    fn integrate(&mut self, dt: f64) -> StepOutcome;

    /// Whether the terminal condition has been reached.
    fn is_finished(&self) -> bool {
        false
    }

    /// Drawing primitives for the current state.
    fn render(&self, surface: &Surface) -> Vec<RenderCommand>;

    /// Numeric readouts for the current configuration and state.
    fn readouts(&self) -> Vec<Readout>;
}

/// Simulation selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimulationKind {
    Pendulum,
    Projectile,
    Wave,
}

impl SimulationKind {
    /// All simulations in menu order.
    pub const ALL: [Self; 3] = [Self::Pendulum, Self::Projectile, Self::Wave];

    /// Lowercase name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pendulum => "pendulum",
            Self::Projectile => "projectile",
            Self::Wave => "wave",
        }
    }
}

impl fmt::Display for SimulationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SimulationKind {
    type Err = LabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pendulum" => Ok(Self::Pendulum),
            "projectile" => Ok(Self::Projectile),
            "wave" => Ok(Self::Wave),
            other => Err(LabError::UnknownSimulation(other.to_string())),
        }
    }
}

/// Configuration of any simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AnyConfig {
    Pendulum(PendulumConfig),
    Projectile(ProjectileConfig),
    Wave(WaveConfig),
}

/// State of any simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AnyState {
    Pendulum(PendulumState),
    Projectile(ProjectileState),
    Wave(WaveState),
}

/// One user-adjustable numeric parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slider {
    /// Field name, as in YAML.
    pub name: &'static str,
    /// Display label.
    pub label: &'static str,
    /// Lower bound.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
    /// Increment per keypress or slider notch.
    pub step: f64,
}

impl Slider {
    const fn new(name: &'static str, label: &'static str, range: (f64, f64), step: f64) -> Self {
        Self {
            name,
            label,
            min: range.0,
            max: range.1,
            step,
        }
    }
}

const PENDULUM_SLIDERS: [Slider; 3] = [
    Slider::new("length_cm", "Length (cm)", PendulumConfig::LENGTH_RANGE, 1.0),
    Slider::new("gravity", "Gravity (m/s²)", PendulumConfig::GRAVITY_RANGE, 0.1),
    Slider::new("initial_angle_deg", "Angle (°)", PendulumConfig::ANGLE_RANGE, 1.0),
];

const PROJECTILE_SLIDERS: [Slider; 4] = [
    Slider::new("velocity", "Velocity (m/s)", ProjectileConfig::VELOCITY_RANGE, 1.0),
    Slider::new("angle_deg", "Angle (°)", ProjectileConfig::ANGLE_RANGE, 1.0),
    Slider::new("gravity", "Gravity (m/s²)", ProjectileConfig::GRAVITY_RANGE, 0.1),
    Slider::new("height", "Height (m)", ProjectileConfig::HEIGHT_RANGE, 1.0),
];

const WAVE_SLIDERS: [Slider; 2] = [
    Slider::new("amplitude", "Amplitude (px)", WaveConfig::AMPLITUDE_RANGE, 1.0),
    Slider::new("frequency", "Frequency (Hz)", WaveConfig::FREQUENCY_RANGE, 0.1),
];

impl AnyConfig {
    /// Which simulation this configures.
    #[must_use]
    pub const fn kind(&self) -> SimulationKind {
        match self {
            Self::Pendulum(_) => SimulationKind::Pendulum,
            Self::Projectile(_) => SimulationKind::Projectile,
            Self::Wave(_) => SimulationKind::Wave,
        }
    }

    /// Numeric sliders exposed for this simulation.
    #[must_use]
    pub fn sliders(&self) -> &'static [Slider] {
        match self {
            Self::Pendulum(_) => &PENDULUM_SLIDERS,
            Self::Projectile(_) => &PROJECTILE_SLIDERS,
            Self::Wave(_) => &WAVE_SLIDERS,
        }
    }

    /// Current value of a slider parameter.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<f64> {
        match (self, name) {
            (Self::Pendulum(c), "length_cm") => Some(c.length_cm),
            (Self::Pendulum(c), "gravity") => Some(c.gravity),
            (Self::Pendulum(c), "initial_angle_deg") => Some(c.initial_angle_deg),
            (Self::Projectile(c), "velocity") => Some(c.velocity),
            (Self::Projectile(c), "angle_deg") => Some(c.angle_deg),
            (Self::Projectile(c), "gravity") => Some(c.gravity),
            (Self::Projectile(c), "height") => Some(c.height),
            (Self::Wave(c), "amplitude") => Some(c.amplitude),
            (Self::Wave(c), "frequency") => Some(c.frequency),
            _ => None,
        }
    }

    /// Copy with one slider parameter changed, clamped to the slider range.
    ///
    /// # Errors
    ///
    /// Returns `LabError::Config` for an unknown parameter or a non-finite value.
    pub fn with_param(&self, name: &str, value: f64) -> LabResult<Self> {
        let Some(slider) = self.sliders().iter().find(|s| s.name == name) else {
            return Err(LabError::config(format!(
                "{} has no parameter '{name}'",
                self.kind()
            )));
        };
        if !value.is_finite() {
            return Err(LabError::config(format!("{name} must be finite, got {value}")));
        }
        let value = value.clamp(slider.min, slider.max);

        let mut next = self.clone();
        match (&mut next, name) {
            (Self::Pendulum(c), "length_cm") => c.length_cm = value,
            (Self::Pendulum(c), "gravity") => c.gravity = value,
            (Self::Pendulum(c), "initial_angle_deg") => c.initial_angle_deg = value,
            (Self::Projectile(c), "velocity") => c.velocity = value,
            (Self::Projectile(c), "angle_deg") => c.angle_deg = value,
            (Self::Projectile(c), "gravity") => c.gravity = value,
            (Self::Projectile(c), "height") => c.height = value,
            (Self::Wave(c), "amplitude") => c.amplitude = value,
            (Self::Wave(c), "frequency") => c.frequency = value,
            _ => {}
        }
        Ok(next)
    }

    /// Copy with a slider moved by `notches` steps.
    ///
    /// # Errors
    ///
    /// Returns `LabError::Config` for an unknown parameter.
    pub fn nudge(&self, name: &str, notches: i32) -> LabResult<Self> {
        let slider = self
            .sliders()
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| LabError::config(format!("{} has no parameter '{name}'", self.kind())))?;
        let current = self.param(name).unwrap_or(slider.min);
        // Round to the slider grid so repeated nudges do not accumulate error.
        let raw = current + f64::from(notches) * slider.step;
        let snapped = (raw / slider.step).round() * slider.step;
        self.with_param(name, snapped)
    }
}

/// Runtime-selected simulation, used by hosts that switch between views.
#[derive(Debug, Clone, PartialEq)]
pub enum AnySimulation {
    Pendulum(PendulumSim),
    Projectile(ProjectileSim),
    Wave(WaveSim),
}

impl AnySimulation {
    /// Build a simulation from its configuration.
    #[must_use]
    pub fn from_config(config: AnyConfig) -> Self {
        match config {
            AnyConfig::Pendulum(c) => Self::Pendulum(PendulumSim::new(c)),
            AnyConfig::Projectile(c) => Self::Projectile(ProjectileSim::new(c)),
            AnyConfig::Wave(c) => Self::Wave(WaveSim::new(c)),
        }
    }

    /// Simulation with default parameters.
    #[must_use]
    pub fn default_for(kind: SimulationKind) -> Self {
        match kind {
            SimulationKind::Pendulum => Self::Pendulum(PendulumSim::default()),
            SimulationKind::Projectile => Self::Projectile(ProjectileSim::default()),
            SimulationKind::Wave => Self::Wave(WaveSim::default()),
        }
    }
}

macro_rules! dispatch {
    ($self:expr, $sim:ident => $body:expr) => {
        match $self {
            AnySimulation::Pendulum($sim) => $body,
            AnySimulation::Projectile($sim) => $body,
            AnySimulation::Wave($sim) => $body,
        }
    };
}

impl Inspect for AnySimulation {
    fn scalars(&self) -> Vec<(&'static str, f64)> {
        dispatch!(self, sim => sim.scalars())
    }

    fn energy(&self) -> Option<f64> {
        dispatch!(self, sim => sim.energy())
    }
}

impl Simulation for AnySimulation {
    type Config = AnyConfig;
    type State = AnyState;

    fn kind(&self) -> SimulationKind {
        dispatch!(self, sim => sim.kind())
    }

    fn config(&self) -> Self::Config {
        match self {
            Self::Pendulum(sim) => AnyConfig::Pendulum(sim.config()),
            Self::Projectile(sim) => AnyConfig::Projectile(sim.config()),
            Self::Wave(sim) => AnyConfig::Wave(sim.config()),
        }
    }

    fn set_config(&mut self, config: Self::Config) {
        *self = Self::from_config(config);
    }

    fn snapshot(&self) -> Self::State {
        match self {
            Self::Pendulum(sim) => AnyState::Pendulum(sim.snapshot()),
            Self::Projectile(sim) => AnyState::Projectile(sim.snapshot()),
            Self::Wave(sim) => AnyState::Wave(sim.snapshot()),
        }
    }

    fn restore(&mut self, state: Self::State) {
        match (self, state) {
            (Self::Pendulum(sim), AnyState::Pendulum(s)) => sim.restore(s),
            (Self::Projectile(sim), AnyState::Projectile(s)) => sim.restore(s),
            (Self::Wave(sim), AnyState::Wave(s)) => sim.restore(s),
            (sim, state) => {
                tracing::warn!(kind = %sim.kind(), ?state, "ignoring restore of mismatched state");
            }
        }
    }

    fn reset(&mut self) {
        dispatch!(self, sim => sim.reset());
    }

    fn integrate(&mut self, dt: f64) -> StepOutcome {
        dispatch!(self, sim => sim.integrate(dt))
    }

    fn is_finished(&self) -> bool {
        dispatch!(self, sim => sim.is_finished())
    }

    fn render(&self, surface: &Surface) -> Vec<RenderCommand> {
        dispatch!(self, sim => sim.render(surface))
    }

    fn readouts(&self) -> Vec<Readout> {
        dispatch!(self, sim => sim.readouts())
    }
}
