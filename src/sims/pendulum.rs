//! Simple pendulum.
//!
//! # Governing Equations
//!
//! ```text
//! Angular acceleration: α = −(g/L)·sin θ
//! Small-angle period:   T = 2π·√(L/g)
//! Normalized energy:    E = ½ω² + (g/L)·(1 − cos θ)
//! ```
//!
//! # Integration order
//!
//! α is computed from the pre-update angle, ω is updated first and the new ω
//! moves θ (semi-implicit Euler). The order is part of the contract: it fixes
//! the energy behaviour at large Δt that the on-screen readouts reproduce.
//!
//! # Policies
//!
//! The lab view swings freely forever. The explore view multiplies ω by a
//! damping factor once per frame. Both are kept as [`PendulumPolicy`]
//! variants instead of being folded into one model.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use validator::Validate;

use super::{SimulationKind, Simulation, StepOutcome};
use crate::engine::jidoka::Inspect;
use crate::render::{Color, Readout, RenderCommand, Surface};

/// Per-frame damping applied by the explore view.
pub const EXPLORE_DAMPING: f64 = 0.998;

/// Bob radius in pixels.
const BOB_RADIUS: f64 = 15.0;

/// Half-width of the ceiling bar in pixels.
const CEILING_HALF_WIDTH: f64 = 60.0;

/// How angular velocity evolves between frames.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PendulumPolicy {
    /// No damping: oscillation persists indefinitely.
    #[default]
    Free,
    /// ω ← ω·factor once per frame after the velocity update.
    Damped {
        /// Multiplicative factor in (0, 1].
        factor: f64,
    },
}

impl PendulumPolicy {
    /// Damping used by the explore view.
    #[must_use]
    pub const fn explore() -> Self {
        Self::Damped {
            factor: EXPLORE_DAMPING,
        }
    }
}

/// Pendulum parameters (slider values).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct PendulumConfig {
    /// Rod length in centimetres (also its drawn length in pixels).
    #[validate(range(min = 50.0, max = 300.0))]
    pub length_cm: f64,
    /// Gravitational acceleration (m/s²).
    #[validate(range(min = 1.0, max = 20.0))]
    pub gravity: f64,
    /// Release angle in degrees from vertical.
    #[validate(range(min = -90.0, max = 90.0))]
    pub initial_angle_deg: f64,
    /// Damping policy.
    #[serde(default)]
    pub policy: PendulumPolicy,
    /// Pivot distance below the top edge, in pixels.
    #[serde(default = "default_pivot_y")]
    #[validate(range(min = 0.0, max = 200.0))]
    pub pivot_y: f64,
}

fn default_pivot_y() -> f64 {
    50.0
}

impl Default for PendulumConfig {
    fn default() -> Self {
        Self {
            length_cm: 150.0,
            gravity: 9.8,
            initial_angle_deg: 45.0,
            policy: PendulumPolicy::Free,
            pivot_y: default_pivot_y(),
        }
    }
}

impl PendulumConfig {
    /// Slider range for the rod length.
    pub const LENGTH_RANGE: (f64, f64) = (50.0, 300.0);
    /// Slider range for gravity.
    pub const GRAVITY_RANGE: (f64, f64) = (1.0, 20.0);
    /// Slider range for the release angle.
    pub const ANGLE_RANGE: (f64, f64) = (-90.0, 90.0);

    /// Explore-view pendulum (damped).
    #[must_use]
    pub fn explore() -> Self {
        Self {
            policy: PendulumPolicy::explore(),
            ..Self::default()
        }
    }

    /// Rod length in metres.
    #[must_use]
    pub fn length_m(&self) -> f64 {
        self.length_cm / 100.0
    }

    /// Release angle in radians.
    #[must_use]
    pub fn initial_angle_rad(&self) -> f64 {
        self.initial_angle_deg.to_radians()
    }

    /// Small-angle period T = 2π·√(L/g).
    #[must_use]
    pub fn period(&self) -> f64 {
        2.0 * PI * (self.length_m() / self.gravity).sqrt()
    }

    /// g/L, the squared natural frequency.
    #[must_use]
    pub fn omega_sq(&self) -> f64 {
        self.gravity / self.length_m()
    }
}

/// Time-varying pendulum state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PendulumState {
    /// Angle from vertical (rad).
    pub angle: f64,
    /// Angular velocity (rad/s).
    pub angular_velocity: f64,
    /// Simulated seconds since release.
    pub elapsed: f64,
}

impl PendulumState {
    /// Pendulum held at its release angle.
    #[must_use]
    pub fn released(config: &PendulumConfig) -> Self {
        Self {
            angle: config.initial_angle_rad(),
            angular_velocity: 0.0,
            elapsed: 0.0,
        }
    }
}

/// Pendulum simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct PendulumSim {
    config: PendulumConfig,
    state: PendulumState,
}

impl Default for PendulumSim {
    fn default() -> Self {
        Self::new(PendulumConfig::default())
    }
}

impl PendulumSim {
    /// Create a pendulum at its release angle.
    #[must_use]
    pub fn new(config: PendulumConfig) -> Self {
        let state = PendulumState::released(&config);
        Self { config, state }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &PendulumState {
        &self.state
    }

    /// Normalized mechanical energy ½ω² + (g/L)(1 − cos θ).
    #[must_use]
    pub fn normalized_energy(&self) -> f64 {
        0.5 * self.state.angular_velocity * self.state.angular_velocity
            + self.config.omega_sq() * (1.0 - self.state.angle.cos())
    }

    /// Bob position in canvas pixels.
    #[must_use]
    pub fn bob_position(&self, surface: &Surface) -> (f64, f64) {
        let length_px = self.config.length_cm;
        (
            surface.center_x() + length_px * self.state.angle.sin(),
            self.config.pivot_y + length_px * self.state.angle.cos(),
        )
    }
}

impl Inspect for PendulumSim {
    fn scalars(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("pendulum.angle", self.state.angle),
            ("pendulum.angular_velocity", self.state.angular_velocity),
            ("pendulum.elapsed", self.state.elapsed),
        ]
    }

    fn energy(&self) -> Option<f64> {
        match self.config.policy {
            PendulumPolicy::Free => Some(self.normalized_energy()),
            PendulumPolicy::Damped { .. } => None,
        }
    }
}

impl Simulation for PendulumSim {
    type Config = PendulumConfig;
    type State = PendulumState;

    fn kind(&self) -> SimulationKind {
        SimulationKind::Pendulum
    }

    fn config(&self) -> PendulumConfig {
        self.config.clone()
    }

    fn set_config(&mut self, config: PendulumConfig) {
        self.state = PendulumState::released(&config);
        self.config = config;
    }

    fn snapshot(&self) -> PendulumState {
        self.state
    }

    fn restore(&mut self, state: PendulumState) {
        self.state = state;
    }

    fn reset(&mut self) {
        self.state = PendulumState::released(&self.config);
    }

    fn integrate(&mut self, dt: f64) -> StepOutcome {
        let alpha = -self.config.omega_sq() * self.state.angle.sin();
        self.state.angular_velocity += alpha * dt;
        if let PendulumPolicy::Damped { factor } = self.config.policy {
            self.state.angular_velocity *= factor;
        }
        self.state.angle += self.state.angular_velocity * dt;
        self.state.elapsed += dt;
        StepOutcome::Continue
    }

    fn render(&self, surface: &Surface) -> Vec<RenderCommand> {
        let pivot = (surface.center_x(), self.config.pivot_y);
        let (bob_x, bob_y) = self.bob_position(surface);

        vec![
            RenderCommand::Clear {
                color: Color::BACKGROUND,
            },
            RenderCommand::DrawLine {
                x1: pivot.0 - CEILING_HALF_WIDTH,
                y1: pivot.1,
                x2: pivot.0 + CEILING_HALF_WIDTH,
                y2: pivot.1,
                color: Color::GRID,
                width: 4.0,
            },
            // Rest position
            RenderCommand::DrawLine {
                x1: pivot.0,
                y1: pivot.1,
                x2: pivot.0,
                y2: pivot.1 + self.config.length_cm,
                color: Color::GRID,
                width: 1.0,
            },
            RenderCommand::DrawLine {
                x1: pivot.0,
                y1: pivot.1,
                x2: bob_x,
                y2: bob_y,
                color: Color::ROD,
                width: 2.0,
            },
            RenderCommand::DrawCircle {
                x: pivot.0,
                y: pivot.1,
                radius: 4.0,
                color: Color::ROD,
                filled: true,
            },
            RenderCommand::DrawCircle {
                x: bob_x,
                y: bob_y,
                radius: BOB_RADIUS,
                color: Color::BOB,
                filled: true,
            },
            RenderCommand::DrawText {
                x: bob_x + BOB_RADIUS + 5.0,
                y: bob_y,
                text: format!("θ = {:.1}°", self.state.angle.to_degrees()),
                color: Color::LABEL,
            },
        ]
    }

    fn readouts(&self) -> Vec<Readout> {
        vec![
            Readout::new("Angle", self.state.angle.to_degrees(), "°", 1),
            Readout::new("Angular velocity", self.state.angular_velocity, "rad/s", 2),
            Readout::new("Period", self.config.period(), "s", 2),
            Readout::new("Length", self.config.length_cm, "cm", 0),
            Readout::new("Gravity", self.config.gravity, "m/s²", 1),
            Readout::new("Energy", self.normalized_energy(), "1/s²", 3),
            Readout::new("Time", self.state.elapsed, "s", 1),
        ]
    }
}
