//! Travelling waveform.
//!
//! ```text
//! Phase:   φ ← φ + 2π·f·Δt
//! Sine:    y = centre − A·sin(2π·x/λ + φ)
//! Square:  y = centre − A·sign(sin(2π·x/λ + φ))
//! ```
//!
//! The sample set is regenerated from scratch every frame. Its size depends
//! only on the surface width and `sample_step`, so the cost per frame is
//! bounded.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use validator::Validate;

use super::{Simulation, SimulationKind, StepOutcome};
use crate::engine::jidoka::Inspect;
use crate::render::{Color, Readout, RenderCommand, Surface};

/// Waveform shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaveType {
    #[default]
    Sine,
    Square,
}

impl WaveType {
    /// Shape function applied to the oscillation argument, in [-1, 1].
    #[must_use]
    pub fn shape(self, argument: f64) -> f64 {
        let s = argument.sin();
        match self {
            Self::Sine => s,
            Self::Square => {
                if s > 0.0 {
                    1.0
                } else if s < 0.0 {
                    -1.0
                } else {
                    0.0
                }
            }
        }
    }
}

/// Wave parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct WaveConfig {
    /// Peak displacement in pixels.
    #[validate(range(min = 10.0, max = 150.0))]
    pub amplitude: f64,
    /// Frequency in Hz.
    #[validate(range(min = 0.1, max = 5.0))]
    pub frequency: f64,
    /// Waveform shape.
    #[serde(default)]
    pub wave_type: WaveType,
    /// Spatial period in pixels.
    #[serde(default = "default_wavelength")]
    #[validate(range(min = 10.0, max = 2000.0))]
    pub wavelength: f64,
    /// Horizontal distance between samples in pixels.
    #[serde(default = "default_sample_step")]
    #[validate(range(min = 0.5, max = 50.0))]
    pub sample_step: f64,
}

/// Upper bound on points per frame, whatever the surface and step.
const MAX_SAMPLES: f64 = 65_536.0;

fn default_wavelength() -> f64 {
    200.0
}

fn default_sample_step() -> f64 {
    2.0
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            amplitude: 50.0,
            frequency: 1.0,
            wave_type: WaveType::Sine,
            wavelength: default_wavelength(),
            sample_step: default_sample_step(),
        }
    }
}

impl WaveConfig {
    /// Slider range for amplitude.
    pub const AMPLITUDE_RANGE: (f64, f64) = (10.0, 150.0);
    /// Slider range for frequency.
    pub const FREQUENCY_RANGE: (f64, f64) = (0.1, 5.0);

    /// Temporal period (s).
    #[must_use]
    pub fn period(&self) -> f64 {
        1.0 / self.frequency
    }

    /// Angular frequency ω = 2πf.
    #[must_use]
    pub fn angular_frequency(&self) -> f64 {
        2.0 * PI * self.frequency
    }
}

/// Time-varying wave state.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WaveState {
    /// Accumulated phase (rad), never wrapped.
    pub phase: f64,
    /// Seconds animated.
    pub elapsed: f64,
}

/// Wave simulation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WaveSim {
    config: WaveConfig,
    state: WaveState,
}

impl WaveSim {
    /// Create a wave at zero phase.
    #[must_use]
    pub fn new(config: WaveConfig) -> Self {
        Self {
            config,
            state: WaveState::default(),
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &WaveState {
        &self.state
    }

    /// Displacement from the centre line at horizontal position `x`.
    #[must_use]
    pub fn displacement(&self, x: f64) -> f64 {
        let argument = 2.0 * PI * x / self.config.wavelength + self.state.phase;
        self.config.amplitude * self.config.wave_type.shape(argument)
    }

    /// Sample points across the surface width in canvas pixels.
    #[must_use]
    pub fn samples(&self, surface: &Surface) -> Vec<(f64, f64)> {
        let step = self.config.sample_step;
        if !(step > 0.0 && surface.width >= 0.0 && surface.width.is_finite()) {
            return Vec::new();
        }
        let count = (surface.width / step).floor().min(MAX_SAMPLES) as usize;
        let centre = surface.center_y();
        (0..=count)
            .map(|i| {
                let x = i as f64 * step;
                (x, centre - self.displacement(x))
            })
            .collect()
    }
}

impl Inspect for WaveSim {
    fn scalars(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("wave.phase", self.state.phase),
            ("wave.elapsed", self.state.elapsed),
        ]
    }
}

impl Simulation for WaveSim {
    type Config = WaveConfig;
    type State = WaveState;

    fn kind(&self) -> SimulationKind {
        SimulationKind::Wave
    }

    fn config(&self) -> WaveConfig {
        self.config.clone()
    }

    fn set_config(&mut self, config: WaveConfig) {
        self.config = config;
        self.state = WaveState::default();
    }

    fn snapshot(&self) -> WaveState {
        self.state
    }

    fn restore(&mut self, state: WaveState) {
        self.state = state;
    }

    fn reset(&mut self) {
        self.state = WaveState::default();
    }

    fn integrate(&mut self, dt: f64) -> StepOutcome {
        self.state.phase += self.config.angular_frequency() * dt;
        self.state.elapsed += dt;
        StepOutcome::Continue
    }

    fn render(&self, surface: &Surface) -> Vec<RenderCommand> {
        let centre = surface.center_y();
        let amplitude = self.config.amplitude;

        let mut commands = vec![
            RenderCommand::Clear {
                color: Color::BACKGROUND,
            },
            RenderCommand::DrawLine {
                x1: 0.0,
                y1: centre,
                x2: surface.width,
                y2: centre,
                color: Color::GRID,
                width: 1.0,
            },
        ];

        for guide in [centre - amplitude, centre + amplitude] {
            commands.push(RenderCommand::DrawLine {
                x1: 0.0,
                y1: guide,
                x2: surface.width,
                y2: guide,
                color: Color::GRID,
                width: 0.5,
            });
        }

        commands.push(RenderCommand::DrawPolyline {
            points: self.samples(surface),
            color: Color::WAVE,
            width: 2.0,
        });
        commands.push(RenderCommand::DrawText {
            x: 10.0,
            y: 20.0,
            text: format!(
                "{} wave   A = {:.0} px   f = {:.1} Hz",
                match self.config.wave_type {
                    WaveType::Sine => "Sine",
                    WaveType::Square => "Square",
                },
                amplitude,
                self.config.frequency
            ),
            color: Color::LABEL,
        });

        commands
    }

    fn readouts(&self) -> Vec<Readout> {
        vec![
            Readout::new("Amplitude", self.config.amplitude, "px", 0),
            Readout::new("Frequency", self.config.frequency, "Hz", 1),
            Readout::new("Wavelength", self.config.wavelength, "px", 0),
            Readout::new("Period", self.config.period(), "s", 2),
            Readout::new("Phase", self.state.phase, "rad", 2),
            Readout::new("Time", self.state.elapsed, "s", 1),
        ]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::render::readout::find;

    #[test]
    fn test_phase_advances_by_two_pi_f_dt() {
        let mut sim = WaveSim::new(WaveConfig {
            frequency: 2.0,
            ..WaveConfig::default()
        });
        sim.integrate(0.25);
        assert!((sim.state().phase - PI).abs() < 1e-12);
        assert!((sim.state().elapsed - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_sample_count_covers_width() {
        let sim = WaveSim::default();
        let samples = sim.samples(&Surface::new(800.0, 400.0));
        assert_eq!(samples.len(), 401);
        assert!(samples[0].0.abs() < f64::EPSILON);
        assert!((samples[400].0 - 800.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_samples_bounded_for_oversized_surface() {
        let sim = WaveSim::default();
        let samples = sim.samples(&Surface::new(1.0e300, 400.0));
        assert_eq!(samples.len(), MAX_SAMPLES as usize + 1);
        assert!(sim.samples(&Surface::new(f64::INFINITY, 400.0)).is_empty());
        assert!(sim.samples(&Surface::new(f64::NAN, 400.0)).is_empty());
    }

    #[test]
    fn test_sine_at_zero_phase() {
        let sim = WaveSim::default();
        let samples = sim.samples(&Surface::default());
        // x = 50 is a quarter wavelength: sin = 1, so y = centre − A.
        let (x, y) = samples[25];
        assert!((x - 50.0).abs() < f64::EPSILON);
        assert!((y - 150.0).abs() < 1e-9);
    }

    #[test]
    fn test_square_levels() {
        let sim = WaveSim::new(WaveConfig {
            wave_type: WaveType::Square,
            ..WaveConfig::default()
        });
        let samples = sim.samples(&Surface::default());
        assert!((samples[0].1 - 200.0).abs() < f64::EPSILON, "sign(0) = 0");
        for &(_, y) in &samples {
            let d = (y - 200.0).abs();
            assert!(d < 1e-9 || (d - 50.0).abs() < 1e-9, "y={y}");
        }
    }

    #[test]
    fn test_square_shape_sign() {
        assert!((WaveType::Square.shape(1.0) - 1.0).abs() < f64::EPSILON);
        assert!((WaveType::Square.shape(-1.0) + 1.0).abs() < f64::EPSILON);
        assert!(WaveType::Square.shape(0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut sim = WaveSim::default();
        sim.integrate(0.7);
        sim.reset();
        let once = sim.snapshot();
        sim.reset();
        assert_eq!(sim.snapshot(), once);
        assert_eq!(once, WaveState::default());
    }

    #[test]
    fn test_render_draws_guides_and_polyline() {
        let commands = WaveSim::default().render(&Surface::default());
        let lines = commands
            .iter()
            .filter(|c| matches!(c, RenderCommand::DrawLine { .. }))
            .count();
        assert_eq!(lines, 3);
        assert!(commands
            .iter()
            .any(|c| matches!(c, RenderCommand::DrawPolyline { points, .. } if points.len() == 401)));
    }

    #[test]
    fn test_readouts() {
        let readouts = WaveSim::default().readouts();
        assert_eq!(find(&readouts, "Period").unwrap().display_value(), "1.00 s");
        assert_eq!(find(&readouts, "Frequency").unwrap().display_value(), "1.0 Hz");
    }

    #[test]
    fn test_wave_type_yaml() {
        let config: WaveConfig =
            serde_yaml::from_str("amplitude: 40\nfrequency: 2\nwave_type: square\n").unwrap();
        assert_eq!(config.wave_type, WaveType::Square);
        assert!((config.wavelength - 200.0).abs() < f64::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_ranges() {
        let slow = WaveConfig {
            frequency: 0.01,
            ..WaveConfig::default()
        };
        assert!(slow.validate().is_err());
    }
}
