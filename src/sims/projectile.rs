//! Projectile launch.
//!
//! # Governing Equations
//!
//! ```text
//! vx = v·cos φ            vy = v·sin φ
//! x(t) = vx·t             y(t) = h + vy·t − ½·g·t²
//! Max height:  H = h + vy²/(2g)
//! Range:       R = vx·T
//! ```
//!
//! Positions are closed-form functions of elapsed time, so no integration
//! error accumulates. Frames only decide *when* the ground is detected: the
//! flight stops on the first frame whose y(t) is at or below zero.
//!
//! World space is metres with y up; canvas space is pixels with y down,
//! related by `pixels_per_meter` and the ground line.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{Simulation, SimulationKind, StepOutcome};
use crate::engine::jidoka::Inspect;
use crate::render::{Color, Readout, RenderCommand, Surface};

const BALL_RADIUS: f64 = 8.0;

/// How the displayed time of flight is computed.
///
/// The lab and explore views disagree on launch height; each is kept as a
/// named variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlightTimePolicy {
    /// T = (vy + √(vy² + 2·g·h))/g, accounts for launch height.
    #[default]
    Quadratic,
    /// T = 2·vy/g, treats the launch as level ground.
    LevelGround,
}

/// Projectile parameters (slider values and canvas mapping).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ProjectileConfig {
    /// Launch speed (m/s).
    #[validate(range(min = 10.0, max = 100.0))]
    pub velocity: f64,
    /// Launch angle above horizontal, in degrees.
    #[validate(range(min = 0.0, max = 90.0))]
    pub angle_deg: f64,
    /// Gravitational acceleration (m/s²).
    #[validate(range(min = 1.0, max = 20.0))]
    pub gravity: f64,
    /// Launch height above ground (m).
    #[validate(range(min = 0.0, max = 100.0))]
    pub height: f64,
    /// Time-of-flight formula.
    #[serde(default)]
    pub flight_time_policy: FlightTimePolicy,
    /// Canvas scale.
    #[serde(default = "default_pixels_per_meter")]
    #[validate(range(min = 0.1, max = 20.0))]
    pub pixels_per_meter: f64,
    /// Launcher distance from the left edge, in pixels.
    #[serde(default = "default_origin_x")]
    #[validate(range(min = 0.0, max = 400.0))]
    pub origin_x: f64,
    /// Ground line distance from the bottom edge, in pixels.
    #[serde(default = "default_ground_margin")]
    #[validate(range(min = 0.0, max = 200.0))]
    pub ground_margin: f64,
    /// Maximum number of trail points kept.
    #[serde(default = "default_trail_length")]
    #[validate(range(min = 1, max = 10_000))]
    pub trail_length: usize,
}

fn default_pixels_per_meter() -> f64 {
    2.0
}

fn default_origin_x() -> f64 {
    50.0
}

fn default_ground_margin() -> f64 {
    30.0
}

fn default_trail_length() -> usize {
    400
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            velocity: 50.0,
            angle_deg: 45.0,
            gravity: 9.8,
            height: 0.0,
            flight_time_policy: FlightTimePolicy::Quadratic,
            pixels_per_meter: default_pixels_per_meter(),
            origin_x: default_origin_x(),
            ground_margin: default_ground_margin(),
            trail_length: default_trail_length(),
        }
    }
}

impl ProjectileConfig {
    /// Slider range for launch speed.
    pub const VELOCITY_RANGE: (f64, f64) = (10.0, 100.0);
    /// Slider range for launch angle.
    pub const ANGLE_RANGE: (f64, f64) = (0.0, 90.0);
    /// Slider range for gravity.
    pub const GRAVITY_RANGE: (f64, f64) = (1.0, 20.0);
    /// Slider range for launch height.
    pub const HEIGHT_RANGE: (f64, f64) = (0.0, 100.0);

    /// Horizontal velocity component.
    #[must_use]
    pub fn vx(&self) -> f64 {
        self.velocity * self.angle_deg.to_radians().cos()
    }

    /// Vertical velocity component (up positive).
    #[must_use]
    pub fn vy(&self) -> f64 {
        self.velocity * self.angle_deg.to_radians().sin()
    }

    /// Time of flight under the configured policy.
    #[must_use]
    pub fn flight_time(&self) -> f64 {
        let vy = self.vy();
        let g = self.gravity;
        match self.flight_time_policy {
            FlightTimePolicy::Quadratic => (vy + (vy * vy + 2.0 * g * self.height).sqrt()) / g,
            FlightTimePolicy::LevelGround => 2.0 * vy / g,
        }
    }

    /// Peak height above ground.
    #[must_use]
    pub fn max_height(&self) -> f64 {
        let vy = self.vy();
        self.height + vy * vy / (2.0 * self.gravity)
    }

    /// Horizontal distance at landing.
    #[must_use]
    pub fn range(&self) -> f64 {
        self.vx() * self.flight_time()
    }

    /// World position at time `t`.
    #[must_use]
    pub fn position_at(&self, t: f64) -> (f64, f64) {
        (
            self.vx() * t,
            self.height + self.vy() * t - 0.5 * self.gravity * t * t,
        )
    }

    /// Canvas y of the ground line.
    #[must_use]
    pub fn ground_y(&self, surface: &Surface) -> f64 {
        surface.height - self.ground_margin
    }

    /// Map a world point (metres, y up) to canvas pixels.
    #[must_use]
    pub fn to_canvas(&self, surface: &Surface, x: f64, y: f64) -> (f64, f64) {
        (
            self.origin_x + x * self.pixels_per_meter,
            self.ground_y(surface) - y * self.pixels_per_meter,
        )
    }
}

/// Bounded history of past positions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trail {
    points: Vec<(f64, f64)>,
    max_length: usize,
}

const TRAIL_PREALLOC: usize = 1024;

impl Trail {
    /// Create new trail.
    #[must_use]
    pub fn new(max_length: usize) -> Self {
        Self {
            points: Vec::with_capacity(max_length.min(TRAIL_PREALLOC)),
            max_length,
        }
    }

    /// Add a point, evicting the oldest when full.
    pub fn push(&mut self, x: f64, y: f64) {
        if self.max_length == 0 {
            return;
        }
        if self.points.len() >= self.max_length {
            self.points.remove(0);
        }
        self.points.push((x, y));
    }

    /// Trail points, oldest first.
    #[must_use]
    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the trail is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Time-varying projectile state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectileState {
    /// Seconds since launch.
    pub time: f64,
    /// Horizontal distance (m).
    pub x: f64,
    /// Height above ground (m).
    pub y: f64,
    /// Ground reached.
    pub landed: bool,
    /// Past world positions.
    pub trail: Trail,
}

impl ProjectileState {
    /// Projectile sitting on the launcher.
    #[must_use]
    pub fn on_launcher(config: &ProjectileConfig) -> Self {
        let mut trail = Trail::new(config.trail_length);
        trail.push(0.0, config.height);
        Self {
            time: 0.0,
            x: 0.0,
            y: config.height,
            landed: false,
            trail,
        }
    }
}

/// Projectile simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectileSim {
    config: ProjectileConfig,
    state: ProjectileState,
}

impl Default for ProjectileSim {
    fn default() -> Self {
        Self::new(ProjectileConfig::default())
    }
}

impl ProjectileSim {
    /// Create a projectile ready to launch.
    #[must_use]
    pub fn new(config: ProjectileConfig) -> Self {
        let state = ProjectileState::on_launcher(&config);
        Self { config, state }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &ProjectileState {
        &self.state
    }
}

impl Inspect for ProjectileSim {
    fn scalars(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("projectile.time", self.state.time),
            ("projectile.x", self.state.x),
            ("projectile.y", self.state.y),
        ]
    }
}

impl Simulation for ProjectileSim {
    type Config = ProjectileConfig;
    type State = ProjectileState;

    fn kind(&self) -> SimulationKind {
        SimulationKind::Projectile
    }

    fn config(&self) -> ProjectileConfig {
        self.config.clone()
    }

    fn set_config(&mut self, config: ProjectileConfig) {
        self.state = ProjectileState::on_launcher(&config);
        self.config = config;
    }

    fn snapshot(&self) -> ProjectileState {
        self.state.clone()
    }

    fn restore(&mut self, state: ProjectileState) {
        self.state = state;
    }

    fn reset(&mut self) {
        self.state = ProjectileState::on_launcher(&self.config);
    }

    fn integrate(&mut self, dt: f64) -> StepOutcome {
        if self.state.landed {
            return StepOutcome::Finished;
        }

        let t = self.state.time + dt;
        let (x, y) = self.config.position_at(t);
        self.state.time = t;
        self.state.x = x;

        if t > 0.0 && y <= 0.0 {
            self.state.y = 0.0;
            self.state.landed = true;
            self.state.trail.push(x, 0.0);
            return StepOutcome::Finished;
        }

        self.state.y = y;
        self.state.trail.push(x, y);
        StepOutcome::Continue
    }

    fn is_finished(&self) -> bool {
        self.state.landed
    }

    fn render(&self, surface: &Surface) -> Vec<RenderCommand> {
        let config = &self.config;
        let ground_y = config.ground_y(surface);
        let (launch_x, launch_y) = config.to_canvas(surface, 0.0, config.height);
        let (ball_x, ball_y) = config.to_canvas(surface, self.state.x, self.state.y);
        let (landing_x, _) = config.to_canvas(surface, config.range(), 0.0);

        let mut commands = vec![
            RenderCommand::Clear {
                color: Color::BACKGROUND,
            },
            RenderCommand::DrawLine {
                x1: 0.0,
                y1: ground_y,
                x2: surface.width,
                y2: ground_y,
                color: Color::GROUND,
                width: 2.0,
            },
        ];

        if config.height > 0.0 {
            // Launch platform
            commands.push(RenderCommand::DrawLine {
                x1: launch_x,
                y1: ground_y,
                x2: launch_x,
                y2: launch_y,
                color: Color::GRID,
                width: 6.0,
            });
        }

        // Predicted landing tick
        commands.push(RenderCommand::DrawLine {
            x1: landing_x,
            y1: ground_y - 6.0,
            x2: landing_x,
            y2: ground_y + 6.0,
            color: Color::GROUND,
            width: 2.0,
        });

        if self.state.trail.len() > 1 {
            commands.push(RenderCommand::DrawPolyline {
                points: self
                    .state
                    .trail
                    .points()
                    .iter()
                    .map(|&(x, y)| config.to_canvas(surface, x, y))
                    .collect(),
                color: Color::TRAIL,
                width: 1.5,
            });
        }

        commands.push(RenderCommand::DrawCircle {
            x: ball_x,
            y: ball_y,
            radius: BALL_RADIUS,
            color: Color::PROJECTILE,
            filled: true,
        });
        commands.push(RenderCommand::DrawText {
            x: 10.0,
            y: 20.0,
            text: format!(
                "t = {:.2} s   x = {:.1} m   y = {:.1} m",
                self.state.time, self.state.x, self.state.y
            ),
            color: Color::LABEL,
        });

        commands
    }

    fn readouts(&self) -> Vec<Readout> {
        vec![
            Readout::new("Time", self.state.time, "s", 2),
            Readout::new("Distance", self.state.x, "m", 1),
            Readout::new("Height", self.state.y, "m", 1),
            Readout::new("Range", self.config.range(), "m", 1),
            Readout::new("Max height", self.config.max_height(), "m", 2),
            Readout::new("Flight time", self.config.flight_time(), "s", 3),
        ]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::render::readout::find;

    #[test]
    fn test_derived_metrics_for_lab_defaults() {
        let config = ProjectileConfig::default();
        assert!((config.range() - 255.1).abs() < 0.05, "range={}", config.range());
        assert!((config.max_height() - 63.78).abs() < 0.01);
        assert!((config.flight_time() - 7.216).abs() < 0.002);
    }

    #[test]
    fn test_readouts_formatting() {
        let readouts = ProjectileSim::default().readouts();
        assert_eq!(find(&readouts, "Range").unwrap().display_value(), "255.1 m");
        assert_eq!(find(&readouts, "Max height").unwrap().display_value(), "63.78 m");
        assert_eq!(find(&readouts, "Flight time").unwrap().formatted_value().len(), 5);
    }

    #[test]
    fn test_policies_agree_at_ground_level() {
        let quadratic = ProjectileConfig::default();
        let level = ProjectileConfig {
            flight_time_policy: FlightTimePolicy::LevelGround,
            ..ProjectileConfig::default()
        };
        assert!((quadratic.flight_time() - level.flight_time()).abs() < 1e-12);
    }

    #[test]
    fn test_policies_diverge_with_height() {
        let quadratic = ProjectileConfig {
            height: 50.0,
            ..ProjectileConfig::default()
        };
        let level = ProjectileConfig {
            flight_time_policy: FlightTimePolicy::LevelGround,
            ..quadratic.clone()
        };
        assert!(quadratic.flight_time() > level.flight_time());
        // Quadratic lands exactly at ground level.
        let (_, y) = quadratic.position_at(quadratic.flight_time());
        assert!(y.abs() < 1e-9);
    }

    #[test]
    fn test_frame_stepped_landing_matches_closed_form() {
        let mut sim = ProjectileSim::default();
        let dt = 1.0 / 60.0;
        let mut frames = 0;
        while sim.integrate(dt) == StepOutcome::Continue {
            frames += 1;
            assert!(frames < 10_000, "never landed");
        }
        let expected = sim.config().flight_time();
        assert!(sim.state().landed);
        assert!(sim.state().time >= expected - 1e-9);
        assert!(sim.state().time - expected <= dt + 1e-9);
        assert!(sim.state().y.abs() < f64::EPSILON);
    }

    #[test]
    fn test_landed_projectile_stays_put() {
        let mut sim = ProjectileSim::default();
        while sim.integrate(0.1) == StepOutcome::Continue {}
        let landed = sim.snapshot();
        assert_eq!(sim.integrate(0.1), StepOutcome::Finished);
        assert_eq!(sim.snapshot(), landed);
        assert!(sim.is_finished());
    }

    #[test]
    fn test_flat_launch_from_ground_lands_immediately() {
        let mut sim = ProjectileSim::new(ProjectileConfig {
            angle_deg: 0.0,
            ..ProjectileConfig::default()
        });
        assert_eq!(sim.integrate(1.0 / 60.0), StepOutcome::Finished);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut sim = ProjectileSim::default();
        for _ in 0..30 {
            sim.integrate(1.0 / 60.0);
        }
        sim.reset();
        let once = sim.snapshot();
        sim.reset();
        assert_eq!(sim.snapshot(), once);
        assert!(once.time.abs() < f64::EPSILON);
        assert_eq!(once.trail.len(), 1);
    }

    #[test]
    fn test_canvas_mapping_inverts_y() {
        let config = ProjectileConfig::default();
        let surface = Surface::default();
        let (x, y) = config.to_canvas(&surface, 10.0, 10.0);
        assert!((x - 70.0).abs() < 1e-12);
        assert!((y - (370.0 - 20.0)).abs() < 1e-12);
    }

    #[test]
    fn test_render_includes_trail_after_flight() {
        let mut sim = ProjectileSim::default();
        for _ in 0..10 {
            sim.integrate(1.0 / 60.0);
        }
        let commands = sim.render(&Surface::default());
        let trail = commands.iter().find_map(|c| match c {
            RenderCommand::DrawPolyline { points, .. } => Some(points.len()),
            _ => None,
        });
        assert_eq!(trail, Some(11));
    }

    #[test]
    fn test_render_platform_only_when_elevated() {
        let ground = ProjectileSim::default().render(&Surface::default());
        let elevated = ProjectileSim::new(ProjectileConfig {
            height: 20.0,
            ..ProjectileConfig::default()
        })
        .render(&Surface::default());
        assert_eq!(elevated.len(), ground.len() + 1);
    }

    #[test]
    fn test_trail_is_bounded() {
        let mut trail = Trail::new(3);
        for i in 0..5 {
            trail.push(f64::from(i), 0.0);
        }
        assert_eq!(trail.points(), &[(2.0, 0.0), (3.0, 0.0), (4.0, 0.0)]);

        let mut empty = Trail::new(0);
        empty.push(1.0, 1.0);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_huge_trail_limit_does_not_preallocate() {
        let mut trail = Trail::new(usize::MAX);
        trail.push(1.0, 2.0);
        assert_eq!(trail.len(), 1);

        let sim = ProjectileSim::new(ProjectileConfig {
            trail_length: usize::MAX,
            ..ProjectileConfig::default()
        });
        assert_eq!(sim.state().trail.len(), 1);
    }

    #[test]
    fn test_trail_length_validation() {
        let unbounded = ProjectileConfig {
            trail_length: 10_001,
            ..ProjectileConfig::default()
        };
        assert!(unbounded.validate().is_err());
        let none = ProjectileConfig {
            trail_length: 0,
            ..ProjectileConfig::default()
        };
        assert!(none.validate().is_err());
    }

    #[test]
    fn test_config_validation_ranges() {
        let too_fast = ProjectileConfig {
            velocity: 500.0,
            ..ProjectileConfig::default()
        };
        assert!(too_fast.validate().is_err());
        assert!(ProjectileConfig::default().validate().is_ok());
    }
}
