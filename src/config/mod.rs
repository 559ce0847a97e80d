//! Configuration system with YAML schema and validation.
//!
//! Implements Poka-Yoke (mistake-proofing) through:
//! - Slider ranges enforced on every parameter via `validator`
//! - Unknown keys rejected by serde
//! - Semantic checks that span fields (damping factor, Δt clamp, surface)
//!
//! Two presets ship with the crate: `lab` (free pendulum, height-aware time
//! of flight) and `explore` (damped pendulum, level-ground time of flight).

use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

use crate::driver::DriverConfig;
use crate::engine::jidoka::JidokaConfig;
use crate::engine::DeltaPolicy;
use crate::error::{LabError, LabResult};
use crate::render::Surface;
use crate::sims::{
    AnyConfig, FlightTimePolicy, PendulumConfig, PendulumPolicy, ProjectileConfig, SimulationKind,
    WaveConfig,
};

const LAB_PRESET: &str = include_str!("../../presets/lab.yaml");
const EXPLORE_PRESET: &str = include_str!("../../presets/explore.yaml");

/// Names of the bundled presets.
pub const PRESETS: [&str; 2] = ["lab", "explore"];

/// Top-level lab configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct LabConfig {
    /// Schema version for forward compatibility.
    #[validate(length(min = 1))]
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    /// Descriptive metadata.
    #[serde(default)]
    pub meta: LabMeta,

    /// Pendulum parameters.
    #[validate(nested)]
    #[serde(default)]
    pub pendulum: PendulumConfig,

    /// Projectile parameters.
    #[validate(nested)]
    #[serde(default)]
    pub projectile: ProjectileConfig,

    /// Wave parameters.
    #[validate(nested)]
    #[serde(default)]
    pub wave: WaveConfig,

    /// Animation driver settings.
    #[serde(default)]
    pub driver: DriverConfig,

    /// Headless run settings.
    #[validate(nested)]
    #[serde(default)]
    pub run: RunConfig,
}

fn default_schema_version() -> String {
    "1.0".to_string()
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            meta: LabMeta::default(),
            pendulum: PendulumConfig::default(),
            projectile: ProjectileConfig::default(),
            wave: WaveConfig::default(),
            driver: DriverConfig::default(),
            run: RunConfig::default(),
        }
    }
}

impl LabConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - YAML parsing fails
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> LabResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string.
    ///
    /// # Errors
    ///
    /// Returns error if parsing or validation fails.
    pub fn from_yaml(yaml: &str) -> LabResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;

        // Poka-Yoke: validate all constraints
        config.validate()?;

        config.validate_semantic()?;

        Ok(config)
    }

    /// Load a bundled preset by name.
    ///
    /// # Errors
    ///
    /// Returns `LabError::Config` for an unknown preset name.
    pub fn preset(name: &str) -> LabResult<Self> {
        match name {
            "lab" => Self::from_yaml(LAB_PRESET),
            "explore" => Self::from_yaml(EXPLORE_PRESET),
            other => Err(LabError::config(format!(
                "unknown preset '{other}' (expected one of: {})",
                PRESETS.join(", ")
            ))),
        }
    }

    /// Serialize to YAML.
    ///
    /// # Errors
    ///
    /// Returns `LabError::YamlParse` if serialization fails.
    pub fn to_yaml(&self) -> LabResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Create a builder for configuration.
    #[must_use]
    pub fn builder() -> LabConfigBuilder {
        LabConfigBuilder::default()
    }

    /// Configuration of one simulation.
    #[must_use]
    pub fn sim_config(&self, kind: SimulationKind) -> AnyConfig {
        match kind {
            SimulationKind::Pendulum => AnyConfig::Pendulum(self.pendulum.clone()),
            SimulationKind::Projectile => AnyConfig::Projectile(self.projectile.clone()),
            SimulationKind::Wave => AnyConfig::Wave(self.wave.clone()),
        }
    }

    /// Validate semantic constraints beyond schema.
    ///
    /// # Errors
    ///
    /// Returns `LabError::Config` describing the first violated constraint.
    pub fn validate_semantic(&self) -> LabResult<()> {
        if let PendulumPolicy::Damped { factor } = self.pendulum.policy {
            if !(factor > 0.0 && factor <= 1.0) {
                return Err(LabError::config(format!(
                    "pendulum damping factor must be in (0, 1], got {factor}"
                )));
            }
        }

        if let DeltaPolicy::Clamped { max_secs } = self.driver.delta_policy {
            if !(max_secs > 0.0 && max_secs <= 1.0) {
                return Err(LabError::config(format!(
                    "delta clamp must be in (0, 1] seconds, got {max_secs}"
                )));
            }
        }

        if let Some(tolerance) = self.driver.jidoka.energy_tolerance {
            if !(tolerance > 0.0 && tolerance.is_finite()) {
                return Err(LabError::config("energy tolerance must be positive"));
            }
        }

        let Surface { width, height } = self.driver.surface;
        let side = 1.0..=Surface::MAX_SIDE;
        if !(side.contains(&width) && side.contains(&height)) {
            return Err(LabError::config(format!(
                "surface must be between 1x1 and {max}x{max} pixels, got {width}x{height}",
                max = Surface::MAX_SIDE
            )));
        }

        Ok(())
    }
}

/// Descriptive metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LabMeta {
    /// Preset or lab name.
    #[serde(default)]
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
}

/// Headless run settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Simulated display refresh rate.
    #[validate(range(min = 1, max = 240))]
    #[serde(default = "default_fps")]
    pub fps: u32,
    /// Frame budget for one run.
    #[validate(range(min = 1, max = 1_000_000))]
    #[serde(default = "default_max_frames")]
    pub max_frames: u64,
}

fn default_fps() -> u32 {
    60
}

fn default_max_frames() -> u64 {
    600
}

impl RunConfig {
    /// Accepted frame rates, as validated above.
    pub const FPS_RANGE: std::ops::RangeInclusive<u32> = 1..=240;
    /// Accepted frame budgets, as validated above.
    pub const MAX_FRAMES_RANGE: std::ops::RangeInclusive<u64> = 1..=1_000_000;
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            fps: default_fps(),
            max_frames: default_max_frames(),
        }
    }
}

/// Configuration builder for programmatic construction.
#[derive(Debug, Default)]
pub struct LabConfigBuilder {
    pendulum: Option<PendulumConfig>,
    projectile: Option<ProjectileConfig>,
    wave: Option<WaveConfig>,
    delta_policy: Option<DeltaPolicy>,
    jidoka: Option<JidokaConfig>,
    surface: Option<Surface>,
    fps: Option<u32>,
    max_frames: Option<u64>,
}

impl LabConfigBuilder {
    /// Set pendulum parameters.
    #[must_use]
    pub fn pendulum(mut self, config: PendulumConfig) -> Self {
        self.pendulum = Some(config);
        self
    }

    /// Set projectile parameters.
    #[must_use]
    pub fn projectile(mut self, config: ProjectileConfig) -> Self {
        self.projectile = Some(config);
        self
    }

    /// Set wave parameters.
    #[must_use]
    pub fn wave(mut self, config: WaveConfig) -> Self {
        self.wave = Some(config);
        self
    }

    /// Set the Δt policy.
    #[must_use]
    pub const fn delta_policy(mut self, policy: DeltaPolicy) -> Self {
        self.delta_policy = Some(policy);
        self
    }

    /// Set Jidoka configuration.
    #[must_use]
    pub const fn jidoka(mut self, config: JidokaConfig) -> Self {
        self.jidoka = Some(config);
        self
    }

    /// Set the canvas size.
    #[must_use]
    pub const fn surface(mut self, surface: Surface) -> Self {
        self.surface = Some(surface);
        self
    }

    /// Set the headless frame rate.
    #[must_use]
    pub const fn fps(mut self, fps: u32) -> Self {
        self.fps = Some(fps);
        self
    }

    /// Set the headless frame budget.
    #[must_use]
    pub const fn max_frames(mut self, frames: u64) -> Self {
        self.max_frames = Some(frames);
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> LabConfig {
        let mut config = LabConfig::default();

        if let Some(pendulum) = self.pendulum {
            config.pendulum = pendulum;
        }
        if let Some(projectile) = self.projectile {
            config.projectile = projectile;
        }
        if let Some(wave) = self.wave {
            config.wave = wave;
        }
        if let Some(policy) = self.delta_policy {
            config.driver.delta_policy = policy;
        }
        if let Some(jidoka) = self.jidoka {
            config.driver.jidoka = jidoka;
        }
        if let Some(surface) = self.surface {
            config.driver.surface = surface;
        }
        if let Some(fps) = self.fps {
            config.run.fps = fps;
        }
        if let Some(frames) = self.max_frames {
            config.run.max_frames = frames;
        }

        config
    }
}

/// Lab-view defaults paired with the explore-view policies.
#[must_use]
pub fn explore_policies(mut config: LabConfig) -> LabConfig {
    config.pendulum.policy = PendulumPolicy::explore();
    config.projectile.flight_time_policy = FlightTimePolicy::LevelGround;
    config
}
