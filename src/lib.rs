//! # scinapse
//!
//! Real-time physics simulations for a virtual science lab.
//!
//! Three simulations share one animation loop:
//! - **Pendulum**: semi-implicit Euler on θ'' = −(g/L)·sin θ, free or damped
//! - **Projectile**: closed-form kinematics with ground contact
//! - **Wave**: sine or square waveform regenerated every frame
//!
//! Each frame the [`driver::AnimationDriver`] measures Δt from an injectable
//! [`engine::TickSource`], clamps it, integrates, runs the Jidoka guard and
//! renders the state to platform-agnostic [`render::RenderCommand`]s. Hosts
//! (browser canvas, terminal, headless CLI) only paint those commands.
//!
//! ## Example
//!
//! ```rust
//! use scinapse::prelude::*;
//!
//! let config = LabConfig::builder().fps(60).max_frames(120).build();
//! let mut runner = HeadlessRunner::new(PendulumSim::new(config.pendulum.clone()), 60, &config.driver);
//! let report = runner.run(config.run.max_frames).unwrap();
//! assert_eq!(report.frames_run, 120);
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::suboptimal_flops,  // Formulas are written as they read on paper
    clippy::imprecise_flops,
    clippy::too_many_lines,
    clippy::missing_const_for_fn,
)]

pub mod cli;
pub mod config;
pub mod driver;
pub mod engine;
pub mod error;
pub mod render;
pub mod sims;

#[cfg(feature = "tui")]
pub mod tui;

#[cfg(feature = "wasm")]
pub mod web;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::{LabConfig, LabConfigBuilder};
    pub use crate::driver::{
        AnimationDriver, DriverConfig, FrameOutcome, FrameScheduler, HeadlessRunner,
        QueueScheduler, RunState,
    };
    pub use crate::engine::{
        DeltaPolicy, FixedStepClock, JidokaGuard, JidokaViolation, ManualClock, SimTime,
        TickSource, WallClock,
    };
    pub use crate::error::{LabError, LabResult};
    pub use crate::render::{Color, Painter, Readout, RenderCommand, Surface};
    pub use crate::sims::{
        AnySimulation, PendulumConfig, PendulumSim, ProjectileConfig, ProjectileSim, Simulation,
        SimulationKind, WaveConfig, WaveSim, WaveType,
    };
}

/// Re-export for public API
pub use error::{LabError, LabResult};
