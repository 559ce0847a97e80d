//! CLI command handlers.
//!
//! This module contains the execution logic for each CLI command.
//! Extracted to enable comprehensive testing of command behavior.

use std::process::ExitCode;

use tracing::{debug, error};

use super::output::{print_help, print_readouts, print_run_report, print_version};
use super::{Args, Command, ConfigSource};
use crate::config::{explore_policies, LabConfig, RunConfig};
use crate::driver::{HeadlessRunner, RunReport};
use crate::error::{LabError, LabResult};
use crate::render::Readout;
use crate::sims::{AnySimulation, AnyState, Simulation, SimulationKind};

/// Main CLI entry point.
///
/// Dispatches to the appropriate command handler based on parsed arguments.
#[must_use]
pub fn run_cli(args: Args) -> ExitCode {
    let result = match args.command {
        Command::Run {
            sim,
            source,
            explore,
            frames,
            fps,
            json,
        } => load_config(&source, explore)
            .and_then(|config| run_simulation(&config, sim, frames, fps))
            .and_then(|report| print_run_report(&report, json)),
        Command::Metrics {
            sim,
            source,
            explore,
        } => load_config(&source, explore).map(|config| {
            print_readouts(sim, &metrics(&config, sim));
        }),
        Command::Config { source } => load_config(&source, false)
            .and_then(|config| config.to_yaml())
            .map(|yaml| print!("{yaml}")),
        Command::Help => {
            print_help();
            Ok(())
        }
        Command::Version => {
            print_version();
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "command failed");
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

/// Resolve a configuration source into a validated configuration.
///
/// # Errors
///
/// Returns error if the file cannot be read, the preset is unknown, or
/// validation fails.
pub fn load_config(source: &ConfigSource, explore: bool) -> LabResult<LabConfig> {
    let config = match source {
        ConfigSource::Default => LabConfig::default(),
        ConfigSource::File(path) => {
            debug!(path = %path.display(), "loading configuration");
            LabConfig::load(path)?
        }
        ConfigSource::Preset(name) => LabConfig::preset(name)?,
    };
    Ok(if explore {
        explore_policies(config)
    } else {
        config
    })
}

/// Run one simulation headlessly.
///
/// # Errors
///
/// Returns `LabError::Config` when the frame rate or frame budget falls
/// outside the ranges accepted in YAML, or any error raised while driving
/// frames.
pub fn run_simulation(
    config: &LabConfig,
    kind: SimulationKind,
    frames: Option<u64>,
    fps: Option<u32>,
) -> LabResult<RunReport<AnyState>> {
    let fps = fps.unwrap_or(config.run.fps);
    let frames = frames.unwrap_or(config.run.max_frames);
    if !RunConfig::FPS_RANGE.contains(&fps) {
        return Err(LabError::config(format!(
            "--fps must be in {:?}, got {fps}",
            RunConfig::FPS_RANGE
        )));
    }
    if !RunConfig::MAX_FRAMES_RANGE.contains(&frames) {
        return Err(LabError::config(format!(
            "--frames must be in {:?}, got {frames}",
            RunConfig::MAX_FRAMES_RANGE
        )));
    }

    let sim = AnySimulation::from_config(config.sim_config(kind));
    HeadlessRunner::new(sim, fps, &config.driver).run(frames)
}

/// Readouts of a freshly initialised simulation (derived metrics included).
#[must_use]
pub fn metrics(config: &LabConfig, kind: SimulationKind) -> Vec<Readout> {
    AnySimulation::from_config(config.sim_config(kind)).readouts()
}
