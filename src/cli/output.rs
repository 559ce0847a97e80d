//! CLI output formatting.
//!
//! This module contains all output formatting functions for the CLI.
//! Formatting is split from printing so the text can be tested.

use std::fmt::Write as _;

use crate::driver::RunReport;
use crate::error::{LabError, LabResult};
use crate::render::Readout;
use crate::sims::{AnyState, SimulationKind};

/// Version line with build metadata.
#[must_use]
pub fn version_string() -> String {
    let version = option_env!("SCINAPSE_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
    match (
        option_env!("SCINAPSE_GIT_HASH"),
        option_env!("SCINAPSE_BUILD_TIMESTAMP"),
    ) {
        (Some(hash), Some(ts)) if !hash.is_empty() => {
            format!("scinapse {version} ({hash}, built {ts})")
        }
        (_, Some(ts)) => format!("scinapse {version} (built {ts})"),
        _ => format!("scinapse {version}"),
    }
}

/// Print version information.
pub fn print_version() {
    println!("{}", version_string());
}

/// Print help message.
pub fn print_help() {
    println!(
        r"scinapse - Virtual lab physics simulations

USAGE:
    scinapse <COMMAND> [OPTIONS]

COMMANDS:
    run <SIM>                   Run a simulation headlessly
        -c, --config <FILE>     Load configuration from YAML
        -p, --preset <NAME>     Use a bundled preset (lab, explore)
        --explore               Use explore-view policies
        -n, --frames <N>        Frame budget, 1 to 1000000 (default from config: 600)
        --fps <N>               Simulated frame rate, 1 to 240 (default from config: 60)
        --json                  Print the report as JSON

    metrics <SIM>               Print derived metrics and initial readouts
        -c, --config <FILE>
        -p, --preset <NAME>
        --explore

    config                      Print the resolved configuration as YAML
        -p, --preset <NAME>

    help                        Show this help message
    version                     Show version information

SIMULATIONS:
    pendulum                    Simple pendulum (free or damped)
    projectile                  Projectile launch with ground contact
    wave                        Sine or square travelling wave

EXAMPLES:
    scinapse run pendulum --frames 300
    scinapse run projectile --preset explore --json
    scinapse metrics pendulum
    scinapse config --preset explore > lab.yaml

Set RUST_LOG=debug for driver diagnostics.
"
    );
}

/// Format readouts as an aligned table.
#[must_use]
pub fn format_readouts(kind: SimulationKind, readouts: &[Readout]) -> String {
    let width = readouts.iter().map(|r| r.label.len()).max().unwrap_or(0);
    let mut out = format!("{kind}\n");
    for readout in readouts {
        let _ = writeln!(
            out,
            "  {:<width$}  {}",
            readout.label,
            readout.display_value()
        );
    }
    out
}

/// Print readouts as an aligned table.
pub fn print_readouts(kind: SimulationKind, readouts: &[Readout]) {
    print!("{}", format_readouts(kind, readouts));
}

/// Format a run report for humans.
#[must_use]
pub fn format_run_report(report: &RunReport<AnyState>) -> String {
    let status = if report.finished {
        "finished"
    } else {
        "frame budget reached"
    };
    let mut out = String::new();
    let _ = writeln!(out, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    let _ = writeln!(out, "Simulation: {}", report.kind);
    let _ = writeln!(out, "Frames:     {} ({status})", report.frames_run);
    let _ = writeln!(out, "Clamped:    {}", report.stats.clamped_frames);
    let _ = writeln!(out, "Frozen:     {}", report.stats.frozen_frames);
    let _ = writeln!(out, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    out.push_str(&format_readouts(report.kind, &report.readouts));
    out
}

/// Print a run report, as text or JSON.
///
/// # Errors
///
/// Returns `LabError::Serialization` if JSON encoding fails.
pub fn print_run_report(report: &RunReport<AnyState>, json: bool) -> LabResult<()> {
    if json {
        let text = serde_json::to_string_pretty(report)
            .map_err(|e| LabError::serialization(e.to_string()))?;
        println!("{text}");
    } else {
        print!("{}", format_run_report(report));
    }
    Ok(())
}
