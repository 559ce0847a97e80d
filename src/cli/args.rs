//! CLI argument parsing.
//!
//! This module provides the argument parser for the scinapse CLI.
//! Extracted to enable comprehensive testing of argument parsing logic.

use std::path::PathBuf;

use crate::sims::SimulationKind;

/// CLI arguments container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    /// The command to execute.
    pub command: Command,
}

/// Where the lab configuration comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Built-in defaults.
    #[default]
    Default,
    /// YAML file on disk.
    File(PathBuf),
    /// Bundled preset by name.
    Preset(String),
}

/// Available CLI commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run a simulation headlessly
    Run {
        /// Simulation to run.
        sim: SimulationKind,
        /// Configuration source.
        source: ConfigSource,
        /// Apply explore-view policies.
        explore: bool,
        /// Frame budget override.
        frames: Option<u64>,
        /// Frame rate override.
        fps: Option<u32>,
        /// Emit the report as JSON.
        json: bool,
    },
    /// Print derived metrics for a configuration
    Metrics {
        /// Simulation to inspect.
        sim: SimulationKind,
        /// Configuration source.
        source: ConfigSource,
        /// Apply explore-view policies.
        explore: bool,
    },
    /// Print the resolved configuration as YAML
    Config {
        /// Configuration source.
        source: ConfigSource,
    },
    /// Show help
    Help,
    /// Show version
    Version,
}

/// Options shared by the simulation commands.
#[derive(Debug, Default)]
struct Options {
    source: ConfigSource,
    explore: bool,
    frames: Option<u64>,
    fps: Option<u32>,
    json: bool,
}

impl Args {
    /// Parse command-line arguments from an iterator.
    ///
    /// This method is testable as it accepts any iterator of strings,
    /// not just `std::env::args()`.
    #[must_use]
    pub fn parse_from<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();
        Self::parse_from_vec(&args)
    }

    /// Parse command-line arguments from the environment.
    #[must_use]
    pub fn parse() -> Self {
        Self::parse_from(std::env::args())
    }

    /// Internal parsing from a vector of strings.
    fn parse_from_vec(args: &[String]) -> Self {
        if args.len() < 2 {
            return Self {
                command: Command::Help,
            };
        }

        let command = match args[1].as_str() {
            "run" => Self::parse_run_command(args),
            "metrics" => Self::parse_metrics_command(args),
            "config" => Command::Config {
                source: Self::parse_options(&args[2..]).source,
            },
            "-h" | "--help" | "help" => Command::Help,
            "-V" | "--version" | "version" => Command::Version,
            unknown => {
                eprintln!("Unknown command: {unknown}");
                Command::Help
            }
        };

        Self { command }
    }

    /// Parse the simulation name in position 2.
    fn parse_sim(args: &[String], command: &str) -> Option<SimulationKind> {
        let Some(name) = args.get(2) else {
            eprintln!("Error: '{command}' command requires a simulation (pendulum, projectile, wave)");
            return None;
        };
        match name.parse() {
            Ok(kind) => Some(kind),
            Err(e) => {
                eprintln!("Error: {e}");
                None
            }
        }
    }

    /// Parse the 'run' command arguments.
    fn parse_run_command(args: &[String]) -> Command {
        let Some(sim) = Self::parse_sim(args, "run") else {
            return Command::Help;
        };
        let options = Self::parse_options(&args[3..]);

        Command::Run {
            sim,
            source: options.source,
            explore: options.explore,
            frames: options.frames,
            fps: options.fps,
            json: options.json,
        }
    }

    /// Parse the 'metrics' command arguments.
    fn parse_metrics_command(args: &[String]) -> Command {
        let Some(sim) = Self::parse_sim(args, "metrics") else {
            return Command::Help;
        };
        let options = Self::parse_options(&args[3..]);

        Command::Metrics {
            sim,
            source: options.source,
            explore: options.explore,
        }
    }

    /// Parse trailing options. Unknown flags and unparsable values are skipped.
    fn parse_options(args: &[String]) -> Options {
        let mut options = Options::default();

        let mut i = 0;
        while i < args.len() {
            let value = args.get(i + 1);
            match args[i].as_str() {
                "-c" | "--config" => {
                    if let Some(path) = value {
                        options.source = ConfigSource::File(PathBuf::from(path));
                        i += 1;
                    }
                }
                "-p" | "--preset" => {
                    if let Some(name) = value {
                        options.source = ConfigSource::Preset(name.clone());
                        i += 1;
                    }
                }
                "-n" | "--frames" => {
                    if let Some(frames) = value {
                        options.frames = frames.parse().ok();
                        i += 1;
                    }
                }
                "--fps" => {
                    if let Some(fps) = value {
                        options.fps = fps.parse().ok();
                        i += 1;
                    }
                }
                "--explore" => options.explore = true,
                "--json" => options.json = true,
                other => eprintln!("Ignoring unknown option: {other}"),
            }
            i += 1;
        }

        options
    }
}
