//! CLI module for scinapse.
//!
//! This module contains all CLI logic extracted from main.rs to enable
//! full test coverage. The entry point `run_cli` can be called from main.rs
//! with parsed arguments.

mod args;
mod commands;
mod output;

pub use args::{Args, Command, ConfigSource};
pub use commands::{load_config, metrics, run_cli, run_simulation};
pub use output::{
    format_readouts, format_run_report, print_help, print_readouts, print_run_report,
    print_version, version_string,
};
