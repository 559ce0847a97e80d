//! scinapse CLI - virtual lab physics simulations
//!
//! Command-line interface for running simulations headlessly.

use std::process::ExitCode;

use scinapse::cli::{run_cli, Args};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    run_cli(Args::parse())
}
