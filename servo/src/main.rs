//! Positions a single servo and exits
#![warn(
    meta_variable_misuse,
    //missing_debug_implementations,
    //missing_docs,
    //unsafe_code,
    //unused_results,
    //unreachable_pub,
    //clippy::pedantic,
    //clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used
)]

use std::io;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use servo::cli::Cli;
use tracing::{debug, error};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level())
        .with_writer(io::stderr)
        .init();
    debug!("{cli:?}");

    let (channel, angle) = match cli.arguments() {
        Ok(arguments) => arguments,
        Err(err) => {
            Cli::command().print_help().context("Print usage")?;
            return Err(err.into());
        }
    };

    match servo::run(&cli.config(), channel, angle) {
        Ok(()) => Ok(()),
        Err(err) if err.is_usage() => Err(err.into()),
        Err(err) => {
            error!("Could not position servo: {err}");
            Err(err).with_context(|| format!("Program channel {channel} to {angle} degrees"))
        }
    }
}
