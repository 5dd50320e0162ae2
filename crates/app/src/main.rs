//! replay-sim: command-line driver for the anti-replay Monte Carlo sweep.

mod config;
mod report;

use anyhow::{Context, Result};
use clap::Parser;
use replay_sim_core::Simulator;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{print_config, Cli};
use crate::report::Report;

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let config = cli.resolve()?;
    let simulator = Simulator::new(config).context("failed to set up simulation")?;
    let seed = simulator.seed();

    if cli.print_config {
        print_config(simulator.config(), seed);
    }

    info!(
        modes = simulator.config().modes.len(),
        runs = simulator.config().runs,
        seed,
        "starting sweep"
    );
    let results = simulator.run().context("simulation failed")?;

    let report = Report::new(simulator.config(), seed, &results);
    if cli.json {
        println!("{}", report.to_json()?);
    } else {
        report.print_summary();
    }

    Ok(())
}

/// Install the global subscriber. `RUST_LOG` wins over `--verbose`.
/// Logs go to stderr so `--json` output stays parseable.
fn setup_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
