mod args;
mod output;

use anyhow::{Context, Result};
use mailprobe::{Classifier, classify_all, collect_candidates};
use tracing_subscriber::EnvFilter;

use crate::args::Cli;

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "error",
        1 => "mailprobe=info",
        2 => "mailprobe=debug",
        _ => "mailprobe=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // candidates are checked before the resolver exists: an empty input
    // never touches the network
    let emails = collect_candidates(cli.raw_inputs()?)?;
    let classifier =
        Classifier::from_system_conf(cli.probe_options()).context("initialise DNS resolver")?;
    let rows = classify_all(&classifier, &emails, &cli.batch_options());
    output::write_reports(&rows, &cli)
}
