//! evmb benchmark runner
//!
//! Deploys hex creation code against an in-memory host, then calls the
//! resulting contract repeatedly and prints each run's wall-clock time in
//! milliseconds on its own stdout line.
//!
//! ## Usage
//!
//! ```bash
//! evmb-runner --contract-code-path snailtracer.hex --calldata 30627b7c --num-runs 10
//! evmb-runner --contract-code 0x6001... --num-runs 100 --jobs 4 --summary
//! ```

mod bench;
mod cli;
mod config;
mod error;
mod loader;
mod stats;

use anyhow::{Context, Result};
use bench::Benchmark;
use cli::Cli;
use config::RunnerConfig;
use serde::Serialize;
use stats::Summary;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// JSON report written with `--json`
#[derive(Serialize)]
struct Report<'a> {
    runs: &'a [f64],
    /// Return data of the last run, `0x`-prefixed hex
    output: String,
    summary: Option<Summary>,
}

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    let mut config = match &cli.config {
        Some(path) => RunnerConfig::load(path)?,
        None => RunnerConfig::default(),
    };
    cli.apply(&mut config);

    // Logs go to stderr; stdout carries only timings
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    config.validate()?;

    let creation_code = cli
        .code_source()
        .load()
        .context("could not load contract code")?;
    let calldata = loader::decode_hex("calldata", &cli.calldata)?;
    tracing::info!(
        code_len = creation_code.len(),
        calldata_len = calldata.len(),
        num_runs = cli.num_runs,
        "benchmark starting"
    );

    let mut bench = Benchmark::deploy(&config, creation_code, calldata)?;
    let samples = bench.run(cli.num_runs)?;
    tracing::debug!(
        accounts = bench.host().accounts().len(),
        logs = bench.host().logs().len(),
        "benchmark finished"
    );

    let summary = Summary::from_samples(&samples);
    if cli.json {
        let report = Report {
            runs: &samples,
            output: format!("0x{}", hex::encode(bench.output())),
            summary: summary.clone(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for ms in &samples {
            println!("{}", ms);
        }
    }

    if cli.summary {
        match summary {
            Some(s) => eprintln!(
                "runs={} min={:.3}ms max={:.3}ms mean={:.3}ms median={:.3}ms p95={:.3}ms",
                s.runs, s.min, s.max, s.mean, s.median, s.p95
            ),
            None => tracing::warn!("no runs to summarize"),
        }
    }

    Ok(())
}
