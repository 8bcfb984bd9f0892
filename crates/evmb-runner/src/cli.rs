//! CLI argument parsing for evmb-runner

use crate::config::{HostPolicy, RunnerConfig};
use crate::loader::CodeSource;
use clap::{ArgGroup, Parser};
use std::path::PathBuf;

/// Deploy a contract and time repeated calls into it
#[derive(Parser, Debug, Clone)]
#[command(name = "evmb-runner")]
#[command(author, version, about, long_about = None)]
#[command(group(
    ArgGroup::new("code")
        .required(true)
        .args(["contract_code_path", "contract_code"]),
))]
pub struct Cli {
    /// Path to a file holding the hex creation code
    #[arg(long)]
    pub contract_code_path: Option<PathBuf>,

    /// Hex creation code given inline
    #[arg(long)]
    pub contract_code: Option<String>,

    /// Hex call data passed to every run
    #[arg(long, default_value = "")]
    pub calldata: String,

    /// Number of timed runs
    #[arg(short, long, default_value_t = 1)]
    pub num_runs: usize,

    /// Gas for deployment and for each run (default unlimited, letting each frame grow memory up to 4 GiB)
    #[arg(long)]
    pub gas_limit: Option<i64>,

    /// Host reuse between runs
    #[arg(long, value_enum)]
    pub host_policy: Option<HostPolicy>,

    /// Worker threads (fresh host policy only)
    #[arg(long)]
    pub jobs: Option<usize>,

    /// Print min/max/mean/median/p95 to stderr
    #[arg(long)]
    pub summary: bool,

    /// Write timings and summary as JSON to stdout
    #[arg(long)]
    pub json: bool,

    /// TOML config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Where the creation code comes from
    pub fn code_source(&self) -> CodeSource {
        match (&self.contract_code_path, &self.contract_code) {
            (Some(path), _) => CodeSource::Path(path.clone()),
            (None, Some(code)) => CodeSource::Inline(code.clone()),
            (None, None) => CodeSource::Inline(String::new()),
        }
    }

    /// Override config values with the flags that were given
    pub fn apply(&self, config: &mut RunnerConfig) {
        if let Some(gas_limit) = self.gas_limit {
            config.gas_limit = gas_limit;
        }
        if let Some(policy) = self.host_policy {
            config.host_policy = policy;
        }
        if let Some(jobs) = self.jobs {
            config.jobs = jobs;
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
    }
}
