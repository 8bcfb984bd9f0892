//! Runner error types

use evmb_interpreter::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

/// Runner error type
#[derive(Debug, Error)]
pub enum RunnerError {
    /// Input that is not valid hex
    #[error("invalid hex in {what}: {source}")]
    InvalidHex {
        /// Which input was being decoded
        what: &'static str,
        /// Decoder error
        #[source]
        source: hex::FromHexError,
    },

    /// File could not be read
    #[error("cannot read {}: {source}", path.display())]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Config file could not be parsed
    #[error("invalid config {}: {source}", path.display())]
    Config {
        /// File path
        path: PathBuf,
        /// Parse error
        #[source]
        source: toml::de::Error,
    },

    /// Inconsistent settings
    #[error("invalid settings: {0}")]
    Settings(String),

    /// Deployment did not succeed
    #[error("deployment failed with status {0}")]
    DeployFailed(StatusCode),

    /// Deployment succeeded without reporting the created account
    #[error("deployment did not create an account")]
    NoCreatedAccount,

    /// A benchmark iteration did not succeed
    #[error("run {run} failed with status {status}")]
    RunFailed {
        /// Zero-based iteration index
        run: usize,
        /// Final status
        status: StatusCode,
    },

    /// An execution thread could not be started
    #[error("cannot spawn execution thread: {0}")]
    ThreadSpawn(#[source] std::io::Error),

    /// A worker thread panicked
    #[error("benchmark worker panicked")]
    WorkerPanicked,
}

/// Result type for runner operations
pub type RunnerResult<T> = Result<T, RunnerError>;
