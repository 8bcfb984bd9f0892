//! # evmb-host
//!
//! In-memory [`Host`](evmb_interpreter::Host) implementation used to drive the
//! interpreter in benchmarks and tests.
//!
//! - [`MockedHost`]: account table, logs, call records, nested execution
//! - [`Account`]: nonce, balance, code and storage of one address

#![warn(missing_docs)]
#![warn(clippy::all)]

mod account;
mod journal;
mod mocked_host;

pub use account::{Account, LogRecord};
pub use mocked_host::{MockedHost, EXECUTION_STACK_SIZE, MAX_RECORDED_CALLS};
