//! # evmb-crypto
//!
//! Hashing used by the interpreter and the mocked host.
//!
//! - Keccak-256
//! - CREATE / CREATE2 address derivation

#![warn(missing_docs)]
#![warn(clippy::all)]

mod address;
mod hash;

pub use address::{create2_address, create_address};
pub use hash::{keccak256, EMPTY_CODE_HASH};
