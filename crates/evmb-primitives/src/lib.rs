//! # evmb-primitives
//!
//! Fixed-size value types shared by the interpreter, the mocked host and the
//! benchmark runner.
//!
//! - [`Address`]: 20-byte account address
//! - [`H256`]: 32-byte hash / storage slot
//! - [`Word`]: 256-bit unsigned integer, the unit of every stack slot

#![warn(missing_docs)]
#![warn(clippy::all)]

mod address;
mod error;
mod hash;
mod word;

pub use address::{Address, AddressError};
pub use error::PrimitiveError;
pub use hash::{HashError, H256};
pub use word::{address_to_word, h256_to_word, word_to_address, word_to_h256, Word};

/// Gas type (signed so that an overdraft is detectable at the charge site)
pub type Gas = i64;

/// Account nonce type
pub type Nonce = u64;
