//! Host capability interface
//!
//! Everything the interpreter needs from outside the running frame: account
//! state, logs, the transaction environment and nested execution.

use crate::context::{Message, TxContext};
use crate::result::ExecutionResult;
use bytes::Bytes;
use evmb_primitives::{Address, H256, Word};

/// Effect of a storage write, used to price SSTORE
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageStatus {
    /// New value equals the current one
    Unchanged,
    /// Zero slot set to non-zero
    Added,
    /// Non-zero slot set to another non-zero value
    Modified,
    /// Non-zero slot cleared
    Deleted,
}

impl StorageStatus {
    /// Classify writing `new` over `current`
    pub fn classify(current: &H256, new: &H256) -> Self {
        if current == new {
            StorageStatus::Unchanged
        } else if current.is_zero() {
            StorageStatus::Added
        } else if new.is_zero() {
            StorageStatus::Deleted
        } else {
            StorageStatus::Modified
        }
    }
}

/// State and environment access for the interpreter.
///
/// Only `call` may fail, and it reports failure through the returned
/// [`ExecutionResult`] status rather than an error.
pub trait Host {
    /// Whether the account exists
    fn account_exists(&self, address: &Address) -> bool;

    /// Balance, zero for unknown accounts
    fn get_balance(&self, address: &Address) -> Word;

    /// Code, empty for unknown accounts
    fn get_code(&self, address: &Address) -> Bytes;

    /// Code length
    fn get_code_size(&self, address: &Address) -> usize {
        self.get_code(address).len()
    }

    /// Code hash, zero for unknown accounts
    fn get_code_hash(&self, address: &Address) -> H256;

    /// Storage slot, zero when never written
    fn get_storage(&self, address: &Address, key: &H256) -> H256;

    /// Write a storage slot
    fn set_storage(&mut self, address: &Address, key: H256, value: H256) -> StorageStatus;

    /// Record a log entry
    fn emit_log(&mut self, address: &Address, topics: &[H256], data: &[u8]);

    /// Run a nested frame to completion
    fn call(&mut self, message: &Message) -> ExecutionResult;

    /// Transaction and block environment
    fn get_tx_context(&self) -> TxContext;

    /// Hash of a recent block, zero when unknown
    fn get_block_hash(&self, number: u64) -> H256;
}
