//! Account state kept by the mocked host

use bytes::Bytes;
use evmb_crypto::{keccak256, EMPTY_CODE_HASH};
use evmb_primitives::{Address, Nonce, Word, H256};
use std::collections::HashMap;

/// State of one account
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Account {
    /// Nonce
    pub nonce: Nonce,
    /// Balance
    pub balance: Word,
    /// Runtime code
    code: Bytes,
    /// Keccak of `code`
    code_hash: H256,
    /// Storage slots; absent keys read as zero
    pub storage: HashMap<H256, H256>,
}

impl Account {
    /// Empty account
    pub fn new() -> Self {
        Self {
            nonce: 0,
            balance: Word::zero(),
            code: Bytes::new(),
            code_hash: EMPTY_CODE_HASH,
            storage: HashMap::new(),
        }
    }

    /// Account holding `code`
    pub fn with_code(code: impl Into<Bytes>) -> Self {
        let mut account = Self::new();
        account.set_code(code.into());
        account
    }

    /// Set the balance
    pub fn with_balance(mut self, balance: Word) -> Self {
        self.balance = balance;
        self
    }

    /// Replace the code and recompute its hash
    pub fn set_code(&mut self, code: Bytes) {
        self.code_hash = if code.is_empty() {
            EMPTY_CODE_HASH
        } else {
            keccak256(&code)
        };
        self.code = code;
    }

    /// Runtime code
    pub fn code(&self) -> &Bytes {
        &self.code
    }

    /// Code hash
    pub fn code_hash(&self) -> H256 {
        self.code_hash
    }

    /// Storage slot value
    pub fn storage_value(&self, key: &H256) -> H256 {
        self.storage.get(key).copied().unwrap_or_default()
    }

    /// Whether a CREATE targeting this account must fail
    pub fn is_occupied(&self) -> bool {
        self.nonce != 0 || !self.code.is_empty()
    }
}

impl Default for Account {
    fn default() -> Self {
        Self::new()
    }
}

/// A log entry emitted by LOG0..LOG4
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogRecord {
    /// Emitting contract
    pub address: Address,
    /// Topics (0-4)
    pub topics: Vec<H256>,
    /// Data
    pub data: Bytes,
}
