//! Call context and transaction environment

use bytes::Bytes;
use evmb_primitives::{Address, H256, Word};

/// Kind of frame being entered
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallKind {
    /// Message call
    Call,
    /// Run callee code with the caller's storage, sender and value
    DelegateCall,
    /// Run callee code with the caller's storage
    CallCode,
    /// Contract creation, address from sender and nonce
    Create,
    /// Contract creation, address from sender, salt and init code hash
    Create2 {
        /// Salt mixed into the address
        salt: H256,
    },
}

impl CallKind {
    /// Whether the frame runs init code
    pub fn is_create(&self) -> bool {
        matches!(self, CallKind::Create | CallKind::Create2 { .. })
    }
}

/// Call context of one frame. Immutable for the duration of the execution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    /// Frame kind
    pub kind: CallKind,
    /// No state modifications allowed
    pub is_static: bool,
    /// Nesting depth, 0 for the top-level frame
    pub depth: usize,
    /// Gas made available to the frame
    pub gas: i64,
    /// Caller address
    pub sender: Address,
    /// Account whose storage and balance the frame acts on
    pub recipient: Address,
    /// Account whose code runs (differs from `recipient` for DELEGATECALL/CALLCODE)
    pub code_address: Address,
    /// Call data, or init code for create kinds
    pub input: Bytes,
    /// Value transferred
    pub value: Word,
}

impl Message {
    /// Top-level message call
    pub fn call(sender: Address, recipient: Address, input: Bytes, gas: i64) -> Self {
        Self {
            kind: CallKind::Call,
            is_static: false,
            depth: 0,
            gas,
            sender,
            recipient,
            code_address: recipient,
            input,
            value: Word::zero(),
        }
    }

    /// Top-level contract creation targeting `recipient`
    pub fn create(sender: Address, recipient: Address, init_code: Bytes, gas: i64) -> Self {
        Self {
            kind: CallKind::Create,
            input: init_code,
            ..Self::call(sender, recipient, Bytes::new(), gas)
        }
    }

    /// Set the transferred value
    pub fn with_value(mut self, value: Word) -> Self {
        self.value = value;
        self
    }

    /// Mark the frame static
    pub fn into_static(mut self) -> Self {
        self.is_static = true;
        self
    }
}

impl Default for Message {
    fn default() -> Self {
        Self::call(Address::ZERO, Address::ZERO, Bytes::new(), 0)
    }
}

/// Transaction and block environment exposed through the host
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxContext {
    /// Transaction origin (original sender)
    pub origin: Address,
    /// Gas price
    pub gas_price: Word,
    /// Block coinbase
    pub coinbase: Address,
    /// Block number
    pub number: u64,
    /// Block timestamp
    pub timestamp: u64,
    /// Block gas limit
    pub gas_limit: u64,
    /// Block prevrandao
    pub prevrandao: H256,
    /// Chain ID
    pub chain_id: u64,
    /// Base fee (EIP-1559)
    pub base_fee: Word,
}

impl Default for TxContext {
    fn default() -> Self {
        Self {
            origin: Address::ZERO,
            gas_price: Word::zero(),
            coinbase: Address::ZERO,
            number: 0,
            timestamp: 0,
            gas_limit: 30_000_000,
            prevrandao: H256::ZERO,
            chain_id: 1,
            base_fee: Word::zero(),
        }
    }
}
