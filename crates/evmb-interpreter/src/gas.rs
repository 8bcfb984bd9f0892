//! Gas schedule and dynamic cost calculations
//!
//! A single schedule (Shanghai-era constants) with no warm/cold accounting:
//! account and storage access always costs the warm price.

use crate::host::StorageStatus;
use crate::opcode::Opcode;
use crate::word::Word;

/// Gas costs and limits
pub mod cost {
    /// Zero gas
    pub const ZERO: i64 = 0;
    /// Base gas
    pub const BASE: i64 = 2;
    /// Very low gas
    pub const VERYLOW: i64 = 3;
    /// Low gas
    pub const LOW: i64 = 5;
    /// Mid gas
    pub const MID: i64 = 8;
    /// High gas
    pub const HIGH: i64 = 10;

    /// Jump dest gas
    pub const JUMPDEST: i64 = 1;
    /// Exp gas
    pub const EXP: i64 = 10;
    /// Exp byte gas
    pub const EXP_BYTE: i64 = 50;
    /// Keccak base gas
    pub const SHA3: i64 = 30;
    /// Keccak word gas
    pub const SHA3_WORD: i64 = 6;
    /// Blockhash gas
    pub const BLOCKHASH: i64 = 20;

    /// Account access gas (BALANCE, EXTCODE*, CALL*)
    pub const ACCOUNT_ACCESS: i64 = 100;
    /// Sload gas
    pub const SLOAD: i64 = 100;
    /// Sstore set gas
    pub const SSTORE_SET: i64 = 20000;
    /// Sstore reset gas
    pub const SSTORE_RESET: i64 = 2900;
    /// Sstore clear refund
    pub const SSTORE_CLEAR_REFUND: i64 = 4800;

    /// Log gas
    pub const LOG: i64 = 375;
    /// Log topic gas
    pub const LOG_TOPIC: i64 = 375;
    /// Log data gas (per byte)
    pub const LOG_DATA: i64 = 8;

    /// Create gas
    pub const CREATE: i64 = 32000;
    /// Init code gas per word (EIP-3860)
    pub const INITCODE_WORD: i64 = 2;
    /// Code deposit gas per byte
    pub const CODE_DEPOSIT: i64 = 200;
    /// Call value transfer gas
    pub const CALL_VALUE: i64 = 9000;
    /// Call new account gas
    pub const CALL_NEW_ACCOUNT: i64 = 25000;
    /// Call stipend
    pub const CALL_STIPEND: i64 = 2300;

    /// Memory gas per word
    pub const MEMORY: i64 = 3;
    /// Copy gas per word
    pub const COPY: i64 = 3;

    /// Max call depth
    pub const MAX_CALL_DEPTH: usize = 1024;
    /// Max stack size
    pub const MAX_STACK_SIZE: usize = 1024;
    /// Max code size (EIP-170)
    pub const MAX_CODE_SIZE: usize = 24576;
    /// Highest addressable memory byte count
    pub const MAX_MEMORY_SIZE: usize = u32::MAX as usize;
}

/// Static gas cost charged before an opcode runs
pub fn static_gas(opcode: Opcode) -> i64 {
    match opcode {
        // Zero cost
        Opcode::STOP | Opcode::RETURN | Opcode::REVERT | Opcode::INVALID => cost::ZERO,

        // Base cost (2)
        Opcode::ADDRESS | Opcode::ORIGIN | Opcode::CALLER | Opcode::CALLVALUE |
        Opcode::CALLDATASIZE | Opcode::CODESIZE | Opcode::GASPRICE | Opcode::COINBASE |
        Opcode::TIMESTAMP | Opcode::NUMBER | Opcode::PREVRANDAO | Opcode::GASLIMIT |
        Opcode::CHAINID | Opcode::RETURNDATASIZE | Opcode::POP | Opcode::PC |
        Opcode::MSIZE | Opcode::GAS | Opcode::BASEFEE | Opcode::PUSH0 => cost::BASE,

        // Very low cost (3)
        Opcode::ADD | Opcode::SUB | Opcode::NOT | Opcode::LT | Opcode::GT | Opcode::SLT |
        Opcode::SGT | Opcode::EQ | Opcode::ISZERO | Opcode::AND | Opcode::OR |
        Opcode::XOR | Opcode::BYTE | Opcode::SHL | Opcode::SHR | Opcode::SAR |
        Opcode::CALLDATALOAD | Opcode::MLOAD | Opcode::MSTORE | Opcode::MSTORE8 |
        Opcode::CALLDATACOPY | Opcode::CODECOPY | Opcode::RETURNDATACOPY | Opcode::MCOPY |
        Opcode::PUSH1 | Opcode::PUSH2 | Opcode::PUSH3 | Opcode::PUSH4 | Opcode::PUSH5 |
        Opcode::PUSH6 | Opcode::PUSH7 | Opcode::PUSH8 | Opcode::PUSH9 | Opcode::PUSH10 |
        Opcode::PUSH11 | Opcode::PUSH12 | Opcode::PUSH13 | Opcode::PUSH14 |
        Opcode::PUSH15 | Opcode::PUSH16 | Opcode::PUSH17 | Opcode::PUSH18 |
        Opcode::PUSH19 | Opcode::PUSH20 | Opcode::PUSH21 | Opcode::PUSH22 |
        Opcode::PUSH23 | Opcode::PUSH24 | Opcode::PUSH25 | Opcode::PUSH26 |
        Opcode::PUSH27 | Opcode::PUSH28 | Opcode::PUSH29 | Opcode::PUSH30 |
        Opcode::PUSH31 | Opcode::PUSH32 | Opcode::DUP1 | Opcode::DUP2 | Opcode::DUP3 |
        Opcode::DUP4 | Opcode::DUP5 | Opcode::DUP6 | Opcode::DUP7 | Opcode::DUP8 |
        Opcode::DUP9 | Opcode::DUP10 | Opcode::DUP11 | Opcode::DUP12 | Opcode::DUP13 |
        Opcode::DUP14 | Opcode::DUP15 | Opcode::DUP16 | Opcode::SWAP1 | Opcode::SWAP2 |
        Opcode::SWAP3 | Opcode::SWAP4 | Opcode::SWAP5 | Opcode::SWAP6 | Opcode::SWAP7 |
        Opcode::SWAP8 | Opcode::SWAP9 | Opcode::SWAP10 | Opcode::SWAP11 | Opcode::SWAP12 |
        Opcode::SWAP13 | Opcode::SWAP14 | Opcode::SWAP15 | Opcode::SWAP16 => cost::VERYLOW,

        // Low cost (5)
        Opcode::MUL | Opcode::DIV | Opcode::SDIV | Opcode::MOD | Opcode::SMOD |
        Opcode::SIGNEXTEND | Opcode::SELFBALANCE => cost::LOW,

        // Mid cost (8)
        Opcode::ADDMOD | Opcode::MULMOD | Opcode::JUMP => cost::MID,

        // High cost (10)
        Opcode::JUMPI => cost::HIGH,

        Opcode::JUMPDEST => cost::JUMPDEST,
        Opcode::EXP => cost::EXP,
        Opcode::KECCAK256 => cost::SHA3,
        Opcode::BLOCKHASH => cost::BLOCKHASH,

        // Account access
        Opcode::BALANCE | Opcode::EXTCODESIZE | Opcode::EXTCODECOPY | Opcode::EXTCODEHASH |
        Opcode::CALL | Opcode::CALLCODE | Opcode::DELEGATECALL | Opcode::STATICCALL => {
            cost::ACCOUNT_ACCESS
        }
        Opcode::SLOAD => cost::SLOAD,

        // Priced by storage status
        Opcode::SSTORE => cost::ZERO,

        Opcode::LOG0 => cost::LOG,
        Opcode::LOG1 => cost::LOG + cost::LOG_TOPIC,
        Opcode::LOG2 => cost::LOG + 2 * cost::LOG_TOPIC,
        Opcode::LOG3 => cost::LOG + 3 * cost::LOG_TOPIC,
        Opcode::LOG4 => cost::LOG + 4 * cost::LOG_TOPIC,
        Opcode::CREATE | Opcode::CREATE2 => cost::CREATE,
    }
}

/// Memory expansion cost from `current_size` to `new_size` bytes
pub fn memory_gas(current_size: usize, new_size: usize) -> i64 {
    if new_size <= current_size {
        return 0;
    }
    let new_cost = memory_word_cost(num_words(new_size));
    let old_cost = memory_word_cost(num_words(current_size));
    new_cost.saturating_sub(old_cost)
}

fn memory_word_cost(words: u64) -> i64 {
    let cost = (cost::MEMORY as u64)
        .saturating_mul(words)
        .saturating_add(words.saturating_mul(words) / 512);
    saturate(cost)
}

/// Per-word copy cost (CALLDATACOPY, CODECOPY, EXTCODECOPY, RETURNDATACOPY, MCOPY)
pub fn copy_gas(length: usize) -> i64 {
    per_word(cost::COPY, length)
}

/// EXP cost per significant exponent byte
pub fn exp_gas(exponent: Word) -> i64 {
    let bytes = exponent.bits().div_ceil(8) as i64;
    cost::EXP_BYTE * bytes
}

/// KECCAK256 per-word cost
pub fn sha3_word_gas(length: usize) -> i64 {
    per_word(cost::SHA3_WORD, length)
}

/// LOG per-byte data cost
pub fn log_data_gas(length: usize) -> i64 {
    saturate((cost::LOG_DATA as u64).saturating_mul(length as u64))
}

/// Init code cost for CREATE; CREATE2 also pays for hashing the init code
pub fn init_code_gas(length: usize, hashed: bool) -> i64 {
    let word_cost = if hashed {
        cost::INITCODE_WORD + cost::SHA3_WORD
    } else {
        cost::INITCODE_WORD
    };
    per_word(word_cost, length)
}

/// Deposit cost for storing created code
pub fn code_deposit_gas(length: usize) -> i64 {
    saturate((cost::CODE_DEPOSIT as u64).saturating_mul(length as u64))
}

/// SSTORE cost for a storage status
pub fn sstore_gas(status: StorageStatus) -> i64 {
    match status {
        StorageStatus::Unchanged => cost::SLOAD,
        StorageStatus::Added => cost::SSTORE_SET,
        StorageStatus::Modified | StorageStatus::Deleted => cost::SSTORE_RESET,
    }
}

/// SSTORE refund for a storage status
pub fn sstore_refund(status: StorageStatus) -> i64 {
    match status {
        StorageStatus::Deleted => cost::SSTORE_CLEAR_REFUND,
        _ => 0,
    }
}

/// Gas a nested frame may receive out of `available` (all but one 64th)
pub fn max_forwarded_gas(available: i64) -> i64 {
    available - available / 64
}

fn num_words(length: usize) -> u64 {
    (length as u64).div_ceil(32)
}

fn per_word(word_cost: i64, length: usize) -> i64 {
    saturate((word_cost as u64).saturating_mul(num_words(length)))
}

fn saturate(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
