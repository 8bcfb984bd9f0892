//! Execution outcome and the result builder

use crate::error::EvmError;
use crate::interpreter::{HaltReason, InterpreterState};
use bytes::Bytes;
use evmb_primitives::Address;
use std::fmt;

/// Final status of an execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    /// Halted normally (STOP, RETURN or end of code)
    Success,
    /// Halted by REVERT
    Revert,
    /// Ran out of gas
    OutOfGas,
    /// Undefined opcode or INVALID
    InvalidInstruction,
    /// Popped from an empty stack
    StackUnderflow,
    /// Pushed past 1024 entries
    StackOverflow,
    /// Jumped to a non-JUMPDEST
    InvalidJumpDestination,
    /// Memory access out of range
    MemoryLimitExceeded,
    /// RETURNDATACOPY past the end of return data
    ReturnDataOutOfBounds,
    /// Nesting deeper than 1024 frames
    CallDepthExceeded,
    /// State change inside a static call
    StaticModeViolation,
    /// Value transfer exceeds sender balance
    InsufficientBalance,
    /// CREATE target already occupied
    CreateCollision,
    /// Deployed code larger than 24576 bytes
    MaxCodeSizeExceeded,
    /// Generic failure
    Failure,
}

impl StatusCode {
    /// Whether this is `Success`
    pub fn is_success(&self) -> bool {
        matches!(self, StatusCode::Success)
    }

    /// Whether this is neither `Success` nor `Revert`
    pub fn is_fault(&self) -> bool {
        !matches!(self, StatusCode::Success | StatusCode::Revert)
    }
}

impl From<&EvmError> for StatusCode {
    fn from(err: &EvmError) -> Self {
        match err {
            EvmError::OutOfGas => StatusCode::OutOfGas,
            EvmError::StackUnderflow => StatusCode::StackUnderflow,
            EvmError::StackOverflow => StatusCode::StackOverflow,
            EvmError::InvalidJumpDestination(_) => StatusCode::InvalidJumpDestination,
            EvmError::InvalidInstruction(_) => StatusCode::InvalidInstruction,
            EvmError::MemoryLimitExceeded => StatusCode::MemoryLimitExceeded,
            EvmError::ReturnDataOutOfBounds => StatusCode::ReturnDataOutOfBounds,
            EvmError::StaticModeViolation => StatusCode::StaticModeViolation,
            EvmError::CallDepthExceeded => StatusCode::CallDepthExceeded,
            EvmError::InsufficientBalance => StatusCode::InsufficientBalance,
            EvmError::CreateCollision => StatusCode::CreateCollision,
            EvmError::MaxCodeSizeExceeded => StatusCode::MaxCodeSizeExceeded,
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatusCode::Success => "success",
            StatusCode::Revert => "revert",
            StatusCode::OutOfGas => "out of gas",
            StatusCode::InvalidInstruction => "invalid instruction",
            StatusCode::StackUnderflow => "stack underflow",
            StatusCode::StackOverflow => "stack overflow",
            StatusCode::InvalidJumpDestination => "invalid jump destination",
            StatusCode::MemoryLimitExceeded => "memory limit exceeded",
            StatusCode::ReturnDataOutOfBounds => "return data out of bounds",
            StatusCode::CallDepthExceeded => "call depth exceeded",
            StatusCode::StaticModeViolation => "static mode violation",
            StatusCode::InsufficientBalance => "insufficient balance",
            StatusCode::CreateCollision => "create collision",
            StatusCode::MaxCodeSizeExceeded => "max code size exceeded",
            StatusCode::Failure => "failure",
        };
        f.write_str(name)
    }
}

/// What one execution (top-level or nested) hands back to its caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Final status
    pub status: StatusCode,
    /// Gas remaining; zero after a fault
    pub gas_left: i64,
    /// Accumulated storage refund; zero unless successful
    pub gas_refund: i64,
    /// Return or revert data; empty after a fault
    pub output: Bytes,
    /// Address of the created account (create kinds, on success)
    pub create_address: Option<Address>,
}

impl ExecutionResult {
    /// Create a successful result
    pub fn success(gas_left: i64, gas_refund: i64, output: Bytes) -> Self {
        Self {
            status: StatusCode::Success,
            gas_left,
            gas_refund,
            output,
            create_address: None,
        }
    }

    /// Create a revert result; unused gas goes back to the caller
    pub fn revert(gas_left: i64, output: Bytes) -> Self {
        Self {
            status: StatusCode::Revert,
            gas_left,
            gas_refund: 0,
            output,
            create_address: None,
        }
    }

    /// Create a failed result that consumed all gas
    pub fn failure(status: StatusCode) -> Self {
        Self {
            status,
            gas_left: 0,
            gas_refund: 0,
            output: Bytes::new(),
            create_address: None,
        }
    }

    /// A call that was refused before running, leaving `gas` with the caller
    pub fn rejected(status: StatusCode, gas: i64) -> Self {
        Self {
            gas_left: gas,
            ..Self::failure(status)
        }
    }

    /// Attach the created account's address
    pub fn with_create_address(mut self, address: Address) -> Self {
        self.create_address = Some(address);
        self
    }

    /// Whether the status is `Success`
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Gas consumed against the given limit
    pub fn gas_used(&self, gas_limit: i64) -> u64 {
        gas_limit.saturating_sub(self.gas_left).max(0) as u64
    }

    /// Turn a finished interpreter state into a result.
    ///
    /// Faults keep neither gas nor output. A state still marked running
    /// cannot describe a finished frame and becomes `Failure`.
    pub(crate) fn build(
        state: &InterpreterState,
        gas_left: i64,
        gas_refund: i64,
        output: Bytes,
    ) -> Self {
        match state {
            InterpreterState::Halted(HaltReason::Success) => {
                Self::success(gas_left, gas_refund, output)
            }
            InterpreterState::Halted(HaltReason::Revert) => Self::revert(gas_left, output),
            InterpreterState::Faulted(err) => Self::failure(StatusCode::from(err)),
            InterpreterState::Running => Self::failure(StatusCode::Failure),
        }
    }
}
