//! Interpreter fault kinds

use thiserror::Error;

/// Faults that abort a frame.
///
/// Revert is not a fault: it is a normal halt carried by
/// [`HaltReason::Revert`](crate::HaltReason::Revert).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EvmError {
    /// Out of gas
    #[error("out of gas")]
    OutOfGas,

    /// Stack underflow
    #[error("stack underflow")]
    StackUnderflow,

    /// Stack overflow
    #[error("stack overflow (max 1024)")]
    StackOverflow,

    /// Jump target is not a JUMPDEST outside push data
    #[error("invalid jump destination: {0}")]
    InvalidJumpDestination(usize),

    /// Undefined opcode or INVALID (0xfe)
    #[error("invalid instruction: 0x{0:02x}")]
    InvalidInstruction(u8),

    /// Memory offset or size out of the addressable range
    #[error("memory limit exceeded")]
    MemoryLimitExceeded,

    /// Read past the end of the last call's return data
    #[error("return data out of bounds")]
    ReturnDataOutOfBounds,

    /// State modification in static context
    #[error("state modification in static context")]
    StaticModeViolation,

    /// Call depth exceeded
    #[error("call depth exceeded (max 1024)")]
    CallDepthExceeded,

    /// Insufficient balance for transfer
    #[error("insufficient balance")]
    InsufficientBalance,

    /// Contract creation collision
    #[error("contract address collision")]
    CreateCollision,

    /// Max code size exceeded (EIP-170)
    #[error("max code size exceeded (limit: 24576 bytes)")]
    MaxCodeSizeExceeded,
}

/// Result type for interpreter operations
pub type EvmResult<T> = Result<T, EvmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(format!("{}", EvmError::OutOfGas), "out of gas");
        assert_eq!(format!("{}", EvmError::StackUnderflow), "stack underflow");
        assert_eq!(format!("{}", EvmError::StackOverflow), "stack overflow (max 1024)");
        assert_eq!(
            format!("{}", EvmError::InvalidJumpDestination(100)),
            "invalid jump destination: 100"
        );
        assert_eq!(
            format!("{}", EvmError::InvalidInstruction(0xFE)),
            "invalid instruction: 0xfe"
        );
        assert_eq!(format!("{}", EvmError::MemoryLimitExceeded), "memory limit exceeded");
        assert_eq!(
            format!("{}", EvmError::StaticModeViolation),
            "state modification in static context"
        );
        assert_eq!(format!("{}", EvmError::CallDepthExceeded), "call depth exceeded (max 1024)");
    }

    #[test]
    fn test_error_equality() {
        assert_eq!(EvmError::OutOfGas, EvmError::OutOfGas);
        assert_ne!(EvmError::OutOfGas, EvmError::StackUnderflow);
        assert_eq!(
            EvmError::InvalidJumpDestination(10),
            EvmError::InvalidJumpDestination(10)
        );
        assert_ne!(
            EvmError::InvalidJumpDestination(10),
            EvmError::InvalidJumpDestination(20)
        );
    }
}
