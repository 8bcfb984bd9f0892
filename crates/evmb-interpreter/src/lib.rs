//! # evmb-interpreter
//!
//! Bytecode execution engine.
//!
//! This crate provides:
//! - 256-bit word arithmetic, the operand stack and linear memory
//! - Gas metering (static and dynamic costs)
//! - The [`Host`] capability trait the interpreter calls out to
//! - The dispatch loop ([`Interpreter`]) and the result builder ([`ExecutionResult`])
//!
//! The interpreter never owns account state. Everything outside the running
//! frame goes through a `&mut dyn Host`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod context;
pub mod error;
pub mod gas;
pub mod host;
pub mod interpreter;
pub mod memory;
pub mod opcode;
pub mod result;
pub mod stack;
pub mod word;

pub use analysis::AnalyzedCode;
pub use context::{CallKind, Message, TxContext};
pub use error::{EvmError, EvmResult};
pub use host::{Host, StorageStatus};
pub use interpreter::{execute, HaltReason, HashFn, Interpreter, InterpreterState};
pub use memory::Memory;
pub use opcode::Opcode;
pub use result::{ExecutionResult, StatusCode};
pub use stack::Stack;
pub use word::Word;

/// Gas limit used when a run should never be cut short by metering
pub const GAS_UNLIMITED: i64 = i64::MAX;
