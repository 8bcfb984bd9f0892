//! Jump destination analysis

use crate::context::Message;
use crate::host::Host;
use crate::interpreter::Interpreter;
use crate::opcode::Opcode;
use crate::result::ExecutionResult;
use bytes::Bytes;
use std::sync::Arc;

/// Code buffer with its precomputed JUMPDEST map.
///
/// Cloning is cheap, so one analysis can back many executions of the same code.
#[derive(Clone, Debug)]
pub struct AnalyzedCode {
    code: Bytes,
    jump_dests: Arc<[bool]>,
}

impl AnalyzedCode {
    /// Scan `code` for JUMPDEST bytes outside of PUSH data
    pub fn analyze(code: Bytes) -> Self {
        let mut jump_dests = vec![false; code.len()];
        let mut i = 0;

        while i < code.len() {
            let opcode = code[i];
            if opcode == Opcode::JUMPDEST as u8 {
                jump_dests[i] = true;
            }
            // Skip PUSH operands
            if (0x60..=0x7F).contains(&opcode) {
                i += (opcode - 0x5F) as usize;
            }
            i += 1;
        }

        Self {
            code,
            jump_dests: jump_dests.into(),
        }
    }

    /// Raw bytecode
    pub fn bytes(&self) -> &Bytes {
        &self.code
    }

    /// Code length
    pub fn len(&self) -> usize {
        self.code.len()
    }

    /// Whether the code is empty
    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /// Whether `pos` is a valid jump target
    pub fn is_jump_dest(&self, pos: usize) -> bool {
        self.jump_dests.get(pos).copied().unwrap_or(false)
    }

    /// Run this code for `message` against `host`
    pub fn execute(&self, host: &mut dyn Host, message: &Message) -> ExecutionResult {
        Interpreter::new(message.clone(), self.clone()).run(host)
    }
}
