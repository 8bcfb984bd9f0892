//! Bytecode interpreter

use crate::analysis::AnalyzedCode;
use crate::context::{CallKind, Message};
use crate::error::{EvmError, EvmResult};
use crate::gas::{self, cost};
use crate::host::{Host, StorageStatus};
use crate::memory::Memory;
use crate::opcode::Opcode;
use crate::result::{ExecutionResult, StatusCode};
use crate::stack::Stack;
use crate::word::{self, Word};
use bytes::Bytes;
use evmb_crypto::keccak256;
use evmb_primitives::{address_to_word, h256_to_word, word_to_address, word_to_h256, Address, H256};
use tracing::trace;

/// Hash function used by KECCAK256
pub type HashFn = fn(&[u8]) -> H256;

/// How a frame stopped without faulting
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HaltReason {
    /// STOP, RETURN or running off the end of the code
    Success,
    /// REVERT
    Revert,
}

/// Interpreter lifecycle: `Running` until it halts or faults, never back
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InterpreterState {
    /// More instructions to execute
    Running,
    /// Stopped normally
    Halted(HaltReason),
    /// Aborted; all gas consumed
    Faulted(EvmError),
}

enum Control {
    Continue,
    Halt(HaltReason),
}

/// One execution frame
pub struct Interpreter {
    /// Bytecode and its jump table
    code: AnalyzedCode,
    /// Call context
    message: Message,
    /// Program counter
    pc: usize,
    /// Stack
    stack: Stack,
    /// Memory
    memory: Memory,
    /// Gas remaining
    gas_left: i64,
    /// Storage refund accumulated by this frame and successful children
    gas_refund: i64,
    /// Return data from the last nested call
    return_data: Bytes,
    /// Data passed to RETURN or REVERT
    output: Bytes,
    /// Lifecycle state
    state: InterpreterState,
    /// KECCAK256 implementation
    hasher: HashFn,
}

impl Interpreter {
    /// Create an interpreter for `message` over already analysed code
    pub fn new(message: Message, code: AnalyzedCode) -> Self {
        Self {
            code,
            pc: 0,
            stack: Stack::new(),
            memory: Memory::new(),
            gas_left: message.gas,
            gas_refund: 0,
            return_data: Bytes::new(),
            output: Bytes::new(),
            state: InterpreterState::Running,
            hasher: keccak256,
            message,
        }
    }

    /// Replace the KECCAK256 implementation
    pub fn with_hasher(mut self, hasher: HashFn) -> Self {
        self.hasher = hasher;
        self
    }

    /// Execute until the frame halts or faults.
    ///
    /// Output bytes move into the returned result.
    pub fn run(&mut self, host: &mut dyn Host) -> ExecutionResult {
        while self.state == InterpreterState::Running {
            self.step(host);
        }
        let output = std::mem::take(&mut self.output);
        ExecutionResult::build(&self.state, self.gas_left, self.gas_refund, output)
    }

    /// Execute a single instruction
    pub fn step(&mut self, host: &mut dyn Host) -> &InterpreterState {
        if self.state != InterpreterState::Running {
            return &self.state;
        }

        match self.execute_next(host) {
            Ok(Control::Continue) => {}
            Ok(Control::Halt(reason)) => {
                trace!(pc = self.pc, ?reason, gas_left = self.gas_left, "frame halted");
                self.state = InterpreterState::Halted(reason);
            }
            Err(err) => {
                trace!(pc = self.pc, %err, depth = self.message.depth, "frame faulted");
                self.gas_left = 0;
                self.output = Bytes::new();
                self.state = InterpreterState::Faulted(err);
            }
        }
        &self.state
    }

    /// Current lifecycle state
    pub fn state(&self) -> &InterpreterState {
        &self.state
    }

    /// Stack contents
    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    /// Memory contents
    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Gas remaining
    pub fn gas_left(&self) -> i64 {
        self.gas_left
    }

    /// Accumulated refund
    pub fn gas_refund(&self) -> i64 {
        self.gas_refund
    }

    /// Program counter
    pub fn pc(&self) -> usize {
        self.pc
    }

    /// Return data of the last nested call
    pub fn return_data(&self) -> &Bytes {
        &self.return_data
    }

    /// Call context
    pub fn message(&self) -> &Message {
        &self.message
    }

    fn execute_next(&mut self, host: &mut dyn Host) -> EvmResult<Control> {
        let Some(&byte) = self.code.bytes().get(self.pc) else {
            return Ok(Control::Halt(HaltReason::Success));
        };
        let opcode = Opcode::from_byte(byte).ok_or(EvmError::InvalidInstruction(byte))?;

        let (inputs, outputs) = opcode.stack_io();
        if self.stack.len() < inputs {
            return Err(EvmError::StackUnderflow);
        }
        if self.stack.len() - inputs + outputs > cost::MAX_STACK_SIZE {
            return Err(EvmError::StackOverflow);
        }

        self.charge(gas::static_gas(opcode))?;
        self.execute(opcode, host)
    }

    /// Deduct gas; the counter is untouched when it would go negative
    fn charge(&mut self, amount: i64) -> EvmResult<()> {
        match self.gas_left.checked_sub(amount) {
            Some(remaining) if remaining >= 0 => {
                self.gas_left = remaining;
                Ok(())
            }
            _ => Err(EvmError::OutOfGas),
        }
    }

    /// Charge for and perform the growth needed to touch `[offset, offset + size)`.
    /// A zero size never touches memory and returns `(0, 0)`.
    fn memory_region(&mut self, offset: Word, size: Word) -> EvmResult<(usize, usize)> {
        if size.is_zero() {
            return Ok((0, 0));
        }
        let size = word::to_usize(size).ok_or(EvmError::MemoryLimitExceeded)?;
        let offset = word::to_usize(offset).ok_or(EvmError::MemoryLimitExceeded)?;
        match offset.checked_add(size) {
            Some(end) if end <= cost::MAX_MEMORY_SIZE => {}
            _ => return Err(EvmError::MemoryLimitExceeded),
        }

        let new_size = self.memory.size_after(offset, size);
        if new_size > self.memory.size() {
            self.charge(gas::memory_gas(self.memory.size(), new_size))?;
            self.memory.grow(new_size);
        }
        Ok((offset, size))
    }

    /// Copy `len` bytes of `data` from `src` into memory at `dest`, zero padded
    fn copy_to_memory(&mut self, dest: Word, src: Word, len: Word, data: &[u8]) -> EvmResult<()> {
        let length = word::to_usize(len).ok_or(EvmError::MemoryLimitExceeded)?;
        self.charge(gas::copy_gas(length))?;
        let (dest, length) = self.memory_region(dest, len)?;
        self.memory
            .store_padded(dest, length, data, word::to_usize_saturated(src));
        Ok(())
    }

    fn jump_target(&self, dest: Word) -> EvmResult<usize> {
        word::to_usize(dest)
            .filter(|&pos| self.code.is_jump_dest(pos))
            .ok_or(EvmError::InvalidJumpDestination(word::to_usize_saturated(dest)))
    }

    fn require_non_static(&self) -> EvmResult<()> {
        if self.message.is_static {
            return Err(EvmError::StaticModeViolation);
        }
        Ok(())
    }

    fn binary(&mut self, op: impl FnOnce(Word, Word) -> Word) -> EvmResult<()> {
        let a = self.stack.pop()?;
        let b = self.stack.pop()?;
        self.stack.push(op(a, b))
    }

    fn compare(&mut self, op: impl FnOnce(Word, Word) -> bool) -> EvmResult<()> {
        let a = self.stack.pop()?;
        let b = self.stack.pop()?;
        self.stack.push(word::from_bool(op(a, b)))
    }

    fn ternary(&mut self, op: impl FnOnce(Word, Word, Word) -> Word) -> EvmResult<()> {
        let a = self.stack.pop()?;
        let b = self.stack.pop()?;
        let n = self.stack.pop()?;
        self.stack.push(op(a, b, n))
    }

    /// Execute an opcode whose stack requirements and static gas are settled
    fn execute(&mut self, opcode: Opcode, host: &mut dyn Host) -> EvmResult<Control> {
        match opcode {
            Opcode::STOP => return Ok(Control::Halt(HaltReason::Success)),

            // Arithmetic
            Opcode::ADD => self.binary(word::add)?,
            Opcode::MUL => self.binary(word::mul)?,
            Opcode::SUB => self.binary(word::sub)?,
            Opcode::DIV => self.binary(word::div)?,
            Opcode::SDIV => self.binary(word::sdiv)?,
            Opcode::MOD => self.binary(word::rem)?,
            Opcode::SMOD => self.binary(word::smod)?,
            Opcode::ADDMOD => self.ternary(word::addmod)?,
            Opcode::MULMOD => self.ternary(word::mulmod)?,
            Opcode::EXP => {
                let base = self.stack.pop()?;
                let exponent = self.stack.pop()?;
                self.charge(gas::exp_gas(exponent))?;
                self.stack.push(word::exp(base, exponent))?;
            }
            Opcode::SIGNEXTEND => self.binary(word::signextend)?,

            // Comparison & bitwise
            Opcode::LT => self.compare(|a, b| a < b)?,
            Opcode::GT => self.compare(|a, b| a > b)?,
            Opcode::SLT => self.compare(word::slt)?,
            Opcode::SGT => self.compare(word::sgt)?,
            Opcode::EQ => self.compare(|a, b| a == b)?,
            Opcode::ISZERO => {
                let a = self.stack.pop()?;
                self.stack.push(word::from_bool(a.is_zero()))?;
            }
            Opcode::AND => self.binary(|a, b| a & b)?,
            Opcode::OR => self.binary(|a, b| a | b)?,
            Opcode::XOR => self.binary(|a, b| a ^ b)?,
            Opcode::NOT => {
                let a = self.stack.pop()?;
                self.stack.push(!a)?;
            }
            Opcode::BYTE => self.binary(word::byte)?,
            Opcode::SHL => self.binary(word::shl)?,
            Opcode::SHR => self.binary(word::shr)?,
            Opcode::SAR => self.binary(word::sar)?,

            Opcode::KECCAK256 => {
                let offset = self.stack.pop()?;
                let size = self.stack.pop()?;
                let length = word::to_usize(size).ok_or(EvmError::MemoryLimitExceeded)?;
                self.charge(gas::sha3_word_gas(length))?;
                let (offset, length) = self.memory_region(offset, size)?;
                let hash = (self.hasher)(self.memory.slice(offset, length));
                self.stack.push(h256_to_word(&hash))?;
            }

            // Environment
            Opcode::ADDRESS => self.stack.push(address_to_word(&self.message.recipient))?,
            Opcode::BALANCE => {
                let address = word_to_address(self.stack.pop()?);
                self.stack.push(host.get_balance(&address))?;
            }
            Opcode::ORIGIN => self.stack.push(address_to_word(&host.get_tx_context().origin))?,
            Opcode::CALLER => self.stack.push(address_to_word(&self.message.sender))?,
            Opcode::CALLVALUE => self.stack.push(self.message.value)?,
            Opcode::CALLDATALOAD => {
                let offset = self.stack.pop()?;
                let mut bytes = [0u8; 32];
                if let Some(tail) = word::to_usize(offset).and_then(|o| self.message.input.get(o..)) {
                    let n = tail.len().min(32);
                    bytes[..n].copy_from_slice(&tail[..n]);
                }
                self.stack.push(Word::from_big_endian(&bytes))?;
            }
            Opcode::CALLDATASIZE => self.stack.push(Word::from(self.message.input.len()))?,
            Opcode::CALLDATACOPY => {
                let dest = self.stack.pop()?;
                let src = self.stack.pop()?;
                let len = self.stack.pop()?;
                let data = self.message.input.clone();
                self.copy_to_memory(dest, src, len, &data)?;
            }
            Opcode::CODESIZE => self.stack.push(Word::from(self.code.len()))?,
            Opcode::CODECOPY => {
                let dest = self.stack.pop()?;
                let src = self.stack.pop()?;
                let len = self.stack.pop()?;
                let code = self.code.bytes().clone();
                self.copy_to_memory(dest, src, len, &code)?;
            }
            Opcode::GASPRICE => self.stack.push(host.get_tx_context().gas_price)?,
            Opcode::EXTCODESIZE => {
                let address = word_to_address(self.stack.pop()?);
                self.stack.push(Word::from(host.get_code_size(&address)))?;
            }
            Opcode::EXTCODECOPY => {
                let address = word_to_address(self.stack.pop()?);
                let dest = self.stack.pop()?;
                let src = self.stack.pop()?;
                let len = self.stack.pop()?;
                let code = host.get_code(&address);
                self.copy_to_memory(dest, src, len, &code)?;
            }
            Opcode::RETURNDATASIZE => self.stack.push(Word::from(self.return_data.len()))?,
            Opcode::RETURNDATACOPY => {
                let dest = self.stack.pop()?;
                let src = self.stack.pop()?;
                let len = self.stack.pop()?;
                let (end, overflow) = src.overflowing_add(len);
                if overflow || end > Word::from(self.return_data.len()) {
                    return Err(EvmError::ReturnDataOutOfBounds);
                }
                let data = self.return_data.clone();
                self.copy_to_memory(dest, src, len, &data)?;
            }
            Opcode::EXTCODEHASH => {
                let address = word_to_address(self.stack.pop()?);
                self.stack.push(h256_to_word(&host.get_code_hash(&address)))?;
            }

            // Block
            Opcode::BLOCKHASH => {
                let number = self.stack.pop()?;
                let current = host.get_tx_context().number;
                let hash = match word::to_usize(number).map(|n| n as u64) {
                    Some(n) if n < current && current - n <= 256 => host.get_block_hash(n),
                    _ => H256::ZERO,
                };
                self.stack.push(h256_to_word(&hash))?;
            }
            Opcode::COINBASE => {
                self.stack.push(address_to_word(&host.get_tx_context().coinbase))?
            }
            Opcode::TIMESTAMP => self.stack.push(Word::from(host.get_tx_context().timestamp))?,
            Opcode::NUMBER => self.stack.push(Word::from(host.get_tx_context().number))?,
            Opcode::PREVRANDAO => {
                self.stack.push(h256_to_word(&host.get_tx_context().prevrandao))?
            }
            Opcode::GASLIMIT => self.stack.push(Word::from(host.get_tx_context().gas_limit))?,
            Opcode::CHAINID => self.stack.push(Word::from(host.get_tx_context().chain_id))?,
            Opcode::SELFBALANCE => {
                let balance = host.get_balance(&self.message.recipient);
                self.stack.push(balance)?;
            }
            Opcode::BASEFEE => self.stack.push(host.get_tx_context().base_fee)?,

            // Stack, memory, storage and flow
            Opcode::POP => {
                self.stack.pop()?;
            }
            Opcode::MLOAD => {
                let offset = self.stack.pop()?;
                let (offset, _) = self.memory_region(offset, Word::from(32u32))?;
                self.stack.push(self.memory.load(offset))?;
            }
            Opcode::MSTORE => {
                let offset = self.stack.pop()?;
                let value = self.stack.pop()?;
                let (offset, _) = self.memory_region(offset, Word::from(32u32))?;
                self.memory.store(offset, value);
            }
            Opcode::MSTORE8 => {
                let offset = self.stack.pop()?;
                let value = self.stack.pop()?;
                let (offset, _) = self.memory_region(offset, Word::one())?;
                self.memory.store8(offset, value.byte(0));
            }
            Opcode::SLOAD => {
                let key = word_to_h256(self.stack.pop()?);
                let value = host.get_storage(&self.message.recipient, &key);
                self.stack.push(h256_to_word(&value))?;
            }
            Opcode::SSTORE => {
                self.require_non_static()?;
                if self.gas_left <= cost::CALL_STIPEND {
                    return Err(EvmError::OutOfGas);
                }
                let key = word_to_h256(self.stack.pop()?);
                let value = word_to_h256(self.stack.pop()?);
                let current = host.get_storage(&self.message.recipient, &key);
                let status = StorageStatus::classify(&current, &value);
                self.charge(gas::sstore_gas(status))?;
                self.gas_refund += gas::sstore_refund(status);
                host.set_storage(&self.message.recipient, key, value);
            }
            Opcode::JUMP => {
                let dest = self.stack.pop()?;
                self.pc = self.jump_target(dest)?;
                return Ok(Control::Continue);
            }
            Opcode::JUMPI => {
                let dest = self.stack.pop()?;
                let condition = self.stack.pop()?;
                if !condition.is_zero() {
                    self.pc = self.jump_target(dest)?;
                    return Ok(Control::Continue);
                }
            }
            Opcode::PC => self.stack.push(Word::from(self.pc))?,
            Opcode::MSIZE => self.stack.push(Word::from(self.memory.size()))?,
            Opcode::GAS => self.stack.push(Word::from(self.gas_left as u64))?,
            Opcode::JUMPDEST => {}
            Opcode::MCOPY => {
                let dest = self.stack.pop()?;
                let src = self.stack.pop()?;
                let len = self.stack.pop()?;
                let length = word::to_usize(len).ok_or(EvmError::MemoryLimitExceeded)?;
                self.charge(gas::copy_gas(length))?;
                if length > 0 {
                    self.memory_region(dest.max(src), len)?;
                    let dest = word::to_usize_saturated(dest);
                    let src = word::to_usize_saturated(src);
                    self.memory.copy(dest, src, length);
                }
            }

            // Push
            Opcode::PUSH0 => self.stack.push(Word::zero())?,
            Opcode::PUSH1 | Opcode::PUSH2 | Opcode::PUSH3 | Opcode::PUSH4 | Opcode::PUSH5 | Opcode::PUSH6
            | Opcode::PUSH7 | Opcode::PUSH8 | Opcode::PUSH9 | Opcode::PUSH10 | Opcode::PUSH11 | Opcode::PUSH12
            | Opcode::PUSH13 | Opcode::PUSH14 | Opcode::PUSH15 | Opcode::PUSH16 | Opcode::PUSH17 | Opcode::PUSH18
            | Opcode::PUSH19 | Opcode::PUSH20 | Opcode::PUSH21 | Opcode::PUSH22 | Opcode::PUSH23 | Opcode::PUSH24
            | Opcode::PUSH25 | Opcode::PUSH26 | Opcode::PUSH27 | Opcode::PUSH28 | Opcode::PUSH29 | Opcode::PUSH30
            | Opcode::PUSH31 | Opcode::PUSH32 => {
                let size = opcode.push_size();
                let start = self.pc + 1;
                let code = self.code.bytes();
                let end = (start + size).min(code.len());
                let mut bytes = [0u8; 32];
                if start < end {
                    // missing trailing bytes read as zero
                    bytes[32 - size..32 - size + (end - start)].copy_from_slice(&code[start..end]);
                }
                self.stack.push(Word::from_big_endian(&bytes))?;
                self.pc += size;
            }

            // Dup / Swap
            Opcode::DUP1 | Opcode::DUP2 | Opcode::DUP3 | Opcode::DUP4 | Opcode::DUP5 | Opcode::DUP6
            | Opcode::DUP7 | Opcode::DUP8 | Opcode::DUP9 | Opcode::DUP10 | Opcode::DUP11 | Opcode::DUP12
            | Opcode::DUP13 | Opcode::DUP14 | Opcode::DUP15 | Opcode::DUP16 => {
                self.stack.dup(opcode.dup_depth())?
            }
            Opcode::SWAP1 | Opcode::SWAP2 | Opcode::SWAP3 | Opcode::SWAP4 | Opcode::SWAP5 | Opcode::SWAP6
            | Opcode::SWAP7 | Opcode::SWAP8 | Opcode::SWAP9 | Opcode::SWAP10 | Opcode::SWAP11 | Opcode::SWAP12
            | Opcode::SWAP13 | Opcode::SWAP14 | Opcode::SWAP15 | Opcode::SWAP16 => {
                self.stack.swap(opcode.swap_depth())?
            }

            // Logging
            Opcode::LOG0 | Opcode::LOG1 | Opcode::LOG2 | Opcode::LOG3 | Opcode::LOG4 => {
                self.require_non_static()?;
                let offset = self.stack.pop()?;
                let size = self.stack.pop()?;
                let mut topics = Vec::with_capacity(opcode.log_topics());
                for _ in 0..opcode.log_topics() {
                    topics.push(word_to_h256(self.stack.pop()?));
                }
                let length = word::to_usize(size).ok_or(EvmError::MemoryLimitExceeded)?;
                self.charge(gas::log_data_gas(length))?;
                let (offset, length) = self.memory_region(offset, size)?;
                host.emit_log(
                    &self.message.recipient,
                    &topics,
                    self.memory.slice(offset, length),
                );
            }

            // System
            Opcode::CREATE | Opcode::CREATE2 => self.create(opcode, host)?,
            Opcode::CALL | Opcode::CALLCODE | Opcode::DELEGATECALL | Opcode::STATICCALL => {
                self.call(opcode, host)?
            }
            Opcode::RETURN | Opcode::REVERT => {
                let offset = self.stack.pop()?;
                let size = self.stack.pop()?;
                let (offset, length) = self.memory_region(offset, size)?;
                self.output = Bytes::copy_from_slice(self.memory.slice(offset, length));
                let reason = if opcode == Opcode::RETURN {
                    HaltReason::Success
                } else {
                    HaltReason::Revert
                };
                return Ok(Control::Halt(reason));
            }
            Opcode::INVALID => return Err(EvmError::InvalidInstruction(opcode.as_byte())),
        }

        self.pc += 1;
        Ok(Control::Continue)
    }

    fn create(&mut self, opcode: Opcode, host: &mut dyn Host) -> EvmResult<()> {
        self.require_non_static()?;
        let value = self.stack.pop()?;
        let offset = self.stack.pop()?;
        let size = self.stack.pop()?;
        let kind = if opcode == Opcode::CREATE2 {
            CallKind::Create2 {
                salt: word_to_h256(self.stack.pop()?),
            }
        } else {
            CallKind::Create
        };

        let length = word::to_usize(size).ok_or(EvmError::MemoryLimitExceeded)?;
        self.charge(gas::init_code_gas(length, opcode == Opcode::CREATE2))?;
        let (offset, length) = self.memory_region(offset, size)?;
        let init_code = Bytes::copy_from_slice(self.memory.slice(offset, length));

        let gas = gas::max_forwarded_gas(self.gas_left);
        self.gas_left -= gas;

        let message = Message {
            kind,
            is_static: false,
            depth: self.message.depth + 1,
            gas,
            sender: self.message.recipient,
            recipient: Address::ZERO,
            code_address: Address::ZERO,
            input: init_code,
            value,
        };
        let result = host.call(&message);
        self.gas_left = self.gas_left.saturating_add(result.gas_left);

        let created = match (result.status, result.create_address) {
            (StatusCode::Success, Some(address)) => {
                self.gas_refund += result.gas_refund;
                address_to_word(&address)
            }
            _ => Word::zero(),
        };
        self.return_data = if result.status == StatusCode::Revert {
            result.output
        } else {
            Bytes::new()
        };
        self.stack.push(created)
    }

    fn call(&mut self, opcode: Opcode, host: &mut dyn Host) -> EvmResult<()> {
        let requested = self.stack.pop()?;
        let target = word_to_address(self.stack.pop()?);
        let value = match opcode {
            Opcode::CALL | Opcode::CALLCODE => self.stack.pop()?,
            _ => Word::zero(),
        };
        let input_offset = self.stack.pop()?;
        let input_size = self.stack.pop()?;
        let output_offset = self.stack.pop()?;
        let output_size = self.stack.pop()?;

        let transfers_value = !value.is_zero();
        if opcode == Opcode::CALL && transfers_value {
            self.require_non_static()?;
        }

        let (input_offset, input_len) = self.memory_region(input_offset, input_size)?;
        let (output_offset, output_len) = self.memory_region(output_offset, output_size)?;

        if transfers_value {
            let mut value_cost = cost::CALL_VALUE;
            if opcode == Opcode::CALL && !host.account_exists(&target) {
                value_cost += cost::CALL_NEW_ACCOUNT;
            }
            self.charge(value_cost)?;
        }

        let mut gas = word::to_gas_saturated(requested).min(gas::max_forwarded_gas(self.gas_left));
        self.gas_left -= gas;
        if transfers_value {
            gas += cost::CALL_STIPEND;
        }

        let input = Bytes::copy_from_slice(self.memory.slice(input_offset, input_len));
        let message = match opcode {
            Opcode::CALLCODE => Message {
                kind: CallKind::CallCode,
                is_static: self.message.is_static,
                depth: self.message.depth + 1,
                gas,
                sender: self.message.recipient,
                recipient: self.message.recipient,
                code_address: target,
                input,
                value,
            },
            Opcode::DELEGATECALL => Message {
                kind: CallKind::DelegateCall,
                is_static: self.message.is_static,
                depth: self.message.depth + 1,
                gas,
                sender: self.message.sender,
                recipient: self.message.recipient,
                code_address: target,
                input,
                value: self.message.value,
            },
            _ => Message {
                kind: CallKind::Call,
                is_static: self.message.is_static || opcode == Opcode::STATICCALL,
                depth: self.message.depth + 1,
                gas,
                sender: self.message.recipient,
                recipient: target,
                code_address: target,
                input,
                value,
            },
        };

        let result = host.call(&message);
        let success = result.is_success();
        self.gas_left = self.gas_left.saturating_add(result.gas_left);
        if success {
            self.gas_refund += result.gas_refund;
        }

        let copied = output_len.min(result.output.len());
        self.memory
            .store_slice(output_offset, &result.output[..copied]);
        self.return_data = result.output;
        self.stack.push(word::from_bool(success))
    }
}

/// Execute `code` for `message` against `host`
pub fn execute(host: &mut dyn Host, message: &Message, code: Bytes) -> ExecutionResult {
    AnalyzedCode::analyze(code).execute(host, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::TxContext;
    use std::collections::HashMap;

    #[derive(Default)]
    struct TestHost {
        storage: HashMap<H256, H256>,
        logs: Vec<(Address, Vec<H256>, Vec<u8>)>,
        calls: Vec<Message>,
        call_result: Option<ExecutionResult>,
        tx: TxContext,
        block_hashes: HashMap<u64, H256>,
    }

    impl Host for TestHost {
        fn account_exists(&self, _address: &Address) -> bool {
            true
        }

        fn get_balance(&self, _address: &Address) -> Word {
            Word::from(1000u32)
        }

        fn get_code(&self, _address: &Address) -> Bytes {
            Bytes::from_static(&[0x60, 0x01])
        }

        fn get_code_hash(&self, _address: &Address) -> H256 {
            H256::ZERO
        }

        fn get_storage(&self, _address: &Address, key: &H256) -> H256 {
            self.storage.get(key).copied().unwrap_or_default()
        }

        fn set_storage(&mut self, _address: &Address, key: H256, value: H256) -> StorageStatus {
            let status = StorageStatus::classify(&self.get_storage(&Address::ZERO, &key), &value);
            self.storage.insert(key, value);
            status
        }

        fn emit_log(&mut self, address: &Address, topics: &[H256], data: &[u8]) {
            self.logs.push((*address, topics.to_vec(), data.to_vec()));
        }

        fn call(&mut self, message: &Message) -> ExecutionResult {
            self.calls.push(message.clone());
            let mut result = self
                .call_result
                .clone()
                .unwrap_or_else(|| ExecutionResult::success(0, 0, Bytes::new()));
            if !result.status.is_fault() {
                result.gas_left = message.gas;
            }
            result
        }

        fn get_tx_context(&self) -> TxContext {
            self.tx.clone()
        }

        fn get_block_hash(&self, number: u64) -> H256 {
            self.block_hashes.get(&number).copied().unwrap_or_default()
        }
    }

    fn caller() -> Address {
        Address::from_hex("0x1000000000000000000000000000000000000001").unwrap()
    }

    fn contract() -> Address {
        Address::from_hex("0x2000000000000000000000000000000000000002").unwrap()
    }

    fn frame(gas: i64) -> Message {
        Message::call(caller(), contract(), Bytes::new(), gas)
    }

    fn run_with(host: &mut TestHost, message: Message, code: &[u8]) -> (ExecutionResult, Interpreter) {
        let mut interp = Interpreter::new(message, AnalyzedCode::analyze(Bytes::copy_from_slice(code)));
        let result = interp.run(host);
        (result, interp)
    }

    fn run_code(code: &[u8], gas: i64) -> (ExecutionResult, Interpreter, TestHost) {
        let mut host = TestHost::default();
        let (result, interp) = run_with(&mut host, frame(gas), code);
        (result, interp, host)
    }

    fn h(n: u64) -> H256 {
        word_to_h256(Word::from(n))
    }

    // ==================== Arithmetic and flow ====================

    #[test]
    fn test_add_leaves_sum_on_stack() {
        // PUSH1 1, PUSH1 2, ADD, STOP
        let (result, interp, _) = run_code(&[0x60, 0x01, 0x60, 0x02, 0x01, 0x00], 100);
        assert!(result.is_success());
        assert_eq!(interp.stack().as_slice(), &[Word::from(3u32)]);
        assert_eq!(result.gas_left, 91);
        assert_eq!(result.gas_used(100), 9);
    }

    #[test]
    fn test_empty_code_succeeds() {
        let (result, _, _) = run_code(&[], 100);
        assert!(result.is_success());
        assert_eq!(result.gas_left, 100);
        assert!(result.output.is_empty());
    }

    #[test]
    fn test_sub_wraps() {
        // PUSH1 1, PUSH0, SUB -> 0 - 1
        let (result, interp, _) = run_code(&[0x60, 0x01, 0x5f, 0x03], 100);
        assert!(result.is_success());
        assert_eq!(interp.stack().as_slice(), &[Word::MAX]);
    }

    #[test]
    fn test_div_by_zero() {
        // PUSH0, PUSH1 7, DIV -> 7 / 0
        let (result, interp, _) = run_code(&[0x5f, 0x60, 0x07, 0x04], 100);
        assert!(result.is_success());
        assert_eq!(interp.stack().as_slice(), &[Word::zero()]);
    }

    #[test]
    fn test_exp_charges_exponent_bytes() {
        // PUSH2 0x0100, PUSH1 2, EXP -> 2^256
        let (result, interp, _) = run_code(&[0x61, 0x01, 0x00, 0x60, 0x02, 0x0a], 1000);
        assert!(result.is_success());
        assert_eq!(interp.stack().as_slice(), &[Word::zero()]);
        assert_eq!(result.gas_used(1000), 3 + 3 + 10 + 100);
    }

    #[test]
    fn test_push_truncated_at_end_of_code() {
        // PUSH2 with a single data byte
        let (result, interp, _) = run_code(&[0x61, 0x01], 100);
        assert!(result.is_success());
        assert_eq!(interp.stack().as_slice(), &[Word::from(0x0100u32)]);
    }

    #[test]
    fn test_pc_and_msize() {
        let (result, interp, _) = run_code(&[0x58, 0x59], 100);
        assert!(result.is_success());
        assert_eq!(interp.stack().as_slice(), &[Word::zero(), Word::zero()]);
    }

    #[test]
    fn test_valid_jump() {
        // PUSH1 4, JUMP, INVALID, JUMPDEST, PUSH1 7, STOP
        let code = [0x60, 0x04, 0x56, 0xfe, 0x5b, 0x60, 0x07, 0x00];
        let (result, interp, _) = run_code(&code, 100);
        assert!(result.is_success());
        assert_eq!(interp.stack().as_slice(), &[Word::from(7u32)]);
    }

    #[test]
    fn test_invalid_jump_destination() {
        // PUSH1 3, JUMP, STOP, STOP
        let (result, interp, _) = run_code(&[0x60, 0x03, 0x56, 0x00, 0x00], 100);
        assert_eq!(result.status, StatusCode::InvalidJumpDestination);
        assert_eq!(result.gas_left, 0);
        assert_eq!(
            interp.state(),
            &InterpreterState::Faulted(EvmError::InvalidJumpDestination(3))
        );
    }

    #[test]
    fn test_jump_into_push_data() {
        // PUSH1 4, JUMP, PUSH1 0x5b, STOP
        let (result, _, _) = run_code(&[0x60, 0x04, 0x56, 0x60, 0x5b, 0x00], 100);
        assert_eq!(result.status, StatusCode::InvalidJumpDestination);
    }

    #[test]
    fn test_jumpi_not_taken() {
        // PUSH0, PUSH1 0x10, JUMPI, PUSH1 1, STOP
        let (result, interp, _) = run_code(&[0x5f, 0x60, 0x10, 0x57, 0x60, 0x01, 0x00], 100);
        assert!(result.is_success());
        assert_eq!(interp.stack().as_slice(), &[Word::one()]);
    }

    #[test]
    fn test_step_by_step() {
        let mut host = TestHost::default();
        let mut interp = Interpreter::new(frame(100), AnalyzedCode::analyze(Bytes::from_static(&[0x5f, 0x00])));
        assert_eq!(interp.step(&mut host), &InterpreterState::Running);
        assert_eq!(interp.pc(), 1);
        assert_eq!(interp.step(&mut host), &InterpreterState::Halted(HaltReason::Success));
        assert_eq!(interp.step(&mut host), &InterpreterState::Halted(HaltReason::Success));
        assert_eq!(interp.gas_left(), 98);
    }

    // ==================== Faults ====================

    #[test]
    fn test_stack_underflow() {
        let (result, interp, _) = run_code(&[0x01], 100);
        assert_eq!(result.status, StatusCode::StackUnderflow);
        assert_eq!(result.gas_left, 0);
        assert!(result.output.is_empty());
        assert_eq!(interp.gas_left(), 0);
    }

    #[test]
    fn test_stack_overflow() {
        let (result, interp, _) = run_code(&[0x5f; 1025], 10_000);
        assert_eq!(result.status, StatusCode::StackOverflow);
        assert_eq!(interp.stack().len(), 1024);
    }

    #[test]
    fn test_undefined_opcode() {
        let (result, _, _) = run_code(&[0x0c], 100);
        assert_eq!(result.status, StatusCode::InvalidInstruction);
    }

    #[test]
    fn test_invalid_opcode() {
        let (result, interp, _) = run_code(&[0xfe], 100);
        assert_eq!(result.status, StatusCode::InvalidInstruction);
        assert_eq!(
            interp.state(),
            &InterpreterState::Faulted(EvmError::InvalidInstruction(0xfe))
        );
    }

    #[test]
    fn test_every_defined_opcode_is_dispatched() {
        for byte in 0..=u8::MAX {
            let Some(opcode) = Opcode::from_byte(byte) else {
                continue;
            };
            if opcode == Opcode::INVALID {
                continue;
            }
            // enough zero operands for SWAP16
            let mut code = vec![0x5f; 17];
            code.push(byte);
            let (result, _, _) = run_code(&code, 1_000_000);
            assert_ne!(
                result.status,
                StatusCode::InvalidInstruction,
                "{} was not dispatched",
                opcode
            );
        }
    }

    #[test]
    fn test_transient_storage_unsupported() {
        // PUSH0, TLOAD
        let (result, _, _) = run_code(&[0x5f, 0x5c], 100);
        assert_eq!(result.status, StatusCode::InvalidInstruction);
    }

    #[test]
    fn test_out_of_gas_on_static_cost() {
        let (result, _, _) = run_code(&[0x60, 0x01, 0x60, 0x02, 0x01], 8);
        assert_eq!(result.status, StatusCode::OutOfGas);
        assert_eq!(result.gas_left, 0);
    }

    // ==================== Memory ====================

    #[test]
    fn test_mload_grows_and_charges() {
        // PUSH1 0x40, MLOAD
        let (result, interp, _) = run_code(&[0x60, 0x40, 0x51], 100);
        assert!(result.is_success());
        assert_eq!(interp.memory().size(), 96);
        assert_eq!(interp.stack().as_slice(), &[Word::zero()]);
        // PUSH1 + MLOAD + 3 words of memory
        assert_eq!(result.gas_used(100), 3 + 3 + 9);
    }

    #[test]
    fn test_memory_charged_before_growth() {
        // PUSH1 0x2a, PUSH1 0, MSTORE; needs 12 gas
        let code = [0x60, 0x2a, 0x60, 0x00, 0x52];
        let (result, interp, _) = run_code(&code, 11);
        assert_eq!(result.status, StatusCode::OutOfGas);
        assert_eq!(interp.memory().size(), 0);

        let (result, interp, _) = run_code(&code, 12);
        assert!(result.is_success());
        assert_eq!(result.gas_left, 0);
        assert_eq!(interp.memory().load(0), Word::from(0x2au32));
    }

    #[test]
    fn test_memory_limit_exceeded() {
        // PUSH32 MAX, MLOAD
        let mut code = vec![0x7f];
        code.extend_from_slice(&[0xff; 32]);
        code.push(0x51);
        let (result, _, _) = run_code(&code, 1_000_000);
        assert_eq!(result.status, StatusCode::MemoryLimitExceeded);
    }

    #[test]
    fn test_return_data() {
        // PUSH1 0x2a, PUSH1 0, MSTORE, PUSH1 32, PUSH1 0, RETURN
        let code = [0x60, 0x2a, 0x60, 0x00, 0x52, 0x60, 0x20, 0x60, 0x00, 0xf3];
        let (result, _, _) = run_code(&code, 100);
        assert!(result.is_success());
        assert_eq!(result.output.len(), 32);
        assert_eq!(result.output[31], 0x2a);
    }

    #[test]
    fn test_revert_keeps_output_and_gas() {
        // PUSH1 0xff, PUSH1 0, MSTORE8, PUSH1 1, PUSH1 0, REVERT
        let code = [0x60, 0xff, 0x60, 0x00, 0x53, 0x60, 0x01, 0x60, 0x00, 0xfd];
        let (result, _, _) = run_code(&code, 1000);
        assert_eq!(result.status, StatusCode::Revert);
        assert_eq!(result.output.as_ref(), &[0xff]);
        assert_eq!(result.gas_left, 1000 - 18);
    }

    #[test]
    fn test_calldataload_pads() {
        let mut host = TestHost::default();
        let message = Message {
            input: Bytes::from_static(&[0xaa, 0xbb]),
            ..frame(100)
        };
        // PUSH0, CALLDATALOAD
        let (result, interp) = run_with(&mut host, message, &[0x5f, 0x35]);
        assert!(result.is_success());
        assert_eq!(
            interp.stack().as_slice(),
            &[Word::from(0xaabbu32) << 240u32]
        );
    }

    #[test]
    fn test_calldatacopy_zero_fills() {
        let mut host = TestHost::default();
        let message = Message {
            input: Bytes::from_static(&[1, 2, 3]),
            ..frame(100)
        };
        // PUSH1 5, PUSH1 1, PUSH0, CALLDATACOPY
        let (result, interp) = run_with(&mut host, message, &[0x60, 0x05, 0x60, 0x01, 0x5f, 0x37]);
        assert!(result.is_success());
        assert_eq!(&interp.memory().data()[..6], &[2, 3, 0, 0, 0, 0]);
        assert_eq!(interp.memory().size(), 32);
    }

    #[test]
    fn test_returndatacopy_out_of_bounds() {
        // PUSH1 1, PUSH0, PUSH0, RETURNDATACOPY
        let (result, _, _) = run_code(&[0x60, 0x01, 0x5f, 0x5f, 0x3e], 100);
        assert_eq!(result.status, StatusCode::ReturnDataOutOfBounds);
    }

    #[test]
    fn test_mcopy() {
        // PUSH1 0xab, PUSH0, MSTORE8, PUSH1 1, PUSH0, PUSH1 1, MCOPY
        let code = [0x60, 0xab, 0x5f, 0x53, 0x60, 0x01, 0x5f, 0x60, 0x01, 0x5e];
        let (result, interp, _) = run_code(&code, 100);
        assert!(result.is_success());
        assert_eq!(&interp.memory().data()[..2], &[0xab, 0xab]);
    }

    // ==================== Hashing ====================

    #[test]
    fn test_keccak_of_empty() {
        let (result, interp, _) = run_code(&[0x5f, 0x5f, 0x20], 100);
        assert!(result.is_success());
        let expected = H256::from_hex(
            "0xc5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470",
        )
        .unwrap();
        assert_eq!(interp.stack().as_slice(), &[h256_to_word(&expected)]);
    }

    #[test]
    fn test_custom_hasher() {
        fn ones(_: &[u8]) -> H256 {
            H256::from_bytes([1u8; 32])
        }
        let mut host = TestHost::default();
        let code = AnalyzedCode::analyze(Bytes::from_static(&[0x5f, 0x5f, 0x20]));
        let mut interp = Interpreter::new(frame(100), code).with_hasher(ones);
        assert!(interp.run(&mut host).is_success());
        assert_eq!(
            interp.stack().as_slice(),
            &[h256_to_word(&H256::from_bytes([1u8; 32]))]
        );
    }

    // ==================== Storage ====================

    #[test]
    fn test_sstore_added() {
        // PUSH1 0x2a, PUSH0, SSTORE
        let (result, _, host) = run_code(&[0x60, 0x2a, 0x5f, 0x55], 30_000);
        assert!(result.is_success());
        assert_eq!(host.storage.get(&H256::ZERO), Some(&h(0x2a)));
        assert_eq!(result.gas_used(30_000), 3 + 2 + 20_000);
    }

    #[test]
    fn test_sstore_out_of_gas_writes_nothing() {
        let (result, _, host) = run_code(&[0x60, 0x01, 0x5f, 0x55], 10_000);
        assert_eq!(result.status, StatusCode::OutOfGas);
        assert!(host.storage.is_empty());
    }

    #[test]
    fn test_sstore_within_stipend_fails() {
        // 5 gas for the pushes leaves exactly the stipend
        let (result, _, host) = run_code(&[0x60, 0x01, 0x5f, 0x55], 2305);
        assert_eq!(result.status, StatusCode::OutOfGas);
        assert!(host.storage.is_empty());
    }

    #[test]
    fn test_sstore_clear_refund() {
        let mut host = TestHost::default();
        host.storage.insert(H256::ZERO, h(1));
        let (result, interp) = run_with(&mut host, frame(10_000), &[0x5f, 0x5f, 0x55]);
        assert!(result.is_success());
        assert_eq!(result.gas_refund, 4800);
        assert_eq!(interp.gas_refund(), 4800);
        assert_eq!(result.gas_used(10_000), 2 + 2 + 2900);
        assert_eq!(host.storage.get(&H256::ZERO), Some(&H256::ZERO));
    }

    #[test]
    fn test_sload() {
        let mut host = TestHost::default();
        host.storage.insert(h(7), h(99));
        let (result, interp) = run_with(&mut host, frame(1000), &[0x60, 0x07, 0x54]);
        assert!(result.is_success());
        assert_eq!(interp.stack().as_slice(), &[Word::from(99u32)]);
    }

    #[test]
    fn test_sstore_in_static_frame() {
        let mut host = TestHost::default();
        let (result, _) = run_with(&mut host, frame(30_000).into_static(), &[0x60, 0x01, 0x5f, 0x55]);
        assert_eq!(result.status, StatusCode::StaticModeViolation);
        assert!(host.storage.is_empty());
    }

    // ==================== Environment ====================

    #[test]
    fn test_context_opcodes() {
        let mut host = TestHost::default();
        host.tx.chain_id = 5;
        host.tx.timestamp = 1234;
        let message = frame(100).with_value(Word::from(9u32));
        // ADDRESS, CALLER, CALLVALUE, CHAINID, TIMESTAMP
        let (result, interp) = run_with(&mut host, message, &[0x30, 0x33, 0x34, 0x46, 0x42]);
        assert!(result.is_success());
        assert_eq!(
            interp.stack().as_slice(),
            &[
                address_to_word(&contract()),
                address_to_word(&caller()),
                Word::from(9u32),
                Word::from(5u32),
                Word::from(1234u32),
            ]
        );
    }

    #[test]
    fn test_blockhash_window() {
        let mut host = TestHost::default();
        host.tx.number = 300;
        host.block_hashes.insert(299, h(0xaa));
        host.block_hashes.insert(10, h(0xbb));
        // PUSH2 299, BLOCKHASH, PUSH1 10, BLOCKHASH, PUSH2 300, BLOCKHASH
        let code = [0x61, 0x01, 0x2b, 0x40, 0x60, 0x0a, 0x40, 0x61, 0x01, 0x2c, 0x40];
        let (result, interp) = run_with(&mut host, frame(1000), &code);
        assert!(result.is_success());
        assert_eq!(
            interp.stack().as_slice(),
            &[Word::from(0xaau32), Word::zero(), Word::zero()]
        );
    }

    #[test]
    fn test_extcodesize_and_copy() {
        // PUSH1 0x42, EXTCODESIZE, PUSH1 2, PUSH0, PUSH0, PUSH1 0x42, EXTCODECOPY
        let code = [0x60, 0x42, 0x3b, 0x60, 0x02, 0x5f, 0x5f, 0x60, 0x42, 0x3c];
        let (result, interp, _) = run_code(&code, 1000);
        assert!(result.is_success());
        assert_eq!(interp.stack().as_slice(), &[Word::from(2u32)]);
        assert_eq!(&interp.memory().data()[..2], &[0x60, 0x01]);
    }

    // ==================== Logs ====================

    #[test]
    fn test_log0() {
        // PUSH1 0xaa, PUSH0, MSTORE8, PUSH1 1, PUSH0, LOG0
        let code = [0x60, 0xaa, 0x5f, 0x53, 0x60, 0x01, 0x5f, 0xa0];
        let (result, _, host) = run_code(&code, 1000);
        assert!(result.is_success());
        assert_eq!(host.logs, vec![(contract(), vec![], vec![0xaa])]);
    }

    #[test]
    fn test_log1_topic() {
        // PUSH1 7, PUSH0, PUSH0, LOG1
        let (result, _, host) = run_code(&[0x60, 0x07, 0x5f, 0x5f, 0xa1], 1000);
        assert!(result.is_success());
        assert_eq!(host.logs, vec![(contract(), vec![h(7)], vec![])]);
    }

    #[test]
    fn test_log_in_static_frame() {
        let mut host = TestHost::default();
        let (result, _) = run_with(&mut host, frame(1000).into_static(), &[0x5f, 0x5f, 0xa0]);
        assert_eq!(result.status, StatusCode::StaticModeViolation);
        assert!(host.logs.is_empty());
    }

    // ==================== Nested calls ====================

    #[test]
    fn test_call_forwards_all_but_one_64th() {
        // PUSH0 x5, PUSH1 0x42, GAS, CALL
        let code = [0x5f, 0x5f, 0x5f, 0x5f, 0x5f, 0x60, 0x42, 0x5a, 0xf1];
        let (result, interp, host) = run_code(&code, 100_000);
        assert!(result.is_success());
        assert_eq!(host.calls.len(), 1);

        let call = &host.calls[0];
        let available = 100_000 - 15 - 100;
        assert_eq!(call.gas, available - available / 64);
        assert_eq!(call.kind, CallKind::Call);
        assert_eq!(call.depth, 1);
        assert_eq!(call.sender, contract());
        assert_eq!(call.recipient, Address::from_low_u64(0x42));
        assert!(!call.is_static);
        assert_eq!(interp.stack().as_slice(), &[Word::one()]);
        // child spent nothing
        assert_eq!(result.gas_left, available);
    }

    #[test]
    fn test_call_copies_output() {
        let mut host = TestHost::default();
        host.call_result = Some(ExecutionResult::success(0, 0, Bytes::from_static(&[1, 2, 3, 4])));
        // PUSH1 2, PUSH0 x4, PUSH1 0x42, GAS, CALL, RETURNDATASIZE
        let code = [0x60, 0x02, 0x5f, 0x5f, 0x5f, 0x5f, 0x60, 0x42, 0x5a, 0xf1, 0x3d];
        let (result, interp) = run_with(&mut host, frame(100_000), &code);
        assert!(result.is_success());
        assert_eq!(interp.stack().as_slice(), &[Word::one(), Word::from(4u32)]);
        assert_eq!(&interp.memory().data()[..3], &[1, 2, 0]);
        assert_eq!(interp.return_data().as_ref(), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_failed_call_pushes_zero() {
        let mut host = TestHost::default();
        host.call_result = Some(ExecutionResult::failure(StatusCode::OutOfGas));
        let code = [0x5f, 0x5f, 0x5f, 0x5f, 0x5f, 0x60, 0x42, 0x5a, 0xf1];
        let (result, interp) = run_with(&mut host, frame(100_000), &code);
        assert!(result.is_success());
        assert_eq!(interp.stack().as_slice(), &[Word::zero()]);
        assert!(interp.return_data().is_empty());
        // the forwarded gas is gone
        let available = 100_000 - 15 - 100;
        assert_eq!(result.gas_left, available / 64);
    }

    #[test]
    fn test_staticcall_marks_child_static() {
        // PUSH0 x4, PUSH1 0x42, PUSH2 0xffff, STATICCALL
        let code = [0x5f, 0x5f, 0x5f, 0x5f, 0x60, 0x42, 0x61, 0xff, 0xff, 0xfa];
        let (result, _, host) = run_code(&code, 100_000);
        assert!(result.is_success());
        assert!(host.calls[0].is_static);
        assert_eq!(host.calls[0].gas, 0xffff);
    }

    #[test]
    fn test_delegatecall_keeps_sender_and_value() {
        let mut host = TestHost::default();
        let message = frame(100_000).with_value(Word::from(7u32));
        let code = [0x5f, 0x5f, 0x5f, 0x5f, 0x60, 0x42, 0x5a, 0xf4];
        let (result, _) = run_with(&mut host, message, &code);
        assert!(result.is_success());
        let call = &host.calls[0];
        assert_eq!(call.kind, CallKind::DelegateCall);
        assert_eq!(call.sender, caller());
        assert_eq!(call.recipient, contract());
        assert_eq!(call.code_address, Address::from_low_u64(0x42));
        assert_eq!(call.value, Word::from(7u32));
    }

    #[test]
    fn test_call_with_value_in_static_frame() {
        let mut host = TestHost::default();
        // PUSH0 x4, PUSH1 1 (value), PUSH1 0x42, GAS, CALL
        let code = [0x5f, 0x5f, 0x5f, 0x5f, 0x60, 0x01, 0x60, 0x42, 0x5a, 0xf1];
        let (result, _) = run_with(&mut host, frame(100_000).into_static(), &code);
        assert_eq!(result.status, StatusCode::StaticModeViolation);
        assert!(host.calls.is_empty());
    }

    #[test]
    fn test_call_with_value_adds_stipend() {
        let code = [0x5f, 0x5f, 0x5f, 0x5f, 0x60, 0x01, 0x60, 0x42, 0x60, 0x00, 0xf1];
        let (result, _, host) = run_code(&code, 100_000);
        assert!(result.is_success());
        assert_eq!(host.calls[0].gas, cost::CALL_STIPEND);
        assert_eq!(host.calls[0].value, Word::one());
    }

    #[test]
    fn test_create_pushes_new_address() {
        let mut host = TestHost::default();
        let created = Address::from_low_u64(0xc0de);
        host.call_result = Some(ExecutionResult::success(0, 0, Bytes::new()).with_create_address(created));
        // PUSH0, PUSH0, PUSH0, CREATE
        let (result, interp) = run_with(&mut host, frame(100_000), &[0x5f, 0x5f, 0x5f, 0xf0]);
        assert!(result.is_success());
        assert_eq!(interp.stack().as_slice(), &[address_to_word(&created)]);
        assert_eq!(host.calls[0].kind, CallKind::Create);
        assert_eq!(host.calls[0].sender, contract());
        assert_eq!(host.calls[0].depth, 1);
    }

    #[test]
    fn test_create2_passes_salt() {
        // PUSH1 9 (salt), PUSH0, PUSH0, PUSH0, CREATE2
        let (result, interp, host) = run_code(&[0x60, 0x09, 0x5f, 0x5f, 0x5f, 0xf5], 100_000);
        assert!(result.is_success());
        assert_eq!(host.calls[0].kind, CallKind::Create2 { salt: h(9) });
        // no create address reported by the host
        assert_eq!(interp.stack().as_slice(), &[Word::zero()]);
    }

    #[test]
    fn test_create_in_static_frame() {
        let mut host = TestHost::default();
        let (result, _) = run_with(&mut host, frame(100_000).into_static(), &[0x5f, 0x5f, 0x5f, 0xf0]);
        assert_eq!(result.status, StatusCode::StaticModeViolation);
        assert!(host.calls.is_empty());
    }

    #[test]
    fn test_execute_entry_point() {
        let mut host = TestHost::default();
        let result = execute(&mut host, &frame(100), Bytes::from_static(&[0x60, 0x01, 0x00]));
        assert!(result.is_success());
        assert_eq!(result.gas_used(100), 3);
    }
}
