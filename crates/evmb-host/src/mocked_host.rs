//! In-memory host

use crate::account::{Account, LogRecord};
use crate::journal::{Checkpoint, Journal, JournalEntry};
use bytes::Bytes;
use evmb_crypto::{create2_address, create_address};
use evmb_interpreter::gas::{self, cost};
use evmb_interpreter::{
    AnalyzedCode, CallKind, ExecutionResult, Host, Message, StatusCode, StorageStatus, TxContext,
};
use evmb_primitives::{Address, Word, H256};
use std::collections::HashMap;
use tracing::{debug, trace};

/// Number of call messages kept by [`MockedHost::recorded_calls`]
pub const MAX_RECORDED_CALLS: usize = 1024;

/// Native stack a thread needs to run nested frames down to the call depth
/// limit. Each frame recurses through [`Host::call`], so callers that may
/// hit deep recursion run the host on a thread of at least this size.
pub const EXECUTION_STACK_SIZE: usize = (cost::MAX_CALL_DEPTH + 2) * FRAME_STACK_BUDGET;

/// Upper bound of native stack used by one nested frame in unoptimized builds
const FRAME_STACK_BUDGET: usize = 256 * 1024;

/// Deterministic in-memory host.
///
/// Cloning yields an independent copy; analysed code is shared between
/// clones. Changes made by a nested frame are journaled and undone when the
/// frame does not succeed.
#[derive(Clone, Debug, Default)]
pub struct MockedHost {
    accounts: HashMap<Address, Account>,
    tx_context: TxContext,
    block_hashes: HashMap<u64, H256>,
    logs: Vec<LogRecord>,
    recorded_calls: Vec<Message>,
    analyses: HashMap<H256, AnalyzedCode>,
    journal: Journal,
}

impl MockedHost {
    /// Create an empty host with the default transaction context
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the transaction context
    pub fn with_tx_context(mut self, tx_context: TxContext) -> Self {
        self.tx_context = tx_context;
        self
    }

    /// Account at `address`, if it exists
    pub fn account(&self, address: &Address) -> Option<&Account> {
        self.accounts.get(address)
    }

    /// Account at `address`, created empty when missing
    pub fn account_mut(&mut self, address: Address) -> &mut Account {
        self.accounts.entry(address).or_default()
    }

    /// Insert or replace an account
    pub fn insert_account(&mut self, address: Address, account: Account) {
        self.accounts.insert(address, account);
    }

    /// All accounts
    pub fn accounts(&self) -> &HashMap<Address, Account> {
        &self.accounts
    }

    /// Register the hash of block `number`
    pub fn set_block_hash(&mut self, number: u64, hash: H256) {
        self.block_hashes.insert(number, hash);
    }

    /// Logs emitted by frames that were not rolled back
    pub fn logs(&self) -> &[LogRecord] {
        &self.logs
    }

    /// Messages received through [`Host::call`], oldest first, at most
    /// [`MAX_RECORDED_CALLS`]
    pub fn recorded_calls(&self) -> &[Message] {
        &self.recorded_calls
    }

    /// Forget recorded logs and calls
    pub fn clear_records(&mut self) {
        self.logs.clear();
        self.recorded_calls.clear();
    }

    /// Run `creation_code` as a top-level CREATE targeting `recipient` and
    /// store its output as the runtime code on success
    pub fn deploy(
        &mut self,
        sender: Address,
        recipient: Address,
        creation_code: Bytes,
        gas: i64,
    ) -> ExecutionResult {
        debug!(%sender, %recipient, code_len = creation_code.len(), gas, "deploying contract");
        let message = Message::create(sender, recipient, creation_code, gas);
        let result = self.create_at(message);
        debug!(status = %result.status, gas_left = result.gas_left, "deploy finished");
        result
    }

    /// Run `code` for a top-level call `message`; state changes are kept
    /// only when the result is `Success`
    pub fn transact(&mut self, message: &Message, code: &AnalyzedCode) -> ExecutionResult {
        let checkpoint = self.checkpoint();
        let result = match self.transfer_value(message) {
            Some(rejected) => rejected,
            None => code.execute(self, message),
        };
        self.finish(checkpoint, &result);
        result
    }

    fn checkpoint(&mut self) -> Checkpoint {
        self.journal.checkpoint(self.logs.len())
    }

    /// Close a frame: keep its changes on success, undo them otherwise
    fn finish(&mut self, checkpoint: Checkpoint, result: &ExecutionResult) {
        if result.is_success() {
            self.journal.commit(checkpoint);
        } else {
            self.logs.truncate(checkpoint.logs_len());
            self.journal.revert(checkpoint, &mut self.accounts);
        }
    }

    /// Account at `address` for a journaled write, created when missing
    fn touch(&mut self, address: Address) -> &mut Account {
        if !self.accounts.contains_key(&address) {
            self.journal.record(JournalEntry::AccountCreated(address));
        }
        self.accounts.entry(address).or_default()
    }

    fn set_balance(&mut self, address: Address, balance: Word) {
        let previous = std::mem::replace(&mut self.touch(address).balance, balance);
        self.journal.record(JournalEntry::Balance { address, previous });
    }

    fn set_nonce(&mut self, address: Address, nonce: u64) {
        let previous = std::mem::replace(&mut self.touch(address).nonce, nonce);
        self.journal.record(JournalEntry::Nonce { address, previous });
    }

    fn set_code(&mut self, address: Address, code: Bytes) {
        let account = self.touch(address);
        let previous = account.code().clone();
        account.set_code(code);
        self.journal.record(JournalEntry::Code { address, previous });
    }

    /// Analysis of `code`, computed once per distinct code hash
    fn analyze(&mut self, code_hash: H256, code: Bytes) -> AnalyzedCode {
        self.analyses
            .entry(code_hash)
            .or_insert_with(|| AnalyzedCode::analyze(code))
            .clone()
    }

    /// Move the message value from sender to recipient. Returns the result to
    /// hand back when the sender cannot pay.
    fn transfer_value(&mut self, message: &Message) -> Option<ExecutionResult> {
        if message.value.is_zero() || message.kind == CallKind::DelegateCall {
            return None;
        }
        let balance = self.get_balance(&message.sender);
        if balance < message.value {
            trace!(sender = %message.sender, "insufficient balance for transfer");
            return Some(ExecutionResult::rejected(
                StatusCode::InsufficientBalance,
                message.gas,
            ));
        }
        self.set_balance(message.sender, balance - message.value);
        let credited = self.get_balance(&message.recipient).overflowing_add(message.value).0;
        self.set_balance(message.recipient, credited);
        None
    }

    fn message_call(&mut self, message: &Message) -> ExecutionResult {
        let checkpoint = self.checkpoint();
        let result = match self.transfer_value(message) {
            Some(rejected) => rejected,
            None => {
                let code = self
                    .accounts
                    .get(&message.code_address)
                    .filter(|account| !account.code().is_empty())
                    .map(|account| (account.code_hash(), account.code().clone()));
                match code {
                    Some((code_hash, code)) => self.analyze(code_hash, code).execute(self, message),
                    None => ExecutionResult::success(message.gas, 0, Bytes::new()),
                }
            }
        };
        self.finish(checkpoint, &result);
        result
    }

    fn create(&mut self, message: &Message) -> ExecutionResult {
        let sender = message.sender;
        let nonce = self.account(&sender).map_or(0, |a| a.nonce);
        let address = match message.kind {
            CallKind::Create2 { salt } => create2_address(&sender, &salt, &message.input),
            _ => create_address(&sender, nonce),
        };
        self.set_nonce(sender, nonce.wrapping_add(1));

        let mut child = message.clone();
        child.recipient = address;
        child.code_address = address;
        self.create_at(child)
    }

    /// Run init code for a create message whose recipient is already derived
    fn create_at(&mut self, message: Message) -> ExecutionResult {
        let address = message.recipient;
        if self.accounts.get(&address).is_some_and(Account::is_occupied) {
            trace!(%address, "create collision");
            return ExecutionResult::failure(StatusCode::CreateCollision);
        }

        let checkpoint = self.checkpoint();
        let result = match self.transfer_value(&message) {
            Some(rejected) => rejected,
            None => {
                self.set_nonce(address, 1);
                let result = if message.input.is_empty() {
                    ExecutionResult::success(message.gas, 0, Bytes::new())
                } else {
                    AnalyzedCode::analyze(message.input.clone()).execute(self, &message)
                };
                if result.is_success() {
                    self.store_created_code(address, result)
                } else {
                    result
                }
            }
        };
        self.finish(checkpoint, &result);
        result
    }

    /// Charge the deposit and install the init code's output as runtime code
    fn store_created_code(&mut self, address: Address, result: ExecutionResult) -> ExecutionResult {
        if result.output.len() > cost::MAX_CODE_SIZE {
            return ExecutionResult::failure(StatusCode::MaxCodeSizeExceeded);
        }
        let deposit = gas::code_deposit_gas(result.output.len());
        if deposit > result.gas_left {
            return ExecutionResult::failure(StatusCode::OutOfGas);
        }
        self.set_code(address, result.output.clone());
        ExecutionResult {
            gas_left: result.gas_left - deposit,
            ..result
        }
        .with_create_address(address)
    }
}

impl Host for MockedHost {
    fn account_exists(&self, address: &Address) -> bool {
        self.accounts.contains_key(address)
    }

    fn get_balance(&self, address: &Address) -> Word {
        self.accounts
            .get(address)
            .map_or_else(Word::zero, |a| a.balance)
    }

    fn get_code(&self, address: &Address) -> Bytes {
        self.accounts
            .get(address)
            .map(|a| a.code().clone())
            .unwrap_or_default()
    }

    fn get_code_size(&self, address: &Address) -> usize {
        self.accounts.get(address).map_or(0, |a| a.code().len())
    }

    fn get_code_hash(&self, address: &Address) -> H256 {
        self.accounts
            .get(address)
            .map_or(H256::ZERO, Account::code_hash)
    }

    fn get_storage(&self, address: &Address, key: &H256) -> H256 {
        self.accounts
            .get(address)
            .map(|a| a.storage_value(key))
            .unwrap_or_default()
    }

    fn set_storage(&mut self, address: &Address, key: H256, value: H256) -> StorageStatus {
        let account = self.touch(*address);
        let previous = account.storage_value(&key);
        if value.is_zero() {
            account.storage.remove(&key);
        } else {
            account.storage.insert(key, value);
        }
        self.journal.record(JournalEntry::Storage {
            address: *address,
            key,
            previous,
        });
        StorageStatus::classify(&previous, &value)
    }

    fn emit_log(&mut self, address: &Address, topics: &[H256], data: &[u8]) {
        self.logs.push(LogRecord {
            address: *address,
            topics: topics.to_vec(),
            data: Bytes::copy_from_slice(data),
        });
    }

    fn call(&mut self, message: &Message) -> ExecutionResult {
        if self.recorded_calls.len() < MAX_RECORDED_CALLS {
            self.recorded_calls.push(message.clone());
        }
        if message.depth > cost::MAX_CALL_DEPTH {
            trace!(depth = message.depth, "call depth exceeded");
            return ExecutionResult::rejected(StatusCode::CallDepthExceeded, message.gas);
        }

        if message.kind.is_create() {
            self.create(message)
        } else {
            self.message_call(message)
        }
    }

    fn get_tx_context(&self) -> TxContext {
        self.tx_context.clone()
    }

    fn get_block_hash(&self, number: u64) -> H256 {
        self.block_hashes.get(&number).copied().unwrap_or_default()
    }
}
