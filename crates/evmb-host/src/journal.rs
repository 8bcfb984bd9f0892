//! Undo log for nested frames
//!
//! Every account mutation made while a frame is open is recorded with the
//! value it replaced. Reverting a frame replays its entries backwards;
//! committing keeps them so an enclosing frame can still revert.

use crate::account::Account;
use bytes::Bytes;
use evmb_primitives::{Address, Nonce, Word, H256};
use std::collections::HashMap;

/// A single undoable change
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum JournalEntry {
    /// Account did not exist before
    AccountCreated(Address),
    /// Balance before the change
    Balance { address: Address, previous: Word },
    /// Nonce before the change
    Nonce { address: Address, previous: Nonce },
    /// Code before the change
    Code { address: Address, previous: Bytes },
    /// Storage slot before the change
    Storage {
        address: Address,
        key: H256,
        previous: H256,
    },
}

/// Position to roll back to when a frame fails
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use]
pub(crate) struct Checkpoint {
    entries: usize,
    logs: usize,
}

impl Checkpoint {
    /// Number of logs that existed when the frame opened
    pub(crate) fn logs_len(&self) -> usize {
        self.logs
    }
}

/// Undo entries of every open frame
#[derive(Clone, Debug, Default)]
pub(crate) struct Journal {
    entries: Vec<JournalEntry>,
    open: usize,
}

impl Journal {
    /// Open a frame
    pub(crate) fn checkpoint(&mut self, logs_len: usize) -> Checkpoint {
        self.open += 1;
        Checkpoint {
            entries: self.entries.len(),
            logs: logs_len,
        }
    }

    /// Record a change; ignored while no frame is open
    pub(crate) fn record(&mut self, entry: JournalEntry) {
        if self.open > 0 {
            self.entries.push(entry);
        }
    }

    /// Close a frame keeping its changes
    pub(crate) fn commit(&mut self, _checkpoint: Checkpoint) {
        self.close();
    }

    /// Close a frame undoing every change made since `checkpoint`
    pub(crate) fn revert(&mut self, checkpoint: Checkpoint, accounts: &mut HashMap<Address, Account>) {
        while self.entries.len() > checkpoint.entries {
            let Some(entry) = self.entries.pop() else {
                break;
            };
            undo(entry, accounts);
        }
        self.close();
    }

    /// Number of pending entries
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    fn close(&mut self) {
        self.open = self.open.saturating_sub(1);
        if self.open == 0 {
            self.entries.clear();
        }
    }
}

fn undo(entry: JournalEntry, accounts: &mut HashMap<Address, Account>) {
    match entry {
        JournalEntry::AccountCreated(address) => {
            accounts.remove(&address);
        }
        JournalEntry::Balance { address, previous } => {
            if let Some(account) = accounts.get_mut(&address) {
                account.balance = previous;
            }
        }
        JournalEntry::Nonce { address, previous } => {
            if let Some(account) = accounts.get_mut(&address) {
                account.nonce = previous;
            }
        }
        JournalEntry::Code { address, previous } => {
            if let Some(account) = accounts.get_mut(&address) {
                account.set_code(previous);
            }
        }
        JournalEntry::Storage {
            address,
            key,
            previous,
        } => {
            if let Some(account) = accounts.get_mut(&address) {
                if previous.is_zero() {
                    account.storage.remove(&key);
                } else {
                    account.storage.insert(key, previous);
                }
            }
        }
    }
}
