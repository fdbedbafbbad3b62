//! Balance history
//!
//! Every balance change is recorded as a `(sequence, balance)` checkpoint in a
//! per-account, append-only history. Point-in-time queries binary search that
//! history, so a lookup at sequence `S` ignores every change recorded after
//! `S` by construction.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::address::Address;
use crate::error::{LedgerError, Result};
use crate::{Balance, Sequence};

/// A recorded balance as of a given sequence number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub sequence: Sequence,
    pub balance: Balance,
}

/// Ordered history of values for a single key.
///
/// Sequence numbers are strictly increasing. Recording twice at the same
/// sequence overwrites the last entry so each sequence maps to one value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct History {
    checkpoints: Vec<Checkpoint>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails if `sequence` lies before the last recorded sequence.
    pub fn check_sequence(&self, sequence: Sequence) -> Result<()> {
        match self.checkpoints.last() {
            Some(last) if sequence < last.sequence => Err(LedgerError::SequenceOrderViolation {
                last: last.sequence,
                attempted: sequence,
            }),
            _ => Ok(()),
        }
    }

    pub fn record(&mut self, sequence: Sequence, balance: Balance) -> Result<()> {
        self.check_sequence(sequence)?;

        match self.checkpoints.last_mut() {
            Some(last) if last.sequence == sequence => last.balance = balance,
            _ => self.checkpoints.push(Checkpoint { sequence, balance }),
        }
        Ok(())
    }

    /// Value of the last checkpoint at or before `sequence`, or 0.
    pub fn value_at(&self, sequence: Sequence) -> Balance {
        // Most queries target the present
        if let Some(last) = self.checkpoints.last() {
            if sequence >= last.sequence {
                return last.balance;
            }
        }

        let idx = self.checkpoints.partition_point(|c| c.sequence <= sequence);
        if idx == 0 {
            0
        } else {
            self.checkpoints[idx - 1].balance
        }
    }

    pub fn latest(&self) -> Balance {
        self.checkpoints.last().map(|c| c.balance).unwrap_or(0)
    }

    pub fn last_sequence(&self) -> Option<Sequence> {
        self.checkpoints.last().map(|c| c.sequence)
    }

    pub fn checkpoints(&self) -> &[Checkpoint] {
        &self.checkpoints
    }

    pub fn len(&self) -> usize {
        self.checkpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checkpoints.is_empty()
    }
}

/// Per-account balance histories
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckpointStore {
    histories: HashMap<Address, History>,
}

impl CheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `balance` for `account` at `sequence`, overwriting the last
    /// checkpoint if it carries the same sequence.
    pub fn record(&mut self, account: Address, sequence: Sequence, balance: Balance) -> Result<()> {
        self.histories
            .entry(account)
            .or_default()
            .record(sequence, balance)
    }

    /// Fails with `SequenceOrderViolation` if a record for `account` at
    /// `sequence` would write into the past.
    pub fn check_sequence(&self, account: &Address, sequence: Sequence) -> Result<()> {
        match self.histories.get(account) {
            Some(history) => history.check_sequence(sequence),
            None => Ok(()),
        }
    }

    /// Balance of `account` as of `sequence`. Unknown accounts yield 0.
    pub fn balance_at(&self, account: &Address, sequence: Sequence) -> Balance {
        self.histories
            .get(account)
            .map(|h| h.value_at(sequence))
            .unwrap_or(0)
    }

    pub fn current_balance(&self, account: &Address) -> Balance {
        self.histories.get(account).map(History::latest).unwrap_or(0)
    }

    pub fn checkpoints(&self, account: &Address) -> &[Checkpoint] {
        self.histories
            .get(account)
            .map(History::checkpoints)
            .unwrap_or(&[])
    }

    pub fn last_sequence(&self, account: &Address) -> Option<Sequence> {
        self.histories.get(account).and_then(History::last_sequence)
    }

    /// Number of accounts with at least one checkpoint
    pub fn account_count(&self) -> usize {
        self.histories.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Address {
        Address::from_low_u8(1)
    }

    #[test]
    fn test_unknown_account_is_zero() {
        let store = CheckpointStore::new();
        assert_eq!(store.balance_at(&alice(), 0), 0);
        assert_eq!(store.balance_at(&alice(), u64::MAX), 0);
        assert_eq!(store.current_balance(&alice()), 0);
        assert!(store.checkpoints(&alice()).is_empty());
    }

    #[test]
    fn test_balance_at_picks_last_entry_not_after_query() {
        let mut store = CheckpointStore::new();
        store.record(alice(), 3, 100).unwrap();
        store.record(alice(), 7, 40).unwrap();
        store.record(alice(), 12, 90).unwrap();

        assert_eq!(store.balance_at(&alice(), 2), 0);
        assert_eq!(store.balance_at(&alice(), 3), 100);
        assert_eq!(store.balance_at(&alice(), 6), 100);
        assert_eq!(store.balance_at(&alice(), 7), 40);
        assert_eq!(store.balance_at(&alice(), 11), 40);
        assert_eq!(store.balance_at(&alice(), 12), 90);
        assert_eq!(store.balance_at(&alice(), 1_000), 90);
        assert_eq!(store.current_balance(&alice()), 90);
    }

    #[test]
    fn test_same_sequence_overwrites() {
        let mut store = CheckpointStore::new();
        store.record(alice(), 5, 10).unwrap();
        store.record(alice(), 5, 25).unwrap();
        store.record(alice(), 6, 30).unwrap();
        store.record(alice(), 6, 31).unwrap();

        assert_eq!(store.checkpoints(&alice()).len(), 2);
        assert_eq!(store.balance_at(&alice(), 5), 25);
        assert_eq!(store.balance_at(&alice(), 6), 31);
    }

    #[test]
    fn test_writing_into_past_fails() {
        let mut store = CheckpointStore::new();
        store.record(alice(), 9, 10).unwrap();

        let err = store.record(alice(), 4, 99).unwrap_err();
        assert_eq!(
            err,
            LedgerError::SequenceOrderViolation { last: 9, attempted: 4 }
        );
        assert_eq!(store.checkpoints(&alice()), &[Checkpoint { sequence: 9, balance: 10 }]);
    }

    #[test]
    fn test_queries_are_repeatable_over_long_history() {
        let mut history = History::new();
        assert!(history.is_empty());
        for seq in 1..=500u64 {
            history.record(seq * 2, seq as Balance * 10).unwrap();
        }
        assert_eq!(history.len(), 500);
        assert!(!history.is_empty());

        for seq in 0..=1_001u64 {
            let expected = (seq / 2).min(500) as Balance * 10;
            assert_eq!(history.value_at(seq), expected);
            assert_eq!(history.value_at(seq), history.value_at(seq));
        }
    }
}
