//! Snapshot-anchored yes/no polls
//!
//! A poll pins a snapshot sequence number when it is created. Eligibility is
//! decided by the voter's balance at that snapshot, so tokens moved afterwards
//! cannot change who may vote. Whitelist membership, on the other hand, is
//! checked live at voting time.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use ston_core::{
    Address, Balance, ChainContext, Event, EventLog, Ledger, LedgerId, PollId, Sequence,
    Timestamp, VoteChoice,
};

use crate::error::{GovernanceError, Result};

/// Snapshot sentinel meaning "the chain's sequence at poll creation"
pub const SNAPSHOT_CURRENT: Sequence = 0;

/// Tally of a poll at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollResult {
    pub count_yes: u64,
    pub count_no: u64,
    pub expired: bool,
}

impl PollResult {
    pub fn total_votes(&self) -> u64 {
        self.count_yes + self.count_no
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Poll {
    id: PollId,
    ledger_id: LedgerId,
    snapshot_sequence: Sequence,
    created_at: Timestamp,
    expires_at: Timestamp,
    minimum_balance: Balance,
    count_yes: u64,
    count_no: u64,
    voters: HashSet<Address>,
    events: EventLog,
}

impl Poll {
    /// Open a poll against `ledger`.
    ///
    /// `snapshot_sequence == SNAPSHOT_CURRENT` pins the chain's current
    /// sequence; any other value must not lie in the future.
    pub fn new<C: ChainContext>(
        ledger: &Ledger,
        chain: &C,
        expires_at: Timestamp,
        snapshot_sequence: Sequence,
        minimum_balance: Balance,
    ) -> Result<Self> {
        let current = chain.current_sequence();
        let now = chain.current_time();

        let snapshot_sequence = if snapshot_sequence == SNAPSHOT_CURRENT {
            current
        } else if snapshot_sequence > current {
            return Err(GovernanceError::InvalidArgument(format!(
                "snapshot {} is ahead of current sequence {}",
                snapshot_sequence, current
            )));
        } else {
            snapshot_sequence
        };

        if expires_at <= now {
            return Err(GovernanceError::InvalidArgument(format!(
                "expiry {} is not after now {}",
                expires_at, now
            )));
        }

        let poll = Self {
            id: uuid::Uuid::new_v4(),
            ledger_id: ledger.id(),
            snapshot_sequence,
            created_at: now,
            expires_at,
            minimum_balance,
            count_yes: 0,
            count_no: 0,
            voters: HashSet::new(),
            events: EventLog::new(),
        };
        info!(
            "Opened poll {} on ledger {} (snapshot {}, expires {})",
            poll.id, poll.ledger_id, snapshot_sequence, expires_at
        );
        Ok(poll)
    }

    /// Cast one vote for `caller`.
    ///
    /// Each address counts once regardless of its balance; the snapshot
    /// balance only decides whether the address may vote at all.
    pub fn vote<C: ChainContext>(
        &mut self,
        ledger: &Ledger,
        chain: &C,
        caller: &Address,
        choice: VoteChoice,
    ) -> Result<()> {
        if ledger.id() != self.ledger_id {
            return Err(GovernanceError::InvalidArgument(format!(
                "poll {} is bound to ledger {}, not {}",
                self.id,
                self.ledger_id,
                ledger.id()
            )));
        }

        let now = chain.current_time();
        if now >= self.expires_at {
            return Err(GovernanceError::Expired {
                expires_at: self.expires_at,
                now,
            });
        }
        if !ledger.is_whitelisted(caller) {
            return Err(GovernanceError::NotWhitelisted(*caller));
        }
        if self.voters.contains(caller) {
            return Err(GovernanceError::AlreadyVoted(*caller));
        }

        let weight = ledger.balance_of_at(caller, self.snapshot_sequence);
        if weight < self.minimum_balance {
            return Err(GovernanceError::InsufficientWeight {
                required: self.minimum_balance,
                actual: weight,
            });
        }

        self.voters.insert(*caller);
        match choice {
            VoteChoice::Yes => self.count_yes += 1,
            VoteChoice::No => self.count_no += 1,
        }
        debug!("{} voted {:?} on poll {}", caller, choice, self.id);
        self.events.push(Event::VoteCast {
            poll_id: self.id,
            voter: *caller,
            choice,
        });

        Ok(())
    }

    pub fn id(&self) -> PollId {
        self.id
    }

    pub fn ledger_id(&self) -> LedgerId {
        self.ledger_id
    }

    pub fn snapshot_sequence(&self) -> Sequence {
        self.snapshot_sequence
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn expires_at(&self) -> Timestamp {
        self.expires_at
    }

    pub fn minimum_balance(&self) -> Balance {
        self.minimum_balance
    }

    pub fn count_yes(&self) -> u64 {
        self.count_yes
    }

    pub fn count_no(&self) -> u64 {
        self.count_no
    }

    pub fn has_voted(&self, account: &Address) -> bool {
        self.voters.contains(account)
    }

    pub fn is_open(&self, now: Timestamp) -> bool {
        now < self.expires_at
    }

    pub fn result(&self, now: Timestamp) -> PollResult {
        PollResult {
            count_yes: self.count_yes,
            count_no: self.count_no,
            expired: !self.is_open(now),
        }
    }

    pub fn events(&self) -> &[Event] {
        self.events.events()
    }

    pub fn drain_events(&mut self) -> Vec<Event> {
        self.events.drain()
    }
}
