//! Voting engine: owns the polls opened against ledgers and collects their
//! notifications in one ordered log.

use log::debug;
use std::collections::HashMap;
use std::path::Path;

use ston_core::{Address, ChainContext, Event, EventLog, Ledger, PollId, Sequence, Timestamp, VoteChoice};

use crate::config::VotingConfig;
use crate::error::{GovernanceError, Result};
use crate::poll::{Poll, PollResult};

pub struct VotingEngine {
    config: VotingConfig,
    polls: HashMap<PollId, Poll>,
    events: EventLog,
}

impl VotingEngine {
    pub fn new(config: VotingConfig) -> Self {
        Self {
            config,
            polls: HashMap::new(),
            events: EventLog::new(),
        }
    }

    /// Build an engine from a TOML voting config file
    pub fn from_config_path(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(VotingConfig::load(path)?))
    }

    pub fn config(&self) -> &VotingConfig {
        &self.config
    }

    /// Open a poll on `ledger` that accepts votes until `expires_at`.
    ///
    /// The minimum balance is fixed at creation from the configured whole
    /// token amount and the ledger's decimals.
    pub fn create_poll<C: ChainContext>(
        &mut self,
        ledger: &Ledger,
        chain: &C,
        expires_at: Timestamp,
        snapshot_sequence: Sequence,
    ) -> Result<PollId> {
        let minimum = self.config.minimum_balance(ledger.decimals());
        let poll = Poll::new(ledger, chain, expires_at, snapshot_sequence, minimum)?;
        let id = poll.id();
        self.polls.insert(id, poll);
        Ok(id)
    }

    /// Open a poll that runs for the configured voting period
    pub fn create_default_poll<C: ChainContext>(
        &mut self,
        ledger: &Ledger,
        chain: &C,
        snapshot_sequence: Sequence,
    ) -> Result<PollId> {
        let expires_at = chain
            .current_time()
            .saturating_add(self.config.voting_period_secs);
        self.create_poll(ledger, chain, expires_at, snapshot_sequence)
    }

    pub fn vote<C: ChainContext>(
        &mut self,
        ledger: &Ledger,
        chain: &C,
        poll_id: &PollId,
        caller: &Address,
        choice: VoteChoice,
    ) -> Result<()> {
        let poll = self
            .polls
            .get_mut(poll_id)
            .ok_or(GovernanceError::PollNotFound(*poll_id))?;

        if let Err(e) = poll.vote(ledger, chain, caller, choice) {
            debug!("Rejected vote from {} on poll {}: {}", caller, poll_id, e);
            return Err(e);
        }
        self.events.extend(poll.drain_events());
        Ok(())
    }

    pub fn poll(&self, poll_id: &PollId) -> Option<&Poll> {
        self.polls.get(poll_id)
    }

    pub fn count_yes(&self, poll_id: &PollId) -> Result<u64> {
        Ok(self.get(poll_id)?.count_yes())
    }

    pub fn count_no(&self, poll_id: &PollId) -> Result<u64> {
        Ok(self.get(poll_id)?.count_no())
    }

    pub fn result(&self, poll_id: &PollId, now: Timestamp) -> Result<PollResult> {
        Ok(self.get(poll_id)?.result(now))
    }

    pub fn poll_count(&self) -> usize {
        self.polls.len()
    }

    pub fn events(&self) -> &[Event] {
        self.events.events()
    }

    pub fn drain_events(&mut self) -> Vec<Event> {
        self.events.drain()
    }

    fn get(&self, poll_id: &PollId) -> Result<&Poll> {
        self.polls
            .get(poll_id)
            .ok_or(GovernanceError::PollNotFound(*poll_id))
    }
}

impl Default for VotingEngine {
    fn default() -> Self {
        Self::new(VotingConfig::default())
    }
}
