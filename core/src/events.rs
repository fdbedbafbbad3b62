//! Notification records emitted by successful state changes

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::{Balance, PollId, Sequence};

/// Yes/no ballot choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoteChoice {
    Yes,
    No,
}

/// An immutable record of one successful state change.
///
/// The external layer is responsible for persisting or broadcasting these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    Mint {
        to: Address,
        amount: Balance,
        sequence: Sequence,
    },
    Transfer {
        from: Address,
        to: Address,
        amount: Balance,
        sequence: Sequence,
    },
    Approval {
        owner: Address,
        spender: Address,
        amount: Balance,
    },
    MintingFinished {
        sequence: Sequence,
    },
    WhitelistEdit {
        subject: Address,
        status: bool,
    },
    WhitelistManagerChange {
        manager: Address,
    },
    VoteCast {
        poll_id: PollId,
        voter: Address,
        choice: VoteChoice,
    },
}

/// Append-only, ordered event log
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn extend(&mut self, events: impl IntoIterator<Item = Event>) {
        self.events.extend(events);
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Hand all pending events to the caller, leaving the log empty
    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_empties_log_in_order() {
        let mut log = EventLog::new();
        assert!(log.is_empty());

        log.push(Event::MintingFinished { sequence: 1 });
        log.extend(Some(Event::WhitelistManagerChange {
            manager: Address::from_low_u8(2),
        }));
        assert_eq!(log.len(), 2);

        let drained = log.drain();
        assert_eq!(drained[0], Event::MintingFinished { sequence: 1 });
        assert_eq!(drained.len(), 2);
        assert!(log.is_empty());
        assert_eq!(log.len(), 0);
    }
}
