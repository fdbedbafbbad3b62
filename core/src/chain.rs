//! Access to the external sequencer's view of "now"
//!
//! The core never advances sequence numbers or clocks itself. It only asks
//! the layer that orders operations what the current sequence number and
//! timestamp are.

use chrono::Utc;

use crate::{Sequence, Timestamp};

/// Current block/sequence number and time as seen by the external layer
pub trait ChainContext {
    fn current_sequence(&self) -> Sequence;
    fn current_time(&self) -> Timestamp;
}

/// Caller-driven chain position. Used by tests and by embedders that replay
/// an already ordered operation stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ManualChain {
    sequence: Sequence,
    time: Timestamp,
}

impl ManualChain {
    pub fn new(sequence: Sequence, time: Timestamp) -> Self {
        Self { sequence, time }
    }

    /// Move to the next sequence number and return it. Stays at
    /// `Sequence::MAX` once reached.
    pub fn advance(&mut self) -> Sequence {
        self.sequence = self.sequence.saturating_add(1);
        self.sequence
    }

    pub fn advance_time(&mut self, secs: u64) {
        self.time = self.time.saturating_add(secs);
    }

    pub fn set_sequence(&mut self, sequence: Sequence) {
        self.sequence = sequence;
    }

    pub fn set_time(&mut self, time: Timestamp) {
        self.time = time;
    }
}

impl ChainContext for ManualChain {
    fn current_sequence(&self) -> Sequence {
        self.sequence
    }

    fn current_time(&self) -> Timestamp {
        self.time
    }
}

/// Externally supplied sequence number paired with the local wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemChain {
    pub sequence: Sequence,
}

impl SystemChain {
    pub fn new(sequence: Sequence) -> Self {
        Self { sequence }
    }
}

impl ChainContext for SystemChain {
    fn current_sequence(&self) -> Sequence {
        self.sequence
    }

    fn current_time(&self) -> Timestamp {
        // Clocks before 1970 read as 0
        u64::try_from(Utc::now().timestamp()).unwrap_or(0)
    }
}
