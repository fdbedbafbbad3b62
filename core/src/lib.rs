//! STON Core Library
//!
//! Permissioned token ledger: per-account balance checkpoints, the
//! minting-then-transfer lifecycle and the manager-controlled whitelist.

pub mod address;
pub mod chain;
pub mod checkpoint;
pub mod config;
pub mod error;
pub mod events;
pub mod ledger;
pub mod whitelist;

// Re-export main types
pub use address::Address;
pub use chain::{ChainContext, ManualChain, SystemChain};
pub use checkpoint::{Checkpoint, CheckpointStore, History};
pub use config::TokenConfig;
pub use error::{ConfigError, LedgerError, Result};
pub use events::{Event, EventLog, VoteChoice};
pub use ledger::{Ledger, LedgerPhase};
pub use whitelist::Whitelist;

/// Token amount in base units
pub type Balance = u128;

/// Global operation counter (block number) assigned by the external sequencer
pub type Sequence = u64;

/// UNIX timestamp in seconds
pub type Timestamp = u64;

pub type LedgerId = uuid::Uuid;

pub type PollId = uuid::Uuid;
