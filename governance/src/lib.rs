//! STON Governance Module
//!
//! Token-holder polls whose eligibility is decided by balances at a fixed
//! snapshot of the ledger's checkpoint history.

pub mod config;
pub mod engine;
pub mod error;
pub mod poll;

pub use config::VotingConfig;
pub use engine::VotingEngine;
pub use error::{GovernanceError, Result};
pub use poll::{Poll, PollResult, SNAPSHOT_CURRENT};

pub use ston_core::VoteChoice;
