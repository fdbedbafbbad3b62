//! Governance error types

use thiserror::Error;

use ston_core::{Address, Balance, ConfigError, PollId, Timestamp};

#[derive(Error, Debug)]
pub enum GovernanceError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Poll not found: {0}")]
    PollNotFound(PollId),

    #[error("Poll expired at {expires_at}, now {now}")]
    Expired { expires_at: Timestamp, now: Timestamp },

    #[error("Not whitelisted: {0}")]
    NotWhitelisted(Address),

    #[error("Already voted: {0}")]
    AlreadyVoted(Address),

    #[error("Insufficient voting weight: required {required}, held {actual}")]
    InsufficientWeight { required: Balance, actual: Balance },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, GovernanceError>;
