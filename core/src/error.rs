//! Ledger error types

use thiserror::Error;

use crate::address::Address;
use crate::{Balance, Sequence};

/// Errors returned by ledger, checkpoint and whitelist operations.
///
/// A call that returns one of these has not changed any state and has not
/// emitted any event.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unauthorized caller: {caller}")]
    Unauthorized { caller: Address },

    #[error("Minting has been closed")]
    MintingClosed,

    #[error("Minting is already finished")]
    AlreadyFinished,

    #[error("Transfers are disabled until minting is finished")]
    TransfersDisabled,

    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientBalance { required: Balance, available: Balance },

    #[error("Insufficient allowance: required {required}, available {available}")]
    InsufficientAllowance { required: Balance, available: Balance },

    /// Raised when a write targets a sequence older than one already applied.
    /// Correct external sequencing never produces this.
    #[error("Sequence order violation: last applied {last}, attempted {attempted}")]
    SequenceOrderViolation { last: Sequence, attempted: Sequence },
}

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors raised while loading configuration files.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}
