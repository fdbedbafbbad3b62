//! Voting configuration

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use ston_core::{Balance, ConfigError};

/// Default minimum holding to vote, in whole tokens
pub const DEFAULT_MINIMUM_TOKENS: u64 = 1_000;

/// Default poll duration (24 hours)
pub const DEFAULT_VOTING_PERIOD_SECS: u64 = 24 * 60 * 60;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct VotingConfig {
    /// Whole tokens a voter must hold at the snapshot
    #[serde(default = "default_minimum_tokens")]
    pub minimum_tokens: u64,

    #[serde(default = "default_voting_period_secs")]
    pub voting_period_secs: u64,
}

fn default_minimum_tokens() -> u64 {
    DEFAULT_MINIMUM_TOKENS
}

fn default_voting_period_secs() -> u64 {
    DEFAULT_VOTING_PERIOD_SECS
}

impl Default for VotingConfig {
    fn default() -> Self {
        VotingConfig {
            minimum_tokens: default_minimum_tokens(),
            voting_period_secs: default_voting_period_secs(),
        }
    }
}

impl VotingConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Minimum balance in base units for a token with `decimals` places
    pub fn minimum_balance(&self, decimals: u8) -> Balance {
        Balance::from(self.minimum_tokens).saturating_mul(10u128.saturating_pow(u32::from(decimals)))
    }
}
