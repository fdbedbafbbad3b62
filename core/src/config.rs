//! Token configuration

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::ConfigError;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TokenConfig {
    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_symbol")]
    pub symbol: String,

    #[serde(default = "default_decimals")]
    pub decimals: u8,
}

fn default_name() -> String {
    "STON Token".to_string()
}

fn default_symbol() -> String {
    "STON".to_string()
}

fn default_decimals() -> u8 {
    18
}

impl Default for TokenConfig {
    fn default() -> Self {
        TokenConfig {
            name: default_name(),
            symbol: default_symbol(),
            decimals: default_decimals(),
        }
    }
}

impl TokenConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// One whole token expressed in base units
    pub fn unit(&self) -> u128 {
        10u128.saturating_pow(u32::from(self.decimals))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_keys_use_defaults() {
        let config = TokenConfig::from_toml_str("symbol = \"TST\"").unwrap();
        assert_eq!(config.symbol, "TST");
        assert_eq!(config.name, "STON Token");
        assert_eq!(config.decimals, 18);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "name = \"Test\"\nsymbol = \"T\"\ndecimals = 2").unwrap();

        let config = TokenConfig::load(file.path()).unwrap();
        assert_eq!(config.decimals, 2);
        assert_eq!(config.unit(), 100);
    }

    #[test]
    fn test_bad_toml_is_parse_error() {
        let err = TokenConfig::from_toml_str("decimals = \"many\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
