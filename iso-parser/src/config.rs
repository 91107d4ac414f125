//! Configuration for the decoder

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Decoder configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Maximum element nesting accepted by the cursor
    pub max_depth: usize,

    /// Initial capacity of the tokenizer's event buffer in bytes
    pub buffer_capacity: usize,

    /// Keep the group header once decoded so header-only reads are free
    pub cache_header: bool,

    /// Verify header and batch control sums on full decode
    pub validate_control_sums: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_depth: 64,
            buffer_capacity: 4096,
            cache_header: true,
            validate_control_sums: false,
        }
    }
}

impl ParserConfig {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ParserConfig = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = ParserConfig::default();

        if let Some(depth) = env_value("ISO_PARSER_MAX_DEPTH")? {
            config.max_depth = depth;
        }

        if let Some(capacity) = env_value("ISO_PARSER_BUFFER_CAPACITY")? {
            config.buffer_capacity = capacity;
        }

        if let Some(cache) = env_value("ISO_PARSER_CACHE_HEADER")? {
            config.cache_header = cache;
        }

        if let Some(validate) = env_value("ISO_PARSER_VALIDATE_CONTROL_SUMS")? {
            config.validate_control_sums = validate;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the cursor cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(Error::Config("max_depth must be at least 1".to_string()));
        }
        Ok(())
    }
}

fn env_value<T: FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::Config(format!("Invalid value for {}: '{}'", name, raw))),
        Err(_) => Ok(None),
    }
}
