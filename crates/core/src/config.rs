// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration file
//!
//! ```toml
//! [reader]
//! block_size = 65536
//! max_field_count = 4096
//! chunk_size = 4096
//! retained_chunks = 64
//!
//! [flush]
//! size_threshold = 65536
//! interval = "250ms"
//! ```
//!
//! Every key is optional.

use crate::flush::FlushPolicy;
use crate::pool::{DEFAULT_CHUNK_SIZE, DEFAULT_RETAINED_CHUNKS};
use crate::reader::{DEFAULT_BLOCK_SIZE, DEFAULT_MAX_VALUE_LENGTH, MAX_FIELD_COUNT};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Reader tuning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Bytes read from a source per block
    pub block_size: usize,
    /// Field-count guard, at most 4096
    pub max_field_count: usize,
    /// Guard on a single string/bytes value
    pub max_value_length: usize,
    /// Size of the pooled chunks holding field payloads
    pub chunk_size: usize,
    /// Idle chunks the pool keeps for reuse
    pub retained_chunks: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            max_field_count: MAX_FIELD_COUNT,
            max_value_length: DEFAULT_MAX_VALUE_LENGTH,
            chunk_size: DEFAULT_CHUNK_SIZE,
            retained_chunks: DEFAULT_RETAINED_CHUNKS,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LumityConfig {
    pub reader: ReaderConfig,
    pub flush: FlushPolicy,
}

impl LumityConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Load `path` when given and present, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) if path.exists() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let reader = &self.reader;
        if reader.block_size == 0 {
            return Err(ConfigError::Invalid("reader.block_size must be positive".into()));
        }
        if reader.chunk_size == 0 {
            return Err(ConfigError::Invalid("reader.chunk_size must be positive".into()));
        }
        if reader.max_field_count > MAX_FIELD_COUNT {
            return Err(ConfigError::Invalid(format!(
                "reader.max_field_count {} exceeds {}",
                reader.max_field_count, MAX_FIELD_COUNT
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
