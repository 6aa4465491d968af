//! Configuration for the query layer
//!
//! Fixed at process start and shared immutably across requests, like the
//! schemas.

use anyhow::Result;
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

fn default_perpage() -> i64 {
    20
}

/// Query-layer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Page size applied when the client does not send `perpage`
    #[serde(default = "default_perpage")]
    pub default_perpage: i64,

    /// UTC offset, in seconds, of the wall clock stored in date/timestamp
    /// fields; used for epoch conversion during serialization
    #[serde(default)]
    pub utc_offset_secs: i32,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_perpage: default_perpage(),
            utc_offset_secs: 0,
        }
    }
}

impl QueryConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// The configured offset as a chrono `FixedOffset`
    ///
    /// Offsets outside the valid range fall back to UTC.
    pub fn utc_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_secs)
            .unwrap_or_else(|| FixedOffset::east_opt(0).expect("zero offset is valid"))
    }
}
