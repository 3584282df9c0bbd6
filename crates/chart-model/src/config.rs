// Chart construction settings.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::Time;
use crate::error::ChartError;

pub const DEFAULT_KEY_COUNT: usize = 4;
pub const MAX_KEY_COUNT: usize = 32;
pub const DEFAULT_BUCKET_WIDTH: Time = 1000;
pub const DEFAULT_HISTORY_CAPACITY: usize = 1000;
pub const DEFAULT_DENSITY_WINDOW: Time = 1000;

/// Construction parameters for a [`Chart`](crate::Chart).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct ChartConfig {
    /// Number of playable columns
    pub key_count: usize,
    /// Width of one time bucket in milliseconds
    pub bucket_width: Time,
    /// Maximum number of undo batches kept (`None` = unbounded)
    pub history_capacity: Option<usize>,
    /// Window size in milliseconds for the default NPS histogram
    pub density_window: Time,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            key_count: DEFAULT_KEY_COUNT,
            bucket_width: DEFAULT_BUCKET_WIDTH,
            history_capacity: Some(DEFAULT_HISTORY_CAPACITY),
            density_window: DEFAULT_DENSITY_WINDOW,
        }
    }
}

impl ChartConfig {
    pub fn with_key_count(key_count: usize) -> Self {
        Self {
            key_count,
            ..Self::default()
        }
    }

    /// Parse a config from JSON text. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).context("Failed to parse chart config")?;
        config.validate().context("Chart config rejected")?;
        Ok(config)
    }

    pub fn validate(&self) -> std::result::Result<(), ChartError> {
        if self.key_count == 0 || self.key_count > MAX_KEY_COUNT {
            return Err(ChartError::InvalidKeyCount {
                got: self.key_count,
                max: MAX_KEY_COUNT,
            });
        }
        if self.bucket_width <= 0 {
            return Err(ChartError::InvalidBucketWidth(self.bucket_width));
        }
        if self.density_window <= 0 {
            return Err(ChartError::InvalidDensityWindow(self.density_window));
        }
        Ok(())
    }
}
