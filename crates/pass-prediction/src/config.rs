//! Pass search settings.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{PassError, Result};

/// Longest horizon a single search may cover, hours.
pub const MAX_HORIZON_HOURS: f64 = 240.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PassSearchConfig {
    /// How far past the reference time to look, hours.
    pub horizon_hours: f64,
    /// Passes culminating below this are dropped, degrees.
    pub min_elevation_deg: f64,
    /// Bisect horizon crossings to 10 ms and search TCA, instead of
    /// stopping at the 3 s grid.
    pub refine_crossings: bool,
}

impl Default for PassSearchConfig {
    fn default() -> Self {
        Self {
            horizon_hours: 24.0,
            min_elevation_deg: 0.0,
            refine_crossings: true,
        }
    }
}

impl PassSearchConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.horizon_hours > 0.0 && self.horizon_hours <= MAX_HORIZON_HOURS) {
            return Err(PassError::InvalidConfig(format!(
                "horizon_hours must be in (0, {MAX_HORIZON_HOURS}], got {}",
                self.horizon_hours
            )));
        }
        if !(0.0..90.0).contains(&self.min_elevation_deg) {
            return Err(PassError::InvalidConfig(format!(
                "min_elevation_deg must be in [0, 90), got {}",
                self.min_elevation_deg
            )));
        }
        Ok(())
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| PassError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        info!(path = %path.display(), ?config, "loaded search configuration");
        Ok(config)
    }

    pub fn horizon_millis(&self) -> i64 {
        (self.horizon_hours * 3_600_000.0).round() as i64
    }
}
