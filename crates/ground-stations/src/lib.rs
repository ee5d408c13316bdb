//! Ground Stations Library
//!
//! Named observer sites with an elevation mask, loaded from a JSON
//! registry and used as the vantage point for look angles and passes.

use std::path::Path;

use orbital_mechanics::{GeoPos, OrbitalError, PositionSample, Satellite};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum StationError {
    #[error("Station not found: {0}")]
    NotFound(String),
    #[error("Duplicate station id: {0}")]
    Duplicate(String),
    #[error("Invalid location for {id}: {source}")]
    InvalidLocation {
        id: String,
        #[source]
        source: OrbitalError,
    },
    #[error("Invalid elevation mask for {id}: {mask}")]
    InvalidMask { id: String, mask: f64 },
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed station registry: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StationError>;

fn default_min_elevation() -> f64 {
    0.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundStation {
    pub id: String,
    pub name: String,
    pub location: GeoPos,
    /// Passes culminating below this elevation are ignored, degrees.
    #[serde(default = "default_min_elevation")]
    pub min_elevation_deg: f64,
}

impl GroundStation {
    pub fn new(id: impl Into<String>, name: impl Into<String>, location: GeoPos) -> Result<Self> {
        let station = Self {
            id: id.into(),
            name: name.into(),
            location,
            min_elevation_deg: 0.0,
        };
        station.validate()?;
        Ok(station)
    }

    pub fn with_min_elevation(mut self, min_elevation_deg: f64) -> Result<Self> {
        self.min_elevation_deg = min_elevation_deg;
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        self.location
            .validate()
            .map_err(|source| StationError::InvalidLocation {
                id: self.id.clone(),
                source,
            })?;
        if !(0.0..90.0).contains(&self.min_elevation_deg) {
            return Err(StationError::InvalidMask {
                id: self.id.clone(),
                mask: self.min_elevation_deg,
            });
        }
        Ok(())
    }

    /// Look angles to `satellite` at `time_millis`.
    pub fn observe(&self, satellite: &Satellite, time_millis: i64) -> PositionSample {
        satellite.position(&self.location, time_millis)
    }

    /// True when the satellite is above this station's elevation mask.
    pub fn can_see(&self, sample: &PositionSample) -> bool {
        sample.elevation_deg() >= self.min_elevation_deg && sample.is_above_horizon()
    }
}

#[derive(Debug, Clone, Default)]
pub struct StationRegistry {
    stations: Vec<GroundStation>,
}

impl StationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_stations(stations: Vec<GroundStation>) -> Result<Self> {
        let mut registry = Self::new();
        for station in stations {
            registry.insert(station)?;
        }
        Ok(registry)
    }

    /// Parse a JSON array of stations.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let stations: Vec<GroundStation> = serde_json::from_str(json)?;
        Self::from_stations(stations)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| StationError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let registry = Self::from_json_str(&json)?;
        info!(path = %path.display(), stations = registry.len(), "loaded station registry");
        Ok(registry)
    }

    pub fn insert(&mut self, station: GroundStation) -> Result<()> {
        station.validate()?;
        if self.stations.iter().any(|s| s.id == station.id) {
            return Err(StationError::Duplicate(station.id));
        }
        debug!(id = %station.id, name = %station.name, "registered station");
        self.stations.push(station);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Result<&GroundStation> {
        self.stations
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| StationError::NotFound(id.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &GroundStation> {
        self.stations.iter()
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Stations that currently see `satellite`, with their look angles.
    pub fn in_view<'a>(
        &'a self,
        satellite: &Satellite,
        time_millis: i64,
    ) -> Vec<(&'a GroundStation, PositionSample)> {
        self.stations
            .iter()
            .map(|s| (s, s.observe(satellite, time_millis)))
            .filter(|(s, sample)| s.can_see(sample))
            .collect()
    }
}
