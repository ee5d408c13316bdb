use ground_stations::StationError;
use orbital_mechanics::OrbitalError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PassError {
    #[error(transparent)]
    Orbital(#[from] OrbitalError),
    #[error(transparent)]
    Station(#[from] StationError),
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid search configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, PassError>;
