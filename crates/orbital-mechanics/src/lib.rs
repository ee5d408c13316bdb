//! Orbital Mechanics Library
//!
//! SGP4/SDP4 propagation of TLE element sets, observer look angles,
//! geodetic sub-points, eclipse state and Doppler correction for an
//! arbitrary terrestrial ground station.
//!
//! ```no_run
//! use orbital_mechanics::{tle, GeoPos, Satellite};
//!
//! let elements = tle::parse_tle(
//!     Some("ISS (ZARYA)"),
//!     "1 25544U 98067A   19343.69339541  .00001764  00000-0  38792-4 0  9991",
//!     "2 25544  51.6439 211.2001 0007417  17.6667  85.6398 15.50103472202482",
//! )?;
//! let station = GeoPos::new(51.5, -0.12, 35.0)?;
//! let sat = Satellite::new(elements);
//! let sample = sat.position(&station, 1_575_895_000_000);
//! println!("az {:.1} el {:.1}", sample.azimuth_deg(), sample.elevation_deg());
//! # Ok::<(), orbital_mechanics::OrbitalError>(())
//! ```

use thiserror::Error;

pub mod constants;
pub mod elements;
pub mod geometry;
pub mod math;
pub mod observer;
pub mod propagation;
pub mod sample;
pub mod satellite;
pub mod time;
pub mod tle;

pub use elements::{ElementSet, OrbitalElements};
pub use observer::GeoPos;
pub use propagation::{Propagator, ResonanceClass, StateVector};
pub use sample::PositionSample;
pub use satellite::{GroundTrackPoint, Satellite};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum OrbitalError {
    #[error("Invalid TLE format: {0}")]
    InvalidTle(String),
    #[error("Invalid orbital elements: {0}")]
    InvalidElements(String),
    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),
}

pub type Result<T> = std::result::Result<T, OrbitalError>;
