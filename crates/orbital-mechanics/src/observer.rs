//! Ground observer position.

use serde::{Deserialize, Serialize};

use crate::{OrbitalError, Result};

/// Geodetic observer position: latitude and longitude in degrees (east
/// positive), altitude above the ellipsoid in metres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPos {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude_m: f64,
}

impl GeoPos {
    pub fn new(latitude: f64, longitude: f64, altitude_m: f64) -> Result<Self> {
        let pos = Self {
            latitude,
            longitude,
            altitude_m,
        };
        pos.validate()?;
        Ok(pos)
    }

    pub fn validate(&self) -> Result<()> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(OrbitalError::InvalidCoordinates(format!(
                "latitude {} outside [-90, 90]",
                self.latitude
            )));
        }
        if !(-180.0..360.0).contains(&self.longitude) {
            return Err(OrbitalError::InvalidCoordinates(format!(
                "longitude {} outside [-180, 360)",
                self.longitude
            )));
        }
        if !self.altitude_m.is_finite() {
            return Err(OrbitalError::InvalidCoordinates(
                "altitude is not finite".to_string(),
            ));
        }
        Ok(())
    }

    pub fn latitude_rad(&self) -> f64 {
        self.latitude.to_radians()
    }

    pub fn longitude_rad(&self) -> f64 {
        self.longitude.to_radians()
    }

    pub fn altitude_km(&self) -> f64 {
        self.altitude_m / 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation() {
        assert!(GeoPos::new(0.0, 0.0, 0.0).is_ok());
        assert!(GeoPos::new(51.5, 359.9, 100.0).is_ok());
        assert!(GeoPos::new(-90.1, 0.0, 0.0).is_err());
        assert!(GeoPos::new(0.0, 360.0, 0.0).is_err());
        assert!(GeoPos::new(0.0, 0.0, f64::INFINITY).is_err());
    }
}
