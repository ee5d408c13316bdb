//! One propagation result for one instant.

use serde::Serialize;

use crate::constants::SPEED_OF_LIGHT_M_S;
use crate::geometry::footprint_km;
use crate::math::Vector3;

/// Satellite position relative to a ground station at `time_millis`.
///
/// Angles are radians, distances km, speeds km/s.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PositionSample {
    pub time_millis: i64,
    pub azimuth: f64,
    pub elevation: f64,
    pub range: f64,
    /// Positive when the satellite is receding.
    pub range_rate: f64,
    pub latitude: f64,
    /// East longitude in [0, 2π).
    pub longitude: f64,
    pub altitude: f64,
    pub eclipsed: bool,
    pub eclipse_depth: f64,
    pub phase: f64,
    pub position: Vector3,
    pub velocity: Vector3,
    /// Right ascension of the sub-satellite point.
    pub theta: f64,
}

impl PositionSample {
    pub fn azimuth_deg(&self) -> f64 {
        self.azimuth.to_degrees()
    }

    pub fn elevation_deg(&self) -> f64 {
        self.elevation.to_degrees()
    }

    pub fn latitude_deg(&self) -> f64 {
        self.latitude.to_degrees()
    }

    /// East longitude wrapped to [-180, 180).
    pub fn longitude_deg(&self) -> f64 {
        (self.longitude.to_degrees() + 180.0).rem_euclid(360.0) - 180.0
    }

    pub fn is_above_horizon(&self) -> bool {
        self.elevation > 0.0
    }

    /// Diameter of the area on the ground that can see the satellite, km.
    pub fn footprint_km(&self) -> f64 {
        footprint_km(self.altitude)
    }

    /// Frequency heard on the ground for a transmitter at `freq`.
    pub fn downlink_freq(&self, freq: f64) -> f64 {
        freq * (SPEED_OF_LIGHT_M_S - self.range_rate * 1000.0) / SPEED_OF_LIGHT_M_S
    }

    /// Frequency to transmit so the satellite receives `freq`.
    pub fn uplink_freq(&self, freq: f64) -> f64 {
        freq * (SPEED_OF_LIGHT_M_S + self.range_rate * 1000.0) / SPEED_OF_LIGHT_M_S
    }
}
