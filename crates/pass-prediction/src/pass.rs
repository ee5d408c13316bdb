//! A single visibility window.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One pass of a satellite over a ground station.
///
/// Times are epoch milliseconds, angles degrees, altitude km.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pass {
    pub catalog_number: u32,
    pub name: String,
    pub is_deep_space: bool,
    /// Acquisition of signal
    pub aos_time: i64,
    pub aos_azimuth: f64,
    /// Loss of signal
    pub los_time: i64,
    pub los_azimuth: f64,
    /// Time of closest approach
    pub tca_time: i64,
    pub tca_azimuth: f64,
    pub max_elevation: f64,
    /// Altitude at TCA
    pub altitude: f64,
}

impl Pass {
    pub fn duration_millis(&self) -> i64 {
        self.los_time - self.aos_time
    }

    /// Fraction of the pass elapsed at `now_millis`, clamped to [0, 1].
    pub fn progress(&self, now_millis: i64) -> f64 {
        let duration = self.duration_millis();
        if duration <= 0 || now_millis <= self.aos_time {
            return 0.0;
        }
        if now_millis >= self.los_time {
            return 1.0;
        }
        (now_millis - self.aos_time) as f64 / duration as f64
    }

    pub fn is_active(&self, now_millis: i64) -> bool {
        (self.aos_time..self.los_time).contains(&now_millis)
    }

    pub fn aos(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.aos_time)
    }

    pub fn los(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.los_time)
    }

    pub fn tca(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.tca_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pass() -> Pass {
        Pass {
            catalog_number: 25544,
            name: "ISS (ZARYA)".to_string(),
            is_deep_space: false,
            aos_time: 1_000_000,
            aos_azimuth: 200.0,
            los_time: 1_600_000,
            los_azimuth: 40.0,
            tca_time: 1_300_000,
            tca_azimuth: 120.0,
            max_elevation: 45.0,
            altitude: 420.0,
        }
    }

    #[test]
    fn test_progress() {
        let p = pass();
        assert_eq!(p.duration_millis(), 600_000);
        assert_eq!(p.progress(0), 0.0);
        assert_eq!(p.progress(1_300_000), 0.5);
        assert_eq!(p.progress(2_000_000), 1.0);
        assert!(p.is_active(1_000_000));
        assert!(!p.is_active(1_600_000));
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(pass()).unwrap();
        assert_eq!(json["aos_time"], 1_000_000);
        assert_eq!(json["max_elevation"], 45.0);
        let back: Pass = serde_json::from_value(json).unwrap();
        assert_eq!(back, pass());
    }
}
