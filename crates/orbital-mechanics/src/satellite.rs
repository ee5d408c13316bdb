//! A tracked satellite: element set plus its lazily built propagator.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::elements::OrbitalElements;
use crate::geometry::geodetic;
use crate::observer::GeoPos;
use crate::propagation::Propagator;
use crate::sample::PositionSample;
use crate::time::julian_date_from_millis;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundTrackPoint {
    pub time_millis: i64,
    pub latitude: f64,
    /// Degrees east, [-180, 180)
    pub longitude: f64,
    pub altitude_km: f64,
}

#[derive(Debug)]
pub struct Satellite {
    elements: OrbitalElements,
    propagator: OnceLock<Propagator>,
}

impl Satellite {
    pub fn new(elements: OrbitalElements) -> Self {
        Self {
            elements,
            propagator: OnceLock::new(),
        }
    }

    pub fn elements(&self) -> &OrbitalElements {
        &self.elements
    }

    pub fn catalog_number(&self) -> u32 {
        self.elements.catalog_number()
    }

    pub fn name(&self) -> &str {
        self.elements.name()
    }

    /// Built on first use and kept for the satellite's lifetime.
    pub fn propagator(&self) -> &Propagator {
        self.propagator.get_or_init(|| Propagator::new(&self.elements))
    }

    pub fn position(&self, station: &GeoPos, time_millis: i64) -> PositionSample {
        self.propagator().propagate(station, time_millis)
    }

    pub fn position_at(&self, station: &GeoPos, time: DateTime<Utc>) -> PositionSample {
        self.position(station, time.timestamp_millis())
    }

    /// Sub-satellite points from `start_millis` to `end_millis` inclusive.
    pub fn ground_track(&self, start_millis: i64, end_millis: i64, step_millis: i64) -> Vec<GroundTrackPoint> {
        if step_millis <= 0 || end_millis < start_millis {
            return Vec::new();
        }
        let propagator = self.propagator();
        let mut points = Vec::new();
        let mut t = start_millis;
        while t <= end_millis {
            let jd = julian_date_from_millis(t);
            let sv = propagator.state_at(propagator.tsince(t));
            let sub = geodetic(&sv.position, jd);
            points.push(GroundTrackPoint {
                time_millis: t,
                latitude: sub.latitude.to_degrees(),
                longitude: (sub.longitude.to_degrees() + 180.0).rem_euclid(360.0) - 180.0,
                altitude_km: sub.altitude,
            });
            t += step_millis;
        }
        points
    }
}

impl Clone for Satellite {
    fn clone(&self) -> Self {
        Self::new(self.elements.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tle::parse_tle;

    fn iss() -> Satellite {
        Satellite::new(
            parse_tle(
                Some("ISS (ZARYA)"),
                "1 25544U 98067A   19343.69339541  .00001764  00000-0  38792-4 0  9991",
                "2 25544  51.6439 211.2001 0007417  17.6667  85.6398 15.50103472202482",
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_propagator_built_once() {
        let sat = iss();
        let a: *const Propagator = sat.propagator();
        let b: *const Propagator = sat.propagator();
        assert_eq!(a, b);
        assert_eq!(sat.name(), "ISS (ZARYA)");
    }

    #[test]
    fn test_ground_track_stays_within_inclination() {
        let sat = iss();
        let start = 1_575_895_000_000;
        let track = sat.ground_track(start, start + 93 * 60_000, 60_000);
        assert_eq!(track.len(), 94);
        for p in &track {
            assert!(p.latitude.abs() <= 52.0, "latitude {}", p.latitude);
            assert!((-180.0..180.0).contains(&p.longitude));
            assert!(p.altitude_km > 380.0 && p.altitude_km < 450.0);
        }
        assert!(sat.ground_track(start, start - 1, 1000).is_empty());
    }

    #[test]
    fn test_position_matches_ground_track() {
        let sat = iss();
        let station = GeoPos::new(0.0, 0.0, 0.0).unwrap();
        let t = 1_575_895_000_000;
        let sample = sat.position(&station, t);
        let point = sat.ground_track(t, t, 1)[0];
        assert!((sample.latitude_deg() - point.latitude).abs() < 1e-9);
        assert!((sample.longitude_deg() - point.longitude).abs() < 1e-9);
    }
}
