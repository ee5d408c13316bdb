//! SGP4/SDP4 propagation.
//!
//! A [`Propagator`] is built once per element set. Near-Earth orbits use
//! SGP4 and are propagated as a pure function of the time offset. Deep-space
//! orbits use SDP4, whose resonance integrator and lunar-solar periodic
//! terms carry state between calls behind a per-instance lock.

mod common;
mod deep_space;
mod kepler;
mod near_earth;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::MINUTES_PER_DAY;
use crate::elements::OrbitalElements;
use crate::geometry::{eclipse, geodetic, look_angles, solar_position};
use crate::math::Vector3;
use crate::observer::GeoPos;
use crate::sample::PositionSample;
use crate::time::julian_date_from_millis;

pub use kepler::{solve_kepler, KeplerSolution};

use common::OrbitalState;
use deep_space::DeepSpace;
use near_earth::NearEarth;

/// ECI position (km) and velocity (km/s).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateVector {
    pub position: Vector3,
    pub velocity: Vector3,
}

/// Geopotential resonance handled by the deep-space integrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResonanceClass {
    /// 24 h period
    Synchronous,
    /// 12 h period with eccentricity at least 0.5, as in published SDP4.
    /// Reading the bound as `e < 0.5` would make near-circular GPS-like
    /// orbits resonant.
    HalfDay,
}

#[derive(Debug)]
enum Model {
    NearEarth(NearEarth),
    DeepSpace(Box<DeepSpace>),
}

#[derive(Debug)]
pub struct Propagator {
    elements: OrbitalElements,
    model: Model,
}

impl Propagator {
    pub fn new(elements: &OrbitalElements) -> Self {
        let model = if elements.is_deep_space() {
            Model::DeepSpace(Box::new(DeepSpace::new(elements)))
        } else {
            Model::NearEarth(NearEarth::new(elements))
        };

        debug!(
            catalog = elements.catalog_number(),
            deep_space = elements.is_deep_space(),
            period_min = elements.period_min(),
            "propagator initialised"
        );

        Self {
            elements: elements.clone(),
            model,
        }
    }

    pub fn elements(&self) -> &OrbitalElements {
        &self.elements
    }

    pub fn is_deep_space(&self) -> bool {
        matches!(self.model, Model::DeepSpace(_))
    }

    /// True when the near-Earth drag model is truncated (perigee < 220 km).
    pub fn is_simple_drag(&self) -> bool {
        match &self.model {
            Model::NearEarth(m) => m.is_simple(),
            Model::DeepSpace(_) => false,
        }
    }

    pub fn resonance_class(&self) -> Option<ResonanceClass> {
        match &self.model {
            Model::NearEarth(_) => None,
            Model::DeepSpace(m) => m.resonance_class(),
        }
    }

    /// Perigee height recovered from the mean elements, km.
    pub fn perigee_km(&self) -> f64 {
        match &self.model {
            Model::NearEarth(m) => m.base().perigee_km,
            Model::DeepSpace(m) => m.base().perigee_km,
        }
    }

    /// Minutes between the element epoch and `time_millis`.
    pub fn tsince(&self, time_millis: i64) -> f64 {
        (julian_date_from_millis(time_millis) - self.elements.jd_epoch()) * MINUTES_PER_DAY
    }

    fn orbital_state(&self, tsince: f64) -> OrbitalState {
        match &self.model {
            Model::NearEarth(m) => m.propagate(tsince),
            Model::DeepSpace(m) => m.propagate(tsince),
        }
    }

    /// ECI state `tsince` minutes after epoch.
    pub fn state_at(&self, tsince: f64) -> StateVector {
        self.orbital_state(tsince).to_state_vector()
    }

    /// Position, look angles, sub-point and eclipse state at `time_millis`
    /// as seen from `station`.
    pub fn propagate(&self, station: &GeoPos, time_millis: i64) -> PositionSample {
        let jd = julian_date_from_millis(time_millis);
        let tsince = (jd - self.elements.jd_epoch()) * MINUTES_PER_DAY;
        let orbit = self.orbital_state(tsince);
        let sv = orbit.to_state_vector();

        let look = look_angles(&sv.position, &sv.velocity, station, jd);
        let sub = geodetic(&sv.position, jd);
        let shadow = eclipse(&sv.position, &solar_position(jd));

        PositionSample {
            time_millis,
            azimuth: look.azimuth,
            elevation: look.elevation,
            range: look.range,
            range_rate: look.range_rate,
            latitude: sub.latitude,
            longitude: sub.longitude,
            altitude: sub.altitude,
            eclipsed: shadow.eclipsed,
            eclipse_depth: shadow.depth,
            phase: orbit.phase,
            position: sv.position,
            velocity: sv.velocity,
            theta: sub.theta,
        }
    }

    pub fn propagate_at(&self, station: &GeoPos, time: DateTime<Utc>) -> PositionSample {
        self.propagate(station, time.timestamp_millis())
    }
}
