//! Classical orbital elements and the quantities derived from them.

use serde::{Deserialize, Serialize};

use crate::constants::{DEEP_SPACE_PERIOD_MIN, DEG2RAD, MINUTES_PER_DAY, TWO_PI};
use crate::time::julian_date_of_epoch;
use crate::{OrbitalError, Result};

/// Raw element set as decoded from a TLE. Angles in degrees, mean motion in
/// revolutions per day, epoch as `yyddd.dddddddd`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementSet {
    pub catalog_number: u32,
    pub name: String,
    pub epoch: f64,
    pub mean_motion: f64,
    pub eccentricity: f64,
    pub inclination: f64,
    pub raan: f64,
    pub arg_perigee: f64,
    pub mean_anomaly: f64,
    pub bstar: f64,
}

/// Validated, immutable element set with derived quantities.
///
/// Built once per imported TLE and handed to [`crate::Propagator::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ElementSet", into = "ElementSet")]
pub struct OrbitalElements {
    raw: ElementSet,
    xincl: f64,
    xnodeo: f64,
    omegao: f64,
    xmo: f64,
    xno: f64,
    period_min: f64,
    jd_epoch: f64,
    deep_space: bool,
}

fn normalize_deg(deg: f64) -> f64 {
    deg.rem_euclid(360.0)
}

impl OrbitalElements {
    pub fn new(raw: ElementSet) -> Result<Self> {
        let finite = [
            raw.epoch,
            raw.mean_motion,
            raw.eccentricity,
            raw.inclination,
            raw.raan,
            raw.arg_perigee,
            raw.mean_anomaly,
            raw.bstar,
        ]
        .iter()
        .all(|v| v.is_finite());
        if !finite {
            return Err(OrbitalError::InvalidElements(format!(
                "non-finite element in set for {}",
                raw.catalog_number
            )));
        }
        if raw.mean_motion <= 0.0 {
            return Err(OrbitalError::InvalidElements(format!(
                "mean motion must be positive, got {}",
                raw.mean_motion
            )));
        }
        if !(0.0..1.0).contains(&raw.eccentricity) {
            return Err(OrbitalError::InvalidElements(format!(
                "eccentricity must be in [0, 1), got {}",
                raw.eccentricity
            )));
        }
        if !(0.0..=180.0).contains(&raw.inclination) {
            return Err(OrbitalError::InvalidElements(format!(
                "inclination must be in [0, 180], got {}",
                raw.inclination
            )));
        }
        if raw.epoch < 0.0 {
            return Err(OrbitalError::InvalidElements(format!(
                "epoch must be yyddd.dddddddd, got {}",
                raw.epoch
            )));
        }

        let raw = ElementSet {
            raan: normalize_deg(raw.raan),
            arg_perigee: normalize_deg(raw.arg_perigee),
            mean_anomaly: normalize_deg(raw.mean_anomaly),
            ..raw
        };

        let period_min = MINUTES_PER_DAY / raw.mean_motion;
        Ok(Self {
            xincl: raw.inclination * DEG2RAD,
            xnodeo: raw.raan * DEG2RAD,
            omegao: raw.arg_perigee * DEG2RAD,
            xmo: raw.mean_anomaly * DEG2RAD,
            xno: raw.mean_motion * TWO_PI / MINUTES_PER_DAY,
            period_min,
            jd_epoch: julian_date_of_epoch(raw.epoch),
            deep_space: period_min >= DEEP_SPACE_PERIOD_MIN,
            raw,
        })
    }

    pub fn catalog_number(&self) -> u32 {
        self.raw.catalog_number
    }

    pub fn name(&self) -> &str {
        &self.raw.name
    }

    /// Epoch as encoded in the TLE, `yyddd.dddddddd`.
    pub fn epoch(&self) -> f64 {
        self.raw.epoch
    }

    pub fn jd_epoch(&self) -> f64 {
        self.jd_epoch
    }

    /// Mean motion, revolutions per day.
    pub fn mean_motion(&self) -> f64 {
        self.raw.mean_motion
    }

    pub fn eccentricity(&self) -> f64 {
        self.raw.eccentricity
    }

    /// Inclination, degrees.
    pub fn inclination(&self) -> f64 {
        self.raw.inclination
    }

    /// Right ascension of the ascending node, degrees.
    pub fn raan(&self) -> f64 {
        self.raw.raan
    }

    pub fn arg_perigee(&self) -> f64 {
        self.raw.arg_perigee
    }

    pub fn mean_anomaly(&self) -> f64 {
        self.raw.mean_anomaly
    }

    pub fn bstar(&self) -> f64 {
        self.raw.bstar
    }

    pub fn inclination_rad(&self) -> f64 {
        self.xincl
    }

    pub fn raan_rad(&self) -> f64 {
        self.xnodeo
    }

    pub fn arg_perigee_rad(&self) -> f64 {
        self.omegao
    }

    pub fn mean_anomaly_rad(&self) -> f64 {
        self.xmo
    }

    /// Mean motion, radians per minute.
    pub fn mean_motion_rad_min(&self) -> f64 {
        self.xno
    }

    /// Orbital period, minutes.
    pub fn period_min(&self) -> f64 {
        self.period_min
    }

    pub fn is_deep_space(&self) -> bool {
        self.deep_space
    }

    pub fn element_set(&self) -> &ElementSet {
        &self.raw
    }
}

impl TryFrom<ElementSet> for OrbitalElements {
    type Error = OrbitalError;

    fn try_from(raw: ElementSet) -> Result<Self> {
        Self::new(raw)
    }
}

impl From<OrbitalElements> for ElementSet {
    fn from(elements: OrbitalElements) -> Self {
        elements.raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iss() -> ElementSet {
        ElementSet {
            catalog_number: 25544,
            name: "ISS (ZARYA)".to_string(),
            epoch: 19_343.693_395_41,
            mean_motion: 15.501_034_72,
            eccentricity: 0.000_741_7,
            inclination: 51.6439,
            raan: 211.2001,
            arg_perigee: 17.6667,
            mean_anomaly: 85.6398,
            bstar: 0.387_92e-4,
        }
    }

    #[test]
    fn test_derived_quantities() {
        let el = OrbitalElements::new(iss()).unwrap();
        assert!((el.period_min() - 92.896).abs() < 0.01);
        assert!((el.mean_motion_rad_min() - 0.067_636).abs() < 1e-5);
        assert!((el.inclination_rad() - 51.6439_f64.to_radians()).abs() < 1e-12);
        assert!(!el.is_deep_space());
    }

    #[test]
    fn test_deep_space_threshold() {
        let geo = OrbitalElements::new(ElementSet {
            mean_motion: 1.002_7,
            ..iss()
        })
        .unwrap();
        assert!(geo.is_deep_space());

        // 1440 / 6.4 = 225 minutes exactly
        let boundary = OrbitalElements::new(ElementSet {
            mean_motion: 6.4,
            ..iss()
        })
        .unwrap();
        assert!(boundary.is_deep_space());

        let below = OrbitalElements::new(ElementSet {
            mean_motion: 6.41,
            ..iss()
        })
        .unwrap();
        assert!(!below.is_deep_space());
    }

    #[test]
    fn test_angles_normalized() {
        let el = OrbitalElements::new(ElementSet {
            raan: -10.0,
            mean_anomaly: 370.0,
            ..iss()
        })
        .unwrap();
        assert!((el.raan() - 350.0).abs() < 1e-12);
        assert!((el.mean_anomaly() - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_invalid() {
        assert!(OrbitalElements::new(ElementSet { mean_motion: 0.0, ..iss() }).is_err());
        assert!(OrbitalElements::new(ElementSet { eccentricity: 1.0, ..iss() }).is_err());
        assert!(OrbitalElements::new(ElementSet { inclination: f64::NAN, ..iss() }).is_err());
    }

    #[test]
    fn test_serde_validates() {
        let el = OrbitalElements::new(iss()).unwrap();
        let json = serde_json::to_string(&el).unwrap();
        let back: OrbitalElements = serde_json::from_str(&json).unwrap();
        assert_eq!(el, back);

        let bad = json.replace("\"eccentricity\":0.0007417", "\"eccentricity\":1.5");
        assert!(serde_json::from_str::<OrbitalElements>(&bad).is_err());
    }
}
