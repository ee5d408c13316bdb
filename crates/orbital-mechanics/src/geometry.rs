//! Frame geometry shared by both propagators: observer position in ECI,
//! topocentric look angles, geodetic sub-point, solar position and eclipse.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::constants::{
    AU_KM, DEG2RAD, EARTH_RADIUS_KM, EARTH_ROTATION_RATE, FLATTENING, GEODETIC_MAX_ITERATIONS,
    GEODETIC_TOLERANCE, SECONDS_PER_DAY, SOLAR_RADIUS_KM, TWO_PI,
};
use crate::math::{angle_between, fmod2p, modulus, Vector3};
use crate::observer::GeoPos;
use crate::time::theta_g_jd;

/// Observer state in the ECI frame.
#[derive(Debug, Clone, Copy)]
pub struct ObserverState {
    pub position: Vector3,
    pub velocity: Vector3,
    /// Local sidereal angle of the observer, radians.
    pub theta: f64,
}

/// Topocentric look angles from an observer to a target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LookAngles {
    /// Radians, 0 = north, clockwise, [0, 2π)
    pub azimuth: f64,
    /// Radians above the horizon
    pub elevation: f64,
    /// km
    pub range: f64,
    /// km/s, positive when receding
    pub range_rate: f64,
}

/// Geodetic sub-point of an ECI position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geodetic {
    /// Radians, [-π/2, π/2]
    pub latitude: f64,
    /// Radians east, [0, 2π)
    pub longitude: f64,
    /// km above the ellipsoid
    pub altitude: f64,
    /// Right ascension of the position, radians
    pub theta: f64,
    pub iterations: usize,
    pub converged: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Eclipse {
    pub eclipsed: bool,
    /// Radians; non-negative while in umbra.
    pub depth: f64,
}

/// ECI position and velocity of a ground station on the oblate Earth.
pub fn observer_eci(station: &GeoPos, jd: f64) -> ObserverState {
    let lat = station.latitude_rad();
    let theta = fmod2p(theta_g_jd(jd) + station.longitude * DEG2RAD);
    let c = 1.0 / (1.0 + FLATTENING * (FLATTENING - 2.0) * lat.sin().powi(2)).sqrt();
    let sq = (1.0 - FLATTENING).powi(2) * c;
    let alt_km = station.altitude_km();
    let achcp = (EARTH_RADIUS_KM * c + alt_km) * lat.cos();

    let position = Vector3::new(
        achcp * theta.cos(),
        achcp * theta.sin(),
        (EARTH_RADIUS_KM * sq + alt_km) * lat.sin(),
    );
    let velocity = Vector3::new(
        -EARTH_ROTATION_RATE * position.y,
        EARTH_ROTATION_RATE * position.x,
        0.0,
    );

    ObserverState {
        position,
        velocity,
        theta,
    }
}

/// Azimuth, elevation, range and range-rate of an ECI target (km, km/s).
pub fn look_angles(position: &Vector3, velocity: &Vector3, station: &GeoPos, jd: f64) -> LookAngles {
    let obs = observer_eci(station, jd);
    let range = position - obs.position;
    let rgvel = velocity - obs.velocity;
    let distance = range.norm();

    let (sin_lat, cos_lat) = station.latitude_rad().sin_cos();
    let (sin_theta, cos_theta) = obs.theta.sin_cos();

    let top_s = sin_lat * cos_theta * range.x + sin_lat * sin_theta * range.y - cos_lat * range.z;
    let top_e = -sin_theta * range.x + cos_theta * range.y;
    let top_z = cos_lat * cos_theta * range.x + cos_lat * sin_theta * range.y + sin_lat * range.z;

    let mut azimuth = (-top_e / top_s).atan();
    if top_s > 0.0 {
        azimuth += PI;
    }
    if azimuth < 0.0 {
        azimuth += TWO_PI;
    }
    if azimuth.is_nan() {
        // target at the zenith
        azimuth = 0.0;
    }

    LookAngles {
        azimuth,
        elevation: (top_z / distance).clamp(-1.0, 1.0).asin(),
        range: distance,
        range_rate: range.dot(&rgvel) / distance,
    }
}

/// Sub-satellite point by iterating the oblate-Earth latitude equation.
///
/// Stops at [`GEODETIC_TOLERANCE`] or after [`GEODETIC_MAX_ITERATIONS`];
/// the last estimate is kept either way.
pub fn geodetic(position: &Vector3, jd: f64) -> Geodetic {
    let theta = position.y.atan2(position.x);
    let longitude = fmod2p(theta - theta_g_jd(jd));
    let r = position.x.hypot(position.y);
    let e2 = FLATTENING * (2.0 - FLATTENING);

    let mut latitude = position.z.atan2(r);
    let mut c = 1.0;
    let mut iterations = 0;
    let mut converged = false;
    while iterations < GEODETIC_MAX_ITERATIONS {
        iterations += 1;
        let phi = latitude;
        let sin_phi = phi.sin();
        c = 1.0 / (1.0 - e2 * sin_phi * sin_phi).sqrt();
        latitude = (position.z + EARTH_RADIUS_KM * c * e2 * sin_phi).atan2(r);
        if (latitude - phi).abs() < GEODETIC_TOLERANCE {
            converged = true;
            break;
        }
    }

    let altitude = r / latitude.cos() - EARTH_RADIUS_KM * c;

    Geodetic {
        latitude,
        longitude,
        altitude,
        theta,
        iterations,
        converged,
    }
}

/// Difference between ephemeris time and UT, seconds.
fn delta_et(year: f64) -> f64 {
    26.465 + 0.747_622 * (year - 1950.0) + 1.886_913 * (TWO_PI * (year - 1975.0) / 33.0).sin()
}

/// Low-precision geocentric solar position in ECI, km.
pub fn solar_position(jd: f64) -> Vector3 {
    let mjd = jd - 2_415_020.0;
    let year = 1900.0 + mjd / 365.25;
    let t = (mjd + delta_et(year) / SECONDS_PER_DAY) / 36_525.0;

    let m = (modulus(
        358.475_83 + modulus(35_999.049_75 * t, 360.0) - (0.000_150 + 0.000_003_3 * t) * t * t,
        360.0,
    ))
    .to_radians();
    let l = (modulus(
        279.696_68 + modulus(36_000.768_92 * t, 360.0) + 0.000_302_5 * t * t,
        360.0,
    ))
    .to_radians();
    let e = 0.016_751_04 - (0.000_041_8 + 0.000_000_126 * t) * t;
    let c = ((1.919_460 - (0.004_789 + 0.000_014 * t) * t) * m.sin()
        + (0.020_094 - 0.000_100 * t) * (2.0 * m).sin()
        + 0.000_293 * (3.0 * m).sin())
    .to_radians();
    let o = modulus(259.18 - 1_934.142 * t, 360.0).to_radians();
    let lsa = modulus(l + c - (0.005_69 - 0.004_79 * o.sin()).to_radians(), TWO_PI);
    let nu = modulus(m + c, TWO_PI);
    let r = AU_KM * 1.000_000_2 * (1.0 - e * e) / (1.0 + e * nu.cos());
    let eps = (23.452_294 - (0.013_012_5 + (0.000_001_64 - 0.000_000_503 * t) * t) * t
        + 0.002_56 * o.cos())
    .to_radians();

    Vector3::new(
        r * lsa.cos(),
        r * lsa.sin() * eps.cos(),
        r * lsa.sin() * eps.sin(),
    )
}

/// Umbral eclipse test comparing the Earth and Sun semi-diameters seen
/// from the satellite against their angular separation.
pub fn eclipse(position: &Vector3, solar: &Vector3) -> Eclipse {
    let sd_earth = (EARTH_RADIUS_KM / position.norm()).clamp(-1.0, 1.0).asin();
    let rho = solar - position;
    let sd_sun = (SOLAR_RADIUS_KM / rho.norm()).clamp(-1.0, 1.0).asin();
    let earth = -position;
    let delta = angle_between(solar, &earth);
    let depth = sd_earth - sd_sun - delta;

    Eclipse {
        eclipsed: sd_earth >= sd_sun && depth >= 0.0,
        depth,
    }
}

/// Diameter of the visibility footprint for a satellite at `altitude_km`.
pub fn footprint_km(altitude_km: f64) -> f64 {
    if altitude_km <= 0.0 {
        return 0.0;
    }
    2.0 * EARTH_RADIUS_KM * (EARTH_RADIUS_KM / (EARTH_RADIUS_KM + altitude_km)).acos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::julian_date;
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;
    use std::f64::consts::FRAC_PI_2;

    const JD: f64 = 2_460_000.25;

    #[test]
    fn test_observer_on_equator() {
        let station = GeoPos::new(0.0, 0.0, 0.0).unwrap();
        let obs = observer_eci(&station, JD);
        assert!((obs.position.norm() - EARTH_RADIUS_KM).abs() < 1e-9);
        assert!(obs.position.z.abs() < 1e-9);
        assert!((obs.theta - theta_g_jd(JD)).abs() < 1e-12);
        // 0.465 km/s at the equator
        assert!((obs.velocity.norm() - 0.465_1).abs() < 1e-3);
    }

    #[test]
    fn test_overhead_target() {
        let station = GeoPos::new(40.0, -105.0, 1600.0).unwrap();
        let obs = observer_eci(&station, JD);
        let up = obs.position.normalize();
        let target = obs.position + up * 500.0;
        let angles = look_angles(&target, &obs.velocity, &station, JD);
        assert!((angles.elevation.to_degrees() - 90.0).abs() < 0.5);
        assert!((angles.range - 500.0).abs() < 1e-6);
        assert!(angles.range_rate.abs() < 1e-9);
    }

    #[test]
    fn test_target_below_horizon() {
        let station = GeoPos::new(0.0, 0.0, 0.0).unwrap();
        let obs = observer_eci(&station, JD);
        let target = -obs.position * 1.1;
        let angles = look_angles(&target, &Vector3::zeros(), &station, JD);
        assert!(angles.elevation < -FRAC_PI_2 + 1e-6);
    }

    #[test]
    fn test_geodetic_inverts_observer() {
        let station = GeoPos::new(45.0, 30.0, 500_000.0).unwrap();
        let obs = observer_eci(&station, JD);
        let geo = geodetic(&obs.position, JD);
        assert!(geo.converged);
        assert!(geo.iterations <= GEODETIC_MAX_ITERATIONS);
        assert!((geo.latitude.to_degrees() - 45.0).abs() < 1e-8);
        assert!((geo.longitude.to_degrees() - 30.0).abs() < 1e-8);
        assert!((geo.altitude - 500.0).abs() < 1e-6);
    }

    #[test]
    fn test_solar_position_at_equinox_and_solstice() {
        let equinox = julian_date(Utc.with_ymd_and_hms(2024, 3, 20, 3, 6, 0).unwrap());
        let sun = solar_position(equinox);
        let declination = (sun.z / sun.norm()).asin().to_degrees();
        assert!(declination.abs() < 0.1, "declination {declination}");
        assert!((sun.norm() / AU_KM - 1.0).abs() < 0.02);

        let solstice = julian_date(Utc.with_ymd_and_hms(2024, 6, 20, 20, 51, 0).unwrap());
        let sun = solar_position(solstice);
        let declination = (sun.z / sun.norm()).asin().to_degrees();
        assert!((declination - 23.44).abs() < 0.1, "declination {declination}");
    }

    #[test]
    fn test_eclipse_night_and_day_side() {
        let sun = solar_position(JD);
        let toward_sun = sun.normalize();

        let night = -toward_sun * 7000.0;
        let e = eclipse(&night, &sun);
        assert!(e.eclipsed);
        assert!(e.depth > 0.0);

        let day = toward_sun * 7000.0;
        assert!(!eclipse(&day, &sun).eclipsed);
    }

    #[test]
    fn test_footprint() {
        assert_eq!(footprint_km(0.0), 0.0);
        // ~4500 km across for a 420 km orbit
        let d = footprint_km(420.0);
        assert!(d > 4_400.0 && d < 4_600.0, "footprint {d}");
    }

    proptest! {
        #[test]
        fn prop_azimuth_in_range(
            lat in -89.0f64..89.0,
            lon in -180.0f64..180.0,
            x in -40_000.0f64..40_000.0,
            y in -40_000.0f64..40_000.0,
            z in -40_000.0f64..40_000.0,
        ) {
            let station = GeoPos::new(lat, lon, 0.0).unwrap();
            let target = Vector3::new(x, y, z);
            prop_assume!(target.norm() > EARTH_RADIUS_KM + 100.0);
            let angles = look_angles(&target, &Vector3::zeros(), &station, JD);
            prop_assert!(angles.azimuth >= 0.0 && angles.azimuth < TWO_PI);
            prop_assert!(angles.elevation.abs() <= FRAC_PI_2);
            prop_assert!(angles.range > 0.0);
        }

        #[test]
        fn prop_geodetic_round_trip(
            lat in -85.0f64..85.0,
            lon in 0.0f64..359.0,
            alt_km in 0.0f64..36_000.0,
        ) {
            let station = GeoPos::new(lat, lon, alt_km * 1000.0).unwrap();
            let obs = observer_eci(&station, JD);
            let geo = geodetic(&obs.position, JD);
            prop_assert!((geo.latitude.to_degrees() - lat).abs() < 1e-6);
            prop_assert!((geo.altitude - alt_km).abs() < 1e-3);
        }
    }
}
