//! Physical and model constants.
//!
//! The gravity-model values are the WGS-72 set the SGP4/SDP4 models were
//! fitted against. Observer and sub-point geometry use the WGS-84 ellipsoid.

use std::f64::consts::PI;

pub const TWO_PI: f64 = 2.0 * PI;
pub const DEG2RAD: f64 = PI / 180.0;
pub const TOTHRD: f64 = 2.0 / 3.0;

/// Distance units per Earth radius used inside the propagator.
pub const AE: f64 = 1.0;
/// Equatorial radius the propagator scales its output with (WGS-72), km.
pub const XKMPER: f64 = 6378.135;
/// Equatorial radius of the observer ellipsoid (WGS-84), km.
pub const EARTH_RADIUS_KM: f64 = 6378.137;
/// WGS-84 flattening, 1/298.257223563.
pub const FLATTENING: f64 = 3.352_810_664_747_48e-3;

pub const XKE: f64 = 7.436_691_61e-2;
/// J2/2
pub const CK2: f64 = 5.413_079e-4;
/// -3/8 J4
pub const CK4: f64 = 6.209_887e-7;
pub const XJ3: f64 = -2.538_81e-6;
/// Drag density-function parameter s, in Earth radii.
pub const S: f64 = AE * (1.0 + 78.0 / XKMPER);
/// (q0 - s)^4 in Earth radii.
pub const QOMS2T: f64 = 1.880_279e-9;

pub const MINUTES_PER_DAY: f64 = 1440.0;
pub const SECONDS_PER_DAY: f64 = 86_400.0;
pub const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Earth rotation rate, rad/s.
pub const EARTH_ROTATION_RATE: f64 = 7.292_115e-5;
pub const EARTH_ROTATIONS_PER_SIDEREAL_DAY: f64 = 1.002_737_909_34;
/// Earth rotation rate, rad/min.
pub const THDT: f64 = 4.375_269_088_011_299_66e-3;

pub const AU_KM: f64 = 1.495_978_706_91e8;
pub const SOLAR_RADIUS_KM: f64 = 6.96e5;
pub const SPEED_OF_LIGHT_M_S: f64 = 299_792_458.0;

/// Orbits with a period at or above this (minutes) use the deep-space model.
pub const DEEP_SPACE_PERIOD_MIN: f64 = 225.0;

/// Kepler solver bounds.
pub const KEPLER_TOLERANCE: f64 = 1e-12;
pub const KEPLER_MAX_ITERATIONS: usize = 10;

/// Geodetic latitude inversion bounds.
pub const GEODETIC_TOLERANCE: f64 = 1e-12;
pub const GEODETIC_MAX_ITERATIONS: usize = 10;

// Lunar-solar perturbation constants.
pub const ZNS: f64 = 1.194_59e-5;
pub const C1SS: f64 = 2.986_479_7e-6;
pub const ZES: f64 = 0.016_75;
pub const ZNL: f64 = 1.583_521_8e-4;
pub const C1L: f64 = 4.796_806_5e-7;
pub const ZEL: f64 = 0.054_90;
pub const ZCOSIS: f64 = 0.917_448_67;
pub const ZSINIS: f64 = 0.397_854_16;
pub const ZSINGS: f64 = -0.980_884_58;
pub const ZCOSGS: f64 = 0.194_590_5;

// Geopotential resonance constants.
pub const Q22: f64 = 1.789_167_9e-6;
pub const Q31: f64 = 2.146_074_8e-6;
pub const Q33: f64 = 2.212_301_5e-7;
pub const G22: f64 = 5.768_639_6;
pub const G32: f64 = 0.952_408_98;
pub const G44: f64 = 1.801_499_8;
pub const G52: f64 = 1.050_833_0;
pub const G54: f64 = 4.410_889_8;
pub const ROOT22: f64 = 1.789_167_9e-6;
pub const ROOT32: f64 = 3.739_379_2e-7;
pub const ROOT44: f64 = 7.363_695_3e-9;
pub const ROOT52: f64 = 1.142_863_9e-7;
pub const ROOT54: f64 = 2.176_580_3e-9;
pub const FASX2: f64 = 0.131_309_08;
pub const FASX4: f64 = 2.884_319_8;
pub const FASX6: f64 = 0.374_480_87;

/// Resonance integrator step, minutes.
pub const STEP: f64 = 720.0;
/// STEP^2 / 2
pub const STEP2: f64 = 259_200.0;
/// Lunar-solar periodics are recomputed once the epoch offset moves this far, minutes.
pub const PERIODICS_REFRESH_MIN: f64 = 30.0;
