//! Vector and angle helpers shared by the propagators and geometry.

use crate::constants::TWO_PI;

pub type Vector3 = nalgebra::Vector3<f64>;

/// Reduce an angle to [0, 2π).
#[inline]
pub fn fmod2p(x: f64) -> f64 {
    x.rem_euclid(TWO_PI)
}

/// Floating-point modulus with a non-negative result.
#[inline]
pub fn modulus(a: f64, b: f64) -> f64 {
    a.rem_euclid(b)
}

/// Four-quadrant arctangent in [0, 2π).
#[inline]
pub fn ac_tan(sinx: f64, cosx: f64) -> f64 {
    fmod2p(sinx.atan2(cosx))
}

/// Angle between two vectors, radians.
pub fn angle_between(a: &Vector3, b: &Vector3) -> f64 {
    let denom = a.norm() * b.norm();
    if denom == 0.0 {
        return 0.0;
    }
    (a.dot(b) / denom).clamp(-1.0, 1.0).acos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_fmod2p_wraps_negative() {
        assert!((fmod2p(-PI / 2.0) - 1.5 * PI).abs() < 1e-12);
        assert!((fmod2p(5.0 * PI) - PI).abs() < 1e-12);
        assert_eq!(fmod2p(0.0), 0.0);
    }

    #[test]
    fn test_ac_tan_quadrants() {
        assert!((ac_tan(1.0, 0.0) - PI / 2.0).abs() < 1e-12);
        assert!((ac_tan(0.0, -1.0) - PI).abs() < 1e-12);
        assert!((ac_tan(-1.0, 0.0) - 1.5 * PI).abs() < 1e-12);
    }

    #[test]
    fn test_angle_between() {
        let x = Vector3::new(1.0, 0.0, 0.0);
        let y = Vector3::new(0.0, 2.0, 0.0);
        assert!((angle_between(&x, &y) - PI / 2.0).abs() < 1e-12);
        assert!((angle_between(&x, &(-x)) - PI).abs() < 1e-12);
        assert_eq!(angle_between(&x, &Vector3::zeros()), 0.0);
    }
}
