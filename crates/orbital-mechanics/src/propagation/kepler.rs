use crate::constants::{KEPLER_MAX_ITERATIONS, KEPLER_TOLERANCE};

/// Eccentric-longitude solution of the modified Kepler equation
/// `E - axn·sin E + ayn·cos E = U`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeplerSolution {
    pub epw: f64,
    pub sin_epw: f64,
    pub cos_epw: f64,
    pub iterations: usize,
    pub converged: bool,
}

/// Newton iteration starting from `capu`. Returns the last estimate when
/// the iteration budget runs out, with `converged` cleared.
pub fn solve_kepler(capu: f64, axn: f64, ayn: f64) -> KeplerSolution {
    let mut epw = capu;
    let mut iterations = 0;

    while iterations < KEPLER_MAX_ITERATIONS {
        iterations += 1;
        let (sin_e, cos_e) = epw.sin_cos();
        let next = (capu - ayn * cos_e + axn * sin_e - epw) / (1.0 - axn * cos_e - ayn * sin_e) + epw;
        let delta = (next - epw).abs();
        epw = next;
        if delta <= KEPLER_TOLERANCE {
            let (sin_epw, cos_epw) = epw.sin_cos();
            return KeplerSolution {
                epw,
                sin_epw,
                cos_epw,
                iterations,
                converged: true,
            };
        }
    }

    let (sin_epw, cos_epw) = epw.sin_cos();
    KeplerSolution {
        epw,
        sin_epw,
        cos_epw,
        iterations,
        converged: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn residual(capu: f64, axn: f64, ayn: f64, sol: &KeplerSolution) -> f64 {
        sol.epw - axn * sol.sin_epw + ayn * sol.cos_epw - capu
    }

    #[test]
    fn test_circular_orbit_is_identity() {
        let sol = solve_kepler(1.234, 0.0, 0.0);
        assert!(sol.converged);
        assert_eq!(sol.iterations, 1);
        assert!((sol.epw - 1.234).abs() < 1e-15);
    }

    #[test]
    fn test_moderate_eccentricity() {
        let (axn, ayn) = (0.1_f64 * 0.3_f64.cos(), 0.1_f64 * 0.3_f64.sin());
        let sol = solve_kepler(2.0, axn, ayn);
        assert!(sol.converged);
        assert!(sol.iterations <= KEPLER_MAX_ITERATIONS);
        assert!(residual(2.0, axn, ayn, &sol).abs() < 1e-10);
    }

    #[test]
    fn test_iteration_budget_is_bounded() {
        // near-parabolic with a poor starting point
        let sol = solve_kepler(0.001, 0.999_999, 0.0);
        assert!(sol.iterations <= KEPLER_MAX_ITERATIONS);
        assert!(sol.epw.is_finite());
        if !sol.converged {
            assert_eq!(sol.iterations, KEPLER_MAX_ITERATIONS);
        }
    }

    proptest! {
        #[test]
        fn prop_converges_for_typical_orbits(
            capu in 0.0f64..std::f64::consts::TAU,
            e in 0.0f64..0.75,
            omega in 0.0f64..std::f64::consts::TAU,
        ) {
            let (axn, ayn) = (e * omega.cos(), e * omega.sin());
            let sol = solve_kepler(capu, axn, ayn);
            prop_assert!(sol.converged);
            prop_assert!(residual(capu, axn, ayn, &sol).abs() < 1e-9);
        }
    }
}
