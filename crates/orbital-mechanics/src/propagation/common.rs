//! Initialisation and short-period terms shared by the near-Earth and
//! deep-space models.

use crate::constants::{AE, CK2, CK4, QOMS2T, S, TOTHRD, TWO_PI, XJ3, XKE, XKMPER};
use crate::elements::OrbitalElements;
use crate::math::{ac_tan, fmod2p, Vector3};

use super::kepler::solve_kepler;
use super::StateVector;

/// Smallest `1 + cos i` used when dividing by it near 180° inclination.
const MIN_ONE_PLUS_COSIO: f64 = 1.5e-12;

/// Coefficients computed once from the element set: recovered mean motion
/// and semi-major axis, drag terms and secular rates.
#[derive(Debug, Clone)]
pub(crate) struct BaseTerms {
    pub xmo: f64,
    pub omegao: f64,
    pub xnodeo: f64,
    pub xincl: f64,
    pub eo: f64,
    pub bstar: f64,

    pub cosio: f64,
    pub sinio: f64,
    pub theta2: f64,
    pub x3thm1: f64,
    pub x1mth2: f64,
    pub x7thm1: f64,
    pub eosq: f64,
    pub betao: f64,
    pub betao2: f64,
    pub xnodp: f64,
    pub aodp: f64,
    /// Perigee height, km.
    pub perigee_km: f64,

    pub s4: f64,
    pub tsi: f64,
    pub eta: f64,
    pub coef: f64,
    pub coef1: f64,
    pub a3ovk2: f64,

    pub c1: f64,
    pub c4: f64,
    pub xmdot: f64,
    pub omgdot: f64,
    pub xnodot: f64,
    pub xnodcf: f64,
    pub t2cof: f64,
    pub xlcof: f64,
    pub aycof: f64,
}

impl BaseTerms {
    pub fn new(elements: &OrbitalElements) -> Self {
        let xno = elements.mean_motion_rad_min();
        let eo = elements.eccentricity();
        let xincl = elements.inclination_rad();
        let omegao = elements.arg_perigee_rad();
        let bstar = elements.bstar();

        // Recover original mean motion and semi-major axis.
        let a1 = (XKE / xno).powf(TOTHRD);
        let (sinio, cosio) = xincl.sin_cos();
        let theta2 = cosio * cosio;
        let x3thm1 = 3.0 * theta2 - 1.0;
        let eosq = eo * eo;
        let betao2 = 1.0 - eosq;
        let betao = betao2.sqrt();
        let del1 = 1.5 * CK2 * x3thm1 / (a1 * a1 * betao * betao2);
        let ao = a1 * (1.0 - del1 * (0.5 * TOTHRD + del1 * (1.0 + 134.0 / 81.0 * del1)));
        let delo = 1.5 * CK2 * x3thm1 / (ao * ao * betao * betao2);
        let xnodp = xno / (1.0 + delo);
        let aodp = ao / (1.0 - delo);

        // Low perigees alter the density-function parameters.
        let perigee_km = (aodp * (1.0 - eo) - AE) * XKMPER;
        let (s4, qoms24) = if perigee_km < 156.0 {
            let s = if perigee_km <= 98.0 {
                20.0
            } else {
                perigee_km - 78.0
            };
            (s / XKMPER + AE, ((120.0 - s) * AE / XKMPER).powi(4))
        } else {
            (S, QOMS2T)
        };

        let pinvsq = 1.0 / (aodp * aodp * betao2 * betao2);
        let tsi = 1.0 / (aodp - s4);
        let eta = aodp * eo * tsi;
        let etasq = eta * eta;
        let eeta = eo * eta;
        let psisq = (1.0 - etasq).abs();
        let coef = qoms24 * tsi.powi(4);
        let coef1 = coef / psisq.powf(3.5);
        let c2 = coef1
            * xnodp
            * (aodp * (1.0 + 1.5 * etasq + eeta * (4.0 + etasq))
                + 0.75 * CK2 * tsi / psisq * x3thm1 * (8.0 + 3.0 * etasq * (8.0 + etasq)));
        let c1 = bstar * c2;
        let a3ovk2 = -XJ3 / CK2 * AE.powi(3);
        let x1mth2 = 1.0 - theta2;
        let c4 = 2.0
            * xnodp
            * coef1
            * aodp
            * betao2
            * (eta * (2.0 + 0.5 * etasq) + eo * (0.5 + 2.0 * etasq)
                - 2.0 * CK2 * tsi / (aodp * psisq)
                    * (-3.0 * x3thm1 * (1.0 - 2.0 * eeta + etasq * (1.5 - 0.5 * eeta))
                        + 0.75 * x1mth2 * (2.0 * etasq - eeta * (1.0 + etasq)) * (2.0 * omegao).cos()));

        let theta4 = theta2 * theta2;
        let temp1 = 3.0 * CK2 * pinvsq * xnodp;
        let temp2 = temp1 * CK2 * pinvsq;
        let temp3 = 1.25 * CK4 * pinvsq * pinvsq * xnodp;
        let xmdot = xnodp
            + 0.5 * temp1 * betao * x3thm1
            + 0.0625 * temp2 * betao * (13.0 - 78.0 * theta2 + 137.0 * theta4);
        let x1m5th = 1.0 - 5.0 * theta2;
        let omgdot = -0.5 * temp1 * x1m5th
            + 0.0625 * temp2 * (7.0 - 114.0 * theta2 + 395.0 * theta4)
            + temp3 * (3.0 - 36.0 * theta2 + 49.0 * theta4);
        let xhdot1 = -temp1 * cosio;
        let xnodot = xhdot1
            + (0.5 * temp2 * (4.0 - 19.0 * theta2) + 2.0 * temp3 * (3.0 - 7.0 * theta2)) * cosio;

        let one_plus_cosio = (1.0 + cosio).max(MIN_ONE_PLUS_COSIO);

        Self {
            xmo: elements.mean_anomaly_rad(),
            omegao,
            xnodeo: elements.raan_rad(),
            xincl,
            eo,
            bstar,
            cosio,
            sinio,
            theta2,
            x3thm1,
            x1mth2,
            x7thm1: 7.0 * theta2 - 1.0,
            eosq,
            betao,
            betao2,
            xnodp,
            aodp,
            perigee_km,
            s4,
            tsi,
            eta,
            coef,
            coef1,
            a3ovk2,
            c1,
            c4,
            xmdot,
            omgdot,
            xnodot,
            xnodcf: 3.5 * betao2 * xhdot1 * c1,
            t2cof: 1.5 * c1,
            xlcof: 0.125 * a3ovk2 * sinio * (3.0 + 5.0 * cosio) / one_plus_cosio,
            aycof: 0.25 * a3ovk2 * sinio,
        }
    }
}

/// Mean elements after secular (and, for deep space, lunar-solar) updates.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MeanState {
    /// Semi-major axis, Earth radii.
    pub a: f64,
    pub e: f64,
    /// Argument of perigee used for the long-period terms.
    pub omega: f64,
    /// Mean longitude.
    pub xl: f64,
    pub xnode: f64,
    pub xinc: f64,
    /// Mean motion, rad/min.
    pub xn: f64,
    /// Argument of perigee used for the phase angle.
    pub omgadf: f64,
}

/// Osculating quantities ready for conversion to ECI.
#[derive(Debug, Clone, Copy)]
pub(crate) struct OrbitalState {
    pub rk: f64,
    pub uk: f64,
    pub xnodek: f64,
    pub xinck: f64,
    pub rdotk: f64,
    pub rfdotk: f64,
    pub phase: f64,
}

impl OrbitalState {
    /// ECI position (km) and velocity (km/s).
    pub fn to_state_vector(&self) -> StateVector {
        let (sinuk, cosuk) = self.uk.sin_cos();
        let (sinik, cosik) = self.xinck.sin_cos();
        let (sinnok, cosnok) = self.xnodek.sin_cos();
        let xmx = -sinnok * cosik;
        let xmy = cosnok * cosik;
        let u = Vector3::new(
            xmx * sinuk + cosnok * cosuk,
            xmy * sinuk + sinnok * cosuk,
            sinik * sinuk,
        );
        let v = Vector3::new(
            xmx * cosuk - cosnok * sinuk,
            xmy * cosuk - sinnok * sinuk,
            sinik * cosuk,
        );

        StateVector {
            position: u * (self.rk * XKMPER),
            velocity: (u * self.rdotk + v * self.rfdotk) * (XKMPER / 60.0),
        }
    }
}

/// Long-period periodics, Kepler's equation and short-period periodics.
pub(crate) fn osculate(base: &BaseTerms, mean: &MeanState) -> OrbitalState {
    let beta = (1.0 - mean.e * mean.e).sqrt();

    let axn = mean.e * mean.omega.cos();
    let temp = 1.0 / (mean.a * beta * beta);
    let xll = temp * base.xlcof * axn;
    let aynl = temp * base.aycof;
    let xlt = mean.xl + xll;
    let ayn = mean.e * mean.omega.sin() + aynl;

    let capu = fmod2p(xlt - mean.xnode);
    let kepler = solve_kepler(capu, axn, ayn);
    let (sinepw, cosepw) = (kepler.sin_epw, kepler.cos_epw);

    let ecose = axn * cosepw + ayn * sinepw;
    let esine = axn * sinepw - ayn * cosepw;
    let elsq = axn * axn + ayn * ayn;
    let temp = 1.0 - elsq;
    let pl = mean.a * temp;
    let r = mean.a * (1.0 - ecose);
    let temp1 = 1.0 / r;
    let rdot = XKE * mean.a.sqrt() * esine * temp1;
    let rfdot = XKE * pl.sqrt() * temp1;
    let temp2 = mean.a * temp1;
    let betal = temp.sqrt();
    let temp3 = 1.0 / (1.0 + betal);
    let cosu = temp2 * (cosepw - axn + ayn * esine * temp3);
    let sinu = temp2 * (sinepw - ayn - axn * esine * temp3);
    let u = ac_tan(sinu, cosu);
    let sin2u = 2.0 * sinu * cosu;
    let cos2u = 2.0 * cosu * cosu - 1.0;
    let temp = 1.0 / pl;
    let temp1 = CK2 * temp;
    let temp2 = temp1 * temp;

    OrbitalState {
        rk: r * (1.0 - 1.5 * temp2 * betal * base.x3thm1) + 0.5 * temp1 * base.x1mth2 * cos2u,
        uk: u - 0.25 * temp2 * base.x7thm1 * sin2u,
        xnodek: mean.xnode + 1.5 * temp2 * base.cosio * sin2u,
        xinck: mean.xinc + 1.5 * temp2 * base.cosio * base.sinio * cos2u,
        rdotk: rdot - mean.xn * temp1 * base.x1mth2 * sin2u,
        rfdotk: rfdot + mean.xn * temp1 * (base.x1mth2 * cos2u + 1.5 * base.x3thm1),
        phase: fmod2p(xlt - mean.xnode - mean.omgadf + TWO_PI),
    }
}
