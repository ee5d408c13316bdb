//! SGP4: near-Earth orbits with periods under 225 minutes.

use crate::constants::{AE, TOTHRD, XKE, XKMPER};
use crate::elements::OrbitalElements;

use super::common::{osculate, BaseTerms, MeanState, OrbitalState};

/// Perigee height below which the drag model is truncated, km.
const SIMPLE_PERIGEE_KM: f64 = 220.0;
/// Eccentricity below which the c3 and mean-anomaly drag terms are dropped.
const MIN_DRAG_ECCENTRICITY: f64 = 1e-4;

/// Higher-order drag coefficients, only used for perigees above 220 km.
#[derive(Debug, Clone)]
struct FullDrag {
    c5: f64,
    omgcof: f64,
    xmcof: f64,
    delmo: f64,
    sinmo: f64,
    d2: f64,
    d3: f64,
    d4: f64,
    t3cof: f64,
    t4cof: f64,
    t5cof: f64,
}

#[derive(Debug, Clone)]
pub(crate) struct NearEarth {
    base: BaseTerms,
    drag: Option<FullDrag>,
}

impl NearEarth {
    pub fn new(elements: &OrbitalElements) -> Self {
        let base = BaseTerms::new(elements);
        let simple = base.aodp * (1.0 - base.eo) / AE < SIMPLE_PERIGEE_KM / XKMPER + AE;
        let drag = (!simple).then(|| FullDrag::new(&base));
        Self { base, drag }
    }

    /// Truncated drag model for perigees below 220 km.
    pub fn is_simple(&self) -> bool {
        self.drag.is_none()
    }

    pub fn base(&self) -> &BaseTerms {
        &self.base
    }

    pub fn propagate(&self, tsince: f64) -> OrbitalState {
        let b = &self.base;

        // Secular gravity and atmospheric drag.
        let xmdf = b.xmo + b.xmdot * tsince;
        let omgadf = b.omegao + b.omgdot * tsince;
        let xnoddf = b.xnodeo + b.xnodot * tsince;
        let tsq = tsince * tsince;
        let xnode = xnoddf + b.xnodcf * tsq;

        let mut omega = omgadf;
        let mut xmp = xmdf;
        let mut tempa = 1.0 - b.c1 * tsince;
        let mut tempe = b.bstar * b.c4 * tsince;
        let mut templ = b.t2cof * tsq;

        if let Some(d) = &self.drag {
            let delomg = d.omgcof * tsince;
            let delm = d.xmcof * ((1.0 + b.eta * xmdf.cos()).powi(3) - d.delmo);
            let temp = delomg + delm;
            xmp = xmdf + temp;
            omega = omgadf - temp;
            let tcube = tsq * tsince;
            let tfour = tsince * tcube;
            tempa = tempa - d.d2 * tsq - d.d3 * tcube - d.d4 * tfour;
            tempe += b.bstar * d.c5 * (xmp.sin() - d.sinmo);
            templ += d.t3cof * tcube + tfour * (d.t4cof + tsince * d.t5cof);
        }

        let a = b.aodp * tempa * tempa;
        let mean = MeanState {
            a,
            e: b.eo - tempe,
            omega,
            xl: xmp + omega + xnode + b.xnodp * templ,
            xnode,
            xinc: b.xincl,
            xn: XKE / a.powf(1.5),
            omgadf,
        };

        osculate(b, &mean)
    }
}

impl FullDrag {
    fn new(b: &BaseTerms) -> Self {
        let eeta = b.eo * b.eta;
        let (c3, xmcof) = if b.eo > MIN_DRAG_ECCENTRICITY {
            (
                b.coef * b.tsi * b.a3ovk2 * b.xnodp * AE * b.sinio / b.eo,
                -TOTHRD * b.coef * b.bstar * AE / eeta,
            )
        } else {
            (0.0, 0.0)
        };

        let c1sq = b.c1 * b.c1;
        let d2 = 4.0 * b.aodp * b.tsi * c1sq;
        let temp = d2 * b.tsi * b.c1 / 3.0;
        let d3 = (17.0 * b.aodp + b.s4) * temp;
        let d4 = 0.5 * temp * b.aodp * b.tsi * (221.0 * b.aodp + 31.0 * b.s4) * b.c1;

        Self {
            c5: 2.0 * b.coef1 * b.aodp * b.betao2 * (1.0 + 2.75 * (b.eta * b.eta + eeta) + eeta * b.eta * b.eta),
            omgcof: b.bstar * c3 * b.omegao.cos(),
            xmcof,
            delmo: (1.0 + b.eta * b.xmo.cos()).powi(3),
            sinmo: b.xmo.sin(),
            d2,
            d3,
            d4,
            t3cof: d2 + 2.0 * c1sq,
            t4cof: 0.25 * (3.0 * d3 + b.c1 * (12.0 * d2 + 10.0 * c1sq)),
            t5cof: 0.2 * (3.0 * d4 + 12.0 * b.c1 * d3 + 6.0 * d2 * d2 + 15.0 * c1sq * (2.0 * d2 + c1sq)),
        }
    }
}
