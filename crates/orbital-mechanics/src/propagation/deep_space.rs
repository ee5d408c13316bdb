//! SDP4: lunar-solar perturbations and geopotential resonance for orbits
//! with periods of 225 minutes or more.

use std::f64::consts::PI;
use std::sync::Mutex;

use crate::constants::{
    C1L, C1SS, FASX2, FASX4, FASX6, G22, G32, G44, G52, G54, PERIODICS_REFRESH_MIN, Q22, Q31,
    Q33, ROOT22, ROOT32, ROOT44, ROOT52, ROOT54, STEP, STEP2, THDT, TOTHRD, TWO_PI, XKE, ZCOSGS,
    ZCOSIS, ZEL, ZES, ZNL, ZNS, ZSINGS, ZSINIS,
};
use crate::elements::OrbitalElements;
use crate::math::{ac_tan, fmod2p};
use crate::time::{ds50, theta_g_ds50};

use super::common::{osculate, BaseTerms, MeanState, OrbitalState};
use super::ResonanceClass;

/// Inclination below which the solar/lunar `sh` term is dropped (3°).
const SH_CUTOFF_INCLINATION: f64 = 5.235_987_7e-2;
/// Inclination below which the Lyddane form of the periodics is applied.
const LYDDANE_INCLINATION: f64 = 0.2;
/// Days between 1900-01-00.5 and 1950-01-00.0.
const DAYS_1900_TO_1950: f64 = 18_261.5;

/// Amplitudes of one body's long-period periodic terms.
#[derive(Debug, Clone, Copy, Default)]
struct BodyPeriodics {
    /// Mean anomaly of the body at epoch.
    zmo: f64,
    zn: f64,
    ze: f64,
    e2: f64,
    e3: f64,
    i2: f64,
    i3: f64,
    l2: f64,
    l3: f64,
    l4: f64,
    gh2: f64,
    gh3: f64,
    gh4: f64,
    h2: f64,
    h3: f64,
}

/// One body's contribution at time `t`.
#[derive(Debug, Clone, Copy, Default)]
struct PeriodicTerms {
    e: f64,
    i: f64,
    l: f64,
    gh: f64,
    h: f64,
}

impl BodyPeriodics {
    fn evaluate(&self, t: f64) -> PeriodicTerms {
        let zm = self.zmo + self.zn * t;
        let zf = zm + 2.0 * self.ze * zm.sin();
        let sinzf = zf.sin();
        let f2 = 0.5 * sinzf * sinzf - 0.25;
        let f3 = -0.5 * sinzf * zf.cos();
        PeriodicTerms {
            e: self.e2 * f2 + self.e3 * f3,
            i: self.i2 * f2 + self.i3 * f3,
            l: self.l2 * f2 + self.l3 * f3 + self.l4 * sinzf,
            gh: self.gh2 * f2 + self.gh3 * f3 + self.gh4 * sinzf,
            h: self.h2 * f2 + self.h3 * f3,
        }
    }
}

/// Orientation of a perturbing body's orbit and its model constants.
struct Body {
    zcosg: f64,
    zsing: f64,
    zcosi: f64,
    zsini: f64,
    zcosh: f64,
    zsinh: f64,
    cc: f64,
    zn: f64,
    ze: f64,
    zmo: f64,
}

/// Secular rates contributed by one body.
#[derive(Debug, Clone, Copy)]
struct SecularTerms {
    se: f64,
    si: f64,
    sl: f64,
    sgh: f64,
    sh: f64,
}

#[derive(Debug, Clone)]
enum ResonanceKind {
    /// 24 h, geosynchronous.
    Synchronous { del1: f64, del2: f64, del3: f64 },
    /// 12 h, Molniya-type.
    HalfDay {
        d2201: f64,
        d2211: f64,
        d3210: f64,
        d3222: f64,
        d4410: f64,
        d4422: f64,
        d5220: f64,
        d5232: f64,
        d5421: f64,
        d5433: f64,
    },
}

#[derive(Debug, Clone)]
struct Resonance {
    kind: ResonanceKind,
    xlamo: f64,
    xfact: f64,
}

/// Rates driving the resonance integrator at one state.
#[derive(Debug, Clone, Copy)]
struct Derivatives {
    xndot: f64,
    xnddt: f64,
    xldot: f64,
}

/// Resonance integrator state. Persists between calls so consecutive
/// queries on the same side of epoch only integrate the difference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Integrator {
    pub atime: f64,
    pub xli: f64,
    pub xni: f64,
}

/// Integrated mean motion and mean longitude at `t`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct IntegratorOutput {
    pub xn: f64,
    pub xl: f64,
    pub steps: usize,
}

/// Lunar-solar periodic corrections, reused while `t` stays within
/// [`PERIODICS_REFRESH_MIN`] of `savtsn`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PeriodicCache {
    pub savtsn: f64,
    pub pe: f64,
    pub pinc: f64,
    pub pl: f64,
    pub pgh: f64,
    pub ph: f64,
}

impl Default for PeriodicCache {
    fn default() -> Self {
        Self {
            savtsn: 1e20,
            pe: 0.0,
            pinc: 0.0,
            pl: 0.0,
            pgh: 0.0,
            ph: 0.0,
        }
    }
}

#[derive(Debug)]
struct DeepState {
    integrator: Integrator,
    periodics: PeriodicCache,
}

/// Mean elements between the secular and periodic deep-space updates.
#[derive(Debug, Clone, Copy)]
struct DeepMean {
    xll: f64,
    omgadf: f64,
    xnode: f64,
    em: f64,
    xinc: f64,
    xn: f64,
}

#[derive(Debug)]
pub(crate) struct DeepSpace {
    base: BaseTerms,
    thgr: f64,
    xnq: f64,
    xqncl: f64,
    sse: f64,
    ssi: f64,
    ssl: f64,
    ssg: f64,
    ssh: f64,
    solar: BodyPeriodics,
    lunar: BodyPeriodics,
    resonance: Option<Resonance>,
    state: Mutex<DeepState>,
}

impl DeepSpace {
    pub fn new(elements: &OrbitalElements) -> Self {
        let base = BaseTerms::new(elements);
        let days50 = ds50(elements.jd_epoch());
        let thgr = theta_g_ds50(days50);
        let xnq = base.xnodp;
        let xqncl = base.xincl;
        let (sinq, cosq) = base.xnodeo.sin_cos();

        // Lunar orbit orientation at epoch.
        let day = days50 + DAYS_1900_TO_1950;
        let xnodce = 4.523_602_0 - 9.242_202_9e-4 * day;
        let (stem, ctem) = xnodce.sin_cos();
        let zcosil = 0.913_751_64 - 0.035_680_96 * ctem;
        let zsinil = (1.0 - zcosil * zcosil).sqrt();
        let zsinhl = 0.089_683_511 * stem / zsinil;
        let zcoshl = (1.0 - zsinhl * zsinhl).sqrt();
        let c = 4.719_967_2 + 0.229_971_50 * day;
        let gam = 5.835_151_4 + 0.001_944_368_0 * day;
        let zmol = fmod2p(c - gam);
        let zx = 0.397_854_16 * stem / zsinil;
        let zy = zcoshl * ctem + 0.917_448_67 * zsinhl * stem;
        let zx = gam + ac_tan(zx, zy) - xnodce;
        let (zsingl, zcosgl) = zx.sin_cos();
        let zmos = fmod2p(6.256_583_7 + 0.017_201_977 * day);

        let sun = Body {
            zcosg: ZCOSGS,
            zsing: ZSINGS,
            zcosi: ZCOSIS,
            zsini: ZSINIS,
            zcosh: cosq,
            zsinh: sinq,
            cc: C1SS,
            zn: ZNS,
            ze: ZES,
            zmo: zmos,
        };
        let moon = Body {
            zcosg: zcosgl,
            zsing: zsingl,
            zcosi: zcosil,
            zsini: zsinil,
            zcosh: zcoshl * cosq + zsinhl * sinq,
            zsinh: sinq * zcoshl - cosq * zsinhl,
            cc: C1L,
            zn: ZNL,
            ze: ZEL,
            zmo: zmol,
        };

        let (solar_sec, solar) = body_terms(&base, xqncl, xnq, &sun);
        let (lunar_sec, lunar) = body_terms(&base, xqncl, xnq, &moon);

        let over_sinio = |x: f64| if base.sinio.abs() > f64::EPSILON { x / base.sinio } else { 0.0 };
        let sse = solar_sec.se + lunar_sec.se;
        let ssi = solar_sec.si + lunar_sec.si;
        let ssl = solar_sec.sl + lunar_sec.sl;
        let ssh = over_sinio(solar_sec.sh) + over_sinio(lunar_sec.sh);
        let ssg = solar_sec.sgh - base.cosio * over_sinio(solar_sec.sh) + lunar_sec.sgh
            - base.cosio * over_sinio(lunar_sec.sh);

        let mut deep = Self {
            base,
            thgr,
            xnq,
            xqncl,
            sse,
            ssi,
            ssl,
            ssg,
            ssh,
            solar,
            lunar,
            resonance: None,
            state: Mutex::new(DeepState {
                integrator: Integrator {
                    atime: 0.0,
                    xli: 0.0,
                    xni: xnq,
                },
                periodics: PeriodicCache::default(),
            }),
        };
        deep.resonance = deep.init_resonance();
        if let Some(res) = &deep.resonance {
            let state = deep.state.get_mut().unwrap_or_else(|e| e.into_inner());
            state.integrator.xli = res.xlamo;
        }
        deep
    }

    pub fn base(&self) -> &BaseTerms {
        &self.base
    }

    pub fn resonance_class(&self) -> Option<ResonanceClass> {
        self.resonance.as_ref().map(|res| match res.kind {
            ResonanceKind::Synchronous { .. } => ResonanceClass::Synchronous,
            ResonanceKind::HalfDay { .. } => ResonanceClass::HalfDay,
        })
    }

    pub fn is_lyddane(&self) -> bool {
        self.xqncl < LYDDANE_INCLINATION
    }

    fn init_resonance(&self) -> Option<Resonance> {
        let b = &self.base;
        let xnq = self.xnq;
        let eq = b.eo;
        let aqnv = 1.0 / b.aodp;

        if xnq > 0.003_490_658_5 && xnq < 0.005_235_987_7 {
            let g200 = 1.0 + b.eosq * (-2.5 + 0.8125 * b.eosq);
            let g310 = 1.0 + 2.0 * b.eosq;
            let g300 = 1.0 + b.eosq * (-6.0 + 6.609_37 * b.eosq);
            let f220 = 0.75 * (1.0 + b.cosio) * (1.0 + b.cosio);
            let f311 = 0.9375 * b.sinio * b.sinio * (1.0 + 3.0 * b.cosio) - 0.75 * (1.0 + b.cosio);
            let f330 = 1.875 * (1.0 + b.cosio).powi(3);
            let del1 = 3.0 * xnq * xnq * aqnv * aqnv;
            let kind = ResonanceKind::Synchronous {
                del1: del1 * f311 * g310 * Q31 * aqnv,
                del2: 2.0 * del1 * f220 * g200 * Q22,
                del3: 3.0 * del1 * f330 * g300 * Q33 * aqnv,
            };
            let xpidot = b.omgdot + b.xnodot;
            let bfact = b.xmdot + xpidot - THDT + self.ssl + self.ssg + self.ssh;
            return Some(Resonance {
                kind,
                xlamo: b.xmo + b.xnodeo + b.omegao - self.thgr,
                xfact: bfact - xnq,
            });
        }

        if !(0.008_26..=0.009_24).contains(&xnq) || eq < 0.5 {
            return None;
        }

        let eosq = b.eosq;
        let eoc = eq * eosq;
        let g201 = -0.306 - (eq - 0.64) * 0.440;
        let (g211, g310, g322, g410, g422, g520);
        if eq <= 0.65 {
            g211 = 3.616 - 13.247 * eq + 16.290 * eosq;
            g310 = -19.302 + 117.390 * eq - 228.419 * eosq + 156.591 * eoc;
            g322 = -18.9068 + 109.7927 * eq - 214.6334 * eosq + 146.5816 * eoc;
            g410 = -41.122 + 242.694 * eq - 471.094 * eosq + 313.953 * eoc;
            g422 = -146.407 + 841.880 * eq - 1629.014 * eosq + 1083.435 * eoc;
            g520 = -532.114 + 3017.977 * eq - 5740.0 * eosq + 3708.276 * eoc;
        } else {
            g211 = -72.099 + 331.819 * eq - 508.738 * eosq + 266.724 * eoc;
            g310 = -346.844 + 1582.851 * eq - 2415.925 * eosq + 1246.113 * eoc;
            g322 = -342.585 + 1554.908 * eq - 2366.899 * eosq + 1215.972 * eoc;
            g410 = -1052.797 + 4758.686 * eq - 7193.992 * eosq + 3651.957 * eoc;
            g422 = -3581.69 + 16178.11 * eq - 24462.77 * eosq + 12422.52 * eoc;
            g520 = if eq <= 0.715 {
                1464.74 - 4664.75 * eq + 3763.64 * eosq
            } else {
                -5149.66 + 29936.92 * eq - 54087.36 * eosq + 31324.56 * eoc
            };
        }
        let (g533, g521, g532) = if eq < 0.7 {
            (
                -919.2277 + 4988.61 * eq - 9064.77 * eosq + 5542.21 * eoc,
                -822.71072 + 4568.6173 * eq - 8491.4146 * eosq + 5337.524 * eoc,
                -853.666 + 4690.25 * eq - 8624.77 * eosq + 5341.4 * eoc,
            )
        } else {
            (
                -37995.78 + 161616.52 * eq - 229838.2 * eosq + 109377.94 * eoc,
                -51752.104 + 218913.95 * eq - 309468.16 * eosq + 146349.42 * eoc,
                -40023.88 + 170470.89 * eq - 242699.48 * eosq + 115605.82 * eoc,
            )
        };

        let (sinio, cosio, theta2) = (b.sinio, b.cosio, b.theta2);
        let sini2 = sinio * sinio;
        let f220 = 0.75 * (1.0 + 2.0 * cosio + theta2);
        let f221 = 1.5 * sini2;
        let f321 = 1.875 * sinio * (1.0 - 2.0 * cosio - 3.0 * theta2);
        let f322 = -1.875 * sinio * (1.0 + 2.0 * cosio - 3.0 * theta2);
        let f441 = 35.0 * sini2 * f220;
        let f442 = 39.3750 * sini2 * sini2;
        let f522 = 9.84375
            * sinio
            * (sini2 * (1.0 - 2.0 * cosio - 5.0 * theta2)
                + 0.333_333_33 * (-2.0 + 4.0 * cosio + 6.0 * theta2));
        let f523 = sinio
            * (4.921_875_12 * sini2 * (-2.0 - 4.0 * cosio + 10.0 * theta2)
                + 6.562_500_12 * (1.0 + 2.0 * cosio - 3.0 * theta2));
        let f542 = 29.53125 * sinio * (2.0 - 8.0 * cosio + theta2 * (-12.0 + 8.0 * cosio + 10.0 * theta2));
        let f543 = 29.53125 * sinio * (-2.0 - 8.0 * cosio + theta2 * (12.0 + 8.0 * cosio - 10.0 * theta2));

        let xno2 = xnq * xnq;
        let ainv2 = aqnv * aqnv;
        let mut temp1 = 3.0 * xno2 * ainv2;
        let mut temp = temp1 * ROOT22;
        let d2201 = temp * f220 * g201;
        let d2211 = temp * f221 * g211;
        temp1 *= aqnv;
        temp = temp1 * ROOT32;
        let d3210 = temp * f321 * g310;
        let d3222 = temp * f322 * g322;
        temp1 *= aqnv;
        temp = 2.0 * temp1 * ROOT44;
        let d4410 = temp * f441 * g410;
        let d4422 = temp * f442 * g422;
        temp1 *= aqnv;
        temp = temp1 * ROOT52;
        let d5220 = temp * f522 * g520;
        let d5232 = temp * f523 * g532;
        temp = 2.0 * temp1 * ROOT54;
        let d5421 = temp * f542 * g521;
        let d5433 = temp * f543 * g533;

        let bfact = b.xmdot + 2.0 * b.xnodot - 2.0 * THDT + self.ssl + 2.0 * self.ssh;
        Some(Resonance {
            kind: ResonanceKind::HalfDay {
                d2201,
                d2211,
                d3210,
                d3222,
                d4410,
                d4422,
                d5220,
                d5232,
                d5421,
                d5433,
            },
            xlamo: b.xmo + 2.0 * b.xnodeo - 2.0 * self.thgr,
            xfact: bfact - xnq,
        })
    }

    pub fn propagate(&self, tsince: f64) -> OrbitalState {
        let b = &self.base;
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        let xmdf = b.xmo + b.xmdot * tsince;
        let omgadf = b.omegao + b.omgdot * tsince;
        let xnoddf = b.xnodeo + b.xnodot * tsince;
        let tsq = tsince * tsince;
        let xnode = xnoddf + b.xnodcf * tsq;
        let tempa = 1.0 - b.c1 * tsince;
        let tempe = b.bstar * b.c4 * tsince;
        let templ = b.t2cof * tsq;

        let mut mean = self.secular(
            &mut state.integrator,
            tsince,
            DeepMean {
                xll: xmdf,
                omgadf,
                xnode,
                em: b.eo,
                xinc: b.xincl,
                xn: b.xnodp,
            },
        );

        let a = (XKE / mean.xn).powf(TOTHRD) * tempa * tempa;
        mean.em -= tempe;
        mean.xll += b.xnodp * templ;

        let mean = self.periodics(&mut state.periodics, tsince, mean);
        drop(state);

        osculate(
            b,
            &MeanState {
                a,
                e: mean.em,
                omega: mean.omgadf,
                xl: mean.xll + mean.omgadf + mean.xnode,
                xnode: mean.xnode,
                xinc: mean.xinc,
                xn: XKE / a.powf(1.5),
                omgadf: mean.omgadf,
            },
        )
    }

    /// Lunar-solar secular rates and resonance integration.
    fn secular(&self, integrator: &mut Integrator, t: f64, mut m: DeepMean) -> DeepMean {
        m.xll += self.ssl * t;
        m.omgadf += self.ssg * t;
        m.xnode += self.ssh * t;
        m.em = self.base.eo + self.sse * t;
        m.xinc = self.base.xincl + self.ssi * t;
        if m.xinc < 0.0 {
            m.xinc = -m.xinc;
            m.xnode += PI;
            m.omgadf -= PI;
        }

        let Some(res) = &self.resonance else {
            return m;
        };

        let out = self.integrate(res, integrator, t);
        tracing::trace!(t, steps = out.steps, atime = integrator.atime, "resonance integration");
        m.xn = out.xn;
        let temp = -m.xnode + self.thgr + t * THDT;
        m.xll = match res.kind {
            ResonanceKind::Synchronous { .. } => out.xl - m.omgadf + temp,
            ResonanceKind::HalfDay { .. } => out.xl + temp + temp,
        };
        m
    }

    fn derivatives(&self, res: &Resonance, s: &Integrator) -> Derivatives {
        let xli = s.xli;
        let (xndot, xnddt) = match res.kind {
            ResonanceKind::Synchronous { del1, del2, del3 } => (
                del1 * (xli - FASX2).sin()
                    + del2 * (2.0 * (xli - FASX4)).sin()
                    + del3 * (3.0 * (xli - FASX6)).sin(),
                del1 * (xli - FASX2).cos()
                    + 2.0 * del2 * (2.0 * (xli - FASX4)).cos()
                    + 3.0 * del3 * (3.0 * (xli - FASX6)).cos(),
            ),
            ResonanceKind::HalfDay {
                d2201,
                d2211,
                d3210,
                d3222,
                d4410,
                d4422,
                d5220,
                d5232,
                d5421,
                d5433,
            } => {
                let xomi = self.base.omegao + self.base.omgdot * s.atime;
                let x2omi = xomi + xomi;
                let x2li = xli + xli;
                let xndot = d2201 * (x2omi + xli - G22).sin()
                    + d2211 * (xli - G22).sin()
                    + d3210 * (xomi + xli - G32).sin()
                    + d3222 * (-xomi + xli - G32).sin()
                    + d4410 * (x2omi + x2li - G44).sin()
                    + d4422 * (x2li - G44).sin()
                    + d5220 * (xomi + xli - G52).sin()
                    + d5232 * (-xomi + xli - G52).sin()
                    + d5421 * (xomi + x2li - G54).sin()
                    + d5433 * (-xomi + x2li - G54).sin();
                let xnddt = d2201 * (x2omi + xli - G22).cos()
                    + d2211 * (xli - G22).cos()
                    + d3210 * (xomi + xli - G32).cos()
                    + d3222 * (-xomi + xli - G32).cos()
                    + d5220 * (xomi + xli - G52).cos()
                    + d5232 * (-xomi + xli - G52).cos()
                    + 2.0
                        * (d4410 * (x2omi + x2li - G44).cos()
                            + d4422 * (x2li - G44).cos()
                            + d5421 * (xomi + x2li - G54).cos()
                            + d5433 * (-xomi + x2li - G54).cos());
                (xndot, xnddt)
            }
        };
        let xldot = s.xni + res.xfact;
        Derivatives {
            xndot,
            xnddt: xnddt * xldot,
            xldot,
        }
    }

    fn step(&self, res: &Resonance, s: &mut Integrator, delt: f64) {
        let d = self.derivatives(res, s);
        s.xli += d.xldot * delt + d.xndot * STEP2;
        s.xni += d.xndot * delt + d.xnddt * STEP2;
        s.atime += delt;
    }

    /// Integrate the resonance equations from the stored state to `t`.
    ///
    /// Restarts from epoch unless `t` lies beyond the stored time on the
    /// same side of epoch, so the result depends only on `t`. Then takes
    /// whole steps toward `t` and finishes with a Taylor term.
    fn integrate(&self, res: &Resonance, s: &mut Integrator, t: f64) -> IntegratorOutput {
        let opposite_side = (t >= 0.0 && s.atime < 0.0) || (t < 0.0 && s.atime >= 0.0);
        if s.atime == 0.0 || opposite_side || t.abs() < s.atime.abs() {
            *s = Integrator {
                atime: 0.0,
                xli: res.xlamo,
                xni: self.xnq,
            };
        }

        let mut steps = 0;
        while (t - s.atime).abs() >= STEP {
            let delt = if t > 0.0 { STEP } else { -STEP };
            self.step(res, s, delt);
            steps += 1;
        }

        let ft = t - s.atime;
        let d = self.derivatives(res, s);
        IntegratorOutput {
            xn: s.xni + d.xndot * ft + d.xnddt * ft * ft * 0.5,
            xl: s.xli + d.xldot * ft + d.xndot * ft * ft * 0.5,
            steps,
        }
    }

    /// Lunar-solar periodics, applied directly or in Lyddane form for
    /// near-equatorial orbits.
    fn periodics(&self, cache: &mut PeriodicCache, t: f64, mut m: DeepMean) -> DeepMean {
        let b = &self.base;
        let (sinis, cosis) = m.xinc.sin_cos();

        if (cache.savtsn - t).abs() >= PERIODICS_REFRESH_MIN {
            let sun = self.solar.evaluate(t);
            let moon = self.lunar.evaluate(t);
            *cache = PeriodicCache {
                savtsn: t,
                pe: sun.e + moon.e,
                pinc: sun.i + moon.i,
                pl: sun.l + moon.l,
                pgh: sun.gh + moon.gh,
                ph: sun.h + moon.h,
            };
        }

        m.xinc += cache.pinc;
        m.em += cache.pe;

        if !self.is_lyddane() {
            let ph = cache.ph / b.sinio;
            let pgh = cache.pgh - b.cosio * ph;
            m.omgadf += pgh;
            m.xnode += ph;
            m.xll += cache.pl;
            return m;
        }

        let (sinok, cosok) = m.xnode.sin_cos();
        let alfdp = sinis * sinok + cache.ph * cosok + cache.pinc * cosis * sinok;
        let betdp = sinis * cosok - cache.ph * sinok + cache.pinc * cosis * cosok;
        m.xnode = fmod2p(m.xnode);
        let xls = m.xll + m.omgadf + cosis * m.xnode + cache.pl + cache.pgh
            - cache.pinc * m.xnode * sinis;
        let xnoh = m.xnode;
        m.xnode = ac_tan(alfdp, betdp);

        // keep the node on the same branch as before the correction
        if (xnoh - m.xnode).abs() > PI {
            if m.xnode < xnoh {
                m.xnode += TWO_PI;
            } else {
                m.xnode -= TWO_PI;
            }
        }

        m.xll += cache.pl;
        m.omgadf = xls - m.xll - m.xinc.cos() * m.xnode;
        m
    }

    #[cfg(test)]
    fn snapshot(&self) -> (Integrator, PeriodicCache) {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        (state.integrator, state.periodics)
    }
}

/// Secular rates and periodic amplitudes contributed by one body.
fn body_terms(b: &BaseTerms, xqncl: f64, xnq: f64, body: &Body) -> (SecularTerms, BodyPeriodics) {
    let (sing, cosg) = b.omegao.sin_cos();
    let eq = b.eo;
    let eosq = b.eosq;
    let xnoi = 1.0 / xnq;

    let a1 = body.zcosg * body.zcosh + body.zsing * body.zcosi * body.zsinh;
    let a3 = -body.zsing * body.zcosh + body.zcosg * body.zcosi * body.zsinh;
    let a7 = -body.zcosg * body.zsinh + body.zsing * body.zcosi * body.zcosh;
    let a8 = body.zsing * body.zsini;
    let a9 = body.zsing * body.zsinh + body.zcosg * body.zcosi * body.zcosh;
    let a10 = body.zcosg * body.zsini;
    let a2 = b.cosio * a7 + b.sinio * a8;
    let a4 = b.cosio * a9 + b.sinio * a10;
    let a5 = -b.sinio * a7 + b.cosio * a8;
    let a6 = -b.sinio * a9 + b.cosio * a10;
    let x1 = a1 * cosg + a2 * sing;
    let x2 = a3 * cosg + a4 * sing;
    let x3 = -a1 * sing + a2 * cosg;
    let x4 = -a3 * sing + a4 * cosg;
    let x5 = a5 * sing;
    let x6 = a6 * sing;
    let x7 = a5 * cosg;
    let x8 = a6 * cosg;
    let z31 = 12.0 * x1 * x1 - 3.0 * x3 * x3;
    let z32 = 24.0 * x1 * x2 - 6.0 * x3 * x4;
    let z33 = 12.0 * x2 * x2 - 3.0 * x4 * x4;
    let z1 = 3.0 * (a1 * a1 + a2 * a2) + z31 * eosq;
    let z2 = 6.0 * (a1 * a3 + a2 * a4) + z32 * eosq;
    let z3 = 3.0 * (a3 * a3 + a4 * a4) + z33 * eosq;
    let z11 = -6.0 * a1 * a5 + eosq * (-24.0 * x1 * x7 - 6.0 * x3 * x5);
    let z12 = -6.0 * (a1 * a6 + a3 * a5) + eosq * (-24.0 * (x2 * x7 + x1 * x8) - 6.0 * (x3 * x6 + x4 * x5));
    let z13 = -6.0 * a3 * a6 + eosq * (-24.0 * x2 * x8 - 6.0 * x4 * x6);
    let z21 = 6.0 * a2 * a5 + eosq * (24.0 * x1 * x5 - 6.0 * x3 * x7);
    let z22 = 6.0 * (a4 * a5 + a2 * a6) + eosq * (24.0 * (x2 * x5 + x1 * x6) - 6.0 * (x4 * x7 + x3 * x8));
    let z23 = 6.0 * a4 * a6 + eosq * (24.0 * x2 * x6 - 6.0 * x4 * x8);
    let z1 = z1 + z1 + b.betao2 * z31;
    let z2 = z2 + z2 + b.betao2 * z32;
    let z3 = z3 + z3 + b.betao2 * z33;
    let s3 = body.cc * xnoi;
    let s2 = -0.5 * s3 / b.betao;
    let s4 = s3 * b.betao;
    let s1 = -15.0 * eq * s4;
    let s5 = x1 * x3 + x2 * x4;
    let s6 = x2 * x3 + x1 * x4;
    let s7 = x2 * x4 - x1 * x3;
    let zn = body.zn;
    let ze = body.ze;

    let sh = if xqncl < SH_CUTOFF_INCLINATION {
        0.0
    } else {
        -zn * s2 * (z21 + z23)
    };

    let secular = SecularTerms {
        se: s1 * zn * s5,
        si: s2 * zn * (z11 + z13),
        sl: -zn * s3 * (z1 + z3 - 14.0 - 6.0 * eosq),
        sgh: s4 * zn * (z31 + z33 - 6.0),
        sh,
    };
    let periodics = BodyPeriodics {
        zmo: body.zmo,
        zn,
        ze,
        e2: 2.0 * s1 * s6,
        e3: 2.0 * s1 * s7,
        i2: 2.0 * s2 * z12,
        i3: 2.0 * s2 * (z13 - z11),
        l2: -2.0 * s3 * z2,
        l3: -2.0 * s3 * (z3 - z1),
        l4: -2.0 * s3 * (-21.0 - 9.0 * eosq) * ze,
        gh2: 2.0 * s4 * z32,
        gh3: 2.0 * s4 * (z33 - z31),
        gh4: -18.0 * s4 * ze,
        h2: -2.0 * s2 * z22,
        h3: -2.0 * s2 * (z23 - z21),
    };
    (secular, periodics)
}
