//! Rise/set search for one satellite over one station.
//!
//! Near-earth objects are stepped along the time axis: coarse steps until
//! the elevation sign changes, a 3 s grid to bracket the crossing, then
//! (optionally) bisection down to 10 ms. Deep-space objects move too slowly
//! for that to be useful and get a single synthetic window centred on the
//! reference time.

use orbital_mechanics::constants::{DEG2RAD, EARTH_RADIUS_KM, MINUTES_PER_DAY};
use orbital_mechanics::{GeoPos, OrbitalElements, PositionSample, Satellite};
use tracing::{debug, trace};

use crate::pass::Pass;

const EXIT_STEP_MS: i64 = 30_000;
const RISE_STEP_MS: i64 = 60_000;
const SET_STEP_MS: i64 = 30_000;
const FINE_STEP_MS: i64 = 3_000;
const CROSSING_TOLERANCE_MS: i64 = 10;
const TCA_WINDOW_MS: i64 = 30_000;
const DEEP_SPACE_HALF_WINDOW_MS: i64 = 86_400_000;

/// Quick geometric test: can the ground track ever bring the satellite
/// above this station's horizon?
///
/// Compares the station latitude with the orbit's highest ground-track
/// latitude widened by the footprint half-angle at apogee.
pub fn will_be_seen(elements: &OrbitalElements, station: &GeoPos) -> bool {
    let mean_motion = elements.mean_motion();
    if mean_motion < 1e-8 {
        return false;
    }
    let mut inclination = elements.inclination();
    if inclination >= 90.0 {
        inclination = 180.0 - inclination;
    }
    let sma = 331.25 * (MINUTES_PER_DAY / mean_motion).powf(2.0 / 3.0);
    let apogee = sma * (1.0 + elements.eccentricity()) - EARTH_RADIUS_KM;
    let reach = (EARTH_RADIUS_KM / (apogee + EARTH_RADIUS_KM)).acos() + inclination * DEG2RAD;
    reach > station.latitude_rad().abs()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SearchState {
    /// Geometry rules out any pass.
    NotVisible,
    SearchingAos,
    /// Between AOS and LOS; carries the highest elevation seen so far, degrees.
    InPass { max_elevation: f64 },
    Done,
}

/// Lazily yields passes in AOS order while AOS stays before `end_millis`.
pub struct PassIter<'a> {
    satellite: &'a Satellite,
    station: GeoPos,
    next_start: i64,
    end_millis: i64,
    refine: bool,
    rewind: bool,
    state: SearchState,
}

impl<'a> PassIter<'a> {
    pub fn new(
        satellite: &'a Satellite,
        station: &GeoPos,
        start_millis: i64,
        end_millis: i64,
        refine: bool,
    ) -> Self {
        let state = if will_be_seen(satellite.elements(), station) {
            SearchState::SearchingAos
        } else {
            debug!(
                norad_id = satellite.catalog_number(),
                latitude = station.latitude,
                "satellite never rises at this latitude"
            );
            SearchState::NotVisible
        };
        Self {
            satellite,
            station: *station,
            next_start: start_millis,
            end_millis,
            refine,
            rewind: true,
            state,
        }
    }

    pub fn state(&self) -> SearchState {
        self.state
    }

    fn sample(&self, time_millis: i64) -> PositionSample {
        self.satellite.position(&self.station, time_millis)
    }

    /// Whole minutes, matching the grid the search steps on.
    fn quarter_orbit_millis(&self) -> i64 {
        (self.satellite.elements().period_min() / 4.0).floor() as i64 * 60_000
    }

    fn build_pass(&self, aos: &PositionSample, los: &PositionSample, tca: &PositionSample) -> Pass {
        Pass {
            catalog_number: self.satellite.catalog_number(),
            name: self.satellite.name().to_string(),
            is_deep_space: self.satellite.elements().is_deep_space(),
            aos_time: aos.time_millis,
            aos_azimuth: aos.azimuth_deg(),
            los_time: los.time_millis,
            los_azimuth: los.azimuth_deg(),
            tca_time: tca.time_millis,
            tca_azimuth: tca.azimuth_deg(),
            max_elevation: tca.elevation_deg(),
            altitude: tca.altitude,
        }
    }

    fn deep_space_pass(&self) -> Pass {
        let now = self.sample(self.next_start);
        let mut pass = self.build_pass(&now, &now, &now);
        pass.aos_time = self.next_start - DEEP_SPACE_HALF_WINDOW_MS;
        pass.los_time = self.next_start + DEEP_SPACE_HALF_WINDOW_MS;
        pass
    }

    /// Narrow `[lo, hi]` to the first time on the far side of the horizon.
    /// `lo` is on the near side, `hi_sample` on the far side.
    fn bisect(&self, mut lo: i64, mut hi_sample: PositionSample, rising: bool) -> PositionSample {
        while hi_sample.time_millis - lo > CROSSING_TOLERANCE_MS {
            let mid = lo + (hi_sample.time_millis - lo) / 2;
            let s = self.sample(mid);
            let crossed = if rising {
                s.elevation >= 0.0
            } else {
                s.elevation <= 0.0
            };
            if crossed {
                hi_sample = s;
            } else {
                lo = mid;
            }
        }
        hi_sample
    }

    /// Ternary search for peak elevation around the best grid sample.
    fn refine_tca(&self, best: PositionSample, aos: i64, los: i64) -> PositionSample {
        let mut lo = (best.time_millis - TCA_WINDOW_MS).max(aos);
        let mut hi = (best.time_millis + TCA_WINDOW_MS).min(los);
        while hi - lo > CROSSING_TOLERANCE_MS {
            let third = (hi - lo) / 3;
            let (m1, m2) = (lo + third, hi - third);
            if self.sample(m1).elevation < self.sample(m2).elevation {
                lo = m1;
            } else {
                hi = m2;
            }
        }
        let peak = self.sample(lo + (hi - lo) / 2);
        if peak.elevation > best.elevation {
            peak
        } else {
            best
        }
    }

    fn track_peak(&mut self, sample: &PositionSample, best: &mut PositionSample) {
        if sample.elevation > best.elevation {
            *best = *sample;
            self.state = SearchState::InPass {
                max_elevation: sample.elevation_deg(),
            };
        }
    }

    /// First 30 s step at or after `t` with the satellite below the horizon.
    fn wait_for_set(&self, mut t: i64, period: i64) -> Option<i64> {
        let limit = t + period;
        while self.sample(t).elevation >= 0.0 {
            if t >= limit {
                debug!(norad_id = self.satellite.catalog_number(), "satellite never sets");
                return None;
            }
            t += EXIT_STEP_MS;
        }
        Some(t)
    }

    fn leo_pass(&mut self) -> Option<Pass> {
        let quarter = self.quarter_orbit_millis();
        let period = (self.satellite.elements().period_min() * 60_000.0).ceil() as i64;
        let mut t = self.next_start;
        if self.rewind {
            t -= quarter;
            self.rewind = false;
        }

        // Already up: wait for it to set, then skip most of an orbit.
        if self.sample(t).elevation >= 0.0 {
            t = self.wait_for_set(t, period)? + 3 * quarter;
            // the skip can land inside the next pass
            if self.sample(t).elevation >= 0.0 {
                t = self.wait_for_set(t, period)?;
            }
        }

        let mut s;
        let give_up = self.end_millis + period;
        loop {
            t += RISE_STEP_MS;
            s = self.sample(t);
            if s.elevation >= 0.0 {
                break;
            }
            if t > give_up {
                trace!(norad_id = self.satellite.catalog_number(), "no rise before horizon");
                return None;
            }
        }
        t -= RISE_STEP_MS;
        loop {
            t += FINE_STEP_MS;
            s = self.sample(t);
            if s.elevation >= 0.0 {
                break;
            }
        }
        let aos = if self.refine {
            self.bisect(t - FINE_STEP_MS, s, true)
        } else {
            s
        };

        let mut best = aos;
        self.state = SearchState::InPass {
            max_elevation: best.elevation_deg(),
        };

        let limit = aos.time_millis + period;
        loop {
            t += SET_STEP_MS;
            s = self.sample(t);
            self.track_peak(&s, &mut best);
            if s.elevation <= 0.0 || t >= limit {
                break;
            }
        }
        let los = if s.elevation > 0.0 {
            debug!(
                norad_id = self.satellite.catalog_number(),
                "pass truncated after one orbit"
            );
            s
        } else {
            t -= SET_STEP_MS;
            loop {
                t += FINE_STEP_MS;
                s = self.sample(t);
                self.track_peak(&s, &mut best);
                if s.elevation <= 0.0 {
                    break;
                }
            }
            if self.refine {
                self.bisect(t - FINE_STEP_MS, s, false)
            } else {
                s
            }
        };

        let tca = if self.refine {
            self.refine_tca(best, aos.time_millis, los.time_millis)
        } else {
            best
        };
        self.next_start = los.time_millis + 3 * quarter;
        Some(self.build_pass(&aos, &los, &tca))
    }
}

impl Iterator for PassIter<'_> {
    type Item = Pass;

    fn next(&mut self) -> Option<Pass> {
        match self.state {
            SearchState::NotVisible | SearchState::Done => None,
            SearchState::SearchingAos | SearchState::InPass { .. } => {
                if self.satellite.elements().is_deep_space() {
                    self.state = SearchState::Done;
                    return Some(self.deep_space_pass());
                }
                let found = self.leo_pass();
                match found {
                    Some(pass) if pass.aos_time < self.end_millis => {
                        trace!(
                            norad_id = pass.catalog_number,
                            aos = pass.aos_time,
                            los = pass.los_time,
                            max_elevation = pass.max_elevation,
                            "pass found"
                        );
                        self.state = SearchState::SearchingAos;
                        Some(pass)
                    }
                    _ => {
                        self.state = SearchState::Done;
                        None
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::filter_passes;
    use orbital_mechanics::time::millis_from_julian_date;
    use orbital_mechanics::tle::parse_tle;
    use orbital_mechanics::ElementSet;

    const ISS1: &str = "1 25544U 98067A   19343.69339541  .00001764  00000-0  38792-4 0  9991";
    const ISS2: &str = "2 25544  51.6439 211.2001 0007417  17.6667  85.6398 15.50103472202482";

    fn iss() -> Satellite {
        Satellite::new(parse_tle(Some("ISS (ZARYA)"), ISS1, ISS2).unwrap())
    }

    fn element_set(name: &str, mean_motion: f64, inclination: f64) -> ElementSet {
        ElementSet {
            catalog_number: 90_001,
            name: name.to_string(),
            epoch: 24_045.5,
            mean_motion,
            eccentricity: 0.000_1,
            inclination,
            raan: 100.0,
            arg_perigee: 200.0,
            mean_anomaly: 150.0,
            bstar: 0.0,
        }
    }

    fn satellite(set: ElementSet) -> Satellite {
        Satellite::new(OrbitalElements::new(set).unwrap())
    }

    fn epoch_millis(sat: &Satellite) -> i64 {
        millis_from_julian_date(sat.elements().jd_epoch())
    }

    #[test]
    fn test_will_be_seen() {
        let equator = GeoPos::new(0.0, 0.0, 0.0).unwrap();
        let arctic = GeoPos::new(80.0, 0.0, 0.0).unwrap();
        let iss = iss();
        assert!(will_be_seen(iss.elements(), &equator));
        assert!(!will_be_seen(iss.elements(), &arctic));

        let equatorial = satellite(element_set("EQ", 15.5, 0.1));
        assert!(!will_be_seen(equatorial.elements(), &GeoPos::new(-40.0, 0.0, 0.0).unwrap()));

        // retrograde orbits mirror their inclination
        let retro = satellite(element_set("RETRO", 14.2, 98.7));
        assert!(will_be_seen(retro.elements(), &arctic));
    }

    #[test]
    fn test_never_visible_yields_nothing() {
        let sat = iss();
        let arctic = GeoPos::new(85.0, 10.0, 0.0).unwrap();
        let start = epoch_millis(&sat);
        let mut passes = PassIter::new(&sat, &arctic, start, start + 86_400_000, true);
        assert_eq!(passes.state(), SearchState::NotVisible);
        assert!(passes.next().is_none());
    }

    #[test]
    fn test_iss_passes_from_equator() {
        let sat = iss();
        let station = GeoPos::new(0.0, 0.0, 0.0).unwrap();
        let start = epoch_millis(&sat);
        let end = start + 86_400_000;
        let passes: Vec<Pass> = PassIter::new(&sat, &station, start, end, true).collect();
        assert!(!passes.is_empty());

        for pair in passes.windows(2) {
            assert!(pair[0].los_time < pair[1].aos_time);
        }
        for pass in &passes {
            assert!(!pass.is_deep_space);
            assert!(pass.aos_time < end);
            assert!(pass.aos_time < pass.tca_time && pass.tca_time < pass.los_time);
            // LEO passes last minutes, not hours
            assert!(pass.duration_millis() > 0 && pass.duration_millis() < 20 * 60_000);
            assert!(pass.max_elevation > 0.0 && pass.max_elevation <= 90.0);
            assert!(pass.altitude > 380.0 && pass.altitude < 450.0);
        }
    }

    #[test]
    fn test_crossings_sit_on_the_horizon() {
        let sat = iss();
        let station = GeoPos::new(0.0, 0.0, 0.0).unwrap();
        let start = epoch_millis(&sat);
        let passes: Vec<Pass> =
            PassIter::new(&sat, &station, start, start + 86_400_000, true).collect();

        for pass in &passes {
            let aos = sat.position(&station, pass.aos_time);
            let los = sat.position(&station, pass.los_time);
            assert!(aos.elevation_deg().abs() <= 0.01, "aos el {}", aos.elevation_deg());
            assert!(los.elevation_deg().abs() <= 0.01, "los el {}", los.elevation_deg());
            assert!(sat.position(&station, pass.aos_time + 1000).elevation > 0.0);
            assert!(sat.position(&station, pass.los_time - 1000).elevation > 0.0);
            assert!((aos.azimuth_deg() - pass.aos_azimuth).abs() < 1e-9);
        }
    }

    #[test]
    fn test_tca_is_the_peak() {
        let sat = iss();
        let station = GeoPos::new(0.0, 0.0, 0.0).unwrap();
        let start = epoch_millis(&sat);
        let passes: Vec<Pass> =
            PassIter::new(&sat, &station, start, start + 86_400_000, true).collect();

        for pass in &passes {
            let tca = sat.position(&station, pass.tca_time);
            assert!((tca.elevation_deg() - pass.max_elevation).abs() < 1e-9);
            for offset in [1_000, 10_000, 60_000] {
                for t in [pass.tca_time - offset, pass.tca_time + offset] {
                    if (pass.aos_time..=pass.los_time).contains(&t) {
                        let el = sat.position(&station, t).elevation_deg();
                        assert!(el <= pass.max_elevation + 1e-4, "{el} above peak at {t}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_horizon_end_is_exclusive() {
        let sat = iss();
        let station = GeoPos::new(0.0, 0.0, 0.0).unwrap();
        let start = epoch_millis(&sat);
        let first = PassIter::new(&sat, &station, start, start + 86_400_000, true)
            .next()
            .unwrap();

        let at_edge: Vec<Pass> = PassIter::new(&sat, &station, start, first.aos_time, true).collect();
        assert!(at_edge.is_empty());

        let end = first.aos_time + 1;
        let past_edge: Vec<Pass> = PassIter::new(&sat, &station, start, end, true).collect();
        assert_eq!(past_edge, vec![first.clone()]);
        // the final filter keeps exactly what the iterator yields
        assert_eq!(filter_passes(past_edge.clone(), first.aos_time, end, 0.0), past_edge);
    }

    #[test]
    fn test_coarse_grid_without_refinement() {
        let sat = iss();
        let station = GeoPos::new(0.0, 0.0, 0.0).unwrap();
        let start = epoch_millis(&sat);
        let end = start + 86_400_000;
        let refined: Vec<Pass> = PassIter::new(&sat, &station, start, end, true).collect();
        let coarse: Vec<Pass> = PassIter::new(&sat, &station, start, end, false).collect();
        assert_eq!(refined.len(), coarse.len());
        for (r, c) in refined.iter().zip(&coarse) {
            // the grid overshoots each crossing by less than one fine step
            assert!((c.aos_time - r.aos_time).abs() < FINE_STEP_MS);
            assert!((c.los_time - r.los_time).abs() < FINE_STEP_MS);
            assert!(c.max_elevation <= r.max_elevation + 1e-3);
        }
    }

    #[test]
    fn test_deep_space_window() {
        let sat = satellite(element_set("GEO", 1.002_71, 0.02));
        let station = GeoPos::new(0.0, 0.0, 0.0).unwrap();
        let start = epoch_millis(&sat);
        let mut iter = PassIter::new(&sat, &station, start, start + 86_400_000, true);
        let pass = iter.next().unwrap();
        assert!(iter.next().is_none());
        assert_eq!(iter.state(), SearchState::Done);

        let now = sat.position(&station, start);
        assert!(pass.is_deep_space);
        assert_eq!(pass.aos_time, start - DEEP_SPACE_HALF_WINDOW_MS);
        assert_eq!(pass.los_time, start + DEEP_SPACE_HALF_WINDOW_MS);
        assert_eq!(pass.tca_time, start);
        assert_eq!(pass.max_elevation, now.elevation_deg());
        assert_eq!(pass.aos_azimuth, pass.los_azimuth);
        assert_eq!(pass.altitude, now.altitude);
    }
}
