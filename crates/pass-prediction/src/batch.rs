//! Pass prediction over many satellites at once, one rayon task each.

use ground_stations::{GroundStation, StationRegistry};
use orbital_mechanics::{GeoPos, Satellite};
use rayon::prelude::*;
use tracing::info;

use crate::config::PassSearchConfig;
use crate::error::Result;
use crate::pass::Pass;
use crate::search::PassIter;

/// Keep passes that end after `reference_millis`, start before
/// `end_millis` and culminate at or above `min_elevation_deg`, sorted by AOS.
pub fn filter_passes(
    mut passes: Vec<Pass>,
    reference_millis: i64,
    end_millis: i64,
    min_elevation_deg: f64,
) -> Vec<Pass> {
    passes.retain(|p| {
        p.los_time > reference_millis
            && p.aos_time < end_millis
            && p.max_elevation >= min_elevation_deg
    });
    passes.sort_by_key(|p| p.aos_time);
    passes
}

#[derive(Debug, Clone)]
pub struct PassPredictor {
    config: PassSearchConfig,
}

impl PassPredictor {
    pub fn new(config: PassSearchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Raise the elevation threshold to the station's mask when stricter.
    pub fn for_station(&self, station: &GroundStation) -> Self {
        let mut config = self.config.clone();
        config.min_elevation_deg = config.min_elevation_deg.max(station.min_elevation_deg);
        Self { config }
    }

    pub fn config(&self) -> &PassSearchConfig {
        &self.config
    }

    fn window(&self, reference_millis: i64) -> (i64, i64) {
        (reference_millis, reference_millis + self.config.horizon_millis())
    }

    /// Lazy, unfiltered search for one satellite.
    pub fn iter<'a>(&self, satellite: &'a Satellite, station: &GeoPos, reference_millis: i64) -> PassIter<'a> {
        let (start, end) = self.window(reference_millis);
        PassIter::new(satellite, station, start, end, self.config.refine_crossings)
    }

    pub fn passes(&self, satellite: &Satellite, station: &GeoPos, reference_millis: i64) -> Vec<Pass> {
        let (start, end) = self.window(reference_millis);
        let passes = self.iter(satellite, station, reference_millis).collect();
        filter_passes(passes, start, end, self.config.min_elevation_deg)
    }

    /// Batch search from a registered station, honouring its mask.
    pub fn passes_for_station(
        &self,
        registry: &StationRegistry,
        station_id: &str,
        satellites: &[Satellite],
        reference_millis: i64,
    ) -> Result<Vec<Pass>> {
        let station = registry.get(station_id)?;
        Ok(self
            .for_station(station)
            .passes_batch(satellites, &station.location, reference_millis))
    }

    /// Search every satellite in parallel and merge into one AOS-ordered list.
    pub fn passes_batch(&self, satellites: &[Satellite], station: &GeoPos, reference_millis: i64) -> Vec<Pass> {
        let (start, end) = self.window(reference_millis);
        let passes: Vec<Pass> = satellites
            .par_iter()
            .flat_map_iter(|sat| self.iter(sat, station, reference_millis))
            .collect();
        let found = passes.len();
        let passes = filter_passes(passes, start, end, self.config.min_elevation_deg);
        info!(
            satellites = satellites.len(),
            found,
            kept = passes.len(),
            horizon_hours = self.config.horizon_hours,
            "pass prediction complete"
        );
        passes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PassError;
    use orbital_mechanics::time::millis_from_julian_date;
    use orbital_mechanics::tle::parse_tle;
    use orbital_mechanics::{ElementSet, OrbitalElements};

    fn iss() -> Satellite {
        Satellite::new(
            parse_tle(
                Some("ISS (ZARYA)"),
                "1 25544U 98067A   19343.69339541  .00001764  00000-0  38792-4 0  9991",
                "2 25544  51.6439 211.2001 0007417  17.6667  85.6398 15.50103472202482",
            )
            .unwrap(),
        )
    }

    fn sso() -> Satellite {
        Satellite::new(
            OrbitalElements::new(ElementSet {
                catalog_number: 43_013,
                name: "SSO".to_string(),
                epoch: 19_343.5,
                mean_motion: 14.2,
                eccentricity: 0.001,
                inclination: 98.7,
                raan: 40.0,
                arg_perigee: 90.0,
                mean_anomaly: 270.0,
                bstar: 0.0,
            })
            .unwrap(),
        )
    }

    fn pass(name: &str, aos: i64, los: i64, max_elevation: f64) -> Pass {
        Pass {
            catalog_number: 1,
            name: name.to_string(),
            is_deep_space: false,
            aos_time: aos,
            aos_azimuth: 0.0,
            los_time: los,
            los_azimuth: 0.0,
            tca_time: (aos + los) / 2,
            tca_azimuth: 0.0,
            max_elevation,
            altitude: 500.0,
        }
    }

    #[test]
    fn test_filter_and_sort() {
        let passes = vec![
            pass("late", 5_000, 6_000, 30.0),
            pass("ended", 100, 900, 50.0),
            pass("low", 2_000, 3_000, 5.0),
            pass("early", 800, 1_500, 20.0),
            pass("beyond", 10_000, 11_000, 80.0),
            pass("edge", 4_000, 4_500, 10.0),
        ];
        let kept = filter_passes(passes, 1_000, 10_000, 10.0);
        let names: Vec<&str> = kept.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["early", "edge", "late"]);
    }

    #[test]
    fn test_station_mask_tightens_threshold() {
        let predictor = PassPredictor::new(PassSearchConfig::default()).unwrap();
        let station = GroundStation::new("GS-1", "Test", GeoPos::new(10.0, 10.0, 0.0).unwrap())
            .unwrap()
            .with_min_elevation(15.0)
            .unwrap();
        assert_eq!(predictor.for_station(&station).config().min_elevation_deg, 15.0);

        let strict = PassPredictor::new(PassSearchConfig {
            min_elevation_deg: 30.0,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(strict.for_station(&station).config().min_elevation_deg, 30.0);
    }

    #[test]
    fn test_registered_station_passes() {
        let registry = StationRegistry::from_json_str(
            r#"[{"id": "EQ", "name": "Equator",
                 "location": {"latitude": 0.0, "longitude": 0.0, "altitude_m": 0.0},
                 "min_elevation_deg": 20.0}]"#,
        )
        .unwrap();
        let predictor = PassPredictor::new(PassSearchConfig::default()).unwrap();
        let satellites = vec![iss()];
        let reference = millis_from_julian_date(satellites[0].elements().jd_epoch());

        let passes = predictor
            .passes_for_station(&registry, "EQ", &satellites, reference)
            .unwrap();
        assert!(passes.iter().all(|p| p.max_elevation >= 20.0));

        let missing = predictor.passes_for_station(&registry, "NOPE", &satellites, reference);
        assert!(matches!(missing, Err(PassError::Station(_))));
    }

    #[test]
    fn test_batch_matches_single_searches() {
        let predictor = PassPredictor::new(PassSearchConfig::default()).unwrap();
        let station = GeoPos::new(0.0, 0.0, 0.0).unwrap();
        let satellites = vec![iss(), sso()];
        let reference = millis_from_julian_date(satellites[0].elements().jd_epoch());

        let batch = predictor.passes_batch(&satellites, &station, reference);
        let mut single: Vec<Pass> = satellites
            .iter()
            .flat_map(|s| predictor.passes(s, &station, reference))
            .collect();
        single.sort_by_key(|p| p.aos_time);

        assert_eq!(batch.len(), single.len());
        assert!(batch.iter().any(|p| p.catalog_number == 25544));
        assert!(batch.windows(2).all(|w| w[0].aos_time <= w[1].aos_time));
        for p in &batch {
            assert!(p.los_time > reference);
            assert!(p.aos_time < reference + 86_400_000);
            assert!(single.contains(p));
        }
    }

    #[test]
    fn test_min_elevation_filters_low_passes() {
        let sat = iss();
        let station = GeoPos::new(0.0, 0.0, 0.0).unwrap();
        let reference = millis_from_julian_date(sat.elements().jd_epoch());
        let all = PassPredictor::new(PassSearchConfig::default())
            .unwrap()
            .passes(&sat, &station, reference);
        let high = PassPredictor::new(PassSearchConfig {
            min_elevation_deg: 20.0,
            ..Default::default()
        })
        .unwrap()
        .passes(&sat, &station, reference);

        assert!(high.len() <= all.len());
        assert!(high.iter().all(|p| p.max_elevation >= 20.0));
        assert_eq!(
            high.len(),
            all.iter().filter(|p| p.max_elevation >= 20.0).count()
        );
    }
}
