//! Time conversions: epoch milliseconds, Julian dates, TLE epochs and
//! Greenwich sidereal time.

use chrono::{DateTime, Utc};

use crate::constants::{EARTH_ROTATIONS_PER_SIDEREAL_DAY, MILLIS_PER_DAY, SECONDS_PER_DAY, TWO_PI};
use crate::math::{fmod2p, modulus};

/// Julian date of the Unix epoch, 1970-01-01T00:00:00Z.
pub const UNIX_EPOCH_JD: f64 = 2_440_587.5;
/// Julian date of 1950-01-00.0, the deep-space day-number origin.
pub const DS50_ORIGIN_JD: f64 = 2_433_281.5;

pub fn julian_date_from_millis(millis: i64) -> f64 {
    millis as f64 / MILLIS_PER_DAY + UNIX_EPOCH_JD
}

pub fn millis_from_julian_date(jd: f64) -> i64 {
    ((jd - UNIX_EPOCH_JD) * MILLIS_PER_DAY).round() as i64
}

pub fn julian_date(time: DateTime<Utc>) -> f64 {
    julian_date_from_millis(time.timestamp_millis())
}

pub fn datetime_from_millis(millis: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
}

/// Julian date of January 0.0 of `year` (i.e. 31 December of the year before).
pub fn julian_date_of_year(year: i32) -> f64 {
    let y = year - 1;
    let a = y.div_euclid(100);
    let b = 2 - a + a.div_euclid(4);
    (365.25 * y as f64).floor() + (30.6001 * 14.0_f64).floor() + 1_720_994.5 + b as f64
}

/// Julian date of a TLE epoch encoded as `yyddd.dddddddd`.
///
/// Two-digit years below 57 belong to the 21st century.
pub fn julian_date_of_epoch(epoch: f64) -> f64 {
    let yy = (epoch * 1e-3).trunc() as i32;
    let day = epoch - f64::from(yy) * 1e3;
    let year = if yy < 57 { yy + 2000 } else { yy + 1900 };
    julian_date_of_year(year) + day
}

/// Greenwich mean sidereal angle at a Julian date, radians in [0, 2π).
pub fn theta_g_jd(jd: f64) -> f64 {
    let ut = (jd + 0.5).fract();
    let tu = (jd - ut - 2_451_545.0) / 36_525.0;
    let gmst = 24_110.548_41 + tu * (8_640_184.812_866 + tu * (0.093_104 - tu * 6.2e-6));
    let gmst = modulus(
        gmst + SECONDS_PER_DAY * EARTH_ROTATIONS_PER_SIDEREAL_DAY * ut,
        SECONDS_PER_DAY,
    );
    TWO_PI * gmst / SECONDS_PER_DAY
}

/// Days since 1950-01-00.0 for a Julian date.
pub fn ds50(jd: f64) -> f64 {
    jd - DS50_ORIGIN_JD
}

/// Low-precision sidereal angle used to phase the resonance terms.
pub fn theta_g_ds50(ds50: f64) -> f64 {
    fmod2p(6.300_388_098_7 * ds50 + 1.729_444_94)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_julian_date_of_year() {
        assert_eq!(julian_date_of_year(2000), 2_451_543.5);
        assert_eq!(julian_date_of_year(2019), 2_458_483.5);
        assert_eq!(julian_date_of_year(1980), 2_444_238.5);
    }

    #[test]
    fn test_epoch_century_split() {
        // 2019 day 343.69339541
        let jd = julian_date_of_epoch(19_343.693_395_41);
        assert!((jd - (2_458_483.5 + 343.693_395_41)).abs() < 1e-8);

        // 1980 day 275.98708465
        let jd = julian_date_of_epoch(80_275.987_084_65);
        assert!((jd - (2_444_238.5 + 275.987_084_65)).abs() < 1e-8);
    }

    #[test]
    fn test_millis_round_trip() {
        let t = Utc.with_ymd_and_hms(2024, 2, 13, 16, 0, 0).unwrap();
        let jd = julian_date(t);
        assert_eq!(millis_from_julian_date(jd), t.timestamp_millis());
        assert_eq!(julian_date_from_millis(0), UNIX_EPOCH_JD);
    }

    #[test]
    fn test_gmst_at_j2000() {
        let theta = theta_g_jd(2_451_545.0);
        assert!((theta.to_degrees() - 280.460_618_37).abs() < 1e-3);
    }

    #[test]
    fn test_gmst_range() {
        for day in 0..400 {
            let theta = theta_g_jd(2_458_000.0 + day as f64 * 0.37);
            assert!((0.0..TWO_PI).contains(&theta));
        }
    }
}
