//! TLE input adapter.
//!
//! Extracts only the fields the propagators need from the fixed-column
//! two-line format. Checksums, classification, launch designators and the
//! mean-motion derivatives are not decoded.

use crate::elements::{ElementSet, OrbitalElements};
use crate::{OrbitalError, Result};

/// Slice a 1-based inclusive column range and trim it.
fn field<'a>(line: &'a str, first: usize, last: usize, what: &str) -> Result<&'a str> {
    line.get(first - 1..last)
        .map(str::trim)
        .ok_or_else(|| OrbitalError::InvalidTle(format!("line too short for {what}: {line:?}")))
}

fn number(line: &str, first: usize, last: usize, what: &str) -> Result<f64> {
    let raw = field(line, first, last, what)?;
    raw.parse::<f64>()
        .map_err(|_| OrbitalError::InvalidTle(format!("bad {what}: {raw:?}")))
}

/// Decode the `±NNNNN±E` form with an assumed leading decimal point.
fn implied_decimal(raw: &str, what: &str) -> Result<f64> {
    let bad = || OrbitalError::InvalidTle(format!("bad {what}: {raw:?}"));
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(0.0);
    }
    let (sign, body) = match raw.as_bytes()[0] {
        b'-' => (-1.0, &raw[1..]),
        b'+' => (1.0, &raw[1..]),
        _ => (1.0, raw),
    };
    let (mantissa, exponent) = match body.rfind(['-', '+']) {
        Some(idx) if idx > 0 => (&body[..idx], body[idx..].parse::<i32>().map_err(|_| bad())?),
        _ => (body, 0),
    };
    let mantissa = format!("0.{}", mantissa.trim())
        .parse::<f64>()
        .map_err(|_| bad())?;
    Ok(sign * mantissa * 10f64.powi(exponent))
}

fn catalog_number(line: &str) -> Result<u32> {
    let raw = field(line, 3, 7, "catalog number")?;
    raw.parse::<u32>()
        .map_err(|_| OrbitalError::InvalidTle(format!("bad catalog number: {raw:?}")))
}

/// Build elements from a name (optional) and the two element lines.
pub fn parse_tle(name: Option<&str>, line1: &str, line2: &str) -> Result<OrbitalElements> {
    let line1 = line1.trim_end();
    let line2 = line2.trim_end();
    if !line1.is_ascii() || !line2.is_ascii() {
        return Err(OrbitalError::InvalidTle("non-ASCII characters".to_string()));
    }
    if !line1.starts_with('1') || !line2.starts_with('2') {
        return Err(OrbitalError::InvalidTle(
            "expected lines starting with '1' and '2'".to_string(),
        ));
    }

    let catalog = catalog_number(line1)?;
    if catalog_number(line2)? != catalog {
        return Err(OrbitalError::InvalidTle(format!(
            "catalog number mismatch between lines for {catalog}"
        )));
    }

    let eccentricity = {
        let raw = field(line2, 27, 33, "eccentricity")?;
        format!("0.{raw}")
            .parse::<f64>()
            .map_err(|_| OrbitalError::InvalidTle(format!("bad eccentricity: {raw:?}")))?
    };

    let name = name
        .map(|n| n.trim().trim_start_matches("0 ").trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| catalog.to_string());

    OrbitalElements::new(ElementSet {
        catalog_number: catalog,
        name,
        epoch: number(line1, 19, 32, "epoch")?,
        bstar: implied_decimal(field(line1, 54, 61, "bstar")?, "bstar")?,
        inclination: number(line2, 9, 16, "inclination")?,
        raan: number(line2, 18, 25, "raan")?,
        eccentricity,
        arg_perigee: number(line2, 35, 42, "argument of perigee")?,
        mean_anomaly: number(line2, 44, 51, "mean anomaly")?,
        mean_motion: number(line2, 53, 63, "mean motion")?,
    })
}

/// Parse a catalog of two- or three-line sets. Blank lines are skipped.
pub fn parse_catalog(text: &str) -> Result<Vec<OrbitalElements>> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim_end)
        .filter(|l| !l.trim().is_empty())
        .collect();

    let mut out = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        let is_line1 = lines[i].starts_with("1 ");
        let (name, first) = if is_line1 { (None, i) } else { (Some(lines[i]), i + 1) };
        let (Some(l1), Some(l2)) = (lines.get(first), lines.get(first + 1)) else {
            return Err(OrbitalError::InvalidTle(format!(
                "incomplete element set starting at line {}",
                i + 1
            )));
        };
        out.push(parse_tle(name, l1, l2)?);
        i = first + 2;
    }
    Ok(out)
}
