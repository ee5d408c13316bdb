//! Satellite Pass CLI
//!
//! Usage:
//!   satpass passes --tle data/amateur.txt --lat 51.5 --lon -0.12 --alt 35
//!   satpass position --tle data/amateur.txt --station-file stations.json \
//!                    --station-id GS-001 --at 2024-02-14T12:00:00Z

use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use ground_stations::{GroundStation, StationRegistry};
use orbital_mechanics::{GeoPos, PositionSample, Satellite};
use pass_prediction::{load_satellites, PassPredictor, PassSearchConfig};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "satpass", about = "Predict satellite passes over a ground station")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose output (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List upcoming passes as JSON
    Passes {
        #[command(flatten)]
        target: Target,

        /// Search horizon in hours
        #[arg(long)]
        hours: Option<f64>,

        /// Minimum culmination elevation in degrees
        #[arg(long)]
        min_elevation: Option<f64>,

        /// Search configuration JSON file
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Look angles and sub-point for every satellite at one instant
    Position {
        #[command(flatten)]
        target: Target,
    },
}

#[derive(Args, Debug)]
struct Target {
    /// Two- or three-line element file
    #[arg(short, long)]
    tle: PathBuf,

    /// Station latitude in degrees
    #[arg(long, allow_negative_numbers = true)]
    lat: Option<f64>,

    /// Station longitude in degrees, east positive
    #[arg(long, allow_negative_numbers = true)]
    lon: Option<f64>,

    /// Station altitude in metres
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    alt: f64,

    /// Station registry JSON file
    #[arg(long, requires = "station_id")]
    station_file: Option<PathBuf>,

    /// Station id within the registry
    #[arg(long, requires = "station_file")]
    station_id: Option<String>,

    /// Reference time (RFC 3339), defaults to now
    #[arg(long)]
    at: Option<DateTime<Utc>>,
}

impl Target {
    fn station(&self) -> Result<GroundStation> {
        if let (Some(file), Some(id)) = (&self.station_file, &self.station_id) {
            let registry = StationRegistry::from_json_file(file)?;
            return Ok(registry.get(id)?.clone());
        }
        let (Some(lat), Some(lon)) = (self.lat, self.lon) else {
            bail!("either --lat/--lon or --station-file/--station-id is required");
        };
        let location = GeoPos::new(lat, lon, self.alt)?;
        Ok(GroundStation::new("cli", "command line", location)?)
    }

    fn satellites(&self) -> Result<Vec<Satellite>> {
        load_satellites(&self.tle).with_context(|| format!("loading {}", self.tle.display()))
    }

    fn reference_millis(&self) -> i64 {
        self.at.unwrap_or_else(Utc::now).timestamp_millis()
    }
}

#[derive(Serialize)]
struct PositionReport<'a> {
    catalog_number: u32,
    name: &'a str,
    footprint_km: f64,
    sample: PositionSample,
}

fn write_json<T: Serialize>(value: &T) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Passes {
            target,
            hours,
            min_elevation,
            config,
        } => {
            let mut search = match &config {
                Some(path) => PassSearchConfig::from_json_file(path)?,
                None => PassSearchConfig::default(),
            };
            if let Some(hours) = hours {
                search.horizon_hours = hours;
            }
            if let Some(min_elevation) = min_elevation {
                search.min_elevation_deg = min_elevation;
            }

            let station = target.station()?;
            let satellites = target.satellites()?;
            let reference = target.reference_millis();
            let predictor = PassPredictor::new(search)?.for_station(&station);

            info!(
                station = %station.name,
                latitude = station.location.latitude,
                longitude = station.location.longitude,
                "searching passes"
            );
            let passes = predictor.passes_batch(&satellites, &station.location, reference);
            for p in passes.iter().take(10) {
                info!(
                    "  {:24} | AOS {} | max {:5.1}° | {:4} s",
                    p.name.chars().take(24).collect::<String>(),
                    p.aos().map(|t| t.to_rfc3339()).unwrap_or_default(),
                    p.max_elevation,
                    p.duration_millis() / 1000
                );
            }
            write_json(&passes)
        }
        Command::Position { target } => {
            let station = target.station()?;
            let satellites = target.satellites()?;
            let reference = target.reference_millis();
            let reports: Vec<PositionReport> = satellites
                .iter()
                .map(|sat| {
                    let sample = sat.position(&station.location, reference);
                    PositionReport {
                        catalog_number: sat.catalog_number(),
                        name: sat.name(),
                        footprint_km: sample.footprint_km(),
                        sample,
                    }
                })
                .collect();
            write_json(&reports)
        }
    }
}
