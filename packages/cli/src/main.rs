#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for nearby listing search.
//!
//! Loads a listings CSV into a snapshot and answers proximity queries
//! against it. Running without a subcommand starts the interactive menu.
//! Set `RUST_LOG=debug` to see what the loader and search are doing.

mod interactive;
mod output;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use nearby_aggregate::{AggregateOptions, AggregateSort};
use nearby_distance::DistanceFormula;
use nearby_geocoder::nominatim::NominatimGeocoder;
use nearby_geocoder::service_registry::enabled_services;
use nearby_listing_models::{Coordinate, DEFAULT_RADIUS_M, Query};
use nearby_search::{SearchOptions, SortOrder};
use nearby_session::{SearchRequest, SnapshotStore};
use nearby_source::LoadOptions;
use nearby_zones::ZoneStrategy;

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "nearby", about = "Find real-estate listings near a point")]
struct Cli {
    /// Listings CSV file.
    #[arg(long, global = true, default_value = "data/listings.csv")]
    data: PathBuf,

    /// Field delimiter of the listings file.
    #[arg(long, global = true, default_value_t = ',')]
    delimiter: char,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List listings within a radius of a point
    Search {
        /// Latitude of the query point in degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        /// Longitude of the query point in degrees
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        /// Search radius in meters (inclusive)
        #[arg(long, default_value_t = DEFAULT_RADIUS_M)]
        radius: f64,
        /// Distance formula: haversine or geodesic
        #[arg(long, default_value = "haversine")]
        formula: DistanceFormula,
        /// Result order: input or distance
        #[arg(long, default_value = "input")]
        sort: SortOrder,
        /// Label matches with zones and aggregate them: bbox, bucket2 or bucket3
        #[arg(long)]
        zones: Option<ZoneStrategy>,
        /// Reverse geocode the query point to a city name
        #[arg(long)]
        geocode: bool,
        /// Output format: table or json
        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },
    /// Aggregate the whole data file by zone
    Zones {
        /// Zone strategy: bbox, bucket2 or bucket3
        #[arg(long, default_value = "bbox")]
        zones: ZoneStrategy,
        /// Row order: key, price or count
        #[arg(long, default_value = "key")]
        sort: AggregateSort,
        /// Show only the first N rows
        #[arg(long)]
        top: Option<usize>,
        /// Output format: table or json
        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },
    /// Print the zone of a single point
    Classify {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        /// Zone strategy: bbox, bucket2 or bucket3
        #[arg(long, default_value = "bbox")]
        zones: ZoneStrategy,
    },
    /// Prompt for a point and search around it
    Interactive,
}

/// Loads the listings file with the configured delimiter.
///
/// # Errors
///
/// Returns an error if the delimiter is not a single byte or the file
/// cannot be loaded.
fn load_listings(
    path: &Path,
    delimiter: char,
) -> Result<Vec<nearby_listing_models::Listing>, Box<dyn std::error::Error>> {
    let delimiter = u8::try_from(delimiter)
        .map_err(|_| format!("Delimiter must be a single-byte character, got {delimiter:?}"))?;
    let listings = nearby_source::load_path(path, &LoadOptions { delimiter })?;
    log::info!("Loaded {} listings from {}", listings.len(), path.display());
    Ok(listings)
}

/// Builds the first enabled reverse geocoder from the service registry.
///
/// Returns `None` (and logs why) when no service is enabled or the client
/// cannot be built; searches then run without a locality.
fn build_geocoder() -> Option<NominatimGeocoder> {
    let Some(service) = enabled_services().into_iter().next() else {
        log::warn!("No geocoding service is enabled");
        return None;
    };

    match NominatimGeocoder::from_service(&service) {
        Ok(geocoder) => Some(geocoder),
        Err(e) => {
            log::warn!("Failed to set up {}: {e}", service.name);
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::formatted_builder()
        .parse_env("RUST_LOG")
        .try_init()
        .ok();

    let cli = Cli::parse();

    let Some(command) = cli.command else {
        return interactive::run(&cli.data, cli.delimiter).await;
    };

    match command {
        Commands::Search {
            lat,
            lon,
            radius,
            formula,
            sort,
            zones,
            geocode,
            format,
        } => {
            let store = SnapshotStore::new(load_listings(&cli.data, cli.delimiter)?);
            let snapshot = store.current();

            let geocoder = if geocode { build_geocoder() } else { None };
            let request = SearchRequest {
                query: Query::new(Coordinate::new(lat, lon)).with_radius(radius),
                options: SearchOptions { formula, sort },
                zone_strategy: zones,
                resolve_locality: geocode,
            };

            let report = snapshot
                .search(
                    &request,
                    geocoder
                        .as_ref()
                        .map(|g| g as &dyn nearby_geocoder::ReverseGeocoder),
                )
                .await;

            match format {
                OutputFormat::Table => output::print_search_table(&report),
                OutputFormat::Json => output::print_json(&report)?,
            }
        }
        Commands::Zones {
            zones,
            sort,
            top,
            format,
        } => {
            let store = SnapshotStore::new(load_listings(&cli.data, cli.delimiter)?);
            let summary = store
                .current()
                .zone_summary(zones, AggregateOptions { sort, top });

            match format {
                OutputFormat::Table => output::print_zone_table(&summary),
                OutputFormat::Json => output::print_json(&summary)?,
            }
        }
        Commands::Classify { lat, lon, zones } => {
            println!("{}", zones.classify(Coordinate::new(lat, lon)));
        }
        Commands::Interactive => interactive::run(&cli.data, cli.delimiter).await?,
    }

    Ok(())
}
