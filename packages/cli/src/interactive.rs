//! Menu-driven search loop.
//!
//! Keeps one [`SnapshotStore`] alive for the whole session, so repeated
//! searches reuse zone assignments and looked-up localities until the data
//! file is reloaded.

use std::path::Path;

use dialoguer::{Confirm, Input, Select};
use nearby_geocoder::ReverseGeocoder;
use nearby_listing_models::{Coordinate, DEFAULT_RADIUS_M, Query};
use nearby_search::SearchOptions;
use nearby_session::{SearchRequest, SnapshotStore};
use nearby_zones::ZoneStrategy;

/// Point offered when the user just presses enter (central Bogotá).
const DEFAULT_CENTER: Coordinate = Coordinate::new(4.5997, -74.0817);

enum MenuAction {
    Search,
    Reload,
    Quit,
}

impl MenuAction {
    const ALL: &[Self] = &[Self::Search, Self::Reload, Self::Quit];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Search => "Search near a point",
            Self::Reload => "Reload data file",
            Self::Quit => "Quit",
        }
    }
}

/// Runs the interactive menu until the user quits.
///
/// # Errors
///
/// Returns an error if the data file cannot be loaded or a prompt fails.
pub async fn run(data: &Path, delimiter: char) -> Result<(), Box<dyn std::error::Error>> {
    let store = SnapshotStore::new(crate::load_listings(data, delimiter)?);

    let geocode = Confirm::new()
        .with_prompt("Look up city names online (Nominatim)?")
        .default(false)
        .interact()?;
    let geocoder = if geocode {
        crate::build_geocoder()
    } else {
        None
    };

    let labels: Vec<&str> = MenuAction::ALL.iter().map(MenuAction::label).collect();

    loop {
        let idx = Select::new()
            .with_prompt("What would you like to do?")
            .items(&labels)
            .default(0)
            .interact()?;

        match MenuAction::ALL[idx] {
            MenuAction::Search => {
                let latitude: f64 = Input::new()
                    .with_prompt("Latitude")
                    .default(DEFAULT_CENTER.latitude)
                    .interact_text()?;
                let longitude: f64 = Input::new()
                    .with_prompt("Longitude")
                    .default(DEFAULT_CENTER.longitude)
                    .interact_text()?;
                let radius_m: f64 = Input::new()
                    .with_prompt("Radius in meters")
                    .default(DEFAULT_RADIUS_M)
                    .interact_text()?;

                let request = SearchRequest {
                    query: Query::new(Coordinate::new(latitude, longitude)).with_radius(radius_m),
                    options: SearchOptions::default(),
                    zone_strategy: Some(ZoneStrategy::CityBoxes),
                    resolve_locality: geocoder.is_some(),
                };

                let snapshot = store.current();
                let report = snapshot
                    .search(
                        &request,
                        geocoder.as_ref().map(|g| g as &dyn ReverseGeocoder),
                    )
                    .await;

                if report.is_empty() {
                    log::warn!(
                        "No listings within {radius_m} m of {}",
                        request.query.center
                    );
                }
                crate::output::print_search_table(&report);
                println!();
            }
            MenuAction::Reload => match crate::load_listings(data, delimiter) {
                Ok(listings) => {
                    store.replace(listings);
                }
                Err(e) => log::error!("Reload failed, keeping current data: {e}"),
            },
            MenuAction::Quit => break,
        }
    }

    Ok(())
}
