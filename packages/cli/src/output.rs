//! Table and JSON rendering for command results.

use nearby_aggregate::Aggregation;
use nearby_geocoder::UNKNOWN_CITY;
use nearby_session::SearchReport;
use serde::Serialize;
use strum_macros::{AsRefStr, Display, EnumString};

/// How command results are written to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Prints `value` as pretty JSON.
///
/// # Errors
///
/// Returns an error if `value` cannot be serialized.
pub fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn opt_f64(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.precision$}"))
}

fn opt_u32(value: Option<u32>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut out: String = text.chars().take(width.saturating_sub(1)).collect();
        out.push('~');
        out
    }
}

/// Prints a search report as a table.
pub fn print_search_table(report: &SearchReport<'_>) {
    let place = report
        .locality
        .as_ref()
        .map(|l| format!(" in {}", l.display_or(UNKNOWN_CITY)))
        .unwrap_or_default();

    println!(
        "Listings within {} m of {}{place}",
        report.query.radius_m, report.query.center
    );
    println!();

    if report.is_empty() {
        println!("No listings found.");
    } else {
        println!(
            "{:>10} {:<24} {:>16} {:>9} {:>4} {:>4}  ZONE",
            "DIST (m)", "CLIENT", "PRICE", "AREA m2", "BED", "BATH"
        );
        println!("{}", "-".repeat(82));
        for m in &report.matches {
            let listing = m.nearby.listing;
            println!(
                "{:>10.1} {:<24} {:>16} {:>9} {:>4} {:>4}  {}",
                m.nearby.distance_m,
                truncate(listing.client_name.as_deref().unwrap_or("-"), 24),
                opt_f64(listing.price, 0),
                opt_f64(listing.area_m2, 1),
                opt_u32(listing.bedrooms),
                opt_u32(listing.bathrooms),
                m.zone.as_deref().unwrap_or("-"),
            );
        }
    }

    println!();
    println!(
        "{} of {} listings matched ({} without coordinates)",
        report.matches.len(),
        report.scanned,
        report.skipped
    );

    if !report.zones.rows.is_empty() {
        println!();
        print_zone_table(&report.zones);
    }
}

/// Prints per-zone aggregates as a table.
pub fn print_zone_table(aggregation: &Aggregation<String>) {
    println!(
        "{:<24} {:>6} {:>16} {:>16} {:>16} {:>10}",
        "ZONE", "COUNT", "MEAN PRICE", "MIN PRICE", "MAX PRICE", "MEAN m2"
    );
    println!("{}", "-".repeat(93));
    for row in &aggregation.rows {
        println!(
            "{:<24} {:>6} {:>16} {:>16} {:>16} {:>10}",
            truncate(&row.key, 24),
            row.count,
            opt_f64(row.mean_price, 0),
            opt_f64(row.min_price, 0),
            opt_f64(row.max_price, 0),
            opt_f64(row.mean_area, 1),
        );
    }
    if aggregation.unkeyed > 0 {
        println!(
            "({} listings without coordinates not shown)",
            aggregation.unkeyed
        );
    }
}
