#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Listing snapshots and the searches run against them.
//!
//! A [`Snapshot`] owns one immutable load of listings together with the
//! caches derived from it. The [`SnapshotStore`] hands out the current
//! snapshot and swaps in a new one on reload, so no cache ever outlives the
//! data it was computed from.

pub mod report;
pub mod snapshot;

pub use report::{SearchReport, SearchRequest, ZonedMatch};
pub use snapshot::{Snapshot, SnapshotStore, ZoneLabels};
