//! Overpass API access: query building, fetching and coordinate extraction.

mod client;
mod extract;
mod query;

pub(crate) use client::USER_AGENT;
pub use client::{OverpassClient, DEFAULT_ENDPOINT};
pub use extract::{extract_coordinates, LongitudeFilter, EUROPEAN_NETHERLANDS_MIN_LON};
pub use query::OverpassQuery;
