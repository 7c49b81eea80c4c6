//! poimap - counts OpenStreetMap points of interest per municipality
//!
//! This library provides the pipeline stages used by the `poimap` binary:
//! Overpass fetching, boundary loading, the spatial join and map rendering.

pub mod boundaries;
pub mod crs;
pub mod error;
pub mod models;
pub mod overpass;
pub mod pip;
pub mod render;

pub use error::{Error, Result};
pub use models::{BoundaryLayer, CountTable, GeoPoint, Municipality};
