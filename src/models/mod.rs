//! Core data models for the point-count pipeline.

pub mod boundary;
pub mod counts;
pub mod feature;

pub use boundary::{BoundaryLayer, Municipality};
pub use counts::{CountTable, MunicipalityCount};
pub use feature::{Element, Feature, GeoPoint, Location, OsmType, OverpassResponse};
