//! Point-in-Polygon (PIP) join of points against municipal boundaries.
//!
//! Points are matched against an R-tree of municipality envelopes and then
//! tested exactly, and the matches are aggregated into a [`CountTable`].
//!
//! [`CountTable`]: crate::models::CountTable

mod index;
mod join;

pub use index::{IndexedMunicipality, MunicipalityIndex};
pub use join::{aggregate, count_by_name, fill_counts, project_points};
