//! Municipal boundary loading.
//!
//! Downloads and unpacks the boundary archive, then reads the polygon layer
//! from a GeoPackage (or a GeoJSON file) into a [`BoundaryLayer`].

mod download;
mod geojson_file;
mod gpkg;
mod wkb;

pub use download::{archive_file_name, download_archive, download_client, extract_zip_archive};
pub use geojson_file::load_geojson;
pub use gpkg::load_gpkg;
pub use wkb::{decode_gpkg, decode_wkb, GpkgGeometry};

use std::path::Path;

use crate::error::{Error, Result};
use crate::models::BoundaryLayer;

/// Load a boundary file, picking the reader from the file extension.
pub fn load_boundaries(path: &Path, layer: Option<&str>, name_field: &str) -> Result<BoundaryLayer> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "gpkg" => load_gpkg(path, layer, name_field),
        "json" | "geojson" => load_geojson(path, name_field),
        _ => Err(Error::UnsupportedFormat(path.display().to_string())),
    }
}
