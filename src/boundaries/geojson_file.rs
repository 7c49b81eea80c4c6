//! GeoJSON boundary reader (WGS84 FeatureCollection).

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use geo::MultiPolygon;
use geojson::GeoJson;
use tracing::{info, warn};

use crate::crs::Crs;
use crate::error::{Error, Result};
use crate::models::{BoundaryLayer, Municipality};

pub fn load_geojson(path: &Path, name_field: &str) -> Result<BoundaryLayer> {
    info!("Loading GeoJSON from {}", path.display());
    let reader = BufReader::new(File::open(path)?);
    let geojson = GeoJson::from_reader(reader)
        .map_err(|e| Error::UnsupportedFormat(format!("{}: {}", path.display(), e)))?;
    from_geojson(geojson, layer_name(path), name_field)
}

fn layer_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("boundaries")
        .to_string()
}

fn from_geojson(geojson: GeoJson, layer: String, name_field: &str) -> Result<BoundaryLayer> {
    let collection = match geojson {
        GeoJson::FeatureCollection(fc) => fc,
        _ => {
            return Err(Error::UnsupportedFormat(
                "GeoJSON must be a FeatureCollection".to_string(),
            ))
        }
    };

    let mut municipalities = Vec::new();

    for feature in collection.features {
        let name = match feature.properties.as_ref().and_then(|p| p.get(name_field)) {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Number(n)) => n.to_string(),
            _ => continue,
        };

        let Some(geometry) = feature.geometry else {
            continue;
        };

        let geometry: geo::Geometry<f64> = match geometry.value.try_into() {
            Ok(g) => g,
            Err(e) => {
                warn!("Skipping {}: {}", name, e);
                continue;
            }
        };

        let geometry = match geometry {
            geo::Geometry::MultiPolygon(mp) => mp,
            geo::Geometry::Polygon(p) => MultiPolygon::new(vec![p]),
            _ => {
                warn!("Skipping {}: not a polygon", name);
                continue;
            }
        };

        municipalities.push(Municipality::new(name, geometry));
    }

    if municipalities.is_empty() {
        return Err(Error::AttributeNotFound {
            layer,
            attribute: name_field.to_string(),
        });
    }

    info!("Loaded {} boundaries from GeoJSON", municipalities.len());
    Ok(BoundaryLayer::new(layer, Crs::Wgs84, municipalities))
}
