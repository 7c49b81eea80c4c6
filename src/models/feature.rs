//! Overpass response elements and the features extracted from them.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Type of OSM object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OsmType {
    Node,
    Way,
    Relation,
}

impl std::fmt::Display for OsmType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OsmType::Node => write!(f, "node"),
            OsmType::Way => write!(f, "way"),
            OsmType::Relation => write!(f, "relation"),
        }
    }
}

/// Geographic point (WGS84 lon/lat)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

impl From<GeoPoint> for geo::Point<f64> {
    fn from(p: GeoPoint) -> Self {
        geo::Point::new(p.lon, p.lat)
    }
}

/// Decoded body of an Overpass `[out:json]` request.
#[derive(Debug, Clone, Deserialize)]
pub struct OverpassResponse {
    #[serde(default)]
    pub version: Option<f64>,
    #[serde(default)]
    pub generator: Option<String>,
    /// Server-side notice, e.g. a query timeout that truncated the result
    #[serde(default)]
    pub remark: Option<String>,
    pub elements: Vec<Element>,
}

/// A raw element as it appears in the `elements` list.
#[derive(Debug, Clone, Deserialize)]
pub struct Element {
    #[serde(rename = "type")]
    pub osm_type: OsmType,
    pub id: i64,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub lat: Option<f64>,
    /// Present on ways/relations when the query asks for `out center`
    #[serde(default)]
    pub center: Option<GeoPoint>,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

/// Where a feature sits on the map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Location {
    /// A node with its own coordinate
    Point(GeoPoint),
    /// A way or relation reduced to its center
    Center(GeoPoint),
    /// Neither a node coordinate nor a center was returned
    Unlocated,
}

impl Location {
    pub fn coordinate(&self) -> Option<GeoPoint> {
        match self {
            Location::Point(p) | Location::Center(p) => Some(*p),
            Location::Unlocated => None,
        }
    }
}

/// A tagged OSM entity with a resolved location.
#[derive(Debug, Clone)]
pub struct Feature {
    pub osm_type: OsmType,
    pub osm_id: i64,
    pub tags: HashMap<String, String>,
    pub location: Location,
}

impl Feature {
    /// Unique source identifier: "{osm_type}/{osm_id}"
    pub fn source_id(&self) -> String {
        format!("{}/{}", self.osm_type, self.osm_id)
    }
}

impl From<Element> for Feature {
    fn from(element: Element) -> Self {
        // Only nodes carry their own coordinate; everything else relies on `center`.
        let location = match (element.osm_type, element.lon, element.lat) {
            (OsmType::Node, Some(lon), Some(lat)) => Location::Point(GeoPoint::new(lon, lat)),
            (OsmType::Node, _, _) => Location::Unlocated,
            _ => element
                .center
                .map(Location::Center)
                .unwrap_or(Location::Unlocated),
        };

        Self {
            osm_type: element.osm_type,
            osm_id: element.id,
            tags: element.tags,
            location,
        }
    }
}
