//! Coordinate extraction from Overpass elements.

use crate::models::{Feature, GeoPoint, OverpassResponse};

/// Westernmost longitude (exclusive) kept for the `NL` area.
///
/// The Caribbean Netherlands share the `NL` country code; everything in the
/// European part lies east of 3°E while the islands lie far to the west.
pub const EUROPEAN_NETHERLANDS_MIN_LON: f64 = 3.0;

/// One coordinate per located feature, in response order. Unlocated features are skipped.
pub fn extract_coordinates(response: OverpassResponse) -> Vec<GeoPoint> {
    response
        .elements
        .into_iter()
        .map(Feature::from)
        .filter_map(|f| f.location.coordinate())
        .collect()
}

/// Keeps coordinates strictly east of a longitude threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LongitudeFilter {
    pub min_lon: f64,
}

impl LongitudeFilter {
    pub fn new(min_lon: f64) -> Self {
        Self { min_lon }
    }

    pub fn keeps(&self, p: &GeoPoint) -> bool {
        p.lon > self.min_lon
    }

    pub fn apply(&self, points: Vec<GeoPoint>) -> Vec<GeoPoint> {
        points.into_iter().filter(|p| self.keeps(p)).collect()
    }
}

impl Default for LongitudeFilter {
    fn default() -> Self {
        Self::new(EUROPEAN_NETHERLANDS_MIN_LON)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(json: &str) -> OverpassResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_extract_mixed_elements() {
        let resp = response(
            r#"{"elements":[
                {"type":"node","id":1,"lat":52.3,"lon":4.9},
                {"type":"way","id":2,"center":{"lat":51.9,"lon":4.5}},
                {"type":"relation","id":3},
                {"type":"relation","id":4,"center":{"lat":53.2,"lon":6.6}}
            ]}"#,
        );
        assert_eq!(
            extract_coordinates(resp),
            vec![
                GeoPoint::new(4.9, 52.3),
                GeoPoint::new(4.5, 51.9),
                GeoPoint::new(6.6, 53.2),
            ]
        );
    }

    #[test]
    fn test_empty_response() {
        assert!(extract_coordinates(response(r#"{"elements":[]}"#)).is_empty());
    }

    #[test]
    fn test_longitude_filter_is_strict() {
        let filter = LongitudeFilter::new(3.0);
        assert!(!filter.keeps(&GeoPoint::new(2.5, 51.0)));
        assert!(!filter.keeps(&GeoPoint::new(3.0, 51.0)));
        assert!(filter.keeps(&GeoPoint::new(4.9, 52.3)));
    }

    #[test]
    fn test_default_filter_drops_caribbean() {
        let points = vec![
            GeoPoint::new(-68.93, 12.11), // Willemstad
            GeoPoint::new(5.12, 52.09),   // Utrecht
            GeoPoint::new(-63.05, 18.04), // Philipsburg
        ];
        assert_eq!(LongitudeFilter::default().apply(points), vec![GeoPoint::new(5.12, 52.09)]);
    }
}
