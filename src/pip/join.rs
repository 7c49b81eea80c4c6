//! Point-in-polygon join and per-municipality aggregation.

use geo::Point;
use hashbrown::HashMap;
use rayon::prelude::*;
use tracing::{debug, info};

use super::MunicipalityIndex;
use crate::crs::{Crs, Transformer};
use crate::models::{BoundaryLayer, CountTable, GeoPoint, MunicipalityCount};

/// WGS84 coordinates as points in the layer's CRS
pub fn project_points(points: &[GeoPoint], crs: Crs) -> Vec<Point<f64>> {
    let transformer = Transformer::new(Crs::Wgs84, crs);
    points
        .par_iter()
        .map(|p| transformer.transform_point(Point::from(*p)))
        .collect()
}

/// Intersects join: number of matched points per municipality name.
///
/// A point touching several municipalities counts once for each of them.
pub fn count_by_name(layer: &BoundaryLayer, points: &[Point<f64>]) -> HashMap<String, u64> {
    let index = MunicipalityIndex::build(&layer.municipalities);

    let hits: Vec<Vec<usize>> = points.par_iter().map(|p| index.lookup(*p)).collect();

    let mut counts: HashMap<String, u64> = HashMap::new();
    let mut unmatched = 0usize;
    for matched in &hits {
        if matched.is_empty() {
            unmatched += 1;
        }
        for &i in matched {
            *counts.entry(index.municipality(i).name.clone()).or_default() += 1;
        }
    }

    debug!(
        "{} of {} points matched no municipality",
        unmatched,
        points.len()
    );
    counts
}

/// Left-join name counts onto every boundary polygon, filling 0 where nothing matched.
pub fn fill_counts(layer: &BoundaryLayer, counts: &HashMap<String, u64>) -> CountTable {
    let rows = layer
        .municipalities
        .iter()
        .map(|m| MunicipalityCount {
            name: m.name.clone(),
            geometry: m.geometry.clone(),
            count: counts.get(&m.name).copied().unwrap_or(0),
        })
        .collect();

    CountTable {
        crs: layer.crs,
        rows,
    }
}

/// Reproject WGS84 coordinates into the layer CRS, join and aggregate.
///
/// Returns the projected points along with the table so callers can plot them.
pub fn aggregate(layer: &BoundaryLayer, points: &[GeoPoint]) -> (Vec<Point<f64>>, CountTable) {
    info!(
        "Joining {} points against {} municipalities in {}",
        points.len(),
        layer.len(),
        layer.crs
    );

    let projected = project_points(points, layer.crs);
    let counts = count_by_name(layer, &projected);
    let table = fill_counts(layer, &counts);

    info!(
        "{} of {} municipalities contain at least one point (max {})",
        table.covered(),
        table.len(),
        table.max_count()
    );
    (projected, table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Municipality;
    use geo::{polygon, MultiPolygon};

    fn square(name: &str, x0: f64, y0: f64, size: f64) -> Municipality {
        Municipality::new(
            name,
            MultiPolygon::new(vec![polygon![
                (x: x0, y: y0),
                (x: x0 + size, y: y0),
                (x: x0 + size, y: y0 + size),
                (x: x0, y: y0 + size),
            ]]),
        )
    }

    fn abc_layer() -> BoundaryLayer {
        BoundaryLayer::new(
            "gemeenten",
            Crs::Wgs84,
            vec![
                square("A", 4.0, 52.0, 0.5),
                square("B", 5.0, 52.0, 0.5),
                square("C", 6.0, 52.0, 0.5),
            ],
        )
    }

    #[test]
    fn test_all_points_in_one_municipality() {
        let layer = abc_layer();
        let points: Vec<GeoPoint> = (0..5)
            .map(|i| GeoPoint::new(4.1 + 0.05 * i as f64, 52.2))
            .collect();

        let (_, table) = aggregate(&layer, &points);
        let counts: Vec<(&str, u64)> = table.iter().map(|r| (r.name.as_str(), r.count)).collect();
        assert_eq!(counts, [("A", 5), ("B", 0), ("C", 0)]);
    }

    #[test]
    fn test_every_polygon_appears_once() {
        let layer = abc_layer();
        let (projected, table) = aggregate(&layer, &[GeoPoint::new(0.0, 0.0)]);
        assert_eq!(projected, vec![Point::new(0.0, 0.0)]);
        assert_eq!(table.len(), layer.len());
        assert!(table.iter().all(|r| r.count == 0));
    }

    #[test]
    fn test_duplicate_names_share_count() {
        // Two polygons for one municipality (e.g. mainland and an island)
        let layer = BoundaryLayer::new(
            "gemeenten",
            Crs::Wgs84,
            vec![square("A", 4.0, 52.0, 0.5), square("A", 7.0, 52.0, 0.5)],
        );
        let points = [GeoPoint::new(4.2, 52.2), GeoPoint::new(7.2, 52.2)];
        let (_, table) = aggregate(&layer, &points);
        assert_eq!(table.len(), 2);
        assert!(table.iter().all(|r| r.count == 2));
    }

    #[test]
    fn test_join_in_projected_layer() {
        // 2x2 km square around central Utrecht in RD New
        let layer = BoundaryLayer::new(
            "gemeenten",
            Crs::RdNew,
            vec![
                square("Utrecht", 135_000.0, 455_000.0, 2_000.0),
                square("Elders", 0.0, 300_000.0, 1_000.0),
            ],
        );
        let (projected, table) = aggregate(&layer, &[GeoPoint::new(5.1214, 52.0907)]);
        assert!(projected[0].x() > 100_000.0);
        assert_eq!(table.get("Utrecht"), Some(1));
        assert_eq!(table.get("Elders"), Some(0));
    }
}
