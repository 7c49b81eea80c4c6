//! Spatial index for fast municipality lookups.

use geo::{Intersects, Point};
use rstar::{RTree, RTreeObject, AABB};
use tracing::info;

use crate::models::Municipality;

/// Wrapper for R-tree indexing of municipalities, keyed by layer position
#[derive(Clone)]
pub struct IndexedMunicipality {
    /// Position in the boundary layer
    pub index: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedMunicipality {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Spatial index over a boundary layer's municipalities using an R-tree
pub struct MunicipalityIndex<'a> {
    tree: RTree<IndexedMunicipality>,
    municipalities: &'a [Municipality],
}

impl<'a> MunicipalityIndex<'a> {
    /// Build spatial index from a layer's municipalities
    pub fn build(municipalities: &'a [Municipality]) -> Self {
        info!(
            "Building spatial index for {} municipalities...",
            municipalities.len()
        );

        let indexed: Vec<IndexedMunicipality> = municipalities
            .iter()
            .enumerate()
            .filter_map(|(index, m)| {
                let (min_x, min_y, max_x, max_y) = m.bbox()?;
                Some(IndexedMunicipality {
                    index,
                    envelope: AABB::from_corners([min_x, min_y], [max_x, max_y]),
                })
            })
            .collect();

        let tree = RTree::bulk_load(indexed);
        info!("Spatial index built with {} entries", tree.size());

        Self {
            tree,
            municipalities,
        }
    }

    /// Layer positions of every municipality intersecting the point (boundary inclusive)
    pub fn lookup(&self, point: Point<f64>) -> Vec<usize> {
        let query_envelope = AABB::from_point([point.x(), point.y()]);

        // Envelope candidates from the R-tree, then the exact predicate
        let mut hits: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&query_envelope)
            .filter(|im| self.municipalities[im.index].geometry.intersects(&point))
            .map(|im| im.index)
            .collect();
        hits.sort_unstable();
        hits
    }

    pub fn municipality(&self, index: usize) -> &Municipality {
        &self.municipalities[index]
    }

    /// Get total number of indexed municipalities
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, MultiPolygon};

    fn square(name: &str, x0: f64, y0: f64) -> Municipality {
        Municipality::new(
            name,
            MultiPolygon::new(vec![polygon![
                (x: x0, y: y0),
                (x: x0 + 10.0, y: y0),
                (x: x0 + 10.0, y: y0 + 10.0),
                (x: x0, y: y0 + 10.0),
            ]]),
        )
    }

    #[test]
    fn test_empty_index() {
        let index = MunicipalityIndex::build(&[]);
        assert!(index.is_empty());
        assert!(index.lookup(Point::new(8.5, 47.4)).is_empty());
    }

    #[test]
    fn test_lookup_inside_and_outside() {
        let ms = vec![square("A", 0.0, 0.0), square("B", 20.0, 0.0)];
        let index = MunicipalityIndex::build(&ms);
        assert_eq!(index.len(), 2);
        assert_eq!(index.lookup(Point::new(25.0, 5.0)), vec![1]);
        assert_eq!(index.municipality(1).name, "B");
        assert!(index.lookup(Point::new(15.0, 5.0)).is_empty());
    }

    #[test]
    fn test_shared_border_hits_both() {
        let ms = vec![square("A", 0.0, 0.0), square("B", 10.0, 0.0)];
        let index = MunicipalityIndex::build(&ms);
        assert_eq!(index.lookup(Point::new(10.0, 5.0)), vec![0, 1]);
    }
}
