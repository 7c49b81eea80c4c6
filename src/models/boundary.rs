//! Municipal boundary polygons.

use geo::{BoundingRect, MultiPolygon, Rect};

use crate::crs::Crs;

/// A single municipality polygon with its name
#[derive(Debug, Clone)]
pub struct Municipality {
    pub name: String,
    pub geometry: MultiPolygon<f64>,
}

impl Municipality {
    pub fn new(name: impl Into<String>, geometry: MultiPolygon<f64>) -> Self {
        Self {
            name: name.into(),
            geometry,
        }
    }

    /// Get the bounding box of this boundary
    pub fn bbox(&self) -> Option<(f64, f64, f64, f64)> {
        self.geometry
            .bounding_rect()
            .map(|rect| (rect.min().x, rect.min().y, rect.max().x, rect.max().y))
    }
}

/// A loaded polygon layer together with the CRS its coordinates are in.
#[derive(Debug, Clone)]
pub struct BoundaryLayer {
    pub name: String,
    pub crs: Crs,
    pub municipalities: Vec<Municipality>,
}

impl BoundaryLayer {
    pub fn new(name: impl Into<String>, crs: Crs, municipalities: Vec<Municipality>) -> Self {
        Self {
            name: name.into(),
            crs,
            municipalities,
        }
    }

    pub fn len(&self) -> usize {
        self.municipalities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.municipalities.is_empty()
    }

    /// Extent of all municipalities, in layer coordinates
    pub fn extent(&self) -> Option<Rect<f64>> {
        bounding_extent(self.municipalities.iter().map(|m| &m.geometry))
    }
}

/// Union of the bounding boxes of `geometries`
pub fn bounding_extent<'a>(geometries: impl Iterator<Item = &'a MultiPolygon<f64>>) -> Option<Rect<f64>> {
    geometries
        .filter_map(|g| g.bounding_rect())
        .reduce(|a, b| {
            Rect::new(
                geo::coord! { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
                geo::coord! { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
            )
        })
}
