//! GeoPackage binary geometry and WKB decoding for (multi)polygons.
//!
//! Parsing is done by `geozero`; [`PolygonCollector`] turns the processor
//! events into `geo` polygons.

use geo::{Coord, LineString, MultiPolygon, Polygon};
use geozero::error::Result as GeozeroResult;
use geozero::wkb::{GpkgWkb, Wkb};
use geozero::{GeomProcessor, GeozeroGeometry};

use crate::error::Result;

/// Decoded GeoPackage geometry blob
#[derive(Debug, Clone, PartialEq)]
pub enum GpkgGeometry {
    Empty,
    Polygonal(MultiPolygon<f64>),
    /// Any non-polygonal geometry, by type name
    Other(&'static str),
}

/// Decode a GeoPackage geometry blob (`GP` header followed by WKB).
pub fn decode_gpkg(blob: &[u8]) -> Result<GpkgGeometry> {
    let mut collector = PolygonCollector::default();
    GpkgWkb(blob.to_vec()).process_geom(&mut collector)?;
    Ok(collector.finish())
}

/// Decode a WKB geometry, keeping polygons and multipolygons.
pub fn decode_wkb(bytes: &[u8]) -> Result<GpkgGeometry> {
    let mut collector = PolygonCollector::default();
    Wkb(bytes.to_vec()).process_geom(&mut collector)?;
    Ok(collector.finish())
}

/// Collects polygon rings from geozero events.
///
/// Size hints from the input are not used for allocation; a corrupt count
/// ends in a read error once the data runs out.
#[derive(Default)]
struct PolygonCollector {
    polygons: Vec<Polygon<f64>>,
    rings: Vec<LineString<f64>>,
    coords: Vec<Coord<f64>>,
    other: Option<&'static str>,
}

impl PolygonCollector {
    fn finish(self) -> GpkgGeometry {
        if let Some(kind) = self.other {
            GpkgGeometry::Other(kind)
        } else if self.polygons.is_empty() {
            GpkgGeometry::Empty
        } else {
            GpkgGeometry::Polygonal(MultiPolygon::new(self.polygons))
        }
    }

    fn mark_other(&mut self, kind: &'static str) {
        self.other.get_or_insert(kind);
    }
}

impl GeomProcessor for PolygonCollector {
    fn xy(&mut self, x: f64, y: f64, _idx: usize) -> GeozeroResult<()> {
        if self.other.is_none() {
            self.coords.push(Coord { x, y });
        }
        Ok(())
    }

    fn empty_point(&mut self, _idx: usize) -> GeozeroResult<()> {
        self.mark_other("Point");
        Ok(())
    }

    fn point_begin(&mut self, _idx: usize) -> GeozeroResult<()> {
        self.mark_other("Point");
        Ok(())
    }

    fn multipoint_begin(&mut self, _size: usize, _idx: usize) -> GeozeroResult<()> {
        self.mark_other("MultiPoint");
        Ok(())
    }

    fn linestring_begin(&mut self, tagged: bool, _size: usize, _idx: usize) -> GeozeroResult<()> {
        if tagged {
            self.mark_other("LineString");
        }
        self.coords.clear();
        Ok(())
    }

    fn linestring_end(&mut self, tagged: bool, _idx: usize) -> GeozeroResult<()> {
        let coords = std::mem::take(&mut self.coords);
        if !tagged && self.other.is_none() {
            self.rings.push(LineString::new(coords));
        }
        Ok(())
    }

    fn multilinestring_begin(&mut self, _size: usize, _idx: usize) -> GeozeroResult<()> {
        self.mark_other("MultiLineString");
        Ok(())
    }

    fn polygon_begin(&mut self, _tagged: bool, _size: usize, _idx: usize) -> GeozeroResult<()> {
        self.rings.clear();
        Ok(())
    }

    fn polygon_end(&mut self, _tagged: bool, _idx: usize) -> GeozeroResult<()> {
        let mut rings = std::mem::take(&mut self.rings).into_iter();
        if let Some(exterior) = rings.next() {
            self.polygons.push(Polygon::new(exterior, rings.collect()));
        }
        Ok(())
    }

    fn geometrycollection_begin(&mut self, _size: usize, _idx: usize) -> GeozeroResult<()> {
        self.mark_other("GeometryCollection");
        Ok(())
    }
}
