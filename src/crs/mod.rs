//! Coordinate reference systems and transforms between them.
//!
//! Only the systems this tool meets in practice are supported: WGS84 for the
//! Overpass results and Amersfoort / RD New for the Dutch boundary files.

mod helmert;
mod sterea;

pub use helmert::{Ellipsoid, Helmert, BESSEL_1841, WGS84};
pub use sterea::ObliqueStereographic;

use geo::{Coord, MapCoords, MultiPolygon, Point};

use crate::error::{Error, Result};

/// RD New `+towgs84` parameters (EPSG:15739 style, position vector)
const RD_TOWGS84: [f64; 7] = [
    565.417, 50.3319, 465.552, -0.398957, 0.343988, -1.8774, 4.0725,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crs {
    /// EPSG:4326, lon/lat in degrees
    Wgs84,
    /// EPSG:28992, Amersfoort / RD New
    RdNew,
}

impl Crs {
    /// Resolve an `organization:code` pair as stored in `gpkg_spatial_ref_sys`
    pub fn from_authority(organization: &str, code: i64) -> Result<Self> {
        if organization.eq_ignore_ascii_case("EPSG") {
            match code {
                4326 => return Ok(Crs::Wgs84),
                28992 => return Ok(Crs::RdNew),
                _ => {}
            }
        }
        Err(Error::UnsupportedCrs {
            organization: organization.to_string(),
            code,
        })
    }

    pub fn epsg(&self) -> i64 {
        match self {
            Crs::Wgs84 => 4326,
            Crs::RdNew => 28992,
        }
    }

    /// Transform a WGS84 (lon, lat) coordinate into this CRS
    pub fn project(&self, c: Coord<f64>) -> Coord<f64> {
        match self {
            Crs::Wgs84 => c,
            Crs::RdNew => {
                let wgs = WGS84.geocentric(c.x.to_radians(), c.y.to_radians(), 0.0);
                let local = rd_datum().inverse(wgs);
                let (lon, lat, _) = BESSEL_1841.geodetic(local);
                let (x, y) = rd_projection().forward(lon, lat);
                Coord { x, y }
            }
        }
    }

    /// Transform a coordinate in this CRS into WGS84 (lon, lat)
    pub fn unproject(&self, c: Coord<f64>) -> Coord<f64> {
        match self {
            Crs::Wgs84 => c,
            Crs::RdNew => {
                let (lon, lat) = rd_projection().inverse(c.x, c.y);
                let datum = rd_datum();

                // Pick the Bessel height that lands on the WGS84 ellipsoid (h = 0),
                // mirroring `project` which starts from h = 0.
                let mut h = 0.0;
                let mut result = (lon, lat);
                for _ in 0..4 {
                    let wgs = datum.forward(BESSEL_1841.geocentric(lon, lat, h));
                    let (wlon, wlat, wh) = WGS84.geodetic(wgs);
                    result = (wlon, wlat);
                    h -= wh;
                }

                Coord {
                    x: result.0.to_degrees(),
                    y: result.1.to_degrees(),
                }
            }
        }
    }
}

impl std::fmt::Display for Crs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EPSG:{}", self.epsg())
    }
}

fn rd_projection() -> ObliqueStereographic {
    ObliqueStereographic::new(
        BESSEL_1841,
        52.156_160_555_555_55,
        5.387_638_888_888_89,
        0.999_907_9,
        155_000.0,
        463_000.0,
    )
}

fn rd_datum() -> Helmert {
    Helmert::from_towgs84(RD_TOWGS84)
}

/// Reprojects geometries from one CRS to another, going through WGS84.
#[derive(Debug, Clone, Copy)]
pub struct Transformer {
    from: Crs,
    to: Crs,
}

impl Transformer {
    pub fn new(from: Crs, to: Crs) -> Self {
        Self { from, to }
    }

    pub fn transform(&self, c: Coord<f64>) -> Coord<f64> {
        if self.from == self.to {
            return c;
        }
        self.to.project(self.from.unproject(c))
    }

    pub fn transform_point(&self, p: Point<f64>) -> Point<f64> {
        Point::from(self.transform(p.0))
    }

    pub fn transform_multi_polygon(&self, mp: &MultiPolygon<f64>) -> MultiPolygon<f64> {
        if self.from == self.to {
            return mp.clone();
        }
        mp.map_coords(|c| self.transform(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use geo::coord;

    #[test]
    fn test_from_authority() {
        assert_eq!(Crs::from_authority("EPSG", 28992).unwrap(), Crs::RdNew);
        assert_eq!(Crs::from_authority("epsg", 4326).unwrap(), Crs::Wgs84);
        assert!(matches!(
            Crs::from_authority("EPSG", 3857),
            Err(Error::UnsupportedCrs { code: 3857, .. })
        ));
    }

    #[test]
    fn test_amersfoort_reference_point() {
        // WGS84 position of the RD false origin
        let rd = Crs::RdNew.project(coord! { x: 5.38720621, y: 52.15517440 });
        assert_abs_diff_eq!(rd.x, 155_000.0, epsilon = 2.0);
        assert_abs_diff_eq!(rd.y, 463_000.0, epsilon = 2.0);
    }

    #[test]
    fn test_round_trip_through_rd() {
        for (lon, lat) in [(4.9, 52.3), (3.36, 51.37), (7.2, 53.3), (5.69, 50.85)] {
            let rd = Crs::RdNew.project(coord! { x: lon, y: lat });
            let back = Crs::RdNew.unproject(rd);
            assert_abs_diff_eq!(back.x, lon, epsilon = 1e-8);
            assert_abs_diff_eq!(back.y, lat, epsilon = 1e-8);
        }
    }

    #[test]
    fn test_wgs84_is_identity() {
        let t = Transformer::new(Crs::Wgs84, Crs::Wgs84);
        let c = coord! { x: 4.9, y: 52.3 };
        assert_eq!(t.transform(c), c);
    }

    #[test]
    fn test_transformer_targets_layer_crs() {
        let t = Transformer::new(Crs::Wgs84, Crs::RdNew);
        let p = t.transform_point(Point::new(4.9, 52.37));
        // Amsterdam is roughly at RD (121000, 487000)
        assert!((p.x() - 121_000.0).abs() < 2_000.0);
        assert!((p.y() - 487_000.0).abs() < 2_000.0);
    }
}
