//! Oblique stereographic projection (EPSG:9809, double projection via the
//! conformal sphere).

use std::f64::consts::FRAC_PI_4;

use super::helmert::Ellipsoid;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObliqueStereographic {
    ellipsoid: Ellipsoid,
    lon0: f64,
    k0: f64,
    false_easting: f64,
    false_northing: f64,
    /// Radius of the conformal sphere
    r: f64,
    n: f64,
    c: f64,
    chi0: f64,
}

impl ObliqueStereographic {
    /// Origin in degrees, scale factor, false easting/northing in metres
    pub fn new(
        ellipsoid: Ellipsoid,
        lat0_deg: f64,
        lon0_deg: f64,
        k0: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Self {
        let lat0 = lat0_deg.to_radians();
        let es = ellipsoid.es;
        let e = ellipsoid.e();
        let sin0 = lat0.sin();

        let rho0 = ellipsoid.a * (1.0 - es) / (1.0 - es * sin0 * sin0).powf(1.5);
        let nu0 = ellipsoid.a / (1.0 - es * sin0 * sin0).sqrt();
        let r = (rho0 * nu0).sqrt();
        let n = (1.0 + es * lat0.cos().powi(4) / (1.0 - es)).sqrt();

        let s1 = (1.0 + sin0) / (1.0 - sin0);
        let s2 = (1.0 - e * sin0) / (1.0 + e * sin0);
        let w1 = (s1 * s2.powf(e)).powf(n);
        let sin_chi00 = (w1 - 1.0) / (w1 + 1.0);
        let c = (n + sin0) * (1.0 - sin_chi00) / ((n - sin0) * (1.0 + sin_chi00));
        let w2 = c * w1;
        let chi0 = ((w2 - 1.0) / (w2 + 1.0)).asin();

        Self {
            ellipsoid,
            lon0: lon0_deg.to_radians(),
            k0,
            false_easting,
            false_northing,
            r,
            n,
            c,
            chi0,
        }
    }

    /// Geodetic (lon, lat) in radians to projected (x, y) in metres
    pub fn forward(&self, lon: f64, lat: f64) -> (f64, f64) {
        let e = self.ellipsoid.e();
        let sin_lat = lat.sin();
        let sa = (1.0 + sin_lat) / (1.0 - sin_lat);
        let sb = (1.0 - e * sin_lat) / (1.0 + e * sin_lat);
        let w = self.c * (sa * sb.powf(e)).powf(self.n);
        let chi = ((w - 1.0) / (w + 1.0)).asin();
        let dlambda = self.n * (lon - self.lon0);

        let (sin_chi, cos_chi) = chi.sin_cos();
        let (sin_chi0, cos_chi0) = self.chi0.sin_cos();
        let b = 1.0 + sin_chi * sin_chi0 + cos_chi * cos_chi0 * dlambda.cos();
        let two_rk = 2.0 * self.r * self.k0;

        (
            self.false_easting + two_rk * cos_chi * dlambda.sin() / b,
            self.false_northing + two_rk * (sin_chi * cos_chi0 - cos_chi * sin_chi0 * dlambda.cos()) / b,
        )
    }

    /// Projected (x, y) in metres to geodetic (lon, lat) in radians
    pub fn inverse(&self, x: f64, y: f64) -> (f64, f64) {
        let x = x - self.false_easting;
        let y = y - self.false_northing;
        let rho = x.hypot(y);
        let (sin_chi0, cos_chi0) = self.chi0.sin_cos();

        let (chi, dlambda) = if rho < 1e-12 {
            (self.chi0, 0.0)
        } else {
            let ce = 2.0 * (rho / (2.0 * self.r * self.k0)).atan();
            let (sin_ce, cos_ce) = ce.sin_cos();
            let chi = (cos_ce * sin_chi0 + y * sin_ce * cos_chi0 / rho).asin();
            let dlambda = (x * sin_ce).atan2(rho * cos_chi0 * cos_ce - y * sin_chi0 * sin_ce);
            (chi, dlambda)
        };

        let lon = dlambda / self.n + self.lon0;

        // Isometric latitude on the ellipsoid, then iterate for geodetic latitude
        let sin_chi = chi.sin();
        let psi = 0.5 * ((1.0 + sin_chi) / (self.c * (1.0 - sin_chi))).ln() / self.n;
        let e = self.ellipsoid.e();
        let mut lat = 2.0 * psi.exp().atan() - 2.0 * FRAC_PI_4;
        for _ in 0..15 {
            let next = (psi + e * (e * lat.sin()).atanh()).tanh().asin();
            let done = (next - lat).abs() < 1e-15;
            lat = next;
            if done {
                break;
            }
        }

        (lon, lat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crs::helmert::BESSEL_1841;
    use approx::assert_abs_diff_eq;

    fn rd() -> ObliqueStereographic {
        ObliqueStereographic::new(
            BESSEL_1841,
            52.15616055555555,
            5.38763888888889,
            0.9999079,
            155_000.0,
            463_000.0,
        )
    }

    #[test]
    fn test_origin_maps_to_false_origin() {
        let proj = rd();
        let (x, y) = proj.forward(5.38763888888889f64.to_radians(), 52.15616055555555f64.to_radians());
        assert_abs_diff_eq!(x, 155_000.0, epsilon = 1e-6);
        assert_abs_diff_eq!(y, 463_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_inverse_undoes_forward() {
        let proj = rd();
        for (lon, lat) in [(3.4, 51.4), (7.1, 53.4), (4.9, 52.37), (5.9, 50.8)] {
            let (x, y) = proj.forward(f64::to_radians(lon), f64::to_radians(lat));
            let (lon2, lat2) = proj.inverse(x, y);
            assert_abs_diff_eq!(lon, lon2.to_degrees(), epsilon = 1e-10);
            assert_abs_diff_eq!(lat, lat2.to_degrees(), epsilon = 1e-10);
        }
    }
}
