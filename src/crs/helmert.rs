//! Ellipsoids, geocentric conversion and the 7-parameter Helmert datum shift.

/// Reference ellipsoid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    /// Semi-major axis in metres
    pub a: f64,
    /// First eccentricity squared
    pub es: f64,
}

impl Ellipsoid {
    pub fn from_inverse_flattening(a: f64, rf: f64) -> Self {
        let f = 1.0 / rf;
        Self {
            a,
            es: 2.0 * f - f * f,
        }
    }

    pub fn e(&self) -> f64 {
        self.es.sqrt()
    }

    /// (lon, lat, h) in radians/metres to geocentric XYZ
    pub fn geocentric(&self, lon: f64, lat: f64, h: f64) -> [f64; 3] {
        let (sin_lat, cos_lat) = lat.sin_cos();
        let n = self.a / (1.0 - self.es * sin_lat * sin_lat).sqrt();
        [
            (n + h) * cos_lat * lon.cos(),
            (n + h) * cos_lat * lon.sin(),
            (n * (1.0 - self.es) + h) * sin_lat,
        ]
    }

    /// Geocentric XYZ to (lon, lat, h) in radians/metres
    pub fn geodetic(&self, xyz: [f64; 3]) -> (f64, f64, f64) {
        let [x, y, z] = xyz;
        let p = x.hypot(y);
        let lon = y.atan2(x);

        let mut lat = z.atan2(p * (1.0 - self.es));
        let mut h = 0.0;
        for _ in 0..10 {
            let sin_lat = lat.sin();
            let n = self.a / (1.0 - self.es * sin_lat * sin_lat).sqrt();
            h = p / lat.cos() - n;
            let next = z.atan2(p * (1.0 - self.es * n / (n + h)));
            let done = (next - lat).abs() < 1e-14;
            lat = next;
            if done {
                break;
            }
        }

        (lon, lat, h)
    }
}

/// a = 6378137, 1/f = 298.257223563
pub const WGS84: Ellipsoid = Ellipsoid {
    a: 6_378_137.0,
    es: 0.006_694_379_990_141_316_5,
};

/// a = 6377397.155, 1/f = 299.1528128
pub const BESSEL_1841: Ellipsoid = Ellipsoid {
    a: 6_377_397.155,
    es: 0.006_674_372_231_802_145,
};

/// Seven-parameter similarity transform, position vector convention (EPSG:9606).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Helmert {
    translation: [f64; 3],
    /// (1 + s) * R
    matrix: [[f64; 3]; 3],
}

const ARCSEC: f64 = std::f64::consts::PI / (180.0 * 3600.0);

impl Helmert {
    /// Translations in metres, rotations in arc seconds, scale in ppm (the `+towgs84` layout)
    pub fn from_towgs84(params: [f64; 7]) -> Self {
        let [tx, ty, tz, rx, ry, rz, ppm] = params;
        let (rx, ry, rz) = (rx * ARCSEC, ry * ARCSEC, rz * ARCSEC);
        let m = 1.0 + ppm * 1e-6;
        Self {
            translation: [tx, ty, tz],
            matrix: [
                [m, -m * rz, m * ry],
                [m * rz, m, -m * rx],
                [-m * ry, m * rx, m],
            ],
        }
    }

    /// Source datum to WGS84
    pub fn forward(&self, xyz: [f64; 3]) -> [f64; 3] {
        let r = &self.matrix;
        let t = &self.translation;
        [
            t[0] + r[0][0] * xyz[0] + r[0][1] * xyz[1] + r[0][2] * xyz[2],
            t[1] + r[1][0] * xyz[0] + r[1][1] * xyz[1] + r[1][2] * xyz[2],
            t[2] + r[2][0] * xyz[0] + r[2][1] * xyz[1] + r[2][2] * xyz[2],
        ]
    }

    /// WGS84 to source datum; exact inverse of [`Helmert::forward`]
    pub fn inverse(&self, xyz: [f64; 3]) -> [f64; 3] {
        let d = [
            xyz[0] - self.translation[0],
            xyz[1] - self.translation[1],
            xyz[2] - self.translation[2],
        ];
        let r = &self.matrix;

        // Cramer's rule on the 3x3 system r * x = d
        let det = r[0][0] * (r[1][1] * r[2][2] - r[1][2] * r[2][1])
            - r[0][1] * (r[1][0] * r[2][2] - r[1][2] * r[2][0])
            + r[0][2] * (r[1][0] * r[2][1] - r[1][1] * r[2][0]);

        let solve = |col: usize| {
            let mut m = *r;
            for (row, value) in d.iter().enumerate() {
                m[row][col] = *value;
            }
            (m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
                - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
                + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0]))
                / det
        };

        [solve(0), solve(1), solve(2)]
    }
}
