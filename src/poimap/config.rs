use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use poimap::overpass::{DEFAULT_ENDPOINT, EUROPEAN_NETHERLANDS_MIN_LON};

pub const DEFAULT_ARCHIVE_URL: &str =
    "https://www.imergis.nl/gpkg/2019_voorlopige_bestuurlijke_grenzen_imergis_gpkg.zip";

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub overpass: OverpassConfig,
    pub query: QueryConfig,
    pub region: RegionConfig,
    pub boundaries: BoundaryConfig,
    pub output: OutputConfig,
    pub map: MapConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OverpassConfig {
    pub endpoint: String,
    /// Client-side HTTP timeout
    pub timeout_secs: u64,
    /// Server-side `[timeout:N]` setting, omitted when unset
    pub server_timeout_secs: Option<u64>,
}

impl Default for OverpassConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: 180,
            server_timeout_secs: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct QueryConfig {
    pub area: String,
    pub key: String,
    pub value: String,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            area: "NL".to_string(),
            key: "amenity".to_string(),
            value: "post_box".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RegionConfig {
    /// Drop coordinates at or west of `min_longitude`
    pub filter_longitude: bool,
    pub min_longitude: f64,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            filter_longitude: true,
            min_longitude: EUROPEAN_NETHERLANDS_MIN_LON,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BoundaryConfig {
    /// Archive to download and unpack; the file is read from disk when unset
    pub archive_url: Option<String>,
    /// Overall limit for the archive transfer
    pub download_timeout_secs: u64,
    pub download_dir: PathBuf,
    /// Boundary file, relative to `download_dir`
    pub file: PathBuf,
    /// GeoPackage layer; first feature table when unset
    pub layer: Option<String>,
    pub name_field: String,
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self {
            archive_url: Some(DEFAULT_ARCHIVE_URL.to_string()),
            download_timeout_secs: 3600,
            download_dir: PathBuf::from("data"),
            file: PathBuf::from("2019_gemeentegrenzen_kustlijn.gpkg"),
            layer: None,
            name_field: "gemeentenaam".to_string(),
        }
    }
}

impl BoundaryConfig {
    pub fn path(&self) -> PathBuf {
        self.download_dir.join(&self.file)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub points_png: String,
    pub choropleth_png: String,
    pub html: String,
    pub counts_csv: String,
    /// Width of the PNG figures in pixels
    pub width: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            points_png: "points.png".to_string(),
            choropleth_png: "counts.png".to_string(),
            html: "map.html".to_string(),
            counts_csv: "counts.csv".to_string(),
            width: 1200,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MapConfig {
    pub center_lat: f64,
    pub center_lon: f64,
    pub zoom: u8,
    pub fill_opacity: f64,
    pub line_opacity: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center_lat: 52.552,
            center_lon: 5.150,
            zoom: 8,
            fill_opacity: 0.7,
            line_opacity: 0.7,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_run() {
        let config = Config::default();
        assert_eq!(config.query.area, "NL");
        assert_eq!(config.query.value, "post_box");
        assert_eq!(config.region.min_longitude, 3.0);
        assert_eq!(
            config.boundaries.path(),
            PathBuf::from("data/2019_gemeentegrenzen_kustlijn.gpkg")
        );
        assert_eq!(config.boundaries.archive_url.as_deref(), Some(DEFAULT_ARCHIVE_URL));
        assert!(config.boundaries.download_timeout_secs > config.overpass.timeout_secs);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [query]
            key = "amenity"
            value = "atm"

            [region]
            filter_longitude = false

            [boundaries]
            download_dir = "/tmp/grenzen"
            layer = "gemeenten"

            [output]
            dir = "out"
            "#,
        )
        .unwrap();

        assert_eq!(config.query.area, "NL");
        assert_eq!(config.query.value, "atm");
        assert!(!config.region.filter_longitude);
        assert_eq!(config.boundaries.layer.as_deref(), Some("gemeenten"));
        assert_eq!(config.boundaries.name_field, "gemeentenaam");
        assert_eq!(config.output.dir, PathBuf::from("out"));
        assert_eq!(config.output.html, "map.html");
        assert_eq!(config.overpass.timeout_secs, 180);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("poimap.toml");
        fs::write(&path, "[overpass]\nserver_timeout_secs = 60\n").unwrap();
        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.overpass.server_timeout_secs, Some(60));
        assert!(Config::load_from_file(dir.path().join("missing.toml")).is_err());
    }
}
