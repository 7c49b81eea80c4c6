//! Point-of-interest counts per municipality.
//!
//! Fetches OSM features from Overpass, joins them against municipal
//! boundaries and writes a point map, a choropleth, an interactive HTML map
//! and a CSV of counts.

mod config;

use std::fs::{self, File};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;
use url::Url;

use poimap::boundaries::{download_archive, download_client, extract_zip_archive, load_boundaries};
use poimap::overpass::{extract_coordinates, LongitudeFilter, OverpassClient, OverpassQuery};
use poimap::pip::aggregate;
use poimap::render::{plot_choropleth, plot_points, write_html, HtmlMapOptions};

use crate::config::Config;

#[derive(Parser, Debug)]
#[command(name = "poimap")]
#[command(about = "Count OpenStreetMap features per municipality and map them")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// ISO3166-1 country code of the search area
    #[arg(long)]
    area: Option<String>,

    /// Tag key to match, e.g. amenity
    #[arg(long)]
    key: Option<String>,

    /// Tag value to match, e.g. post_box
    #[arg(long)]
    value: Option<String>,

    /// Directory for the generated maps
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Local boundary file (GeoPackage or GeoJSON); skips the archive download
    #[arg(long)]
    boundary_file: Option<PathBuf>,

    /// Skip the PNG figures
    #[arg(long)]
    no_plots: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn apply(&self, config: &mut Config) {
        if let Some(area) = &self.area {
            config.query.area = area.clone();
        }
        if let Some(key) = &self.key {
            config.query.key = key.clone();
        }
        if let Some(value) = &self.value {
            config.query.value = value.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output.dir = dir.clone();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = match &args.config {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => Config::default(),
    };
    args.apply(&mut config);

    info!("poimap {}", env!("CARGO_PKG_VERSION"));

    let client = OverpassClient::new(
        &config.overpass.endpoint,
        Duration::from_secs(config.overpass.timeout_secs),
    )?;

    // Boundaries
    let boundary_path = match (&args.boundary_file, &config.boundaries.archive_url) {
        (Some(path), _) => path.clone(),
        (None, Some(archive_url)) => {
            let url = Url::parse(archive_url)
                .with_context(|| format!("invalid archive URL {}", archive_url))?;
            let http =
                download_client(Duration::from_secs(config.boundaries.download_timeout_secs))?;
            let archive = download_archive(&http, &url, &config.boundaries.download_dir).await?;
            extract_zip_archive(&archive, &config.boundaries.download_dir)?;
            config.boundaries.path()
        }
        (None, None) => config.boundaries.path(),
    };

    let layer = load_boundaries(
        &boundary_path,
        config.boundaries.layer.as_deref(),
        &config.boundaries.name_field,
    )
    .with_context(|| format!("loading boundaries from {}", boundary_path.display()))?;
    info!(
        "Loaded {} municipalities ({})",
        layer.len(),
        layer.crs
    );

    // Points
    let mut query = OverpassQuery::new(
        config.query.area.clone(),
        config.query.key.clone(),
        config.query.value.clone(),
    );
    if let Some(secs) = config.overpass.server_timeout_secs {
        query = query.with_timeout(secs);
    }

    let response = client.fetch(&query).await?;
    let mut coords = extract_coordinates(response);
    if config.region.filter_longitude {
        let filter = LongitudeFilter::new(config.region.min_longitude);
        let before = coords.len();
        coords = filter.apply(coords);
        info!(
            "Dropped {} points at or west of longitude {}",
            before - coords.len(),
            filter.min_lon
        );
    }
    info!("{} data points found for '{}'.", coords.len(), config.query.value);
    if coords.is_empty() {
        warn!("No points to join; every municipality will have count 0");
    }

    // Join
    let (points, table) = aggregate(&layer, &coords);

    // Output
    let out = &config.output;
    fs::create_dir_all(&out.dir).with_context(|| format!("creating {}", out.dir.display()))?;

    if !args.no_plots {
        plot_points(&out.dir.join(&out.points_png), &layer, &points, out.width)?;
        plot_choropleth(&out.dir.join(&out.choropleth_png), &table, out.width)?;
    }

    let options = HtmlMapOptions {
        center: [config.map.center_lat, config.map.center_lon],
        zoom: config.map.zoom,
        fill_opacity: config.map.fill_opacity,
        line_opacity: config.map.line_opacity,
        legend_name: config.query.value.clone(),
        name_field: config.boundaries.name_field.clone(),
    };
    write_html(&out.dir.join(&out.html), &table, &options)?;

    let csv_path = out.dir.join(&out.counts_csv);
    let file = File::create(&csv_path).with_context(|| format!("creating {}", csv_path.display()))?;
    table.write_csv(file)?;
    info!("Counts written to {}", csv_path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_config() {
        let args = Args::parse_from([
            "poimap",
            "--key",
            "shop",
            "--value",
            "bakery",
            "--output-dir",
            "maps",
            "--no-plots",
        ]);
        let mut config = Config::default();
        args.apply(&mut config);

        assert!(args.no_plots);
        assert_eq!(config.query.area, "NL");
        assert_eq!(config.query.key, "shop");
        assert_eq!(config.query.value, "bakery");
        assert_eq!(config.output.dir, PathBuf::from("maps"));
    }
}
