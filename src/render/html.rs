//! Interactive choropleth as a standalone Leaflet page.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use geojson::{Feature, FeatureCollection, GeoJson, JsonObject};
use tracing::info;

use super::colormap::{GraduatedScale, BUPU_6};
use crate::crs::{Crs, Transformer};
use crate::models::CountTable;

/// Presentation settings for the HTML map
#[derive(Debug, Clone)]
pub struct HtmlMapOptions {
    /// Initial view as [lat, lon]
    pub center: [f64; 2],
    pub zoom: u8,
    pub fill_opacity: f64,
    pub line_opacity: f64,
    pub legend_name: String,
    /// Feature property the counts are keyed on
    pub name_field: String,
}

impl Default for HtmlMapOptions {
    fn default() -> Self {
        Self {
            center: [52.552, 5.150],
            zoom: 8,
            fill_opacity: 0.7,
            line_opacity: 0.7,
            legend_name: String::new(),
            name_field: "gemeentenaam".to_string(),
        }
    }
}

const TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<!-- generated by poimap at __GENERATED__ -->
<title>__TITLE__</title>
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css">
<script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
<style>
html, body, #map { width: 100%; height: 100%; margin: 0; padding: 0; }
.legend { background: white; padding: 6px 8px; font: 12px sans-serif; border-radius: 4px; box-shadow: 0 0 8px rgba(0,0,0,0.3); }
.legend i { width: 18px; height: 12px; float: left; margin-right: 6px; opacity: __FILL_OPACITY__; }
</style>
</head>
<body>
<div id="map"></div>
<script>
const boundaries = __GEOJSON__;
const counts = __COUNTS__;
const nameField = __NAME_FIELD__;
const thresholds = __THRESHOLDS__;
const colors = __COLORS__;

function escapeHtml(text) {
  return String(text)
    .replace(/&/g, '&amp;')
    .replace(/</g, '&lt;')
    .replace(/>/g, '&gt;')
    .replace(/"/g, '&quot;');
}

function colorFor(value) {
  for (let i = colors.length - 1; i > 0; i--) {
    if (value >= thresholds[i]) return colors[i];
  }
  return colors[0];
}

const map = L.map('map').setView([__LAT__, __LON__], __ZOOM__);
L.tileLayer('https://tile.openstreetmap.org/{z}/{x}/{y}.png', {
  maxZoom: 19,
  attribution: '&copy; OpenStreetMap contributors'
}).addTo(map);

L.geoJSON(boundaries, {
  style: function (feature) {
    const value = counts[feature.properties[nameField]];
    return {
      fillColor: value === undefined ? 'black' : colorFor(value),
      fillOpacity: __FILL_OPACITY__,
      color: 'black',
      weight: 1,
      opacity: __LINE_OPACITY__
    };
  },
  onEachFeature: function (feature, layer) {
    const name = feature.properties[nameField];
    layer.bindTooltip(escapeHtml(name) + ': ' + (counts[name] ?? 0));
  }
}).addTo(map);

const legend = L.control({position: 'topright'});
legend.onAdd = function () {
  const div = L.DomUtil.create('div', 'legend');
  let html = '<b>' + __LEGEND__ + '</b><br>';
  for (let i = 0; i < colors.length; i++) {
    html += '<i style="background:' + colors[i] + '"></i>' +
      Math.round(thresholds[i]) + '&ndash;' + Math.round(thresholds[i + 1]) + '<br>';
  }
  div.innerHTML = html;
  return div;
};
legend.addTo(map);
</script>
</body>
</html>
"#;

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// JSON safe to embed inside a `<script>` element
fn script_json(value: &impl serde::Serialize) -> Result<String> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

/// WGS84 FeatureCollection with name and count properties
fn feature_collection(table: &CountTable, name_field: &str) -> FeatureCollection {
    let transformer = Transformer::new(table.crs, Crs::Wgs84);
    let features = table
        .iter()
        .map(|row| {
            let geometry = transformer.transform_multi_polygon(&row.geometry);
            let mut properties = JsonObject::new();
            properties.insert(name_field.to_string(), row.name.clone().into());
            properties.insert("count".to_string(), row.count.into());
            Feature {
                bbox: None,
                geometry: Some(geojson::Geometry::new(geojson::Value::from(&geometry))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// Render the full HTML document
pub fn render_html(table: &CountTable, options: &HtmlMapOptions) -> Result<String> {
    let scale = GraduatedScale::equal_interval(
        &BUPU_6,
        table.min_count() as f64,
        table.max_count() as f64,
    );
    let colors: Vec<String> = scale.colors.iter().map(|c| c.to_hex()).collect();

    let counts: BTreeMap<&str, u64> = table.iter().map(|r| (r.name.as_str(), r.count)).collect();
    let geojson = GeoJson::from(feature_collection(table, &options.name_field));

    Ok(TEMPLATE
        .replace("__GENERATED__", &Utc::now().to_rfc3339())
        .replace("__TITLE__", &escape_html(&options.legend_name))
        .replace("__GEOJSON__", &script_json(&geojson)?)
        .replace("__COUNTS__", &script_json(&counts)?)
        .replace("__NAME_FIELD__", &script_json(&options.name_field)?)
        .replace("__THRESHOLDS__", &script_json(&scale.thresholds)?)
        .replace("__COLORS__", &script_json(&colors)?)
        .replace("__LEGEND__", &script_json(&escape_html(&options.legend_name))?)
        .replace("__LAT__", &options.center[0].to_string())
        .replace("__LON__", &options.center[1].to_string())
        .replace("__ZOOM__", &options.zoom.to_string())
        .replace("__FILL_OPACITY__", &options.fill_opacity.to_string())
        .replace("__LINE_OPACITY__", &options.line_opacity.to_string()))
}

pub fn write_html(path: &Path, table: &CountTable, options: &HtmlMapOptions) -> Result<()> {
    let html = render_html(table, options)?;
    std::fs::write(path, html).with_context(|| format!("writing {}", path.display()))?;
    info!("Interactive map written to {}", path.display());
    Ok(())
}
