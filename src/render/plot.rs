//! Static PNG figures: point overlay and choropleth.

use std::path::Path;

use anyhow::{Context, Result};
use geo::{Area, MultiPolygon, Point, Rect};
use plotters::prelude::*;
use tracing::info;

use super::colormap::{ListedColormap, Rgb, TAB20B};
use crate::models::boundary::bounding_extent;
use crate::models::{BoundaryLayer, CountTable};

const DARK_GREY: RGBColor = RGBColor(169, 169, 169);
const LIGHT_GREY: RGBColor = RGBColor(211, 211, 211);
const ROYAL_BLUE: RGBAColor = RGBAColor(65, 105, 225, 0.3);

const MARGIN: u32 = 10;

/// Image size and axis ranges keeping a 1:1 aspect ratio over `extent`
fn frame(extent: Rect<f64>, width: u32) -> ((u32, u32), std::ops::Range<f64>, std::ops::Range<f64>) {
    let pad_x = extent.width() * 0.02;
    let pad_y = extent.height() * 0.02;
    let x = (extent.min().x - pad_x)..(extent.max().x + pad_x);
    let y = (extent.min().y - pad_y)..(extent.max().y + pad_y);

    let span_x = (x.end - x.start).max(f64::EPSILON);
    let span_y = (y.end - y.start).max(f64::EPSILON);
    let height = ((width as f64) * span_y / span_x).round().clamp(100.0, 8000.0) as u32;

    ((width + 2 * MARGIN, height + 2 * MARGIN), x, y)
}

fn exterior_rings(mp: &MultiPolygon<f64>) -> impl Iterator<Item = Vec<(f64, f64)>> + '_ {
    mp.0.iter()
        .map(|p| p.exterior().coords().map(|c| (c.x, c.y)).collect())
}

fn plot_color(c: Rgb) -> RGBColor {
    RGBColor(c.0, c.1, c.2)
}

/// Point markers over white municipalities with dark grey outlines.
pub fn plot_points(path: &Path, layer: &BoundaryLayer, points: &[Point<f64>], width: u32) -> Result<()> {
    let extent = layer.extent().context("boundary layer is empty")?;
    let (size, x, y) = frame(extent, width);

    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(MARGIN)
        .build_cartesian_2d(x, y)?;

    for m in &layer.municipalities {
        chart.draw_series(exterior_rings(&m.geometry).map(|ring| Polygon::new(ring, WHITE.filled())))?;
        chart.draw_series(
            exterior_rings(&m.geometry).map(|ring| PathElement::new(ring, DARK_GREY.stroke_width(1))),
        )?;
    }

    chart.draw_series(
        points
            .iter()
            .map(|p| Circle::new((p.x(), p.y()), 3, ROYAL_BLUE.filled())),
    )?;

    root.present()
        .with_context(|| format!("writing {}", path.display()))?;
    info!("Point map written to {}", path.display());
    Ok(())
}

/// Municipalities coloured by count with `tab20b`, light grey outlines.
pub fn plot_choropleth(path: &Path, table: &CountTable, width: u32) -> Result<()> {
    let layer_extent = bounding_extent(table.iter().map(|r| &r.geometry))
        .context("count table is empty")?;
    let (size, x, y) = frame(layer_extent, width);

    let cmap = ListedColormap::new(&TAB20B, table.min_count() as f64, table.max_count() as f64);

    // Larger areas first so enclaves are painted on top
    let mut rows: Vec<_> = table.iter().collect();
    rows.sort_by(|a, b| {
        b.geometry
            .unsigned_area()
            .total_cmp(&a.geometry.unsigned_area())
    });

    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(MARGIN)
        .build_cartesian_2d(x, y)?;

    for row in rows {
        let fill = plot_color(cmap.color(row.count as f64));
        chart.draw_series(exterior_rings(&row.geometry).map(|ring| Polygon::new(ring, fill.filled())))?;
        chart.draw_series(
            exterior_rings(&row.geometry).map(|ring| PathElement::new(ring, LIGHT_GREY.stroke_width(1))),
        )?;
    }

    root.present()
        .with_context(|| format!("writing {}", path.display()))?;
    info!("Choropleth written to {}", path.display());
    Ok(())
}
