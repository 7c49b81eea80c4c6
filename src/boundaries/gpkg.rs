//! GeoPackage polygon layer reader.

use std::path::Path;

use rusqlite::{Connection, OpenFlags, OptionalExtension};
use tracing::{debug, info, warn};

use super::wkb::{decode_gpkg, GpkgGeometry};
use crate::crs::Crs;
use crate::error::{Error, Result};
use crate::models::{BoundaryLayer, Municipality};

/// Load a polygon layer from a GeoPackage.
///
/// Without an explicit `layer`, the first `features` table listed in
/// `gpkg_contents` (by name) is used. Rows with a NULL name or an empty
/// geometry are skipped; non-polygonal geometries are skipped with a warning.
pub fn load_gpkg(path: &Path, layer: Option<&str>, name_field: &str) -> Result<BoundaryLayer> {
    info!("Reading GeoPackage {}", path.display());

    let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;

    let table = resolve_layer(&conn, path, layer)?;

    let (geom_column, srs_id): (String, i64) = conn
        .query_row(
            "SELECT column_name, srs_id FROM gpkg_geometry_columns WHERE table_name = ?1",
            [&table],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?
        .ok_or_else(|| Error::LayerNotFound(table.clone()))?;

    let (organization, code): (String, i64) = conn.query_row(
        "SELECT organization, organization_coordsys_id FROM gpkg_spatial_ref_sys WHERE srs_id = ?1",
        [srs_id],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    let crs = Crs::from_authority(&organization, code)?;
    debug!("Layer {} uses {} (srs_id {})", table, crs, srs_id);

    if !table_columns(&conn, &table)?.iter().any(|c| c == name_field) {
        return Err(Error::AttributeNotFound {
            layer: table,
            attribute: name_field.to_string(),
        });
    }

    let sql = format!(
        "SELECT {}, {} FROM {}",
        quote_ident(name_field),
        quote_ident(&geom_column),
        quote_ident(&table)
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, Option<String>>(0)?,
            row.get::<_, Option<Vec<u8>>>(1)?,
        ))
    })?;

    let mut municipalities = Vec::new();
    let mut skipped = 0usize;

    for row in rows {
        let (name, blob) = row?;
        let (Some(name), Some(blob)) = (name, blob) else {
            skipped += 1;
            continue;
        };

        match decode_gpkg(&blob)? {
            GpkgGeometry::Polygonal(geometry) => {
                municipalities.push(Municipality::new(name, geometry));
            }
            GpkgGeometry::Empty => skipped += 1,
            GpkgGeometry::Other(kind) => {
                warn!("Skipping {}: {} is not polygonal", name, kind);
                skipped += 1;
            }
        }
    }

    info!(
        "Loaded {} boundaries from layer {} ({} skipped)",
        municipalities.len(),
        table,
        skipped
    );

    Ok(BoundaryLayer::new(table, crs, municipalities))
}

fn resolve_layer(conn: &Connection, path: &Path, layer: Option<&str>) -> Result<String> {
    match layer {
        Some(name) => {
            let exists: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM gpkg_contents WHERE table_name = ?1 AND data_type = 'features')",
                [name],
                |row| row.get(0),
            )?;
            if exists {
                Ok(name.to_string())
            } else {
                Err(Error::LayerNotFound(name.to_string()))
            }
        }
        None => conn
            .query_row(
                "SELECT table_name FROM gpkg_contents WHERE data_type = 'features' ORDER BY table_name LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| Error::NoFeatureLayer(path.to_path_buf())),
    }
}

fn table_columns(conn: &Connection, table: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", quote_ident(table)))?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(columns)
}

fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::boundaries::wkb::tests::{gpkg_blob, wkb_polygon};
    use rusqlite::params;

    /// Minimal GeoPackage with one `features` table in RD New
    pub(crate) fn write_gpkg(path: &Path, table: &str, rows: &[(Option<&str>, Vec<(f64, f64)>)]) {
        let conn = Connection::open(path).unwrap();
        conn.execute_batch(&format!(
            "CREATE TABLE gpkg_spatial_ref_sys (
                srs_name TEXT NOT NULL, srs_id INTEGER PRIMARY KEY,
                organization TEXT NOT NULL, organization_coordsys_id INTEGER NOT NULL,
                definition TEXT NOT NULL);
             CREATE TABLE gpkg_contents (
                table_name TEXT PRIMARY KEY, data_type TEXT NOT NULL,
                identifier TEXT, srs_id INTEGER);
             CREATE TABLE gpkg_geometry_columns (
                table_name TEXT NOT NULL, column_name TEXT NOT NULL,
                geometry_type_name TEXT NOT NULL, srs_id INTEGER NOT NULL,
                z TINYINT NOT NULL, m TINYINT NOT NULL);
             INSERT INTO gpkg_spatial_ref_sys VALUES ('Amersfoort / RD New', 28992, 'EPSG', 28992, '');
             INSERT INTO gpkg_contents VALUES ('{t}', 'features', '{t}', 28992);
             INSERT INTO gpkg_geometry_columns VALUES ('{t}', 'geom', 'MULTIPOLYGON', 28992, 0, 0);
             CREATE TABLE \"{t}\" (fid INTEGER PRIMARY KEY, geom BLOB, gemeentenaam TEXT);",
            t = table
        ))
        .unwrap();

        for (name, ring) in rows {
            conn.execute(
                &format!("INSERT INTO \"{}\" (geom, gemeentenaam) VALUES (?1, ?2)", table),
                params![gpkg_blob(28992, &wkb_polygon(ring)), name],
            )
            .unwrap();
        }
    }

    fn square(x0: f64, y0: f64) -> Vec<(f64, f64)> {
        vec![(x0, y0), (x0 + 1000.0, y0), (x0 + 1000.0, y0 + 1000.0), (x0, y0 + 1000.0), (x0, y0)]
    }

    #[test]
    fn test_load_layer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gemeenten.gpkg");
        write_gpkg(
            &path,
            "gemeenten",
            &[
                (Some("Utrecht"), square(135_000.0, 455_000.0)),
                (None, square(0.0, 0.0)),
                (Some("Zeist"), square(145_000.0, 455_000.0)),
            ],
        );

        let layer = load_gpkg(&path, None, "gemeentenaam").unwrap();
        assert_eq!(layer.name, "gemeenten");
        assert_eq!(layer.crs, Crs::RdNew);
        let names: Vec<_> = layer.municipalities.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["Utrecht", "Zeist"]);
    }

    #[test]
    fn test_missing_layer_and_attribute() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gemeenten.gpkg");
        write_gpkg(&path, "gemeenten", &[(Some("Urk"), square(0.0, 0.0))]);

        assert!(matches!(
            load_gpkg(&path, Some("provincies"), "gemeentenaam"),
            Err(Error::LayerNotFound(_))
        ));
        assert!(matches!(
            load_gpkg(&path, Some("gemeenten"), "naam"),
            Err(Error::AttributeNotFound { .. })
        ));
    }

    #[test]
    fn test_corrupt_geometry_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gemeenten.gpkg");
        write_gpkg(&path, "gemeenten", &[(Some("Urk"), square(0.0, 0.0))]);

        // MultiPolygon claiming u32::MAX members, cut off after the count
        let corrupt = gpkg_blob(28992, &[1, 6, 0, 0, 0, 0xff, 0xff, 0xff, 0xff]);
        Connection::open(&path)
            .unwrap()
            .execute(
                "INSERT INTO gemeenten (geom, gemeentenaam) VALUES (?1, 'Lelystad')",
                params![corrupt],
            )
            .unwrap();

        assert!(matches!(
            load_gpkg(&path, None, "gemeentenaam"),
            Err(Error::Geometry(_))
        ));
    }

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
    }
}
