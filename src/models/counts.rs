//! Per-municipality point counts.

use geo::MultiPolygon;
use serde::Serialize;

use crate::crs::Crs;

/// One boundary polygon joined with the number of points it contains
#[derive(Debug, Clone)]
pub struct MunicipalityCount {
    pub name: String,
    pub geometry: MultiPolygon<f64>,
    pub count: u64,
}

/// CSV row of the exported table
#[derive(Debug, Serialize)]
pub struct CountRecord<'a> {
    pub gemeentenaam: &'a str,
    pub count: u64,
}

/// Result of the spatial join: every boundary polygon exactly once, in layer order.
#[derive(Debug, Clone)]
pub struct CountTable {
    pub crs: Crs,
    pub rows: Vec<MunicipalityCount>,
}

impl CountTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MunicipalityCount> {
        self.rows.iter()
    }

    /// Count for the first polygon with this name
    pub fn get(&self, name: &str) -> Option<u64> {
        self.rows.iter().find(|r| r.name == name).map(|r| r.count)
    }

    pub fn max_count(&self) -> u64 {
        self.rows.iter().map(|r| r.count).max().unwrap_or(0)
    }

    pub fn min_count(&self) -> u64 {
        self.rows.iter().map(|r| r.count).min().unwrap_or(0)
    }

    /// Number of municipalities with at least one point
    pub fn covered(&self) -> usize {
        self.rows.iter().filter(|r| r.count > 0).count()
    }

    /// Write `gemeentenaam,count` rows
    pub fn write_csv<W: std::io::Write>(&self, writer: W) -> anyhow::Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        for row in &self.rows {
            wtr.serialize(CountRecord {
                gemeentenaam: &row.name,
                count: row.count,
            })?;
        }
        wtr.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(counts: &[(&str, u64)]) -> CountTable {
        CountTable {
            crs: Crs::Wgs84,
            rows: counts
                .iter()
                .map(|(name, count)| MunicipalityCount {
                    name: name.to_string(),
                    geometry: MultiPolygon::new(vec![]),
                    count: *count,
                })
                .collect(),
        }
    }

    #[test]
    fn test_stats() {
        let t = table(&[("Utrecht", 12), ("Urk", 0), ("Zeist", 3)]);
        assert_eq!(t.max_count(), 12);
        assert_eq!(t.min_count(), 0);
        assert_eq!(t.covered(), 2);
        assert_eq!(t.get("Zeist"), Some(3));
        assert_eq!(t.get("Delft"), None);
    }

    #[test]
    fn test_write_csv() {
        let t = table(&[("Utrecht", 12), ("Urk", 0)]);
        let mut buf = Vec::new();
        t.write_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "gemeentenaam,count\nUtrecht,12\nUrk,0\n");
    }
}
