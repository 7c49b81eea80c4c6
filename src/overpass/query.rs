//! Overpass QL query construction.

use std::fmt;

/// All nodes, ways and relations tagged `key=value` inside a country,
/// with ways/relations reduced to their center.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverpassQuery {
    /// ISO3166-1 country code of the search area
    pub area: String,
    pub key: String,
    pub value: String,
    /// Server-side timeout in seconds (`[timeout:N]`)
    pub timeout_secs: Option<u64>,
}

impl OverpassQuery {
    pub fn new(area: impl Into<String>, key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            area: area.into(),
            key: key.into(),
            value: value.into(),
            timeout_secs: None,
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }
}

/// Escape a string for use inside a double-quoted Overpass QL literal
fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

impl fmt::Display for OverpassQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let area = escape(&self.area);
        let filter = format!("[\"{}\"=\"{}\"]", escape(&self.key), escape(&self.value));

        match self.timeout_secs {
            Some(t) => writeln!(f, "[out:json][timeout:{}];", t)?,
            None => writeln!(f, "[out:json];")?,
        }
        writeln!(f, "area[\"ISO3166-1\"=\"{}\"][admin_level=2];", area)?;
        writeln!(f, "(node{}(area);", filter)?;
        writeln!(f, " way{}(area);", filter)?;
        writeln!(f, " rel{}(area);", filter)?;
        writeln!(f, ");")?;
        write!(f, "out center;")
    }
}
