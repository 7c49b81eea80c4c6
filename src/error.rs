//! Library error type.

use std::path::PathBuf;

/// Errors raised while decoding boundary data or transforming coordinates.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid geometry: {0}")]
    Geometry(#[from] geozero::error::GeozeroError),

    #[error("unsupported coordinate reference system {organization}:{code}")]
    UnsupportedCrs { organization: String, code: i64 },

    #[error("layer '{0}' not found")]
    LayerNotFound(String),

    #[error("no feature layer found in {0}")]
    NoFeatureLayer(PathBuf),

    #[error("attribute '{attribute}' not found in layer '{layer}'")]
    AttributeNotFound { layer: String, attribute: String },

    #[error("unsupported boundary file format: {0}")]
    UnsupportedFormat(String),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
