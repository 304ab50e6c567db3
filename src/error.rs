//! Error type shared by the fetch, read and render paths.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The request could not be sent or the body could not be read.
    #[error("Failed to fetch {url}: {source}")]
    Transfer {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("Request to {url} failed with status {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("Failed to extract archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("No .shp file found in the extracted archive under {dir:?}")]
    ShapefileNotFound { dir: PathBuf },

    #[error("Failed to read shapefile: {0}")]
    Shapefile(#[from] shapefile::Error),

    #[error("Failed to read GeoJSON: {0}")]
    GeoJson(#[from] geojson::Error),

    #[error("Failed to parse GeoJSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported geometry format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid geometry: {0}")]
    Geometry(String),

    #[error("No fire found with name '{name}' in column '{column}'")]
    NameNotFound { name: String, column: String },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("CSV delimiter must be a single ASCII character, got {0:?}")]
    Delimiter(char),

    #[error("Invalid header: {0}")]
    Header(String),

    #[error("Expected {expected} fields in line {line}, saw {found}")]
    RowWidth {
        line: u64,
        expected: usize,
        found: usize,
    },
}
