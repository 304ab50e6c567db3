//! Helpers for wrangling wildfire perimeter data: fetch a zipped shapefile,
//! describe a named boundary as a map overlay, and load CSV tables.

pub mod config;
pub mod data;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod processing;
pub mod render;
pub mod tabular;
pub mod types;

pub use config::{AppConfig, BoundaryConfig, CsvConfig, FetchConfig, RenderConfig};
pub use data::read_geometry_file;
pub use error::{Error, Result};
pub use fetch::{download_and_extract_shapefile, ArchiveFetcher, HttpTransport, Transport};
pub use processing::{dissolve, select_by_name};
pub use render::{plot_fire_boundary, BoundaryPlot, BoundaryRenderer, TileSource};
pub use tabular::{load_csv_data, try_load_csv, CsvOptions, HeaderMode};
pub use types::{AttributeValue, Column, GeoRecord, GeoTable, Table, Value};
