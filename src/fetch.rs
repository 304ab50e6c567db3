//! Download a zipped shapefile once, unpack it, and load the first `.shp`
//! found beneath the output directory.

use crate::config::FetchConfig;
use crate::data::read_geometry_file;
use crate::error::{Error, Result};
use crate::types::GeoTable;
use reqwest::blocking::Client;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use walkdir::WalkDir;
use zip::ZipArchive;

pub const SHAPEFILE_EXTENSION: &str = ".shp";

/// Source of archive bytes. Implementations must fail on a non-success
/// status without returning a body.
pub trait Transport {
    fn get(&self, url: &str) -> Result<Vec<u8>>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get(&self, url: &str) -> Result<Vec<u8>> {
        (**self).get(url)
    }
}

pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let mut builder = Client::builder().timeout(config.timeout_secs.map(Duration::from_secs));
        if let Some(agent) = &config.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        let client = builder.build().map_err(Error::Client)?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<Vec<u8>> {
        let transfer = |source| Error::Transfer {
            url: url.to_string(),
            source,
        };

        let response = self
            .client
            .get(url)
            .send()
            .map_err(transfer)?
            .error_for_status()
            .map_err(|e| match e.status() {
                Some(status) => Error::HttpStatus {
                    url: url.to_string(),
                    status: status.as_u16(),
                },
                None => transfer(e),
            })?;

        let bytes = response.bytes().map_err(transfer)?;
        debug!(url, bytes = bytes.len(), "received archive body");
        Ok(bytes.to_vec())
    }
}

pub struct ArchiveFetcher<T = HttpTransport> {
    transport: T,
    config: FetchConfig,
}

impl ArchiveFetcher<HttpTransport> {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self { transport, config })
    }
}

impl<T: Transport> ArchiveFetcher<T> {
    pub fn with_transport(transport: T, config: FetchConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Downloads and extracts the archive unless `output_dir/zip_name` is
    /// already present, then reads the first shapefile under `output_dir`.
    pub fn fetch(
        &self,
        url: &str,
        output_dir: impl AsRef<Path>,
        zip_name: Option<&str>,
    ) -> Result<GeoTable> {
        let output_dir = output_dir.as_ref();
        self.ensure_archive(url, output_dir, zip_name)?;

        let shapefile_path =
            find_first_shapefile(output_dir).ok_or_else(|| Error::ShapefileNotFound {
                dir: output_dir.to_path_buf(),
            })?;

        println!("Shapefile found: {}", shapefile_path.display());
        read_geometry_file(&shapefile_path)
    }

    /// Returns the local archive path. An existing file is trusted as-is:
    /// it is neither re-downloaded nor re-extracted.
    pub fn ensure_archive(
        &self,
        url: &str,
        output_dir: &Path,
        zip_name: Option<&str>,
    ) -> Result<PathBuf> {
        fs::create_dir_all(output_dir)?;
        let zip_name = zip_name.unwrap_or(&self.config.zip_name);
        let zip_path = output_dir.join(zip_name);

        if zip_path.exists() {
            debug!(path = %zip_path.display(), "archive already present, skipping download");
            return Ok(zip_path);
        }

        println!("Downloading data from {}...", url);
        let body = self.transport.get(url)?;
        write_whole(&zip_path, &body)?;
        println!("Download complete.");

        println!("Extracting contents...");
        extract_archive(&zip_path, output_dir)?;
        println!("Extraction complete.");

        Ok(zip_path)
    }
}

/// Writes to a sibling `.part` file and renames it into place, so `path`
/// only ever holds a complete body.
fn write_whole(path: &Path, body: &[u8]) -> Result<()> {
    let mut part = path.as_os_str().to_owned();
    part.push(".part");
    let part = PathBuf::from(part);

    fs::write(&part, body)?;
    fs::rename(&part, path)?;
    debug!(path = %path.display(), bytes = body.len(), "wrote archive");
    Ok(())
}

/// Extracts every entry into `dir`, keeping the archive's internal layout.
pub fn extract_archive(zip_path: &Path, dir: &Path) -> Result<()> {
    let file = File::open(zip_path)?;
    let mut archive = ZipArchive::new(file)?;
    debug!(entries = archive.len(), "opened archive");
    archive.extract(dir)?;
    Ok(())
}

/// First regular file ending in `.shp`. Within each directory its files are
/// checked, in name order, before any subdirectory is entered. Unreadable
/// entries are skipped.
pub fn find_first_shapefile(dir: &Path) -> Option<PathBuf> {
    WalkDir::new(dir)
        .sort_by(|a, b| {
            a.file_type()
                .is_dir()
                .cmp(&b.file_type().is_dir())
                .then_with(|| a.file_name().cmp(b.file_name()))
        })
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .find(|entry| {
            entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.ends_with(SHAPEFILE_EXTENSION))
        })
        .map(|entry| entry.into_path())
}

/// Fetches with a default HTTP transport. `zip_name` falls back to `data.zip`.
pub fn download_and_extract_shapefile(
    zip_url: &str,
    output_dir: impl AsRef<Path>,
    zip_name: Option<&str>,
) -> Result<GeoTable> {
    ArchiveFetcher::new(FetchConfig::default())?.fetch(zip_url, output_dir, zip_name)
}
