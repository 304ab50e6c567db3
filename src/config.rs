use crate::render::TileSource;
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const DEFAULT_ZIP_NAME: &str = "data.zip";
pub const DEFAULT_NAME_COLUMN: &str = "Incid_Name";
pub const DEFAULT_TITLE_TEMPLATE: &str = "Fire Parameter: {name}";

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub fetch: FetchConfig,
    pub boundary: BoundaryConfig,
    pub csv: CsvConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct FetchConfig {
    pub zip_name: String,
    pub timeout_secs: Option<u64>, // None keeps the client default
    pub user_agent: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            zip_name: DEFAULT_ZIP_NAME.to_string(),
            timeout_secs: None,
            user_agent: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct BoundaryConfig {
    pub name_column: String,
    pub render: RenderConfig,
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self {
            name_column: DEFAULT_NAME_COLUMN.to_string(),
            render: RenderConfig::default(),
        }
    }
}

/// Fixed visual style of a boundary overlay.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    pub tiles: TileSource,
    pub line_color: String,
    pub line_width: f64,
    pub fill_color: Option<String>,
    pub frame_width: u32,
    /// `{name}` is replaced by the selected name.
    pub title_template: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            tiles: TileSource::EsriImagery,
            line_color: "red".to_string(),
            line_width: 1.0,
            fill_color: None,
            frame_width: 600,
            title_template: DEFAULT_TITLE_TEMPLATE.to_string(),
        }
    }
}

impl RenderConfig {
    pub fn title_for(&self, name: &str) -> String {
        self.title_template.replace("{name}", name)
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct CsvConfig {
    pub delimiter: char,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self { delimiter: ',' }
    }
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: AppConfig =
            toml::from_str(content).with_context(|| "Failed to parse TOML configuration")?;
        if !config.csv.delimiter.is_ascii() {
            return Err(anyhow!(
                "CSV delimiter must be a single ASCII character, got {:?}",
                config.csv.delimiter
            ));
        }
        Ok(config)
    }
}
