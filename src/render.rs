use crate::config::{BoundaryConfig, RenderConfig, DEFAULT_NAME_COLUMN};
use crate::error::Result;
use crate::processing::dissolve_by_name;
use crate::types::GeoTable;
use geo::{BoundingRect, Geometry};
use geojson::{Feature, FeatureCollection, JsonObject};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::json;

/// Base map drawn underneath an overlay.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileSource {
    #[default]
    EsriImagery,
    OpenStreetMap,
    CartoLight,
    CartoDark,
    /// XYZ template with `{X}`, `{Y}` and `{Z}` placeholders.
    Custom(String),
}

impl TileSource {
    pub fn url_template(&self) -> &str {
        match self {
            TileSource::EsriImagery => {
                "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{Z}/{Y}/{X}"
            }
            TileSource::OpenStreetMap => "https://tile.openstreetmap.org/{Z}/{X}/{Y}.png",
            TileSource::CartoLight => "https://cartodb-basemaps-4.global.ssl.fastly.net/light_all/{Z}/{X}/{Y}.png",
            TileSource::CartoDark => "https://cartodb-basemaps-4.global.ssl.fastly.net/dark_all/{Z}/{X}/{Y}.png",
            TileSource::Custom(url) => url,
        }
    }
}

/// Everything a map surface needs to draw one dissolved boundary. Building
/// it has no side effects; display is up to the consumer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundaryPlot {
    pub title: String,
    pub name: String,
    pub column: String,
    pub matched: usize,
    pub tiles: TileSource,
    pub tile_url: String,
    #[serde(serialize_with = "serialize_geometry")]
    pub geometry: Option<Geometry<f64>>,
    /// `[min_x, min_y, max_x, max_y]`
    pub bounds: Option<[f64; 4]>,
    pub line_color: String,
    pub line_width: f64,
    pub fill_color: Option<String>,
    pub frame_width: u32,
}

fn serialize_geometry<S: Serializer>(geometry: &Option<Geometry<f64>>, s: S) -> std::result::Result<S::Ok, S::Error> {
    geometry
        .as_ref()
        .map(|g| geojson::Geometry::new(geojson::Value::from(g)))
        .serialize(s)
}

impl BoundaryPlot {
    /// One styled feature, using simplestyle property names for the stroke.
    pub fn to_geojson(&self) -> FeatureCollection {
        let mut properties = JsonObject::new();
        properties.insert("title".to_string(), json!(self.title));
        properties.insert(self.column.clone(), json!(self.name));
        properties.insert("stroke".to_string(), json!(self.line_color));
        properties.insert("stroke-width".to_string(), json!(self.line_width));
        properties.insert("fill".to_string(), json!(self.fill_color));
        properties.insert("fill-opacity".to_string(), json!(if self.fill_color.is_some() { 1.0 } else { 0.0 }));

        let feature = Feature {
            bbox: self.bounds.map(|b| b.to_vec()),
            geometry: self
                .geometry
                .as_ref()
                .map(|g| geojson::Geometry::new(geojson::Value::from(g))),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        };

        FeatureCollection {
            bbox: self.bounds.map(|b| b.to_vec()),
            features: vec![feature],
            foreign_members: None,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

pub struct BoundaryRenderer {
    config: BoundaryConfig,
}

impl BoundaryRenderer {
    pub fn new(config: BoundaryConfig) -> Self {
        Self { config }
    }

    pub fn render(&self, table: &GeoTable, name: &str, title: Option<&str>) -> Result<BoundaryPlot> {
        build_plot(table, name, &self.config.name_column, title, &self.config.render)
    }
}

impl Default for BoundaryRenderer {
    fn default() -> Self {
        Self::new(BoundaryConfig::default())
    }
}

/// Selects `fire_name` in `fire_column` (default `Incid_Name`), dissolves
/// the matches, and describes the overlay. An empty title counts as absent.
pub fn plot_fire_boundary(
    table: &GeoTable,
    fire_name: &str,
    fire_column: Option<&str>,
    title: Option<&str>,
    config: &RenderConfig,
) -> Result<BoundaryPlot> {
    build_plot(table, fire_name, fire_column.unwrap_or(DEFAULT_NAME_COLUMN), title, config)
}

fn build_plot(
    table: &GeoTable,
    name: &str,
    column: &str,
    title: Option<&str>,
    config: &RenderConfig,
) -> Result<BoundaryPlot> {
    let (geometry, matched) = dissolve_by_name(table, name, column)?;

    let bounds = geometry
        .as_ref()
        .and_then(|g| g.bounding_rect())
        .map(|r| [r.min().x, r.min().y, r.max().x, r.max().y]);

    let title = match title {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => config.title_for(name),
    };

    Ok(BoundaryPlot {
        title,
        name: name.to_string(),
        column: column.to_string(),
        matched,
        tile_url: config.tiles.url_template().to_string(),
        tiles: config.tiles.clone(),
        geometry,
        bounds,
        line_color: config.line_color.clone(),
        line_width: config.line_width,
        fill_color: config.fill_color.clone(),
        frame_width: config.frame_width,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::types::{AttributeValue, GeoRecord};
    use geo::polygon;

    fn table() -> GeoTable {
        let rec = |name: &str, x0: f64| {
            GeoRecord::new(Some(
                polygon![(x: x0, y: 0.0), (x: x0 + 1.0, y: 0.0), (x: x0 + 1.0, y: 1.0), (x: x0, y: 1.0), (x: x0, y: 0.0)].into(),
            ))
            .with_attribute("Incid_Name", AttributeValue::Text(name.into()))
        };
        GeoTable::from_records(None, vec![rec("Eagle", 0.0), rec("Eagle", 0.5), rec("Beta", 5.0)])
    }

    #[test]
    fn default_title_and_style() {
        let plot = plot_fire_boundary(&table(), "Eagle", None, None, &RenderConfig::default()).unwrap();

        assert_eq!(plot.title, "Fire Parameter: Eagle");
        assert_eq!(plot.column, "Incid_Name");
        assert_eq!(plot.matched, 2);
        assert_eq!(plot.tiles, TileSource::EsriImagery);
        assert!(plot.tile_url.contains("World_Imagery"));
        assert_eq!(plot.line_color, "red");
        assert_eq!(plot.line_width, 1.0);
        assert_eq!(plot.fill_color, None);
        assert_eq!(plot.frame_width, 600);
        let bounds = plot.bounds.unwrap();
        for (got, want) in bounds.iter().zip([0.0, 0.0, 1.5, 1.0]) {
            assert!((got - want).abs() < 1e-9, "bounds {:?}", bounds);
        }
    }

    #[test]
    fn explicit_title_wins_unless_empty() {
        let config = RenderConfig::default();
        let plot = plot_fire_boundary(&table(), "Eagle", None, Some("Eagle 2024"), &config).unwrap();
        assert_eq!(plot.title, "Eagle 2024");

        let plot = plot_fire_boundary(&table(), "Eagle", None, Some(""), &config).unwrap();
        assert_eq!(plot.title, "Fire Parameter: Eagle");
    }

    #[test]
    fn unknown_name_fails() {
        let err = plot_fire_boundary(&table(), "Gamma", None, None, &RenderConfig::default()).unwrap_err();
        assert!(matches!(err, Error::NameNotFound { .. }));
        assert_eq!(err.to_string(), "No fire found with name 'Gamma' in column 'Incid_Name'");
    }

    #[test]
    fn renderer_uses_configured_column() {
        let table = GeoTable::from_records(
            None,
            vec![GeoRecord::new(None).with_attribute("FIRE_NAME", AttributeValue::Text("Eagle".into()))],
        );
        let renderer = BoundaryRenderer::new(BoundaryConfig {
            name_column: "FIRE_NAME".to_string(),
            ..BoundaryConfig::default()
        });

        let plot = renderer.render(&table, "Eagle", None).unwrap();
        assert_eq!(plot.matched, 1);
        assert!(plot.geometry.is_none());
        assert!(plot.bounds.is_none());
        assert!(BoundaryRenderer::default().render(&table, "Eagle", None).is_err());
    }

    #[test]
    fn exports_styled_geojson_and_json() {
        let plot = plot_fire_boundary(&table(), "Eagle", None, None, &RenderConfig::default()).unwrap();

        let fc = plot.to_geojson();
        assert_eq!(fc.features.len(), 1);
        let props = fc.features[0].properties.as_ref().unwrap();
        assert_eq!(props["stroke"], json!("red"));
        assert_eq!(props["Incid_Name"], json!("Eagle"));
        assert_eq!(props["fill"], serde_json::Value::Null);
        assert!(matches!(
            fc.features[0].geometry.as_ref().map(|g| &g.value),
            Some(geojson::Value::MultiPolygon(_))
        ));

        let text = plot.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["title"], json!("Fire Parameter: Eagle"));
        assert_eq!(value["tiles"], json!("EsriImagery"));
        assert_eq!(value["geometry"]["type"], json!("MultiPolygon"));
    }

    #[test]
    fn custom_tiles_pass_through() {
        let config = RenderConfig {
            tiles: TileSource::Custom("https://tiles.example/{Z}/{X}/{Y}.png".into()),
            ..RenderConfig::default()
        };
        let plot = plot_fire_boundary(&table(), "Beta", None, None, &config).unwrap();
        assert_eq!(plot.tile_url, "https://tiles.example/{Z}/{X}/{Y}.png");
        assert_eq!(plot.matched, 1);
    }
}
