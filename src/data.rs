use crate::error::{Error, Result};
use crate::types::{AttributeValue, GeoRecord, GeoTable};
use geojson::GeoJson;
use shapefile::dbase::FieldValue;
use shapefile::{Reader, Shape};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

/// Reads a shapefile or GeoJSON FeatureCollection into a [`GeoTable`],
/// picking the reader from the file extension.
pub fn read_geometry_file(path: &Path) -> Result<GeoTable> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .ok_or_else(|| Error::UnsupportedFormat(format!("{} has no extension", path.display())))?;

    match extension.as_str() {
        "shp" => read_shapefile(path),
        "json" | "geojson" => read_geojson(path),
        other => Err(Error::UnsupportedFormat(other.to_string())),
    }
}

pub fn read_shapefile(path: &Path) -> Result<GeoTable> {
    let mut reader = Reader::from_path(path)?;
    let mut records = Vec::new();

    for result in reader.iter_shapes_and_records() {
        let (shape, record) = result?;
        let geometry = shape_to_geometry(shape)?;

        let mut geo_record = GeoRecord::new(geometry);
        for (name, value) in record {
            geo_record.attributes.insert(name, field_to_attribute(value));
        }
        records.push(geo_record);
    }

    debug!(path = %path.display(), records = records.len(), "read shapefile");
    Ok(GeoTable::from_records(Some(path.to_path_buf()), records))
}

fn shape_to_geometry(shape: Shape) -> Result<Option<geo::Geometry<f64>>> {
    match shape {
        Shape::NullShape => Ok(None),
        other => {
            let geometry = geo::Geometry::<f64>::try_from(other)
                .map_err(|e| Error::Geometry(format!("Failed to convert shape: {:?}", e)))?;
            Ok(Some(geometry))
        }
    }
}

fn field_to_attribute(value: FieldValue) -> AttributeValue {
    match value {
        FieldValue::Character(Some(s)) => AttributeValue::Text(s.trim_end().to_string()),
        FieldValue::Memo(s) => AttributeValue::Text(s),
        FieldValue::Numeric(Some(n)) => AttributeValue::Number(n),
        FieldValue::Float(Some(f)) => AttributeValue::Number(f as f64),
        FieldValue::Double(d) | FieldValue::Currency(d) => AttributeValue::Number(d),
        FieldValue::Integer(i) => AttributeValue::Integer(i as i64),
        FieldValue::Logical(Some(b)) => AttributeValue::Bool(b),
        FieldValue::Date(Some(d)) => {
            AttributeValue::Date(format!("{:04}-{:02}-{:02}", d.year(), d.month(), d.day()))
        }
        FieldValue::Character(None)
        | FieldValue::Numeric(None)
        | FieldValue::Float(None)
        | FieldValue::Logical(None)
        | FieldValue::Date(None) => AttributeValue::Null,
        other => AttributeValue::Text(format!("{:?}", other)),
    }
}

pub fn read_geojson(path: &Path) -> Result<GeoTable> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    // loads the whole file into memory
    let geojson = GeoJson::from_reader(reader)?;

    let collection = match geojson {
        GeoJson::FeatureCollection(fc) => fc,
        _ => {
            return Err(Error::UnsupportedFormat(
                "GeoJSON must be a FeatureCollection".to_string(),
            ))
        }
    };

    let mut records = Vec::with_capacity(collection.features.len());
    for feature in collection.features {
        let geometry = match feature.geometry {
            Some(geom) => Some(
                geo::Geometry::<f64>::try_from(geom.value)
                    .map_err(|e| Error::Geometry(format!("Failed to convert geojson geometry: {}", e)))?,
            ),
            None => None,
        };

        let mut record = GeoRecord::new(geometry);
        if let Some(properties) = feature.properties {
            for (key, value) in properties {
                record.attributes.insert(key, json_to_attribute(value));
            }
        }
        records.push(record);
    }

    debug!(path = %path.display(), records = records.len(), "read geojson");
    Ok(GeoTable::from_records(Some(path.to_path_buf()), records))
}

fn json_to_attribute(value: serde_json::Value) -> AttributeValue {
    use serde_json::Value;
    match value {
        Value::Null => AttributeValue::Null,
        Value::Bool(b) => AttributeValue::Bool(b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => AttributeValue::Integer(i),
            None => AttributeValue::Number(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(s) => AttributeValue::Text(s),
        other => AttributeValue::Text(other.to_string()),
    }
}
