use geo::Geometry;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// A single attribute cell of a geometry table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Null,
    Text(String),
    Integer(i64),
    Number(f64),
    Bool(bool),
    Date(String),
}

impl AttributeValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Null => Ok(()),
            AttributeValue::Text(s) | AttributeValue::Date(s) => f.write_str(s),
            AttributeValue::Integer(i) => write!(f, "{}", i),
            AttributeValue::Number(n) => write!(f, "{}", n),
            AttributeValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeoRecord {
    pub attributes: BTreeMap<String, AttributeValue>,
    // None for null shapes
    pub geometry: Option<Geometry<f64>>,
}

impl GeoRecord {
    pub fn new(geometry: Option<Geometry<f64>>) -> Self {
        Self {
            attributes: BTreeMap::new(),
            geometry,
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: AttributeValue) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }
}

/// Records read from one geometry file, each carrying named attributes and
/// an optional geometry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeoTable {
    pub source: Option<PathBuf>,
    pub fields: Vec<String>,
    pub records: Vec<GeoRecord>,
}

impl GeoTable {
    /// Builds a table whose field list is the sorted union of every record's keys.
    pub fn from_records(source: Option<PathBuf>, records: Vec<GeoRecord>) -> Self {
        let mut fields: Vec<String> = records
            .iter()
            .flat_map(|r| r.attributes.keys().cloned())
            .collect();
        fields.sort();
        fields.dedup();
        Self { source, fields, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f == name)
    }

    /// Values of one attribute in record order. Records lacking it yield `Null`.
    pub fn column<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a AttributeValue> + 'a {
        self.records
            .iter()
            .map(move |r| r.attributes.get(name).unwrap_or(&AttributeValue::Null))
    }

    pub fn filter<F>(&self, mut pred: F) -> Vec<&GeoRecord>
    where
        F: FnMut(&GeoRecord) -> bool,
    {
        self.records.iter().filter(|r| pred(r)).collect()
    }
}

/// Column label of a loaded CSV table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum Column {
    Named(String),
    Position(usize),
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Column::Named(name) => f.write_str(name),
            Column::Position(i) => write!(f, "{}", i),
        }
    }
}

impl From<&str> for Column {
    fn from(s: &str) -> Self {
        Column::Named(s.to_string())
    }
}

impl From<usize> for Column {
    fn from(i: usize) -> Self {
        Column::Position(i)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Infers the narrowest type for a raw CSV field.
    pub fn infer(raw: &str) -> Self {
        if raw.is_empty() {
            return Value::Null;
        }
        if let Ok(i) = raw.parse::<i64>() {
            return Value::Integer(i);
        }
        if let Ok(f) = raw.parse::<f64>() {
            return Value::Float(f);
        }
        Value::Text(raw.to_string())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.to_string()).collect()
    }

    pub fn position(&self, label: &Column) -> Option<usize> {
        self.columns.iter().position(|c| c == label)
    }

    pub fn column(&self, label: impl Into<Column>) -> Option<Vec<&Value>> {
        let idx = self.position(&label.into())?;
        Some(self.rows.iter().map(|row| &row[idx]).collect())
    }

    pub fn get(&self, row: usize, label: impl Into<Column>) -> Option<&Value> {
        let idx = self.position(&label.into())?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::point;

    #[test]
    fn infers_cell_types() {
        assert_eq!(Value::infer(""), Value::Null);
        assert_eq!(Value::infer("42"), Value::Integer(42));
        assert_eq!(Value::infer("-1.5"), Value::Float(-1.5));
        assert_eq!(Value::infer("Eagle"), Value::Text("Eagle".into()));
    }

    #[test]
    fn geo_table_fields_are_union_of_keys() {
        let records = vec![
            GeoRecord::new(Some(point!(x: 0.0, y: 0.0).into()))
                .with_attribute("b", AttributeValue::Integer(1)),
            GeoRecord::new(None)
                .with_attribute("a", AttributeValue::Text("x".into()))
                .with_attribute("b", AttributeValue::Integer(2)),
        ];
        let table = GeoTable::from_records(None, records);

        assert_eq!(table.fields, vec!["a".to_string(), "b".to_string()]);
        let a: Vec<_> = table.column("a").collect();
        assert!(a[0].is_null());
        assert_eq!(a[1].as_text(), Some("x"));
    }

    #[test]
    fn table_lookup_by_name_and_position() {
        let table = Table {
            columns: vec![Column::from("a"), Column::from(1usize)],
            rows: vec![vec![Value::Integer(1), Value::Text("z".into())]],
        };
        assert_eq!(table.column_names(), vec!["a", "1"]);
        assert_eq!(table.get(0, "a"), Some(&Value::Integer(1)));
        assert_eq!(table.get(0, 1usize), Some(&Value::Text("z".into())));
        assert!(table.column("missing").is_none());
    }
}
