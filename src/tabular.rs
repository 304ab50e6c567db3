use crate::config::CsvConfig;
use crate::error::{Error, Result};
use crate::types::{Column, Table, Value};
use csv::{ReaderBuilder, StringRecord};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// Where column labels come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HeaderMode {
    /// First row is the header, unless explicit names are given.
    #[default]
    Infer,
    /// Rows before this index are skipped; this row is the header.
    Row(usize),
    /// Every row is data.
    None,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CsvOptions {
    pub header: HeaderMode,
    pub names: Option<Vec<String>>,
    pub delimiter: u8,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            header: HeaderMode::Infer,
            names: None,
            delimiter: b',',
        }
    }
}

impl TryFrom<&CsvConfig> for CsvOptions {
    type Error = Error;

    fn try_from(config: &CsvConfig) -> Result<Self> {
        let delimiter = match u8::try_from(config.delimiter) {
            Ok(b) if b.is_ascii() => b,
            _ => return Err(Error::Delimiter(config.delimiter)),
        };
        Ok(Self {
            delimiter,
            ..Self::default()
        })
    }
}

impl CsvOptions {
    pub fn headerless<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        Self {
            header: HeaderMode::None,
            names: Some(names.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    fn header_row(&self) -> Option<usize> {
        match (self.header, &self.names) {
            (HeaderMode::Infer, None) => Some(0),
            (HeaderMode::Infer, Some(_)) | (HeaderMode::None, _) => None,
            (HeaderMode::Row(n), _) => Some(n),
        }
    }
}

/// Loads `base_dir/csv_filename`. Any failure is printed and turned into
/// `None`; use [`try_load_csv`] to get the error itself.
pub fn load_csv_data(csv_filename: &str, base_dir: impl AsRef<Path>, options: &CsvOptions) -> Option<Table> {
    match try_load_csv(csv_filename, base_dir, options) {
        Ok(table) => {
            println!(
                "Loaded '{}' with {} rows and {} columns.",
                csv_filename,
                table.len(),
                table.width()
            );
            Some(table)
        }
        Err(e) => {
            println!("Could not load '{}': {}", csv_filename, e);
            debug!(file = csv_filename, error = ?e, "csv load failed");
            None
        }
    }
}

pub fn try_load_csv(csv_filename: &str, base_dir: impl AsRef<Path>, options: &CsvOptions) -> Result<Table> {
    let path = base_dir.as_ref().join(csv_filename);
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(options.delimiter)
        .from_path(&path)?;

    let mut records = rdr.records().collect::<std::result::Result<Vec<_>, _>>()?;
    if records.is_empty() {
        return Err(Error::Header("No columns to parse from file".to_string()));
    }

    let header = match options.header_row() {
        Some(n) if n >= records.len() => {
            return Err(Error::Header(format!(
                "header row {} is past the end of the file ({} rows)",
                n,
                records.len()
            )))
        }
        Some(n) => {
            let data = records.split_off(n + 1);
            let header = records.pop();
            records = data;
            header
        }
        None => None,
    };

    let columns = match (&options.names, &header) {
        (Some(names), _) => explicit_columns(names)?,
        (None, Some(header)) => header_columns(header),
        (None, None) => {
            let width = records.iter().map(|r| r.len()).max().unwrap_or(0);
            (0..width).map(Column::Position).collect()
        }
    };

    let width = columns.len();
    let mut rows = Vec::with_capacity(records.len());
    for record in &records {
        if record.len() > width {
            return Err(Error::RowWidth {
                line: record.position().map(|p| p.line()).unwrap_or(0),
                expected: width,
                found: record.len(),
            });
        }
        let mut row: Vec<Value> = record.iter().map(Value::infer).collect();
        row.resize(width, Value::Null);
        rows.push(row);
    }

    debug!(path = %path.display(), rows = rows.len(), columns = width, "parsed csv");
    Ok(Table { columns, rows })
}

fn explicit_columns(names: &[String]) -> Result<Vec<Column>> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name.as_str()) {
            return Err(Error::Header(format!("Duplicate names are not allowed: '{}'", name)));
        }
    }
    Ok(names.iter().map(|n| Column::Named(n.clone())).collect())
}

/// Blank labels become `Unnamed: i`; repeats get a `.1`, `.2`, ... suffix.
fn header_columns(header: &StringRecord) -> Vec<Column> {
    let mut seen: HashSet<String> = HashSet::new();
    header
        .iter()
        .enumerate()
        .map(|(i, raw)| {
            let base = if raw.is_empty() {
                format!("Unnamed: {}", i)
            } else {
                raw.to_string()
            };
            let mut label = base.clone();
            let mut n = 1;
            while !seen.insert(label.clone()) {
                label = format!("{}.{}", base, n);
                n += 1;
            }
            Column::Named(label)
        })
        .collect()
}
