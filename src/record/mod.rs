//! # Record Module
//!
//! Row-level survey data: a record id and a mapping from column name to raw
//! value. Records come from the storage collaborator as JSON, or from CSV files
//! exported by field data sheets. Casting never mutates a record.

mod error;


use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use error::RecordError;

static MISSING: Value = Value::Null;

/// One row of survey data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Record identifier
    #[serde(default)]
    pub id: u64,

    /// Column name to raw value
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl Record {
    /// Create a record from an id and its data
    pub fn new(id: u64, data: Map<String, Value>) -> Self {
        Self { id, data }
    }

    /// Create a record from `(column, value)` pairs
    pub fn from_pairs<K, V, I>(id: u64, pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        let data = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self { id, data }
    }

    /// Raw value of a column; JSON null when the column is missing
    pub fn get(&self, column: &str) -> &Value {
        self.data.get(column).unwrap_or(&MISSING)
    }

    /// Whether the record has a value for the column, blank or not
    pub fn contains(&self, column: &str) -> bool {
        self.data.contains_key(column)
    }

    /// Load records from a file, `.json` as JSON and anything else as CSV
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Vec<Self>, RecordError> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        if is_json {
            let value: Value = serde_json::from_reader(reader)?;
            Self::from_json_value(value)
        } else {
            Self::from_csv_reader(reader)
        }
    }

    /// Parse CSV with a header row; every cell is kept as a string and ids
    /// follow row order starting at 1.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Vec<Self>, RecordError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .has_headers(true)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut records = Vec::new();
        for (row, result) in csv_reader.records().enumerate() {
            let row_values = result?;
            let data = headers
                .iter()
                .zip(row_values.iter())
                .filter(|(header, _)| !header.is_empty())
                .map(|(header, value)| (header.clone(), Value::String(value.to_string())))
                .collect();
            records.push(Self::new(row as u64 + 1, data));
        }
        Ok(records)
    }

    /// Parse a JSON array of `{ "id": ..., "data": {...} }` objects or of bare
    /// column objects.
    pub fn from_json(json: &str) -> Result<Vec<Self>, RecordError> {
        Self::from_json_value(serde_json::from_str(json)?)
    }

    fn from_json_value(value: Value) -> Result<Vec<Self>, RecordError> {
        let Value::Array(items) = value else {
            return Err(RecordError::InvalidFormat(
                "expected a JSON array of records".to_string(),
            ));
        };
        items
            .into_iter()
            .enumerate()
            .map(|(i, item)| {
                let Value::Object(mut map) = item else {
                    return Err(RecordError::InvalidFormat(format!(
                        "record #{} is not an object",
                        i + 1
                    )));
                };
                let fallback_id = i as u64 + 1;
                match map.remove("data") {
                    Some(Value::Object(data)) => {
                        let id = map.get("id").and_then(Value::as_u64).unwrap_or(fallback_id);
                        Ok(Self::new(id, data))
                    }
                    Some(other) => {
                        // a plain column that happens to be called "data"
                        map.insert("data".to_string(), other);
                        Ok(Self::new(fallback_id, map))
                    }
                    None => Ok(Self::new(fallback_id, map)),
                }
            })
            .collect()
    }
}
