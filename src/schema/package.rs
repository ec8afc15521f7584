use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{GenericSchema, SchemaError};

/// A data package: named resources, each carrying a schema
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataPackage {
    /// Package name
    #[serde(default)]
    pub name: String,

    /// Human readable title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Tabular resources
    #[serde(default)]
    pub resources: Vec<Resource>,
}

/// One resource of a data package
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Resource {
    /// Resource name
    #[serde(default)]
    pub name: String,

    /// Human readable title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Resource format, e.g. "CSV"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Media type, e.g. "text/csv"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mediatype: Option<String>,

    /// Relative path of the data file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Schema descriptor, left untyped until a schema is built from it
    #[serde(default)]
    pub schema: Value,
}

impl DataPackage {
    /// The schema descriptor of the first resource
    pub fn schema_descriptor(&self) -> Result<&Value, SchemaError> {
        self.resources
            .first()
            .map(|r| &r.schema)
            .ok_or_else(|| SchemaError::InvalidDescriptor("data package has no resources".to_string()))
    }

    /// Build the schema of the first resource
    pub fn schema(&self) -> Result<GenericSchema, SchemaError> {
        GenericSchema::new(self.schema_descriptor()?)
    }
}

/// A dataset as handed over by the storage collaborator: a name and a schema
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Dataset name, used as the export sheet title
    pub name: String,
    /// Schema descriptor
    pub schema_data: Value,
}

impl Dataset {
    /// Create a dataset from a name and a schema descriptor
    pub fn new(name: impl Into<String>, schema_data: Value) -> Self {
        Self {
            name: name.into(),
            schema_data,
        }
    }

    /// Read a JSON file holding either a bare schema (`{ "fields": [...] }`)
    /// or a data package (`{ "resources": [ { "schema": ... } ] }`).
    ///
    /// The dataset is named after the package, or after the file stem.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            SchemaError::InvalidDescriptor(format!("cannot read {}: {}", path.display(), e))
        })?;
        let fallback = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::from_json(&content, &fallback)
    }

    /// Parse a bare schema or a data package from JSON text
    pub fn from_json(json: &str, fallback_name: &str) -> Result<Self, SchemaError> {
        let value: Value = serde_json::from_str(json)?;
        if value.get("resources").is_some() {
            let package: DataPackage = serde_json::from_value(value)?;
            let schema_data = package.schema_descriptor()?.clone();
            let name = if package.name.is_empty() {
                fallback_name.to_string()
            } else {
                package.name
            };
            return Ok(Self::new(name, schema_data));
        }
        Ok(Self::new(fallback_name, value))
    }

    /// Build the generic schema of the dataset
    pub fn schema(&self) -> Result<GenericSchema, SchemaError> {
        GenericSchema::new(&self.schema_data)
    }
}
