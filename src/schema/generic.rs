use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::{FieldValue, SchemaError, SchemaField};
use crate::record::Record;

/// An ordered list of fields built from a schema descriptor
#[derive(Debug, Clone)]
pub struct GenericSchema {
    descriptor: Value,
    fields: Vec<SchemaField>,
}

/// Per-field failures found while validating one record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordValidation {
    /// Field name to error message, in schema order of discovery
    pub errors: Vec<(String, String)>,
}

impl RecordValidation {
    /// True when no field failed
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Names of the failing fields
    pub fn error_fields(&self) -> impl Iterator<Item = &str> {
        self.errors.iter().map(|(name, _)| name.as_str())
    }
}

impl GenericSchema {
    /// Build a schema from a descriptor `{ "fields": [ ... ] }`
    pub fn new(descriptor: &Value) -> Result<Self, SchemaError> {
        if !descriptor.is_object() {
            return Err(SchemaError::InvalidDescriptor(format!(
                "schema must be an object, got: {}",
                descriptor
            )));
        }
        let fields = match descriptor.get("fields") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .map(SchemaField::new)
                .collect::<Result<Vec<_>, _>>()?,
            Some(other) => {
                return Err(SchemaError::InvalidDescriptor(format!(
                    "'fields' must be a list, got: {}",
                    other
                )))
            }
        };
        Ok(Self {
            descriptor: descriptor.clone(),
            fields,
        })
    }

    /// Parse a descriptor from JSON text
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        let descriptor: Value = serde_json::from_str(json)?;
        Self::new(&descriptor)
    }

    /// The descriptor the schema was built from
    pub fn descriptor(&self) -> &Value {
        &self.descriptor
    }

    /// Fields in column order
    pub fn fields(&self) -> &[SchemaField] {
        &self.fields
    }

    /// Column headers: titles, falling back to names
    pub fn headers(&self) -> Vec<&str> {
        self.fields.iter().map(SchemaField::display_title).collect()
    }

    /// Field names in column order
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(SchemaField::name).collect()
    }

    /// First field whose name or alias matches
    pub fn field_by_name(&self, name: &str, case_insensitive: bool) -> Option<&SchemaField> {
        self.fields
            .iter()
            .find(|f| f.has_name_or_alias(name, &[], case_insensitive))
    }

    /// Cast every field of the record; missing keys count as blank
    pub fn cast_record(
        &self,
        record: &Record,
    ) -> Result<BTreeMap<String, FieldValue>, SchemaError> {
        self.fields
            .iter()
            .map(|field| {
                let value = field.cast(record.get(field.name()))?;
                Ok((field.name().to_string(), value))
            })
            .collect()
    }

    /// Collect every failing field of the record instead of stopping at the first
    pub fn validate_record(&self, record: &Record) -> RecordValidation {
        let errors = self
            .fields
            .iter()
            .filter_map(|field| {
                field
                    .validation_error(record.get(field.name()))
                    .map(|message| (field.name().to_string(), message))
            })
            .collect();
        RecordValidation { errors }
    }

    /// Whether every field of the record casts cleanly
    pub fn is_all_valid(&self, record: &Record) -> bool {
        self.fields
            .iter()
            .all(|field| field.cast(record.get(field.name())).is_ok())
    }

    /// Rename record keys matching a field name or alias (ignoring case) to
    /// the field name. Keys matching no field are kept as they are.
    pub fn normalize_record(&self, record: &Record) -> Record {
        let mut data = Map::with_capacity(record.data.len());
        for (key, value) in &record.data {
            let name = self
                .field_by_name(key, false)
                .or_else(|| self.field_by_name(key, true))
                .map_or(key.as_str(), SchemaField::name);
            // an exact column wins over an alias already mapped to the same field
            if !data.contains_key(name) || name == key {
                data.insert(name.to_string(), value.clone());
            }
        }
        Record {
            id: record.id,
            data,
        }
    }
}
