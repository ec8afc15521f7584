use std::collections::HashMap;
use std::fmt;

use serde_json::Value;

use super::ExportError;
use crate::record::Record;
use crate::schema::{FieldValue, SchemaError, SchemaField};

/// Function computing an exported cell from the record, the field and the raw value
pub type MappingFn =
    Box<dyn Fn(&Record, &SchemaField, &Value) -> Result<FieldValue, SchemaError> + Send + Sync>;

/// Per-field overrides applied instead of the field's own cast
#[derive(Default)]
pub struct MappingFuncs {
    funcs: HashMap<String, MappingFn>,
}

impl MappingFuncs {
    /// Empty set of overrides
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the override for a field
    pub fn insert<F>(&mut self, field_name: impl Into<String>, func: F) -> &mut Self
    where
        F: Fn(&Record, &SchemaField, &Value) -> Result<FieldValue, SchemaError>
            + Send
            + Sync
            + 'static,
    {
        self.funcs.insert(field_name.into(), Box::new(func));
        self
    }

    /// Builder form of [`insert`](Self::insert)
    pub fn with<F>(mut self, field_name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Record, &SchemaField, &Value) -> Result<FieldValue, SchemaError>
            + Send
            + Sync
            + 'static,
    {
        self.insert(field_name, func);
        self
    }

    /// Override registered for a field
    pub fn get(&self, field_name: &str) -> Option<&MappingFn> {
        self.funcs.get(field_name)
    }

    /// Whether a field has an override
    pub fn contains(&self, field_name: &str) -> bool {
        self.funcs.contains_key(field_name)
    }

    /// Names of the overridden fields, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.funcs.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of overrides
    pub fn len(&self) -> usize {
        self.funcs.len()
    }

    /// True when there are no overrides
    pub fn is_empty(&self) -> bool {
        self.funcs.is_empty()
    }

    /// Move the overrides of `other` in, replacing those with the same name
    pub fn extend(&mut self, other: MappingFuncs) {
        self.funcs.extend(other.funcs);
    }

    /// Build overrides from a declarative spec, e.g. from a config file:
    ///
    /// ```json
    /// { "Latitude": { "round": 6 }, "External Key": "record_id", "Datum": { "constant": "GDA94" } }
    /// ```
    ///
    /// - `"record_id"`: the record id
    /// - `{ "round": n }`: the cast number rounded to `n` decimals
    /// - `{ "constant": v }`: always `v`
    pub fn from_spec(spec: &Value) -> Result<Self, ExportError> {
        let Value::Object(entries) = spec else {
            return Err(ExportError::InvalidMappingFuncs(format!(
                "expected an object of field name to mapping, got: {}",
                spec
            )));
        };

        let mut mapping = Self::new();
        for (name, entry) in entries {
            match entry {
                Value::String(s) if s == "record_id" => {
                    mapping.insert(name.clone(), record_id);
                }
                Value::Object(options) if options.len() == 1 => {
                    if let Some(digits) = options.get("round") {
                        let digits = digits
                            .as_u64()
                            .and_then(|d| i32::try_from(d).ok())
                            .filter(|d| *d <= 15)
                            .ok_or_else(|| {
                                ExportError::InvalidMappingFuncs(format!(
                                    "'round' of '{}' must be an integer between 0 and 15, got: {}",
                                    name, digits
                                ))
                            })?;
                        mapping.insert(name.clone(), move |_, field, raw| {
                            round(field, raw, digits)
                        });
                    } else if let Some(constant) = options.get("constant") {
                        let constant = FieldValue::from_json(constant);
                        mapping.insert(name.clone(), move |_, _, _| Ok(constant.clone()));
                    } else {
                        return Err(unknown_entry(name, entry));
                    }
                }
                _ => return Err(unknown_entry(name, entry)),
            }
        }
        Ok(mapping)
    }
}

impl fmt::Debug for MappingFuncs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappingFuncs")
            .field("fields", &self.names())
            .finish()
    }
}

/// Mapping that exports the record id
pub fn record_id(
    record: &Record,
    field: &SchemaField,
    raw: &Value,
) -> Result<FieldValue, SchemaError> {
    i64::try_from(record.id)
        .map(FieldValue::Integer)
        .map_err(|_| SchemaError::cast(field.name(), raw, "record id out of range"))
}

fn round(field: &SchemaField, raw: &Value, digits: i32) -> Result<FieldValue, SchemaError> {
    Ok(match field.cast(raw)? {
        FieldValue::Number(n) => {
            let factor = 10f64.powi(digits);
            FieldValue::Number((n * factor).round() / factor)
        }
        other => other,
    })
}

fn unknown_entry(name: &str, entry: &Value) -> ExportError {
    ExportError::InvalidMappingFuncs(format!(
        "unknown mapping for '{}': {} (expected \"record_id\", {{\"round\": n}} or {{\"constant\": v}})",
        name, entry
    ))
}
