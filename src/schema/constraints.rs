use serde_json::{Map, Value};

use super::SchemaError;

/// Field constraints as found in the `constraints` block of a field descriptor
///
/// Every accessor falls back to the Table Schema default when the key is absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaConstraints {
    data: Map<String, Value>,
}

impl SchemaConstraints {
    /// Build constraints from an optional descriptor value.
    ///
    /// `None`, JSON null and an empty object all give empty constraints.
    pub fn new(data: Option<&Value>) -> Result<Self, SchemaError> {
        match data {
            None | Some(Value::Null) => Ok(Self::default()),
            Some(Value::Object(map)) => Ok(Self { data: map.clone() }),
            Some(other) => Err(SchemaError::FieldSchema(format!(
                "constraints must be an object, got: {}",
                other
            ))),
        }
    }

    /// The underlying constraint mapping
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// Dict-like access to a constraint
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Dict-like access with a default
    pub fn get_or<'a>(&'a self, key: &str, default: &'a Value) -> &'a Value {
        self.data.get(key).unwrap_or(default)
    }

    /// Whether a value must be provided (default false)
    pub fn required(&self) -> bool {
        self.flag("required")
    }

    /// Whether values must be unique across records (default false)
    pub fn unique(&self) -> bool {
        self.flag("unique")
    }

    /// Lower bound, as given in the descriptor
    pub fn minimum(&self) -> Option<&Value> {
        self.present("minimum")
    }

    /// Upper bound, as given in the descriptor
    pub fn maximum(&self) -> Option<&Value> {
        self.present("maximum")
    }

    /// Minimum length in characters
    pub fn min_length(&self) -> Option<usize> {
        self.length("minLength")
    }

    /// Maximum length in characters
    pub fn max_length(&self) -> Option<usize> {
        self.length("maxLength")
    }

    /// Regular expression the whole value must match
    pub fn pattern(&self) -> Option<&str> {
        self.data.get("pattern").and_then(Value::as_str)
    }

    /// Allowed values
    pub fn enum_values(&self) -> Option<&[Value]> {
        self.data
            .get("enum")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
    }

    /// True when no constraint is declared
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn flag(&self, key: &str) -> bool {
        match self.data.get(key) {
            Some(Value::Bool(b)) => *b,
            // descriptors written by spreadsheets sometimes quote booleans
            Some(Value::String(s)) => matches!(s.trim().to_lowercase().as_str(), "true" | "yes"),
            _ => false,
        }
    }

    fn present(&self, key: &str) -> Option<&Value> {
        self.data.get(key).filter(|v| !v.is_null())
    }

    fn length(&self, key: &str) -> Option<usize> {
        match self.data.get(key)? {
            Value::Number(n) => n.as_u64().map(|n| n as usize),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}
