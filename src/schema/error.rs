/// Errors raised while building schemas or casting record values
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// Malformed field descriptor (missing or blank name, unknown type, ...)
    #[error("Field schema error: {0}")]
    FieldSchema(String),

    /// A value violates one of the field constraints
    #[error("Constraint error on field '{field}': {message}")]
    Constraint {
        /// Name of the field whose constraint failed
        field: String,
        /// Description of the violation
        message: String,
    },

    /// A well-known observation field is missing or ambiguous
    #[error("Observation schema error: {0}")]
    ObservationSchema(String),

    /// A value could not be parsed as the field type
    #[error("Cannot cast '{value}' for field '{field}': {message}")]
    Cast {
        /// Name of the field being cast
        field: String,
        /// Raw value as text
        value: String,
        /// Reason of the failure
        message: String,
    },

    /// The schema descriptor is not shaped like a schema
    #[error("Invalid schema descriptor: {0}")]
    InvalidDescriptor(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SchemaError {
    pub(crate) fn constraint(field: &str, message: impl Into<String>) -> Self {
        Self::Constraint {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn cast(field: &str, value: &serde_json::Value, message: impl Into<String>) -> Self {
        let value = match value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        Self::Cast {
            field: field.to_string(),
            value,
            message: message.into(),
        }
    }

    /// True for constraint violations (required, range, length, enum, pattern)
    pub fn is_constraint(&self) -> bool {
        matches!(self, Self::Constraint { .. })
    }

    /// True for type-parse failures
    pub fn is_cast(&self) -> bool {
        matches!(self, Self::Cast { .. })
    }
}
