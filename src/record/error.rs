/// Errors that can occur while loading records
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// I/O error reading a record file
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// CSV parsing error
    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// The input is not shaped like a list of records
    #[error("Invalid record format: {0}")]
    InvalidFormat(String),
}
