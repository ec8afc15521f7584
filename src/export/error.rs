use crate::schema::SchemaError;

/// Errors that can occur during export
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// I/O error while writing the output
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from the CSV writer
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Mapping functions were given in a shape that cannot be used
    #[error("Invalid mapping functions: {0}")]
    InvalidMappingFuncs(String),

    /// The dataset schema could not be built
    #[error("Schema error: {0}")]
    SchemaError(#[from] SchemaError),

    /// Error from the XLSX writer
    #[cfg(feature = "xlsx")]
    #[error("XLSX error: {0}")]
    XlsxError(#[from] rust_xlsxwriter::XlsxError),
}
