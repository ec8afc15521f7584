//! # Export Module
//!
//! Turns a schema and a record set into rows for CSV files and spreadsheets.
//!
//! The exporter is best-effort: a cell that fails to cast keeps its raw value
//! and the export carries on. Each cell comes out as a [`CellOutcome`], so the
//! failures stay visible to callers that care.
//!
//! ## Mapping functions
//!
//! [`MappingFuncs`] override the cast of individual columns, e.g. to round
//! coordinates or to write the record id:
//!
//! ```rust,no_run
//! use biosys_schema::export::{Exporter, MappingFuncs};
//! use biosys_schema::schema::{FieldValue, GenericSchema};
//! use serde_json::json;
//!
//! let schema = GenericSchema::new(&json!({ "fields": [{ "name": "Latitude", "type": "number" }] }))?;
//! let mapping = MappingFuncs::from_spec(&json!({ "Latitude": { "round": 2 } }))?;
//! let exporter = Exporter::new("Fauna", schema, vec![], mapping);
//! exporter.to_csv(std::io::stdout())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;
mod exporter;
mod mapping;
mod sheet;
mod stats;

#[cfg(test)]
mod tests;

pub use error::ExportError;
pub use exporter::{
    BionetExporter, CellOutcome, Exporter, BIONET_EXTERNAL_KEY, BIONET_IGNORED_LINE,
};
pub use mapping::{record_id, MappingFn, MappingFuncs};
pub use sheet::{sanitize_title, Cell, Workbook, Worksheet, MAX_TITLE_LEN};
pub use stats::ExportStats;
