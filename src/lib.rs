//! # biosys-schema - Schema-Driven Survey Records
//!
//! `biosys_schema` validates and casts biological field-survey records against
//! Table Schema descriptors extended with biosys role tags, and exports record
//! sets as CSV or spreadsheets.
//!
//! ## Key Features
//!
//! - **Typed casting**: raw strings and JSON values become dates, numbers,
//!   booleans and friends, with `required`, `minimum`/`maximum`, `enum`,
//!   `pattern` and length constraints enforced.
//!
//! - **Forgiving dates**: the `any` date format reads survey-sheet dates such as
//!   `29/07/2016`, `29-July-16` or `07/29/2016`, preferring day-first when both
//!   readings are valid.
//!
//! - **Observation schemas**: the observation date, latitude and longitude
//!   columns are found among arbitrarily named fields, by biosys tag, by
//!   canonical name, or as the only field of their type.
//!
//! - **Best-effort export**: a bad cell never aborts an export; it is written
//!   as found and reported as a [`CellOutcome::Raw`](export::CellOutcome::Raw).
//!
//! ## Quick Start
//!
//! ```rust
//! use biosys_schema::prelude::*;
//! use serde_json::json;
//!
//! let schema = ObservationSchema::new(&json!({
//!     "fields": [
//!         { "name": "When", "type": "date", "format": "any",
//!           "constraints": { "required": true }, "biosys": { "type": "observationDate" } },
//!         { "name": "Latitude", "type": "number", "constraints": { "required": true } },
//!         { "name": "Longitude", "type": "number", "constraints": { "required": true } }
//!     ]
//! }))?;
//!
//! let record = Record::from_pairs(1, [("When", "23/12/2016"), ("Latitude", "-32"), ("Longitude", "115.3")]);
//! let date = schema.cast_record_observation_date(&record)?;
//! assert_eq!(date.to_string(), "2016-12-23");
//! # Ok::<(), SchemaError>(())
//! ```
//!
//! ## Architecture
//!
//! - [`schema`]: fields, constraints, casting, generic and observation schemas
//! - [`record`]: records and their CSV/JSON loading
//! - [`export`]: row iteration, CSV and workbook export
//! - [`report`]: human readable schema and record reports

// Documentation lints - enforce complete documentation for publication
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod export;
pub mod record;
pub mod report;
pub mod schema;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::export::{
        BionetExporter, CellOutcome, ExportError, ExportStats, Exporter, MappingFuncs, Workbook,
    };
    pub use crate::record::{Record, RecordError};
    pub use crate::report::{check_records, check_schema, ValidationReport};
    pub use crate::schema::{
        Dataset, FieldType, FieldValue, GenericSchema, Location, ObservationSchema,
        SchemaConstraints, SchemaError, SchemaField,
    };
}
