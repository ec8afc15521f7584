//! # Schema Module
//!
//! Interprets Table Schema descriptors extended with biosys role tags, and
//! casts raw record values into typed, constraint-checked [`FieldValue`]s.
//!
//! ## Descriptor
//!
//! ```json
//! {
//!   "fields": [
//!     {
//!       "name": "Observation Date",
//!       "type": "date",
//!       "format": "any",
//!       "constraints": { "required": true },
//!       "aliases": ["date", "obs date"],
//!       "biosys": { "type": "observationDate" }
//!     }
//!   ]
//! }
//! ```
//!
//! ## Types
//!
//! - [`SchemaConstraints`]: the `constraints` block
//! - [`SchemaField`]: one field, with name/alias matching and [`SchemaField::cast`]
//! - [`GenericSchema`]: fields in column order, record casting and validation
//! - [`ObservationSchema`]: a schema with a resolved observation date and location
//!
//! All of them are immutable once built and can be shared across threads.

mod cast;
mod constraints;
pub mod dates;
mod error;
mod field;
mod generic;
mod observation;
mod package;
mod value;


pub use cast::{is_blank, FALSE_VALUES, NULL_VALUES, TRUE_VALUES};
pub use constraints::SchemaConstraints;
pub use error::SchemaError;
pub use field::{BiosysRole, FieldFormat, FieldType, NumberOptions, SchemaField, BIOSYS_KEY};
pub use generic::{GenericSchema, RecordValidation};
pub use observation::{
    Location, ObservationRole, ObservationSchema, LATITUDE_FIELD_NAME, LONGITUDE_FIELD_NAME,
    OBSERVATION_DATE_FIELD_NAME,
};
pub use package::{DataPackage, Dataset, Resource};
pub use value::FieldValue;
