//! Observation schemas: generic schemas that carry an observation date and a
//! latitude/longitude location.
//!
//! Each well-known field is resolved once, when the schema is built:
//!
//! 1. a field tagged with the matching `biosys.type` wins outright,
//! 2. otherwise a field of the right type with the canonical name,
//! 3. otherwise the only field of the right type.
//!
//! Whichever tier picks the field, that field must be required. Two candidates
//! on the deciding tier make the schema ambiguous.

use std::fmt;

use chrono::NaiveDate;
use log::debug;
use serde::Serialize;
use serde_json::Value;

use super::cast::is_blank;
use super::{BiosysRole, FieldType, FieldValue, GenericSchema, SchemaError, SchemaField};
use crate::record::Record;

/// Canonical name of the observation date column
pub const OBSERVATION_DATE_FIELD_NAME: &str = "Observation Date";
/// Canonical name of the latitude column
pub const LATITUDE_FIELD_NAME: &str = "Latitude";
/// Canonical name of the longitude column
pub const LONGITUDE_FIELD_NAME: &str = "Longitude";

/// The well-known fields an observation schema resolves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObservationRole {
    /// Date of the observation (a `date` field)
    ObservationDate,
    /// Latitude (a `number` field)
    Latitude,
    /// Longitude (a `number` field)
    Longitude,
}

impl ObservationRole {
    /// The biosys tag that marks this role
    pub fn biosys_role(&self) -> BiosysRole {
        match self {
            Self::ObservationDate => BiosysRole::ObservationDate,
            Self::Latitude => BiosysRole::Latitude,
            Self::Longitude => BiosysRole::Longitude,
        }
    }

    /// Type a field must have to fill this role
    pub fn base_type(&self) -> FieldType {
        match self {
            Self::ObservationDate => FieldType::Date,
            Self::Latitude | Self::Longitude => FieldType::Number,
        }
    }

    /// Column name recognised without a tag
    pub fn canonical_name(&self) -> &'static str {
        match self {
            Self::ObservationDate => OBSERVATION_DATE_FIELD_NAME,
            Self::Latitude => LATITUDE_FIELD_NAME,
            Self::Longitude => LONGITUDE_FIELD_NAME,
        }
    }
}

impl fmt::Display for ObservationRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ObservationDate => f.write_str("observation date"),
            Self::Latitude => f.write_str("latitude"),
            Self::Longitude => f.write_str("longitude"),
        }
    }
}

/// A cast latitude/longitude pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Location {
    /// Decimal degrees, north positive
    pub latitude: f64,
    /// Decimal degrees, east positive
    pub longitude: f64,
}

/// A schema whose observation date, latitude and longitude fields are resolved
#[derive(Debug, Clone)]
pub struct ObservationSchema {
    schema: GenericSchema,
    observation_date: usize,
    latitude: usize,
    longitude: usize,
}

impl ObservationSchema {
    /// Build from a descriptor; fails if any well-known field cannot be resolved
    pub fn new(descriptor: &Value) -> Result<Self, SchemaError> {
        Self::from_schema(GenericSchema::new(descriptor)?)
    }

    /// Resolve the well-known fields of an already built schema
    pub fn from_schema(schema: GenericSchema) -> Result<Self, SchemaError> {
        let observation_date = resolve(&schema, ObservationRole::ObservationDate)?;
        let latitude = resolve(&schema, ObservationRole::Latitude)?;
        let longitude = resolve(&schema, ObservationRole::Longitude)?;
        if latitude == longitude {
            return Err(SchemaError::ObservationSchema(format!(
                "latitude and longitude both resolve to field '{}'",
                schema.fields()[latitude].name()
            )));
        }
        Ok(Self {
            schema,
            observation_date,
            latitude,
            longitude,
        })
    }

    /// The underlying generic schema
    pub fn schema(&self) -> &GenericSchema {
        &self.schema
    }

    /// Field holding the observation date
    pub fn observation_date_field(&self) -> &SchemaField {
        &self.schema.fields()[self.observation_date]
    }

    /// Field holding the latitude
    pub fn latitude_field(&self) -> &SchemaField {
        &self.schema.fields()[self.latitude]
    }

    /// Field holding the longitude
    pub fn longitude_field(&self) -> &SchemaField {
        &self.schema.fields()[self.longitude]
    }

    /// Resolved field for a role
    pub fn field_for(&self, role: ObservationRole) -> &SchemaField {
        match role {
            ObservationRole::ObservationDate => self.observation_date_field(),
            ObservationRole::Latitude => self.latitude_field(),
            ObservationRole::Longitude => self.longitude_field(),
        }
    }

    /// Resolve the field for `role` in `schema`
    pub fn find_field(
        schema: &GenericSchema,
        role: ObservationRole,
    ) -> Result<&SchemaField, SchemaError> {
        resolve(schema, role).map(|i| &schema.fields()[i])
    }

    /// Resolve the observation date field of `schema`
    pub fn find_observation_date_field(
        schema: &GenericSchema,
    ) -> Result<&SchemaField, SchemaError> {
        Self::find_field(schema, ObservationRole::ObservationDate)
    }

    /// Resolve the latitude field of `schema`
    pub fn find_latitude_field(schema: &GenericSchema) -> Result<&SchemaField, SchemaError> {
        Self::find_field(schema, ObservationRole::Latitude)
    }

    /// Resolve the longitude field of `schema`
    pub fn find_longitude_field(schema: &GenericSchema) -> Result<&SchemaField, SchemaError> {
        Self::find_field(schema, ObservationRole::Longitude)
    }

    /// Cast the observation date of a record.
    ///
    /// A missing or blank value is a [`SchemaError::Constraint`]; an unparseable
    /// one a [`SchemaError::Cast`].
    pub fn cast_record_observation_date(
        &self,
        record: &Record,
    ) -> Result<NaiveDate, SchemaError> {
        match self.cast_role(record, ObservationRole::ObservationDate)? {
            FieldValue::Date(date) => Ok(date),
            other => Err(self.unexpected(ObservationRole::ObservationDate, record, &other)),
        }
    }

    /// Cast the latitude of a record
    pub fn cast_record_latitude(&self, record: &Record) -> Result<f64, SchemaError> {
        self.cast_coordinate(record, ObservationRole::Latitude)
    }

    /// Cast the longitude of a record
    pub fn cast_record_longitude(&self, record: &Record) -> Result<f64, SchemaError> {
        self.cast_coordinate(record, ObservationRole::Longitude)
    }

    /// Cast both coordinates of a record
    pub fn cast_record_location(&self, record: &Record) -> Result<Location, SchemaError> {
        Ok(Location {
            latitude: self.cast_record_latitude(record)?,
            longitude: self.cast_record_longitude(record)?,
        })
    }

    fn cast_coordinate(&self, record: &Record, role: ObservationRole) -> Result<f64, SchemaError> {
        let value = self.cast_role(record, role)?;
        value
            .as_f64()
            .ok_or_else(|| self.unexpected(role, record, &value))
    }

    fn cast_role(&self, record: &Record, role: ObservationRole) -> Result<FieldValue, SchemaError> {
        let field = self.field_for(role);
        let raw = record.get(field.name());
        if is_blank(raw) {
            return Err(SchemaError::constraint(
                field.name(),
                format!("the record has no {}", role),
            ));
        }
        field.cast(raw)
    }

    fn unexpected(
        &self,
        role: ObservationRole,
        record: &Record,
        value: &FieldValue,
    ) -> SchemaError {
        let field = self.field_for(role);
        SchemaError::cast(
            field.name(),
            record.get(field.name()),
            format!("expected a {}, got '{}'", role, value),
        )
    }
}

fn resolve(schema: &GenericSchema, role: ObservationRole) -> Result<usize, SchemaError> {
    let fields = schema.fields();
    let names = |indices: &[usize]| {
        indices
            .iter()
            .map(|&i| format!("'{}'", fields[i].name()))
            .collect::<Vec<_>>()
            .join(", ")
    };
    let accept = |i: usize, reason: &str| {
        let field = &fields[i];
        if !field.required() {
            return Err(SchemaError::ObservationSchema(format!(
                "the {} field '{}' must be set as required",
                role,
                field.name()
            )));
        }
        debug!("Resolved {} field '{}' by {}", role, field.name(), reason);
        Ok(i)
    };

    let tagged: Vec<usize> = (0..fields.len())
        .filter(|&i| fields[i].biosys_role() == Some(role.biosys_role()))
        .filter(|&i| fields[i].field_type() == role.base_type())
        .collect();
    match tagged.as_slice() {
        [] => {}
        [i] => return accept(*i, "biosys tag"),
        _ => {
            return Err(SchemaError::ObservationSchema(format!(
                "more than one field tagged as {}: {}",
                role.biosys_role(),
                names(&tagged)
            )))
        }
    }

    let typed: Vec<usize> = (0..fields.len())
        .filter(|&i| fields[i].field_type() == role.base_type())
        .collect();
    let named: Vec<usize> = typed
        .iter()
        .copied()
        .filter(|&i| fields[i].name() == role.canonical_name())
        .collect();
    match named.as_slice() {
        [i] => return accept(*i, "name"),
        [] => {}
        _ => {
            return Err(SchemaError::ObservationSchema(format!(
                "more than one {} field named '{}'",
                role.base_type(),
                role.canonical_name()
            )))
        }
    }

    match typed.as_slice() {
        [] => Err(SchemaError::ObservationSchema(format!(
            "no {} field found: add a required {} field named '{}' or tag one with biosys type '{}'",
            role,
            role.base_type(),
            role.canonical_name(),
            role.biosys_role()
        ))),
        [i] => accept(*i, "being the only field of its type"),
        _ => Err(SchemaError::ObservationSchema(format!(
            "cannot determine the {} field among {}: name one '{}' or tag it with biosys type '{}'",
            role,
            names(&typed),
            role.canonical_name(),
            role.biosys_role()
        ))),
    }
}
