use std::io::Write;

use log::{info, warn};
use serde_json::Value;

use super::mapping::record_id;
use super::sheet::{Cell, Workbook};
use super::{ExportError, ExportStats, MappingFuncs};
use crate::record::Record;
use crate::schema::{Dataset, FieldValue, GenericSchema, SchemaField};

/// Column whose value bionet imports take from the record id
pub const BIONET_EXTERNAL_KEY: &str = "External Key";

/// Marker row bionet imports skip
pub const BIONET_IGNORED_LINE: &str = "Bionet Ignored Line";

/// Result of exporting one cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellOutcome {
    /// Typed value, from the field cast or a mapping function
    Value(FieldValue),
    /// The raw record value, either because casting was not requested or
    /// because it failed (`error` holds the failure)
    Raw {
        /// Raw value as found in the record
        value: Value,
        /// Why the value could not be cast, if casting was attempted
        error: Option<String>,
    },
}

impl CellOutcome {
    /// True when casting or mapping was attempted and failed
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Raw { error: Some(_), .. })
    }

    /// Failure message, if any
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Raw { error, .. } => error.as_deref(),
            Self::Value(_) => None,
        }
    }

    /// Text written to CSV: typed values in their canonical form, raw strings
    /// as they are and null as an empty cell
    pub fn to_text(&self) -> String {
        match self {
            Self::Value(value) => value.to_string(),
            Self::Raw { value, .. } => match value {
                Value::Null => String::new(),
                Value::String(s) => s.clone(),
                other => other.to_string(),
            },
        }
    }

    /// The cell as a typed value, raw values keeping their JSON kind
    pub fn into_value(self) -> FieldValue {
        match self {
            Self::Value(value) => value,
            Self::Raw { value, .. } => FieldValue::from_json(&value),
        }
    }
}

/// Turns a schema and its records into rows, CSV or a workbook
#[derive(Debug)]
pub struct Exporter {
    name: String,
    schema: GenericSchema,
    records: Vec<Record>,
    mapping_funcs: MappingFuncs,
    csv_cast: bool,
}

impl Exporter {
    /// Create an exporter; `name` becomes the worksheet title
    pub fn new(
        name: impl Into<String>,
        schema: GenericSchema,
        records: Vec<Record>,
        mapping_funcs: MappingFuncs,
    ) -> Self {
        for unused in mapping_funcs
            .names()
            .into_iter()
            .filter(|name| schema.fields().iter().all(|f| f.name() != *name))
        {
            warn!("Mapping function for '{}' matches no field of the schema", unused);
        }
        Self {
            name: name.into(),
            schema,
            records,
            mapping_funcs,
            csv_cast: false,
        }
    }

    /// Cast CSV cells instead of writing raw values (off by default)
    pub fn with_csv_cast(mut self, cast: bool) -> Self {
        self.csv_cast = cast;
        self
    }

    /// Create an exporter for a dataset
    pub fn from_dataset(
        dataset: &Dataset,
        records: Vec<Record>,
        mapping_funcs: MappingFuncs,
    ) -> Result<Self, ExportError> {
        Ok(Self::new(
            dataset.name.clone(),
            dataset.schema()?,
            records,
            mapping_funcs,
        ))
    }

    /// Dataset name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Schema the rows follow
    pub fn schema(&self) -> &GenericSchema {
        &self.schema
    }

    /// Records to export
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Column headers
    pub fn headers(&self) -> Vec<&str> {
        self.schema.headers()
    }

    /// One row per record, one cell per field. Mapping functions win over the
    /// field cast; without `cast` the remaining cells keep their raw value.
    /// A failing cell never stops the iteration. Each call starts over from
    /// the first record.
    pub fn row_it(&self, cast: bool) -> impl Iterator<Item = Vec<CellOutcome>> + '_ {
        self.records.iter().map(move |record| {
            self.schema
                .fields()
                .iter()
                .map(|field| self.cell(record, field, cast))
                .collect()
        })
    }

    fn cell(&self, record: &Record, field: &SchemaField, cast: bool) -> CellOutcome {
        let raw = record.get(field.name());
        let result = match self.mapping_funcs.get(field.name()) {
            Some(mapping) => mapping(record, field, raw),
            None if cast => field.cast(raw),
            None => {
                return CellOutcome::Raw {
                    value: raw.clone(),
                    error: None,
                }
            }
        };
        match result {
            Ok(value) => CellOutcome::Value(value),
            Err(e) => CellOutcome::Raw {
                value: raw.clone(),
                error: Some(e.to_string()),
            },
        }
    }

    /// Header row followed by every record row as text, uncast unless
    /// [`with_csv_cast`](Self::with_csv_cast) asked otherwise
    pub fn csv_rows(&self) -> impl Iterator<Item = Vec<String>> + '_ {
        let headers: Vec<String> = self.headers().into_iter().map(str::to_string).collect();
        std::iter::once(headers).chain(
            self.row_it(self.csv_cast)
                .map(|row| row.iter().map(CellOutcome::to_text).collect()),
        )
    }

    /// Write CSV with CRLF line endings
    pub fn to_csv<W: Write>(&self, writer: W) -> Result<ExportStats, ExportError> {
        self.write_csv(writer, &[])
    }

    pub(crate) fn write_csv<W: Write>(
        &self,
        writer: W,
        leading_rows: &[&[&str]],
    ) -> Result<ExportStats, ExportError> {
        let mut csv_writer = csv::WriterBuilder::new()
            .flexible(true)
            .terminator(csv::Terminator::CRLF)
            .from_writer(writer);

        for row in leading_rows {
            csv_writer.write_record(*row)?;
        }
        csv_writer.write_record(self.headers())?;

        let mut stats = ExportStats::default();
        for row in self.row_it(self.csv_cast) {
            csv_writer.write_record(row.iter().map(CellOutcome::to_text))?;
            stats.record_row(&row);
        }
        csv_writer.flush()?;

        info!("{}: {}", self.name, stats);
        Ok(stats)
    }

    /// Single worksheet titled with the dataset name: a bold header row, then
    /// one cast row per record
    pub fn to_workbook(&self) -> Workbook {
        let mut workbook = Workbook::new();
        let sheet = workbook.create_sheet(&self.name);
        sheet.append(self.headers().into_iter().map(Cell::bold).collect());

        let mut stats = ExportStats::default();
        for row in self.row_it(true) {
            stats.record_row(&row);
            sheet.append(
                row.into_iter()
                    .map(|cell| Cell::new(cell.into_value()))
                    .collect(),
            );
        }

        info!("{}: {}", self.name, stats);
        workbook
    }
}

/// Exporter for bionet imports: the `External Key` column carries the record
/// id and CSV output starts with two marker rows
#[derive(Debug)]
pub struct BionetExporter {
    inner: Exporter,
}

impl BionetExporter {
    /// Create a bionet exporter
    pub fn new(name: impl Into<String>, schema: GenericSchema, records: Vec<Record>) -> Self {
        Self::with_mapping(name, schema, records, MappingFuncs::new())
    }

    /// Create a bionet exporter with extra mapping functions; the
    /// `External Key` mapping always applies
    pub fn with_mapping(
        name: impl Into<String>,
        schema: GenericSchema,
        records: Vec<Record>,
        extra: MappingFuncs,
    ) -> Self {
        let mut mapping_funcs = extra;
        mapping_funcs.insert(BIONET_EXTERNAL_KEY, record_id);
        Self {
            inner: Exporter::new(name, schema, records, mapping_funcs),
        }
    }

    /// Same as [`Exporter::with_csv_cast`]
    pub fn with_csv_cast(self, cast: bool) -> Self {
        Self {
            inner: self.inner.with_csv_cast(cast),
        }
    }

    /// The wrapped exporter
    pub fn exporter(&self) -> &Exporter {
        &self.inner
    }

    /// Same as [`Exporter::row_it`]
    pub fn row_it(&self, cast: bool) -> impl Iterator<Item = Vec<CellOutcome>> + '_ {
        self.inner.row_it(cast)
    }

    /// Two marker rows, then the same CSV as [`Exporter::to_csv`]
    pub fn to_csv<W: Write>(&self, writer: W) -> Result<ExportStats, ExportError> {
        self.inner
            .write_csv(writer, &[&[BIONET_IGNORED_LINE], &[BIONET_IGNORED_LINE]])
    }

    /// Same as [`Exporter::to_workbook`]
    pub fn to_workbook(&self) -> Workbook {
        self.inner.to_workbook()
    }
}
