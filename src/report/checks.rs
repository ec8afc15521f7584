use std::collections::{BTreeSet, HashSet};

use log::debug;

use super::{ValidationCheck, ValidationReport};
use crate::record::Record;
use crate::schema::{
    Dataset, GenericSchema, ObservationRole, ObservationSchema, SchemaError, BIOSYS_KEY,
};

/// Failing records listed one by one before the rest are summarised
const MAX_LISTED_RECORDS: usize = 50;

/// Check a dataset schema. With `observation`, the observation date and
/// location fields must resolve as well.
pub fn check_schema(dataset: &Dataset, observation: bool) -> ValidationReport {
    let mut report = ValidationReport::new("Schema Report", &dataset.name);

    let schema = match dataset.schema() {
        Ok(schema) => {
            report.add_check(ValidationCheck::ok(format!(
                "Schema descriptor ({} fields)",
                schema.fields().len()
            )));
            schema
        }
        Err(e) => {
            report.add_check(ValidationCheck::failed("Schema descriptor", e.to_string()));
            return report;
        }
    };

    if schema.fields().is_empty() {
        report.add_check(ValidationCheck::warning("Fields", "the schema has no fields"));
    }

    let mut seen = HashSet::new();
    let duplicates: BTreeSet<&str> = schema
        .field_names()
        .into_iter()
        .filter(|name| !seen.insert(*name))
        .collect();
    if duplicates.is_empty() {
        report.add_check(ValidationCheck::ok("Unique field names"));
    } else {
        report.add_check(ValidationCheck::warning(
            "Unique field names",
            format!("duplicated: {}", quoted(duplicates)),
        ));
    }

    let unrecognised: Vec<&str> = schema
        .fields()
        .iter()
        .filter(|f| f.biosys_role().is_none())
        .filter(|f| matches!(f.get(BIOSYS_KEY), Some(block) if !block.is_null()))
        .map(|f| f.name())
        .collect();
    if !unrecognised.is_empty() {
        report.add_check(ValidationCheck::warning(
            "Biosys tags",
            format!("ignored on {}", quoted(unrecognised)),
        ));
    }

    if observation {
        check_observation_fields(&mut report, &schema);
    }

    debug!(
        "Schema checks for '{}': {} passed, {} warnings, {} failed",
        report.dataset,
        report.success_count(),
        report.warning_count(),
        report.failure_count()
    );
    report
}

fn check_observation_fields(report: &mut ValidationReport, schema: &GenericSchema) {
    let roles = [
        ObservationRole::ObservationDate,
        ObservationRole::Latitude,
        ObservationRole::Longitude,
    ];
    let mut all_resolved = true;
    for role in roles {
        let name = format!("{} field", capitalize(&role.to_string()));
        let mistyped: Vec<&str> = schema
            .fields()
            .iter()
            .filter(|f| f.biosys_role() == Some(role.biosys_role()))
            .filter(|f| f.field_type() != role.base_type())
            .map(|f| f.name())
            .collect();
        if !mistyped.is_empty() {
            report.add_check(ValidationCheck::warning(
                format!("{} tag", role.biosys_role()),
                format!(
                    "ignored on {} (not of type {})",
                    quoted(mistyped),
                    role.base_type()
                ),
            ));
        }
        match ObservationSchema::find_field(schema, role) {
            Ok(field) => {
                report.add_check(ValidationCheck::ok(format!("{}: '{}'", name, field.name())));
            }
            Err(e) => {
                all_resolved = false;
                report.add_check(ValidationCheck::failed(name, message(&e)));
            }
        }
    }
    if all_resolved {
        if let Err(e) = ObservationSchema::from_schema(schema.clone()) {
            report.add_check(ValidationCheck::failed("Location fields", message(&e)));
        }
    }
}

/// Cast every record against the schema
pub fn check_records(
    dataset_name: &str,
    schema: &GenericSchema,
    records: &[Record],
) -> ValidationReport {
    let mut report = ValidationReport::new("Records Report", dataset_name);

    let mut unknown_columns = BTreeSet::new();
    let mut failing = 0;
    for record in records {
        for column in record.data.keys() {
            if schema.field_by_name(column, true).is_none() {
                unknown_columns.insert(column.as_str());
            }
        }

        let validation = schema.validate_record(record);
        if validation.is_valid() {
            continue;
        }
        failing += 1;
        if failing <= MAX_LISTED_RECORDS {
            let messages: Vec<&str> = validation.errors.iter().map(|(_, m)| m.as_str()).collect();
            report.add_check(ValidationCheck::failed(
                format!("Record {}", record.id),
                messages.join("; "),
            ));
        }
    }

    if failing > MAX_LISTED_RECORDS {
        report.add_check(ValidationCheck::failed(
            "More records",
            format!("{} more invalid records not listed", failing - MAX_LISTED_RECORDS),
        ));
    }
    if !unknown_columns.is_empty() {
        report.add_check(ValidationCheck::warning(
            "Columns",
            format!("not in the schema: {}", quoted(unknown_columns)),
        ));
    }
    report.add_check(if failing == 0 {
        ValidationCheck::ok(format!("{} of {} records valid", records.len(), records.len()))
    } else {
        ValidationCheck::failed(
            "Records",
            format!("{} of {} records valid", records.len() - failing, records.len()),
        )
    });
    report
}

fn quoted<'a>(names: impl IntoIterator<Item = &'a str>) -> String {
    names
        .into_iter()
        .map(|n| format!("'{}'", n))
        .collect::<Vec<_>>()
        .join(", ")
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// The error text without its "Observation schema error: " prefix
fn message(e: &SchemaError) -> String {
    match e {
        SchemaError::ObservationSchema(msg) => msg.clone(),
        other => other.to_string(),
    }
}
