use super::*;
use crate::record::Record;
use crate::schema::{Dataset, GenericSchema};
use serde_json::json;

fn observation_dataset() -> Dataset {
    Dataset::new(
        "Fauna",
        json!({
            "fields": [
                { "name": "Observation Date", "type": "date", "format": "any", "constraints": { "required": true } },
                { "name": "Latitude", "type": "number", "constraints": { "required": true } },
                { "name": "Longitude", "type": "number", "constraints": { "required": true } },
                { "name": "Species" }
            ]
        }),
    )
}

#[test]
fn test_report_counts() {
    let mut report = ValidationReport::new("Schema Report", "Fauna");
    report.add_check(ValidationCheck::ok("a"));
    report.add_check(ValidationCheck::warning("b", "hmm"));
    report.add_check(ValidationCheck::failed("c", "no"));
    assert_eq!(report.success_count(), 1);
    assert_eq!(report.warning_count(), 1);
    assert_eq!(report.failure_count(), 1);
    assert!(report.has_failures());
    assert!(report.has_warnings());

    let text = report.to_string();
    assert!(text.starts_with("Schema Report\n=============\nDataset: Fauna\n"));
    assert!(text.contains("[✗] c - FAILED: no"));
    assert!(text.contains("Summary: 1 passed, 1 warnings, 1 failed"));
    assert!(text.trim_end().ends_with("Validation FAILED"));
}

#[test]
fn test_check_schema_observation_passes() {
    let report = check_schema(&observation_dataset(), true);
    assert!(!report.has_failures(), "{}", report);
    assert!(report
        .checks
        .iter()
        .any(|c| c.name == "Observation date field: 'Observation Date'"));
    assert!(report.to_string().contains("Validation PASSED"));
}

#[test]
fn test_check_schema_missing_location() {
    let dataset = Dataset::new(
        "Flora",
        json!({
            "fields": [
                { "name": "Observation Date", "type": "date", "constraints": { "required": true } },
                { "name": "Species" }
            ]
        }),
    );
    let report = check_schema(&dataset, true);
    assert_eq!(report.failure_count(), 2);
    let failed: Vec<&str> = report
        .checks
        .iter()
        .filter(|c| matches!(c.status, CheckStatus::Failed(_)))
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(failed, vec!["Latitude field", "Longitude field"]);

    // the same schema is fine as a generic dataset
    assert!(!check_schema(&dataset, false).has_failures());
}

#[test]
fn test_check_schema_shared_coordinate() {
    let dataset = Dataset::new(
        "Odd",
        json!({
            "fields": [
                { "name": "When", "type": "date", "constraints": { "required": true } },
                { "name": "Coordinate", "type": "number", "constraints": { "required": true } }
            ]
        }),
    );
    let report = check_schema(&dataset, true);
    assert_eq!(report.failure_count(), 1);
    assert_eq!(report.checks.last().unwrap().name, "Location fields");
}

#[test]
fn test_check_schema_invalid_descriptor() {
    let dataset = Dataset::new("Broken", json!({ "fields": [{ "title": "no name" }] }));
    let report = check_schema(&dataset, false);
    assert_eq!(report.checks.len(), 1);
    assert!(report.has_failures());
}

#[test]
fn test_check_schema_warnings() {
    let dataset = Dataset::new(
        "Dupes",
        json!({
            "fields": [
                { "name": "Species" },
                { "name": "Species" },
                { "name": "Zone", "biosys": { "type": "utmZone" } }
            ]
        }),
    );
    let report = check_schema(&dataset, false);
    assert!(!report.has_failures());
    assert_eq!(report.warning_count(), 2);
    assert!(report.to_string().contains("duplicated: 'Species'"));
    assert!(report.to_string().contains("ignored on 'Zone'"));
}

#[test]
fn test_check_schema_mistyped_tag_is_a_warning() {
    let dataset = Dataset::new(
        "Fauna",
        json!({
            "fields": [
                { "name": "obs", "constraints": { "required": true },
                  "biosys": { "type": "observationDate" } },
                { "name": "Observation Date", "type": "date", "constraints": { "required": true } },
                { "name": "Latitude", "type": "number", "constraints": { "required": true } },
                { "name": "Longitude", "type": "number", "constraints": { "required": true } }
            ]
        }),
    );
    let report = check_schema(&dataset, true);
    assert!(!report.has_failures(), "{}", report);
    assert_eq!(report.warning_count(), 1);
    let text = report.to_string();
    assert!(text.contains("[⚠] observationDate tag - WARNING: ignored on 'obs' (not of type date)"));
    assert!(text.contains("Observation date field: 'Observation Date'"));
}

#[test]
fn test_check_records() {
    let schema = observation_dataset().schema().unwrap();
    let records = vec![
        Record::from_pairs(
            1,
            [("Observation Date", "23/12/2016"), ("Latitude", "-32"), ("Longitude", "115")],
        ),
        Record::from_pairs(
            2,
            [("Observation Date", "someday"), ("Latitude", "-32"), ("Notes", "x")],
        ),
    ];
    let report = check_records("Fauna", &schema, &records);
    assert_eq!(report.failure_count(), 2);
    assert_eq!(report.warning_count(), 1);
    assert_eq!(report.checks[0].name, "Record 2");
    let text = report.to_string();
    assert!(text.contains("not in the schema: 'Notes'"));
    assert!(text.contains("1 of 2 records valid"));
}

#[test]
fn test_check_records_all_valid() {
    let schema = GenericSchema::new(&json!({ "fields": [{ "name": "Species" }] })).unwrap();
    let records = vec![Record::from_pairs(1, [("species", "Egernia kingii")])];
    let report = check_records("Flora", &schema, &records);
    assert!(!report.has_failures());
    assert!(!report.has_warnings());
    assert_eq!(report.checks[0].name, "1 of 1 records valid");
}

#[test]
fn test_format_colored_mentions_every_check() {
    let report = check_schema(&observation_dataset(), true);
    let colored = report.format_colored();
    for check in &report.checks {
        assert!(colored.contains(&check.name));
    }
}
