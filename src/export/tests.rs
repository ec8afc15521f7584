use super::*;
use crate::record::Record;
use crate::schema::{FieldValue, GenericSchema, SchemaError};
use serde_json::{json, Value};

fn schema() -> GenericSchema {
    GenericSchema::new(&json!({
        "fields": [
            {
                "name": "Observation Date",
                "type": "date",
                "format": "any",
                "constraints": { "required": true }
            },
            { "name": "Latitude", "type": "number" },
            { "name": "Present", "title": "Is Present", "type": "boolean" },
            { "name": "External Key" }
        ]
    }))
    .unwrap()
}

fn records() -> Vec<Record> {
    vec![
        Record::from_pairs(
            11,
            [
                ("Observation Date", "23/12/2016"),
                ("Latitude", "-32.123456789"),
                ("Present", "yes"),
            ],
        ),
        Record::from_pairs(
            12,
            [
                ("Observation Date", "not a date"),
                ("Latitude", "north"),
                ("Present", "n"),
            ],
        ),
    ]
}

fn csv_lines(bytes: Vec<u8>) -> Vec<String> {
    String::from_utf8(bytes)
        .unwrap()
        .split("\r\n")
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[test]
fn test_row_it_cast_keeps_failures_raw() {
    let exporter = Exporter::new("Fauna", schema(), records(), MappingFuncs::new());
    let rows: Vec<_> = exporter.row_it(true).collect();
    assert_eq!(rows.len(), 2);

    let date = chrono::NaiveDate::from_ymd_opt(2016, 12, 23).unwrap();
    assert_eq!(rows[0][0], CellOutcome::Value(FieldValue::Date(date)));
    assert_eq!(rows[0][1], CellOutcome::Value(FieldValue::Number(-32.123456789)));
    assert_eq!(rows[0][2], CellOutcome::Value(FieldValue::Boolean(true)));
    assert_eq!(rows[0][3], CellOutcome::Value(FieldValue::Null));

    assert!(rows[1][0].is_error());
    assert!(rows[1][0].error().unwrap().contains("Observation Date"));
    assert_eq!(rows[1][0].to_text(), "not a date");
    assert!(rows[1][1].is_error());
    assert_eq!(rows[1][2], CellOutcome::Value(FieldValue::Boolean(false)));
}

#[test]
fn test_row_it_without_cast_is_raw() {
    let exporter = Exporter::new("Fauna", schema(), records(), MappingFuncs::new());
    let row = exporter.row_it(false).next().unwrap();
    assert_eq!(
        row[1],
        CellOutcome::Raw {
            value: json!("-32.123456789"),
            error: None
        }
    );
    assert!(row.iter().all(|cell| !cell.is_error()));
    assert_eq!(row[3].to_text(), "");
}

#[test]
fn test_row_it_is_restartable() {
    let exporter = Exporter::new("Fauna", schema(), records(), MappingFuncs::new());
    let first: Vec<_> = exporter.row_it(true).collect();
    let second: Vec<_> = exporter.row_it(true).collect();
    assert_eq!(first, second);
}

#[test]
fn test_mapping_takes_precedence_over_cast() {
    let mapping = MappingFuncs::new().with("Latitude", |_, _, _| Ok(FieldValue::from("hidden")));
    let exporter = Exporter::new("Fauna", schema(), records(), mapping);

    for cast in [true, false] {
        for row in exporter.row_it(cast) {
            assert_eq!(row[1], CellOutcome::Value(FieldValue::from("hidden")));
        }
    }
}

#[test]
fn test_failing_mapping_keeps_raw_value() {
    let mapping = MappingFuncs::new().with("Latitude", |_, field, raw| field.cast(raw));
    let exporter = Exporter::new("Fauna", schema(), records(), mapping);
    let rows: Vec<_> = exporter.row_it(false).collect();
    assert_eq!(rows[0][1], CellOutcome::Value(FieldValue::Number(-32.123456789)));
    assert_eq!(
        rows[1][1],
        CellOutcome::Raw {
            value: json!("north"),
            error: rows[1][1].error().map(str::to_string)
        }
    );
    assert!(rows[1][1].is_error());
}

#[test]
fn test_mapping_funcs_from_spec() {
    let mapping = MappingFuncs::from_spec(&json!({
        "Latitude": { "round": 2 },
        "External Key": "record_id",
        "Present": { "constant": "unknown" }
    }))
    .unwrap();
    assert_eq!(mapping.names(), vec!["External Key", "Latitude", "Present"]);

    let exporter = Exporter::new("Fauna", schema(), records(), mapping);
    let rows: Vec<_> = exporter.row_it(false).collect();
    assert_eq!(rows[0][1], CellOutcome::Value(FieldValue::Number(-32.12)));
    assert_eq!(rows[0][2], CellOutcome::Value(FieldValue::from("unknown")));
    assert_eq!(rows[0][3], CellOutcome::Value(FieldValue::Integer(11)));
    assert_eq!(rows[1][3], CellOutcome::Value(FieldValue::Integer(12)));
    assert!(rows[1][1].is_error());
}

#[test]
fn test_mapping_funcs_from_spec_rejects_bad_shapes() {
    for spec in [json!([]), json!("record_id"), json!(null), json!(3)] {
        assert!(matches!(
            MappingFuncs::from_spec(&spec),
            Err(ExportError::InvalidMappingFuncs(_))
        ));
    }
    for spec in [
        json!({ "Latitude": "lowercase" }),
        json!({ "Latitude": { "round": -1 } }),
        json!({ "Latitude": { "round": 2, "constant": 3 } }),
        json!({ "Latitude": { "floor": 2 } }),
    ] {
        assert!(matches!(
            MappingFuncs::from_spec(&spec),
            Err(ExportError::InvalidMappingFuncs(_))
        ));
    }
}

#[test]
fn test_csv_rows() {
    let exporter = Exporter::new("Fauna", schema(), records(), MappingFuncs::new());
    let rows: Vec<Vec<String>> = exporter.csv_rows().collect();
    assert_eq!(rows.len(), 3);
    assert_eq!(
        rows[0],
        vec!["Observation Date", "Latitude", "Is Present", "External Key"]
    );
    assert_eq!(rows[1], vec!["23/12/2016", "-32.123456789", "yes", ""]);
}

#[test]
fn test_to_csv() {
    let exporter = Exporter::new("Fauna", schema(), records(), MappingFuncs::new());
    let mut out = Vec::new();
    let stats = exporter.to_csv(&mut out).unwrap();

    let lines = csv_lines(out);
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "Observation Date,Latitude,Is Present,External Key");
    assert_eq!(lines[2], "not a date,north,n,");
    assert_eq!(stats.rows_written, 2);
    assert_eq!(stats.cells_uncast, 0);
}

#[test]
fn test_bionet_csv() {
    let exporter = BionetExporter::new("Fauna", schema(), records());
    let mut out = Vec::new();
    exporter.to_csv(&mut out).unwrap();

    let lines = csv_lines(out);
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0], BIONET_IGNORED_LINE);
    assert_eq!(lines[1], BIONET_IGNORED_LINE);
    assert_eq!(lines[2], "Observation Date,Latitude,Is Present,External Key");
    assert_eq!(lines[3], "23/12/2016,-32.123456789,yes,11");
    assert_eq!(lines[4], "not a date,north,n,12");
}

#[test]
fn test_bionet_keeps_extra_mapping() {
    let extra = MappingFuncs::from_spec(&json!({ "Latitude": { "round": 1 } })).unwrap();
    let exporter = BionetExporter::with_mapping("Fauna", schema(), records(), extra);
    let row = exporter.row_it(false).next().unwrap();
    assert_eq!(row[1], CellOutcome::Value(FieldValue::Number(-32.1)));
    assert_eq!(row[3], CellOutcome::Value(FieldValue::Integer(11)));
}

#[test]
fn test_to_workbook() {
    let exporter = Exporter::new("Fauna survey", schema(), records(), MappingFuncs::new());
    let workbook = exporter.to_workbook();
    assert_eq!(workbook.sheets().len(), 1);

    let sheet = workbook.sheet("Fauna survey").unwrap();
    assert_eq!(sheet.row_count(), 3);
    assert!(sheet.rows()[0].iter().all(|cell| cell.bold));
    assert_eq!(sheet.rows()[0][2].value, FieldValue::from("Is Present"));

    let first = &sheet.rows()[1];
    assert!(first.iter().all(|cell| !cell.bold));
    assert_eq!(first[1].value, FieldValue::Number(-32.123456789));
    assert_eq!(first[2].value, FieldValue::Boolean(true));

    // uncast cells keep the raw string
    assert_eq!(sheet.rows()[2][0].value, FieldValue::from("not a date"));
}

#[test]
fn test_sheet_title_is_sanitized() {
    assert_eq!(sanitize_title("Fauna: 2016/17"), "Fauna_ 2016_17");
    assert_eq!(sanitize_title(""), "Sheet1");
    let long = "A".repeat(40);
    assert_eq!(sanitize_title(&long).chars().count(), MAX_TITLE_LEN);
}

#[test]
fn test_from_dataset() {
    let dataset = crate::schema::Dataset::new("Flora", json!({ "fields": "oops" }));
    let err = Exporter::from_dataset(&dataset, vec![], MappingFuncs::new()).unwrap_err();
    assert!(matches!(
        err,
        ExportError::SchemaError(SchemaError::InvalidDescriptor(_))
    ));

    let dataset = crate::schema::Dataset::new("Flora", json!({ "fields": [{ "name": "Species" }] }));
    let exporter = Exporter::from_dataset(&dataset, vec![], MappingFuncs::new()).unwrap();
    assert_eq!(exporter.name(), "Flora");
    assert_eq!(exporter.headers(), vec!["Species"]);
    assert_eq!(exporter.row_it(true).count(), 0);
}

#[test]
fn test_record_id_mapping_ignores_value() {
    let schema = schema();
    let field = &schema.fields()[3];
    let record = Record::from_pairs(99, [("External Key", Value::from("ignored"))]);
    assert_eq!(
        record_id(&record, field, record.get("External Key")).unwrap(),
        FieldValue::Integer(99)
    );
}

#[cfg(feature = "xlsx")]
#[test]
fn test_save_xlsx() {
    let exporter = Exporter::new("Fauna", schema(), records(), MappingFuncs::new());
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fauna.xlsx");
    exporter.to_workbook().save_xlsx(&path).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    // xlsx files are zip archives
    assert_eq!(&bytes[..2], b"PK");
}

#[test]
fn test_csv_cast_writes_canonical_values() {
    let exporter =
        Exporter::new("Fauna", schema(), records(), MappingFuncs::new()).with_csv_cast(true);
    let mut out = Vec::new();
    let stats = exporter.to_csv(&mut out).unwrap();

    let lines = csv_lines(out);
    assert_eq!(lines[1], "2016-12-23,-32.123456789,true,");
    assert_eq!(lines[2], "not a date,north,false,");
    assert_eq!(stats.cells_uncast, 2);
    assert_eq!(stats.cells_typed, 6);
}
