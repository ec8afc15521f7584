//! Observation schema resolution and casting through the public API.

use biosys_schema::prelude::*;
use biosys_schema::schema::{dates, is_blank, FALSE_VALUES, NULL_VALUES, TRUE_VALUES};
use chrono::{Datelike, NaiveDate};
use serde_json::{json, Value};

fn survey_schema() -> Value {
    json!({
        "fields": [
            { "name": "Site Code", "constraints": { "required": true } },
            {
                "name": "Visit Date",
                "type": "date",
                "format": "any",
                "constraints": { "required": true },
                "biosys": { "type": "observationDate" }
            },
            { "name": "Follow-up Date", "type": "date", "format": "any" },
            {
                "name": "lat",
                "title": "Latitude (GDA94)",
                "type": "number",
                "constraints": { "required": true, "minimum": -90, "maximum": 90 },
                "biosys": { "type": "latitude" }
            },
            {
                "name": "Longitude",
                "type": "number",
                "constraints": { "required": true, "minimum": -180, "maximum": 180 }
            },
            { "name": "Count", "type": "integer", "constraints": { "minimum": 0 } }
        ]
    })
}

#[test]
fn test_tagged_and_named_fields_resolve() {
    let schema = ObservationSchema::new(&survey_schema()).unwrap();
    assert_eq!(schema.observation_date_field().name(), "Visit Date");
    assert_eq!(schema.latitude_field().name(), "lat");
    assert_eq!(schema.longitude_field().name(), "Longitude");
    assert_eq!(schema.schema().headers()[3], "Latitude (GDA94)");
}

#[test]
fn test_cast_survey_record() {
    let schema = ObservationSchema::new(&survey_schema()).unwrap();
    let record = Record::from_pairs(
        5,
        [
            ("Site Code", json!("KP01")),
            ("Visit Date", json!("29-July-16")),
            ("lat", json!(-31.95)),
            ("Longitude", json!("115.86")),
            ("Count", json!("3")),
        ],
    );

    assert_eq!(
        schema.cast_record_observation_date(&record).unwrap(),
        NaiveDate::from_ymd_opt(2016, 7, 29).unwrap()
    );
    let location = schema.cast_record_location(&record).unwrap();
    assert_eq!(location.latitude, -31.95);
    assert_eq!(location.longitude, 115.86);

    let cast = schema.schema().cast_record(&record).unwrap();
    assert_eq!(cast["Count"], FieldValue::Integer(3));
    assert_eq!(cast["Follow-up Date"], FieldValue::Null);
}

#[test]
fn test_schema_from_data_package_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("survey.json");
    let package = json!({
        "name": "kings-park",
        "resources": [{ "name": "visits", "path": "visits.csv", "schema": survey_schema() }]
    });
    std::fs::write(&path, package.to_string()).unwrap();

    let dataset = Dataset::from_file(&path).unwrap();
    assert_eq!(dataset.name, "kings-park");
    assert!(ObservationSchema::from_schema(dataset.schema().unwrap()).is_ok());

    let bare = dir.path().join("bare-schema.json");
    std::fs::write(&bare, survey_schema().to_string()).unwrap();
    assert_eq!(Dataset::from_file(&bare).unwrap().name, "bare-schema");
}

#[test]
fn test_ambiguous_schema_is_rejected() {
    let mut descriptor = survey_schema();
    descriptor["fields"][2]["biosys"] = json!({ "type": "observationDate" });
    descriptor["fields"][2]["constraints"] = json!({ "required": true });
    let err = ObservationSchema::new(&descriptor).unwrap_err();
    assert!(matches!(err, SchemaError::ObservationSchema(_)));
    assert!(err.to_string().contains("Visit Date"));
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    fn any_date() -> impl Strategy<Value = NaiveDate> {
        (1970i32..2068, 1u32..=12, 1u32..=28)
            .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    fn mixed_case(s: &'static str) -> impl Strategy<Value = String> {
        prop::collection::vec(any::<bool>(), s.len()).prop_map(move |upper| {
            s.chars()
                .zip(upper)
                .map(|(c, u)| if u { c.to_ascii_uppercase() } else { c })
                .collect()
        })
    }

    proptest! {
        /// Day-first wins whenever both readings of a slashed date are valid
        #[test]
        fn test_day_first_tie_break(date in any_date()) {
            let text = format!("{:02}/{:02}/{}", date.day(), date.month(), date.year());
            prop_assert_eq!(dates::parse_any_date(&text), Some(date));
        }

        /// Month-first is only used when the day-first reading is impossible
        #[test]
        fn test_month_first_fallback(date in any_date().prop_filter("day > 12", |d| d.day() > 12)) {
            let text = format!("{:02}/{:02}/{}", date.month(), date.day(), date.year());
            prop_assert_eq!(dates::parse_any_date(&text), Some(date));
        }

        /// ISO dates read the same with `default` and `any`
        #[test]
        fn test_iso_dates_agree(date in any_date()) {
            let text = date.format("%Y-%m-%d").to_string();
            prop_assert_eq!(dates::parse_iso_date(&text), Some(date));
            prop_assert_eq!(dates::parse_any_date(&text), Some(date));
        }

        /// Two-digit years pivot into 1969..2068
        #[test]
        fn test_two_digit_years(date in any_date().prop_filter("after 1969", |d| d.year() >= 1969)) {
            let text = format!("{:02}-{:02}-{:02}", date.day(), date.month(), date.year() % 100);
            prop_assert_eq!(dates::parse_any_date(&text), Some(date));
        }

        /// The boolean sets are matched ignoring case and surrounding blanks
        #[test]
        fn test_boolean_sets(idx in 0usize..5, truthy in any::<bool>(), pad in "[ \t]{0,2}") {
            let field = SchemaField::new(&json!({ "name": "Present", "type": "boolean" })).unwrap();
            let token = if truthy { TRUE_VALUES[idx] } else { FALSE_VALUES[idx] };
            let raw = json!(format!("{pad}{}{pad}", token.to_uppercase()));
            prop_assert_eq!(field.cast(&raw).unwrap(), FieldValue::Boolean(truthy));
        }

        /// Null tokens are blank in any casing, and fail required fields
        #[test]
        fn test_null_tokens(token in prop::sample::select(NULL_VALUES.to_vec()).prop_flat_map(mixed_case)) {
            let raw = json!(token);
            prop_assert!(is_blank(&raw));
            let required = SchemaField::new(&json!({
                "name": "Species",
                "constraints": { "required": true }
            })).unwrap();
            prop_assert!(required.cast(&raw).unwrap_err().is_constraint());
            let optional = SchemaField::new(&json!({ "name": "Notes" })).unwrap();
            prop_assert_eq!(optional.cast(&raw).unwrap(), FieldValue::Null);
        }

        /// Numbers inside the bounds cast, numbers outside are constraint errors
        #[test]
        fn test_latitude_bounds(lat in -180.0f64..180.0) {
            let schema = ObservationSchema::new(&survey_schema()).unwrap();
            let record = Record::from_pairs(1, [("lat", json!(lat.to_string()))]);
            let result = schema.cast_record_latitude(&record);
            if (-90.0..=90.0).contains(&lat) {
                prop_assert_eq!(result.unwrap(), lat);
            } else {
                prop_assert!(result.unwrap_err().is_constraint());
            }
        }
    }
}
