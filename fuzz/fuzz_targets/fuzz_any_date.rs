#![no_main]

use biosys_schema::schema::{dates, SchemaField};
use libfuzzer_sys::fuzz_target;
use serde_json::{json, Value};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    // The date parsers must reject garbage, never panic on it
    let _ = dates::parse_any_date(text);
    let _ = dates::parse_any_datetime(text);
    let _ = dates::parse_any_time(text);

    // A parsed date must survive a round trip through the ISO layout
    if let Some(date) = dates::parse_any_date(text) {
        let iso = date.format("%Y-%m-%d").to_string();
        assert_eq!(dates::parse_iso_date(&iso), Some(date));
    }

    // Field casts report errors instead of panicking
    for descriptor in [
        json!({ "name": "d", "type": "date", "format": "any" }),
        json!({ "name": "n", "type": "number", "constraints": { "minimum": -90, "maximum": 90 } }),
        json!({ "name": "i", "type": "integer" }),
        json!({ "name": "b", "type": "boolean" }),
    ] {
        if let Ok(field) = SchemaField::new(&descriptor) {
            let _ = field.cast(&Value::String(text.to_string()));
        }
    }
});
