//! Per-type casting of raw record values and constraint enforcement.

use std::cmp::Ordering;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use super::dates;
use super::field::{FieldFormat, FieldType, NumberOptions, SchemaField};
use super::{FieldValue, SchemaError};

/// Case-insensitive tokens treated as a missing value
pub const NULL_VALUES: [&str; 6] = ["", "null", "none", "nil", "nan", "-"];

/// Case-insensitive tokens cast to `true`
pub const TRUE_VALUES: [&str; 5] = ["true", "yes", "y", "t", "1"];

/// Case-insensitive tokens cast to `false`
pub const FALSE_VALUES: [&str; 5] = ["false", "no", "n", "f", "0"];

/// Whether a raw value counts as blank
pub fn is_blank(raw: &Value) -> bool {
    match raw {
        Value::Null => true,
        Value::String(s) => {
            let s = s.trim().to_lowercase();
            NULL_VALUES.contains(&s.as_str())
        }
        _ => false,
    }
}

pub(crate) fn cast_value(field: &SchemaField, raw: &Value) -> Result<FieldValue, SchemaError> {
    if is_blank(raw) {
        if field.required() {
            return Err(SchemaError::constraint(field.name(), "a value is required"));
        }
        return Ok(FieldValue::Null);
    }
    let value = cast_type(field, raw)?;
    check_constraints(field, &value)?;
    Ok(value)
}

fn cast_type(field: &SchemaField, raw: &Value) -> Result<FieldValue, SchemaError> {
    match field.field_type() {
        FieldType::String => cast_string(field, raw),
        FieldType::Number => cast_number(field, raw),
        FieldType::Integer => cast_integer(field, raw),
        FieldType::Boolean => cast_boolean(field, raw),
        FieldType::Date => cast_date(field, raw),
        FieldType::DateTime => cast_datetime(field, raw),
        FieldType::Time => cast_time(field, raw),
        FieldType::Year => cast_year(field, raw),
        FieldType::YearMonth => cast_year_month(field, raw),
        FieldType::Object | FieldType::Array | FieldType::GeoJson => cast_json(field, raw),
        FieldType::Any => Ok(match raw {
            Value::String(s) => FieldValue::String(s.clone()),
            other => FieldValue::Json(other.clone()),
        }),
    }
}

fn text<'a>(field: &SchemaField, raw: &'a Value) -> Result<&'a str, SchemaError> {
    raw.as_str()
        .map(str::trim)
        .ok_or_else(|| {
            SchemaError::cast(field.name(), raw, format!("expected a {} string", field.field_type()))
        })
}

fn cast_string(field: &SchemaField, raw: &Value) -> Result<FieldValue, SchemaError> {
    let s = match raw {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return Err(SchemaError::cast(field.name(), raw, "expected a string")),
    };
    if let FieldFormat::Named(format) = field.format() {
        let valid = match format.as_str() {
            "email" => email_re().is_match(&s),
            "uri" => uri_re().is_match(&s),
            "uuid" => uuid::Uuid::parse_str(&s).is_ok(),
            _ => true,
        };
        if !valid {
            return Err(SchemaError::cast(field.name(), raw, format!("not a valid {}", format)));
        }
    }
    Ok(FieldValue::String(s))
}

fn cast_number(field: &SchemaField, raw: &Value) -> Result<FieldValue, SchemaError> {
    let n = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_number_text(s, field.number_options()),
        _ => None,
    };
    n.map(FieldValue::Number)
        .ok_or_else(|| SchemaError::cast(field.name(), raw, "not a number"))
}

fn cast_integer(field: &SchemaField, raw: &Value) -> Result<FieldValue, SchemaError> {
    let i = match raw {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(whole_f64_to_i64)),
        Value::String(s) => {
            let cleaned = clean_number_text(s, field.number_options());
            cleaned.strip_prefix('+').unwrap_or(&cleaned).parse().ok()
        }
        _ => None,
    };
    i.map(FieldValue::Integer)
        .ok_or_else(|| SchemaError::cast(field.name(), raw, "not an integer"))
}

// `as` saturates, so out-of-range values must be rejected before converting
fn whole_f64_to_i64(f: f64) -> Option<i64> {
    let in_range = f >= i64::MIN as f64 && f < i64::MAX as f64;
    (f.is_finite() && f.fract() == 0.0 && in_range).then_some(f as i64)
}

fn cast_boolean(field: &SchemaField, raw: &Value) -> Result<FieldValue, SchemaError> {
    let b = match raw {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_f64() {
            Some(v) if v == 1.0 => Some(true),
            Some(v) if v == 0.0 => Some(false),
            _ => None,
        },
        Value::String(s) => {
            let s = s.trim().to_lowercase();
            if TRUE_VALUES.contains(&s.as_str()) {
                Some(true)
            } else if FALSE_VALUES.contains(&s.as_str()) {
                Some(false)
            } else {
                None
            }
        }
        _ => None,
    };
    b.map(FieldValue::Boolean)
        .ok_or_else(|| SchemaError::cast(field.name(), raw, "not a boolean"))
}

fn cast_date(field: &SchemaField, raw: &Value) -> Result<FieldValue, SchemaError> {
    let s = text(field, raw)?;
    let parsed = match field.format() {
        FieldFormat::Default => dates::parse_iso_date(s),
        FieldFormat::Any => dates::parse_any_date(s),
        FieldFormat::Pattern(pattern) => dates::parse_date_with(s, pattern),
        FieldFormat::Named(format) => return Err(unsupported_format(field, raw, format)),
    };
    parsed
        .map(FieldValue::Date)
        .ok_or_else(|| SchemaError::cast(field.name(), raw, "not a valid date"))
}

fn cast_datetime(field: &SchemaField, raw: &Value) -> Result<FieldValue, SchemaError> {
    let s = text(field, raw)?;
    let parsed = match field.format() {
        FieldFormat::Default => dates::parse_iso_datetime(s),
        FieldFormat::Any => dates::parse_any_datetime(s),
        FieldFormat::Pattern(pattern) => dates::parse_datetime_with(s, pattern),
        FieldFormat::Named(format) => return Err(unsupported_format(field, raw, format)),
    };
    parsed
        .map(FieldValue::DateTime)
        .ok_or_else(|| SchemaError::cast(field.name(), raw, "not a valid datetime"))
}

fn cast_time(field: &SchemaField, raw: &Value) -> Result<FieldValue, SchemaError> {
    let s = text(field, raw)?;
    let parsed = match field.format() {
        FieldFormat::Default => dates::parse_iso_time(s),
        FieldFormat::Any => dates::parse_any_time(s),
        FieldFormat::Pattern(pattern) => dates::parse_time_with(s, pattern),
        FieldFormat::Named(format) => return Err(unsupported_format(field, raw, format)),
    };
    parsed
        .map(FieldValue::Time)
        .ok_or_else(|| SchemaError::cast(field.name(), raw, "not a valid time"))
}

fn cast_year(field: &SchemaField, raw: &Value) -> Result<FieldValue, SchemaError> {
    let year = match raw {
        Value::Number(n) => n.as_i64().and_then(|y| i32::try_from(y).ok()),
        Value::String(s) => {
            let s = s.trim();
            if s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit()) {
                s.parse().ok()
            } else {
                None
            }
        }
        _ => None,
    };
    year.map(FieldValue::Year)
        .ok_or_else(|| SchemaError::cast(field.name(), raw, "not a valid year"))
}

fn cast_year_month(field: &SchemaField, raw: &Value) -> Result<FieldValue, SchemaError> {
    let parsed = match raw {
        Value::String(s) => s.trim().split_once('-').and_then(|(y, m)| {
            if y.len() != 4 || m.len() != 2 {
                return None;
            }
            Some((y.parse::<i32>().ok()?, m.parse::<u32>().ok()?))
        }),
        Value::Array(items) if items.len() == 2 => items[0]
            .as_i64()
            .zip(items[1].as_u64())
            .and_then(|(y, m)| Some((i32::try_from(y).ok()?, u32::try_from(m).ok()?))),
        _ => None,
    };
    match parsed {
        Some((y, m)) if (1..=12).contains(&m) => Ok(FieldValue::YearMonth(y, m)),
        _ => Err(SchemaError::cast(field.name(), raw, "not a valid yearmonth")),
    }
}

fn cast_json(field: &SchemaField, raw: &Value) -> Result<FieldValue, SchemaError> {
    let value = match raw {
        Value::String(s) => serde_json::from_str(s)
            .map_err(|e| SchemaError::cast(field.name(), raw, format!("invalid JSON: {}", e)))?,
        other => other.clone(),
    };
    let valid = match field.field_type() {
        FieldType::Object => value.is_object(),
        FieldType::Array => value.is_array(),
        FieldType::GeoJson => value.get("type").and_then(Value::as_str).is_some(),
        _ => true,
    };
    if !valid {
        return Err(SchemaError::cast(
            field.name(),
            raw,
            format!("not a valid {}", field.field_type()),
        ));
    }
    Ok(FieldValue::Json(value))
}

fn unsupported_format(field: &SchemaField, raw: &Value, format: &str) -> SchemaError {
    SchemaError::cast(
        field.name(),
        raw,
        format!("unsupported {} format '{}'", field.field_type(), format),
    )
}

/// Strip group characters, normalise the decimal separator and, unless the
/// field wants bare numbers, drop non-numeric decoration such as `%` or `$`.
fn clean_number_text(s: &str, options: &NumberOptions) -> String {
    let mut cleaned: String = s
        .trim()
        .chars()
        .filter(|c| Some(*c) != options.group_char)
        .map(|c| if c == options.decimal_char { '.' } else { c })
        .collect();
    if !options.bare_number {
        let is_numeric = |c: char| c.is_ascii_digit() || c == '.' || c == '-' || c == '+';
        cleaned = cleaned
            .trim_start_matches(|c: char| !is_numeric(c))
            .trim_end_matches(|c: char| !c.is_ascii_digit() && c != '.')
            .to_string();
    }
    cleaned
}

fn parse_number_text(s: &str, options: &NumberOptions) -> Option<f64> {
    let cleaned = clean_number_text(s, options);
    // keep "inf"/"nan" and friends out, f64::from_str accepts them
    if cleaned.is_empty()
        || !cleaned
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
    {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("static email regex"))
}

fn uri_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:\S+$").expect("static uri regex"))
}

fn check_constraints(field: &SchemaField, value: &FieldValue) -> Result<(), SchemaError> {
    let constraints = field.constraints();
    if constraints.is_empty() {
        return Ok(());
    }

    if let Some(bound) = constraints.minimum() {
        let bound = bound_value(field, bound)?;
        if value.partial_cmp_same_kind(&bound) == Some(Ordering::Less) {
            return Err(SchemaError::constraint(
                field.name(),
                format!("{} is below the minimum {}", value, bound),
            ));
        }
    }
    if let Some(bound) = constraints.maximum() {
        let bound = bound_value(field, bound)?;
        if value.partial_cmp_same_kind(&bound) == Some(Ordering::Greater) {
            return Err(SchemaError::constraint(
                field.name(),
                format!("{} is above the maximum {}", value, bound),
            ));
        }
    }

    if let Some(len) = value_length(value) {
        if let Some(min) = constraints.min_length() {
            if len < min {
                return Err(SchemaError::constraint(
                    field.name(),
                    format!("length {} is shorter than {}", len, min),
                ));
            }
        }
        if let Some(max) = constraints.max_length() {
            if len > max {
                return Err(SchemaError::constraint(
                    field.name(),
                    format!("length {} is longer than {}", len, max),
                ));
            }
        }
    }

    if let (Some(re), FieldValue::String(s)) = (field.pattern_regex(), value) {
        if !re.is_match(s) {
            return Err(SchemaError::constraint(
                field.name(),
                format!("'{}' does not match the pattern", s),
            ));
        }
    }

    if let Some(allowed) = constraints.enum_values() {
        let found = allowed
            .iter()
            .filter_map(|candidate| cast_type(field, candidate).ok())
            .any(|candidate| candidate == *value);
        if !found {
            return Err(SchemaError::constraint(
                field.name(),
                format!("'{}' is not one of the allowed values", value),
            ));
        }
    }

    Ok(())
}

/// Interpret a `minimum`/`maximum` bound in the field's own type.
/// Temporal bounds are written in the default (ISO) format.
fn bound_value(field: &SchemaField, bound: &Value) -> Result<FieldValue, SchemaError> {
    let parsed = match field.field_type() {
        FieldType::Number | FieldType::Integer | FieldType::Year => match bound {
            Value::Number(n) => n.as_f64().map(FieldValue::Number),
            Value::String(s) => {
                parse_number_text(s, &NumberOptions::default()).map(FieldValue::Number)
            }
            _ => None,
        },
        FieldType::Date => bound.as_str().and_then(dates::parse_iso_date).map(FieldValue::Date),
        FieldType::DateTime => bound
            .as_str()
            .and_then(dates::parse_iso_datetime)
            .map(FieldValue::DateTime),
        FieldType::Time => bound.as_str().and_then(dates::parse_iso_time).map(FieldValue::Time),
        FieldType::YearMonth => cast_year_month(field, bound).ok(),
        _ => None,
    };
    parsed.ok_or_else(|| {
        SchemaError::FieldSchema(format!(
            "invalid bound {} for {} field '{}'",
            bound,
            field.field_type(),
            field.name()
        ))
    })
}

fn value_length(value: &FieldValue) -> Option<usize> {
    match value {
        FieldValue::String(s) => Some(s.chars().count()),
        FieldValue::Json(Value::Array(items)) => Some(items.len()),
        FieldValue::Json(Value::Object(map)) => Some(map.len()),
        _ => None,
    }
}
