use std::cmp::Ordering;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

/// A typed value produced by casting a raw record value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Blank input on a non-required field
    Null,
    /// boolean
    Boolean(bool),
    /// integer
    Integer(i64),
    /// number
    Number(f64),
    /// string
    String(String),
    /// date
    Date(NaiveDate),
    /// datetime, normalised to UTC when the input carried an offset
    DateTime(NaiveDateTime),
    /// time
    Time(NaiveTime),
    /// year
    Year(i32),
    /// yearmonth
    YearMonth(i32, u32),
    /// object, array, geojson and any
    Json(serde_json::Value),
}

impl FieldValue {
    /// True for [`FieldValue::Null`]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Truthiness: false for null, false booleans and zero
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Boolean(b) => *b,
            Self::Integer(i) => *i != 0,
            Self::Number(n) => *n != 0.0,
            Self::String(s) => !s.is_empty(),
            _ => true,
        }
    }

    /// Numeric view of the value, if it has one
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Number(n) => Some(*n),
            Self::Year(y) => Some(*y as f64),
            _ => None,
        }
    }

    /// The date, if this is a date
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Ordering between values of the same kind; `None` across kinds
    pub fn partial_cmp_same_kind(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Date(a), Self::Date(b)) => a.partial_cmp(b),
            (Self::DateTime(a), Self::DateTime(b)) => a.partial_cmp(b),
            (Self::Time(a), Self::Time(b)) => a.partial_cmp(b),
            (Self::YearMonth(ay, am), Self::YearMonth(by, bm)) => (ay, am).partial_cmp(&(by, bm)),
            (Self::String(a), Self::String(b)) => a.partial_cmp(b),
            _ => self.as_f64()?.partial_cmp(&other.as_f64()?),
        }
    }

    /// Uncast view of a JSON value: scalars map to their own kind, strings stay
    /// strings and containers are kept as JSON
    pub fn from_json(value: &serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Boolean(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Integer(i),
                None => n.as_f64().map_or_else(|| Self::Json(value.clone()), Self::Number),
            },
            Value::String(s) => Self::String(s.clone()),
            other => Self::Json(other.clone()),
        }
    }

    /// Convert to JSON, dates as ISO 8601 strings
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Boolean(b) => serde_json::Value::Bool(*b),
            Self::Integer(i) => serde_json::Value::from(*i),
            Self::Number(n) => serde_json::Value::from(*n),
            Self::Year(y) => serde_json::Value::from(*y),
            Self::Json(v) => v.clone(),
            other => serde_json::Value::String(other.to_string()),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Number(n) => write!(f, "{}", n),
            Self::String(s) => f.write_str(s),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S")),
            Self::Time(t) => write!(f, "{}", t.format("%H:%M:%S")),
            Self::Year(y) => write!(f, "{:04}", y),
            Self::YearMonth(y, m) => write!(f, "{:04}-{:02}", y, m),
            Self::Json(v) => write!(f, "{}", v),
        }
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(d: NaiveDate) -> Self {
        Self::Date(d)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}
