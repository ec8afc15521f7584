use std::fmt;
use std::str::FromStr;

use log::warn;
use regex::Regex;
use serde_json::{Map, Value};

use super::{cast, FieldValue, SchemaConstraints, SchemaError};

/// Key of the biosys extension block inside a field descriptor
pub const BIOSYS_KEY: &str = "biosys";

/// Table Schema field types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// Free text
    String,
    /// Floating point number
    Number,
    /// Whole number
    Integer,
    /// Boolean flag
    Boolean,
    /// Calendar date
    Date,
    /// Date and time of day
    DateTime,
    /// Time of day
    Time,
    /// Calendar year
    Year,
    /// Year and month
    YearMonth,
    /// JSON object
    Object,
    /// JSON array
    Array,
    /// GeoJSON geometry
    GeoJson,
    /// Anything, left as is
    Any,
}

impl FieldType {
    /// Descriptor spelling of the type
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::Time => "time",
            Self::Year => "year",
            Self::YearMonth => "yearmonth",
            Self::Object => "object",
            Self::Array => "array",
            Self::GeoJson => "geojson",
            Self::Any => "any",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "string" => Ok(Self::String),
            "number" => Ok(Self::Number),
            "integer" => Ok(Self::Integer),
            "boolean" => Ok(Self::Boolean),
            "date" => Ok(Self::Date),
            "datetime" => Ok(Self::DateTime),
            "time" => Ok(Self::Time),
            "year" => Ok(Self::Year),
            "yearmonth" => Ok(Self::YearMonth),
            "object" => Ok(Self::Object),
            "array" => Ok(Self::Array),
            "geojson" => Ok(Self::GeoJson),
            "any" => Ok(Self::Any),
            other => Err(SchemaError::FieldSchema(format!("unknown field type '{}'", other))),
        }
    }
}

/// Field format
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldFormat {
    /// `default`, or no format given
    Default,
    /// `any`: best-effort parse
    Any,
    /// `fmt:<pattern>` strftime pattern
    Pattern(String),
    /// Any other named format (`email`, `uri`, `uuid`, ...)
    Named(String),
}

impl FieldFormat {
    fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") | Some("default") => Self::Default,
            Some("any") => Self::Any,
            Some(s) => match s.strip_prefix("fmt:") {
                Some(pattern) => Self::Pattern(pattern.to_string()),
                // bare strftime patterns are accepted without the prefix
                None if s.contains('%') => Self::Pattern(s.to_string()),
                None => Self::Named(s.to_string()),
            },
        }
    }
}

/// Biosys role tag carried by `biosys.type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BiosysRole {
    /// Date of the observation
    ObservationDate,
    /// Latitude of the observation
    Latitude,
    /// Longitude of the observation
    Longitude,
    /// Projected easting
    Easting,
    /// Projected northing
    Northing,
    /// Geodetic datum
    Datum,
    /// Projection zone
    Zone,
    /// Site code
    SiteCode,
}

impl BiosysRole {
    /// Tag spelling used in descriptors
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ObservationDate => "observationDate",
            Self::Latitude => "latitude",
            Self::Longitude => "longitude",
            Self::Easting => "easting",
            Self::Northing => "northing",
            Self::Datum => "datum",
            Self::Zone => "zone",
            Self::SiteCode => "siteCode",
        }
    }

    /// Decode a tag; unknown tags give `None`
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "observationDate" => Some(Self::ObservationDate),
            "latitude" => Some(Self::Latitude),
            "longitude" => Some(Self::Longitude),
            "easting" => Some(Self::Easting),
            "northing" => Some(Self::Northing),
            "datum" => Some(Self::Datum),
            "zone" => Some(Self::Zone),
            "siteCode" => Some(Self::SiteCode),
            _ => None,
        }
    }
}

impl fmt::Display for BiosysRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Number parsing options (`decimalChar`, `groupChar`, `bareNumber`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberOptions {
    /// Decimal separator, `.` by default
    pub decimal_char: char,
    /// Thousands separator, none by default
    pub group_char: Option<char>,
    /// When false, leading and trailing non-numeric characters are stripped
    pub bare_number: bool,
}

impl Default for NumberOptions {
    fn default() -> Self {
        Self {
            decimal_char: '.',
            group_char: None,
            bare_number: true,
        }
    }
}

/// One field of a schema, built from its descriptor
#[derive(Debug, Clone)]
pub struct SchemaField {
    descriptor: Map<String, Value>,
    name: String,
    title: Option<String>,
    field_type: FieldType,
    format: FieldFormat,
    constraints: SchemaConstraints,
    aliases: Vec<String>,
    biosys_role: Option<BiosysRole>,
    number_options: NumberOptions,
    pattern: Option<Regex>,
}

impl SchemaField {
    /// Build a field from its JSON descriptor.
    ///
    /// Fails with [`SchemaError::FieldSchema`] when the name is missing or blank.
    pub fn new(descriptor: &Value) -> Result<Self, SchemaError> {
        let Value::Object(map) = descriptor else {
            return Err(SchemaError::FieldSchema(format!(
                "field descriptor must be an object: {}",
                descriptor
            )));
        };

        let name = match map.get("name") {
            Some(Value::String(name)) if !name.trim().is_empty() => name.clone(),
            _ => {
                return Err(SchemaError::FieldSchema(format!(
                    "a field without a name: {}",
                    descriptor
                )))
            }
        };

        let field_type = match map.get("type").and_then(Value::as_str) {
            None => FieldType::String,
            Some(t) if t.trim().is_empty() => FieldType::String,
            Some(t) => t.parse()?,
        };

        let aliases = match map.get("aliases") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|a| a.as_str().map(str::to_string))
                .collect(),
            Some(other) => {
                return Err(SchemaError::FieldSchema(format!(
                    "aliases of field '{}' must be a list: {}",
                    name, other
                )))
            }
        };

        let constraints = SchemaConstraints::new(map.get("constraints"))?;
        let pattern = match constraints.pattern() {
            Some(p) => Some(Regex::new(&format!("^(?:{})$", p)).map_err(|e| {
                SchemaError::FieldSchema(format!("invalid pattern on field '{}': {}", name, e))
            })?),
            None => None,
        };

        Ok(Self {
            title: map.get("title").and_then(Value::as_str).map(str::to_string),
            format: FieldFormat::parse(map.get("format").and_then(Value::as_str)),
            constraints,
            pattern,
            biosys_role: decode_role(&name, map.get(BIOSYS_KEY)),
            number_options: decode_number_options(map),
            descriptor: map.clone(),
            name,
            field_type,
            aliases,
        })
    }

    /// Field name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Same as [`name`](Self::name); the column this field reads from
    pub fn column_name(&self) -> &str {
        &self.name
    }

    /// Title, if the descriptor gives one
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Title falling back to the name
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }

    /// Field type
    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    /// Field format
    pub fn format(&self) -> &FieldFormat {
        &self.format
    }

    /// Constraints of the field
    pub fn constraints(&self) -> &SchemaConstraints {
        &self.constraints
    }

    /// Shortcut for `constraints().required()`
    pub fn required(&self) -> bool {
        self.constraints.required()
    }

    /// Alternate column names
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Biosys role tag, if any
    pub fn biosys_role(&self) -> Option<BiosysRole> {
        self.biosys_role
    }

    /// Number parsing options
    pub fn number_options(&self) -> &NumberOptions {
        &self.number_options
    }

    /// Compiled `pattern` constraint, anchored to the whole value
    pub fn pattern_regex(&self) -> Option<&Regex> {
        self.pattern.as_ref()
    }

    /// The descriptor this field was built from
    pub fn descriptor(&self) -> &Map<String, Value> {
        &self.descriptor
    }

    /// Dict-like access to the descriptor
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.descriptor.get(key)
    }

    /// Dict-like access to the descriptor with a default
    pub fn get_or<'a>(&'a self, key: &str, default: &'a Value) -> &'a Value {
        self.descriptor.get(key).unwrap_or(default)
    }

    /// Whether `candidate` is one of the aliases
    pub fn has_alias(&self, candidate: &str, case_insensitive: bool) -> bool {
        self.aliases
            .iter()
            .any(|alias| names_match(alias, candidate, case_insensitive))
    }

    /// Whether any of the candidates is the name or an alias
    pub fn has_name_or_alias(
        &self,
        candidate: &str,
        extra_candidates: &[&str],
        case_insensitive: bool,
    ) -> bool {
        std::iter::once(candidate)
            .chain(extra_candidates.iter().copied())
            .any(|c| {
                names_match(&self.name, c, case_insensitive) || self.has_alias(c, case_insensitive)
            })
    }

    /// Cast a raw value to the field type, enforcing constraints
    pub fn cast(&self, raw: &Value) -> Result<FieldValue, SchemaError> {
        cast::cast_value(self, raw)
    }

    /// Message of the cast failure for `raw`, if any
    pub fn validation_error(&self, raw: &Value) -> Option<String> {
        self.cast(raw).err().map(|e| e.to_string())
    }
}

fn names_match(a: &str, b: &str, case_insensitive: bool) -> bool {
    if case_insensitive {
        a.to_lowercase() == b.to_lowercase()
    } else {
        a == b
    }
}

fn decode_role(name: &str, block: Option<&Value>) -> Option<BiosysRole> {
    let tag = match block? {
        Value::Object(map) => map.get("type")?.as_str()?,
        Value::Null => return None,
        other => {
            warn!("Ignoring malformed biosys block on field '{}': {}", name, other);
            return None;
        }
    };
    let role = BiosysRole::from_tag(tag);
    if role.is_none() {
        warn!("Ignoring unknown biosys type '{}' on field '{}'", tag, name);
    }
    role
}

fn decode_number_options(map: &Map<String, Value>) -> NumberOptions {
    let single_char = |key: &str| {
        map.get(key)
            .and_then(Value::as_str)
            .and_then(|s| s.chars().next())
    };
    let defaults = NumberOptions::default();
    NumberOptions {
        decimal_char: single_char("decimalChar").unwrap_or(defaults.decimal_char),
        group_char: single_char("groupChar"),
        bare_number: map
            .get("bareNumber")
            .and_then(Value::as_bool)
            .unwrap_or(defaults.bare_number),
    }
}
