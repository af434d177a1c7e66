//! Value encoding against a declared property.
//!
//! [`encode_value`] turns one runtime value into a SQL fragment, pushing
//! bound parameters into a sink as it goes. `NULL` and `DEFAULT` are
//! syntactic, never bound.

use chrono::{DateTime, NaiveDateTime};

use crate::schema::{Property, PropertyType};
use crate::value::{format_timestamp, Value};

/// The fragment an encoded value renders to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// The literal `NULL`. Filter compilation turns this into `IS NULL`.
    Null,
    /// The literal `DEFAULT`, used where the server generates the value.
    Default,
    /// Rendered SQL, usually a `$n` placeholder.
    Sql(String),
}

impl Fragment {
    /// Renders the fragment as SQL text.
    #[must_use]
    pub fn into_sql(self) -> String {
        match self {
            Self::Null => String::from("NULL"),
            Self::Default => String::from("DEFAULT"),
            Self::Sql(sql) => sql,
        }
    }

    /// Returns `true` for the `NULL` literal.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

/// Appends a parameter and returns its `$n` placeholder.
pub fn bind(params: &mut Vec<Value>, value: Value) -> String {
    params.push(value);
    format!("${}", params.len())
}

/// Encodes a single value for the given property.
///
/// NULL (and, for numeric properties, the empty-string and NaN inputs)
/// encodes as `DEFAULT` when the property auto-increments, `NULL`
/// otherwise. Dates are formatted to second precision and bound as text.
/// Everything else binds one parameter.
pub fn encode_value(property: &Property, value: &Value, params: &mut Vec<Value>) -> Fragment {
    if matches!(value, Value::Null) {
        return null_or_default(property);
    }
    match property.property_type {
        PropertyType::Number => encode_number(property, value, params),
        PropertyType::Date => encode_date(property, value, params),
        PropertyType::String | PropertyType::Text | PropertyType::Boolean | PropertyType::Json => {
            Fragment::Sql(bind(params, Value::Text(value.string_form())))
        }
    }
}

const fn null_or_default(property: &Property) -> Fragment {
    if property.auto_increment {
        Fragment::Default
    } else {
        Fragment::Null
    }
}

fn encode_number(property: &Property, value: &Value, params: &mut Vec<Value>) -> Fragment {
    match value {
        // Empty or not-a-number inputs fall back to NULL/DEFAULT, the
        // same rule as a missing value. Zero is a real value.
        Value::Text(s) if s.is_empty() => null_or_default(property),
        Value::Float(f) if f.is_nan() => null_or_default(property),
        other => Fragment::Sql(bind(params, other.clone())),
    }
}

fn encode_date(property: &Property, value: &Value, params: &mut Vec<Value>) -> Fragment {
    match value {
        Value::Date(dt) => Fragment::Sql(bind(params, Value::Text(format_timestamp(*dt)))),
        // Integer inputs are epoch milliseconds. Zero counts as missing.
        Value::Int(0) => null_or_default(property),
        Value::Int(ms) => match DateTime::from_timestamp_millis(*ms) {
            Some(dt) => Fragment::Sql(bind(params, Value::Text(format_timestamp(dt.naive_utc())))),
            None => Fragment::Sql(bind(params, value.clone())),
        },
        Value::Text(s) if s.is_empty() => null_or_default(property),
        Value::Text(s) => match parse_timestamp(s) {
            Some(dt) => Fragment::Sql(bind(params, Value::Text(format_timestamp(dt)))),
            None => Fragment::Sql(bind(params, value.clone())),
        },
        other => Fragment::Sql(bind(params, other.clone())),
    }
}

fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.naive_local())
        })
}
