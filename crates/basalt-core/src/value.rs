//! Runtime values and literal escaping.
//!
//! [`Value`] is the closed set of value shapes the adapter accepts from
//! callers: everything a record field or filter operand can hold. Values
//! are normally bound as numbered parameters; [`Value::to_sql_inline`] is
//! the legacy inline path kept for callers that assemble raw SQL.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A runtime value carried in a record or filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// SQL NULL.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// Text value.
    Text(String),
    /// Timestamp value, second precision, no zone.
    Date(NaiveDateTime),
    /// Arbitrary JSON, stored in a varchar column as its serialized form.
    Json(serde_json::Value),
}

impl Value {
    /// Returns the SQL representation for inline use (escaped).
    ///
    /// **Warning**: prefer parameter binding. This path exists for the
    /// few places raw SQL is assembled by hand.
    #[must_use]
    pub fn to_sql_inline(&self) -> String {
        match self {
            Self::Null => String::from("NULL"),
            Self::Bool(b) => {
                if *b {
                    String::from("true")
                } else {
                    String::from("false")
                }
            }
            Self::Int(n) => format!("{n}"),
            Self::Float(f) => format!("{f}"),
            Self::Text(s) => escape_literal(s),
            Self::Date(dt) => escape_literal(&format_timestamp(*dt)),
            Self::Json(j) => escape_literal(&j.to_string()),
        }
    }

    /// Returns the value's textual form, the shape bound for string-typed
    /// columns.
    #[must_use]
    pub fn string_form(&self) -> String {
        match self {
            Self::Null => String::from("NULL"),
            Self::Bool(b) => {
                if *b {
                    String::from("true")
                } else {
                    String::from("false")
                }
            }
            Self::Int(n) => format!("{n}"),
            Self::Float(f) => format!("{f}"),
            Self::Text(s) => s.clone(),
            Self::Date(dt) => format_timestamp(*dt),
            Self::Json(j) => j.to_string(),
        }
    }
}

/// Trait for types that can be converted to a [`Value`].
pub trait ToValue {
    /// Converts the value to a [`Value`].
    fn to_value(self) -> Value;
}

impl ToValue for Value {
    fn to_value(self) -> Value {
        self
    }
}

impl ToValue for bool {
    fn to_value(self) -> Value {
        Value::Bool(self)
    }
}

impl ToValue for i64 {
    fn to_value(self) -> Value {
        Value::Int(self)
    }
}

impl ToValue for i32 {
    fn to_value(self) -> Value {
        Value::Int(i64::from(self))
    }
}

impl ToValue for f64 {
    fn to_value(self) -> Value {
        Value::Float(self)
    }
}

impl ToValue for String {
    fn to_value(self) -> Value {
        Value::Text(self)
    }
}

impl ToValue for &str {
    fn to_value(self) -> Value {
        Value::Text(String::from(self))
    }
}

impl ToValue for NaiveDateTime {
    fn to_value(self) -> Value {
        Value::Date(self)
    }
}

impl ToValue for serde_json::Value {
    fn to_value(self) -> Value {
        Value::Json(self)
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }
}

/// Formats a timestamp as `YYYY-MM-DD HH:MM:SS`.
///
/// The stored fields are emitted as-is, second precision, no zone
/// conversion.
#[must_use]
pub fn format_timestamp(dt: NaiveDateTime) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Escapes a string for inline use as an escape-string literal (`E'...'`).
///
/// Control characters, backslashes and quotes are backslash-escaped; the
/// `E` prefix is what makes PostgreSQL honor those escapes.
#[must_use]
pub fn escape_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 3);
    out.push_str("E'");
    for c in s.chars() {
        match c {
            '\0' => out.push_str("\\0"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{8}' => out.push_str("\\b"),
            '\t' => out.push_str("\\t"),
            '\u{1a}' => out.push_str("\\Z"),
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}
