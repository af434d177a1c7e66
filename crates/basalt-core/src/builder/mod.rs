//! Parameterized statement building.
//!
//! Everything here is a pure function over a declared schema and an
//! untyped property bag, producing SQL text plus an ordered parameter
//! list. Placeholders are numbered `$1..$n` in emission order and
//! correspond 1:1 to the parameter list.

pub mod encode;
pub mod fields;
pub mod filter;

pub use encode::{encode_value, Fragment};
pub use fields::{insert_fields, update_fields};
pub use filter::{compile_filter, FilterSpec, FilterValue, Operator, SetOp};

use crate::value::{ToValue, Value};

/// SQL text plus its ordered bound parameters.
///
/// Every `$n` placeholder in `sql` refers to `params[n - 1]`; no
/// placeholder is skipped or emitted out of order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledStatement {
    /// The SQL text or fragment.
    pub sql: String,
    /// Bound parameters in placeholder order.
    pub params: Vec<Value>,
}

impl CompiledStatement {
    /// Creates a compiled statement from raw parts.
    #[must_use]
    pub const fn new(sql: String, params: Vec<Value>) -> Self {
        Self { sql, params }
    }
}

/// An untyped property bag representing one row to insert or update.
///
/// Field order is preserved; it decides column order in generated SQL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record(Vec<(String, Value)>);

impl Record {
    /// Creates an empty record.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Sets a field, replacing any earlier value for the same name.
    #[must_use]
    pub fn set(mut self, name: impl Into<String>, value: impl ToValue) -> Self {
        let name = name.into();
        let value = value.to_value();
        if let Some(entry) = self.0.iter_mut().find(|(n, _)| *n == name) {
            entry.1 = value;
        } else {
            self.0.push((name, value));
        }
        self
    }

    /// Looks up a field value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Iterates fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Returns `true` when the record has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
