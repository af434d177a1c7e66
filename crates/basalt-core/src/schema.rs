//! Declared model schemas.
//!
//! A [`ModelSchema`] is the property set a model declares: name to
//! [`Property`] in declaration order. The primary key `id` is implicit on
//! every model (a `SERIAL PRIMARY KEY` column) and never appears in the
//! property list. Schemas are immutable once built; the adapter receives
//! its full registry at construction time.

use serde::{Deserialize, Serialize};

use crate::ident::quote_ident;

/// The closed set of declared property types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyType {
    /// Short string, stored as `varchar`.
    String,
    /// Long text, stored as `text`.
    Text,
    /// Integer number, stored as `integer`.
    Number,
    /// Timestamp, stored as `timestamp`.
    Date,
    /// Boolean, stored as `boolean`.
    Boolean,
    /// JSON document, serialized into a `varchar` column.
    Json,
}

impl PropertyType {
    /// Maps the declared type to its SQL column type name.
    #[must_use]
    pub const fn column_type(self) -> &'static str {
        match self {
            Self::String | Self::Json => "varchar",
            Self::Text => "text",
            Self::Number => "integer",
            Self::Date => "timestamp",
            Self::Boolean => "boolean",
        }
    }
}

/// A single declared property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    /// Declared type.
    pub property_type: PropertyType,
    /// Whether the column accepts NULL. Defaults to `true`.
    pub allow_null: bool,
    /// Whether NULL inputs encode as `DEFAULT` so the server generates
    /// the value.
    pub auto_increment: bool,
}

impl Property {
    /// Creates a nullable, non-auto-increment property.
    #[must_use]
    pub const fn new(property_type: PropertyType) -> Self {
        Self {
            property_type,
            allow_null: true,
            auto_increment: false,
        }
    }

    /// Shorthand for a `String` property.
    #[must_use]
    pub const fn string() -> Self {
        Self::new(PropertyType::String)
    }

    /// Shorthand for a `Text` property.
    #[must_use]
    pub const fn text() -> Self {
        Self::new(PropertyType::Text)
    }

    /// Shorthand for a `Number` property.
    #[must_use]
    pub const fn number() -> Self {
        Self::new(PropertyType::Number)
    }

    /// Shorthand for a `Date` property.
    #[must_use]
    pub const fn date() -> Self {
        Self::new(PropertyType::Date)
    }

    /// Shorthand for a `Boolean` property.
    #[must_use]
    pub const fn boolean() -> Self {
        Self::new(PropertyType::Boolean)
    }

    /// Shorthand for a `Json` property.
    #[must_use]
    pub const fn json() -> Self {
        Self::new(PropertyType::Json)
    }

    /// Marks the property NOT NULL.
    #[must_use]
    pub const fn not_null(mut self) -> Self {
        self.allow_null = false;
        self
    }

    /// Marks the property auto-incremented.
    #[must_use]
    pub const fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }
}

/// The implicit primary-key property every model carries.
static ID_PROPERTY: Property = Property {
    property_type: PropertyType::Number,
    allow_null: false,
    auto_increment: true,
};

/// A registered model's declared schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSchema {
    name: String,
    table: String,
    properties: Vec<(String, Property)>,
}

impl ModelSchema {
    /// Creates a schema for a model whose table shares its name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let table = name.clone();
        Self {
            name,
            table,
            properties: Vec::new(),
        }
    }

    /// Overrides the table name.
    #[must_use]
    pub fn table_name(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// Declares a property. Declaration order is preserved.
    ///
    /// `id` is implicit on every model and attempts to declare it are
    /// ignored.
    #[must_use]
    pub fn property(mut self, name: impl Into<String>, property: Property) -> Self {
        let name = name.into();
        if name != "id" {
            self.properties.push((name, property));
        }
        self
    }

    /// The model name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The table name.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// The quoted table name, ready for interpolation.
    #[must_use]
    pub fn quoted_table(&self) -> String {
        quote_ident(&self.table)
    }

    /// Looks up a property. `id` resolves to the implicit primary-key
    /// property (a non-null, auto-incremented number).
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Property> {
        if name == "id" {
            return Some(&ID_PROPERTY);
        }
        self.properties
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, p)| p)
    }

    /// Iterates declared properties in declaration order.
    pub fn properties(&self) -> impl Iterator<Item = (&str, &Property)> {
        self.properties.iter().map(|(n, p)| (n.as_str(), p))
    }

    /// Renders the quoted column list for SELECT, `id` first.
    #[must_use]
    pub fn column_list(&self) -> String {
        let mut columns = vec![String::from("\"id\"")];
        columns.extend(self.properties.iter().map(|(n, _)| quote_ident(n)));
        columns.join(", ")
    }
}
