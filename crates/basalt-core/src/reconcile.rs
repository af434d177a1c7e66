//! Schema reconciliation: diffing a live table against its declared model.
//!
//! [`pending_changes`] compares the introspected columns of a table with
//! the model's declared properties and produces the ordered DDL fragments
//! needed to align them: additions first, then modifications, then drops.
//! Adding before dropping avoids transient inconsistency when a name is
//! reused, and the fixed grouping keeps generated SQL stable.
//!
//! The pass is idempotent: diffing a schema against the columns it would
//! itself produce yields no changes.

use serde::{Deserialize, Serialize};

use crate::ident::quote_ident;
use crate::schema::ModelSchema;

/// One introspected column of a live table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Column name.
    pub field: String,
    /// Underlying type name, normalized via [`normalize_db_type`].
    pub data_type: String,
    /// Whether the column accepts NULL.
    pub nullable: bool,
    /// Default expression, if any.
    pub default: Option<String>,
}

/// Normalizes an introspected type name to its canonical form.
///
/// Only a small set of known synonyms is covered; anything else passes
/// through unchanged, so type comparison is only reliable for these.
#[must_use]
pub fn normalize_db_type(name: &str) -> &str {
    match name {
        "int4" => "integer",
        "bool" => "boolean",
        other => other,
    }
}

/// A single column change pending against a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingChange {
    /// Add a missing column.
    AddColumn {
        /// Column name.
        name: String,
        /// Mapped SQL column type.
        column_type: &'static str,
        /// Emit `NOT NULL`.
        not_null: bool,
    },
    /// Change a column's type.
    AlterType {
        /// Column name.
        name: String,
        /// Mapped SQL column type.
        column_type: &'static str,
    },
    /// Add a NOT NULL constraint.
    SetNotNull {
        /// Column name.
        name: String,
    },
    /// Drop a NOT NULL constraint.
    DropNotNull {
        /// Column name.
        name: String,
    },
    /// Drop a column absent from the schema.
    DropColumn {
        /// Column name.
        name: String,
    },
}

impl PendingChange {
    /// Renders the DDL fragment for use inside an `ALTER TABLE`.
    #[must_use]
    pub fn to_sql(&self) -> String {
        match self {
            Self::AddColumn {
                name,
                column_type,
                not_null,
            } => {
                let quoted = quote_ident(name);
                if *not_null {
                    format!("ADD COLUMN {quoted} {column_type} NOT NULL")
                } else {
                    format!("ADD COLUMN {quoted} {column_type}")
                }
            }
            Self::AlterType { name, column_type } => {
                format!("ALTER COLUMN {} TYPE {column_type}", quote_ident(name))
            }
            Self::SetNotNull { name } => {
                format!("ALTER COLUMN {} SET NOT NULL", quote_ident(name))
            }
            Self::DropNotNull { name } => {
                format!("ALTER COLUMN {} DROP NOT NULL", quote_ident(name))
            }
            Self::DropColumn { name } => format!("DROP COLUMN {}", quote_ident(name)),
        }
    }
}

fn find_column<'a>(actual: &'a [ColumnDescriptor], name: &str) -> Option<&'a ColumnDescriptor> {
    actual.iter().find(|c| c.field == name)
}

/// Computes the ordered change list for one table: additions, then
/// modifications, then drops. The `id` column is excluded both ways.
#[must_use]
pub fn pending_changes(schema: &ModelSchema, actual: &[ColumnDescriptor]) -> Vec<PendingChange> {
    let mut changes = Vec::new();

    // Additions.
    for (name, property) in schema.properties() {
        if find_column(actual, name).is_none() {
            changes.push(PendingChange::AddColumn {
                name: name.to_string(),
                column_type: property.property_type.column_type(),
                not_null: !property.allow_null,
            });
        }
    }

    // Modifications.
    for (name, property) in schema.properties() {
        let Some(column) = find_column(actual, name) else {
            continue;
        };
        let declared = property.property_type.column_type();
        if !column.data_type.eq_ignore_ascii_case(declared) {
            changes.push(PendingChange::AlterType {
                name: name.to_string(),
                column_type: declared,
            });
        }
        if column.nullable && !property.allow_null {
            changes.push(PendingChange::SetNotNull {
                name: name.to_string(),
            });
        }
        if !column.nullable && property.allow_null {
            changes.push(PendingChange::DropNotNull {
                name: name.to_string(),
            });
        }
    }

    // Drops.
    for column in actual {
        if column.field == "id" {
            continue;
        }
        if schema.get(&column.field).is_none() {
            changes.push(PendingChange::DropColumn {
                name: column.field.clone(),
            });
        }
    }

    changes
}

/// Assembles the pending changes into one `ALTER TABLE` statement.
///
/// Returns `None` for an empty change list: a no-op pass.
#[must_use]
pub fn alter_table_sql(table: &str, changes: &[PendingChange]) -> Option<String> {
    if changes.is_empty() {
        return None;
    }
    let fragments: Vec<String> = changes.iter().map(PendingChange::to_sql).collect();
    Some(format!(
        "ALTER TABLE {} {};",
        quote_ident(table),
        fragments.join(", ")
    ))
}

/// Renders the `CREATE TABLE` statement for a model, `id` leading as
/// `SERIAL PRIMARY KEY`.
#[must_use]
pub fn create_table_sql(schema: &ModelSchema) -> String {
    let mut columns = vec![String::from("\"id\" SERIAL PRIMARY KEY")];
    for (name, property) in schema.properties() {
        let mut column = format!(
            "{} {}",
            quote_ident(name),
            property.property_type.column_type()
        );
        if !property.allow_null {
            column.push_str(" NOT NULL");
        }
        columns.push(column);
    }
    format!(
        "CREATE TABLE {} (\n  {}\n)",
        schema.quoted_table(),
        columns.join(",\n  ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ModelSchema, Property};

    fn id_column() -> ColumnDescriptor {
        ColumnDescriptor {
            field: String::from("id"),
            data_type: String::from("integer"),
            nullable: false,
            default: Some(String::from("nextval('posts_id_seq'::regclass)")),
        }
    }

    fn column(field: &str, data_type: &str, nullable: bool) -> ColumnDescriptor {
        ColumnDescriptor {
            field: String::from(field),
            data_type: String::from(data_type),
            nullable,
            default: None,
        }
    }

    #[test]
    fn normalizes_known_type_synonyms() {
        assert_eq!(normalize_db_type("int4"), "integer");
        assert_eq!(normalize_db_type("bool"), "boolean");
        assert_eq!(normalize_db_type("varchar"), "varchar");
        assert_eq!(normalize_db_type("jsonb"), "jsonb");
    }

    #[test]
    fn missing_property_emits_one_add_column() {
        let schema = ModelSchema::new("posts")
            .property("title", Property::string().not_null())
            .property("body", Property::text());
        let actual = vec![id_column(), column("title", "varchar", false)];
        let changes = pending_changes(&schema, &actual);
        assert_eq!(
            changes,
            vec![PendingChange::AddColumn {
                name: String::from("body"),
                column_type: "text",
                not_null: false,
            }]
        );
        assert_eq!(changes[0].to_sql(), "ADD COLUMN \"body\" text");
    }

    #[test]
    fn type_change_emits_alter_column_type() {
        let schema = ModelSchema::new("posts").property("title", Property::text());
        let actual = vec![id_column(), column("title", "varchar", true)];
        let changes = pending_changes(&schema, &actual);
        assert_eq!(
            changes,
            vec![PendingChange::AlterType {
                name: String::from("title"),
                column_type: "text",
            }]
        );
        assert_eq!(changes[0].to_sql(), "ALTER COLUMN \"title\" TYPE text");
    }

    #[test]
    fn type_comparison_is_case_insensitive() {
        let schema = ModelSchema::new("posts").property("title", Property::string());
        let actual = vec![id_column(), column("title", "VARCHAR", true)];
        assert!(pending_changes(&schema, &actual).is_empty());
    }

    #[test]
    fn nullability_changes_emit_set_and_drop() {
        let schema = ModelSchema::new("posts")
            .property("title", Property::string().not_null())
            .property("body", Property::text());
        let actual = vec![
            id_column(),
            column("title", "varchar", true),
            column("body", "text", false),
        ];
        let changes = pending_changes(&schema, &actual);
        assert_eq!(
            changes,
            vec![
                PendingChange::SetNotNull {
                    name: String::from("title")
                },
                PendingChange::DropNotNull {
                    name: String::from("body")
                },
            ]
        );
    }

    #[test]
    fn stale_columns_are_dropped_but_never_id() {
        let schema = ModelSchema::new("posts").property("title", Property::string());
        let actual = vec![
            id_column(),
            column("title", "varchar", true),
            column("legacy", "text", true),
        ];
        let changes = pending_changes(&schema, &actual);
        assert_eq!(
            changes,
            vec![PendingChange::DropColumn {
                name: String::from("legacy")
            }]
        );
    }

    #[test]
    fn changes_are_ordered_adds_then_modifications_then_drops() {
        let schema = ModelSchema::new("posts")
            .property("title", Property::text())
            .property("fresh", Property::string());
        let actual = vec![
            id_column(),
            column("title", "varchar", true),
            column("stale", "text", true),
        ];
        let changes = pending_changes(&schema, &actual);
        assert!(matches!(changes[0], PendingChange::AddColumn { .. }));
        assert!(matches!(changes[1], PendingChange::AlterType { .. }));
        assert!(matches!(changes[2], PendingChange::DropColumn { .. }));
    }

    #[test]
    fn assembly_joins_fragments_into_one_statement() {
        let changes = vec![
            PendingChange::AddColumn {
                name: String::from("body"),
                column_type: "text",
                not_null: false,
            },
            PendingChange::DropColumn {
                name: String::from("legacy"),
            },
        ];
        assert_eq!(
            alter_table_sql("posts", &changes).unwrap(),
            "ALTER TABLE \"posts\" ADD COLUMN \"body\" text, DROP COLUMN \"legacy\";"
        );
    }

    #[test]
    fn empty_change_list_assembles_to_none() {
        assert!(alter_table_sql("posts", &[]).is_none());
    }

    #[test]
    fn create_table_leads_with_serial_primary_key() {
        let schema = ModelSchema::new("posts")
            .property("title", Property::string().not_null())
            .property("views", Property::number());
        assert_eq!(
            create_table_sql(&schema),
            "CREATE TABLE \"posts\" (\n  \"id\" SERIAL PRIMARY KEY,\n  \"title\" varchar NOT NULL,\n  \"views\" integer\n)"
        );
    }

    #[test]
    fn reconciliation_is_idempotent() {
        let schema = ModelSchema::new("posts")
            .property("title", Property::string().not_null())
            .property("published", Property::boolean());
        // Columns as they would exist right after applying the schema.
        let actual = vec![
            id_column(),
            column("title", "varchar", false),
            column("published", "boolean", true),
        ];
        let first = pending_changes(&schema, &actual);
        assert!(first.is_empty());
        let second = pending_changes(&schema, &actual);
        assert!(second.is_empty());
    }
}
