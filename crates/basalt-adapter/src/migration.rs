//! Schema reconciliation orchestration.
//!
//! Introspects live tables, hands the columns to the core reconciler and
//! applies the resulting `ALTER TABLE` statement. Execution failures in a
//! reconciliation pass are logged and swallowed: the pass always
//! completes, trading strict migration correctness for availability.

use basalt_core::reconcile::{
    alter_table_sql, create_table_sql, normalize_db_type, pending_changes, ColumnDescriptor,
    PendingChange,
};
use basalt_core::value::Value;
use futures::future::join_all;
use tracing::{debug, error};

use crate::adapter::Adapter;
use crate::error::Result;
use crate::executor::Row;

/// Catalog query returning one row per column of the named table.
const TABLE_STATUS_SQL: &str = "SELECT column_name as \"Field\", udt_name as \"Type\", \
     is_nullable as \"Null\", column_default as \"Default\" \
     FROM information_schema.COLUMNS WHERE table_name = $1";

fn text_field(row: &Row, key: &str) -> String {
    match row.get(key) {
        Some(Value::Text(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.string_form(),
    }
}

fn column_from_row(row: &Row) -> ColumnDescriptor {
    let default = match row.get("Default") {
        None | Some(Value::Null) => None,
        Some(value) => Some(value.string_form()),
    };
    ColumnDescriptor {
        field: text_field(row, "Field"),
        data_type: normalize_db_type(&text_field(row, "Type")).to_string(),
        nullable: text_field(row, "Null") == "YES",
        default,
    }
}

impl Adapter {
    /// Introspects the live columns of a model's table.
    ///
    /// # Errors
    ///
    /// Returns an error if the model is not registered or the catalog
    /// query fails.
    pub async fn table_columns(&self, model: &str) -> Result<Vec<ColumnDescriptor>> {
        let schema = self.model(model)?;
        let rows = self
            .executor
            .execute(
                TABLE_STATUS_SQL,
                &[Value::Text(schema.table().to_string())],
            )
            .await?;
        Ok(rows.iter().map(column_from_row).collect())
    }

    /// Diffs the model against the given live columns and applies the
    /// resulting `ALTER TABLE` in one statement.
    ///
    /// An execute failure is logged, not raised; the call still reports
    /// success. An empty diff executes nothing.
    ///
    /// # Errors
    ///
    /// Returns an error only if the model is not registered.
    pub async fn alter_table(&self, model: &str, actual: &[ColumnDescriptor]) -> Result<()> {
        let schema = self.model(model)?;
        let changes = pending_changes(schema, actual);
        let Some(sql) = alter_table_sql(schema.table(), &changes) else {
            return Ok(());
        };
        debug!(model, statement = %sql, "altering table");
        if let Err(err) = self.executor.execute(&sql, &[]).await {
            error!(model, %err, "alter table failed");
        }
        Ok(())
    }

    /// Creates the model's table with its full declared column set.
    ///
    /// # Errors
    ///
    /// Returns an error if the model is not registered or the statement
    /// fails.
    pub async fn create_table(&self, model: &str) -> Result<()> {
        let schema = self.model(model)?;
        let sql = create_table_sql(schema);
        debug!(model, statement = %sql, "creating table");
        self.executor.execute(&sql, &[]).await?;
        Ok(())
    }

    /// Reconciles every registered model with its live table: existing
    /// tables are altered, missing ones created.
    ///
    /// Per-model passes run concurrently and are joined on completion;
    /// callers must not assume one model's table is finalized before
    /// another's starts. Failures are logged per model and never abort
    /// the pass.
    pub async fn autoupdate(&self) {
        let passes = self.model_names().map(|model| self.autoupdate_model(model));
        join_all(passes).await;
    }

    async fn autoupdate_model(&self, model: &str) {
        match self.table_columns(model).await {
            Ok(columns) if !columns.is_empty() => {
                if let Err(err) = self.alter_table(model, &columns).await {
                    error!(model, %err, "schema update failed");
                }
            }
            Ok(_) | Err(_) => {
                if let Err(err) = self.create_table(model).await {
                    error!(model, %err, "table creation failed");
                }
            }
        }
    }

    /// Returns `true` when no registered model has pending schema
    /// changes. Per-model checks run concurrently.
    ///
    /// # Errors
    ///
    /// Unlike [`Self::autoupdate`], introspection failures propagate.
    pub async fn is_actual(&self) -> Result<bool> {
        let checks = self.model_names().map(|model| self.pending_for(model));
        let results = join_all(checks).await;
        let mut actual = true;
        for pending in results {
            if !pending?.is_empty() {
                actual = false;
            }
        }
        Ok(actual)
    }

    async fn pending_for(&self, model: &str) -> Result<Vec<PendingChange>> {
        let schema = self.model(model)?;
        let columns = self.table_columns(model).await?;
        Ok(pending_changes(schema, &columns))
    }
}
