//! The adapter façade: CRUD orchestration over an external executor.

use std::collections::HashMap;
use std::sync::Arc;

use basalt_core::builder::encode::bind;
use basalt_core::builder::{
    compile_filter, encode_value, insert_fields, update_fields, CompiledStatement, FilterSpec, Record,
};
use basalt_core::ident::quote_ident;
use basalt_core::schema::ModelSchema;
use basalt_core::value::Value;
use tracing::debug;

use crate::error::{AdapterError, Result};
use crate::executor::{QueryExecutor, Row};

/// A PostgreSQL adapter instance.
///
/// Owns its model registry, injected whole at construction and immutable
/// afterwards, so concurrent calls share it safely. The adapter itself is
/// stateless per call: every statement is built fresh from its inputs.
pub struct Adapter {
    pub(crate) executor: Arc<dyn QueryExecutor>,
    pub(crate) models: HashMap<String, ModelSchema>,
}

impl Adapter {
    /// Creates an adapter over the given executor and model registry.
    #[must_use]
    pub fn new(
        executor: Arc<dyn QueryExecutor>,
        models: impl IntoIterator<Item = ModelSchema>,
    ) -> Self {
        let models = models
            .into_iter()
            .map(|schema| (schema.name().to_string(), schema))
            .collect();
        Self { executor, models }
    }

    pub(crate) fn model(&self, name: &str) -> Result<&ModelSchema> {
        self.models
            .get(name)
            .ok_or_else(|| AdapterError::UnknownModel(name.to_string()))
    }

    pub(crate) fn model_names(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    /// Inserts a record and returns the server-generated id.
    ///
    /// The `id` field is never part of the insert list; the sequence
    /// default generates it and `RETURNING id` reads it back.
    ///
    /// # Errors
    ///
    /// Returns an error if the model is not registered, the statement
    /// fails, or the database returns no id.
    pub async fn create(&self, model: &str, record: &Record) -> Result<i64> {
        let schema = self.model(model)?;
        let mut params = Vec::new();
        let sql = match insert_fields(schema, record, &mut params) {
            Some(fields) => format!(
                "INSERT INTO {} {fields} RETURNING id",
                schema.quoted_table()
            ),
            None => format!(
                "INSERT INTO {} DEFAULT VALUES RETURNING id",
                schema.quoted_table()
            ),
        };
        debug!(model, statement = %sql, "create");
        let rows = self.executor.execute(&sql, &params).await?;
        match rows.first().and_then(|row| row.get("id")) {
            Some(Value::Int(id)) => Ok(*id),
            _ => Err(AdapterError::MissingReturnedId),
        }
    }

    /// Updates the record with the given id, setting every schema field
    /// present in the record.
    ///
    /// # Errors
    ///
    /// Returns an error if the model is not registered or the statement
    /// fails.
    pub async fn update_by_id(&self, model: &str, id: i64, record: &Record) -> Result<()> {
        let schema = self.model(model)?;
        let mut params = Vec::new();
        let assignments = update_fields(schema, record, &mut params);
        let id_field = bind(&mut params, Value::Int(id));
        let sql = format!(
            "UPDATE {} SET {assignments} WHERE \"id\" = {id_field}",
            schema.quoted_table()
        );
        debug!(model, statement = %sql, "update");
        self.executor.execute(&sql, &params).await?;
        Ok(())
    }

    /// Upsert: an UPDATE by id followed by an INSERT guarded with
    /// `WHERE NOT EXISTS`, issued serially over one shared parameter
    /// list. Returns the record, with `id` assigned from the INSERT
    /// branch when that branch ran.
    ///
    /// **Concurrency caveat**: the two statements are not wrapped in a
    /// transaction. A concurrent insert of the same id between them can
    /// make both branches miss; callers needing atomicity must supply it.
    ///
    /// # Errors
    ///
    /// Returns an error if the model is not registered, the record has no
    /// `id` field, or a statement fails.
    pub async fn update_or_create(&self, model: &str, record: &Record) -> Result<Record> {
        let schema = self.model(model)?;
        match record.get("id") {
            None | Some(Value::Null) => return Err(AdapterError::MissingRecordId),
            Some(_) => {}
        }

        let mut params = Vec::new();
        let mut columns = Vec::new();
        let mut select_values = Vec::new();
        let mut assignments = Vec::new();
        let mut id_field = String::new();

        for (key, value) in record.iter() {
            if key == "id" {
                id_field = bind(&mut params, value.clone());
                columns.push(String::from("\"id\""));
                select_values.push(id_field.clone());
                continue;
            }
            let Some(property) = schema.get(key) else {
                continue;
            };
            let fragment = encode_value(property, value, &mut params).into_sql();
            columns.push(quote_ident(key));
            select_values.push(fragment.clone());
            assignments.push(format!("{} = {fragment}", quote_ident(key)));
        }

        let table = schema.quoted_table();
        let update = format!(
            "UPDATE {table} SET {} WHERE id = {id_field};",
            assignments.join(", ")
        );
        let insert = format!(
            "INSERT INTO {table} ({}) SELECT {} WHERE NOT EXISTS (SELECT 1 FROM {table} WHERE id = {id_field}) RETURNING id",
            columns.join(", "),
            select_values.join(", ")
        );
        debug!(model, "update or create");
        let rows = self
            .executor
            .execute_sequence(&[update, insert], &params)
            .await?;

        let mut out = record.clone();
        if let Some(Value::Int(id)) = rows.first().and_then(|row| row.get("id")) {
            out = out.set("id", *id);
        }
        Ok(out)
    }

    /// Reads all rows matching the filter. Rows pass through untouched;
    /// no type coercion happens on read.
    ///
    /// # Errors
    ///
    /// Returns an error if the model is not registered or the statement
    /// fails.
    pub async fn all(&self, model: &str, filter: Option<&FilterSpec>) -> Result<Vec<Row>> {
        let schema = self.model(model)?;
        let compiled = filter.map_or_else(CompiledStatement::default, |f| compile_filter(schema, f));
        let sql = format!(
            "SELECT {} FROM {}{}",
            schema.column_list(),
            schema.quoted_table(),
            compiled.sql
        );
        debug!(model, statement = %sql, "all");
        Ok(self.executor.execute(&sql, &compiled.params).await?)
    }

    /// Reads the first row matching the filter.
    ///
    /// # Errors
    ///
    /// Returns an error if the model is not registered or the statement
    /// fails.
    pub async fn find_one(&self, model: &str, filter: Option<&FilterSpec>) -> Result<Option<Row>> {
        let filter = filter.cloned().unwrap_or_default().limit(1);
        let rows = self.all(model, Some(&filter)).await?;
        Ok(rows.into_iter().next())
    }

    /// Returns whether a row with the given id exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the model is not registered or the statement
    /// fails.
    pub async fn exists(&self, model: &str, id: i64) -> Result<bool> {
        let schema = self.model(model)?;
        let sql = format!(
            "SELECT 1 FROM {} WHERE \"id\" = $1 LIMIT 1",
            schema.quoted_table()
        );
        let rows = self.executor.execute(&sql, &[Value::Int(id)]).await?;
        Ok(!rows.is_empty())
    }

    /// Counts rows matching the filter.
    ///
    /// # Errors
    ///
    /// Returns an error if the model is not registered or the statement
    /// fails.
    pub async fn count(&self, model: &str, filter: Option<&FilterSpec>) -> Result<i64> {
        let schema = self.model(model)?;
        let compiled = filter.map_or_else(CompiledStatement::default, |f| compile_filter(schema, f));
        let sql = format!(
            "SELECT count(*) AS \"count\" FROM {}{}",
            schema.quoted_table(),
            compiled.sql
        );
        let rows = self.executor.execute(&sql, &compiled.params).await?;
        match rows.first().and_then(|row| row.get("count")) {
            Some(Value::Int(n)) => Ok(*n),
            _ => Ok(0),
        }
    }

    /// Deletes the row with the given id.
    ///
    /// # Errors
    ///
    /// Returns an error if the model is not registered or the statement
    /// fails.
    pub async fn destroy_by_id(&self, model: &str, id: i64) -> Result<()> {
        let schema = self.model(model)?;
        let sql = format!("DELETE FROM {} WHERE \"id\" = $1", schema.quoted_table());
        debug!(model, statement = %sql, "destroy");
        self.executor.execute(&sql, &[Value::Int(id)]).await?;
        Ok(())
    }

    /// Deletes every row matching the filter, or all rows when no filter
    /// is given.
    ///
    /// # Errors
    ///
    /// Returns an error if the model is not registered or the statement
    /// fails.
    pub async fn destroy_all(&self, model: &str, filter: Option<&FilterSpec>) -> Result<()> {
        let schema = self.model(model)?;
        let compiled = filter.map_or_else(CompiledStatement::default, |f| compile_filter(schema, f));
        let sql = format!("DELETE FROM {}{}", schema.quoted_table(), compiled.sql);
        debug!(model, statement = %sql, "destroy all");
        self.executor.execute(&sql, &compiled.params).await?;
        Ok(())
    }
}
