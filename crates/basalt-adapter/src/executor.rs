//! The query execution contract.
//!
//! All I/O is delegated to an implementor of [`QueryExecutor`] — the
//! connection, transport and wire protocol live entirely behind it. Each
//! call completes exactly once, with rows or an error. No cancellation or
//! timeout exists at this layer; a hung executor hangs the caller.

use std::collections::HashMap;

use async_trait::async_trait;
use basalt_core::value::Value;

use crate::error::ExecuteError;

/// One result row: column name to value.
pub type Row = HashMap<String, Value>;

/// Executes parameterized SQL against the database.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Runs one statement with the given bound parameters, returning the
    /// result rows in order.
    ///
    /// # Errors
    ///
    /// Returns an [`ExecuteError`] when the statement fails.
    async fn execute(&self, sql: &str, params: &[Value])
        -> Result<Vec<Row>, ExecuteError>;

    /// Runs several statements serially, each against the same shared
    /// parameter list, resolving with the last statement's rows.
    ///
    /// Statements never overlap within one sequence, but the sequence is
    /// not a transaction: a failure leaves earlier statements applied.
    ///
    /// # Errors
    ///
    /// Returns the first statement failure, abandoning the rest.
    async fn execute_sequence(
        &self,
        statements: &[String],
        params: &[Value],
    ) -> Result<Vec<Row>, ExecuteError> {
        let mut rows = Vec::new();
        for sql in statements {
            rows = self.execute(sql, params).await?;
        }
        Ok(rows)
    }
}
