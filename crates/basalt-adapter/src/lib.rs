//! # basalt-adapter
//!
//! The adapter façade over `basalt-core`: it owns a model registry, a
//! handle to an external [`QueryExecutor`], and orchestrates CRUD and
//! schema reconciliation against it.
//!
//! ## What lives where
//!
//! - Statement text and parameter lists come from `basalt-core`; this
//!   crate only threads them through the executor.
//! - The executor owns the connection, transport and wire protocol. This
//!   layer has no retry policy, no pooling and no transactions.
//!
//! ## Behavioral notes
//!
//! - [`Adapter::update_or_create`] issues two statements without a
//!   transaction boundary; see its docs for the concurrency caveat.
//! - Reconciliation ([`Adapter::autoupdate`], [`Adapter::alter_table`])
//!   logs execute failures and completes anyway.
//! - Rows are returned exactly as the executor produced them; reads do
//!   no type coercion.

pub mod adapter;
pub mod error;
pub mod executor;
pub mod migration;

pub use adapter::Adapter;
pub use error::{AdapterError, ExecuteError, Result};
pub use executor::{QueryExecutor, Row};
