//! # basalt-core
//!
//! SQL generation and schema diffing for the basalt PostgreSQL adapter
//! layer.
//!
//! Two subsystems live here, both pure functions over their inputs:
//!
//! - **Statement builder** ([`builder`]): turns a declared model schema
//!   plus an untyped property bag or [`builder::FilterSpec`] into SQL
//!   text with numbered `$n` parameters.
//! - **Schema reconciler** ([`reconcile`]): compares a live table's
//!   introspected columns against the declared schema and computes the
//!   minimal `ALTER TABLE` fragment list to align them.
//!
//! All I/O (query execution, introspection) belongs to the adapter crate;
//! nothing here touches a connection.
//!
//! ## Example
//!
//! ```rust
//! use basalt_core::builder::{compile_filter, FilterSpec, FilterValue, SetOp};
//! use basalt_core::schema::{ModelSchema, Property};
//! use basalt_core::value::Value;
//!
//! let schema = ModelSchema::new("posts")
//!     .property("title", Property::string())
//!     .property("views", Property::number());
//!
//! let filter = FilterSpec::new()
//!     .where_eq("title", "Hello")
//!     .and_where("views", FilterValue::Set(SetOp::In, vec![Value::Int(1), Value::Int(2)]))
//!     .limit(10);
//!
//! let compiled = compile_filter(&schema, &filter);
//! assert_eq!(
//!     compiled.sql,
//!     " WHERE \"title\" = $1 AND \"views\" IN ($2,$3) LIMIT $4 OFFSET 0"
//! );
//! ```

pub mod builder;
pub mod ident;
pub mod reconcile;
pub mod schema;
pub mod value;

pub use builder::{CompiledStatement, FilterSpec, FilterValue, Record};
pub use ident::quote_ident;
pub use reconcile::{ColumnDescriptor, PendingChange};
pub use schema::{ModelSchema, Property, PropertyType};
pub use value::{ToValue, Value};
