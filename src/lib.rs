//! Convention-based, schema-agnostic table access.
//!
//! `dyntable` maps arbitrary bags of named values onto parameterized SQL for
//! a single table: records carrying the configured primary-key column become
//! UPDATEs, the rest become INSERTs, batches run in one all-or-nothing
//! transaction, and reads page through a row-numbering window. No schema
//! declaration, no derive macros, no query language. Records in,
//! statements out.
//!
//! ```no_run
//! use dyntable::prelude::*;
//! use serde_json::json;
//!
//! # async fn demo() -> Result<(), DynTableError> {
//! let pool = DbPool::new_sqlite("app.db").await?;
//! let users = Table::new(pool, "Users");
//!
//! let id = users.insert(json!({"Name": "Ann", "Age": 30})).await?;
//! users.update(json!({"Age": 31}), id.unwrap_or(Value::Null)).await?;
//! let adults = users
//!     .all(SelectOptions::default().with_where("Age >= @0").with_args(vec![Value::Int(18)]))
//!     .await?;
//! # let _ = adults;
//! # Ok(())
//! # }
//! ```

pub mod clause;
pub mod command;
pub mod error;
pub mod executor;
pub mod params;
pub mod pool;
pub mod query;
pub mod record;
pub mod table;
pub mod translation;
pub mod types;

#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "postgres")]
pub mod stream;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub mod prelude;

pub use error::DynTableError;
pub use record::{IntoRecord, Record};
pub use table::Table;
pub use types::Value;
