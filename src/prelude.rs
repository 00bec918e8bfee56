//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types and functions
//! to make it easier to get started with the library.

pub use crate::command::{Command, TableContext};
pub use crate::error::DynTableError;
pub use crate::executor::DatabaseExecutor;
pub use crate::params::{Param, TEXT_PARAM_SIZE, bind, bind_all};
pub use crate::pool::{DbConnection, DbPool};
pub use crate::query::{PageOptions, PagedResult, SelectOptions};
pub use crate::record::{FormValues, IntoRecord, Record};
pub use crate::table::Table;
pub use crate::translation::{PlaceholderStyle, translate_placeholders};
pub use crate::types::Value;

#[cfg(feature = "postgres")]
pub use crate::postgres::Params as PostgresParams;
#[cfg(feature = "postgres")]
pub use crate::postgres::{PgConfig, PoolConfig};
#[cfg(feature = "postgres")]
pub use crate::stream::RecordStream;

#[cfg(feature = "sqlite")]
pub use crate::sqlite::convert_params as sqlite_convert_params;
