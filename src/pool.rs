//! Connection pooling: the driver boundary this crate talks through.
//!
//! Backend selection is explicit: construct a [`DbPool`] for the engine you
//! want and hand it to a table; there is no default provider.

#[cfg(feature = "postgres")]
use deadpool_postgres::{Object as PostgresObject, Pool as DeadpoolPostgresPool};
#[cfg(feature = "sqlite")]
use deadpool_sqlite::{Object as SqliteObject, Pool as DeadpoolSqlitePool};

use crate::error::DynTableError;

/// Connection pool for database access
///
/// This enum wraps the different connection pool types for the
/// supported database engines.
#[derive(Debug, Clone)]
pub enum DbPool {
    #[cfg(feature = "postgres")]
    Postgres(DeadpoolPostgresPool),
    #[cfg(feature = "sqlite")]
    Sqlite(DeadpoolSqlitePool),
}

impl DbPool {
    /// Check one connection out of the pool for the duration of a single
    /// operation.
    pub async fn connection(&self) -> Result<DbConnection, DynTableError> {
        match self {
            #[cfg(feature = "postgres")]
            DbPool::Postgres(pool) => {
                let conn: PostgresObject = pool
                    .get()
                    .await
                    .map_err(DynTableError::PoolErrorPostgres)?;
                Ok(DbConnection::Postgres(conn))
            }
            #[cfg(feature = "sqlite")]
            DbPool::Sqlite(pool) => {
                let conn: SqliteObject =
                    pool.get().await.map_err(DynTableError::PoolErrorSqlite)?;
                Ok(DbConnection::Sqlite(conn))
            }
        }
    }
}

/// A pooled connection checked out for one operation. Dropping it returns
/// the connection to its pool.
#[derive(Debug)]
pub enum DbConnection {
    #[cfg(feature = "postgres")]
    Postgres(PostgresObject),
    #[cfg(feature = "sqlite")]
    Sqlite(SqliteObject),
}
