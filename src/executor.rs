use async_trait::async_trait;

use crate::command::Command;
use crate::error::DynTableError;
use crate::params::Param;
use crate::pool::DbConnection;
use crate::record::Record;
use crate::types::Value;

/// The execution side of the driver boundary. SQL text arrives in the
/// crate-canonical `@N` placeholder style; each backend translates it before
/// running it.
#[async_trait]
pub trait DatabaseExecutor {
    /// Executes a batch of SQL statements (no parameters) within a
    /// transaction. Used for DDL and setup scripts.
    async fn execute_batch(&mut self, sql: &str) -> Result<(), DynTableError>;

    /// Executes a single SELECT and returns the rows as canonical records.
    async fn execute_select(
        &mut self,
        sql: &str,
        params: &[Param],
    ) -> Result<Vec<Record>, DynTableError>;

    /// Executes a query and returns the first column of the first row, or
    /// `None` when the query yields no rows.
    async fn execute_scalar(
        &mut self,
        sql: &str,
        params: &[Param],
    ) -> Result<Option<Value>, DynTableError>;

    /// Executes a single DML statement and returns the affected row count.
    async fn execute_dml(&mut self, sql: &str, params: &[Param])
    -> Result<usize, DynTableError>;

    /// Executes a list of commands inside one transaction, strictly in
    /// order, and returns the summed affected row count. Commits only when
    /// every command succeeds; any failure rolls the whole batch back and
    /// surfaces as [`DynTableError::TransactionAborted`].
    async fn execute_commands(&mut self, commands: Vec<Command>)
    -> Result<usize, DynTableError>;

    /// Executes an INSERT and then the backend's last-identity query on the
    /// same connection, returning the generated key when the driver reports
    /// one.
    async fn execute_insert(&mut self, command: Command)
    -> Result<Option<Value>, DynTableError>;
}

#[async_trait]
impl DatabaseExecutor for DbConnection {
    async fn execute_batch(&mut self, sql: &str) -> Result<(), DynTableError> {
        match self {
            #[cfg(feature = "postgres")]
            DbConnection::Postgres(client) => crate::postgres::execute_batch(client, sql).await,
            #[cfg(feature = "sqlite")]
            DbConnection::Sqlite(client) => crate::sqlite::execute_batch(client, sql).await,
        }
    }

    async fn execute_select(
        &mut self,
        sql: &str,
        params: &[Param],
    ) -> Result<Vec<Record>, DynTableError> {
        match self {
            #[cfg(feature = "postgres")]
            DbConnection::Postgres(client) => {
                crate::postgres::execute_select(client, sql, params).await
            }
            #[cfg(feature = "sqlite")]
            DbConnection::Sqlite(client) => {
                crate::sqlite::execute_select(client, sql, params).await
            }
        }
    }

    async fn execute_scalar(
        &mut self,
        sql: &str,
        params: &[Param],
    ) -> Result<Option<Value>, DynTableError> {
        match self {
            #[cfg(feature = "postgres")]
            DbConnection::Postgres(client) => {
                crate::postgres::execute_scalar(client, sql, params).await
            }
            #[cfg(feature = "sqlite")]
            DbConnection::Sqlite(client) => {
                crate::sqlite::execute_scalar(client, sql, params).await
            }
        }
    }

    async fn execute_dml(
        &mut self,
        sql: &str,
        params: &[Param],
    ) -> Result<usize, DynTableError> {
        match self {
            #[cfg(feature = "postgres")]
            DbConnection::Postgres(client) => {
                crate::postgres::execute_dml(client, sql, params).await
            }
            #[cfg(feature = "sqlite")]
            DbConnection::Sqlite(client) => {
                crate::sqlite::execute_dml(client, sql, params).await
            }
        }
    }

    async fn execute_commands(
        &mut self,
        commands: Vec<Command>,
    ) -> Result<usize, DynTableError> {
        match self {
            #[cfg(feature = "postgres")]
            DbConnection::Postgres(client) => {
                crate::postgres::execute_commands(client, commands).await
            }
            #[cfg(feature = "sqlite")]
            DbConnection::Sqlite(client) => {
                crate::sqlite::execute_commands(client, commands).await
            }
        }
    }

    async fn execute_insert(
        &mut self,
        command: Command,
    ) -> Result<Option<Value>, DynTableError> {
        match self {
            #[cfg(feature = "postgres")]
            DbConnection::Postgres(client) => {
                crate::postgres::execute_insert(client, command).await
            }
            #[cfg(feature = "sqlite")]
            DbConnection::Sqlite(client) => {
                crate::sqlite::execute_insert(client, command).await
            }
        }
    }
}
