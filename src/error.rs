use thiserror::Error;

#[cfg(feature = "sqlite")]
use deadpool_sqlite::rusqlite;

#[derive(Debug, Error)]
pub enum DynTableError {
    #[cfg(feature = "postgres")]
    #[error(transparent)]
    PostgresError(#[from] tokio_postgres::Error),

    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    SqliteError(#[from] rusqlite::Error),

    #[cfg(feature = "postgres")]
    #[error(transparent)]
    PoolErrorPostgres(#[from] deadpool_postgres::PoolError),

    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    PoolErrorSqlite(#[from] deadpool_sqlite::PoolError),

    /// A record could not be normalized: the input exposes no named fields.
    #[error("unsupported input: {0}")]
    UnsupportedInput(String),

    /// An insert or update had nothing left to write after filtering.
    #[error("empty record: {0}")]
    EmptyRecord(String),

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("connection error: {0}")]
    ConnectionError(String),

    #[error("parameter conversion error: {0}")]
    ParameterError(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),

    /// A statement inside a batch failed; the whole transaction was rolled
    /// back and nothing from the batch is visible.
    #[error("batch aborted at statement {index}: {source}")]
    TransactionAborted {
        index: usize,
        #[source]
        source: Box<DynTableError>,
    },

    #[error("unimplemented feature: {0}")]
    Unimplemented(String),

    #[error("other database error: {0}")]
    Other(String),
}
