use deadpool_sqlite::{Config as DeadpoolSqliteConfig, Object, Runtime, rusqlite};
use rusqlite::ToSql;
use rusqlite::types::ValueRef;

use crate::command::Command;
use crate::error::DynTableError;
use crate::params::Param;
use crate::pool::DbPool;
use crate::record::Record;
use crate::translation::{PlaceholderStyle, translate_placeholders};
use crate::types::Value;

/// SQLite's generated-key lookup, scoped to the inserting connection.
pub const LAST_IDENTITY_SQL: &str = "SELECT last_insert_rowid()";

impl DbPool {
    /// Asynchronous initializer for a SQLite pool using deadpool_sqlite.
    pub async fn new_sqlite(db_path: impl Into<String>) -> Result<Self, DynTableError> {
        let cfg = DeadpoolSqliteConfig::new(db_path.into());

        let pool = cfg.create_pool(Runtime::Tokio1).map_err(|e| {
            DynTableError::ConnectionError(format!("Failed to create SQLite pool: {e}"))
        })?;

        // Set the journal mode once up front.
        {
            let conn = pool.get().await.map_err(DynTableError::PoolErrorSqlite)?;
            conn.interact(|conn| {
                conn.execute_batch("PRAGMA journal_mode = WAL;")
                    .map_err(DynTableError::SqliteError)
            })
            .await??;
        }

        Ok(DbPool::Sqlite(pool))
    }
}

impl From<deadpool_sqlite::InteractError> for DynTableError {
    fn from(err: deadpool_sqlite::InteractError) -> Self {
        DynTableError::Other(format!("SQLite interact error: {err}"))
    }
}

/// Bind coerced parameters to SQLite value types. The declared size on text
/// parameters has no SQLite equivalent and is dropped here.
pub fn convert_params(params: &[Param]) -> Result<Vec<rusqlite::types::Value>, DynTableError> {
    let mut vec_values = Vec::with_capacity(params.len());
    for p in params {
        let v = match &p.value {
            Value::Int(i) => rusqlite::types::Value::Integer(*i),
            Value::Float(f) => rusqlite::types::Value::Real(*f),
            Value::Text(s) => rusqlite::types::Value::Text(s.clone()),
            Value::Bool(b) => rusqlite::types::Value::Integer(*b as i64),
            Value::Timestamp(dt) => {
                let formatted = dt.format("%F %T%.f").to_string();
                rusqlite::types::Value::Text(formatted)
            }
            Value::Uuid(u) => rusqlite::types::Value::Text(u.to_string()),
            Value::Null => rusqlite::types::Value::Null,
            Value::Blob(bytes) => rusqlite::types::Value::Blob(bytes.clone()),
            Value::Record(_) => {
                return Err(DynTableError::ParameterError(format!(
                    "nested record cannot be bound as parameter {}",
                    p.name
                )));
            }
        };
        vec_values.push(v);
    }
    Ok(vec_values)
}

fn extract_value(row: &rusqlite::Row, idx: usize) -> Result<Value, DynTableError> {
    match row.get_ref(idx) {
        Err(e) => Err(DynTableError::SqliteError(e)),
        Ok(ValueRef::Null) => Ok(Value::Null),
        Ok(ValueRef::Integer(i)) => Ok(Value::Int(i)),
        Ok(ValueRef::Real(f)) => Ok(Value::Float(f)),
        Ok(ValueRef::Text(bytes)) => {
            let s = String::from_utf8_lossy(bytes).into_owned();
            Ok(Value::Text(s))
        }
        Ok(ValueRef::Blob(b)) => Ok(Value::Blob(b.to_vec())),
    }
}

/// Run a prepared statement and collect each row back into a canonical
/// record, reader column names becoming record keys.
fn build_records(
    stmt: &mut rusqlite::Statement,
    params: &[rusqlite::types::Value],
) -> Result<Vec<Record>, DynTableError> {
    let param_refs: Vec<&dyn ToSql> = params.iter().map(|v| v as &dyn ToSql).collect();
    let column_names: Vec<String> = stmt.column_names().iter().map(|s| s.to_string()).collect();

    let mut rows_iter = stmt.query(&param_refs[..])?;
    let mut records = Vec::new();

    while let Some(row) = rows_iter.next()? {
        let mut record = Record::new();
        for (i, name) in column_names.iter().enumerate() {
            record.insert(name.clone(), extract_value(row, i)?);
        }
        records.push(record);
    }

    Ok(records)
}

fn prepare_sql(sql: &str) -> String {
    translate_placeholders(sql, PlaceholderStyle::Sqlite).into_owned()
}

pub async fn execute_batch(client: &Object, sql: &str) -> Result<(), DynTableError> {
    let sql_owned = sql.to_owned();

    client
        .interact(move |conn| -> Result<(), DynTableError> {
            let tx = conn.transaction()?;
            tx.execute_batch(&sql_owned)?;
            tx.commit()?;
            Ok(())
        })
        .await?
}

pub async fn execute_select(
    client: &Object,
    sql: &str,
    params: &[Param],
) -> Result<Vec<Record>, DynTableError> {
    let sql_owned = prepare_sql(sql);
    let params_owned = convert_params(params)?;

    client
        .interact(move |conn| -> Result<Vec<Record>, DynTableError> {
            let mut stmt = conn.prepare(&sql_owned)?;
            build_records(&mut stmt, &params_owned)
        })
        .await?
}

pub async fn execute_scalar(
    client: &Object,
    sql: &str,
    params: &[Param],
) -> Result<Option<Value>, DynTableError> {
    let sql_owned = prepare_sql(sql);
    let params_owned = convert_params(params)?;

    client
        .interact(move |conn| -> Result<Option<Value>, DynTableError> {
            let mut stmt = conn.prepare(&sql_owned)?;
            let param_refs: Vec<&dyn ToSql> =
                params_owned.iter().map(|v| v as &dyn ToSql).collect();
            let mut rows = stmt.query(&param_refs[..])?;
            match rows.next()? {
                Some(row) => Ok(Some(extract_value(row, 0)?)),
                None => Ok(None),
            }
        })
        .await?
}

pub async fn execute_dml(
    client: &Object,
    sql: &str,
    params: &[Param],
) -> Result<usize, DynTableError> {
    let sql_owned = prepare_sql(sql);
    let params_owned = convert_params(params)?;

    client
        .interact(move |conn| -> Result<usize, DynTableError> {
            let tx = conn.transaction()?;
            let param_refs: Vec<&dyn ToSql> =
                params_owned.iter().map(|v| v as &dyn ToSql).collect();
            let rows = {
                let mut stmt = tx.prepare(&sql_owned)?;
                stmt.execute(&param_refs[..])?
            };
            tx.commit()?;
            Ok(rows)
        })
        .await?
}

/// Run every command inside one transaction, in order. A failing statement
/// aborts the batch: the transaction drops uncommitted and the error carries
/// the failing statement's position.
pub async fn execute_commands(
    client: &Object,
    commands: Vec<Command>,
) -> Result<usize, DynTableError> {
    let mut prepared = Vec::with_capacity(commands.len());
    for command in &commands {
        prepared.push((prepare_sql(&command.text), convert_params(&command.params)?));
    }

    client
        .interact(move |conn| -> Result<usize, DynTableError> {
            let tx = conn.transaction()?;
            let mut affected = 0usize;
            for (index, (sql, params)) in prepared.iter().enumerate() {
                let param_refs: Vec<&dyn ToSql> =
                    params.iter().map(|v| v as &dyn ToSql).collect();
                let rows = {
                    let mut stmt = tx.prepare(sql).map_err(|e| {
                        DynTableError::TransactionAborted {
                            index,
                            source: Box::new(e.into()),
                        }
                    })?;
                    stmt.execute(&param_refs[..])
                        .map_err(|e| DynTableError::TransactionAborted {
                            index,
                            source: Box::new(e.into()),
                        })?
                };
                affected += rows;
            }
            tx.commit()?;
            Ok(affected)
        })
        .await?
}

/// Execute an insert and fetch the generated rowid on the same connection.
pub async fn execute_insert(
    client: &Object,
    command: Command,
) -> Result<Option<Value>, DynTableError> {
    let sql_owned = prepare_sql(&command.text);
    let params_owned = convert_params(&command.params)?;

    client
        .interact(move |conn| -> Result<Option<Value>, DynTableError> {
            let param_refs: Vec<&dyn ToSql> =
                params_owned.iter().map(|v| v as &dyn ToSql).collect();
            conn.execute(&sql_owned, &param_refs[..])?;
            let mut stmt = conn.prepare(LAST_IDENTITY_SQL)?;
            let mut rows = stmt.query([])?;
            match rows.next()? {
                Some(row) => Ok(Some(extract_value(row, 0)?)),
                None => Ok(None),
            }
        })
        .await?
}
