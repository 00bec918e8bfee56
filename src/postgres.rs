use std::error::Error;

use chrono::NaiveDateTime;
use deadpool_postgres::{Object, Transaction};
pub use deadpool_postgres::{Config as PgConfig, PoolConfig};
use tokio_postgres::{
    NoTls, Statement,
    error::SqlState,
    types::{IsNull, ToSql, Type, to_sql_checked},
};
use uuid::Uuid;

use crate::command::Command;
use crate::error::DynTableError;
use crate::params::Param;
use crate::pool::DbPool;
use crate::record::Record;
use crate::translation::{PlaceholderStyle, translate_placeholders};
use crate::types::Value;

/// Postgres reports the last generated key through the session-scoped
/// `lastval()`, valid once a sequence has been touched.
pub const LAST_IDENTITY_SQL: &str = "SELECT lastval()";

impl DbPool {
    /// Asynchronous initializer for a Postgres pool.
    pub async fn new_postgres(pg_config: PgConfig) -> Result<Self, DynTableError> {
        if pg_config.dbname.is_none() {
            return Err(DynTableError::ConfigError("dbname is required".to_string()));
        }
        if pg_config.host.is_none() {
            return Err(DynTableError::ConfigError("host is required".to_string()));
        }
        if pg_config.port.is_none() {
            return Err(DynTableError::ConfigError("port is required".to_string()));
        }
        if pg_config.user.is_none() {
            return Err(DynTableError::ConfigError("user is required".to_string()));
        }
        if pg_config.password.is_none() {
            return Err(DynTableError::ConfigError(
                "password is required".to_string(),
            ));
        }

        let pg_pool = pg_config
            .create_pool(Some(deadpool_postgres::Runtime::Tokio1), NoTls)
            .map_err(|e| {
                DynTableError::ConnectionError(format!("Failed to create Postgres pool: {e}"))
            })?;

        Ok(DbPool::Postgres(pg_pool))
    }
}

/// Container for Postgres parameters with lifetime tracking
pub struct Params<'a> {
    references: Vec<&'a (dyn ToSql + Sync)>,
}

impl<'a> Params<'a> {
    /// Borrow coerced parameters as Postgres `ToSql` references. The
    /// declared size on text parameters is advisory only; the wire protocol
    /// types text without it.
    pub fn convert(params: &'a [Param]) -> Result<Params<'a>, DynTableError> {
        let references: Vec<&(dyn ToSql + Sync)> = params
            .iter()
            .map(|p| &p.value as &(dyn ToSql + Sync))
            .collect();

        Ok(Params { references })
    }

    pub fn as_refs(&self) -> &[&(dyn ToSql + Sync)] {
        &self.references
    }
}

impl ToSql for Value {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut bytes::BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            Value::Int(i) => (*i).to_sql(ty, out),
            Value::Float(f) => (*f).to_sql(ty, out),
            // Uuids are coerced to text at bind time; a uuid-typed column
            // still needs the binary form on the wire.
            Value::Text(s) if *ty == Type::UUID => Uuid::parse_str(s)?.to_sql(ty, out),
            Value::Text(s) => s.to_sql(ty, out),
            Value::Bool(b) => (*b).to_sql(ty, out),
            Value::Timestamp(dt) => dt.to_sql(ty, out),
            Value::Uuid(u) => u.to_sql(ty, out),
            Value::Null => Ok(IsNull::Yes),
            Value::Blob(bytes) => bytes.to_sql(ty, out),
            Value::Record(_) => Err("nested record cannot be bound as a parameter".into()),
        }
    }

    fn accepts(ty: &Type) -> bool {
        match *ty {
            Type::INT2 | Type::INT4 | Type::INT8 => true,
            Type::FLOAT4 | Type::FLOAT8 => true,
            Type::TEXT | Type::VARCHAR | Type::CHAR | Type::NAME => true,
            Type::BOOL => true,
            Type::TIMESTAMP | Type::TIMESTAMPTZ | Type::DATE => true,
            Type::UUID => true,
            Type::BYTEA => true,
            _ => false,
        }
    }

    to_sql_checked!();
}

/// Extract one column of a row into a canonical value, by column type.
pub(crate) fn extract_value(
    row: &tokio_postgres::Row,
    idx: usize,
) -> Result<Value, DynTableError> {
    let type_info = row.columns()[idx].type_();

    match type_info.name() {
        "int2" | "int4" | "int8" => {
            let val: Option<i64> = row.try_get(idx)?;
            Ok(val.map_or(Value::Null, Value::Int))
        }
        "float4" | "float8" => {
            let val: Option<f64> = row.try_get(idx)?;
            Ok(val.map_or(Value::Null, Value::Float))
        }
        "bool" => {
            let val: Option<bool> = row.try_get(idx)?;
            Ok(val.map_or(Value::Null, Value::Bool))
        }
        "timestamp" | "timestamptz" => {
            let val: Option<NaiveDateTime> = row.try_get(idx)?;
            Ok(val.map_or(Value::Null, Value::Timestamp))
        }
        "uuid" => {
            let val: Option<Uuid> = row.try_get(idx)?;
            Ok(val.map_or(Value::Null, Value::Uuid))
        }
        "bytea" => {
            let val: Option<Vec<u8>> = row.try_get(idx)?;
            Ok(val.map_or(Value::Null, Value::Blob))
        }
        // Everything else is read back as text.
        _ => {
            let val: Option<String> = row.try_get(idx)?;
            Ok(val.map_or(Value::Null, Value::Text))
        }
    }
}

/// Convert one row into a canonical record, reader column names becoming
/// record keys.
pub(crate) fn row_to_record(row: &tokio_postgres::Row) -> Result<Record, DynTableError> {
    let mut record = Record::new();
    for (idx, column) in row.columns().iter().enumerate() {
        record.insert(column.name().to_string(), extract_value(row, idx)?);
    }
    Ok(record)
}

async fn query_records(
    stmt: &Statement,
    params: &[&(dyn ToSql + Sync)],
    transaction: &Transaction<'_>,
) -> Result<Vec<Record>, DynTableError> {
    let rows = transaction.query(stmt, params).await?;
    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        records.push(row_to_record(&row)?);
    }
    Ok(records)
}

fn prepare_sql(sql: &str) -> String {
    translate_placeholders(sql, PlaceholderStyle::Postgres).into_owned()
}

/// Execute a batch of SQL statements (DDL/setup) inside one transaction.
pub async fn execute_batch(client: &mut Object, sql: &str) -> Result<(), DynTableError> {
    let tx = client.transaction().await?;
    tx.batch_execute(sql).await?;
    tx.commit().await?;
    Ok(())
}

pub async fn execute_select(
    client: &mut Object,
    sql: &str,
    params: &[Param],
) -> Result<Vec<Record>, DynTableError> {
    let sql = prepare_sql(sql);
    let params = Params::convert(params)?;
    let tx = client.transaction().await?;
    let stmt = tx.prepare(&sql).await?;
    let records = query_records(&stmt, params.as_refs(), &tx).await?;
    tx.commit().await?;
    Ok(records)
}

pub async fn execute_scalar(
    client: &mut Object,
    sql: &str,
    params: &[Param],
) -> Result<Option<Value>, DynTableError> {
    let sql = prepare_sql(sql);
    let params = Params::convert(params)?;
    let tx = client.transaction().await?;
    let stmt = tx.prepare(&sql).await?;
    let rows = tx.query(&stmt, params.as_refs()).await?;
    let value = match rows.first() {
        Some(row) => Some(extract_value(row, 0)?),
        None => None,
    };
    tx.commit().await?;
    Ok(value)
}

pub async fn execute_dml(
    client: &mut Object,
    sql: &str,
    params: &[Param],
) -> Result<usize, DynTableError> {
    let sql = prepare_sql(sql);
    let params = Params::convert(params)?;
    let tx = client.transaction().await?;
    let stmt = tx.prepare(&sql).await?;
    let rows = tx.execute(&stmt, params.as_refs()).await?;
    tx.commit().await?;
    Ok(rows as usize)
}

/// Run every command inside one transaction, in order. A failing statement
/// aborts the batch: the transaction drops uncommitted and the error carries
/// the failing statement's position.
pub async fn execute_commands(
    client: &mut Object,
    commands: Vec<Command>,
) -> Result<usize, DynTableError> {
    let tx = client.transaction().await?;
    let mut affected = 0usize;

    for (index, command) in commands.iter().enumerate() {
        let sql = prepare_sql(&command.text);
        let params = Params::convert(&command.params)?;
        let stmt = tx
            .prepare(&sql)
            .await
            .map_err(|e| DynTableError::TransactionAborted {
                index,
                source: Box::new(e.into()),
            })?;
        let rows = tx
            .execute(&stmt, params.as_refs())
            .await
            .map_err(|e| DynTableError::TransactionAborted {
                index,
                source: Box::new(e.into()),
            })?;
        affected += rows as usize;
    }

    tx.commit().await?;
    Ok(affected)
}

/// Execute an insert, then ask the session for the generated key. `lastval()`
/// raises when the insert touched no sequence; that reads back as "no
/// generated identity" rather than a failure.
pub async fn execute_insert(
    client: &mut Object,
    command: Command,
) -> Result<Option<Value>, DynTableError> {
    let sql = prepare_sql(&command.text);
    let params = Params::convert(&command.params)?;
    let tx = client.transaction().await?;
    let stmt = tx.prepare(&sql).await?;
    tx.execute(&stmt, params.as_refs()).await?;
    tx.commit().await?;

    match client.query(LAST_IDENTITY_SQL, &[]).await {
        Ok(rows) => match rows.first() {
            Some(row) => Ok(Some(extract_value(row, 0)?)),
            None => Ok(None),
        },
        // SQLSTATE 55000: lastval() before any sequence use in this session.
        Err(e) if e.code() == Some(&SqlState::OBJECT_NOT_IN_PREREQUISITE_STATE) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
