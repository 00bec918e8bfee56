//! The public operation surface: a [`Table`] wraps one database table and
//! turns bags of named values into parameterized statements against it.

use tracing::debug;

use crate::command::{self, Command, TableContext};
use crate::error::DynTableError;
use crate::executor::DatabaseExecutor;
use crate::params::bind_all;
use crate::pool::DbPool;
use crate::query::{
    PageOptions, PagedResult, SelectOptions, build_all_sql, build_count_sql, build_paged_sql,
    build_single_sql, total_pages,
};
use crate::record::{IntoRecord, Record};
use crate::types::Value;

/// Schema-agnostic access to a single database table.
///
/// Configuration is fixed at construction: the pool picks the backend, the
/// table name picks the target, and the primary-key column (default `"ID"`)
/// drives insert/update dispatch and keyed lookups. No schema is declared
/// anywhere; callers are responsible for valid column names.
#[derive(Debug, Clone)]
pub struct Table {
    pool: DbPool,
    context: TableContext,
}

impl Table {
    /// A table adapter keyed by the conventional `"ID"` column.
    pub fn new(pool: DbPool, table: impl Into<String>) -> Self {
        Self {
            pool,
            context: TableContext::new(table, None),
        }
    }

    /// A table adapter with an explicit primary-key column.
    pub fn with_primary_key(
        pool: DbPool,
        table: impl Into<String>,
        primary_key: impl Into<String>,
    ) -> Self {
        Self {
            pool,
            context: TableContext::new(table, Some(primary_key.into())),
        }
    }

    pub fn table_name(&self) -> &str {
        &self.context.table
    }

    pub fn primary_key(&self) -> &str {
        &self.context.primary_key
    }

    pub fn context(&self) -> &TableContext {
        &self.context
    }

    /// Structural test: does the record carry this table's primary-key
    /// column? This predicate is what separates updates from inserts in
    /// [`Table::save`].
    pub fn has_primary_key(&self, record: &Record) -> bool {
        command::has_primary_key(&self.context, record)
    }

    /// The record's primary-key value, when present.
    pub fn primary_key_of(&self, record: &Record) -> Option<Value> {
        command::primary_key_of(&self.context, record)
    }

    /// One INSERT or UPDATE command per record, in input order.
    pub fn build_commands(&self, records: Vec<Record>) -> Result<Vec<Command>, DynTableError> {
        command::build_commands(&self.context, records)
    }

    /// Run caller-supplied SQL verbatim (with `@N` placeholders) and return
    /// the rows as canonical records.
    pub async fn query(&self, sql: &str, args: Vec<Value>) -> Result<Vec<Record>, DynTableError> {
        debug!(%sql, "query");
        let params = bind_all(args);
        let mut conn = self.pool.connection().await?;
        conn.execute_select(sql, &params).await
    }

    /// Stream rows lazily off one pooled connection. Postgres only; the
    /// SQLite worker model materializes rows before handing them back.
    #[cfg(feature = "postgres")]
    pub async fn query_stream(
        &self,
        sql: &str,
        args: Vec<Value>,
    ) -> Result<crate::stream::RecordStream, DynTableError> {
        match &self.pool {
            DbPool::Postgres(pool) => {
                debug!(%sql, "query_stream");
                let conn = pool.get().await.map_err(DynTableError::PoolErrorPostgres)?;
                let params = bind_all(args);
                crate::stream::RecordStream::new(conn, sql, &params).await
            }
            #[cfg(feature = "sqlite")]
            DbPool::Sqlite(_) => Err(DynTableError::Unimplemented(
                "query_stream is not supported for SQLite; use query instead".to_string(),
            )),
        }
    }

    /// First column of the first row, or `None` when the query returns no
    /// rows.
    pub async fn scalar(&self, sql: &str, args: Vec<Value>) -> Result<Option<Value>, DynTableError> {
        debug!(%sql, "scalar");
        let params = bind_all(args);
        let mut conn = self.pool.connection().await?;
        conn.execute_scalar(sql, &params).await
    }

    /// All records matching the options' predicate, ordering, limit, and
    /// projection.
    pub async fn all(&self, options: SelectOptions) -> Result<Vec<Record>, DynTableError> {
        let sql = build_all_sql(
            &self.context,
            &options.where_fragment,
            &options.order_by,
            options.limit,
            &options.columns,
        );
        self.query(&sql, options.args).await
    }

    /// One page of records plus totals for the whole filtered set.
    ///
    /// The totals come from a COUNT over the same predicate; the page itself
    /// from a row-numbering window ordered by the options' ordering (the
    /// primary key when unspecified).
    pub async fn paged(&self, options: PageOptions) -> Result<PagedResult, DynTableError> {
        let count_sql = build_count_sql(&self.context, &options.where_fragment);
        let page_sql = build_paged_sql(
            &self.context,
            &options.where_fragment,
            &options.order_by,
            &options.columns,
            options.page_size,
            options.page,
        );
        debug!(%count_sql, %page_sql, "paged");

        let params = bind_all(options.args);
        let mut conn = self.pool.connection().await?;

        let total_records = match conn.execute_scalar(&count_sql, &params).await? {
            Some(Value::Int(n)) if n >= 0 => n as u64,
            _ => 0,
        };
        let items = conn.execute_select(&page_sql, &params).await?;

        Ok(PagedResult {
            items,
            total_records,
            total_pages: total_pages(total_records, options.page_size),
        })
    }

    /// The row with the given primary-key value, or `None`. Zero rows is a
    /// normal result, never an error.
    pub async fn single(
        &self,
        key: Value,
        columns: Option<&str>,
    ) -> Result<Option<Record>, DynTableError> {
        let sql = build_single_sql(&self.context, columns.unwrap_or("*"));
        let mut records = self.query(&sql, vec![key]).await?;
        Ok(if records.is_empty() {
            None
        } else {
            Some(records.swap_remove(0))
        })
    }

    /// Insert one record and return the generated identity value, when the
    /// backend reports one.
    pub async fn insert(&self, record: impl IntoRecord) -> Result<Option<Value>, DynTableError> {
        let record = record.into_record()?;
        let command = command::insert_command(&self.context, &record)?;
        debug!(sql = %command.text, "insert");
        let mut conn = self.pool.connection().await?;
        conn.execute_insert(command).await
    }

    /// Update the row keyed by `key` with the record's non-key, non-null
    /// columns. Returns the affected row count.
    pub async fn update(
        &self,
        record: impl IntoRecord,
        key: Value,
    ) -> Result<usize, DynTableError> {
        let record = record.into_record()?;
        let command = command::update_command(&self.context, &record, key)?;
        debug!(sql = %command.text, "update");
        let mut conn = self.pool.connection().await?;
        conn.execute_dml(&command.text, &command.params).await
    }

    /// Delete by primary-key value, by predicate fragment, or, with
    /// neither, every row in the table. Returns the affected row count.
    pub async fn delete(
        &self,
        key: Option<Value>,
        where_fragment: &str,
        args: Vec<Value>,
    ) -> Result<usize, DynTableError> {
        let command = command::delete_command(&self.context, key, where_fragment, args);
        debug!(sql = %command.text, "delete");
        let mut conn = self.pool.connection().await?;
        conn.execute_dml(&command.text, &command.params).await
    }

    /// Batched insert/update dispatch: one command per record, all of them
    /// inside a single transaction. Accepts any mix of normalizable input
    /// shapes. Returns the summed affected row count.
    pub async fn save<I>(&self, records: I) -> Result<usize, DynTableError>
    where
        I: IntoIterator,
        I::Item: IntoRecord,
    {
        let mut normalized = Vec::new();
        for record in records {
            normalized.push(record.into_record()?);
        }
        let commands = self.build_commands(normalized)?;
        self.execute(commands).await
    }

    /// Run a list of commands in one all-or-nothing transaction.
    pub async fn execute(&self, commands: Vec<Command>) -> Result<usize, DynTableError> {
        debug!(count = commands.len(), "execute batch");
        let mut conn = self.pool.connection().await?;
        conn.execute_commands(commands).await
    }

    /// Run a batch of unparameterized statements (DDL, setup scripts) in one
    /// transaction.
    pub async fn execute_batch(&self, sql: &str) -> Result<(), DynTableError> {
        let mut conn = self.pool.connection().await?;
        conn.execute_batch(sql).await
    }
}
