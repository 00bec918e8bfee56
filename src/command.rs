//! Record-to-command translation: INSERT / UPDATE / DELETE builders over a
//! canonical [`Record`], plus the structural primary-key dispatch used by
//! batch building.
//!
//! Command text uses the crate-canonical `@N` placeholder style, zero-based;
//! backends translate it at execution time (see [`crate::translation`]).

use crate::clause::where_clause;
use crate::error::DynTableError;
use crate::params::{Param, bind, bind_all};
use crate::record::Record;
use crate::types::Value;

/// Per-table configuration: table name and primary-key column.
///
/// Immutable after construction; the owning [`crate::table::Table`] pairs it
/// with a connection pool.
#[derive(Debug, Clone)]
pub struct TableContext {
    pub table: String,
    pub primary_key: String,
}

impl TableContext {
    /// Primary key defaults to `"ID"` when unspecified.
    pub fn new(table: impl Into<String>, primary_key: Option<String>) -> Self {
        Self {
            table: table.into(),
            primary_key: primary_key.unwrap_or_else(|| "ID".to_string()),
        }
    }
}

/// A SQL statement and its bound parameters.
///
/// Single-use: ownership passes to the executor, which attaches connection
/// and transaction context when it runs the command.
#[derive(Debug, Clone)]
pub struct Command {
    pub text: String,
    pub params: Vec<Param>,
}

impl Command {
    pub fn new(text: impl Into<String>, params: Vec<Param>) -> Self {
        Self {
            text: text.into(),
            params,
        }
    }
}

/// Structural primary-key test: does the record carry the primary-key column?
///
/// This predicate alone decides INSERT vs UPDATE in batch building; there is
/// no explicit "is new" flag anywhere.
pub fn has_primary_key(ctx: &TableContext, record: &Record) -> bool {
    record.contains_key(&ctx.primary_key)
}

/// The record's primary-key value, if the column is present.
pub fn primary_key_of(ctx: &TableContext, record: &Record) -> Option<Value> {
    record.get(&ctx.primary_key).cloned()
}

/// Build `INSERT INTO <table> (<cols>) VALUES (@0,…)`, binding every column
/// in iteration order.
pub fn insert_command(ctx: &TableContext, record: &Record) -> Result<Command, DynTableError> {
    let mut cols = String::new();
    let mut placeholders = String::new();
    let mut params = Vec::with_capacity(record.len());

    for (name, value) in record.iter() {
        if !params.is_empty() {
            cols.push(',');
            placeholders.push(',');
        }
        cols.push_str(name);
        let index = bind(&mut params, value.clone());
        placeholders.push_str(&format!("@{index}"));
    }

    if params.is_empty() {
        return Err(DynTableError::EmptyRecord(format!(
            "nothing to insert into {}",
            ctx.table
        )));
    }

    let text = format!("INSERT INTO {} ({}) VALUES ({})", ctx.table, cols, placeholders);
    Ok(Command::new(text, params))
}

/// Build `UPDATE <table> SET … WHERE <pk> = @N` keyed by `key`.
///
/// The primary-key column (matched case-insensitively) is never part of the
/// SET list; it is supplied separately as the key. Null-valued columns are
/// skipped too: updates never explicitly null a column, callers that need
/// that must issue their own statement.
pub fn update_command(
    ctx: &TableContext,
    record: &Record,
    key: Value,
) -> Result<Command, DynTableError> {
    let mut sets: Vec<String> = Vec::new();
    let mut params = Vec::new();

    for (name, value) in record.iter() {
        if name.eq_ignore_ascii_case(&ctx.primary_key) || value.is_null() {
            continue;
        }
        let index = bind(&mut params, value.clone());
        sets.push(format!("{name} = @{index}"));
    }

    if sets.is_empty() {
        return Err(DynTableError::EmptyRecord(format!(
            "no settable columns for update of {}",
            ctx.table
        )));
    }

    let key_index = bind(&mut params, key);
    let text = format!(
        "UPDATE {} SET {} WHERE {} = @{}",
        ctx.table,
        sets.join(", "),
        ctx.primary_key,
        key_index
    );
    Ok(Command::new(text, params))
}

/// Build a DELETE, either keyed by primary-key value or constrained by a
/// caller-supplied predicate fragment with caller-supplied parameters. The
/// key wins when both are given. A fragment without a leading `where` gets
/// one prepended.
pub fn delete_command(
    ctx: &TableContext,
    key: Option<Value>,
    where_fragment: &str,
    args: Vec<Value>,
) -> Command {
    let mut text = format!("DELETE FROM {}", ctx.table);
    let params = if let Some(key) = key {
        text.push_str(&format!(" WHERE {}=@0", ctx.primary_key));
        bind_all([key])
    } else {
        if let Some(clause) = where_clause(where_fragment) {
            text.push(' ');
            text.push_str(&clause);
        }
        bind_all(args)
    };
    Command::new(text, params)
}

/// Build one command per record, in order: an UPDATE when the record carries
/// a non-null primary-key value, an INSERT otherwise.
pub fn build_commands(
    ctx: &TableContext,
    records: Vec<Record>,
) -> Result<Vec<Command>, DynTableError> {
    let mut commands = Vec::with_capacity(records.len());
    for record in records {
        let key = primary_key_of(ctx, &record).filter(|v| !v.is_null());
        let command = match key {
            Some(key) => update_command(ctx, &record, key)?,
            None => insert_command(ctx, &record)?,
        };
        commands.push(command);
    }
    Ok(commands)
}
