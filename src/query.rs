//! SELECT statement building: ad-hoc fragments, limits, projections, and the
//! row-numbering windowed pagination.
//!
//! These builders are pure string functions over a [`TableContext`]; the
//! [`crate::table::Table`] methods bind parameters and execute them.

use crate::clause::{order_by_clause, where_clause};
use crate::command::TableContext;
use crate::record::Record;

/// A page of records plus the totals computed for the full filtered set.
/// Computed fresh per call, never cached.
#[derive(Debug, Clone, Default)]
pub struct PagedResult {
    pub items: Vec<Record>,
    pub total_records: u64,
    pub total_pages: u64,
}

/// Options for [`crate::table::Table::all`].
#[derive(Debug, Clone)]
pub struct SelectOptions {
    /// Predicate fragment; `WHERE` is prepended if missing.
    pub where_fragment: String,
    /// Ordering fragment; `ORDER BY` is prepended if missing.
    pub order_by: String,
    /// Row cap; `0` means unbounded.
    pub limit: u64,
    /// Column projection.
    pub columns: String,
    /// Values for `@N` placeholders in the predicate.
    pub args: Vec<crate::types::Value>,
}

impl Default for SelectOptions {
    fn default() -> Self {
        Self {
            where_fragment: String::new(),
            order_by: String::new(),
            limit: 0,
            columns: "*".to_string(),
            args: Vec::new(),
        }
    }
}

impl SelectOptions {
    #[must_use]
    pub fn with_where(mut self, fragment: impl Into<String>) -> Self {
        self.where_fragment = fragment.into();
        self
    }

    #[must_use]
    pub fn with_order_by(mut self, order_by: impl Into<String>) -> Self {
        self.order_by = order_by.into();
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }

    #[must_use]
    pub fn with_columns(mut self, columns: impl Into<String>) -> Self {
        self.columns = columns.into();
        self
    }

    #[must_use]
    pub fn with_args(mut self, args: Vec<crate::types::Value>) -> Self {
        self.args = args;
        self
    }
}

/// Options for [`crate::table::Table::paged`].
#[derive(Debug, Clone)]
pub struct PageOptions {
    pub where_fragment: String,
    /// Ordering for the row-number window; defaults to the primary key.
    pub order_by: String,
    pub columns: String,
    pub page_size: u64,
    /// 1-based page number.
    pub page: u64,
    pub args: Vec<crate::types::Value>,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            where_fragment: String::new(),
            order_by: String::new(),
            columns: "*".to_string(),
            page_size: 20,
            page: 1,
            args: Vec::new(),
        }
    }
}

impl PageOptions {
    #[must_use]
    pub fn with_where(mut self, fragment: impl Into<String>) -> Self {
        self.where_fragment = fragment.into();
        self
    }

    #[must_use]
    pub fn with_order_by(mut self, order_by: impl Into<String>) -> Self {
        self.order_by = order_by.into();
        self
    }

    #[must_use]
    pub fn with_columns(mut self, columns: impl Into<String>) -> Self {
        self.columns = columns.into();
        self
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size;
        self
    }

    #[must_use]
    pub fn with_page(mut self, page: u64) -> Self {
        self.page = page;
        self
    }

    #[must_use]
    pub fn with_args(mut self, args: Vec<crate::types::Value>) -> Self {
        self.args = args;
        self
    }
}

/// Ceiling division: pages needed for `total_records` rows at `page_size`
/// rows per page.
pub fn total_pages(total_records: u64, page_size: u64) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total_records.div_ceil(page_size)
}

/// `SELECT <columns> FROM <table> [WHERE …] [ORDER BY …] [LIMIT n]`.
/// `limit = 0` means unbounded.
pub fn build_all_sql(
    ctx: &TableContext,
    where_fragment: &str,
    order_by: &str,
    limit: u64,
    columns: &str,
) -> String {
    let mut sql = format!("SELECT {} FROM {}", columns, ctx.table);
    if let Some(clause) = where_clause(where_fragment) {
        sql.push(' ');
        sql.push_str(&clause);
    }
    if let Some(clause) = order_by_clause(order_by) {
        sql.push(' ');
        sql.push_str(&clause);
    }
    if limit > 0 {
        sql.push_str(&format!(" LIMIT {limit}"));
    }
    sql
}

/// `SELECT COUNT(<pk>) FROM <table> [WHERE …]` over the same filtered set as
/// the page query.
pub fn build_count_sql(ctx: &TableContext, where_fragment: &str) -> String {
    let mut sql = format!("SELECT COUNT({}) FROM {}", ctx.primary_key, ctx.table);
    if let Some(clause) = where_clause(where_fragment) {
        sql.push(' ');
        sql.push_str(&clause);
    }
    sql
}

/// The windowed page query: number the filtered rows by the effective
/// ordering, then keep the inclusive 1-based range for the requested page.
///
/// Row numbering over `ROW_NUMBER() OVER (ORDER BY …)` is the one dialect
/// dependency this crate takes; it holds for both supported backends but is
/// not a universal SQL construct.
pub fn build_paged_sql(
    ctx: &TableContext,
    where_fragment: &str,
    order_by: &str,
    columns: &str,
    page_size: u64,
    page: u64,
) -> String {
    let order_by = if order_by.trim().is_empty() {
        ctx.primary_key.as_str()
    } else {
        order_by
    };
    let filter = where_clause(where_fragment)
        .map(|c| format!(" {c}"))
        .unwrap_or_default();

    let page = page.max(1);
    let row_lo = (page - 1) * page_size + 1;
    let row_hi = page * page_size;

    format!(
        "SELECT {columns} FROM (SELECT ROW_NUMBER() OVER (ORDER BY {order_by}) AS row_num, \
         {columns} FROM {table}{filter}) AS paged WHERE row_num >= {row_lo} AND row_num <= {row_hi}",
        columns = columns,
        order_by = order_by,
        table = ctx.table,
    )
}

/// `SELECT <columns> FROM <table> WHERE <pk> = @0`, the one-row lookup.
pub fn build_single_sql(ctx: &TableContext, columns: &str) -> String {
    format!(
        "SELECT {} FROM {} WHERE {} = @0",
        columns, ctx.table, ctx.primary_key
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> TableContext {
        TableContext::new("Users", None)
    }

    #[test]
    fn all_with_no_fragments_is_bare_select() {
        let sql = build_all_sql(&users(), "", "", 0, "*");
        assert_eq!(sql, "SELECT * FROM Users");
    }

    #[test]
    fn all_auto_prefixes_fragments() {
        let sql = build_all_sql(&users(), "Age > 18", "Name", 0, "*");
        assert_eq!(sql, "SELECT * FROM Users WHERE Age > 18 ORDER BY Name");
    }

    #[test]
    fn all_keeps_existing_where_keyword() {
        let sql = build_all_sql(&users(), "where Age > 18", "", 0, "*");
        assert_eq!(sql, "SELECT * FROM Users where Age > 18");
    }

    #[test]
    fn all_applies_limit_and_projection() {
        let sql = build_all_sql(&users(), "", "", 5, "Name,Age");
        assert_eq!(sql, "SELECT Name,Age FROM Users LIMIT 5");
    }

    #[test]
    fn count_sql_counts_primary_key_over_filter() {
        assert_eq!(build_count_sql(&users(), ""), "SELECT COUNT(ID) FROM Users");
        assert_eq!(
            build_count_sql(&users(), "Age > @0"),
            "SELECT COUNT(ID) FROM Users WHERE Age > @0"
        );
    }

    #[test]
    fn paged_sql_windows_the_requested_range() {
        let sql = build_paged_sql(&users(), "", "", "*", 10, 2);
        assert_eq!(
            sql,
            "SELECT * FROM (SELECT ROW_NUMBER() OVER (ORDER BY ID) AS row_num, * FROM Users) \
             AS paged WHERE row_num >= 11 AND row_num <= 20"
        );
    }

    #[test]
    fn paged_sql_uses_caller_ordering_and_filter() {
        let sql = build_paged_sql(&users(), "Age > 18", "Name desc", "Name", 5, 1);
        assert_eq!(
            sql,
            "SELECT Name FROM (SELECT ROW_NUMBER() OVER (ORDER BY Name desc) AS row_num, \
             Name FROM Users WHERE Age > 18) AS paged WHERE row_num >= 1 AND row_num <= 5"
        );
    }

    #[test]
    fn total_pages_is_ceiling_division() {
        assert_eq!(total_pages(25, 10), 3);
        assert_eq!(total_pages(20, 10), 2);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(0, 10), 0);
        // Property: (n + size - 1) / size for a spread of inputs.
        for total in 0..100u64 {
            for size in 1..12u64 {
                assert_eq!(total_pages(total, size), (total + size - 1) / size);
            }
        }
    }

    #[test]
    fn single_sql_targets_primary_key() {
        assert_eq!(
            build_single_sql(&users(), "*"),
            "SELECT * FROM Users WHERE ID = @0"
        );
        assert_eq!(
            build_single_sql(&users(), "Name"),
            "SELECT Name FROM Users WHERE ID = @0"
        );
    }
}
