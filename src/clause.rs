//! WHERE / ORDER BY fragment handling shared by delete and the query paths.
//!
//! Caller-supplied fragments get the keyword prepended unless they already
//! start with it, case-insensitively.

/// Normalize a predicate fragment into a full `WHERE …` clause.
/// Returns `None` for an empty or all-whitespace fragment.
pub fn where_clause(fragment: &str) -> Option<String> {
    prefixed_clause(fragment, "where", "WHERE")
}

/// Normalize an ordering fragment into a full `ORDER BY …` clause.
/// Returns `None` for an empty or all-whitespace fragment.
pub fn order_by_clause(fragment: &str) -> Option<String> {
    prefixed_clause(fragment, "order by", "ORDER BY")
}

fn prefixed_clause(fragment: &str, keyword: &str, prefix: &str) -> Option<String> {
    let trimmed = fragment.trim();
    if trimmed.is_empty() {
        return None;
    }
    if starts_with_keyword(trimmed, keyword) {
        Some(trimmed.to_string())
    } else {
        Some(format!("{prefix} {trimmed}"))
    }
}

fn starts_with_keyword(fragment: &str, keyword: &str) -> bool {
    fragment
        .get(..keyword.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(keyword))
}
