//! Positional parameter binding.
//!
//! Parameters are appended under placeholder names `@0`, `@1`, … in strict
//! append order. The placeholder index in the generated SQL text and the
//! parameter's position in the list must never diverge; builders therefore
//! take the name from [`bind`]'s return value (or `params.len()` immediately
//! before the call) when emitting the matching token.

use crate::types::Value;

/// Declared size for text-typed parameters, in characters. Binding strings
/// and stringified uuids with an explicit size avoids driver-side implicit
/// sizing pitfalls.
pub const TEXT_PARAM_SIZE: u32 = 4000;

/// One bound parameter: positional placeholder name, coerced value, and an
/// optional declared size.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    /// Placeholder name, `@N` with N zero-based.
    pub name: String,
    pub value: Value,
    /// Declared maximum size, set for text-typed bindings.
    pub size: Option<u32>,
}

/// Append one value to the parameter list, applying the coercion rules:
///
/// - `Null` stays the null sentinel,
/// - `Uuid` is stringified and bound as text with size [`TEXT_PARAM_SIZE`],
/// - a pre-wrapped `Record` unwraps to its first contained value, verbatim
///   (an empty one binds NULL),
/// - `Text` is bound with size [`TEXT_PARAM_SIZE`],
/// - anything else is bound as-is for the driver to type.
///
/// Returns the placeholder index assigned to the value.
pub fn bind(params: &mut Vec<Param>, value: Value) -> usize {
    let index = params.len();
    let (value, size) = match value {
        Value::Null => (Value::Null, None),
        Value::Uuid(u) => (Value::Text(u.to_string()), Some(TEXT_PARAM_SIZE)),
        Value::Record(record) => {
            let unwrapped = record.into_iter().next().map(|(_, v)| v);
            (unwrapped.unwrap_or(Value::Null), None)
        }
        Value::Text(s) => (Value::Text(s), Some(TEXT_PARAM_SIZE)),
        other => (other, None),
    };
    params.push(Param {
        name: format!("@{index}"),
        value,
        size,
    });
    index
}

/// Bind a sequence of values, in order, into a fresh parameter list.
pub fn bind_all(values: impl IntoIterator<Item = Value>) -> Vec<Param> {
    let mut params = Vec::new();
    for value in values {
        bind(&mut params, value);
    }
    params
}
