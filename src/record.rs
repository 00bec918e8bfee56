//! The canonical record: an ordered, case-preserving column-name → value
//! mapping, plus normalization from the supported input shapes.
//!
//! Every write path and every row read back from a database goes through
//! [`Record`]. Column order is preserved because it drives positional
//! placeholder generation; keys are unique within one record.

use serde::Serialize;

use crate::error::DynTableError;
use crate::types::Value;

/// An ordered column-name → value mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    columns: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self {
            columns: Vec::new(),
        }
    }

    /// Insert a column. If the name already exists, the value is replaced in
    /// place; the column keeps its original position.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        if let Some(slot) = self.columns.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = value;
        } else {
            self.columns.push((name, value));
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.columns.iter().any(|(n, _)| n == name)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Iterate columns in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    /// The first column's value, if any. Parameter binding uses this to
    /// unwrap a pre-wrapped single-value record.
    pub fn first_value(&self) -> Option<&Value> {
        self.columns.first().map(|(_, v)| v)
    }

    /// Normalize any serializable property bag into a record by reflecting
    /// over its fields through `serde_json`. Field declaration order is
    /// preserved.
    pub fn from_serialize<T: Serialize>(input: &T) -> Result<Self, DynTableError> {
        let json = serde_json::to_value(input)
            .map_err(|e| DynTableError::UnsupportedInput(format!("not serializable: {e}")))?;
        json.into_record()
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (name, value) in iter {
            record.insert(name, value);
        }
        record
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.into_iter()
    }
}

/// A name-multivalue collection, e.g. decoded form data.
///
/// Normalization keeps only the *first* value associated with each name.
/// This is lossy on purpose; it mirrors how form posts collapse onto a flat
/// record.
#[derive(Debug, Clone, Default)]
pub struct FormValues(pub Vec<(String, Vec<String>)>);

/// Conversion of a supported input shape into the canonical [`Record`].
pub trait IntoRecord {
    fn into_record(self) -> Result<Record, DynTableError>;
}

impl IntoRecord for Record {
    /// Identity: an already-canonical record passes through unchanged.
    fn into_record(self) -> Result<Record, DynTableError> {
        Ok(self)
    }
}

impl IntoRecord for Vec<(String, Value)> {
    fn into_record(self) -> Result<Record, DynTableError> {
        Ok(self.into_iter().collect())
    }
}

impl IntoRecord for FormValues {
    fn into_record(self) -> Result<Record, DynTableError> {
        let mut record = Record::new();
        for (name, values) in self.0 {
            if record.contains_key(&name) {
                continue;
            }
            if let Some(first) = values.into_iter().next() {
                record.insert(name, Value::Text(first));
            }
        }
        Ok(record)
    }
}

impl IntoRecord for serde_json::Value {
    fn into_record(self) -> Result<Record, DynTableError> {
        match self {
            serde_json::Value::Object(map) => {
                let mut record = Record::new();
                for (name, value) in map {
                    record.insert(name, json_to_value(value)?);
                }
                Ok(record)
            }
            other => Err(DynTableError::UnsupportedInput(format!(
                "expected an object with named fields, got {other}"
            ))),
        }
    }
}

impl<T: Serialize> IntoRecord for &T {
    fn into_record(self) -> Result<Record, DynTableError> {
        Record::from_serialize(self)
    }
}

fn json_to_value(json: serde_json::Value) -> Result<Value, DynTableError> {
    match json {
        serde_json::Value::Null => Ok(Value::Null),
        serde_json::Value::Bool(b) => Ok(Value::Bool(b)),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Int(i))
            } else if let Some(f) = n.as_f64() {
                Ok(Value::Float(f))
            } else {
                Err(DynTableError::UnsupportedInput(format!(
                    "number out of range: {n}"
                )))
            }
        }
        serde_json::Value::String(s) => Ok(Value::Text(s)),
        // Nested objects become nested records, the pre-wrapped escape hatch.
        serde_json::Value::Object(_) => {
            let nested = json.into_record()?;
            Ok(Value::Record(nested))
        }
        serde_json::Value::Array(_) => Err(DynTableError::UnsupportedInput(
            "array values cannot be mapped to a single column".to_string(),
        )),
    }
}
