//! Row shapes and name-based column lookup
//!
//! The host hands every change over together with the schema of the table
//! it belongs to. Schemas are never cached here: two consecutive events for
//! the same table may carry different column layouts.

use serde::{Deserialize, Serialize};

/// One column of a [`RowSchema`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Column name, compared case-sensitively
    pub name: String,
    /// Zero-based position of the column's value in the [`Row`]
    pub ordinal: usize,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, ordinal: usize) -> Self {
        Self {
            name: name.into(),
            ordinal,
        }
    }
}

/// Ordered column descriptors describing one table's rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowSchema {
    columns: Vec<ColumnDescriptor>,
}

impl RowSchema {
    pub fn new(columns: Vec<ColumnDescriptor>) -> Self {
        Self { columns }
    }

    /// Schema whose ordinals follow the order of `names`.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns = names
            .into_iter()
            .enumerate()
            .map(|(ordinal, name)| ColumnDescriptor::new(name, ordinal))
            .collect();
        Self { columns }
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Ordinal of the first column named exactly `name`.
    pub fn ordinal_of(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.ordinal)
    }
}

/// A single column value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Value {
    /// SQL NULL
    Null,
    /// Binary integer datum
    Int(i64),
    /// Text representation of the datum
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Interpret the value as an unsigned 64-bit integer.
    ///
    /// Negative integers and text that is not a plain decimal number
    /// yield `None`.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Null => None,
            Value::Int(v) => u64::try_from(*v).ok(),
            Value::Text(s) => {
                if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                s.parse().ok()
            }
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Column values positioned according to a [`RowSchema`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row(pub Vec<Value>);

impl Row {
    pub fn new(values: Vec<Value>) -> Self {
        Self(values)
    }

    pub fn get(&self, ordinal: usize) -> Option<&Value> {
        self.0.get(ordinal)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Value> for Row {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Row(iter.into_iter().collect())
    }
}

/// Resolve the column named `name` in `row`.
///
/// `None` means the schema has no such column (or its ordinal lies past the
/// end of the row). A column that exists but holds NULL comes back as
/// `Some(&Value::Null)`.
pub fn lookup<'r>(row: &'r Row, schema: &RowSchema, name: &str) -> Option<&'r Value> {
    schema.ordinal_of(name).and_then(|ordinal| row.get(ordinal))
}
