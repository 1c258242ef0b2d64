use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::{PassengerError, Result};

/// Column used to look a passenger up.
pub const ID_COLUMN: &'static str = "PassengerId";
/// Numeric column the fare histogram is computed over.
pub const FARE_COLUMN: &'static str = "Fare";

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Value {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Real(r) => Some(*r),
            Value::Null | Value::Text(_) => None,
        }
    }

    fn matches_id(&self, id: i64) -> bool {
        match self {
            Value::Integer(i) => *i == id,
            // i64::MAX as f64 is 2^63, one past the largest i64.
            Value::Real(r) => {
                r.fract() == 0.0 && *r >= i64::MIN as f64 && *r < i64::MAX as f64 && *r as i64 == id
            }
            Value::Null | Value::Text(_) => false,
        }
    }
}

/// One row, as ordered `column -> value` pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// An immutable table loaded from a data source for the lifetime of one request.
#[derive(Debug, Clone, Default)]
pub struct DataSet {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl DataSet {
    /// Every row must have exactly one value per column.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        debug_assert!(rows.iter().all(|row| row.len() == columns.len()));
        DataSet { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, column: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| PassengerError::ColumnNotFound(column.to_string()))
    }

    /// Values of one column in row order.
    pub fn column_values(&self, column: &str) -> Result<impl Iterator<Item = &Value>> {
        let idx = self.column_index(column)?;
        Ok(self.rows.iter().map(move |row| &row[idx]))
    }

    fn record(&self, row: &[Value]) -> Record {
        Record {
            fields: self.columns.iter().cloned().zip(row.iter().cloned()).collect(),
        }
    }

    pub fn list_all(&self) -> Vec<Record> {
        self.rows.iter().map(|row| self.record(row)).collect()
    }

    /// First record whose identifier equals `id`, restricted to `attributes`
    /// in the order given when that list is non-empty.
    pub fn get_one(&self, id: i64, attributes: &[String]) -> Result<Option<Record>> {
        let id_idx = self.column_index(ID_COLUMN)?;
        let projection = attributes
            .iter()
            .map(|name| self.column_index(name))
            .collect::<Result<Vec<_>>>()?;

        let Some(row) = self.rows.iter().find(|row| row[id_idx].matches_id(id)) else {
            return Ok(None);
        };
        if projection.is_empty() {
            return Ok(Some(self.record(row)));
        }
        let fields = projection
            .into_iter()
            .map(|idx| (self.columns[idx].clone(), row[idx].clone()))
            .collect();
        Ok(Some(Record { fields }))
    }
}
