//! Materialized result sets and the row shapes they can be fetched as.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::Value;

/// How each row of a result set should be shaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Positional tuple.
    Row,
    /// Ordered name/value record.
    Assoc,
    /// JSON object.
    Object,
    /// First column only.
    Scalar,
}

/// One fetched row, in the shape selected by [`FetchMode`].
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched {
    Row(Vec<Value>),
    Assoc(Record),
    Object(serde_json::Value),
    Scalar(Value),
}

/// A row keyed by column name, preserving column order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new(fields: Vec<(String, Value)>) -> Self {
        Self { fields }
    }

    /// Value of the named column. With duplicate names the last one wins.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .fields
            .iter()
            .map(|(n, v)| (n.clone(), v.to_json()))
            .collect::<serde_json::Map<_, _>>();
        serde_json::Value::Object(map)
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Column names plus every row of a query.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl ResultSet {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Shape every row as the requested variant.
    pub fn fetch(self, mode: FetchMode) -> Vec<Fetched> {
        let columns = self.columns;
        self.rows
            .into_iter()
            .map(|row| match mode {
                FetchMode::Row => Fetched::Row(row),
                FetchMode::Assoc => Fetched::Assoc(fetch_assoc(&columns, row)),
                FetchMode::Object => Fetched::Object(fetch_object(&columns, &row)),
                FetchMode::Scalar => Fetched::Scalar(fetch_scalar(row)),
            })
            .collect()
    }

    /// First column of the first row.
    pub fn into_scalar(self) -> Option<Value> {
        self.rows.into_iter().next().map(fetch_scalar)
    }

    /// One column of every row. Rows too short for `index` yield `Null`.
    pub fn into_column(self, index: usize) -> Vec<Value> {
        self.rows
            .into_iter()
            .map(|row| row.into_iter().nth(index).unwrap_or(Value::Null))
            .collect()
    }

    pub fn into_records(self) -> Vec<Record> {
        let columns = self.columns;
        self.rows
            .into_iter()
            .map(|row| fetch_assoc(&columns, row))
            .collect()
    }

    pub fn into_objects(self) -> Vec<serde_json::Value> {
        self.rows
            .iter()
            .map(|row| fetch_object(&self.columns, row))
            .collect()
    }
}

fn fetch_assoc(columns: &[String], row: Vec<Value>) -> Record {
    Record::new(columns.iter().cloned().zip(row).collect())
}

fn fetch_object(columns: &[String], row: &[Value]) -> serde_json::Value {
    let map = columns
        .iter()
        .zip(row)
        .map(|(c, v)| (c.clone(), v.to_json()))
        .collect::<serde_json::Map<_, _>>();
    serde_json::Value::Object(map)
}

fn fetch_scalar(row: Vec<Value>) -> Value {
    row.into_iter().next().unwrap_or(Value::Null)
}
