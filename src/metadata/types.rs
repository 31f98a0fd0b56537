//! Metadata types produced by the loader.

use serde::{Deserialize, Serialize};

/// Information about a table column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    /// Column name.
    pub name: String,
    /// Whether the column is part of the table's primary key.
    pub is_primary_key: bool,
}

impl ColumnInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_primary_key: false,
        }
    }

    pub fn primary_key(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_primary_key: true,
        }
    }
}

/// A table and its columns, in database-reported order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMetadata {
    pub name: String,
    pub columns: Vec<ColumnInfo>,
}

impl TableMetadata {
    pub fn new(name: impl Into<String>, columns: Vec<ColumnInfo>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    /// The primary-key column, when exactly one column is flagged.
    ///
    /// Composite and missing keys both yield `None`.
    pub fn primary_key(&self) -> Option<&str> {
        let mut keys = self.columns.iter().filter(|c| c.is_primary_key);
        match (keys.next(), keys.next()) {
            (Some(only), None) => Some(only.name.as_str()),
            _ => None,
        }
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }
}
