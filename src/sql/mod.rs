//! SQL dialect support.
//!
//! Identifiers in synthesized statements come from schema metadata and are
//! quoted per dialect. Values never pass through here; they are bound as
//! statement parameters by the execution layer.

pub mod quote;

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    #[default]
    Sqlite,
    MySql,
}

impl Dialect {
    pub fn name(&self) -> &'static str {
        match self {
            Dialect::Sqlite => "sqlite",
            Dialect::MySql => "mysql",
        }
    }

    /// Quote an identifier (table or column name).
    pub fn quote_identifier(&self, ident: &str) -> String {
        match self {
            Dialect::Sqlite => quote::quote_double(ident),
            Dialect::MySql => quote::quote_backtick(ident),
        }
    }

    /// Quote a `table.column` reference.
    pub fn qualified(&self, table: &str, column: &str) -> String {
        format!(
            "{}.{}",
            self.quote_identifier(table),
            self.quote_identifier(column)
        )
    }

    /// Escape a string for embedding in a single-quoted literal.
    pub fn escape_string(&self, s: &str) -> String {
        match self {
            Dialect::Sqlite => quote::escape_single(s),
            Dialect::MySql => quote::escape_mysql(s),
        }
    }

    /// Positional parameter placeholder.
    pub fn placeholder(&self) -> &'static str {
        "?"
    }
}
