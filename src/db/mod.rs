//! Query execution layer.
//!
//! The [`Database`] trait is the seam between the schema-graph core and the
//! driver that actually runs statements. Implementors provide raw execution,
//! row materialization and the two metadata primitives; every convenience
//! helper (`value`, `assocs`, `json`, ...) is built on top of those.
//!
//! # Example
//!
//! ```ignore
//! use ancestry::db::{Database, FetchMode, SqliteDatabase};
//!
//! let mut db = SqliteDatabase::open_in_memory()?;
//! db.execute_batch("CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT)")?;
//! let id = db.insert("INSERT INTO t (name) VALUES (?)", &["widget".into()])?;
//! let name = db.value("SELECT name FROM t WHERE id = ?", &[id.into()])?;
//! ```

mod result;
mod sqlite;
mod value;

pub use result::{FetchMode, Fetched, Record, ResultSet};
pub use sqlite::SqliteDatabase;
pub use value::Value;

use crate::error::Result;
use crate::metadata::ColumnInfo;
use crate::sql::Dialect;

/// A blocking database connection.
///
/// Parameters are always bound by the driver, never spliced into the
/// statement text.
pub trait Database {
    // =========================================================================
    // Required
    // =========================================================================

    /// SQL dialect used for identifier quoting.
    fn dialect(&self) -> Dialect;

    /// Name of the database. Scopes the cached schema graph.
    fn database_name(&self) -> String;

    /// Execute a statement and return the number of affected rows.
    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<usize>;

    /// Row id generated by the most recent successful insert.
    fn last_insert_id(&self) -> i64;

    /// Run a query and materialize every row.
    fn query(&mut self, sql: &str, params: &[Value]) -> Result<ResultSet>;

    /// All table names visible to this connection.
    fn enumerate_tables(&mut self) -> Result<Vec<String>>;

    /// Columns of a table, in database-reported order.
    fn enumerate_columns(&mut self, table: &str) -> Result<Vec<ColumnInfo>>;

    // =========================================================================
    // Provided
    // =========================================================================

    /// Execute an insert and return the generated row id.
    fn insert(&mut self, sql: &str, params: &[Value]) -> Result<i64> {
        self.execute(sql, params)?;
        Ok(self.last_insert_id())
    }

    /// Execute an update and return the number of affected rows.
    fn update(&mut self, sql: &str, params: &[Value]) -> Result<usize> {
        self.execute(sql, params)
    }

    /// Execute a delete and return the number of affected rows.
    fn delete(&mut self, sql: &str, params: &[Value]) -> Result<usize> {
        self.execute(sql, params)
    }

    /// Run a query and shape every row as the requested variant.
    fn fetch(&mut self, sql: &str, params: &[Value], mode: FetchMode) -> Result<Vec<Fetched>> {
        Ok(self.query(sql, params)?.fetch(mode))
    }

    /// Visit every row of a query, shaped as the requested variant.
    fn for_each(
        &mut self,
        sql: &str,
        params: &[Value],
        mode: FetchMode,
        visit: &mut dyn FnMut(Fetched),
    ) -> Result<()> {
        for item in self.fetch(sql, params, mode)? {
            visit(item);
        }
        Ok(())
    }

    /// First column of the first row, if there is a row.
    fn value(&mut self, sql: &str, params: &[Value]) -> Result<Option<Value>> {
        Ok(self.query(sql, params)?.into_scalar())
    }

    /// One column of every row.
    fn column(&mut self, sql: &str, params: &[Value], index: usize) -> Result<Vec<Value>> {
        Ok(self.query(sql, params)?.into_column(index))
    }

    /// Every row as a positional tuple.
    fn rows(&mut self, sql: &str, params: &[Value]) -> Result<Vec<Vec<Value>>> {
        Ok(self.query(sql, params)?.rows)
    }

    /// Every row as an ordered name/value record.
    fn assocs(&mut self, sql: &str, params: &[Value]) -> Result<Vec<Record>> {
        Ok(self.query(sql, params)?.into_records())
    }

    /// The first row as a record.
    fn assoc(&mut self, sql: &str, params: &[Value]) -> Result<Option<Record>> {
        Ok(self.assocs(sql, params)?.into_iter().next())
    }

    /// Every row as a JSON object.
    fn objects(&mut self, sql: &str, params: &[Value]) -> Result<Vec<serde_json::Value>> {
        Ok(self.query(sql, params)?.into_objects())
    }

    /// The first row as a JSON object.
    fn object(&mut self, sql: &str, params: &[Value]) -> Result<Option<serde_json::Value>> {
        Ok(self.objects(sql, params)?.into_iter().next())
    }

    /// Every row serialized as a JSON array of objects.
    fn json(&mut self, sql: &str, params: &[Value]) -> Result<String> {
        let records = self.assocs(sql, params)?;
        Ok(serde_json::to_string(&records)?)
    }

    /// Escape a string for embedding in a single-quoted literal.
    fn escape(&self, s: &str) -> String {
        self.dialect().escape_string(s)
    }
}
