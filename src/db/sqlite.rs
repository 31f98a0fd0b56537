//! SQLite implementation of [`Database`] backed by `rusqlite`.

use std::sync::atomic::{AtomicUsize, Ordering};

use rusqlite::types::{ToSqlOutput, Value as SqlValue, ValueRef};
use rusqlite::{params_from_iter, Connection, ToSql};

use super::{Database, ResultSet, Value};
use crate::config::{ConnectionConfig, ConnectionError};
use crate::error::{Error, Result};
use crate::metadata::ColumnInfo;
use crate::sql::Dialect;

const LIST_TABLES: &str = "SELECT name FROM sqlite_master \
     WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name";

const LIST_COLUMNS: &str = "SELECT name, pk FROM pragma_table_info(?1) ORDER BY cid";

/// Names unnamed in-memory databases so each one gets its own cache key.
static NEXT_MEMORY_ID: AtomicUsize = AtomicUsize::new(1);

/// A blocking SQLite connection.
///
/// Every statement is preceded by a liveness check (`SELECT 1` unless
/// replaced). A file database that fails the check is reopened from its
/// [`ConnectionConfig`]; an in-memory one cannot be and errors instead.
pub struct SqliteDatabase {
    conn: Connection,
    config: ConnectionConfig,
    liveness: fn(&Connection) -> bool,
    reconnects: usize,
}

fn select_one(conn: &Connection) -> bool {
    conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
        .is_ok()
}

impl SqliteDatabase {
    /// Open the database described by `config`.
    ///
    /// An unnamed in-memory database is named `memory-N`, unique within the
    /// process.
    pub fn open(mut config: ConnectionConfig) -> std::result::Result<Self, ConnectionError> {
        if config.is_in_memory() && config.name.is_none() {
            let id = NEXT_MEMORY_ID.fetch_add(1, Ordering::Relaxed);
            config.name = Some(format!("memory-{}", id));
        }
        let conn = open_connection(&config)?;
        Ok(Self {
            conn,
            config,
            liveness: select_one,
            reconnects: 0,
        })
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> std::result::Result<Self, ConnectionError> {
        Self::open(ConnectionConfig::sqlite_in_memory())
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Replace the check run before every statement.
    pub fn with_liveness_check(mut self, check: fn(&Connection) -> bool) -> Self {
        self.liveness = check;
        self
    }

    /// How many times the connection has been reopened.
    pub fn reconnects(&self) -> usize {
        self.reconnects
    }

    /// Run several `;`-separated statements without parameters.
    pub fn execute_batch(&mut self, sql: &str) -> Result<()> {
        self.ensure_connected()?;
        self.conn
            .execute_batch(sql)
            .map_err(|e| Error::query(sql, e))
    }

    /// Whether the connection passes its liveness check.
    pub fn ping(&self) -> bool {
        (self.liveness)(&self.conn)
    }

    fn ensure_connected(&mut self) -> Result<()> {
        if self.ping() {
            return Ok(());
        }

        log::warn!(
            "ping failed on '{}', reconnecting",
            self.config.database_name()
        );
        if self.config.is_in_memory() {
            return Err(ConnectionError::InMemoryLost.into());
        }
        self.conn = open_connection(&self.config)?;
        self.reconnects += 1;
        Ok(())
    }

    /// Close the connection, reporting any error from the driver.
    pub fn close(self) -> Result<()> {
        self.conn
            .close()
            .map_err(|(_, e)| Error::query("<close>", e))
    }
}

fn open_connection(config: &ConnectionConfig) -> std::result::Result<Connection, ConnectionError> {
    let result = if config.is_in_memory() {
        Connection::open_in_memory()
    } else {
        Connection::open(&config.path)
    };

    result.map_err(|source| ConnectionError::OpenFailed {
        path: config.path.clone(),
        source,
    })
}

impl Database for SqliteDatabase {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn database_name(&self) -> String {
        self.config.database_name()
    }

    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<usize> {
        self.ensure_connected()?;
        self.conn
            .execute(sql, params_from_iter(params.iter()))
            .map_err(|e| Error::query(sql, e))
    }

    fn last_insert_id(&self) -> i64 {
        self.conn.last_insert_rowid()
    }

    fn query(&mut self, sql: &str, params: &[Value]) -> Result<ResultSet> {
        self.ensure_connected()?;

        let mut stmt = self.conn.prepare(sql).map_err(|e| Error::query(sql, e))?;
        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();
        let width = columns.len();

        let rows = stmt
            .query_map(params_from_iter(params.iter()), |row| {
                (0..width)
                    .map(|i| row.get_ref(i).map(Value::from))
                    .collect::<rusqlite::Result<Vec<_>>>()
            })
            .and_then(|mapped| mapped.collect::<rusqlite::Result<Vec<_>>>())
            .map_err(|e| Error::query(sql, e))?;

        Ok(ResultSet::new(columns, rows))
    }

    fn enumerate_tables(&mut self) -> Result<Vec<String>> {
        self.query(LIST_TABLES, &[])?
            .into_column(0)
            .into_iter()
            .map(|v| {
                v.as_str().map(String::from).ok_or_else(|| {
                    Error::UnexpectedResult(format!("table name is not text: {}", v))
                })
            })
            .collect()
    }

    fn enumerate_columns(&mut self, table: &str) -> Result<Vec<ColumnInfo>> {
        let rows = self.rows(LIST_COLUMNS, &[Value::from(table)])?;

        rows.into_iter()
            .map(|row| match row.as_slice() {
                [Value::Text(name), pk] => Ok(ColumnInfo {
                    name: name.clone(),
                    is_primary_key: pk.as_i64().unwrap_or(0) > 0,
                }),
                other => Err(Error::UnexpectedResult(format!(
                    "malformed column row for '{}': {:?}",
                    table, other
                ))),
            })
            .collect()
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Owned(SqlValue::Null),
            Value::Integer(i) => ToSqlOutput::from(*i),
            Value::Real(f) => ToSqlOutput::from(*f),
            Value::Text(s) => ToSqlOutput::from(s.as_str()),
            Value::Blob(b) => ToSqlOutput::from(b.as_slice()),
        })
    }
}

impl From<ValueRef<'_>> for Value {
    fn from(v: ValueRef<'_>) -> Self {
        match v {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Integer(i),
            ValueRef::Real(f) => Value::Real(f),
            ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => Value::Blob(b.to_vec()),
        }
    }
}
