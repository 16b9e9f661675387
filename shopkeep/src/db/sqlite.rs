//! SQLite backend over `rusqlite`.

use std::path::Path;

use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{Connection, params_from_iter};
use shopkeep_sql::{BuildError, Dialect, QueryResult, Record, Sqlite, Value};

use super::Database;
use crate::Result;

/// Bootstrap DDL for the admin tables. Not a migration tool: tables are
/// only created when missing.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    user_id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL,
    password TEXT NOT NULL,
    email TEXT NOT NULL,
    full_name TEXT NOT NULL DEFAULT '',
    group_id INTEGER NOT NULL DEFAULT 0,
    trust_status INTEGER NOT NULL DEFAULT 0,
    reg_status INTEGER NOT NULL DEFAULT 0,
    registration_date TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS categories (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    parent_id INTEGER NULL,
    "order" INTEGER NOT NULL DEFAULT 0,
    visibility INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
"#;

/// [`Database`] backed by a single SQLite connection.
#[derive(Debug)]
pub struct SqliteDatabase {
    conn: Connection,
}

impl SqliteDatabase {
    /// Open (or create) a database file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        crate::log!(debug, "database opened", path: path.display());
        Ok(Self { conn })
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    /// Wrap an existing connection.
    #[must_use]
    pub const fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    /// Create the `users` and `categories` tables if they do not exist.
    pub fn initialize_schema(&self) -> Result<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Underlying connection, for fixtures and ad hoc maintenance.
    #[must_use]
    pub const fn connection(&self) -> &Connection {
        &self.conn
    }

    fn trace(&self, query: &QueryResult) {
        crate::log!(
            debug,
            "statement",
            dialect: self.dialect().name(),
            sql: &query.sql,
            params: query.params.len()
        );
    }
}

impl Database for SqliteDatabase {
    type Dialect = Sqlite;

    fn dialect(&self) -> Sqlite {
        Sqlite
    }

    fn fetch_all(&self, query: &QueryResult) -> Result<Vec<Record>> {
        self.trace(query);
        let params = bind_all(&query.params)?;
        let mut stmt = self.conn.prepare(&query.sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let mut rows = stmt.query(params_from_iter(params))?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            let mut record = Record::new();
            for (idx, column) in columns.iter().enumerate() {
                record.set(column.as_str(), from_sql(row.get_ref(idx)?));
            }
            records.push(record);
        }
        Ok(records)
    }

    fn execute(&self, query: &QueryResult) -> Result<u64> {
        self.trace(query);
        let params = bind_all(&query.params)?;
        let affected = self.conn.execute(&query.sql, params_from_iter(params))?;
        Ok(u64::try_from(affected).unwrap_or(u64::MAX))
    }

    fn insert(&self, query: &QueryResult) -> Result<i64> {
        self.execute(query)?;
        Ok(self.conn.last_insert_rowid())
    }
}

/// Convert builder parameters to SQLite values.
///
/// Arrays never reach this point because builders expand them into one
/// parameter per element.
fn bind_all(params: &[Value]) -> Result<Vec<SqlValue>, BuildError> {
    params.iter().map(to_sql).collect()
}

fn to_sql(value: &Value) -> Result<SqlValue, BuildError> {
    Ok(match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Int(i) => SqlValue::Integer(*i),
        Value::Float(f) => SqlValue::Real(*f),
        Value::String(s) => SqlValue::Text(s.clone()),
        Value::Array(_) => {
            return Err(BuildError::argument("list values cannot be bound directly"));
        },
    })
}

fn from_sql(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Int(i),
        ValueRef::Real(f) => Value::Float(f),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::String(hex::encode(bytes)),
    }
}
