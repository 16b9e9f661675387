//! INSERT statement builder.

use crate::BuildError;
use crate::dialect::Dialect;
use crate::validate::check_identifier;

use super::types::{QueryResult, Record};

/// Description of `INSERT INTO <table> (...) VALUES (...)` for one row.
///
/// Columns listed with [`Insert::exclude`] (typically an auto-increment key)
/// are dropped from the payload before the statement is rendered.
///
/// # Example
///
/// ```
/// use shopkeep_sql::{Insert, Record, Sqlite};
///
/// let data = Record::new().with("id", 0i64).with("name", "Books");
/// let query = Insert::table("categories")
///     .record(data)
///     .exclude(&["id"])
///     .build(&Sqlite)
///     .unwrap();
///
/// assert_eq!(query.sql, r#"INSERT INTO "categories" ("name") VALUES (?1)"#);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    table: String,
    data: Record,
    exclude: Vec<String>,
}

impl Insert {
    /// Insert into `table`.
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            data: Record::new(),
            exclude: Vec::new(),
        }
    }

    /// Row payload.
    pub fn record(mut self, data: Record) -> Self {
        self.data = data;
        self
    }

    /// Columns to drop from the payload.
    pub fn exclude(mut self, columns: &[&str]) -> Self {
        self.exclude.extend(columns.iter().map(|s| (*s).to_string()));
        self
    }

    /// Build the SQL statement and its parameters.
    pub fn build<D: Dialect>(&self, dialect: &D) -> Result<QueryResult, BuildError> {
        check_identifier(&self.table, "table")?;

        let mut columns = Vec::new();
        let mut placeholders = Vec::new();
        let mut params = Vec::new();

        for (column, value) in self.data.iter() {
            if self.exclude.iter().any(|c| c == column) {
                continue;
            }
            check_identifier(column, "column")?;
            columns.push(dialect.quote(column));
            placeholders.push(dialect.param(params.len() + 1));
            params.push(value.clone());
        }

        if columns.is_empty() {
            return Err(BuildError::argument(format!(
                "no columns left to insert into {}",
                self.table
            )));
        }

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            dialect.quote(&self.table),
            columns.join(", "),
            placeholders.join(", ")
        );

        Ok(QueryResult { sql, params })
    }
}
