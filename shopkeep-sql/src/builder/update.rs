//! UPDATE statement builder.

use crate::BuildError;
use crate::dialect::Dialect;
use crate::validate::check_identifier;

use super::types::{QueryResult, Record, Value};

/// Description of `UPDATE <table> SET ... WHERE <id_column> = ?`.
///
/// The id column never appears in the SET clause, even when the payload
/// carries it.
///
/// # Example
///
/// ```
/// use shopkeep_sql::{Record, Sqlite, Update};
///
/// let data = Record::new().with("id", 3i64).with("name", "Games");
/// let query = Update::table("categories")
///     .record(data)
///     .by_id("id", 3)
///     .build(&Sqlite)
///     .unwrap();
///
/// assert_eq!(query.sql, r#"UPDATE "categories" SET "name" = ?1 WHERE "id" = ?2"#);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    table: String,
    data: Record,
    exclude: Vec<String>,
    id_column: String,
    id: Value,
}

impl Update {
    /// Update rows of `table`. Call [`Update::by_id`] to pick the row.
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            data: Record::new(),
            exclude: Vec::new(),
            id_column: String::new(),
            id: Value::Null,
        }
    }

    /// Single-column update shortcut (`SET <status_column> = ?`).
    pub fn status(
        table: impl Into<String>,
        id_column: impl Into<String>,
        id: i64,
        status_column: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        Self::table(table)
            .record(Record::new().with(status_column, value))
            .by_id(id_column, id)
    }

    /// Columns to set.
    pub fn record(mut self, data: Record) -> Self {
        self.data = data;
        self
    }

    /// Columns to drop from the payload.
    pub fn exclude(mut self, columns: &[&str]) -> Self {
        self.exclude.extend(columns.iter().map(|s| (*s).to_string()));
        self
    }

    /// Row selector.
    pub fn by_id(mut self, id_column: impl Into<String>, id: i64) -> Self {
        self.id_column = id_column.into();
        self.id = Value::Int(id);
        self
    }

    /// Build the SQL statement and its parameters.
    pub fn build<D: Dialect>(&self, dialect: &D) -> Result<QueryResult, BuildError> {
        check_identifier(&self.table, "table")?;
        check_identifier(&self.id_column, "id column")?;

        let mut sets = Vec::new();
        let mut params = Vec::new();

        for (column, value) in self.data.iter() {
            if column == self.id_column || self.exclude.iter().any(|c| c == column) {
                continue;
            }
            check_identifier(column, "column")?;
            sets.push(format!(
                "{} = {}",
                dialect.quote(column),
                dialect.param(params.len() + 1)
            ));
            params.push(value.clone());
        }

        if sets.is_empty() {
            return Err(BuildError::argument(format!(
                "no columns left to update in {}",
                self.table
            )));
        }

        let sql = format!(
            "UPDATE {} SET {} WHERE {} = {}",
            dialect.quote(&self.table),
            sets.join(", "),
            dialect.quote(&self.id_column),
            dialect.param(params.len() + 1)
        );
        params.push(self.id.clone());

        Ok(QueryResult { sql, params })
    }
}
