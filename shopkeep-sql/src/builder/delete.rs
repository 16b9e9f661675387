//! DELETE and existence-check statement builders.

use crate::BuildError;
use crate::dialect::Dialect;
use crate::validate::check_identifier;

use super::types::{QueryResult, Value};

/// Description of `DELETE FROM <table> WHERE <id_column> = ?`.
///
/// Only single-row deletes by key are expressible; there is no way to build
/// an unfiltered DELETE.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delete {
    table: String,
    id_column: String,
    id: i64,
}

impl Delete {
    /// Delete the row of `table` whose `id_column` equals `id`.
    pub fn by_id(table: impl Into<String>, id_column: impl Into<String>, id: i64) -> Self {
        Self {
            table: table.into(),
            id_column: id_column.into(),
            id,
        }
    }

    /// Build the SQL statement and its parameters.
    pub fn build<D: Dialect>(&self, dialect: &D) -> Result<QueryResult, BuildError> {
        check_identifier(&self.table, "table")?;
        check_identifier(&self.id_column, "id column")?;

        Ok(QueryResult {
            sql: format!(
                "DELETE FROM {} WHERE {} = {}",
                dialect.quote(&self.table),
                dialect.quote(&self.id_column),
                dialect.param(1)
            ),
            params: vec![Value::Int(self.id)],
        })
    }
}

/// Description of `SELECT 1 FROM <table> WHERE <id_column> = ? LIMIT 1`.
///
/// A row coming back means the key exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exists {
    table: String,
    id_column: String,
    id: i64,
}

impl Exists {
    /// Check whether `table` has a row whose `id_column` equals `id`.
    pub fn new(table: impl Into<String>, id_column: impl Into<String>, id: i64) -> Self {
        Self {
            table: table.into(),
            id_column: id_column.into(),
            id,
        }
    }

    /// Build the SQL statement and its parameters.
    pub fn build<D: Dialect>(&self, dialect: &D) -> Result<QueryResult, BuildError> {
        check_identifier(&self.table, "table")?;
        check_identifier(&self.id_column, "id column")?;

        Ok(QueryResult {
            sql: format!(
                "SELECT 1 FROM {} WHERE {} = {} LIMIT 1",
                dialect.quote(&self.table),
                dialect.quote(&self.id_column),
                dialect.param(1)
            ),
            params: vec![Value::Int(self.id)],
        })
    }
}
