//! Database collaborator.
//!
//! Every data-access function takes the database explicitly; nothing in the
//! crate holds a global connection.

mod sqlite;

pub use sqlite::SqliteDatabase;

use shopkeep_sql::{Dialect, QueryResult, Record};

use crate::Result;

/// A handle that executes single built statements.
///
/// Each call is one independent round trip. There are no transactions and
/// no retries; errors propagate to the caller as they come.
pub trait Database {
    /// SQL dialect statements must be rendered for.
    type Dialect: Dialect;

    /// Dialect of this backend.
    fn dialect(&self) -> Self::Dialect;

    /// Run a query and return every row as a [`Record`].
    fn fetch_all(&self, query: &QueryResult) -> Result<Vec<Record>>;

    /// Run a statement and return the number of affected rows.
    fn execute(&self, query: &QueryResult) -> Result<u64>;

    /// Run an INSERT and return the new row id.
    fn insert(&self, query: &QueryResult) -> Result<i64>;

    /// Run a query and return the first row, if any.
    fn fetch_one(&self, query: &QueryResult) -> Result<Option<Record>> {
        Ok(self.fetch_all(query)?.into_iter().next())
    }
}

impl<D: Database + ?Sized> Database for &D {
    type Dialect = D::Dialect;

    fn dialect(&self) -> Self::Dialect {
        (**self).dialect()
    }

    fn fetch_all(&self, query: &QueryResult) -> Result<Vec<Record>> {
        (**self).fetch_all(query)
    }

    fn execute(&self, query: &QueryResult) -> Result<u64> {
        (**self).execute(query)
    }

    fn insert(&self, query: &QueryResult) -> Result<i64> {
        (**self).insert(query)
    }
}
