// =============================================================================
// CRATE-LEVEL QUALITY LINTS
// =============================================================================
#![forbid(unsafe_code)]
#![deny(unused_must_use)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]
#![warn(unreachable_pub)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
// =============================================================================
// CLIPPY CONFIGURATION
// =============================================================================
#![allow(clippy::doc_markdown)] // Code items in docs - extensive doc changes needed
#![allow(clippy::module_name_repetitions)] // Type names matching module - acceptable
#![allow(clippy::return_self_not_must_use)] // Builder pattern methods return Self by design
#![allow(clippy::must_use_candidate)] // Builder methods - fluent API doesn't need must_use
#![allow(clippy::format_push_string)] // String building style preference
#![allow(clippy::exhaustive_enums)] // Operator/SortDir/AggregateFunc are closed SQL vocabularies
#![allow(clippy::exhaustive_structs)] // Dialect markers and QueryResult are plain data
#![allow(clippy::double_must_use)] // Functions returning must_use types can have their own docs

//! # shopkeep-sql - allowlisted, parameterized SQL statements
//!
//! Statement builders for the shopkeep admin panel. Callers describe a
//! statement (table, columns, conditions, ordering, paging) and render it
//! for a [`Dialect`]. The result is SQL text plus an ordered parameter list.
//!
//! Two rules hold for everything this crate produces:
//!
//! - every table and column name matches `^[a-zA-Z0-9_]+$` and is quoted
//!   for the dialect, otherwise the build fails with
//!   [`BuildError::InvalidIdentifier`];
//! - every value, including `LIMIT` and `OFFSET`, is a bound parameter.
//!
//! ## Quick Start
//!
//! ```
//! use shopkeep_sql::{Operator, Select, SortDir, Sqlite, Value};
//!
//! let query = Select::table("users")
//!     .columns(&["user_id", "username"])
//!     .filter("group_id", Operator::In, vec![1i64, 2])
//!     .order_by("user_id", SortDir::Asc)
//!     .build(&Sqlite)
//!     .unwrap();
//!
//! assert_eq!(
//!     query.sql,
//!     r#"SELECT "user_id", "username" FROM "users" WHERE "group_id" IN (?1, ?2) ORDER BY "user_id" ASC LIMIT ?3 OFFSET ?4"#
//! );
//! assert_eq!(query.params[2], Value::Int(10));
//! ```
//!
//! ## Dialects
//!
//! | Dialect | Placeholder | Identifier |
//! |---------|-------------|------------|
//! | [`Sqlite`] | `?1`, `?2` | `"name"` |
//! | [`Postgres`] | `$1`, `$2` | `"name"` |
//! | [`MySql`] | `?` | `` `name` `` |

mod builder;
mod dialect;
mod error;
mod validate;

pub use builder::{
    AGGREGATE_ALIAS, Aggregate, AggregateFunc, Condition, DEFAULT_LIMIT, Delete, Exists, Insert,
    Operator, QueryResult, Record, Select, SortDir, SortField, Update, Value,
};
pub use dialect::{Dialect, MySql, Postgres, Sqlite};
pub use error::BuildError;
pub use validate::{check_identifier, is_valid_identifier};

/// Prelude module for convenient imports.
///
/// ```
/// use shopkeep_sql::prelude::*;
///
/// let query = Delete::by_id("users", "user_id", 3).build(&Postgres).unwrap();
/// assert_eq!(query.sql, r#"DELETE FROM "users" WHERE "user_id" = $1"#);
/// ```
pub mod prelude {
    pub use crate::{
        Aggregate, AggregateFunc, BuildError, Condition, Delete, Dialect, Exists, Insert, MySql,
        Operator, Postgres, QueryResult, Record, Select, SortDir, Sqlite, Update, Value,
    };
}


// ============================================================================
// API Contract Tests (compile-time assertions)
// ============================================================================
