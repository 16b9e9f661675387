//! Statement builders.
//!
//! Every builder is a plain description of one statement. Rendering happens
//! in `build(&dialect)`, which validates every table and column name before
//! any SQL text is produced.

mod aggregate;
mod condition;
mod delete;
mod insert;
mod select;
mod types;
mod update;

pub use aggregate::{AGGREGATE_ALIAS, Aggregate};
pub use delete::{Delete, Exists};
pub use insert::Insert;
pub use select::{DEFAULT_LIMIT, Select};
pub use types::{
    AggregateFunc, Condition, Operator, QueryResult, Record, SortDir, SortField, Value,
};
pub use update::Update;
