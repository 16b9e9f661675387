//! Aggregate (`COUNT/SUM/AVG/MAX/MIN`) statement builder.

use crate::BuildError;
use crate::dialect::Dialect;
use crate::validate::check_identifier;

use super::condition::build_conditions_impl;
use super::types::{AggregateFunc, Condition, Operator, QueryResult, Value};

/// Column alias the aggregate result is returned under.
pub const AGGREGATE_ALIAS: &str = "result";

/// Description of `SELECT FUNC(<column>) AS result FROM <table> [WHERE ...]`.
///
/// `*` is accepted as the column only together with [`AggregateFunc::Count`].
///
/// # Example
///
/// ```
/// use shopkeep_sql::{Aggregate, AggregateFunc, Sqlite};
///
/// let query = Aggregate::new("users", AggregateFunc::Count, "*")
///     .filter_eq("reg_status", 0i64)
///     .build(&Sqlite)
///     .unwrap();
///
/// assert_eq!(
///     query.sql,
///     r#"SELECT COUNT(*) AS result FROM "users" WHERE "reg_status" = ?1"#
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    table: String,
    func: AggregateFunc,
    column: String,
    conditions: Vec<Condition>,
}

impl Aggregate {
    /// Aggregate `column` (or `*`) of `table` with `func`.
    pub fn new(table: impl Into<String>, func: AggregateFunc, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            func,
            column: column.into(),
            conditions: Vec::new(),
        }
    }

    /// `COUNT(*)` over `table`.
    pub fn count(table: impl Into<String>) -> Self {
        Self::new(table, AggregateFunc::Count, "*")
    }

    /// Add a condition.
    pub fn filter(
        mut self,
        column: impl Into<String>,
        op: Operator,
        value: impl Into<Value>,
    ) -> Self {
        self.conditions.push(Condition::new(column, op, value));
        self
    }

    /// Add an equality condition.
    pub fn filter_eq(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(column, Operator::Eq, value)
    }

    /// Add prepared conditions.
    pub fn conditions(mut self, conditions: impl IntoIterator<Item = Condition>) -> Self {
        self.conditions.extend(conditions);
        self
    }

    /// Build the SQL statement and its parameters.
    pub fn build<D: Dialect>(&self, dialect: &D) -> Result<QueryResult, BuildError> {
        check_identifier(&self.table, "table")?;

        let target = if self.column == "*" {
            if self.func != AggregateFunc::Count {
                return Err(BuildError::argument(format!(
                    "'*' is only valid with COUNT, not {}",
                    self.func.as_sql()
                )));
            }
            "*".to_string()
        } else {
            check_identifier(&self.column, "aggregate column")?;
            dialect.quote(&self.column)
        };

        let mut sql = format!(
            "SELECT {}({target}) AS {AGGREGATE_ALIAS} FROM {}",
            self.func.as_sql(),
            dialect.quote(&self.table)
        );
        let mut params = Vec::new();

        if !self.conditions.is_empty() {
            let (condition, new_params, _) = build_conditions_impl(dialect, &self.conditions, 1)?;
            sql.push_str(" WHERE ");
            sql.push_str(&condition);
            params.extend(new_params);
        }

        Ok(QueryResult { sql, params })
    }
}
