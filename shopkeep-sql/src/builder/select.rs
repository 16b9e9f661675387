//! SELECT statement builder.

use crate::BuildError;
use crate::dialect::Dialect;
use crate::validate::check_identifier;

use super::condition::build_conditions_impl;
use super::types::{Condition, Operator, QueryResult, SortDir, SortField, Value};

/// Page size used when the caller does not pick one.
pub const DEFAULT_LIMIT: i64 = 10;

/// Description of a `SELECT ... FROM <table>` statement.
///
/// Nothing is validated until [`Select::build`], which either renders the
/// whole statement or fails without producing any SQL.
///
/// # Example
///
/// ```
/// use shopkeep_sql::{Select, SortDir, Sqlite};
///
/// let query = Select::table("users")
///     .columns(&["user_id", "username"])
///     .filter_eq("reg_status", 0i64)
///     .order_by("user_id", SortDir::Desc)
///     .limit(5)
///     .build(&Sqlite)
///     .unwrap();
///
/// assert_eq!(
///     query.sql,
///     r#"SELECT "user_id", "username" FROM "users" WHERE "reg_status" = ?1 ORDER BY "user_id" DESC LIMIT ?2 OFFSET ?3"#
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    table: String,
    columns: Vec<String>,
    conditions: Vec<Condition>,
    order: Vec<SortField>,
    limit: i64,
    offset: i64,
}

impl Select {
    /// Select every column of `table`, first [`DEFAULT_LIMIT`] rows.
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
            conditions: Vec::new(),
            order: Vec::new(),
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }

    /// Single-row lookup by primary key.
    pub fn by_id(table: impl Into<String>, id_column: impl Into<String>, id: i64) -> Self {
        Self::table(table)
            .filter(id_column, Operator::Eq, Value::Int(id))
            .limit(1)
    }

    /// Set the columns to select. `*` selects everything.
    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(|s| (*s).to_string()).collect();
        self
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

    /// Add an ORDER BY column.
    pub fn order_by(mut self, column: impl Into<String>, dir: SortDir) -> Self {
        self.order.push(SortField::new(column, dir));
        self
    }

    /// Set the row limit. `0` means unlimited.
    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    /// Set the row offset (ignored when the limit is `0`).
    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }

    /// Remove the row limit.
    pub fn unlimited(self) -> Self {
        self.limit(0)
    }

    /// Table being queried.
    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.table
    }

    /// Build the SQL statement and its parameters.
    pub fn build<D: Dialect>(&self, dialect: &D) -> Result<QueryResult, BuildError> {
        check_identifier(&self.table, "table")?;
        if self.limit < 0 || self.offset < 0 {
            return Err(BuildError::argument(
                "limit and offset must be non-negative integers",
            ));
        }

        let select_str = if self.columns.is_empty() {
            "*".to_string()
        } else {
            let mut parts = Vec::with_capacity(self.columns.len());
            for column in &self.columns {
                if column == "*" {
                    parts.push("*".to_string());
                } else {
                    check_identifier(column, "column")?;
                    parts.push(dialect.quote(column));
                }
            }
            parts.join(", ")
        };

        let mut sql = format!("SELECT {select_str} FROM {}", dialect.quote(&self.table));
        let mut params = Vec::new();
        let mut param_idx = 1usize;

        // WHERE clause
        if !self.conditions.is_empty() {
            let (condition, new_params, new_idx) =
                build_conditions_impl(dialect, &self.conditions, param_idx)?;
            sql.push_str(" WHERE ");
            sql.push_str(&condition);
            params.extend(new_params);
            param_idx = new_idx;
        }

        // ORDER BY clause
        if !self.order.is_empty() {
            let mut sort_parts = Vec::with_capacity(self.order.len());
            for sort in &self.order {
                check_identifier(&sort.column, "order column")?;
                sort_parts.push(format!("{} {}", dialect.quote(&sort.column), sort.dir.as_sql()));
            }
            sql.push_str(" ORDER BY ");
            sql.push_str(&sort_parts.join(", "));
        }

        // LIMIT/OFFSET clause, bound like any other value
        if self.limit > 0 {
            sql.push_str(&format!(
                " LIMIT {} OFFSET {}",
                dialect.param(param_idx),
                dialect.param(param_idx + 1)
            ));
            params.push(Value::Int(self.limit));
            params.push(Value::Int(self.offset));
        }

        Ok(QueryResult { sql, params })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{MySql, Postgres, Sqlite};

    #[test]
    fn test_default_select() {
        let result = Select::table("users").build(&Sqlite).unwrap();
        assert_eq!(result.sql, r#"SELECT * FROM "users" LIMIT ?1 OFFSET ?2"#);
        assert_eq!(result.params, vec![Value::Int(10), Value::Int(0)]);
    }

    #[test]
    fn test_unlimited_omits_limit_and_offset() {
        let result = Select::table("users").unlimited().offset(20).build(&Sqlite).unwrap();
        assert_eq!(result.sql, r#"SELECT * FROM "users""#);
        assert!(result.params.is_empty());
    }

    #[test]
    fn test_negative_limit_rejected() {
        let err = Select::table("users").limit(-1).build(&Sqlite).unwrap_err();
        assert!(matches!(err, BuildError::InvalidArgument(_)));
    }

    #[test]
    fn test_negative_offset_rejected() {
        let err = Select::table("users").offset(-5).build(&Sqlite).unwrap_err();
        assert!(matches!(err, BuildError::InvalidArgument(_)));
    }

    #[test]
    fn test_invalid_table_rejected() {
        let err = Select::table("users u").build(&Sqlite).unwrap_err();
        assert!(matches!(err, BuildError::InvalidIdentifier { context: "table", .. }));
    }

    #[test]
    fn test_invalid_column_rejected() {
        let err = Select::table("users")
            .columns(&["user_id", "password FROM users --"])
            .build(&Sqlite)
            .unwrap_err();
        assert!(matches!(err, BuildError::InvalidIdentifier { context: "column", .. }));
    }

    #[test]
    fn test_invalid_order_column_rejected() {
        let err = Select::table("users")
            .order_by("user_id; DROP TABLE users", SortDir::Asc)
            .build(&Sqlite)
            .unwrap_err();
        assert!(matches!(err, BuildError::InvalidIdentifier { context: "order column", .. }));
    }

    #[test]
    fn test_wildcard_column() {
        let result = Select::table("users").columns(&["*"]).unlimited().build(&Sqlite).unwrap();
        assert_eq!(result.sql, r#"SELECT * FROM "users""#);
    }

    #[test]
    fn test_full_select_sqlite() {
        let result = Select::table("users")
            .columns(&["user_id", "username", "email"])
            .filter("group_id", Operator::Eq, 1i64)
            .filter("user_id", Operator::In, vec![3i64, 4])
            .order_by("registration_date", SortDir::Desc)
            .order_by("user_id", SortDir::Asc)
            .limit(5)
            .offset(10)
            .build(&Sqlite)
            .unwrap();

        insta::assert_snapshot!(
            result.sql,
            @r#"SELECT "user_id", "username", "email" FROM "users" WHERE "group_id" = ?1 AND "user_id" IN (?2, ?3) ORDER BY "registration_date" DESC, "user_id" ASC LIMIT ?4 OFFSET ?5"#
        );
        assert_eq!(
            result.params,
            vec![
                Value::Int(1),
                Value::Int(3),
                Value::Int(4),
                Value::Int(5),
                Value::Int(10)
            ]
        );
    }

    #[test]
    fn test_postgres_placeholders() {
        let result = Select::table("categories")
            .filter_eq("visibility", 1i64)
            .build(&Postgres)
            .unwrap();
        assert_eq!(
            result.sql,
            r#"SELECT * FROM "categories" WHERE "visibility" = $1 LIMIT $2 OFFSET $3"#
        );
    }

    #[test]
    fn test_mysql_quotes_reserved_words() {
        let result = Select::table("categories")
            .columns(&["id", "order"])
            .order_by("order", SortDir::Asc)
            .unlimited()
            .build(&MySql)
            .unwrap();
        assert_eq!(
            result.sql,
            "SELECT `id`, `order` FROM `categories` ORDER BY `order` ASC"
        );
    }

    #[test]
    fn test_by_id() {
        let result = Select::by_id("categories", "id", 7).build(&Sqlite).unwrap();
        assert_eq!(
            result.sql,
            r#"SELECT * FROM "categories" WHERE "id" = ?1 LIMIT ?2 OFFSET ?3"#
        );
        assert_eq!(result.params, vec![Value::Int(7), Value::Int(1), Value::Int(0)]);
    }
}
