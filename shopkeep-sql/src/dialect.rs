//! SQL dialect implementations for `SQLite`, Postgres and MySQL.
//!
//! A dialect only decides how placeholders and identifiers are spelled.
//! Identifiers reaching a dialect have already passed the allowlist, so
//! quoting never needs to escape anything.

/// SQL dialect trait for database-specific syntax.
pub trait Dialect: Clone + Copy {
    /// Short dialect name used in log lines.
    fn name(&self) -> &'static str;

    /// Format a parameter placeholder (e.g., `?1` for `SQLite`, `$1` for Postgres).
    ///
    /// `idx` is 1-based.
    fn param(&self, idx: usize) -> String;

    /// Quote an already-validated identifier.
    fn quote(&self, ident: &str) -> String;
}

/// `SQLite` dialect: `?N` placeholders, double-quoted identifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sqlite;

impl Dialect for Sqlite {
    #[inline]
    fn name(&self) -> &'static str {
        "sqlite"
    }

    #[inline]
    fn param(&self, idx: usize) -> String {
        format!("?{idx}")
    }

    #[inline]
    fn quote(&self, ident: &str) -> String {
        format!("\"{ident}\"")
    }
}

/// Postgres dialect: `$N` placeholders, double-quoted identifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Postgres;

impl Dialect for Postgres {
    #[inline]
    fn name(&self) -> &'static str {
        "postgres"
    }

    #[inline]
    fn param(&self, idx: usize) -> String {
        format!("${idx}")
    }

    #[inline]
    fn quote(&self, ident: &str) -> String {
        format!("\"{ident}\"")
    }
}

/// MySQL dialect: anonymous `?` placeholders, backtick-quoted identifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MySql;

impl Dialect for MySql {
    #[inline]
    fn name(&self) -> &'static str {
        "mysql"
    }

    #[inline]
    fn param(&self, _idx: usize) -> String {
        "?".to_string()
    }

    #[inline]
    fn quote(&self, ident: &str) -> String {
        format!("`{ident}`")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_params() {
        assert_eq!(Sqlite.param(1), "?1");
        assert_eq!(Sqlite.param(10), "?10");
    }

    #[test]
    fn test_postgres_params() {
        assert_eq!(Postgres.param(1), "$1");
        assert_eq!(Postgres.param(10), "$10");
    }

    #[test]
    fn test_mysql_params_are_positional() {
        assert_eq!(MySql.param(1), "?");
        assert_eq!(MySql.param(7), "?");
    }

    #[test]
    fn test_quoting() {
        assert_eq!(Sqlite.quote("order"), "\"order\"");
        assert_eq!(Postgres.quote("users"), "\"users\"");
        assert_eq!(MySql.quote("order"), "`order`");
    }

    #[test]
    fn test_names() {
        assert_eq!(Sqlite.name(), "sqlite");
        assert_eq!(Postgres.name(), "postgres");
        assert_eq!(MySql.name(), "mysql");
    }
}
