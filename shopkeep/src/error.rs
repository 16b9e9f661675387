//! Crate-wide error type.

use std::path::PathBuf;

use shopkeep_sql::BuildError;

/// Result alias used across the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised by data access, validation setup and configuration.
///
/// Validation failures are not errors: they come back as
/// [`ValidationErrors`](crate::validation::ValidationErrors) data.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A statement could not be built (invalid identifier or argument).
    /// Nothing was sent to the database.
    #[error(transparent)]
    Build(#[from] BuildError),

    /// The database rejected a statement or the connection failed.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A rule list names a custom rule that was never registered.
    #[error("unknown validation rule '{0}'")]
    UnknownRule(String),

    /// A rule string such as `min:abc` could not be parsed.
    #[error("invalid validation rule '{0}'")]
    InvalidRule(String),

    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The configuration file or an override is malformed.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A stored password hash is not in `salt$digest` form.
    #[error("malformed password hash")]
    PasswordHash,

    /// A fetched row lacks a column or holds an out-of-range value.
    #[error("malformed {table} row: {detail}")]
    MalformedRow {
        /// Table the row came from.
        table: &'static str,
        /// What was wrong.
        detail: String,
    },
}

impl Error {
    /// Create an [`Error::Config`] error.
    #[inline]
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an [`Error::MalformedRow`] error.
    #[must_use]
    pub fn malformed_row(table: &'static str, detail: impl Into<String>) -> Self {
        Self::MalformedRow {
            table,
            detail: detail.into(),
        }
    }

    /// Whether the error was raised before any statement reached the database.
    #[must_use]
    pub const fn is_build(&self) -> bool {
        matches!(self, Self::Build(_))
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}
