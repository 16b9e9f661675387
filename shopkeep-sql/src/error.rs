//! Errors raised while turning a statement description into SQL.

/// Error returned when a statement cannot be built.
///
/// Both variants abort before any SQL reaches the database: an invalid
/// identifier is never escaped or repaired, and a malformed call is never
/// guessed at.
///
/// # Example
///
/// ```
/// use shopkeep_sql::{BuildError, Select, Sqlite};
///
/// let err = Select::table("users; DROP TABLE users").build(&Sqlite).unwrap_err();
/// assert!(matches!(err, BuildError::InvalidIdentifier { .. }));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum BuildError {
    /// A table or column name failed the identifier allowlist.
    #[error("invalid SQL {context} name '{name}': only ASCII letters, digits and '_' are allowed")]
    InvalidIdentifier {
        /// Where the name was used (e.g. "table", "order column").
        context: &'static str,
        /// The rejected name.
        name: String,
    },

    /// The call itself is malformed (negative limit, empty payload, wrong
    /// condition shape, unsupported aggregate target).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl BuildError {
    /// Create an [`BuildError::InvalidIdentifier`] error.
    #[inline]
    #[must_use]
    pub fn identifier(context: &'static str, name: &str) -> Self {
        Self::InvalidIdentifier {
            context,
            name: name.to_string(),
        }
    }

    /// Create an [`BuildError::InvalidArgument`] error.
    #[inline]
    #[must_use]
    pub fn argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}
