//! Column/table identifier validation for SQL injection prevention.

use crate::BuildError;

/// Validate that a string is a safe SQL identifier.
///
/// A valid identifier is non-empty and contains only ASCII letters,
/// digits (0-9) and underscores, i.e. it matches `^[a-zA-Z0-9_]+$`.
///
/// This rejects every character that could end an identifier early:
/// quotes, backticks, whitespace, semicolons, comment markers, and any
/// non-ASCII character that might be confusable with one of them.
///
/// # Examples
///
/// ```
/// use shopkeep_sql::is_valid_identifier;
///
/// assert!(is_valid_identifier("users"));
/// assert!(is_valid_identifier("user_id"));
/// assert!(is_valid_identifier("_private"));
/// assert!(is_valid_identifier("2fa_codes"));
///
/// assert!(!is_valid_identifier(""));           // empty
/// assert!(!is_valid_identifier("user-name"));  // contains hyphen
/// assert!(!is_valid_identifier("user.id"));    // contains dot
/// assert!(!is_valid_identifier("user; DROP")); // contains special chars
/// ```
#[inline]
#[must_use]
pub fn is_valid_identifier(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// Check an identifier, returning [`BuildError::InvalidIdentifier`] on failure.
///
/// `context` names the role of the identifier in the statement and ends up
/// in the error message.
///
/// # Examples
///
/// ```
/// use shopkeep_sql::check_identifier;
///
/// assert!(check_identifier("users", "table").is_ok());
/// assert!(check_identifier("users`", "table").is_err());
/// ```
#[inline]
pub fn check_identifier(s: &str, context: &'static str) -> Result<(), BuildError> {
    if is_valid_identifier(s) {
        Ok(())
    } else {
        Err(BuildError::identifier(context, s))
    }
}
