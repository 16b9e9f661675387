//! A single failed check on a form field.

use std::fmt;

/// One failed rule on one field.
///
/// `Display` renders the form message shown to the user.
///
/// ```
/// use shopkeep::validation::Violation;
///
/// assert_eq!(Violation::required("username").to_string(), "Username is required.");
/// assert_eq!(
///     Violation::min("username", 4).to_string(),
///     "Username must be at least 4 characters."
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Violation {
    /// Value is empty after trimming.
    Required {
        /// The name of the field
        field: String,
    },

    /// Value is shorter than `min` characters.
    Min {
        /// The name of the field
        field: String,
        /// The minimum length
        min: usize,
    },

    /// Value is longer than `max` characters.
    Max {
        /// The name of the field
        field: String,
        /// The maximum length
        max: usize,
    },

    /// Value is not an email address.
    Email {
        /// The name of the field
        field: String,
    },

    /// Password is shorter than six characters.
    PasswordLength {
        /// The name of the field
        field: String,
    },

    /// Password lacks an upper-case letter, a lower-case letter or a digit.
    PasswordCharacters {
        /// The name of the field
        field: String,
    },

    /// Another row already holds the value.
    Unique {
        /// The name of the field
        field: String,
    },

    /// A custom rule or service-level check failed.
    Custom {
        /// The name of the field
        field: String,
        /// The rule that failed
        rule: String,
        /// Message to show
        message: String,
    },
}

impl Violation {
    /// Create a required violation.
    #[inline]
    #[must_use]
    pub fn required(field: &str) -> Self {
        Self::Required {
            field: field.to_string(),
        }
    }

    /// Create a minimum-length violation.
    #[inline]
    #[must_use]
    pub fn min(field: &str, min: usize) -> Self {
        Self::Min {
            field: field.to_string(),
            min,
        }
    }

    /// Create a maximum-length violation.
    #[inline]
    #[must_use]
    pub fn max(field: &str, max: usize) -> Self {
        Self::Max {
            field: field.to_string(),
            max,
        }
    }

    /// Create an email format violation.
    #[inline]
    #[must_use]
    pub fn email(field: &str) -> Self {
        Self::Email {
            field: field.to_string(),
        }
    }

    /// Create a password length violation.
    #[inline]
    #[must_use]
    pub fn password_length(field: &str) -> Self {
        Self::PasswordLength {
            field: field.to_string(),
        }
    }

    /// Create a password character-class violation.
    #[inline]
    #[must_use]
    pub fn password_characters(field: &str) -> Self {
        Self::PasswordCharacters {
            field: field.to_string(),
        }
    }

    /// Create a uniqueness violation.
    #[inline]
    #[must_use]
    pub fn unique(field: &str) -> Self {
        Self::Unique {
            field: field.to_string(),
        }
    }

    /// Create a custom violation with its own message.
    #[inline]
    #[must_use]
    pub fn custom(field: &str, rule: &str, message: impl Into<String>) -> Self {
        Self::Custom {
            field: field.to_string(),
            rule: rule.to_string(),
            message: message.into(),
        }
    }

    /// Get the field name associated with this violation.
    #[inline]
    #[must_use]
    pub fn field(&self) -> &str {
        match self {
            Self::Required { field }
            | Self::Min { field, .. }
            | Self::Max { field, .. }
            | Self::Email { field }
            | Self::PasswordLength { field }
            | Self::PasswordCharacters { field }
            | Self::Unique { field }
            | Self::Custom { field, .. } => field,
        }
    }

    /// Get the rule name for this violation.
    #[inline]
    #[must_use]
    pub fn rule(&self) -> &str {
        match self {
            Self::Required { .. } => "required",
            Self::Min { .. } => "min",
            Self::Max { .. } => "max",
            Self::Email { .. } => "email",
            Self::PasswordLength { .. } | Self::PasswordCharacters { .. } => "password_strength",
            Self::Unique { .. } => "unique",
            Self::Custom { rule, .. } => rule,
        }
    }

    /// Get the form message.
    #[inline]
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }
}

/// Field label as shown in messages: the name with its first character
/// upper-cased (`full_name` becomes `Full_name`).
#[must_use]
pub fn field_label(field: &str) -> String {
    let mut chars = field.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required { field } => write!(f, "{} is required.", field_label(field)),
            Self::Min { field, min } => {
                write!(f, "{} must be at least {min} characters.", field_label(field))
            },
            Self::Max { field, max } => {
                write!(f, "{} must be at most {max} characters.", field_label(field))
            },
            Self::Email { .. } => f.write_str("Invalid email format."),
            Self::PasswordLength { .. } => f.write_str("Password must be at least 6 characters."),
            Self::PasswordCharacters { .. } => {
                f.write_str("Password must include upper, lower case letters and a number.")
            },
            Self::Unique { field } => write!(f, "{} already in use.", field_label(field)),
            Self::Custom { message, .. } => f.write_str(message),
        }
    }
}
