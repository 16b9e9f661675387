//! Form validation.
//!
//! A [`Validator`] evaluates [`FieldRules`] against a submitted [`Record`]
//! and returns [`ValidationErrors`]: data, not an error. An empty result
//! means the submission is valid.
//!
//! | Rule | Fails when | Message |
//! |------|------------|---------|
//! | `required` | trimmed value is empty | `<Field> is required.` |
//! | `min:N` | fewer than N characters | `<Field> must be at least N characters.` |
//! | `max:N` | more than N characters | `<Field> must be at most N characters.` |
//! | `email` | non-empty and not `x@y.z` shaped | `Invalid email format.` |
//! | `password_strength` | non-empty and too short, or missing a character class | both messages may fire |
//! | custom | registered function returns a message | rule-defined |
//!
//! `<Field>` is the field name with its first character upper-cased.
//!
//! [`Record`]: shopkeep_sql::Record

mod errors;
mod rule;
mod validator;
mod violation;

pub use errors::{Submission, ValidationErrors};
pub use rule::{FieldRules, Rule, UniqueCheck};
pub use validator::{CustomRule, PASSWORD_MIN_LENGTH, Validator};
pub use violation::{Violation, field_label};
