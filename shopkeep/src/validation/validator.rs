//! Rule evaluation and uniqueness checks.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use shopkeep_sql::{Aggregate, Operator, Record, Value};

use super::violation::field_label;
use super::{FieldRules, Rule, UniqueCheck, ValidationErrors, Violation};
use crate::db::Database;
use crate::records;
use crate::{Error, Result};

/// Minimum password length enforced by [`Rule::PasswordStrength`].
pub const PASSWORD_MIN_LENGTH: usize = 6;

#[allow(clippy::expect_used)] // literal pattern
static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"));

#[allow(clippy::expect_used)] // literal pattern
static NUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?[0-9]+$").expect("numeric pattern"));

/// Signature of a custom rule: `(field, trimmed value)` to an optional
/// failure message.
pub type CustomRule = dyn Fn(&str, &str) -> Option<String> + Send + Sync;

/// Evaluates [`FieldRules`] against submitted data.
///
/// Custom rules live in an explicit registry. A [`Rule::Custom`] naming
/// a rule that was never registered fails the whole call with
/// [`Error::UnknownRule`] before any rule runs.
///
/// ```
/// use shopkeep::validation::{FieldRules, Rule, Validator};
/// use shopkeep_sql::Record;
///
/// let mut validator = Validator::new();
/// validator.register("no_spaces", |field, value| {
///     value.contains(' ').then(|| format!("{field} cannot contain spaces."))
/// });
///
/// let rules = FieldRules::new().field("username", [Rule::Min(4), Rule::custom("no_spaces")]);
/// let data = Record::new().with("username", "a b");
/// let errors = validator.check(&data, &rules).unwrap();
/// assert_eq!(errors.get("username").len(), 2);
/// ```
pub struct Validator {
    custom: BTreeMap<String, Box<CustomRule>>,
}

impl Validator {
    /// Validator with the built-in `numeric` rule registered.
    #[must_use]
    pub fn new() -> Self {
        let mut validator = Self::empty();
        validator.register("numeric", |field, value| {
            (!value.is_empty() && !NUMERIC.is_match(value))
                .then(|| format!("{} must be a number.", field_label(field)))
        });
        validator
    }

    /// Validator with no custom rules at all.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            custom: BTreeMap::new(),
        }
    }

    /// Register (or replace) a custom rule.
    pub fn register<F>(&mut self, name: impl Into<String>, rule: F) -> &mut Self
    where
        F: Fn(&str, &str) -> Option<String> + Send + Sync + 'static,
    {
        self.custom.insert(name.into(), Box::new(rule));
        self
    }

    /// Whether a custom rule with this name is registered.
    #[must_use]
    pub fn has_rule(&self, name: &str) -> bool {
        self.custom.contains_key(name)
    }

    /// Run every rule of every field.
    ///
    /// Values are trimmed first and a missing field counts as empty. Rules
    /// never short-circuit: each failing rule adds its own violation.
    pub fn check(&self, data: &Record, rules: &FieldRules) -> Result<ValidationErrors> {
        self.ensure_registered(rules)?;

        let mut errors = ValidationErrors::new();
        for (field, field_rules) in rules.iter() {
            let value = field_value(data, field);
            for rule in field_rules {
                self.apply(rule, field, &value, &mut errors);
            }
        }
        Ok(errors)
    }

    /// [`check`](Self::check) plus uniqueness lookups.
    ///
    /// Uniqueness runs even when the field already failed other rules, and
    /// is skipped for empty values. Field and table names pass the
    /// identifier allowlist like any other statement.
    pub fn validate<D: Database>(
        &self,
        db: &D,
        data: &Record,
        rules: &FieldRules,
        unique: &[UniqueCheck],
    ) -> Result<ValidationErrors> {
        let mut errors = self.check(data, rules)?;

        for check in unique {
            let value = field_value(data, &check.field);
            if value.is_empty() {
                continue;
            }
            if is_taken(db, check, value)? {
                errors.push(Violation::unique(&check.field));
            }
        }

        if !errors.is_empty() {
            crate::log!(debug, "validation failed", violations: errors.len());
        }
        Ok(errors)
    }

    fn ensure_registered(&self, rules: &FieldRules) -> Result<()> {
        for (_, field_rules) in rules.iter() {
            for rule in field_rules {
                if let Rule::Custom(name) = rule
                    && !self.has_rule(name)
                {
                    crate::log!(error, "unknown validation rule", rule: name);
                    return Err(Error::UnknownRule(name.clone()));
                }
            }
        }
        Ok(())
    }

    fn apply(&self, rule: &Rule, field: &str, value: &str, errors: &mut ValidationErrors) {
        match rule {
            Rule::Required => {
                if value.is_empty() {
                    errors.push(Violation::required(field));
                }
            },
            Rule::Min(min) => {
                if value.chars().count() < *min {
                    errors.push(Violation::min(field, *min));
                }
            },
            Rule::Max(max) => {
                if value.chars().count() > *max {
                    errors.push(Violation::max(field, *max));
                }
            },
            Rule::Email => {
                if !value.is_empty() && !EMAIL.is_match(value) {
                    errors.push(Violation::email(field));
                }
            },
            Rule::PasswordStrength => errors.extend(password_strength(field, value)),
            Rule::Custom(name) => {
                if let Some(message) = self.custom.get(name).and_then(|f| f(field, value)) {
                    errors.push(Violation::custom(field, name, message));
                }
            },
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("custom", &self.custom.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Trimmed text of a field. Missing and `NULL` are empty.
fn field_value(data: &Record, field: &str) -> String {
    match data.get(field) {
        None | Some(Value::Null) => String::new(),
        Some(value) => value.to_string().trim().to_string(),
    }
}

/// Both messages may fire for the same value.
fn password_strength(field: &str, value: &str) -> Vec<Violation> {
    let mut violations = Vec::new();
    if value.is_empty() {
        return violations;
    }
    if value.chars().count() < PASSWORD_MIN_LENGTH {
        violations.push(Violation::password_length(field));
    }
    let upper = value.chars().any(|c| c.is_ascii_uppercase());
    let lower = value.chars().any(|c| c.is_ascii_lowercase());
    let digit = value.chars().any(|c| c.is_ascii_digit());
    if !(upper && lower && digit) {
        violations.push(Violation::password_characters(field));
    }
    violations
}

fn is_taken<D: Database>(db: &D, check: &UniqueCheck, value: String) -> Result<bool> {
    let mut count = Aggregate::count(check.table.as_str()).filter_eq(check.field.as_str(), value);
    if let Some(id) = check.exclude_id {
        count = count.filter(check.id_column.as_str(), Operator::Ne, id);
    }
    let taken = records::aggregate(db, &count)?
        .and_then(|v| v.as_int())
        .unwrap_or(0);
    Ok(taken > 0)
}
