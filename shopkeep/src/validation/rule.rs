//! Rule declarations: what to check on which field.

use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// A check applied to one field value.
///
/// Parses from the compact `name[:param]` notation used in form
/// declarations:
///
/// ```
/// use shopkeep::validation::Rule;
///
/// assert_eq!("min:4".parse::<Rule>().unwrap(), Rule::Min(4));
/// assert_eq!("email".parse::<Rule>().unwrap(), Rule::Email);
/// assert_eq!("numeric".parse::<Rule>().unwrap(), Rule::Custom("numeric".into()));
/// assert!("max:ten".parse::<Rule>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Rule {
    /// Value must not be empty.
    Required,
    /// At least this many characters.
    Min(usize),
    /// At most this many characters.
    Max(usize),
    /// Non-empty values must look like an email address.
    Email,
    /// Non-empty values need six characters, an upper-case letter, a
    /// lower-case letter and a digit.
    PasswordStrength,
    /// A rule registered on the [`Validator`](super::Validator) by name.
    Custom(String),
}

impl Rule {
    /// Custom rule by name.
    pub fn custom(name: impl Into<String>) -> Self {
        Self::Custom(name.into())
    }

    /// Name of the rule in `name[:param]` notation.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Required => "required",
            Self::Min(_) => "min",
            Self::Max(_) => "max",
            Self::Email => "email",
            Self::PasswordStrength => "password_strength",
            Self::Custom(name) => name,
        }
    }
}

fn length_param(rule: &str, param: Option<&str>) -> Result<usize> {
    let param = param.ok_or_else(|| Error::InvalidRule(format!("'{rule}' needs a length")))?;
    param
        .trim()
        .parse()
        .map_err(|_| Error::InvalidRule(format!("'{rule}:{param}' has a bad length")))
}

impl FromStr for Rule {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (name, param) = match s.split_once(':') {
            Some((name, param)) => (name.trim(), Some(param)),
            None => (s, None),
        };

        let rule = match name {
            "required" => Self::Required,
            "min" => Self::Min(length_param(name, param)?),
            "max" => Self::Max(length_param(name, param)?),
            "email" => Self::Email,
            "password_strength" => Self::PasswordStrength,
            "" => return Err(Error::InvalidRule("empty rule name".into())),
            other => Self::Custom(other.to_string()),
        };

        if param.is_some() && !matches!(rule, Self::Min(_) | Self::Max(_)) {
            return Err(Error::InvalidRule(format!("'{name}' takes no parameter")));
        }
        Ok(rule)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Min(n) => write!(f, "min:{n}"),
            Self::Max(n) => write!(f, "max:{n}"),
            other => f.write_str(other.name()),
        }
    }
}

/// Ordered field → rules declaration.
///
/// ```
/// use shopkeep::validation::{FieldRules, Rule};
///
/// let rules = FieldRules::new()
///     .field("username", [Rule::Required, Rule::Min(4), Rule::Max(20)])
///     .parse_field("email", &["required", "email"])
///     .unwrap();
/// assert_eq!(rules.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldRules {
    fields: Vec<(String, Vec<Rule>)>,
}

impl FieldRules {
    /// No rules.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append rules for `field`. Declaring a field twice extends its list.
    #[must_use]
    pub fn field(mut self, field: impl Into<String>, rules: impl IntoIterator<Item = Rule>) -> Self {
        let field = field.into();
        match self.fields.iter_mut().find(|(f, _)| *f == field) {
            Some((_, list)) => list.extend(rules),
            None => self.fields.push((field, rules.into_iter().collect())),
        }
        self
    }

    /// Like [`field`](Self::field), from `name[:param]` strings.
    pub fn parse_field(self, field: impl Into<String>, rules: &[&str]) -> Result<Self> {
        let parsed = rules
            .iter()
            .map(|r| r.parse::<Rule>())
            .collect::<Result<Vec<_>>>()?;
        Ok(self.field(field, parsed))
    }

    /// Iterate over `(field, rules)` in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Rule])> {
        self.fields.iter().map(|(f, r)| (f.as_str(), r.as_slice()))
    }

    /// Rules declared for `field`.
    #[must_use]
    pub fn get(&self, field: &str) -> &[Rule] {
        self.fields
            .iter()
            .find(|(f, _)| f == field)
            .map_or(&[], |(_, r)| r.as_slice())
    }

    /// Number of fields with rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no field has rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Uniqueness requirement for one field: no other row of `table` may hold
/// the submitted value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueCheck {
    /// Field (and column) to check.
    pub field: String,
    /// Table to search.
    pub table: String,
    /// Key column used for the exclusion.
    pub id_column: String,
    /// Row allowed to hold the value already, typically the one being edited.
    pub exclude_id: Option<i64>,
}

impl UniqueCheck {
    /// Check `field` against `table`, excluding nothing.
    pub fn new(
        field: impl Into<String>,
        table: impl Into<String>,
        id_column: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            table: table.into(),
            id_column: id_column.into(),
            exclude_id: None,
        }
    }

    /// Ignore the row with this key.
    #[must_use]
    pub const fn excluding(mut self, id: Option<i64>) -> Self {
        self.exclude_id = id;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rules() {
        assert_eq!("required".parse::<Rule>().unwrap(), Rule::Required);
        assert_eq!(" max:20 ".parse::<Rule>().unwrap(), Rule::Max(20));
        assert_eq!(
            "password_strength".parse::<Rule>().unwrap(),
            Rule::PasswordStrength
        );
        assert_eq!("slug".parse::<Rule>().unwrap(), Rule::custom("slug"));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(matches!("min".parse::<Rule>(), Err(Error::InvalidRule(_))));
        assert!(matches!("min:-1".parse::<Rule>(), Err(Error::InvalidRule(_))));
        assert!(matches!("email:x".parse::<Rule>(), Err(Error::InvalidRule(_))));
        assert!(matches!("".parse::<Rule>(), Err(Error::InvalidRule(_))));
    }

    #[test]
    fn test_display_round_trips() {
        for rule in [
            Rule::Required,
            Rule::Min(2),
            Rule::Max(100),
            Rule::Email,
            Rule::PasswordStrength,
            Rule::custom("numeric"),
        ] {
            assert_eq!(rule.to_string().parse::<Rule>().unwrap(), rule);
        }
    }

    #[test]
    fn test_field_rules_keep_order_and_extend() {
        let rules = FieldRules::new()
            .field("name", [Rule::Required])
            .field("description", [Rule::Max(1000)])
            .field("name", [Rule::Min(2)]);

        let fields: Vec<_> = rules.iter().map(|(f, _)| f).collect();
        assert_eq!(fields, vec!["name", "description"]);
        assert_eq!(rules.get("name"), &[Rule::Required, Rule::Min(2)]);
        assert!(rules.get("order").is_empty());
    }

    #[test]
    fn test_parse_field_propagates_errors() {
        let err = FieldRules::new().parse_field("name", &["required", "min:x"]);
        assert!(err.is_err());
    }

    #[test]
    fn test_unique_check_builder() {
        let check = UniqueCheck::new("email", "users", "user_id").excluding(Some(7));
        assert_eq!(check.exclude_id, Some(7));
        assert_eq!(UniqueCheck::new("email", "users", "user_id").exclude_id, None);
    }
}
