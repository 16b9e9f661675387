//! Per-field validation results.

use std::fmt;

use super::Violation;

/// Ordered field → violations map. Empty means the data is valid.
///
/// Fields appear in the order their first violation was recorded, and each
/// field keeps its violations in the order the rules ran.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: Vec<(String, Vec<Violation>)>,
}

impl ValidationErrors {
    /// No errors.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a violation under its field.
    pub fn push(&mut self, violation: Violation) {
        match self
            .fields
            .iter_mut()
            .find(|(f, _)| f == violation.field())
        {
            Some((_, list)) => list.push(violation),
            None => self
                .fields
                .push((violation.field().to_string(), vec![violation])),
        }
    }

    /// Append every violation of `other`.
    pub fn merge(&mut self, other: Self) {
        for (_, list) in other.fields {
            for violation in list {
                self.push(violation);
            }
        }
    }

    /// Whether there are no violations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Total number of violations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.iter().map(|(_, list)| list.len()).sum()
    }

    /// Whether `field` has any violation.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        !self.get(field).is_empty()
    }

    /// Violations recorded for `field`.
    #[must_use]
    pub fn get(&self, field: &str) -> &[Violation] {
        self.fields
            .iter()
            .find(|(f, _)| f == field)
            .map_or(&[], |(_, list)| list.as_slice())
    }

    /// Messages recorded for `field`.
    #[must_use]
    pub fn messages(&self, field: &str) -> Vec<String> {
        self.get(field).iter().map(Violation::message).collect()
    }

    /// Fields with violations, in order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(f, _)| f.as_str())
    }

    /// Iterate over `(field, violations)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Violation])> {
        self.fields.iter().map(|(f, list)| (f.as_str(), list.as_slice()))
    }

    /// Every message, field by field.
    #[must_use]
    pub fn all_messages(&self) -> Vec<String> {
        self.fields
            .iter()
            .flat_map(|(_, list)| list.iter().map(Violation::message))
            .collect()
    }
}

/// Result of submitting a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission<T> {
    /// Validation passed and the write ran.
    Saved(T),
    /// Validation failed; nothing was written.
    Rejected(ValidationErrors),
}

impl<T> Submission<T> {
    /// Whether the write ran.
    #[must_use]
    pub const fn is_saved(&self) -> bool {
        matches!(self, Self::Saved(_))
    }

    /// Violations of a rejected submission.
    #[must_use]
    pub const fn errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Saved(_) => None,
            Self::Rejected(errors) => Some(errors),
        }
    }

    /// Value of a saved submission.
    pub fn saved(self) -> Option<T> {
        match self {
            Self::Saved(value) => Some(value),
            Self::Rejected(_) => None,
        }
    }
}

impl Extend<Violation> for ValidationErrors {
    fn extend<I: IntoIterator<Item = Violation>>(&mut self, iter: I) {
        for violation in iter {
            self.push(violation);
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, message) in self.all_messages().iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            f.write_str(message)?;
        }
        Ok(())
    }
}
