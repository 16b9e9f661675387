//! Property-based tests for the validation rules using proptest.
//!
//! Length rules count characters, so the strategies mix ASCII and
//! multi-byte text.

use proptest::prelude::*;
use shopkeep::validation::{FieldRules, Rule, Validator, field_label};
use shopkeep_sql::Record;

fn check(rule: Rule, value: &str) -> Vec<String> {
    let rules = FieldRules::new().field("name", [rule]);
    Validator::new()
        .check(&Record::new().with("name", value), &rules)
        .unwrap()
        .messages("name")
}

fn text_of(len: usize) -> impl Strategy<Value = String> {
    proptest::collection::vec(prop_oneof![Just('a'), Just('Z'), Just('é'), Just('字')], len)
        .prop_map(|chars| chars.into_iter().collect())
}

// =============================================================================
// Length boundaries
// =============================================================================

proptest! {
    /// Exactly N characters passes both min:N and max:N
    #[test]
    fn boundary_passes(value in (1usize..40).prop_flat_map(text_of)) {
        let n = value.chars().count();
        prop_assert!(check(Rule::Min(n), &value).is_empty());
        prop_assert!(check(Rule::Max(n), &value).is_empty());
    }

    /// N-1 characters fails min:N with the length message
    #[test]
    fn one_short_fails_min(n in 2usize..40) {
        let value: String = "é".repeat(n - 1);
        prop_assert_eq!(
            check(Rule::Min(n), &value),
            vec![format!("Name must be at least {n} characters.")]
        );
    }

    /// N+1 characters fails max:N with the length message
    #[test]
    fn one_long_fails_max(n in 1usize..40) {
        let value: String = "字".repeat(n + 1);
        prop_assert_eq!(
            check(Rule::Max(n), &value),
            vec![format!("Name must be at most {n} characters.")]
        );
    }

    /// Surrounding whitespace never counts toward length
    #[test]
    fn whitespace_is_trimmed(n in 1usize..20, pad in 1usize..5) {
        let value = format!("{}{}{}", " ".repeat(pad), "a".repeat(n), "\t".repeat(pad));
        prop_assert!(check(Rule::Max(n), &value).is_empty());
    }
}

// =============================================================================
// Required and email
// =============================================================================

proptest! {
    /// Whitespace-only values are always "required" failures
    #[test]
    fn blank_is_required(value in "[ \t\n]{0,10}") {
        prop_assert_eq!(check(Rule::Required, &value), vec!["Name is required.".to_string()]);
    }

    /// Well-formed addresses pass the email rule
    #[test]
    fn simple_addresses_pass(
        user in "[a-z0-9._]{1,12}",
        host in "[a-z0-9-]{1,12}",
        tld in "[a-z]{2,6}"
    ) {
        let email = format!("{user}@{host}.{tld}");
        prop_assert!(check(Rule::Email, &email).is_empty(), "{}", email);
    }

    /// Anything without an '@' fails the email rule
    #[test]
    fn no_at_sign_fails(value in "[a-z0-9.]{1,20}") {
        prop_assert_eq!(check(Rule::Email, &value), vec!["Invalid email format.".to_string()]);
    }
}

// =============================================================================
// Password strength
// =============================================================================

proptest! {
    /// Upper + lower + digit with length >= 6 always passes
    #[test]
    fn strong_passwords_pass(
        upper in "[A-Z]{1,4}",
        lower in "[a-z]{1,4}",
        digits in "[0-9]{4}"
    ) {
        let password = format!("{upper}{lower}{digits}");
        prop_assert!(check(Rule::PasswordStrength, &password).is_empty());
    }

    /// Lower-case-only passwords of length >= 6 report only the diversity message
    #[test]
    fn lower_only_reports_diversity(password in "[a-z]{6,20}") {
        prop_assert_eq!(
            check(Rule::PasswordStrength, &password),
            vec!["Password must include upper, lower case letters and a number.".to_string()]
        );
    }

    /// Labels only change the first character
    #[test]
    fn label_keeps_tail(field in "[a-z][a-z_]{0,15}") {
        let label = field_label(&field);
        prop_assert_eq!(&label[1..], &field[1..]);
        prop_assert!(label.chars().next().is_some_and(char::is_uppercase));
    }
}
