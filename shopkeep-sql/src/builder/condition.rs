//! Shared WHERE clause rendering.

use super::types::{Condition, Operator, Value};
use crate::BuildError;
use crate::dialect::Dialect;
use crate::validate::check_identifier;

/// Rendered WHERE fragment: SQL text, its parameters, and the next free
/// placeholder index.
pub(super) type Fragment = (String, Vec<Value>, usize);

/// Render a list of conditions joined with `AND`.
///
/// Returns an empty string (and no params) for an empty list so callers can
/// decide whether to emit `WHERE` at all.
pub(super) fn build_conditions_impl<D: Dialect>(
    dialect: &D,
    conditions: &[Condition],
    start_idx: usize,
) -> Result<Fragment, BuildError> {
    let mut idx = start_idx;
    let mut params = Vec::new();
    let mut parts = Vec::with_capacity(conditions.len());

    for condition in conditions {
        let (sql, new_params, new_idx) = build_condition_impl(dialect, condition, idx)?;
        parts.push(sql);
        params.extend(new_params);
        idx = new_idx;
    }

    Ok((parts.join(" AND "), params, idx))
}

/// Render a single condition.
pub(super) fn build_condition_impl<D: Dialect>(
    dialect: &D,
    condition: &Condition,
    start_idx: usize,
) -> Result<Fragment, BuildError> {
    check_identifier(&condition.column, "condition column")?;
    let column = dialect.quote(&condition.column);
    let idx = start_idx;

    match (condition.op, &condition.value) {
        // NULL handling
        (Operator::Eq, Value::Null) => Ok((format!("{column} IS NULL"), vec![], idx)),
        (Operator::Ne, Value::Null) => Ok((format!("{column} IS NOT NULL"), vec![], idx)),

        (Operator::In, Value::Array(values)) => {
            if values.is_empty() {
                return Err(BuildError::argument(format!(
                    "IN operator requires at least one value for {}",
                    condition.column
                )));
            }
            let placeholders: Vec<String> =
                (0..values.len()).map(|i| dialect.param(idx + i)).collect();
            let sql = format!("{column} IN ({})", placeholders.join(", "));
            Ok((sql, values.clone(), idx + values.len()))
        },
        (Operator::In, other) => Err(BuildError::argument(format!(
            "IN operator requires a list of values for {}, got {}",
            condition.column,
            other.kind()
        ))),
        (op, Value::Array(_)) => Err(BuildError::argument(format!(
            "operator {} does not accept a list of values for {}",
            op.as_sql(),
            condition.column
        ))),

        (op, value) => {
            let sql = format!("{column} {} {}", op.as_sql(), dialect.param(idx));
            Ok((sql, vec![value.clone()], idx + 1))
        },
    }
}
