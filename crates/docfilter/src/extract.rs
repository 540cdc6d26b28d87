use crate::{
    error::{Error, Errors},
    operator::Operator,
};
use std::collections::BTreeMap;

/// Separator between a field name and its operator suffix.
pub(crate) const DELIMITER: &str = "__";

/// Comma-joined list separator inside a single value.
pub(crate) const ARRAY_DELIMITER: char = ',';

const ARRAY_SUFFIX: &str = "[]";

/// Raw values grouped per canonical operator, encounter order preserved.
pub(crate) type OperatorValues = BTreeMap<Operator, Vec<String>>;

/// Per-field operator groups, keyed by dotted field path.
pub(crate) type FieldValues = BTreeMap<String, OperatorValues>;

/// Splits a raw query key into a dotted field path and its operator.
///
/// The operator suffix starts at the first `__`; a suffix-free key ending in
/// `[]` is the bracket-in spelling, anything else is bare equality. Bracket
/// paths (`a[b][c]`) rewrite to dotted paths (`a.b.c`).
pub(crate) fn parse_key(key: &str) -> Result<(String, Operator), Error> {
    let (field, op) = match key.split_once(DELIMITER) {
        Some((field, suffix)) => {
            let op = suffix
                .parse::<Operator>()
                .map_err(|_| Error::UnknownOperator {
                    operator: suffix.to_string(),
                })?;

            (field, op)
        }
        None => match key.strip_suffix(ARRAY_SUFFIX) {
            Some(field) => (field, Operator::InArray),
            None => (key, Operator::Eq),
        },
    };

    Ok((dotted_path(field), op))
}

fn dotted_path(field: &str) -> String {
    field.replace('[', ".").replace(']', "")
}

/// Extracts filter groups from the grouped raw parameters, skipping
/// `__`-prefixed directives. Unknown operator suffixes are collected and the
/// offending key skipped.
pub(crate) fn extract(
    params: &BTreeMap<String, Vec<String>>,
    errors: &mut Errors,
) -> FieldValues {
    let mut raw = FieldValues::new();

    for (key, values) in params {
        if key.starts_with(DELIMITER) {
            continue;
        }

        match parse_key(key) {
            Ok((field, op)) => raw
                .entry(field)
                .or_default()
                .entry(op)
                .or_default()
                .extend(values.iter().cloned()),
            Err(error) => errors.push(error),
        }
    }

    normalize(raw)
}

/// Canonicalizes each per-field group: merge bracket and word spellings,
/// comma-split a lone value when the raw spelling calls for it, and downgrade
/// multi-value groups left holding a single operand.
fn normalize(raw: FieldValues) -> FieldValues {
    let mut normalized = FieldValues::new();

    for (field, operators) in raw {
        let mut merged = OperatorValues::new();

        for (op, values) in operators {
            let values = if values.len() == 1 && op.needs_split() {
                values[0]
                    .split(ARRAY_DELIMITER)
                    .map(str::to_string)
                    .collect()
            } else {
                values
            };

            merged.entry(op.canonical()).or_default().extend(values);
        }

        let downgrades: Vec<Operator> = merged
            .iter()
            .filter(|(op, values)| values.len() == 1 && op.single_value() != **op)
            .map(|(op, _)| *op)
            .collect();

        for op in downgrades {
            if let Some(values) = merged.remove(&op) {
                merged.entry(op.single_value()).or_default().extend(values);
            }
        }

        normalized.insert(field, merged);
    }

    normalized
}

///
/// TESTS
///
