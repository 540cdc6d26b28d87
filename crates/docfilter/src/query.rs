use crate::{filter::Filter, primitives::SortDirection};

///
/// Query
///
/// The compiled output: filter document, ordered sort keys, and pagination.
/// Zero limit/skip means unspecified; the caller passes them through.
///

#[derive(Clone, Debug, PartialEq)]
pub struct Query<V, S> {
    pub filter: Filter<V>,
    pub sort: Vec<S>,
    pub limit: i64,
    pub skip: i64,
}

impl<V, S> Default for Query<V, S> {
    fn default() -> Self {
        Self {
            filter: Filter::new(),
            sort: Vec::new(),
            limit: 0,
            skip: 0,
        }
    }
}

/// Splits one sort token into field and direction: an optional `+` prefix is
/// cosmetic, a `-` prefix selects descending.
pub(crate) fn parse_sort_token(token: &str) -> (&str, SortDirection) {
    let token = token.strip_prefix('+').unwrap_or(token);

    match token.strip_prefix('-') {
        Some(field) => (field, SortDirection::Descending),
        None => (token, SortDirection::Ascending),
    }
}

///
/// TESTS
///
