use crate::{operator::Operator, primitives::PrimitiveError};
use derive_more::{Deref, DerefMut, IntoIterator};
use std::fmt;
use thiserror::Error as ThisError;

///
/// ConvertError
///
/// Failures local to turning one raw string (or value list) into a typed
/// filter value.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ConvertError {
    #[error("no value converter configured")]
    NoConverter,

    #[error("no converter matched value: {value}")]
    NoMatch { value: String },

    #[error("too many values for a single-value operator: {count}")]
    TooManyValues { count: usize },

    #[error(transparent)]
    Primitive(#[from] PrimitiveError),
}

impl ConvertError {
    pub(crate) fn no_match(value: impl Into<String>) -> Self {
        Self::NoMatch {
            value: value.into(),
        }
    }
}

///
/// Error
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum Error {
    #[error("unknown operator: {operator}")]
    UnknownOperator { operator: String },

    #[error("no field spec: {field}")]
    NoFieldSpec { field: String },

    #[error("filter on field {field}[{operator}]: {source}")]
    Convert {
        field: String,
        operator: Operator,
        source: ConvertError,
    },

    #[error("missing required field: {field}")]
    MissingField { field: String },

    #[error("no sort field spec: {field}")]
    NoSortField { field: String },

    #[error("{name} parameter: {message}")]
    Directive { name: &'static str, message: String },
}

impl Error {
    /// True when the underlying cause is the given conversion failure kind.
    #[must_use]
    pub const fn is_convert(&self) -> bool {
        matches!(self, Self::Convert { .. })
    }
}

///
/// Errors
///
/// Everything that went wrong during one parse, in encounter order. Parsing
/// never aborts on the first problem; the caller sees the complete list.
///

#[derive(Clone, Debug, Default, Deref, DerefMut, Eq, IntoIterator, PartialEq)]
pub struct Errors(Vec<Error>);

impl Errors {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, error: Error) {
        self.0.push(error);
    }

    /// `Ok(value)` when no errors were collected, `Err(self)` otherwise.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.0.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl fmt::Display for Errors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{error}")?;
        }

        Ok(())
    }
}

impl std::error::Error for Errors {}

///
/// TESTS
///
