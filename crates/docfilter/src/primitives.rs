use thiserror::Error as ThisError;

///
/// PrimitiveError
///
/// Failure reported by a driver-side factory. The compiler treats the message
/// as opaque; it only decides whether the failure falls through a conversion
/// chain or surfaces as a collected error.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("{0}")]
pub struct PrimitiveError(String);

impl PrimitiveError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

///
/// SortDirection
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// The conventional numeric encoding: 1 ascending, -1 descending.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        match self {
            Self::Ascending => 1,
            Self::Descending => -1,
        }
    }
}

///
/// Primitives
///
/// The capability seam towards the database driver. The compiler never
/// constructs driver values itself; compiled regular expressions, object
/// identifiers and sort-key elements all come from these factories.
///

pub trait Primitives: Send + Sync {
    /// Driver value type that can sit inside a filter document.
    type Value;

    /// Driver sort-key element, one per sort token, order-preserving.
    type SortKey;

    fn regex(&self, pattern: &str, options: &str) -> Result<Self::Value, PrimitiveError>;

    fn object_id(&self, hex: &str) -> Result<Self::Value, PrimitiveError>;

    fn sort_key(&self, field: &str, direction: SortDirection)
    -> Result<Self::SortKey, PrimitiveError>;
}
