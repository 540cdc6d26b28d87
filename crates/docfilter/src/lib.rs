//! Compile flat URL query parameters into a document-database query: a filter
//! document, ordered sort keys, and limit/skip pagination. Driver primitives
//! (compiled regexes, object ids, sort-key elements) come from a
//! caller-supplied [`Primitives`] implementation; the compiler itself is pure
//! and synchronous.
#![warn(unreachable_pub)]

pub mod convert;
pub mod error;
pub mod fields;
pub mod filter;
pub mod operator;
pub mod parser;
pub mod primitives;
pub mod query;

mod extract;

pub use convert::{Convert, TypeConverter};
pub use error::{ConvertError, Error, Errors};
pub use fields::{Field, Fields};
pub use filter::{FieldEntry, Filter, Value};
pub use operator::{Operator, ParseOperatorError, Symbol};
pub use parser::Parser;
pub use primitives::{PrimitiveError, Primitives, SortDirection};
pub use query::Query;
