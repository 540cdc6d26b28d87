use crate::{
    error::ConvertError,
    filter::Value,
    operator::Operator,
    primitives::Primitives,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use std::sync::Arc;

///
/// Convert
///
/// Turns one raw parameter string into a typed filter value. Blanket-implemented
/// for closures so converters compose as plain functions.
///

pub trait Convert<V>: Send + Sync {
    fn convert(&self, raw: &str) -> Result<Value<V>, ConvertError>;
}

impl<V, F> Convert<V> for F
where
    F: Fn(&str) -> Result<Value<V>, ConvertError> + Send + Sync,
{
    fn convert(&self, raw: &str) -> Result<Value<V>, ConvertError> {
        self(raw)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Built-in converters
// ─────────────────────────────────────────────────────────────────────────────

/// `true`/`yes` and `false`/`no`, ASCII case-insensitive.
pub fn boolean<V>(raw: &str) -> Result<Value<V>, ConvertError> {
    if raw.eq_ignore_ascii_case("true") || raw.eq_ignore_ascii_case("yes") {
        return Ok(Value::Bool(true));
    }
    if raw.eq_ignore_ascii_case("false") || raw.eq_ignore_ascii_case("no") {
        return Ok(Value::Bool(false));
    }

    Err(ConvertError::no_match(raw))
}

pub fn integer<V>(raw: &str) -> Result<Value<V>, ConvertError> {
    raw.parse::<i64>()
        .map(Value::Int)
        .map_err(|_| ConvertError::no_match(raw))
}

pub fn double<V>(raw: &str) -> Result<Value<V>, ConvertError> {
    raw.parse::<f64>()
        .map(Value::Double)
        .map_err(|_| ConvertError::no_match(raw))
}

const DATE_LAYOUT: &str = "%Y-%m-%d";
const UTC_LAYOUT: &str = "%Y-%m-%dT%H:%M:%SZ";
const OFFSET_LAYOUT: &str = "%Y-%m-%dT%H:%M:%SZ%z";
const FRACTIONAL_LAYOUT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";
const FRACTIONAL_OFFSET_LAYOUT: &str = "%Y-%m-%dT%H:%M:%S%.fZ%z";

/// Accepts a bare date, a UTC timestamp with or without fractional seconds,
/// and either timestamp shape followed by a numeric zone offset. Layouts are
/// tried in that order; the first hit wins.
pub fn datetime<V>(raw: &str) -> Result<Value<V>, ConvertError> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, DATE_LAYOUT) {
        return Ok(Value::Date(date.and_time(NaiveTime::MIN).and_utc()));
    }

    for layout in [UTC_LAYOUT, FRACTIONAL_LAYOUT] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, layout) {
            return Ok(Value::Date(naive.and_utc()));
        }
    }

    for layout in [OFFSET_LAYOUT, FRACTIONAL_OFFSET_LAYOUT] {
        if let Ok(offset) = DateTime::parse_from_str(raw, layout) {
            return Ok(Value::Date(offset.with_timezone(&Utc)));
        }
    }

    Err(ConvertError::no_match(raw))
}

/// Unconditional passthrough; terminates every default chain.
pub fn text<V>(raw: &str) -> Result<Value<V>, ConvertError> {
    Ok(Value::String(raw.to_owned()))
}

const OBJECT_ID_HEX_LEN: usize = 12;

/// Shape gate for the object-id converter: at least twelve leading ASCII hex
/// digits.
pub(crate) fn object_id_shape(raw: &str) -> bool {
    let bytes = raw.as_bytes();

    bytes.len() >= OBJECT_ID_HEX_LEN
        && bytes[..OBJECT_ID_HEX_LEN]
            .iter()
            .all(u8::is_ascii_hexdigit)
}

/// Object-id converter over the driver factory. Both a failed shape gate and
/// a factory rejection fall through the chain as a plain no-match.
pub fn object_id<P>(primitives: Arc<P>) -> impl Convert<P::Value>
where
    P: Primitives + 'static,
{
    move |raw: &str| {
        if !object_id_shape(raw) {
            return Err(ConvertError::no_match(raw));
        }

        primitives
            .object_id(raw)
            .map(Value::Primitive)
            .map_err(|_| ConvertError::no_match(raw))
    }
}

///
/// TypeConverter
///
/// The ordered best-effort conversion chain: boolean always runs first, then
/// each chain converter until one succeeds. The default chain is object-id
/// (when primitives are present), integer, double, datetime, text.
///

pub struct TypeConverter<P: Primitives> {
    boolean: Box<dyn Convert<P::Value>>,
    primitives: Option<Arc<P>>,
    chain: Vec<Box<dyn Convert<P::Value>>>,
}

impl<P> TypeConverter<P>
where
    P: Primitives + 'static,
{
    pub fn new(
        boolean: impl Convert<P::Value> + 'static,
        primitives: Option<Arc<P>>,
        chain: Vec<Box<dyn Convert<P::Value>>>,
    ) -> Self {
        let mut full: Vec<Box<dyn Convert<P::Value>>> = Vec::with_capacity(chain.len() + 1);
        if let Some(p) = &primitives {
            full.push(Box::new(object_id(Arc::clone(p))));
        }
        full.extend(chain);

        Self {
            boolean: Box::new(boolean),
            primitives,
            chain: full,
        }
    }

    #[must_use]
    pub fn with_defaults(primitives: Option<Arc<P>>) -> Self {
        Self::new(
            boolean::<P::Value>,
            primitives,
            vec![
                Box::new(integer::<P::Value>),
                Box::new(double::<P::Value>),
                Box::new(datetime::<P::Value>),
                Box::new(text::<P::Value>),
            ],
        )
    }

    pub(crate) fn primitives(&self) -> Option<&Arc<P>> {
        self.primitives.as_ref()
    }

    pub(crate) fn boolean(&self) -> &dyn Convert<P::Value> {
        self.boolean.as_ref()
    }
}

impl<P> Convert<P::Value> for TypeConverter<P>
where
    P: Primitives + 'static,
{
    fn convert(&self, raw: &str) -> Result<Value<P::Value>, ConvertError> {
        if let Ok(value) = self.boolean.convert(raw) {
            return Ok(value);
        }

        for converter in &self.chain {
            if let Ok(value) = converter.convert(raw) {
                return Ok(value);
            }
        }

        Err(ConvertError::no_match(raw))
    }
}

/// Applies one converter to a value list. Multi-value operators convert
/// element-wise into an array; single-value operators take exactly one
/// operand. An empty list converts to nothing.
pub(crate) fn convert_values<V>(
    values: &[String],
    op: Operator,
    converter: &dyn Convert<V>,
) -> Result<Option<Value<V>>, ConvertError> {
    if op.is_multi_value() {
        let items = values
            .iter()
            .map(|raw| converter.convert(raw))
            .collect::<Result<Vec<_>, _>>()?;

        return Ok(Some(Value::Array(items)));
    }

    match values {
        [] => Ok(None),
        [single] => converter.convert(single).map(Some),
        _ => Err(ConvertError::TooManyValues {
            count: values.len(),
        }),
    }
}

///
/// TESTS
///
