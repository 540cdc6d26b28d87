use crate::{
    convert::{TypeConverter, convert_values},
    error::{ConvertError, Error, Errors},
    extract::{ARRAY_DELIMITER, DELIMITER, extract},
    fields::Fields,
    filter::Value,
    operator::Operator,
    primitives::Primitives,
    query::{Query, parse_sort_token},
};
use std::{
    collections::{BTreeMap, HashSet},
    sync::{Arc, OnceLock},
};

const LIMIT_PARAM: &str = "limit";
const SKIP_PARAM: &str = "skip";
const SORT_PARAM: &str = "sort";

/// Characters escaped before a contains/starts-with value becomes a regex
/// pattern.
const ESCAPE_CHARS: &str = ".*?+^$[](){}|-";
const ESCAPE_SYMBOL: char = '\\';

///
/// Parser
///
/// The compiler itself. Holds the conversion chain, the caller's field
/// configuration and the strict flag; `parse` is pure per call and safe to
/// invoke concurrently from multiple threads.
///

pub struct Parser<P: Primitives> {
    converter: TypeConverter<P>,
    fields: Fields<P::Value>,
    strict: bool,
    escape_table: OnceLock<HashSet<char>>,
}

impl<P> Parser<P>
where
    P: Primitives + 'static,
{
    #[must_use]
    pub fn new(converter: TypeConverter<P>) -> Self {
        Self {
            converter,
            fields: Fields::new(),
            strict: false,
            escape_table: OnceLock::new(),
        }
    }

    /// Default conversion chain over the given driver factories.
    #[must_use]
    pub fn with_primitives(primitives: Arc<P>) -> Self {
        Self::new(TypeConverter::with_defaults(Some(primitives)))
    }

    #[must_use]
    pub fn fields(mut self, fields: Fields<P::Value>) -> Self {
        self.fields = fields;
        self
    }

    /// In strict mode every filter field and sort token must appear in the
    /// field configuration.
    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Compiles one flat parameter multimap into a query.
    ///
    /// Never aborts early: the query reflects everything that compiled and
    /// the error list everything that did not.
    pub fn parse<I, K, V>(&self, params: I) -> (Query<P::Value, P::SortKey>, Errors)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut errors = Errors::new();
        let mut query = Query::default();

        let grouped = group_params(params);
        let fields = extract(&grouped, &mut errors);

        for (field, operators) in &fields {
            for (op, values) in operators {
                match self.convert(field, *op, values) {
                    Ok(Some(value)) => query.filter.add(field.as_str(), *op, value),
                    Ok(None) => {}
                    Err(error) => errors.push(error),
                }
            }
        }

        for name in self.fields.required_fields() {
            if !query.filter.contains_key(name) {
                errors.push(Error::MissingField {
                    field: name.to_string(),
                });
            }
        }

        query.limit = int_directive(&grouped, LIMIT_PARAM, &mut errors);
        query.skip = int_directive(&grouped, SKIP_PARAM, &mut errors);
        self.sort_directive(&grouped, &mut query, &mut errors);

        tracing::debug!(
            fields = query.filter.len(),
            sort = query.sort.len(),
            limit = query.limit,
            skip = query.skip,
            errors = errors.len(),
            "compiled query parameters"
        );

        (query, errors)
    }

    fn convert(
        &self,
        field: &str,
        op: Operator,
        values: &[String],
    ) -> Result<Option<Value<P::Value>>, Error> {
        let spec = self.fields.get(field);
        if spec.is_none() && self.strict {
            return Err(Error::NoFieldSpec {
                field: field.to_string(),
            });
        }

        let wrap = |source: ConvertError| Error::Convert {
            field: field.to_string(),
            operator: op,
            source,
        };

        // pattern families ignore any configured converter; the operand is a
        // pattern, not a field value
        if op.is_regex() || op.is_contains() || op.is_starts_with() {
            let Some(primitives) = self.converter.primitives() else {
                return Err(wrap(ConvertError::NoConverter));
            };

            let options = op.regex_options();
            let pattern_converter = |raw: &str| -> Result<Value<P::Value>, ConvertError> {
                let pattern = if op.is_regex() {
                    raw.to_owned()
                } else if op.is_contains() {
                    self.escape(raw)
                } else {
                    format!("^{}", self.escape(raw))
                };

                primitives
                    .regex(&pattern, options)
                    .map(Value::Primitive)
                    .map_err(ConvertError::from)
            };

            return convert_values(values, op, &pattern_converter).map_err(wrap);
        }

        // exists always coerces through the boolean converter
        if op == Operator::Exists {
            return convert_values(values, op, self.converter.boolean()).map_err(wrap);
        }

        match spec {
            Some(field_spec) => match field_spec.converter_fn() {
                Some(converter) => convert_values(values, op, converter).map_err(wrap),
                None => Err(wrap(ConvertError::NoConverter)),
            },
            None => convert_values(values, op, &self.converter).map_err(wrap),
        }
    }

    fn sort_directive(
        &self,
        params: &BTreeMap<String, Vec<String>>,
        query: &mut Query<P::Value, P::SortKey>,
        errors: &mut Errors,
    ) {
        let Some(values) = params.get(&directive_key(SORT_PARAM)) else {
            return;
        };

        let tokens = values.iter().flat_map(|value| value.split(ARRAY_DELIMITER));

        let Some(primitives) = self.converter.primitives() else {
            for token in tokens {
                let (field, _) = parse_sort_token(token);
                errors.push(Error::NoSortField {
                    field: field.to_string(),
                });
            }
            return;
        };

        for token in tokens {
            let (field, direction) = parse_sort_token(token);

            match primitives.sort_key(field, direction) {
                Ok(key) => {
                    query.sort.push(key);

                    // the entry stays; strict mode only reports the problem
                    if self.strict && !self.fields.has(field) {
                        errors.push(Error::NoSortField {
                            field: field.to_string(),
                        });
                    }
                }
                Err(_) => errors.push(Error::NoSortField {
                    field: field.to_string(),
                }),
            }
        }
    }

    fn escape(&self, raw: &str) -> String {
        let table = self
            .escape_table
            .get_or_init(|| ESCAPE_CHARS.chars().collect());

        let mut escaped = String::with_capacity(raw.len());
        for c in raw.chars() {
            if table.contains(&c) {
                escaped.push(ESCAPE_SYMBOL);
            }
            escaped.push(c);
        }

        escaped
    }
}

fn directive_key(name: &str) -> String {
    format!("{DELIMITER}{name}")
}

/// Groups raw pairs by key, preserving per-key value encounter order.
fn group_params<I, K, V>(params: I) -> BTreeMap<String, Vec<String>>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (key, value) in params {
        grouped.entry(key.into()).or_default().push(value.into());
    }

    grouped
}

/// Reads a non-negative 31-bit integer directive; only the first occurrence
/// counts and an empty value is ignored.
fn int_directive(
    params: &BTreeMap<String, Vec<String>>,
    name: &'static str,
    errors: &mut Errors,
) -> i64 {
    let Some(raw) = params
        .get(&directive_key(name))
        .and_then(|values| values.first())
    else {
        return 0;
    };

    if raw.is_empty() {
        return 0;
    }

    match raw.parse::<i32>() {
        Ok(value) if value >= 0 => i64::from(value),
        Ok(_) => {
            errors.push(Error::Directive {
                name,
                message: "must be non-negative".to_string(),
            });
            0
        }
        Err(error) => {
            errors.push(Error::Directive {
                name,
                message: error.to_string(),
            });
            0
        }
    }
}

///
/// TESTS
///
