use crate::convert::Convert;
use std::collections::BTreeMap;

///
/// Field
///
/// Per-field caller configuration: an optional converter that replaces the
/// default chain for that field, and a required flag checked after assembly.
///

pub struct Field<V> {
    converter: Option<Box<dyn Convert<V>>>,
    required: bool,
}

impl<V> Field<V> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            converter: None,
            required: false,
        }
    }

    #[must_use]
    pub fn converter(mut self, converter: impl Convert<V> + 'static) -> Self {
        self.converter = Some(Box::new(converter));
        self
    }

    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }

    #[must_use]
    pub fn converter_fn(&self) -> Option<&dyn Convert<V>> {
        self.converter.as_deref()
    }
}

impl<V> Default for Field<V> {
    fn default() -> Self {
        Self::new()
    }
}

///
/// Fields
///

pub struct Fields<V>(BTreeMap<String, Field<V>>);

impl<V> Fields<V> {
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, field: Field<V>) -> Self {
        self.insert(name, field);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, field: Field<V>) {
        self.0.insert(name.into(), field);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Field<V>> {
        self.0.get(name)
    }

    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &str> {
        self.0
            .iter()
            .filter(|(_, field)| field.is_required())
            .map(|(name, _)| name.as_str())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<V> Default for Fields<V> {
    fn default() -> Self {
        Self::new()
    }
}

///
/// TESTS
///
