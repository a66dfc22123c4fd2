//! Field values, the host-owned value store and the error map.
//!
//! [`Values`] is never mutated by the engine. Every edit goes through
//! [`Values::merge`], which returns a new map and leaves the receiver as it
//! was.

use std::fmt;

use indexmap::IndexMap;
use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};

/// The current value of one field.
///
/// Serializes untagged. Deserializes leniently: `null` is `Empty`, a string,
/// number or boolean is `Text`, and an array of those is `List`. Option keys
/// written as bare numbers (`lover: 0`) therefore read as `"0"`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// No value has been supplied.
    #[default]
    Empty,
    /// A scalar string, or the key of a single selected option.
    Text(String),
    /// The keys of several selected options.
    List(Vec<String>),
}

static EMPTY: FieldValue = FieldValue::Empty;

impl FieldValue {
    /// Build a `List` from any sequence of keys.
    pub fn list<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldValue::List(keys.into_iter().map(Into::into).collect())
    }

    /// True for `Empty`, an empty string and an empty list.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Empty => true,
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::List(items) => items.is_empty(),
        }
    }

    /// The scalar text, or `""` for anything that is not `Text`.
    pub fn as_text(&self) -> &str {
        match self {
            FieldValue::Text(s) => s,
            _ => "",
        }
    }

    /// The selected keys. A non-empty `Text` counts as a single key.
    pub fn keys(&self) -> Vec<&str> {
        match self {
            FieldValue::Empty => Vec::new(),
            FieldValue::Text(s) if s.is_empty() => Vec::new(),
            FieldValue::Text(s) => vec![s.as_str()],
            FieldValue::List(items) => items.iter().map(String::as_str).collect(),
        }
    }

    /// Whether `key` is among [`FieldValue::keys`].
    pub fn contains(&self, key: &str) -> bool {
        self.keys().contains(&key)
    }

    /// Length in characters for text, number of entries for lists.
    pub fn len(&self) -> usize {
        match self {
            FieldValue::Empty => 0,
            FieldValue::Text(s) => s.chars().count(),
            FieldValue::List(items) => items.len(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        FieldValue::List(value)
    }
}

impl From<Vec<&str>> for FieldValue {
    fn from(value: Vec<&str>) -> Self {
        FieldValue::list(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(FieldValueVisitor)
    }
}

struct FieldValueVisitor;

impl<'de> Visitor<'de> for FieldValueVisitor {
    type Value = FieldValue;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("null, a scalar, or a sequence of scalars")
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<FieldValue, E> {
        Ok(FieldValue::Empty)
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<FieldValue, E> {
        Ok(FieldValue::Empty)
    }

    fn visit_some<D: Deserializer<'de>>(
        self,
        deserializer: D,
    ) -> std::result::Result<FieldValue, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<FieldValue, E> {
        Ok(FieldValue::Text(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<FieldValue, E> {
        Ok(FieldValue::Text(v))
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<FieldValue, E> {
        Ok(FieldValue::Text(v.to_string()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<FieldValue, E> {
        Ok(FieldValue::Text(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<FieldValue, E> {
        Ok(FieldValue::Text(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<FieldValue, E> {
        Ok(FieldValue::Text(v.to_string()))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<FieldValue, A::Error> {
        let mut keys = Vec::new();
        while let Some(item) = seq.next_element::<FieldValue>()? {
            match item {
                FieldValue::Text(key) => keys.push(key),
                FieldValue::Empty => {}
                FieldValue::List(_) => {
                    return Err(de::Error::custom("nested lists are not field values"));
                }
            }
        }
        Ok(FieldValue::List(keys))
    }
}

/// Mapping from field key to current value, owned by the host.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Values(IndexMap<String, FieldValue>);

impl Values {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, for constructing literal value maps.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// The value for `key`; absent keys read as [`FieldValue::Empty`].
    pub fn get(&self, key: &str) -> &FieldValue {
        self.0.get(key).unwrap_or(&EMPTY)
    }

    /// Whether the host supplied an entry for `key` (even a `null` one).
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// A copy of this map with `key` replaced by `value`.
    pub fn merge(&self, key: &str, value: FieldValue) -> Values {
        let mut next = self.0.clone();
        next.insert(key.to_string(), value);
        Values(next)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Values
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Values(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Result of one validation pass: field key to error message.
///
/// A key that is absent is valid.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Errors(IndexMap<String, String>);

impl Errors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.0.insert(key.into(), message.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Errors {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Errors(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
