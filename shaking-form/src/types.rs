//! Schema types: field entries, their options and the normalized schema set.
//!
//! A schema set can be written as an ordered sequence (each field is keyed by
//! its position, `"0"`, `"1"`, ...) or as a keyed mapping. Both forms end up
//! as one ordered list of [`SchemaEntry`] values with their `key` filled in.

use std::collections::HashSet;
use std::fmt;

use indexmap::IndexMap;
use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{FormError, Result};
use crate::rules::{ValidationRules, Validator};
use crate::values::FieldValue;

/// Widget-specific configuration for one field.
///
/// Free-form on purpose: only the widget that consumes an option interprets
/// it. Insertion order is preserved so `group` mappings keep their order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldOptions(Map<String, Value>);

impl FieldOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn str(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    /// A boolean option; absent or non-boolean reads as `false`.
    pub fn flag(&self, name: &str) -> bool {
        self.0.get(name).and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn placeholder(&self) -> Option<&str> {
        self.str("placeholder")
    }

    /// Row count for multi-line widgets.
    pub fn rows(&self) -> Option<u64> {
        self.0.get("rows").and_then(Value::as_u64)
    }

    pub fn vertical(&self) -> bool {
        self.flag("vertical")
    }

    pub fn multiple(&self) -> bool {
        self.flag("multiple")
    }

    /// Normalize `options.group` for the field `key`.
    ///
    /// Accepts an array of labels (keyed by index) or a mapping of key to
    /// label. Anything else, including a missing group, is a schema error.
    pub fn group(&self, key: &str) -> Result<OptionGroup> {
        match self.0.get("group") {
            None | Some(Value::Null) => Err(FormError::malformed(key, "options.group is required")),
            Some(Value::Array(labels)) => labels
                .iter()
                .map(|label| label_text(key, label))
                .collect::<Result<Vec<_>>>()
                .map(OptionGroup::from_labels),
            Some(Value::Object(pairs)) => pairs
                .iter()
                .map(|(k, label)| Ok((k.clone(), label_text(key, label)?)))
                .collect::<Result<Vec<_>>>()
                .map(OptionGroup::from_pairs),
            Some(other) => Err(FormError::malformed(
                key,
                format!("options.group must be a list or a mapping, got {other}"),
            )),
        }
    }
}

fn label_text(key: &str, label: &Value) -> Result<String> {
    match label {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(FormError::malformed(
            key,
            format!("options.group labels must be strings, got {other}"),
        )),
    }
}

/// The choices of a group widget: option key to display label, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionGroup(IndexMap<String, String>);

impl OptionGroup {
    /// Build from an ordered list of labels; keys are the indexes.
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        OptionGroup(
            labels
                .into_iter()
                .enumerate()
                .map(|(i, label)| (i.to_string(), label.into()))
                .collect(),
        )
    }

    /// Build from `(key, label)` pairs.
    pub fn from_pairs<I, K, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, S)>,
        K: Into<String>,
        S: Into<String>,
    {
        OptionGroup(
            pairs
                .into_iter()
                .map(|(k, label)| (k.into(), label.into()))
                .collect(),
        )
    }

    pub fn label(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Keep only keys that belong to the group, in group order, once each.
    pub fn normalize_selection<'a, I>(&self, selected: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let wanted: HashSet<&str> = selected.into_iter().collect();
        self.keys()
            .filter(|k| wanted.contains(k))
            .map(str::to_string)
            .collect()
    }
}

impl From<OptionGroup> for Value {
    fn from(group: OptionGroup) -> Self {
        Value::Object(group.0.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

/// Declarative description of one form field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaEntry {
    /// Identity within the schema set; assigned by [`SchemaSet`].
    ///
    /// A document may spell it out. Positional entries ignore it and keyed
    /// entries must repeat their mapping key.
    #[serde(default)]
    pub key: String,

    #[serde(default)]
    pub label: Option<String>,

    /// Widget tag, possibly dotted (`group.select`).
    #[serde(default, rename = "type")]
    pub field_type: Option<String>,

    #[serde(default)]
    pub options: FieldOptions,

    /// Closure or compiled rules table; run only at validation time.
    #[serde(default)]
    pub validate: Option<Validator>,

    #[serde(default)]
    pub read_only: bool,

    #[serde(default)]
    pub disabled: bool,
}

impl SchemaEntry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn field_type(mut self, tag: impl Into<String>) -> Self {
        self.field_type = Some(tag.into());
        self
    }

    pub fn option(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options = self.options.set(name, value);
        self
    }

    pub fn options(mut self, options: FieldOptions) -> Self {
        self.options = options;
        self
    }

    /// Attach a closure validator.
    pub fn validate<F>(mut self, check: F) -> Self
    where
        F: Fn(&FieldValue) -> Option<String> + Send + Sync + 'static,
    {
        self.validate = Some(Validator::new(check));
        self
    }

    /// Attach a rules table; fails on an invalid pattern.
    pub fn rules(mut self, rules: ValidationRules) -> Result<Self> {
        self.validate = Some(Validator::from_rules(rules)?);
        Ok(self)
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// The type tag, with an empty string treated as absent.
    pub fn type_tag(&self) -> Option<&str> {
        self.field_type.as_deref().filter(|t| !t.is_empty())
    }
}

/// An ordered, normalized set of schema entries.
#[derive(Debug, Clone, Default)]
pub struct SchemaSet {
    entries: Vec<SchemaEntry>,
}

impl SchemaSet {
    /// Positional form: each entry is keyed by its index, whatever `key` it
    /// carries.
    pub fn from_list(entries: impl IntoIterator<Item = SchemaEntry>) -> Self {
        let entries = entries
            .into_iter()
            .enumerate()
            .map(|(i, mut entry)| {
                entry.key = i.to_string();
                entry
            })
            .collect();
        Self { entries }
    }

    /// Keyed form. Order of the pairs is kept; a repeated key, or an entry
    /// whose own `key` names a different field, is an error.
    pub fn from_map<I, K>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, SchemaEntry)>,
        K: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut entries = Vec::new();
        for (key, mut entry) in pairs {
            let key = key.into();
            if !entry.key.is_empty() && entry.key != key {
                return Err(FormError::KeyMismatch {
                    key,
                    declared: entry.key,
                });
            }
            if !seen.insert(key.clone()) {
                return Err(FormError::DuplicateKey { key });
            }
            entry.key = key;
            entries.push(entry);
        }
        Ok(Self { entries })
    }

    pub fn from_yaml(source: &str) -> Result<Self> {
        Ok(serde_yaml_ng::from_str(source)?)
    }

    pub fn from_json(source: &str) -> Result<Self> {
        Ok(serde_json::from_str(source)?)
    }

    pub fn get(&self, key: &str) -> Option<&SchemaEntry> {
        self.entries.iter().find(|e| e.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SchemaEntry> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<SchemaEntry>> for SchemaSet {
    fn from(entries: Vec<SchemaEntry>) -> Self {
        SchemaSet::from_list(entries)
    }
}

impl<'de> Deserialize<'de> for SchemaSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(SchemaSetVisitor)
    }
}

struct SchemaSetVisitor;

impl<'de> Visitor<'de> for SchemaSetVisitor {
    type Value = SchemaSet;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a sequence or a mapping of field schemas")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<SchemaSet, A::Error> {
        let mut entries = Vec::new();
        while let Some(entry) = seq.next_element::<SchemaEntry>()? {
            entries.push(entry);
        }
        Ok(SchemaSet::from_list(entries))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<SchemaSet, A::Error> {
        let mut pairs = Vec::new();
        while let Some((key, entry)) = map.next_entry::<String, SchemaEntry>()? {
            pairs.push((key, entry));
        }
        SchemaSet::from_map(pairs).map_err(de::Error::custom)
    }
}
