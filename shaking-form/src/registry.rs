//! Field type registry: type tag to widget constructor.
//!
//! A [`FieldClass`] is what the engine consults to turn a schema entry into a
//! widget. [`FieldTypeRegistry`] is the usual implementation, a table keyed by
//! exact tag with a default for untyped fields. Any closure with the right
//! signature is a field class too, for hosts that want to map tags by hand.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::trace;

use crate::error::{FormError, Result};
use crate::types::SchemaEntry;
use crate::widget::Widget;

/// Builds a widget for one schema entry.
pub type Constructor = Arc<dyn Fn(&SchemaEntry) -> Result<Arc<dyn Widget>> + Send + Sync>;

/// Resolves schema entries to widgets. Injected once per form.
pub trait FieldClass: Send + Sync {
    fn resolve(&self, entry: &SchemaEntry) -> Result<Arc<dyn Widget>>;
}

impl<F> FieldClass for F
where
    F: Fn(&SchemaEntry) -> Result<Arc<dyn Widget>> + Send + Sync,
{
    fn resolve(&self, entry: &SchemaEntry) -> Result<Arc<dyn Widget>> {
        self(entry)
    }
}

/// Exact-match table of type tags.
///
/// - an entry without a type (or with an empty one) gets the default widget
/// - a registered tag gets its constructor
/// - any other tag is [`FormError::UnknownFieldType`]
#[derive(Clone)]
pub struct FieldTypeRegistry {
    name: String,
    default: Constructor,
    tags: IndexMap<String, Constructor>,
}

impl FieldTypeRegistry {
    /// Create a registry whose untyped fields use `default`.
    pub fn new<F>(name: impl Into<String>, default: F) -> Self
    where
        F: Fn(&SchemaEntry) -> Result<Arc<dyn Widget>> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            default: Arc::new(default),
            tags: IndexMap::new(),
        }
    }

    /// Register (or replace) the constructor for `tag`.
    pub fn register<F>(mut self, tag: impl Into<String>, constructor: F) -> Self
    where
        F: Fn(&SchemaEntry) -> Result<Arc<dyn Widget>> + Send + Sync + 'static,
    {
        self.tags.insert(tag.into(), Arc::new(constructor));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.contains_key(tag)
    }

    /// Registered tags in registration order.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tags.keys().map(String::as_str)
    }
}

impl FieldClass for FieldTypeRegistry {
    fn resolve(&self, entry: &SchemaEntry) -> Result<Arc<dyn Widget>> {
        match entry.type_tag() {
            None => {
                trace!(registry = %self.name, key = %entry.key, "default widget");
                (self.default)(entry)
            }
            Some(tag) => {
                let Some(constructor) = self.tags.get(tag) else {
                    return Err(FormError::UnknownFieldType {
                        key: entry.key.clone(),
                        field_type: tag.to_string(),
                    });
                };
                trace!(registry = %self.name, key = %entry.key, tag, "resolved widget");
                constructor(entry)
            }
        }
    }
}

impl fmt::Debug for FieldTypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldTypeRegistry")
            .field("name", &self.name)
            .field("tags", &self.tags.keys().collect::<Vec<_>>())
            .finish()
    }
}
