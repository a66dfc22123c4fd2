//! Widget skins for `shaking-form`
//!
//! Two complete skins register the same standard tags:
//!
//! - [`plain`]: bare markup with `field` / `validation-*` classes
//! - [`bootstrap`]: Bootstrap 3 form-group markup
//!
//! Skins only decide markup. What a widget does with an interaction comes
//! from [`WidgetKind`], so switching skins never changes the values a form
//! produces.

use std::sync::Arc;

use shaking_form::{
    FieldTypeRegistry, FieldValue, OptionGroup, Result, SchemaEntry, Widget, WidgetKind,
};
use tracing::trace;

pub mod bootstrap;
pub mod plain;

/// Tags every skin registers, with the widget each resolves to.
pub const STANDARD_TAGS: &[(&str, StandardWidget)] = &[
    ("text", StandardWidget::Input),
    ("password", StandardWidget::Input),
    ("email", StandardWidget::Input),
    ("file", StandardWidget::Input),
    ("textarea", StandardWidget::Textarea),
    ("group.checkbox", StandardWidget::CheckboxGroup),
    ("group.radio", StandardWidget::RadioGroup),
    ("group.select", StandardWidget::SelectGroup),
    ("static", StandardWidget::Static),
];

/// Skin names accepted by [`registry_for`].
pub const SKINS: &[&str] = &["plain", "bootstrap"];

/// Standard widget family, before options decide the exact [`WidgetKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardWidget {
    Input,
    Textarea,
    CheckboxGroup,
    RadioGroup,
    SelectGroup,
    Static,
}

/// Everything a skin needs to build one widget, checked against the entry.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetSpec {
    pub kind: WidgetKind,
    /// HTML input type for [`WidgetKind::Input`] (`text`, `password`, ...).
    pub input_type: String,
    /// Normalized choices for group widgets.
    pub group: Option<OptionGroup>,
}

impl WidgetSpec {
    /// Resolve `widget` for `entry`. Group widgets fail without a valid
    /// `options.group`.
    pub fn from_entry(entry: &SchemaEntry, widget: StandardWidget) -> Result<Self> {
        let kind = match widget {
            StandardWidget::Input => WidgetKind::Input,
            StandardWidget::Textarea => WidgetKind::Textarea,
            StandardWidget::CheckboxGroup => WidgetKind::CheckboxGroup,
            StandardWidget::RadioGroup => WidgetKind::RadioGroup,
            StandardWidget::SelectGroup => WidgetKind::SelectGroup {
                multiple: entry.options.multiple(),
            },
            StandardWidget::Static => WidgetKind::Static,
        };
        let group = if kind.uses_group() {
            Some(entry.options.group(&entry.key)?)
        } else {
            None
        };
        Ok(Self {
            kind,
            input_type: entry.type_tag().unwrap_or("text").to_string(),
            group,
        })
    }
}

/// Build a registry with every standard tag; `make` supplies the markup.
pub fn standard_registry<F>(name: &str, make: F) -> FieldTypeRegistry
where
    F: Fn(WidgetSpec) -> Arc<dyn Widget> + Send + Sync + 'static,
{
    let make = Arc::new(make);
    let default = {
        let make = Arc::clone(&make);
        move |entry: &SchemaEntry| -> Result<Arc<dyn Widget>> {
            Ok(make(WidgetSpec::from_entry(entry, StandardWidget::Input)?))
        }
    };
    STANDARD_TAGS
        .iter()
        .fold(FieldTypeRegistry::new(name, default), |registry, &(tag, widget)| {
            let make = Arc::clone(&make);
            registry.register(tag, move |entry: &SchemaEntry| -> Result<Arc<dyn Widget>> {
                trace!(tag, key = %entry.key, "building standard widget");
                Ok(make(WidgetSpec::from_entry(entry, widget)?))
            })
        })
}

/// Look up a skin by name.
pub fn registry_for(name: &str) -> Option<FieldTypeRegistry> {
    match name {
        "plain" => Some(plain::registry()),
        "bootstrap" => Some(bootstrap::registry()),
        _ => None,
    }
}

/// Display text for a static field.
pub(crate) fn display_text(value: &FieldValue) -> String {
    match value {
        FieldValue::Empty => String::new(),
        FieldValue::Text(text) => text.clone(),
        FieldValue::List(items) => items.join(", "),
    }
}
