//! The widget contract shared by every skin.
//!
//! A skin decides what a field looks like. What a field *does* with a user
//! interaction is decided here, by [`WidgetKind::next_value`], so two skins
//! resolving the same schema always produce the same values.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::node::Node;
use crate::types::{FieldOptions, OptionGroup};
use crate::values::FieldValue;

/// Whether a field's current value passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationState {
    Success,
    Error,
}

impl ValidationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationState::Success => "success",
            ValidationState::Error => "error",
        }
    }
}

/// One user interaction with a rendered control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ControlEvent {
    /// Raw text typed into an input or textarea.
    Input { value: String },
    /// A checkbox (or a multi-select option) was checked or unchecked.
    Toggle { key: String, checked: bool },
    /// A radio button or single-select option was picked.
    Choose { key: String },
    /// The full set of options currently selected in a multi-select.
    SelectMany { keys: Vec<String> },
}

impl ControlEvent {
    pub fn input(value: impl Into<String>) -> Self {
        ControlEvent::Input {
            value: value.into(),
        }
    }

    pub fn toggle(key: impl Into<String>, checked: bool) -> Self {
        ControlEvent::Toggle {
            key: key.into(),
            checked,
        }
    }

    pub fn choose(key: impl Into<String>) -> Self {
        ControlEvent::Choose { key: key.into() }
    }

    pub fn select_many<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ControlEvent::SelectMany {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }
}

/// The closed set of widget behaviours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetKind {
    /// Single-line text, password, email or file input.
    Input,
    /// Multi-line text.
    Textarea,
    /// Set of keys, one checkbox per option.
    CheckboxGroup,
    /// One key, one radio button per option.
    RadioGroup,
    /// One key, or a set of keys when `multiple`.
    SelectGroup { multiple: bool },
    /// Display only; never emits.
    Static,
}

impl WidgetKind {
    /// Whether this kind reads its choices from `options.group`.
    pub fn uses_group(&self) -> bool {
        matches!(
            self,
            WidgetKind::CheckboxGroup | WidgetKind::RadioGroup | WidgetKind::SelectGroup { .. }
        )
    }

    /// Compute the field's complete next value for `event`.
    ///
    /// Returns `None` when the event does not apply to this kind or names a
    /// key outside `group`.
    pub fn next_value(
        &self,
        group: Option<&OptionGroup>,
        current: &FieldValue,
        event: &ControlEvent,
    ) -> Option<FieldValue> {
        let in_group = |key: &str| group.map(|g| g.contains(key)).unwrap_or(false);

        let next = match (self, event) {
            (WidgetKind::Input | WidgetKind::Textarea, ControlEvent::Input { value }) => {
                Some(FieldValue::Text(value.clone()))
            }
            (
                WidgetKind::CheckboxGroup | WidgetKind::SelectGroup { multiple: true },
                ControlEvent::Toggle { key, checked },
            ) if in_group(key) => Some(toggle_membership(current, key, *checked)),
            (
                WidgetKind::RadioGroup | WidgetKind::SelectGroup { multiple: false },
                ControlEvent::Choose { key },
            ) if in_group(key) => Some(FieldValue::Text(key.clone())),
            (WidgetKind::SelectGroup { multiple: true }, ControlEvent::SelectMany { keys }) => {
                let picked = keys.iter().map(String::as_str);
                group.map(|g| FieldValue::List(g.normalize_selection(picked)))
            }
            _ => None,
        };

        if next.is_none() {
            debug!(kind = ?self, ?event, "control event ignored");
        }
        next
    }
}

/// Remove `key` from the current selection, then add it back when checked.
fn toggle_membership(current: &FieldValue, key: &str, checked: bool) -> FieldValue {
    let mut next: Vec<String> = current
        .keys()
        .into_iter()
        .filter(|k| *k != key)
        .map(str::to_string)
        .collect();
    if checked {
        next.push(key.to_string());
    }
    FieldValue::List(next)
}

/// Everything a widget needs to render one field.
#[derive(Debug, Clone, Copy)]
pub struct FieldProps<'a> {
    /// Schema key; identifies the field.
    pub key: &'a str,
    /// Per-instance id for label association only.
    pub control_id: &'a str,
    pub label: Option<&'a str>,
    pub field_type: Option<&'a str>,
    pub options: &'a FieldOptions,
    pub value: &'a FieldValue,
    pub validation_state: Option<ValidationState>,
    pub validation_error: Option<&'a str>,
    pub read_only: bool,
    pub disabled: bool,
}

impl<'a> FieldProps<'a> {
    /// Read-only or disabled: the field must not emit changes.
    pub fn locked(&self) -> bool {
        self.read_only || self.disabled
    }

    /// The message to show inline, if the field is in the error state.
    pub fn shown_error(&self) -> Option<&'a str> {
        match self.validation_state {
            Some(ValidationState::Error) => self.validation_error,
            _ => None,
        }
    }
}

/// One interactive control, resolved from a schema entry.
pub trait Widget: Send + Sync + fmt::Debug {
    fn kind(&self) -> WidgetKind;

    /// The normalized choices, for group widgets.
    fn group(&self) -> Option<&OptionGroup> {
        None
    }

    fn render(&self, props: &FieldProps<'_>) -> Node;

    /// React to a user interaction with the field's full next value.
    ///
    /// Locked fields never emit, whatever the control reports.
    fn interact(&self, props: &FieldProps<'_>, event: &ControlEvent) -> Option<FieldValue> {
        if props.locked() {
            trace!(key = props.key, "locked field ignored control event");
            return None;
        }
        self.kind().next_value(self.group(), props.value, event)
    }
}
