//! Per-field controller.
//!
//! Owns a field's resolved widget and its control id, and builds the props the
//! widget renders from. The control id is only for label association; the
//! schema key is what identifies the field everywhere else.

use std::sync::Arc;

use tracing::trace;
use ulid::Ulid;

use crate::node::Node;
use crate::types::SchemaEntry;
use crate::values::FieldValue;
use crate::widget::{ControlEvent, FieldProps, ValidationState, Widget};

/// How the engine wants a field's validation shown on this render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Validation<'a> {
    /// Not shown yet.
    #[default]
    Hidden,
    Valid,
    Invalid(&'a str),
}

impl<'a> Validation<'a> {
    fn state(self) -> (Option<ValidationState>, Option<&'a str>) {
        match self {
            Validation::Hidden => (None, None),
            Validation::Valid => (Some(ValidationState::Success), None),
            Validation::Invalid(message) => (Some(ValidationState::Error), Some(message)),
        }
    }
}

/// Form-wide interaction modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub read_only: bool,
    pub disabled: bool,
}

#[derive(Debug, Clone)]
pub struct FieldController {
    entry: SchemaEntry,
    widget: Arc<dyn Widget>,
    control_id: String,
}

impl FieldController {
    pub fn new(entry: SchemaEntry, widget: Arc<dyn Widget>) -> Self {
        let control_id = format!("field-{}", Ulid::new().to_string().to_lowercase());
        trace!(key = %entry.key, %control_id, "field controller created");
        Self {
            entry,
            widget,
            control_id,
        }
    }

    pub fn key(&self) -> &str {
        &self.entry.key
    }

    pub fn control_id(&self) -> &str {
        &self.control_id
    }

    pub fn entry(&self) -> &SchemaEntry {
        &self.entry
    }

    pub fn widget(&self) -> &Arc<dyn Widget> {
        &self.widget
    }

    /// Whether this field accepts changes under the given form modifiers.
    pub fn locked(&self, modifiers: Modifiers) -> bool {
        modifiers.read_only || modifiers.disabled || self.entry.read_only || self.entry.disabled
    }

    /// Props for one render. Form modifiers are OR'd with the entry's own.
    pub fn props<'a>(
        &'a self,
        value: &'a FieldValue,
        validation: Validation<'a>,
        modifiers: Modifiers,
    ) -> FieldProps<'a> {
        let (validation_state, validation_error) = validation.state();
        FieldProps {
            key: &self.entry.key,
            control_id: &self.control_id,
            label: self.entry.label.as_deref(),
            field_type: self.entry.type_tag(),
            options: &self.entry.options,
            value,
            validation_state,
            validation_error,
            read_only: modifiers.read_only || self.entry.read_only,
            disabled: modifiers.disabled || self.entry.disabled,
        }
    }

    /// Render the widget, tagging its root with the schema key.
    pub fn render(&self, props: &FieldProps<'_>) -> Node {
        match self.widget.render(props) {
            Node::Element(root) => root.attr("data-field-key", self.key()).into(),
            text => text,
        }
    }

    /// Translate a control event into the field's next value, if any.
    pub fn dispatch(&self, props: &FieldProps<'_>, event: &ControlEvent) -> Option<FieldValue> {
        self.widget.interact(props, event)
    }
}
