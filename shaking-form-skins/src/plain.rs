//! Bare markup skin.
//!
//! Every field is a `div.field` with a `validation-success` or
//! `validation-error` class once its state is shown, an optional `label`, the
//! control, and a `div.error` with the message.

use std::sync::Arc;

use shaking_form::{
    Element, FieldProps, FieldTypeRegistry, Node, OptionGroup, Widget, WidgetKind,
};

use crate::{display_text, standard_registry, WidgetSpec};

/// The plain skin with every standard tag.
pub fn registry() -> FieldTypeRegistry {
    standard_registry("plain", |spec| Arc::new(PlainWidget(spec)) as Arc<dyn Widget>)
}

#[derive(Debug)]
pub struct PlainWidget(WidgetSpec);

impl Widget for PlainWidget {
    fn kind(&self) -> WidgetKind {
        self.0.kind
    }

    fn group(&self) -> Option<&OptionGroup> {
        self.0.group.as_ref()
    }

    fn render(&self, props: &FieldProps<'_>) -> Node {
        let control = match self.0.kind {
            WidgetKind::Input => input(props, &self.0.input_type),
            WidgetKind::Textarea => textarea(props),
            WidgetKind::CheckboxGroup => choices(props, self.group(), "checkbox"),
            WidgetKind::RadioGroup => choices(props, self.group(), "radio"),
            WidgetKind::SelectGroup { multiple } => select(props, self.group(), multiple),
            WidgetKind::Static => Element::new("div")
                .class("static-value")
                .text(display_text(props.value)),
        };
        field(props, control)
    }
}

fn field(props: &FieldProps<'_>, control: Element) -> Node {
    let labelled_control = matches!(control.tag.as_str(), "input" | "textarea" | "select");
    Element::new("div")
        .class("field")
        .class(
            props
                .validation_state
                .map(|state| format!("validation-{}", state.as_str()))
                .unwrap_or_default(),
        )
        .child_opt(props.label.map(|label| {
            Element::new("label")
                .attr_opt("for", labelled_control.then_some(props.control_id))
                .text(label)
        }))
        .child(control)
        .child_opt(
            props
                .shown_error()
                .map(|message| Element::new("div").class("error").text(message)),
        )
        .into()
}

fn locks(element: Element, props: &FieldProps<'_>) -> Element {
    element
        .flag("readonly", props.read_only)
        .flag("disabled", props.disabled)
}

fn input(props: &FieldProps<'_>, input_type: &str) -> Element {
    locks(
        Element::new("input")
            .attr("id", props.control_id)
            .attr("type", input_type)
            .attr_opt("placeholder", props.options.placeholder())
            .attr("value", props.value.as_text()),
        props,
    )
}

fn textarea(props: &FieldProps<'_>) -> Element {
    locks(
        Element::new("textarea")
            .attr("id", props.control_id)
            .attr_opt("placeholder", props.options.placeholder())
            .attr_opt("rows", props.options.rows().map(|rows| rows.to_string()))
            .text(props.value.as_text()),
        props,
    )
}

fn choices(props: &FieldProps<'_>, group: Option<&OptionGroup>, input_type: &str) -> Element {
    let vertical = props.options.vertical();
    let entries = group.into_iter().flat_map(OptionGroup::iter);
    let items = entries.map(|(key, label)| {
        Element::new("label")
            .class(input_type)
            .child(
                Element::new("input")
                    .attr("type", input_type)
                    .attr("name", props.control_id)
                    .attr("value", key)
                    .flag("checked", props.value.contains(key))
                    .flag("disabled", props.read_only || props.disabled),
            )
            .text(label)
    });
    Element::new("div")
        .class("group")
        .class(if vertical { "vertical" } else { "" })
        .children(items)
}

fn select(props: &FieldProps<'_>, group: Option<&OptionGroup>, multiple: bool) -> Element {
    let entries = group.into_iter().flat_map(OptionGroup::iter);
    let options = entries.map(|(key, label)| {
        Element::new("option")
            .attr("value", key)
            .flag("selected", props.value.contains(key))
            .text(label)
    });
    Element::new("select")
        .attr("id", props.control_id)
        .flag("multiple", multiple)
        .flag("disabled", props.read_only || props.disabled)
        .children(options)
}
