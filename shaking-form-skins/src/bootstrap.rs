//! Bootstrap 3 skin.
//!
//! Fields render as `div.form-group` with `has-success` / `has-error`,
//! `label.control-label`, `.form-control` controls and a `span.help-block`
//! for the message. Checkbox and radio groups are inline unless the field
//! sets `options.vertical`.

use std::sync::Arc;

use shaking_form::{
    Element, FieldProps, FieldTypeRegistry, Node, OptionGroup, ValidationState, Widget,
    WidgetKind,
};

use crate::{display_text, standard_registry, WidgetSpec};

/// Inline group items are spaced apart.
const INLINE_STYLE: &str = "margin-right: 1rem";

/// The bootstrap skin with every standard tag.
pub fn registry() -> FieldTypeRegistry {
    standard_registry("bootstrap", |spec| {
        Arc::new(BootstrapWidget(spec)) as Arc<dyn Widget>
    })
}

#[derive(Debug)]
pub struct BootstrapWidget(WidgetSpec);

impl Widget for BootstrapWidget {
    fn kind(&self) -> WidgetKind {
        self.0.kind
    }

    fn group(&self) -> Option<&OptionGroup> {
        self.0.group.as_ref()
    }

    fn render(&self, props: &FieldProps<'_>) -> Node {
        let (control, labelled) = match self.0.kind {
            WidgetKind::Input => (input(props, &self.0.input_type), true),
            WidgetKind::Textarea => (textarea(props), true),
            WidgetKind::CheckboxGroup => (choices(props, self.group(), "checkbox"), false),
            WidgetKind::RadioGroup => (choices(props, self.group(), "radio"), false),
            WidgetKind::SelectGroup { multiple } => (select(props, self.group(), multiple), true),
            WidgetKind::Static => (
                Element::new("p")
                    .class("form-control-static")
                    .text(display_text(props.value)),
                false,
            ),
        };
        form_group(props, control, labelled)
    }
}

fn state_class(state: ValidationState) -> &'static str {
    match state {
        ValidationState::Success => "has-success",
        ValidationState::Error => "has-error",
    }
}

fn form_group(props: &FieldProps<'_>, control: Element, labelled: bool) -> Node {
    Element::new("div")
        .class("form-group")
        .class(props.validation_state.map(state_class).unwrap_or_default())
        .child_opt(props.label.map(|label| {
            Element::new("label")
                .class("control-label")
                .attr_opt("for", labelled.then_some(props.control_id))
                .text(label)
        }))
        .child(control)
        .child_opt(
            props
                .shown_error()
                .map(|message| Element::new("span").class("help-block").text(message)),
        )
        .into()
}

fn form_control(tag: &str, props: &FieldProps<'_>) -> Element {
    Element::new(tag)
        .class("form-control")
        .attr("id", props.control_id)
        .flag("readonly", props.read_only)
        .flag("disabled", props.disabled)
}

fn input(props: &FieldProps<'_>, input_type: &str) -> Element {
    form_control("input", props)
        .attr("type", input_type)
        .attr_opt("placeholder", props.options.placeholder())
        .attr("value", props.value.as_text())
}

fn textarea(props: &FieldProps<'_>) -> Element {
    form_control("textarea", props)
        .attr_opt("placeholder", props.options.placeholder())
        .attr_opt("rows", props.options.rows().map(|rows| rows.to_string()))
        .attr("style", "resize: vertical")
        .text(props.value.as_text())
}

fn choices(props: &FieldProps<'_>, group: Option<&OptionGroup>, input_type: &str) -> Element {
    let vertical = props.options.vertical();
    let locked = props.read_only || props.disabled;
    let entries = group.into_iter().flat_map(OptionGroup::iter);
    let items = entries.map(|(key, label)| {
        let control = Element::new("input")
            .attr("type", input_type)
            .attr("name", props.control_id)
            .attr("value", key)
            .flag("checked", props.value.contains(key))
            .flag("disabled", locked);
        if vertical {
            Element::new("div")
                .class(input_type)
                .class(if locked { "disabled" } else { "" })
                .child(Element::new("label").child(control).text(label))
        } else {
            Element::new("label")
                .class(format!("{input_type}-inline"))
                .class(if locked { "disabled" } else { "" })
                .attr("style", INLINE_STYLE)
                .child(control)
                .text(label)
        }
    });
    Element::new("div").children(items)
}

fn select(props: &FieldProps<'_>, group: Option<&OptionGroup>, multiple: bool) -> Element {
    let entries = group.into_iter().flat_map(OptionGroup::iter);
    let options = entries.map(|(key, label)| {
        Element::new("option")
            .attr("value", key)
            .flag("selected", props.value.contains(key))
            .text(label)
    });
    // A select has no readonly state; locking it means disabling it.
    Element::new("select")
        .class("form-control")
        .attr("id", props.control_id)
        .flag("multiple", multiple)
        .flag("disabled", props.read_only || props.disabled)
        .children(options)
}
