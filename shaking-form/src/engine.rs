//! The form engine.
//!
//! A [`FormEngine`] resolves one widget per schema entry when it is built and
//! then sits between the host's values and the widgets:
//!
//! - [`FormEngine::render`] turns the host's values into a markup tree
//! - [`FormEngine::handle_field_change`] merges one field's new value and
//!   reports the result through [`FormHost::on_change`]
//! - [`FormEngine::submit`] validates every field and only calls
//!   [`FormHost::on_submit`] when nothing failed
//!
//! The engine never stores the values. The host hands them in on every call
//! and decides what to keep.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, trace};

use crate::config::{ErrorVisibility, FormConfig};
use crate::controller::{FieldController, Modifiers, Validation};
use crate::error::{FormError, Result};
use crate::node::{Element, Node};
use crate::registry::FieldClass;
use crate::types::SchemaSet;
use crate::values::{Errors, FieldValue, Values};
use crate::widget::ControlEvent;

/// Host callbacks. Every method defaults to doing nothing.
pub trait FormHost {
    /// A field changed; `values` is the complete merged map.
    fn on_change(&mut self, values: Values) {
        let _ = values;
    }

    /// A submit attempt passed validation.
    fn on_submit(&mut self, values: &Values) {
        let _ = values;
    }

    /// The result of a validation pass. Empty means valid.
    fn on_errors(&mut self, errors: &Errors) {
        let _ = errors;
    }
}

impl FormHost for () {}

/// Builder for [`FormEngine`].
pub struct FormBuilder {
    schemas: SchemaSet,
    field_class: Arc<dyn FieldClass>,
    config: FormConfig,
}

impl FormBuilder {
    pub fn config(mut self, config: FormConfig) -> Self {
        self.config = config;
        self
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.config.read_only = read_only;
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.config.disabled = disabled;
        self
    }

    pub fn error_visibility(mut self, visibility: ErrorVisibility) -> Self {
        self.config.error_visibility = visibility;
        self
    }

    pub fn live_validation(mut self, live: bool) -> Self {
        self.config.live_validation = live;
        self
    }

    /// Resolve every schema entry to a widget.
    ///
    /// Fails on the first entry whose type is unknown or whose options the
    /// widget rejects.
    pub fn build(self) -> Result<FormEngine> {
        let mut controllers = Vec::with_capacity(self.schemas.len());
        for entry in self.schemas.iter() {
            let widget = self.field_class.resolve(entry)?;
            controllers.push(FieldController::new(entry.clone(), widget));
        }
        info!(fields = controllers.len(), "form built");
        Ok(FormEngine {
            schemas: self.schemas,
            controllers,
            config: self.config,
            touched: HashSet::new(),
            submitted: false,
        })
    }
}

/// A built form: schemas, resolved controllers and interaction state.
#[derive(Debug)]
pub struct FormEngine {
    schemas: SchemaSet,
    controllers: Vec<FieldController>,
    config: FormConfig,
    touched: HashSet<String>,
    submitted: bool,
}

impl FormEngine {
    pub fn builder(schemas: SchemaSet, field_class: impl FieldClass + 'static) -> FormBuilder {
        Self::builder_shared(schemas, Arc::new(field_class))
    }

    /// Builder with an already shared field class.
    pub fn builder_shared(schemas: SchemaSet, field_class: Arc<dyn FieldClass>) -> FormBuilder {
        FormBuilder {
            schemas,
            field_class,
            config: FormConfig::default(),
        }
    }

    pub fn schemas(&self) -> &SchemaSet {
        &self.schemas
    }

    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    pub fn controllers(&self) -> &[FieldController] {
        &self.controllers
    }

    pub fn controller(&self, key: &str) -> Option<&FieldController> {
        self.controllers.iter().find(|c| c.key() == key)
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    pub fn is_touched(&self, key: &str) -> bool {
        self.touched.contains(key)
    }

    /// Switch the form-wide read-only flag; takes effect on the next render.
    pub fn set_read_only(&mut self, read_only: bool) {
        self.config.read_only = read_only;
    }

    /// Switch the form-wide disabled flag; takes effect on the next render.
    pub fn set_disabled(&mut self, disabled: bool) {
        self.config.disabled = disabled;
    }

    fn modifiers(&self) -> Modifiers {
        Modifiers {
            read_only: self.config.read_only,
            disabled: self.config.disabled,
        }
    }

    fn shows_validation(&self, key: &str) -> bool {
        match self.config.error_visibility {
            ErrorVisibility::Always => true,
            ErrorVisibility::AfterInteraction => self.submitted || self.touched.contains(key),
        }
    }

    fn require(&self, key: &str) -> Result<&FieldController> {
        self.controller(key).ok_or_else(|| FormError::UnknownField {
            key: key.to_string(),
        })
    }

    /// Render every field in schema order.
    ///
    /// Validators run here only for fields whose validation is visible under
    /// the configured [`ErrorVisibility`]; widgets never run them.
    pub fn render(&self, values: &Values) -> Node {
        let modifiers = self.modifiers();
        let errors = self.visible_errors(values);

        let fields = self.controllers.iter().map(|controller| {
            let key = controller.key();
            let validation = if !self.shows_validation(key) {
                Validation::Hidden
            } else {
                match errors.get(key) {
                    Some(message) => Validation::Invalid(message),
                    None => Validation::Valid,
                }
            };
            let props = controller.props(values.get(key), validation, modifiers);
            controller.render(&props)
        });

        Element::new("form")
            .class("shaking-form")
            .flag("data-read-only", modifiers.read_only)
            .flag("data-disabled", modifiers.disabled)
            .children(fields)
            .into()
    }

    pub fn render_html(&self, values: &Values) -> String {
        self.render(values).to_html()
    }

    /// Merge a new value for `key`, report it and mark the field touched.
    ///
    /// Returns the merged values, or `None` when the field is locked and the
    /// change was dropped. With live validation on, [`FormHost::on_errors`]
    /// receives the errors of every field whose validation is visible.
    pub fn handle_field_change(
        &mut self,
        values: &Values,
        key: &str,
        value: FieldValue,
        host: &mut dyn FormHost,
    ) -> Result<Option<Values>> {
        if self.require(key)?.locked(self.modifiers()) {
            debug!(key, "change to locked field dropped");
            return Ok(None);
        }

        let merged = values.merge(key, value);
        self.touched.insert(key.to_string());
        trace!(key, "field changed");
        host.on_change(merged.clone());

        if self.config.live_validation {
            let errors = self.visible_errors(&merged);
            host.on_errors(&errors);
        }
        Ok(Some(merged))
    }

    /// Route a control event to the field's widget and apply what it emits.
    pub fn handle_event(
        &mut self,
        values: &Values,
        key: &str,
        event: &ControlEvent,
        host: &mut dyn FormHost,
    ) -> Result<Option<Values>> {
        let controller = self.require(key)?;
        let props = controller.props(values.get(key), Validation::Hidden, self.modifiers());
        match controller.dispatch(&props, event) {
            Some(next) => self.handle_field_change(values, key, next, host),
            None => Ok(None),
        }
    }

    /// Run every field's validator against `values`.
    pub fn validate_all(&self, values: &Values) -> Errors {
        self.validate_where(values, |_| true)
    }

    fn visible_errors(&self, values: &Values) -> Errors {
        self.validate_where(values, |key| self.shows_validation(key))
    }

    fn validate_where<P>(&self, values: &Values, include: P) -> Errors
    where
        P: Fn(&str) -> bool,
    {
        self.controllers
            .iter()
            .filter(|c| include(c.key()))
            .filter_map(|c| {
                let validator = c.entry().validate.as_ref()?;
                validator
                    .check(values.get(c.key()))
                    .map(|message| (c.key().to_string(), message))
            })
            .collect()
    }

    /// Validate the whole form; hand `values` to the host only if it passed.
    ///
    /// [`FormHost::on_errors`] is called either way.
    pub fn submit(&mut self, values: &Values, host: &mut dyn FormHost) -> Errors {
        self.submitted = true;
        let errors = self.validate_all(values);
        if errors.is_empty() {
            info!("form submitted");
            host.on_submit(values);
        } else {
            debug!(failed = errors.len(), "submit blocked by validation");
        }
        host.on_errors(&errors);
        errors
    }

    /// Validate the whole form and report it, without submitting.
    pub fn revalidate(&self, values: &Values, host: &mut dyn FormHost) -> Errors {
        let errors = self.validate_all(values);
        host.on_errors(&errors);
        errors
    }

    /// Forget which fields were touched and whether a submit was attempted.
    pub fn reset(&mut self) {
        self.touched.clear();
        self.submitted = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::FieldTypeRegistry;
    use crate::rules::ValidationRules;
    use crate::types::{OptionGroup, SchemaEntry};
    use crate::widget::{FieldProps, Widget, WidgetKind};

    #[derive(Debug)]
    struct TestWidget {
        kind: WidgetKind,
        group: Option<OptionGroup>,
    }

    impl Widget for TestWidget {
        fn kind(&self) -> WidgetKind {
            self.kind
        }

        fn group(&self) -> Option<&OptionGroup> {
            self.group.as_ref()
        }

        fn render(&self, props: &FieldProps<'_>) -> Node {
            Element::new("div")
                .class("field")
                .class(
                    props
                        .validation_state
                        .map(|s| format!("validation-{}", s.as_str()))
                        .unwrap_or_default(),
                )
                .child(Element::new("input").attr("id", props.control_id))
                .child_opt(props.shown_error().map(|e| Element::new("span").text(e)))
                .into()
        }
    }

    fn registry() -> FieldTypeRegistry {
        FieldTypeRegistry::new("test", |_: &SchemaEntry| {
            Ok(Arc::new(TestWidget {
                kind: WidgetKind::Input,
                group: None,
            }) as Arc<dyn Widget>)
        })
        .register("group.checkbox", |e: &SchemaEntry| {
            Ok(Arc::new(TestWidget {
                kind: WidgetKind::CheckboxGroup,
                group: Some(e.options.group(&e.key)?),
            }) as Arc<dyn Widget>)
        })
    }

    fn login_schemas() -> SchemaSet {
        SchemaSet::from_map(vec![
            (
                "username",
                SchemaEntry::new()
                    .label("username")
                    .rules(ValidationRules::new().required())
                    .unwrap(),
            ),
            (
                "password",
                SchemaEntry::new()
                    .label("password")
                    .rules(
                        ValidationRules::new()
                            .with_length_range(Some(6), None)
                            .with_message("password cannot less than 6 letters"),
                    )
                    .unwrap(),
            ),
        ])
        .unwrap()
    }

    #[derive(Default)]
    struct Recorder {
        changes: Vec<Values>,
        submits: Vec<Values>,
        errors: Vec<Errors>,
    }

    impl FormHost for Recorder {
        fn on_change(&mut self, values: Values) {
            self.changes.push(values);
        }

        fn on_submit(&mut self, values: &Values) {
            self.submits.push(values.clone());
        }

        fn on_errors(&mut self, errors: &Errors) {
            self.errors.push(errors.clone());
        }
    }

    fn login_form() -> FormEngine {
        FormEngine::builder(login_schemas(), registry())
            .build()
            .unwrap()
    }

    fn field<'a>(node: &'a Node, key: &str) -> &'a Element {
        node.find_all(&|e: &Element| e.get_attr("data-field-key") == Some(key))
            .into_iter()
            .next()
            .unwrap()
    }

    #[test]
    fn test_build_resolves_in_schema_order() {
        let form = login_form();
        let keys: Vec<_> = form.controllers().iter().map(|c| c.key()).collect();
        assert_eq!(keys, vec!["username", "password"]);
    }

    #[test]
    fn test_build_fails_on_unknown_type() {
        let schemas = SchemaSet::from_list(vec![SchemaEntry::new().field_type("colour")]);
        let err = FormEngine::builder(schemas, registry())
            .build()
            .unwrap_err();
        assert!(matches!(err, FormError::UnknownFieldType { .. }));
    }

    #[test]
    fn test_build_fails_on_missing_group() {
        let schemas = SchemaSet::from_list(vec![SchemaEntry::new().field_type("group.checkbox")]);
        let err = FormEngine::builder(schemas, registry())
            .build()
            .unwrap_err();
        assert!(matches!(err, FormError::MalformedOptions { .. }));
    }

    #[test]
    fn test_change_merges_without_touching_input() {
        let mut form = login_form();
        let values = Values::new().with("password", "secret");
        let mut host = Recorder::default();

        let merged = form
            .handle_field_change(&values, "username", "bob".into(), &mut host)
            .unwrap()
            .unwrap();

        assert_eq!(values.get("username"), &FieldValue::Empty);
        assert_eq!(merged.get("username").as_text(), "bob");
        assert_eq!(merged.get("password").as_text(), "secret");
        assert_eq!(host.changes, vec![merged]);
        assert!(form.is_touched("username"));
        assert!(!form.is_touched("password"));
    }

    #[test]
    fn test_change_to_unknown_key_is_an_error() {
        let mut form = login_form();
        let err = form
            .handle_field_change(&Values::new(), "nope", "x".into(), &mut ())
            .unwrap_err();
        assert!(matches!(err, FormError::UnknownField { key } if key == "nope"));
    }

    #[test]
    fn test_live_validation_reports_only_touched_fields() {
        let mut form = login_form();
        let mut host = Recorder::default();
        form.handle_field_change(&Values::new(), "password", "abc".into(), &mut host)
            .unwrap();

        let last = host.errors.last().unwrap();
        assert_eq!(
            last.get("password"),
            Some("password cannot less than 6 letters")
        );
        assert!(!last.contains_key("username"));
    }

    #[test]
    fn test_live_validation_can_be_turned_off() {
        let mut form = FormEngine::builder(login_schemas(), registry())
            .live_validation(false)
            .build()
            .unwrap();
        let mut host = Recorder::default();
        form.handle_field_change(&Values::new(), "password", "abc".into(), &mut host)
            .unwrap();
        assert!(host.errors.is_empty());
        assert_eq!(host.changes.len(), 1);
    }

    #[test]
    fn test_submit_with_errors_skips_on_submit() {
        let mut form = login_form();
        let mut host = Recorder::default();
        let values = Values::new().with("password", "abc");

        let errors = form.submit(&values, &mut host);

        assert_eq!(errors.get("username"), Some("this field is required"));
        assert_eq!(
            errors.get("password"),
            Some("password cannot less than 6 letters")
        );
        assert!(host.submits.is_empty());
        assert_eq!(host.errors, vec![errors]);
        assert!(form.is_submitted());
    }

    #[test]
    fn test_submit_when_valid_calls_both_callbacks() {
        let mut form = login_form();
        let mut host = Recorder::default();
        let values = Values::new()
            .with("username", "bob")
            .with("password", "secret!");

        let errors = form.submit(&values, &mut host);

        assert!(errors.is_empty());
        assert_eq!(host.submits, vec![values]);
        assert_eq!(host.errors, vec![Errors::new()]);
    }

    #[test]
    fn test_render_hides_validation_until_interaction() {
        let mut form = login_form();
        let values = Values::new();

        let node = form.render(&values);
        assert!(!field(&node, "username").has_class("validation-error"));
        assert!(!field(&node, "username").has_class("validation-success"));

        form.submit(&values, &mut ());
        let node = form.render(&values);
        let username = field(&node, "username");
        assert!(username.has_class("validation-error"));
        assert!(Node::from(username.clone())
            .text_content()
            .contains("this field is required"));

        form.reset();
        let node = form.render(&values);
        assert!(!field(&node, "username").has_class("validation-error"));
    }

    #[test]
    fn test_render_always_shows_validation_when_configured() {
        let form = FormEngine::builder(login_schemas(), registry())
            .error_visibility(ErrorVisibility::Always)
            .build()
            .unwrap();
        let values = Values::new().with("password", "longenough");
        let node = form.render(&values);
        assert!(field(&node, "username").has_class("validation-error"));
        assert!(field(&node, "password").has_class("validation-success"));
    }

    #[test]
    fn test_touched_field_shows_success_once_fixed() {
        let mut form = login_form();
        let values = form
            .handle_field_change(&Values::new(), "username", "bob".into(), &mut ())
            .unwrap()
            .unwrap();
        let node = form.render(&values);
        assert!(field(&node, "username").has_class("validation-success"));
        assert!(!field(&node, "password").has_class("validation-success"));
    }

    #[test]
    fn test_form_wide_lock_drops_changes_and_events() {
        let mut form = FormEngine::builder(login_schemas(), registry())
            .read_only(true)
            .build()
            .unwrap();
        let mut host = Recorder::default();
        let values = Values::new();

        assert_eq!(
            form.handle_field_change(&values, "username", "bob".into(), &mut host)
                .unwrap(),
            None
        );
        assert_eq!(
            form.handle_event(&values, "username", &ControlEvent::input("bob"), &mut host)
                .unwrap(),
            None
        );
        assert!(host.changes.is_empty());

        form.set_read_only(false);
        assert!(form
            .handle_event(&values, "username", &ControlEvent::input("bob"), &mut host)
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_event_flows_through_widget_into_change() {
        let schemas = SchemaSet::from_map(vec![(
            "pets",
            SchemaEntry::new()
                .field_type("group.checkbox")
                .option("group", serde_json::json!({"bob": "Bob", "cat": "Cat"})),
        )])
        .unwrap();
        let mut form = FormEngine::builder(schemas, registry()).build().unwrap();
        let mut host = Recorder::default();
        let values = Values::new().with("pets", vec!["bob"]);

        let add_cat = ControlEvent::toggle("cat", true);
        let next = form
            .handle_event(&values, "pets", &add_cat, &mut host)
            .unwrap()
            .unwrap();
        assert_eq!(next.get("pets"), &FieldValue::list(["bob", "cat"]));

        let add_zebra = ControlEvent::toggle("zebra", true);
        let ignored = form
            .handle_event(&next, "pets", &add_zebra, &mut host)
            .unwrap();
        assert_eq!(ignored, None);
        assert_eq!(host.changes.len(), 1);
    }

    #[test]
    fn test_revalidate_reports_without_submitting() {
        let form = login_form();
        let mut host = Recorder::default();
        let errors = form.revalidate(&Values::new(), &mut host);
        assert!(errors.contains_key("username"));
        assert!(host.submits.is_empty());
        assert_eq!(host.errors.len(), 1);
        assert!(!form.is_submitted());
    }

    #[test]
    fn test_render_html_is_a_form() {
        let form = login_form();
        let html = form.render_html(&Values::new());
        assert!(html.starts_with("<form class=\"shaking-form\">"));
        assert!(html.contains("data-field-key=\"password\""));
    }
}
