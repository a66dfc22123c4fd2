//! End-to-end form scenarios, run against every skin.

use std::sync::Arc;

use rstest::rstest;
use serde_json::json;
use shaking_form::{
    ControlEvent, Element, ErrorVisibility, Errors, FieldValue, FormEngine, FormError, FormHost,
    Node, SchemaEntry, SchemaSet, ValidationRules, Values, Widget, WidgetKind,
};
use shaking_form_skins::{bootstrap, plain};

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

fn skin(name: &str) -> shaking_form::FieldTypeRegistry {
    match name {
        "plain" => plain::registry(),
        _ => bootstrap::registry(),
    }
}

fn skinned(schemas: SchemaSet, skin_name: &str) -> FormEngine {
    FormEngine::builder(schemas, skin(skin_name))
        .build()
        .unwrap()
}

fn field<'a>(node: &'a Node, key: &str) -> &'a Element {
    node.find_all(&|e: &Element| e.get_attr("data-field-key") == Some(key))
        .into_iter()
        .next()
        .unwrap()
}

fn shows_error(field: &Element) -> bool {
    field.has_class("validation-error") || field.has_class("has-error")
}

fn username_schema() -> SchemaSet {
    SchemaSet::from_map(vec![(
        "username",
        SchemaEntry::new()
            .label("username")
            .validate(|v| v.is_empty().then(|| "username is required".to_string())),
    )])
    .unwrap()
}

#[rstest]
#[case::plain("plain")]
#[case::bootstrap("bootstrap")]
fn test_username_required_end_to_end(#[case] skin_name: &str) {
    let mut form = FormEngine::builder(username_schema(), skin(skin_name))
        .build()
        .unwrap();
    let mut host = Recorder::default();
    let values = Values::new();

    let html = form.render_html(&values);
    assert!(html.contains(">username</label>"));
    assert!(!html.contains("username is required"));

    let errors = form.submit(&values, &mut host);
    assert_eq!(errors.get("username"), Some("username is required"));
    assert!(host.submits.is_empty());
    assert_eq!(host.errors, vec![errors]);

    let node = form.render(&values);
    assert!(shows_error(field(&node, "username")));
    assert!(node.text_content().contains("username is required"));

    let values = form
        .handle_event(&values, "username", &ControlEvent::input("bob"), &mut host)
        .unwrap()
        .unwrap();
    assert_eq!(host.changes.last(), Some(&values));
    assert_eq!(values.get("username").as_text(), "bob");

    let errors = form.submit(&values, &mut host);
    assert!(errors.is_empty());
    assert_eq!(host.submits, vec![Values::new().with("username", "bob")]);
}

#[rstest]
#[case::plain("plain")]
#[case::bootstrap("bootstrap")]
fn test_radio_choose_replaces_value(#[case] skin_name: &str) {
    let schemas = SchemaSet::from_map(vec![(
        "pet",
        SchemaEntry::new()
            .field_type("group.radio")
            .option("group", json!({"bob": "Bob", "cat": "Cat"})),
    )])
    .unwrap();
    let mut form = skinned(schemas, skin_name);
    let values = Values::new().with("pet", "bob");

    let next = form
        .handle_event(&values, "pet", &ControlEvent::choose("cat"), &mut ())
        .unwrap()
        .unwrap();
    assert_eq!(next.get("pet"), &FieldValue::from("cat"));

    let node = form.render(&next);
    let checked = node.find_all(&|e: &Element| e.has_attr("checked"));
    assert_eq!(checked.len(), 1);
    assert_eq!(checked[0].get_attr("value"), Some("cat"));
}

#[rstest]
#[case::plain("plain")]
#[case::bootstrap("bootstrap")]
fn test_multi_select_deselect(#[case] skin_name: &str) {
    let schemas = SchemaSet::from_map(vec![(
        "countries",
        SchemaEntry::new()
            .field_type("group.select")
            .option("group", json!({"a": "A", "b": "B", "c": "C"}))
            .option("multiple", true),
    )])
    .unwrap();
    let mut form = skinned(schemas, skin_name);
    let values = Values::new().with("countries", vec!["a", "b"]);

    let select_b = ControlEvent::select_many(["b"]);
    let next = form
        .handle_event(&values, "countries", &select_b, &mut ())
        .unwrap()
        .unwrap();
    assert_eq!(next.get("countries"), &FieldValue::list(["b"]));

    let uncheck_a = ControlEvent::toggle("a", false);
    let toggled = form
        .handle_event(&values, "countries", &uncheck_a, &mut ())
        .unwrap()
        .unwrap();
    assert_eq!(toggled.get("countries"), &FieldValue::list(["b"]));
}

#[rstest]
#[case::plain("plain")]
#[case::bootstrap("bootstrap")]
fn test_change_only_touches_one_key(#[case] skin_name: &str) {
    let schemas = SchemaSet::from_map(vec![
        ("username", SchemaEntry::new()),
        ("bio", SchemaEntry::new().field_type("textarea")),
    ])
    .unwrap();
    let mut form = skinned(schemas, skin_name);
    let values = Values::new().with("username", "bob").with("bio", "hi");

    let next = form
        .handle_field_change(&values, "bio", "hello".into(), &mut ())
        .unwrap()
        .unwrap();

    assert_eq!(next.get("username"), values.get("username"));
    assert_eq!(next.get("bio").as_text(), "hello");
    let node = form.render(&next);
    assert_eq!(
        Node::from(field(&node, "bio").clone()).text_content(),
        "hello"
    );
}

fn marked(node: &Node, attr: &str) -> Vec<String> {
    node.find_all(&|e: &Element| e.has_attr(attr))
        .iter()
        .map(|e| e.get_attr("value").unwrap_or_default().to_string())
        .collect()
}

#[rstest]
#[case::plain("plain")]
#[case::bootstrap("bootstrap")]
fn test_single_select_choose_marks_one_option(#[case] skin_name: &str) {
    let schemas = SchemaSet::from_map(vec![(
        "country",
        SchemaEntry::new()
            .field_type("group.select")
            .option("group", json!({"japan": "Japan", "china": "China"})),
    )])
    .unwrap();
    let mut form = skinned(schemas, skin_name);
    let values = Values::new().with("country", "japan");
    assert_eq!(marked(&form.render(&values), "selected"), vec!["japan"]);

    let next = form
        .handle_event(&values, "country", &ControlEvent::choose("china"), &mut ())
        .unwrap()
        .unwrap();
    assert_eq!(next.get("country"), &FieldValue::from("china"));

    let node = form.render(&next);
    assert!(!node.find_tag("select").unwrap().has_attr("multiple"));
    assert_eq!(marked(&node, "selected"), vec!["china"]);
    assert!(marked(&node, "checked").is_empty());
}

#[rstest]
#[case::plain("plain")]
#[case::bootstrap("bootstrap")]
fn test_absent_values_render_nothing_chosen(#[case] skin_name: &str) {
    let form = skinned(every_variant(), skin_name);
    let node = form.render(&Values::new());

    let options = node.find_all(&|e: &Element| e.tag == "option");
    assert_eq!(options.len(), 4);
    let boxes = node.find_all(&|e: &Element| e.get_attr("type") == Some("checkbox"));
    assert_eq!(boxes.len(), 2);
    let radios = node.find_all(&|e: &Element| e.get_attr("type") == Some("radio"));
    assert_eq!(radios.len(), 2);

    assert!(marked(&node, "checked").is_empty());
    assert!(marked(&node, "selected").is_empty());
}

fn grouped(field_type: &str, group: &serde_json::Value) -> SchemaEntry {
    SchemaEntry::new()
        .field_type(field_type)
        .option("group", group.clone())
}

fn every_variant() -> SchemaSet {
    let group = json!({"a": "A", "b": "B"});
    SchemaSet::from_map(vec![
        ("text", SchemaEntry::new()),
        ("email", SchemaEntry::new().field_type("email")),
        ("notes", SchemaEntry::new().field_type("textarea")),
        ("boxes", grouped("group.checkbox", &group)),
        ("radio", grouped("group.radio", &group)),
        ("single", grouped("group.select", &group)),
        ("many", grouped("group.select", &group).option("multiple", true)),
        ("shown", SchemaEntry::new().field_type("static")),
    ])
    .unwrap()
}

fn event_for(kind: WidgetKind) -> ControlEvent {
    match kind {
        WidgetKind::Input | WidgetKind::Textarea | WidgetKind::Static => ControlEvent::input("x"),
        WidgetKind::CheckboxGroup | WidgetKind::SelectGroup { multiple: true } => {
            ControlEvent::toggle("a", true)
        }
        WidgetKind::RadioGroup | WidgetKind::SelectGroup { multiple: false } => {
            ControlEvent::choose("a")
        }
    }
}

#[rstest]
fn test_locked_form_never_emits(
    #[values("plain", "bootstrap")] skin_name: &str,
    #[values(true, false)] read_only: bool,
) {
    let mut form = FormEngine::builder(every_variant(), skin(skin_name))
        .read_only(read_only)
        .disabled(!read_only)
        .build()
        .unwrap();
    let mut host = Recorder::default();
    let values = Values::new();
    let keys: Vec<String> = form.schemas().keys().map(str::to_string).collect();

    for key in &keys {
        let kind = form.controller(key).unwrap().widget().kind();
        let result = form
            .handle_event(&values, key, &event_for(kind), &mut host)
            .unwrap();
        assert_eq!(result, None, "{key} emitted while locked");
    }
    assert!(host.changes.is_empty());

    form.set_read_only(false);
    form.set_disabled(false);
    for key in &keys {
        let kind = form.controller(key).unwrap().widget().kind();
        let result = form
            .handle_event(&values, key, &event_for(kind), &mut host)
            .unwrap();
        assert_eq!(result.is_some(), kind != WidgetKind::Static, "{key}");
    }
}

#[rstest]
#[case::plain("plain")]
#[case::bootstrap("bootstrap")]
fn test_per_field_disabled_only_locks_that_field(#[case] skin_name: &str) {
    let schemas = SchemaSet::from_map(vec![
        ("locked", SchemaEntry::new().disabled(true)),
        ("open", SchemaEntry::new()),
    ])
    .unwrap();
    let mut form = skinned(schemas, skin_name);
    let values = Values::new();

    assert_eq!(
        form.handle_event(&values, "locked", &ControlEvent::input("x"), &mut ())
            .unwrap(),
        None
    );
    assert!(form
        .handle_event(&values, "open", &ControlEvent::input("x"), &mut ())
        .unwrap()
        .is_some());

    let node = form.render(&values);
    assert!(input_disabled(field(&node, "locked")));
    assert!(!input_disabled(field(&node, "open")));
}

fn input_disabled(field: &Element) -> bool {
    Node::from(field.clone())
        .find_tag("input")
        .map(|input| input.has_attr("disabled"))
        .unwrap_or(false)
}

#[rstest]
#[case::plain("plain")]
#[case::bootstrap("bootstrap")]
fn test_always_visibility_shows_errors_before_interaction(#[case] skin_name: &str) {
    let schemas = SchemaSet::from_map(vec![(
        "pet",
        SchemaEntry::new()
            .field_type("group.radio")
            .option("group", json!({"bob": "Bob", "cat": "Cat"}))
            .rules(
                ValidationRules::new()
                    .forbid("bob")
                    .with_message("are you sure?"),
            )
            .unwrap(),
    )])
    .unwrap();
    let form = FormEngine::builder(schemas, skin(skin_name))
        .error_visibility(ErrorVisibility::Always)
        .build()
        .unwrap();

    let node = form.render(&Values::new().with("pet", "bob"));
    assert!(shows_error(field(&node, "pet")));
    assert!(node.text_content().contains("are you sure?"));
}

#[test]
fn test_closure_field_class_maps_static_tags() {
    #[derive(Debug)]
    struct StaticField {
        border: bool,
    }

    impl Widget for StaticField {
        fn kind(&self) -> WidgetKind {
            WidgetKind::Static
        }

        fn render(&self, props: &shaking_form::FieldProps<'_>) -> Node {
            Element::new("div")
                .attr_opt("style", self.border.then_some("border: solid"))
                .child_opt(props.label.map(|l| Element::new("label").text(l)))
                .child(Element::new("div").text(props.value.as_text()))
                .into()
        }
    }

    let mapper = |entry: &SchemaEntry| -> shaking_form::Result<Arc<dyn Widget>> {
        match entry.type_tag() {
            Some("static") => Ok(Arc::new(StaticField { border: false })),
            Some("static.border") => Ok(Arc::new(StaticField { border: true })),
            other => Err(FormError::UnknownFieldType {
                key: entry.key.clone(),
                field_type: other.unwrap_or_default().to_string(),
            }),
        }
    };

    let schemas = SchemaSet::from_list(vec![
        SchemaEntry::new()
            .field_type("static")
            .label("static field"),
        SchemaEntry::new()
            .field_type("static.border")
            .label("border static field"),
    ]);
    let mut form = FormEngine::builder(schemas, mapper).build().unwrap();
    let values = Values::new().with("0", "hello").with("1", "world");

    let node = form.render(&values);
    assert_eq!(field(&node, "0").get_attr("style"), None);
    assert_eq!(field(&node, "1").get_attr("style"), Some("border: solid"));
    assert!(node.text_content().contains("hello"));
    assert!(node.text_content().contains("world"));

    let ignored = form
        .handle_event(&values, "0", &ControlEvent::input("changed"), &mut ())
        .unwrap();
    assert_eq!(ignored, None);

    let unknown = SchemaSet::from_list(vec![SchemaEntry::new().field_type("text")]);
    let err = FormEngine::builder(unknown, mapper).build().unwrap_err();
    assert!(matches!(err, FormError::UnknownFieldType { key, .. } if key == "0"));
}

#[test]
fn test_skins_produce_identical_values() {
    let mut plain_form = FormEngine::builder(every_variant(), plain::registry())
        .build()
        .unwrap();
    let mut bootstrap_form = FormEngine::builder(every_variant(), bootstrap::registry())
        .build()
        .unwrap();
    let values = Values::new();
    let keys: Vec<String> = every_variant().keys().map(str::to_string).collect();

    for key in &keys {
        let kind = plain_form.controller(key).unwrap().widget().kind();
        assert_eq!(
            bootstrap_form.controller(key).unwrap().widget().kind(),
            kind
        );
        let event = event_for(kind);
        let from_plain = plain_form
            .handle_event(&values, key, &event, &mut ())
            .unwrap();
        let from_bootstrap = bootstrap_form
            .handle_event(&values, key, &event, &mut ())
            .unwrap();
        assert_eq!(from_plain, from_bootstrap, "{key}");
    }
}
