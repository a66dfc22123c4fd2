//! Command implementations.
//!
//! Each command writes its output to `out` and returns the process exit code.
//! Schema, file and config problems are `Err` and map to
//! [`EXIT_ERROR`](crate::EXIT_ERROR) in `main`.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::{presets::UTF8_FULL, Table};
use serde::Serialize;
use shaking_form::{
    ControlEvent, ErrorVisibility, Errors, FieldTypeRegistry, FormConfig, FormEngine, FormHost,
    Values,
};
use shaking_form_skins::{registry_for, STANDARD_TAGS};
use tracing::{debug, info};

use crate::cli::Skin;
use crate::documents::{load_schemas, load_values};
use crate::{EXIT_INVALID, EXIT_OK};

/// The field type registry of `skin`.
pub fn registry(skin: Skin) -> Result<FieldTypeRegistry> {
    registry_for(&skin.to_string())
        .with_context(|| format!("no registry for skin {skin}"))
}

fn build_form(schema: &Path, skin: Skin, config: FormConfig) -> Result<FormEngine> {
    let schemas = load_schemas(schema)?;
    let form = FormEngine::builder(schemas, registry(skin)?)
        .config(config)
        .build()
        .with_context(|| format!("cannot build form from {}", schema.display()))?;
    debug!(%skin, fields = form.controllers().len(), "form ready");
    Ok(form)
}

/// One host callback, as printed by `submit` and `change`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum HostEvent {
    Change { values: Values },
    Submit { values: Values },
    Errors { errors: Errors },
}

/// Host that records every callback in order.
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub events: Vec<HostEvent>,
}

impl FormHost for RecordingHost {
    fn on_change(&mut self, values: Values) {
        self.events.push(HostEvent::Change { values });
    }

    fn on_submit(&mut self, values: &Values) {
        self.events.push(HostEvent::Submit {
            values: values.clone(),
        });
    }

    fn on_errors(&mut self, errors: &Errors) {
        self.events.push(HostEvent::Errors {
            errors: errors.clone(),
        });
    }
}

pub struct RenderOptions<'a> {
    pub schema: &'a Path,
    pub values: Option<&'a Path>,
    pub skin: Skin,
    pub read_only: bool,
    pub disabled: bool,
    pub show_errors: bool,
}

pub fn run_render(
    out: &mut dyn Write,
    opts: RenderOptions<'_>,
    mut config: FormConfig,
) -> Result<i32> {
    config.read_only |= opts.read_only;
    config.disabled |= opts.disabled;
    if opts.show_errors {
        config.error_visibility = ErrorVisibility::Always;
    }
    let form = build_form(opts.schema, opts.skin, config)?;
    let values = load_values(opts.values)?;
    writeln!(out, "{}", form.render_html(&values))?;
    Ok(EXIT_OK)
}

pub fn run_validate(
    out: &mut dyn Write,
    schema: &Path,
    values: &Path,
    skin: Skin,
    config: FormConfig,
    json: bool,
) -> Result<i32> {
    let form = build_form(schema, skin, config)?;
    let values = load_values(Some(values))?;
    let errors = form.validate_all(&values);

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&errors)?)?;
    } else if errors.is_empty() {
        writeln!(out, "valid")?;
    } else {
        for (key, message) in errors.iter() {
            writeln!(out, "{key}: {message}")?;
        }
    }

    info!(failed = errors.len(), "validation finished");
    Ok(if errors.is_empty() {
        EXIT_OK
    } else {
        EXIT_INVALID
    })
}

pub fn run_submit(
    out: &mut dyn Write,
    schema: &Path,
    values: &Path,
    skin: Skin,
    config: FormConfig,
) -> Result<i32> {
    let mut form = build_form(schema, skin, config)?;
    let values = load_values(Some(values))?;
    let mut host = RecordingHost::default();

    let errors = form.submit(&values, &mut host);
    for event in &host.events {
        writeln!(out, "{}", serde_json::to_string(event)?)?;
    }
    Ok(if errors.is_empty() {
        EXIT_OK
    } else {
        EXIT_INVALID
    })
}

#[derive(Debug, Serialize)]
struct ChangeReport {
    changed: bool,
    values: Values,
    events: Vec<HostEvent>,
}

pub struct ChangeOptions<'a> {
    pub schema: &'a Path,
    pub values: Option<&'a Path>,
    pub field: &'a str,
    pub event: &'a str,
    pub skin: Skin,
}

pub fn run_change(
    out: &mut dyn Write,
    opts: ChangeOptions<'_>,
    config: FormConfig,
) -> Result<i32> {
    let event: ControlEvent = serde_json::from_str(opts.event)
        .with_context(|| format!("invalid event: {}", opts.event))?;
    let mut form = build_form(opts.schema, opts.skin, config)?;
    let values = load_values(opts.values)?;
    let mut host = RecordingHost::default();

    let next = form.handle_event(&values, opts.field, &event, &mut host)?;
    let report = ChangeReport {
        changed: next.is_some(),
        values: next.unwrap_or(values),
        events: host.events,
    };
    writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
    Ok(EXIT_OK)
}

pub fn run_types(out: &mut dyn Write, skin: Skin) -> Result<i32> {
    let registry = registry(skin)?;

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Type", "Widget"]);
    table.add_row(vec!["(none)".to_string(), "Input".to_string()]);
    for tag in registry.tags() {
        let widget = STANDARD_TAGS
            .iter()
            .find(|(standard, _)| *standard == tag)
            .map(|(_, widget)| format!("{widget:?}"))
            .unwrap_or_else(|| "custom".to_string());
        table.add_row(vec![tag.to_string(), widget]);
    }

    writeln!(out, "{table}")?;
    writeln!(out)?;
    let count = registry.tags().count();
    writeln!(out, "{count} field type(s) in the {skin} skin")?;
    Ok(EXIT_OK)
}
