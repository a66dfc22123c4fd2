//! Schema and value files.
//!
//! Files ending in `.json` are read as JSON, anything else as YAML.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use shaking_form::{SchemaSet, Values};
use tracing::debug;

fn is_json(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("json")
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

pub fn load_schemas(path: &Path) -> Result<SchemaSet> {
    let source = read(path)?;
    let schemas = if is_json(path) {
        SchemaSet::from_json(&source)
    } else {
        SchemaSet::from_yaml(&source)
    }
    .with_context(|| format!("invalid schema file {}", path.display()))?;
    debug!(path = %path.display(), fields = schemas.len(), "loaded schemas");
    Ok(schemas)
}

/// Load values; without a path every field starts empty.
pub fn load_values(path: Option<&Path>) -> Result<Values> {
    let Some(path) = path else {
        return Ok(Values::new());
    };
    let source = read(path)?;
    let values = if is_json(path) {
        serde_json::from_str::<Values>(&source).map_err(anyhow::Error::from)
    } else {
        serde_yaml_ng::from_str::<Values>(&source).map_err(anyhow::Error::from)
    }
    .with_context(|| format!("invalid values file {}", path.display()))?;
    Ok(values)
}
