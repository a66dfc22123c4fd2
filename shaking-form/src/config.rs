//! Form-wide configuration loaded with figment.
//!
//! Sources, later ones overriding earlier ones:
//! 1. built-in defaults
//! 2. a config file: the explicit path if one is given, otherwise the first of
//!    `shaking-form.toml`, `shaking-form.yaml`, `shaking-form.yml`,
//!    `shaking-form.json` found in the search directory
//! 3. `SHAKING_FORM_*` environment variables (`SHAKING_FORM_READ_ONLY=true`)

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "SHAKING_FORM_";

/// File stem looked up when no explicit config path is given.
pub const CONFIG_FILE_STEM: &str = "shaking-form";

const EXTENSIONS: &[&str] = &["toml", "yaml", "yml", "json"];

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// The file extension does not name a supported format
    #[error("Unsupported configuration format: {path}")]
    UnsupportedFormat { path: PathBuf },

    /// Configuration parsing failed
    #[error("Failed to parse configuration: {source}")]
    ParseError {
        #[source]
        source: Box<figment::Error>,
    },
}

/// When the engine shows validation results during render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorVisibility {
    /// Only for fields the user changed, or every field once a submit was
    /// attempted.
    #[default]
    AfterInteraction,
    /// For every field on every render.
    Always,
}

/// Form-wide behaviour switches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    /// Every field is read-only
    pub read_only: bool,

    /// Every field is disabled
    pub disabled: bool,

    pub error_visibility: ErrorVisibility,

    /// Run a validation pass and report errors after each change
    pub live_validation: bool,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            read_only: false,
            disabled: false,
            error_visibility: ErrorVisibility::AfterInteraction,
            live_validation: true,
        }
    }
}

impl FormConfig {
    /// Load from an explicit file, or from a config file in the current
    /// directory if one exists, then apply environment overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::load_from(&cwd, explicit)
    }

    /// Like [`FormConfig::load`], searching `dir` instead of the current
    /// directory.
    pub fn load_from(dir: &Path, explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let config = Self::figment(dir, explicit)?
            .extract::<FormConfig>()
            .map_err(|e| ConfigError::ParseError {
                source: Box::new(e),
            })?;
        debug!(?config, "loaded form configuration");
        Ok(config)
    }

    /// The layered figment, before extraction.
    pub fn figment(dir: &Path, explicit: Option<&Path>) -> Result<Figment, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(FormConfig::default()));

        let file = match explicit {
            Some(path) if !path.exists() => {
                return Err(ConfigError::FileNotFound {
                    path: path.to_path_buf(),
                })
            }
            Some(path) => Some(path.to_path_buf()),
            None => discover(dir),
        };
        if let Some(path) = file {
            trace!(path = %path.display(), "merging config file");
            figment = figment.merge(file_provider(&path)?);
        }

        let env = Env::prefixed(ENV_PREFIX).map(|key| key.as_str().to_lowercase().into());
        Ok(figment.merge(env))
    }
}

fn discover(dir: &Path) -> Option<PathBuf> {
    EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{CONFIG_FILE_STEM}.{ext}")))
        .find(|path| path.is_file())
}

fn file_provider(path: &Path) -> Result<Figment, ConfigError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => Ok(Figment::from(Toml::file(path))),
        Some("yaml" | "yml") => Ok(Figment::from(Yaml::file(path))),
        Some("json") => Ok(Figment::from(Json::file(path))),
        _ => Err(ConfigError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}
