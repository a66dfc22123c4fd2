//! Field validators.
//!
//! A [`Validator`] is a pure function from a field value to an optional error
//! message. It can wrap any closure, or be compiled from a declarative
//! [`ValidationRules`] table so schemas loaded from YAML or JSON can carry
//! validation too.
//!
//! Validators are never wrapped in `catch_unwind`. A validator that panics
//! is a bug in the schema and the panic reaches the host unchanged.

use std::fmt;
use std::sync::Arc;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{FormError, Result};
use crate::values::FieldValue;

type ValidateFn = dyn Fn(&FieldValue) -> Option<String> + Send + Sync;

/// A pure check run against one field's value at validation time.
#[derive(Clone)]
pub struct Validator(Arc<ValidateFn>);

impl Validator {
    /// Wrap a closure. Returning `None` (or an empty message) means valid.
    pub fn new<F>(check: F) -> Self
    where
        F: Fn(&FieldValue) -> Option<String> + Send + Sync + 'static,
    {
        Validator(Arc::new(check))
    }

    /// Compile a rules table. Fails if `pattern` is not a valid regex.
    pub fn from_rules(rules: ValidationRules) -> Result<Self> {
        let compiled = CompiledRules::compile(rules)?;
        Ok(Validator::new(move |value| compiled.check(value)))
    }

    /// Run the check. Empty messages are normalized to `None`.
    pub fn check(&self, value: &FieldValue) -> Option<String> {
        (self.0)(value).filter(|message| !message.is_empty())
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Validator(..)")
    }
}

impl<'de> Deserialize<'de> for Validator {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let rules = ValidationRules::deserialize(deserializer)?;
        Validator::from_rules(rules).map_err(serde::de::Error::custom)
    }
}

/// Declarative validation rules for one field.
///
/// Checks run in this order and the first failure wins: `required`, length,
/// `pattern`, selection count, `forbidden`. Every check except `required`
/// passes on an empty value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct ValidationRules {
    /// The value must not be empty
    pub required: bool,

    /// Minimum text length in characters
    pub min_length: Option<usize>,

    /// Maximum text length in characters
    pub max_length: Option<usize>,

    /// Regex the text must match
    pub pattern: Option<String>,

    /// Minimum number of selected keys
    pub min_selections: Option<usize>,

    /// Maximum number of selected keys
    pub max_selections: Option<usize>,

    /// Keys that may not be selected
    pub forbidden: Vec<String>,

    /// Message reported instead of the built-in one for any failure
    pub message: Option<String>,
}

impl ValidationRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set string length constraints
    pub fn with_length_range(
        mut self,
        min_length: Option<usize>,
        max_length: Option<usize>,
    ) -> Self {
        self.min_length = min_length;
        self.max_length = max_length;
        self
    }

    /// Set regex pattern validation
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Set selection count constraints for multi-valued fields
    pub fn with_selection_range(
        mut self,
        min_selections: Option<usize>,
        max_selections: Option<usize>,
    ) -> Self {
        self.min_selections = min_selections;
        self.max_selections = max_selections;
        self
    }

    pub fn forbid(mut self, key: impl Into<String>) -> Self {
        self.forbidden.push(key.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

struct CompiledRules {
    rules: ValidationRules,
    pattern: Option<Regex>,
}

impl CompiledRules {
    fn compile(rules: ValidationRules) -> Result<Self> {
        let pattern = match &rules.pattern {
            Some(p) => Some(Regex::new(p).map_err(|e| FormError::InvalidRule {
                message: format!("pattern '{p}': {e}"),
            })?),
            None => None,
        };
        Ok(Self { rules, pattern })
    }

    fn check(&self, value: &FieldValue) -> Option<String> {
        self.first_failure(value)
            .map(|builtin| self.rules.message.clone().unwrap_or(builtin))
    }

    fn first_failure(&self, value: &FieldValue) -> Option<String> {
        let rules = &self.rules;

        if value.is_empty() {
            return rules.required.then(|| "this field is required".to_string());
        }

        if let FieldValue::Text(text) = value {
            let length = text.chars().count();
            if let Some(min) = rules.min_length {
                if length < min {
                    return Some(format!("must be at least {min} characters long"));
                }
            }
            if let Some(max) = rules.max_length {
                if length > max {
                    return Some(format!("must be at most {max} characters long"));
                }
            }
            if let Some(pattern) = &self.pattern {
                if !pattern.is_match(text) {
                    return Some(format!("must match the pattern '{}'", pattern.as_str()));
                }
            }
        }

        let selected = value.keys();
        if let Some(min) = rules.min_selections {
            if selected.len() < min {
                return Some(format!("select at least {min}"));
            }
        }
        if let Some(max) = rules.max_selections {
            if selected.len() > max {
                return Some(format!("select at most {max}"));
            }
        }

        selected
            .iter()
            .find(|key| rules.forbidden.iter().any(|f| f == *key))
            .map(|key| format!("'{key}' is not allowed"))
    }
}
