//! Schema-driven form engine
//!
//! `shaking-form` turns a declarative schema set into a form. Each schema
//! entry names a type tag; a pluggable field class (usually a
//! [`FieldTypeRegistry`] supplied by a skin crate) resolves the tag to a
//! [`Widget`]. The engine renders the widgets from host-owned [`Values`],
//! merges field changes into a new map, and validates on submit.
//!
//! # Architecture
//!
//! - **Host owns the values**: the engine never stores them; every change is
//!   reported as a complete merged map
//! - **Skins are swappable**: widgets for the same tags behave identically,
//!   only their markup differs
//! - **Validation is pure**: validators are plain functions of a field value
//!   and run only in validation passes, never inside a widget
//! - **Schema errors fail early**: unknown tags and malformed options are
//!   reported when the form is built

pub mod config;
pub mod controller;
pub mod engine;
pub mod error;
pub mod node;
pub mod registry;
pub mod rules;
pub mod types;
pub mod values;
pub mod widget;

pub use config::{ConfigError, ErrorVisibility, FormConfig};
pub use controller::{FieldController, Modifiers, Validation};
pub use engine::{FormBuilder, FormEngine, FormHost};
pub use error::{ErrorSeverity, FormError, Result, Severity};
pub use node::{Element, Node};
pub use registry::{Constructor, FieldClass, FieldTypeRegistry};
pub use rules::{ValidationRules, Validator};
pub use types::{FieldOptions, OptionGroup, SchemaEntry, SchemaSet};
pub use values::{Errors, FieldValue, Values};
pub use widget::{ControlEvent, FieldProps, ValidationState, Widget, WidgetKind};
