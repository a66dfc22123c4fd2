//! shaking-form command-line interface.
//!
//! Drives a [`shaking_form::FormEngine`] from schema and value files so forms
//! can be rendered and exercised without a host application.

pub mod cli;
pub mod commands;
pub mod documents;

pub use cli::{Cli, Commands, Skin};

/// Exit code when every command step succeeded.
pub const EXIT_OK: i32 = 0;

/// Exit code when the values failed validation.
pub const EXIT_INVALID: i32 = 1;

/// Exit code for usage, schema and I/O errors.
pub const EXIT_ERROR: i32 = 2;
