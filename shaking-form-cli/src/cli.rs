//! CLI definition for the shaking-form command-line interface.
//!
//! Only depends on `clap` and `std`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Widget skin used to resolve and render fields.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Skin {
    /// Bare markup with `field` / `validation-*` classes
    #[default]
    Plain,
    /// Bootstrap 3 form groups
    Bootstrap,
}

impl std::fmt::Display for Skin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Skin::Plain => write!(f, "plain"),
            Skin::Bootstrap => write!(f, "bootstrap"),
        }
    }
}

/// shaking-form - schema-driven forms
///
/// Render, validate and submit forms described by YAML or JSON schema files.
#[derive(Parser, Debug)]
#[command(name = "shaking-form")]
#[command(version)]
#[command(about = "Render, validate and submit schema-driven forms")]
pub struct Cli {
    /// Enable debug output to stderr
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Form configuration file (TOML, YAML or JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the form as HTML
    Render {
        /// Schema file (YAML or JSON)
        #[arg(short, long)]
        schema: PathBuf,
        /// Values file (YAML or JSON); fields start empty without one
        #[arg(long)]
        values: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = Skin::Plain)]
        skin: Skin,
        /// Render every field read-only
        #[arg(long)]
        read_only: bool,
        /// Render every field disabled
        #[arg(long)]
        disabled: bool,
        /// Show validation state on every field
        #[arg(long)]
        show_errors: bool,
    },
    /// Validate values against the schema; exits 1 when a field fails
    Validate {
        #[arg(short, long)]
        schema: PathBuf,
        #[arg(long)]
        values: PathBuf,
        #[arg(long, value_enum, default_value_t = Skin::Plain)]
        skin: Skin,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run the submit protocol and print each host event as a JSON line
    Submit {
        #[arg(short, long)]
        schema: PathBuf,
        #[arg(long)]
        values: PathBuf,
        #[arg(long, value_enum, default_value_t = Skin::Plain)]
        skin: Skin,
    },
    /// Dispatch one control event to a field and print the resulting values
    Change {
        #[arg(short, long)]
        schema: PathBuf,
        #[arg(long)]
        values: Option<PathBuf>,
        /// Key of the field receiving the event
        #[arg(long)]
        field: String,
        /// Event as JSON, e.g. '{"kind": "toggle", "key": "cat", "checked": true}'
        #[arg(long)]
        event: String,
        #[arg(long, value_enum, default_value_t = Skin::Plain)]
        skin: Skin,
    },
    /// List the field types a skin registers
    Types {
        #[arg(long, value_enum, default_value_t = Skin::Plain)]
        skin: Skin,
    },
}
