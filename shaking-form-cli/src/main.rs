//! shaking-form CLI.
//!
//! Commands:
//! - `shaking-form render`: print a form as HTML
//! - `shaking-form validate`: check values against a schema
//! - `shaking-form submit`: run the submit protocol and print host events
//! - `shaking-form change`: dispatch one control event to a field
//! - `shaking-form types`: list the field types of a skin
//!
//! Exit codes:
//! - 0: Success
//! - 1: Values failed validation
//! - 2: Usage, schema, config or I/O error

use std::io::{self, Write};

use clap::Parser;
use shaking_form::FormConfig;
use shaking_form_cli::commands::{self, ChangeOptions, RenderOptions};
use shaking_form_cli::{Cli, Commands, EXIT_ERROR};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    let filter = if cli.debug {
        EnvFilter::new("shaking_form=debug,shaking_form_skins=debug,shaking_form_cli=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let exit_code = result_to_exit(dispatch_command(cli, &mut out));
    let _ = out.flush();
    std::process::exit(exit_code);
}

/// Load the form configuration and run the selected command.
fn dispatch_command(cli: Cli, out: &mut dyn Write) -> anyhow::Result<i32> {
    let config = FormConfig::load(cli.config.as_deref())?;
    tracing::debug!(?config, "form configuration");

    match cli.command {
        Commands::Render {
            schema,
            values,
            skin,
            read_only,
            disabled,
            show_errors,
        } => commands::run_render(
            out,
            RenderOptions {
                schema: &schema,
                values: values.as_deref(),
                skin,
                read_only,
                disabled,
                show_errors,
            },
            config,
        ),
        Commands::Validate {
            schema,
            values,
            skin,
            json,
        } => commands::run_validate(out, &schema, &values, skin, config, json),
        Commands::Submit {
            schema,
            values,
            skin,
        } => commands::run_submit(out, &schema, &values, skin, config),
        Commands::Change {
            schema,
            values,
            field,
            event,
            skin,
        } => commands::run_change(
            out,
            ChangeOptions {
                schema: &schema,
                values: values.as_deref(),
                field: &field,
                event: &event,
                skin,
            },
            config,
        ),
        Commands::Types { skin } => commands::run_types(out, skin),
    }
}

/// Convert a command result to an exit code, reporting errors on stderr.
fn result_to_exit(result: anyhow::Result<i32>) -> i32 {
    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            EXIT_ERROR
        }
    }
}
