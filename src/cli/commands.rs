//! CLI command implementations
//!
//! Each command loads its configuration first, installs logging, registers
//! configured patterns, and only then touches schema or data files.

use std::path::Path;

use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

use crate::convert::{
    amount_to_units, duration_to_milliseconds, duration_to_seconds, string_to_boolean,
};
use crate::observability::TracingObserver;
use crate::patterns::global_snapshot;
use crate::schema::SchemaValidator;
use crate::verify::TreeValidator;

use super::args::{Command, ConvertTarget};
use super::config::Config;
use super::errors::{CliError, CliErrorCode, CliResult};
use super::io::{read_document, write_error, write_response};

/// Environment variable overriding `log_filter`
pub const LOG_ENV: &str = "TREECHECK_LOG";

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    let result = run_command(cli.command);
    if let Err(e) = &result {
        // violations were already written as a normal response
        if e.code() != &CliErrorCode::ValidationFailed {
            write_error(e.code_str(), e.message())?;
        }
    }
    result
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Check {
            schema,
            data,
            root,
            config,
        } => check(&schema, &data, root.as_deref(), config.as_deref()),
        Command::Lint { schema, config } => lint(&schema, config.as_deref()),
        Command::Convert { target } => convert(target),
        Command::Patterns { config } => patterns(config.as_deref()),
    }
}

/// Installs the stderr subscriber once per process
fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));

    // a second install (tests, repeated commands) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn prepare(config_path: Option<&Path>) -> CliResult<Config> {
    let config = Config::resolve(config_path)?;
    init_logging(&config);
    config.register_patterns()?;
    Ok(config)
}

/// Verify a data file against a schema file
///
/// Writes the violations as a response; any violation makes the command fail.
pub fn check(
    schema_path: &Path,
    data_path: &Path,
    root: Option<&str>,
    config_path: Option<&Path>,
) -> CliResult<()> {
    let config = prepare(config_path)?;
    let report = check_report(schema_path, data_path, root, &config)?;

    let violations = report["violations"].as_array().map_or(0, |v| v.len());
    write_response(report)?;

    if violations > 0 {
        return Err(CliError::validation_failed(violations));
    }
    Ok(())
}

/// Builds the `check` response body without writing it
pub fn check_report(
    schema_path: &Path,
    data_path: &Path,
    root: Option<&str>,
    config: &Config,
) -> CliResult<Value> {
    let syntax = read_document(schema_path)?;
    let data = read_document(data_path)?;

    let mut validator = TreeValidator::new(&syntax)?;
    if config.trace_comparisons {
        validator = validator.with_observer(TracingObserver);
    }

    let root = root.unwrap_or(config.root_name.as_str());
    let report = validator.verify(&data, root)?;
    let violations: Vec<&str> = report.lines().collect();

    Ok(json!({
        "valid": violations.is_empty(),
        "violations": violations,
    }))
}

/// Compile a schema file and report its shape
pub fn lint(schema_path: &Path, config_path: Option<&Path>) -> CliResult<()> {
    prepare(config_path)?;
    let syntax = read_document(schema_path)?;

    let registry = global_snapshot();
    let schema = SchemaValidator::new(&registry).compile(&syntax)?;

    write_response(json!({
        "valid": true,
        "root": schema.shape_name(),
    }))
}

/// Convert one value
pub fn convert(target: ConvertTarget) -> CliResult<()> {
    init_logging(&Config::default());
    write_response(convert_value(&target)?)
}

/// Response body for `convert`
pub fn convert_value(target: &ConvertTarget) -> CliResult<Value> {
    let value = match target {
        ConvertTarget::Amount { text, bits } => {
            json!({"input": text, "units": amount_to_units(text, *bits)?, "bits": bits})
        }
        ConvertTarget::Duration { text, millis: true } => {
            json!({"input": text, "milliseconds": duration_to_milliseconds(text)?})
        }
        ConvertTarget::Duration { text, millis: false } => {
            json!({"input": text, "seconds": duration_to_seconds(text)?})
        }
        ConvertTarget::Boolean { text } => {
            json!({"input": text, "value": string_to_boolean(text)})
        }
    };
    Ok(value)
}

/// List every pattern name visible to schemas
pub fn patterns(config_path: Option<&Path>) -> CliResult<()> {
    prepare(config_path)?;
    write_response(json!({ "patterns": global_snapshot().names() }))
}
