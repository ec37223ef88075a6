//! CLI module for treecheck
//!
//! Provides command-line interface for:
//! - check: verify a data file against a schema file
//! - lint: compile a schema file only
//! - convert: amount, duration and boolean conversions
//! - patterns: list registered pattern names

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command, ConvertTarget};
pub use commands::{check, check_report, convert, convert_value, lint, patterns, run, run_command, LOG_ENV};
pub use config::Config;
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_document, write_error, write_response};
