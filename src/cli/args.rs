//! CLI argument definitions using clap
//!
//! Commands:
//! - treecheck check --schema <file> --data <file> [--root <name>] [--config <path>]
//! - treecheck lint --schema <file> [--config <path>]
//! - treecheck convert amount|duration|boolean <text>
//! - treecheck patterns [--config <path>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// treecheck - schema-driven validation of configuration trees
#[derive(Parser, Debug)]
#[command(name = "treecheck")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Verify a data file against a schema file
    Check {
        /// Schema file (YAML, or JSON with a .json extension)
        #[arg(long)]
        schema: PathBuf,

        /// Data file (YAML, or JSON with a .json extension)
        #[arg(long)]
        data: PathBuf,

        /// Name of the root node in reported paths
        #[arg(long)]
        root: Option<String>,

        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Compile a schema file and report authoring errors
    Lint {
        #[arg(long)]
        schema: PathBuf,

        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Convert a value the way the built-in patterns read it
    Convert {
        #[command(subcommand)]
        target: ConvertTarget,
    },

    /// List registered pattern names
    Patterns {
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConvertTarget {
    /// Amount such as `10.09K` or `100Kib`
    Amount {
        text: String,

        /// Report data amounts in bits instead of bytes
        #[arg(long)]
        bits: bool,
    },

    /// Duration such as `55ms` or `2m`
    Duration {
        text: String,

        /// Report milliseconds instead of seconds
        #[arg(long)]
        millis: bool,
    },

    /// Boolean word such as `yes` or `off`
    Boolean { text: String },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
