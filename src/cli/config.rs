//! CLI configuration file
//!
//! A JSON object; every field is optional.
//!
//! ```json
//! {
//!   "root_name": "settings",
//!   "patterns": { "ticket": "^[A-Z]+-[0-9]+$" },
//!   "trace_comparisons": false,
//!   "log_filter": "warn"
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::observability::Event;
use crate::patterns::register_global;

use super::errors::{CliError, CliResult};

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Root segment of reported paths (default "settings")
    #[serde(default = "default_root_name")]
    pub root_name: String,

    /// Extra named patterns, registered globally before any schema is compiled
    #[serde(default)]
    pub patterns: BTreeMap<String, String>,

    /// Emit every scalar comparison at trace level
    #[serde(default)]
    pub trace_comparisons: bool,

    /// tracing filter directive, overridden by TREECHECK_LOG
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_root_name() -> String {
    "settings".to_string()
}

fn default_log_filter() -> String {
    "warn".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_name: default_root_name(),
            patterns: BTreeMap::new(),
            trace_comparisons: false,
            log_filter: default_log_filter(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        debug!(
            event = Event::ConfigLoaded.as_str(),
            path = %path.display(),
            patterns = config.patterns.len()
        );
        Ok(config)
    }

    /// Loads `path` when given, defaults otherwise
    pub fn resolve(path: Option<&Path>) -> CliResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> CliResult<()> {
        if self.root_name.is_empty() {
            return Err(CliError::config_error("root_name must not be empty"));
        }

        EnvFilter::try_new(&self.log_filter).map_err(|e| {
            CliError::config_error(format!("Invalid log_filter '{}': {}", self.log_filter, e))
        })?;

        Ok(())
    }

    /// Registers every configured pattern in the global registry
    pub fn register_patterns(&self) -> CliResult<()> {
        for (name, pattern) in &self.patterns {
            register_global(name, pattern).map_err(|e| {
                CliError::config_error(format!("Invalid pattern '{}': {}", name, e))
            })?;
        }
        Ok(())
    }
}
