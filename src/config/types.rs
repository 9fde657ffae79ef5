use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub runtime: EngineSettings,
    #[serde(default)]
    pub devtools: DevtoolsSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Dispatch engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Number of reported runtime errors kept in memory (default: 100).
    #[serde(default = "default_error_history")]
    pub error_history: usize,
}

/// Devtools mirroring settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DevtoolsSettings {
    /// Number of snapshots kept for time travel (default: 500).
    #[serde(default = "default_max_history")]
    pub max_history: usize,
}

/// Key-value store settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Directory for the file store. Defaults to the platform data dir.
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

/// Tracing subscriber settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset (default: "info").
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Log file. Logging is disabled when unset.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_error_history() -> usize {
    100
}

fn default_max_history() -> usize {
    500
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            error_history: default_error_history(),
        }
    }
}

impl Default for DevtoolsSettings {
    fn default() -> Self {
        Self {
            max_history: default_max_history(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            file: None,
        }
    }
}
