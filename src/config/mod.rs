//! Runtime configuration, read from TOML.

mod loader;
mod types;

pub use loader::ConfigError;
pub use types::{DevtoolsSettings, EngineSettings, LoggingConfig, RuntimeConfig, StorageSettings};
