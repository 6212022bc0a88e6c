//! CLI subcommands.

pub mod list;
pub mod reorder;
pub mod seed;

use clap::ValueEnum;
use thiserror::Error;

use landing_cms_admin::config::{BackendConfig, ConfigError};
use landing_cms_admin::editor::EditorError;
use landing_cms_admin::store::{Backend, StoreError};

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Backend configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Content store operation failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Editor operation failed.
    #[error("{0}")]
    Editor(#[from] EditorError),

    /// Seed file could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Seed file is not valid YAML for the expected shape.
    #[error("Invalid seed file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Seed file parsed but failed validation.
    #[error("{0} validation errors found")]
    InvalidSeed(usize),
}

/// Ordered collections addressable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CollectionArg {
    Features,
    Products,
}

/// Anything `list` can print.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListTarget {
    Features,
    Products,
    Sections,
}

/// Connect to the backend configured in the environment.
///
/// # Errors
///
/// Returns an error if configuration is missing or the client fails to build.
pub fn connect() -> Result<Backend, CliError> {
    let _ = dotenvy::dotenv();
    let config = BackendConfig::from_env()?;
    Ok(Backend::from_config(&config)?)
}
