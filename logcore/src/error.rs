use std::path::PathBuf;

use thiserror::Error;

/// The main error type for the `fibre_logcore` library.
#[derive(Debug, Error)]
pub enum Error {
  #[error("Failed to open log sink {path:?}: {source}")]
  SinkOpen {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Failed to write to log sink: {0}")]
  SinkWrite(#[source] std::io::Error),

  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),

  #[error("Configuration file not found: {0}")]
  ConfigNotFound(String),

  #[error("Failed to read configuration file {path:?}: {source}")]
  ConfigRead {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Failed to parse configuration: {0}")]
  ConfigParse(String),

  #[error("Invalid configuration value for '{field}': {message}")]
  InvalidConfigValue { field: String, message: String },

  #[error("Unknown severity name: {0:?}")]
  UnknownSeverity(String),

  #[error("Failed to install log bridge: {0}")]
  LogBridgeInit(String),
}

/// A specialized `Result` type for `fibre_logcore` operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
