// src/config/processed.rs
use crate::config::raw::{ConfigRaw, ConsoleSinkConfigRaw, SinkConfigRaw};
use crate::error::{Error, Result};
use crate::subscriber::{DEFAULT_IDLE_TIMEOUT, DEFAULT_RETRY_BACKOFF};
use crate::writer::console::ConsoleStream;
use crate::writer::ColorMode;

use std::path::PathBuf;
use std::time::Duration;

// --- Processed Top Level Config ---
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigInternal {
  pub sink: SinkInternal,
  pub buffer_capacity: usize,
  pub idle_timeout: Duration,
  pub retry_backoff: Duration,
  /// `Some(buffer size)` when internal failures go to a report channel.
  pub error_reporting: Option<usize>,
}

impl Default for ConfigInternal {
  fn default() -> Self {
    Self {
      sink: SinkInternal::Console {
        stream: ConsoleStream::Stdout,
        color: ColorMode::Auto,
      },
      buffer_capacity: crate::subscriber::DEFAULT_BUFFER_CAPACITY,
      idle_timeout: DEFAULT_IDLE_TIMEOUT,
      retry_backoff: DEFAULT_RETRY_BACKOFF,
      error_reporting: None,
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SinkInternal {
  Console { stream: ConsoleStream, color: ColorMode },
  File { path: PathBuf },
  Discard,
}

// --- Conversion and Validation Logic ---

/// Processes the raw, deserialized configuration into a validated internal representation.
pub fn process_raw_config(raw_config: ConfigRaw) -> Result<ConfigInternal> {
  if raw_config.version != 1 {
    return Err(Error::InvalidConfigValue {
      field: "version".to_string(),
      message: format!("Unsupported config version {}.", raw_config.version),
    });
  }

  if raw_config.buffer_capacity == 0 {
    return Err(Error::InvalidConfigValue {
      field: "buffer_capacity".to_string(),
      message: "Buffer capacity must be at least 1.".to_string(),
    });
  }

  let sink = match raw_config.sink {
    SinkConfigRaw::Console(console) => process_console_sink(console)?,
    SinkConfigRaw::File(file) => {
      if file.path.trim().is_empty() {
        return Err(Error::InvalidConfigValue {
          field: "sink.path".to_string(),
          message: "File sink path cannot be empty.".to_string(),
        });
      }
      SinkInternal::File {
        path: PathBuf::from(file.path),
      }
    }
    SinkConfigRaw::None => SinkInternal::Discard,
  };

  let idle_timeout = match raw_config.idle_timeout.as_deref() {
    Some(value) => parse_duration("idle_timeout", value)?,
    None => DEFAULT_IDLE_TIMEOUT,
  };
  if idle_timeout.is_zero() {
    return Err(Error::InvalidConfigValue {
      field: "idle_timeout".to_string(),
      message: "Idle timeout must be greater than zero.".to_string(),
    });
  }

  let retry_backoff = match raw_config.retry_backoff.as_deref() {
    Some(value) => parse_duration("retry_backoff", value)?,
    None => DEFAULT_RETRY_BACKOFF,
  };

  let error_reporting = if raw_config.internal_error_reporting.enabled {
    Some(raw_config.internal_error_reporting.buffer_size.max(1))
  } else {
    None
  };

  Ok(ConfigInternal {
    sink,
    buffer_capacity: raw_config.buffer_capacity,
    idle_timeout,
    retry_backoff,
    error_reporting,
  })
}

fn process_console_sink(raw: ConsoleSinkConfigRaw) -> Result<SinkInternal> {
  let stream = match raw.stream.as_deref().map(str::to_lowercase).as_deref() {
    None | Some("stdout") => ConsoleStream::Stdout,
    Some("stderr") => ConsoleStream::Stderr,
    Some(other) => {
      return Err(Error::InvalidConfigValue {
        field: "sink.stream".to_string(),
        message: format!("Unknown stream '{}'. Expected 'stdout' or 'stderr'.", other),
      })
    }
  };

  let color = match raw.color.as_deref().map(str::to_lowercase).as_deref() {
    None | Some("auto") => ColorMode::Auto,
    Some("always") => ColorMode::Always,
    Some("never") => ColorMode::Never,
    Some(other) => {
      return Err(Error::InvalidConfigValue {
        field: "sink.color".to_string(),
        message: format!(
          "Unknown color mode '{}'. Expected 'auto', 'always' or 'never'.",
          other
        ),
      })
    }
  };

  Ok(SinkInternal::Console { stream, color })
}

fn parse_duration(field: &str, value: &str) -> Result<Duration> {
  humantime::parse_duration(value.trim()).map_err(|e| Error::InvalidConfigValue {
    field: field.to_string(),
    message: format!("Invalid duration '{}': {}", value, e),
  })
}
