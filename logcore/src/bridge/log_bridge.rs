// src/bridge/log_bridge.rs
use super::RegistryRef;
use crate::error::{Error, Result};
use crate::model::{GeneralMessage, Severity};
use crate::registry::HandlerRegistry;

use log::{Level, LevelFilter, Log, Metadata, Record};
use std::sync::Arc;

/// A `log::Log` implementation that records into a [`HandlerRegistry`].
pub struct LogBridge {
  registry: RegistryRef,
  max_level: LevelFilter,
}

impl LogBridge {
  /// Bridges into the process-wide registry.
  pub fn global(max_level: LevelFilter) -> Self {
    Self {
      registry: RegistryRef::Global,
      max_level,
    }
  }

  /// Bridges into a caller-owned registry.
  pub fn with_registry(registry: Arc<HandlerRegistry>, max_level: LevelFilter) -> Self {
    Self {
      registry: RegistryRef::Owned(registry),
      max_level,
    }
  }

  fn severity(level: Level) -> Severity {
    match level {
      Level::Error => Severity::Error,
      Level::Warn => Severity::Warning,
      Level::Info => Severity::Info,
      Level::Debug | Level::Trace => Severity::Debug,
    }
  }
}

impl Log for LogBridge {
  fn enabled(&self, metadata: &Metadata<'_>) -> bool {
    metadata.level() <= self.max_level
  }

  fn log(&self, record: &Record<'_>) {
    if !self.enabled(record.metadata()) {
      return;
    }
    let msg = GeneralMessage::new(Self::severity(record.level()), record.args().to_string());
    self.registry.get().record(Box::new(msg));
  }

  fn flush(&self) {}
}

/// Installs a [`LogBridge`] over the process-wide registry as the `log`
/// crate's global logger and sets its max level.
pub fn init_log_bridge(max_level: LevelFilter) -> Result<()> {
  log::set_boxed_logger(Box::new(LogBridge::global(max_level)))
    .map_err(|e| Error::LogBridgeInit(e.to_string()))?;
  log::set_max_level(max_level);
  Ok(())
}
