// Contains the public initialization functions for fibre_logcore.

use crate::config::processed::{process_raw_config, ConfigInternal, SinkInternal};
use crate::config::raw::ConfigRaw;
use crate::error::{Error, Result};
use crate::error_handling::{ErrorReporter, InternalErrorReport};
use crate::registry::{register_handler, Handler};
use crate::subscriber::{Dispatcher, DispatcherBuilder};
use crate::writer::console::ConsoleWriterFactory;
use crate::writer::{discard_writer, file_writer};

use fibre::mpsc::BoundedReceiver;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const DEFAULT_CONFIG_BASE_NAME: &str = "fibre_logcore";
const DEFAULT_CONFIG_EXTENSION: &str = "yaml";

/// The dispatcher installed by an `init_*` call.
///
/// Dropping it closes the dispatcher. The registry keeps its own reference,
/// so records are still accepted but no longer written.
#[must_use = "Dropping the InitResult closes the installed dispatcher"]
pub struct InitResult {
  pub dispatcher: Arc<Dispatcher>,
  /// Receives internal failure reports when error reporting is enabled.
  pub internal_error_rx: Option<BoundedReceiver<InternalErrorReport>>,
}

impl Drop for InitResult {
  fn drop(&mut self) {
    let _ = self.dispatcher.close();
  }
}

/// Finds the configuration file based on an optional environment suffix.
///
/// Looks in the working directory for `fibre_logcore.<env>.yaml`, then
/// `fibre_logcore.yaml`. The environment comes from the argument, `FIBRE_ENV`
/// or `APP_ENV`, in that order.
pub fn find_config_file(environment_suffix: Option<&str>) -> Result<PathBuf> {
  find_config_file_in(Path::new("."), environment_suffix)
}

fn find_config_file_in(dir: &Path, environment_suffix: Option<&str>) -> Result<PathBuf> {
  let env_name = environment_suffix
    .map(str::to_string)
    .or_else(|| env::var("FIBRE_ENV").ok())
    .or_else(|| env::var("APP_ENV").ok())
    .filter(|s| !s.is_empty());

  let mut candidates = Vec::with_capacity(2);
  if let Some(env_name) = &env_name {
    candidates.push(format!(
      "{}.{}.{}",
      DEFAULT_CONFIG_BASE_NAME, env_name, DEFAULT_CONFIG_EXTENSION
    ));
  }
  candidates.push(format!("{}.{}", DEFAULT_CONFIG_BASE_NAME, DEFAULT_CONFIG_EXTENSION));

  candidates
    .iter()
    .map(|name| dir.join(name))
    .find(|path| path.is_file())
    .ok_or_else(|| {
      Error::ConfigNotFound(format!(
        "Searched for: {:?} in {:?}. Provide a config file or check FIBRE_ENV/APP_ENV.",
        candidates, dir
      ))
    })
}

/// Parses a configuration file. `.json` files are read as JSON, anything
/// else as YAML.
pub fn load_config_file(config_path: &Path) -> Result<ConfigInternal> {
  let text = fs::read_to_string(config_path).map_err(|source| Error::ConfigRead {
    path: config_path.to_path_buf(),
    source,
  })?;

  let is_json = config_path
    .extension()
    .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
  let raw_config: ConfigRaw = if is_json {
    serde_json::from_str(&text).map_err(|e| Error::ConfigParse(e.to_string()))?
  } else {
    serde_yaml::from_str(&text).map_err(|e| Error::ConfigParse(e.to_string()))?
  };

  process_raw_config(raw_config)
}

/// Initializes `fibre_logcore` from a configuration file path.
pub fn init_from_file(config_path: &Path) -> Result<InitResult> {
  println!(
    "[fibre_logcore] Initializing from config file: {:?}",
    config_path
  );
  let config = load_config_file(config_path)?;
  init_from_config(config)
}

/// Builds the dispatcher described by `config` and installs it as the
/// process-wide handler.
pub fn init_from_config(config: ConfigInternal) -> Result<InitResult> {
  let (dispatcher, internal_error_rx) = build_dispatcher(&config)?;
  let dispatcher = Arc::new(dispatcher);

  register_handler(dispatcher.clone() as Arc<dyn Handler>);
  println!("[fibre_logcore] Handler registered ({:?} sink).", config.sink);

  Ok(InitResult {
    dispatcher,
    internal_error_rx,
  })
}

/// Builds the dispatcher described by `config` without registering it.
pub fn build_dispatcher(
  config: &ConfigInternal,
) -> Result<(Dispatcher, Option<BoundedReceiver<InternalErrorReport>>)> {
  let (reporter, internal_error_rx) = match config.error_reporting {
    Some(buffer_size) => {
      let (reporter, rx) = ErrorReporter::channel(buffer_size);
      (reporter, Some(rx))
    }
    None => (ErrorReporter::stderr(), None),
  };

  let builder = match &config.sink {
    SinkInternal::Console { stream, color } => {
      DispatcherBuilder::new(ConsoleWriterFactory::new(*stream).color(*color))
    }
    SinkInternal::File { path } => DispatcherBuilder::new(file_writer(path)?),
    SinkInternal::Discard => DispatcherBuilder::new(discard_writer()),
  };

  let dispatcher = builder
    .buffer_capacity(config.buffer_capacity)
    .idle_timeout(config.idle_timeout)
    .retry_backoff(config.retry_backoff)
    .error_reporter(reporter)
    .build();

  Ok((dispatcher, internal_error_rx))
}
