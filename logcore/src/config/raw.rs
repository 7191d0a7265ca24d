use serde::Deserialize;

#[derive(Debug, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct InternalErrorReportingRaw {
  #[serde(default)] // Defaults to false if not present
  pub enabled: bool,
  #[serde(default = "default_report_buffer_size")]
  pub buffer_size: usize,
}

fn default_report_buffer_size() -> usize {
  256
}

// --- Top Level Config ---
#[derive(Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigRaw {
  #[serde(default = "default_version")]
  pub version: u32,
  #[serde(default)]
  pub sink: SinkConfigRaw,
  #[serde(default = "default_buffer_capacity")]
  pub buffer_capacity: usize,
  /// Idle-check period, e.g. "1m" or "30s".
  #[serde(default)]
  pub idle_timeout: Option<String>,
  /// Pause before retrying a failed sink, e.g. "1s". "0s" disables it.
  #[serde(default)]
  pub retry_backoff: Option<String>,
  #[serde(default)]
  pub internal_error_reporting: InternalErrorReportingRaw,
}

fn default_version() -> u32 {
  1
}

fn default_buffer_capacity() -> usize {
  crate::subscriber::DEFAULT_BUFFER_CAPACITY
}

// --- Sink Config ---
#[derive(Debug, Deserialize, PartialEq)]
// "kind" determines the enum variant
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum SinkConfigRaw {
  Console(ConsoleSinkConfigRaw),
  File(FileSinkConfigRaw),
  None,
}

impl Default for SinkConfigRaw {
  fn default() -> Self {
    SinkConfigRaw::Console(ConsoleSinkConfigRaw::default())
  }
}

#[derive(Debug, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ConsoleSinkConfigRaw {
  /// "stdout" (default) or "stderr".
  #[serde(default)]
  pub stream: Option<String>,
  /// "auto" (default), "always" or "never".
  #[serde(default)]
  pub color: Option<String>,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileSinkConfigRaw {
  pub path: String,
}

impl Default for ConfigRaw {
  fn default() -> Self {
    Self {
      version: default_version(),
      sink: SinkConfigRaw::default(),
      buffer_capacity: default_buffer_capacity(),
      idle_timeout: None,
      retry_backoff: None,
      internal_error_reporting: Default::default(),
    }
  }
}
