use crate::error::Error;

use std::fmt;
use std::str::FromStr;

/// The ANSI sequence that restores the terminal's default style.
pub const RESET: &str = "\x1b[0m";

/// Severity of a log message.
///
/// `Custom` is not a real severity. It styles routing annotations such as the
/// trailing `[outbound-tag]` of a connection log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
  Unknown,
  Error,
  Warning,
  Info,
  Debug,
  Custom,
}

impl Severity {
  pub const ALL: [Severity; 6] = [
    Severity::Unknown,
    Severity::Error,
    Severity::Warning,
    Severity::Info,
    Severity::Debug,
    Severity::Custom,
  ];

  /// The display name used inside the `[<Severity>]` tag of a rendered line.
  pub fn name(self) -> &'static str {
    match self {
      Severity::Unknown => "Unknown",
      Severity::Error => "Error",
      Severity::Warning => "Warning",
      Severity::Info => "Info",
      Severity::Debug => "Debug",
      Severity::Custom => "Custom",
    }
  }

  /// The ANSI color-start sequence for this severity.
  pub fn color(self) -> &'static str {
    match self {
      Severity::Unknown => "\x1b[0m",
      Severity::Error => "\x1b[31m",
      Severity::Warning => "\x1b[33m",
      Severity::Info => "\x1b[36m",
      Severity::Debug => "\x1b[34m",
      Severity::Custom => "\x1b[1;33m",
    }
  }
}

impl fmt::Display for Severity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

impl FromStr for Severity {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Severity::ALL
      .into_iter()
      .find(|severity| severity.name() == s)
      .ok_or_else(|| Error::UnknownSeverity(s.to_string()))
  }
}

/// A log message. Anything that renders deterministically through `Display`
/// and can cross threads qualifies.
///
/// Once handed to a handler the message is owned by it and never mutated.
pub trait Message: fmt::Display + Send + Sync + 'static {}

impl<T> Message for T where T: fmt::Display + Send + Sync + 'static {}

/// A general message carrying a severity and arbitrary displayable content.
///
/// The content is rendered lazily, when the drain task stringifies the message.
pub struct GeneralMessage {
  pub severity: Severity,
  pub content: Box<dyn fmt::Display + Send + Sync>,
}

impl GeneralMessage {
  pub fn new<C>(severity: Severity, content: C) -> Self
  where
    C: fmt::Display + Send + Sync + 'static,
  {
    Self {
      severity,
      content: Box::new(content),
    }
  }
}

impl fmt::Display for GeneralMessage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "[{}] {}", self.severity, self.content)
  }
}

impl fmt::Debug for GeneralMessage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("GeneralMessage")
      .field("severity", &self.severity)
      .field("content", &self.content.to_string())
      .finish()
  }
}
