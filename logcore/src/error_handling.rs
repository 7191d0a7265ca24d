use fibre::mpsc::{self, BoundedReceiver, BoundedSender};
use std::fmt;

/// Where an internal, non-propagated failure happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalErrorSource {
  /// The writer factory could not produce a sink.
  SinkCreate,
  /// A sink rejected a line.
  SinkWrite,
  /// A sink failed to flush or release on shutdown.
  SinkClose,
  /// The OS refused to start a drain thread.
  TaskSpawn,
}

impl fmt::Display for InternalErrorSource {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      InternalErrorSource::SinkCreate => write!(f, "SinkCreate"),
      InternalErrorSource::SinkWrite => write!(f, "SinkWrite"),
      InternalErrorSource::SinkClose => write!(f, "SinkClose"),
      InternalErrorSource::TaskSpawn => write!(f, "TaskSpawn"),
    }
  }
}

#[derive(Debug)]
pub struct InternalErrorReport {
  pub source: InternalErrorSource,
  pub error_message: String,
  pub context: Option<String>,
  pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl InternalErrorReport {
  pub(crate) fn new<E: std::error::Error + ?Sized>(
    source: InternalErrorSource,
    error: &E,
    context: Option<String>,
  ) -> Self {
    Self {
      source,
      error_message: error.to_string(),
      context,
      timestamp: chrono::Utc::now(),
    }
  }
}

/// Delivers internal failure reports without ever blocking the caller.
///
/// With a channel attached, reports are offered to it and dropped when it is
/// full. Without one, each report becomes a single stderr line.
#[derive(Clone, Default)]
pub struct ErrorReporter {
  tx: Option<BoundedSender<InternalErrorReport>>,
}

impl ErrorReporter {
  /// A reporter that prints to stderr.
  pub fn stderr() -> Self {
    Self { tx: None }
  }

  /// A reporter backed by a bounded channel, returning its receiving half.
  pub fn channel(capacity: usize) -> (Self, BoundedReceiver<InternalErrorReport>) {
    let (tx, rx) = mpsc::bounded(capacity.max(1));
    (Self { tx: Some(tx) }, rx)
  }

  pub(crate) fn report<E: std::error::Error + ?Sized>(
    &self,
    source: InternalErrorSource,
    error: &E,
    context: Option<String>,
  ) {
    match &self.tx {
      Some(tx) => {
        let report = InternalErrorReport::new(source, error, context);
        // Full or closed: the report is dropped, reporting never adds backpressure.
        let _ = tx.try_send(report);
      }
      None => match context {
        Some(context) => eprintln!("[fibre_logcore:ERROR] {}: {} ({})", source, error, context),
        None => eprintln!("[fibre_logcore:ERROR] {}: {}", source, error),
      },
    }
  }
}

impl fmt::Debug for ErrorReporter {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ErrorReporter")
      .field("channel", &self.tx.is_some())
      .finish()
  }
}
