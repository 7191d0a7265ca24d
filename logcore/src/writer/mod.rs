// Sink contracts consumed by the dispatcher, plus the console and file sinks.

use crate::error::Result;

use chrono::Local;

pub mod console;
pub mod file;

pub use console::{stderr_writer, stdout_writer, ColorMode, ConsoleWriter};
pub use file::{file_writer, FileWriter, FileWriterFactory};

/// Line separator appended to every rendered message.
#[cfg(windows)]
pub const LINE_SEPARATOR: &str = "\r\n";
/// Line separator appended to every rendered message.
#[cfg(not(windows))]
pub const LINE_SEPARATOR: &str = "\n";

/// The final destination for rendered log lines.
///
/// At most one drain task owns a writer at a time, so implementations need no
/// internal locking.
pub trait Writer: Send {
  /// Writes one rendered line. `line` already carries its line separator.
  fn write(&mut self, line: &str) -> Result<()>;

  /// Flushes and releases the sink.
  fn close(&mut self) -> Result<()>;
}

/// Produces a fresh [`Writer`] each time a drain task starts.
///
/// An `Err` means no usable sink is available right now.
pub trait WriterFactory: Send + Sync {
  fn create(&self) -> Result<Box<dyn Writer>>;
}

impl<F> WriterFactory for F
where
  F: Fn() -> Result<Box<dyn Writer>> + Send + Sync,
{
  fn create(&self) -> Result<Box<dyn Writer>> {
    self()
  }
}

/// A writer that accepts and discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardWriter;

impl Writer for DiscardWriter {
  fn write(&mut self, _line: &str) -> Result<()> {
    Ok(())
  }

  fn close(&mut self) -> Result<()> {
    Ok(())
  }
}

/// Factory for [`DiscardWriter`].
pub fn discard_writer() -> impl WriterFactory {
  || -> Result<Box<dyn Writer>> { Ok(Box::new(DiscardWriter)) }
}

/// Formats the local wall-clock prefix `YYYY/MM/DD HH:MM:SS ` used by the
/// console and file sinks.
pub(crate) fn timestamp_prefix() -> String {
  Local::now().format("%Y/%m/%d %H:%M:%S ").to_string()
}
