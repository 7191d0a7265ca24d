// src/writer/console.rs
use super::{timestamp_prefix, Writer, WriterFactory, LINE_SEPARATOR};
use crate::encoders::color::colorize_line;
use crate::error::{Error, Result};

use std::io::{self, IsTerminal, Write};

/// Whether console output is styled with ANSI escapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
  /// Style only when the stream is attached to a terminal.
  #[default]
  Auto,
  Always,
  Never,
}

impl ColorMode {
  fn resolve(self, is_terminal: bool) -> bool {
    match self {
      ColorMode::Auto => is_terminal,
      ColorMode::Always => true,
      ColorMode::Never => false,
    }
  }
}

/// Standard stream targeted by a [`ConsoleWriterFactory`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleStream {
  Stdout,
  Stderr,
}

/// Writes rendered lines to an output stream, styling them when the stream is
/// a terminal.
pub struct ConsoleWriter<W: Write + Send> {
  out: W,
  is_terminal: bool,
  timestamp: bool,
}

impl<W: Write + Send> ConsoleWriter<W> {
  pub fn new(out: W, is_terminal: bool) -> Self {
    Self {
      out,
      is_terminal,
      timestamp: true,
    }
  }

  /// Toggles the `YYYY/MM/DD HH:MM:SS ` prefix. Enabled by default.
  pub fn with_timestamp(mut self, timestamp: bool) -> Self {
    self.timestamp = timestamp;
    self
  }

  pub fn is_terminal(&self) -> bool {
    self.is_terminal
  }

  pub fn into_inner(self) -> W {
    self.out
  }

  fn render(&self, line: &str) -> String {
    let body = if self.is_terminal {
      colorize_line(line)
    } else {
      line.to_string()
    };

    let mut rendered = if self.timestamp {
      timestamp_prefix()
    } else {
      String::new()
    };
    rendered.push_str(&body);
    if !rendered.ends_with('\n') {
      rendered.push_str(LINE_SEPARATOR);
    }
    rendered
  }
}

impl<W: Write + Send> Writer for ConsoleWriter<W> {
  fn write(&mut self, line: &str) -> Result<()> {
    let rendered = self.render(line);
    self
      .out
      .write_all(rendered.as_bytes())
      .map_err(Error::SinkWrite)
  }

  fn close(&mut self) -> Result<()> {
    self.out.flush().map_err(Error::SinkWrite)
  }
}

/// Creates console writers bound to stdout or stderr.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleWriterFactory {
  stream: ConsoleStream,
  color: ColorMode,
}

impl ConsoleWriterFactory {
  pub fn new(stream: ConsoleStream) -> Self {
    Self {
      stream,
      color: ColorMode::Auto,
    }
  }

  pub fn color(mut self, color: ColorMode) -> Self {
    self.color = color;
    self
  }

  pub fn stream(&self) -> ConsoleStream {
    self.stream
  }
}

impl WriterFactory for ConsoleWriterFactory {
  fn create(&self) -> Result<Box<dyn Writer>> {
    let writer: Box<dyn Writer> = match self.stream {
      ConsoleStream::Stdout => {
        let out = io::stdout();
        let styled = self.color.resolve(out.is_terminal());
        Box::new(ConsoleWriter::new(out, styled))
      }
      ConsoleStream::Stderr => {
        let out = io::stderr();
        let styled = self.color.resolve(out.is_terminal());
        Box::new(ConsoleWriter::new(out, styled))
      }
    };
    Ok(writer)
  }
}

/// Factory for console writers on standard output.
pub fn stdout_writer() -> ConsoleWriterFactory {
  ConsoleWriterFactory::new(ConsoleStream::Stdout)
}

/// Factory for console writers on standard error.
pub fn stderr_writer() -> ConsoleWriterFactory {
  ConsoleWriterFactory::new(ConsoleStream::Stderr)
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  fn written(is_terminal: bool, line: &str) -> String {
    let mut writer = ConsoleWriter::new(Vec::new(), is_terminal).with_timestamp(false);
    writer.write(line).unwrap();
    String::from_utf8(writer.into_inner()).unwrap()
  }

  #[test]
  fn non_terminal_output_is_unmodified() {
    let line = "[Error] failed: boom [route1]\n";
    let out = written(false, line);
    assert_eq!(out, line);
    assert!(!out.contains('\x1b'));
  }

  #[test]
  fn terminal_output_is_colorized() {
    let out = written(true, "[Error] failed: boom [route1]\n");
    assert_eq!(
      out,
      "\x1b[31m[Error] failed: boom \x1b[1;33m[route1]\x1b[0m\x1b[0m\n"
    );
  }

  #[test]
  fn missing_terminator_is_added() {
    assert_eq!(written(false, "no newline"), format!("no newline{}", LINE_SEPARATOR));
  }

  #[test]
  fn color_mode_overrides_detection() {
    assert!(ColorMode::Always.resolve(false));
    assert!(!ColorMode::Never.resolve(true));
    assert!(ColorMode::Auto.resolve(true));
  }
}
