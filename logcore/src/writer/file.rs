// src/writer/file.rs
use super::{timestamp_prefix, Writer, WriterFactory, LINE_SEPARATOR};
use crate::error::{Error, Result};

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Appends timestamped lines to a file.
pub struct FileWriter {
  out: Option<BufWriter<File>>,
}

impl FileWriter {
  /// Opens `path` for appending, creating it if absent.
  pub fn open(path: &Path) -> Result<Self> {
    let file = open_append(path)?;
    Ok(Self {
      out: Some(BufWriter::new(file)),
    })
  }
}

impl Writer for FileWriter {
  fn write(&mut self, line: &str) -> Result<()> {
    let Some(out) = self.out.as_mut() else {
      return Err(Error::SinkWrite(std::io::Error::new(
        std::io::ErrorKind::BrokenPipe,
        "file writer is closed",
      )));
    };

    let mut rendered = timestamp_prefix();
    rendered.push_str(line);
    if !rendered.ends_with('\n') {
      rendered.push_str(LINE_SEPARATOR);
    }
    out
      .write_all(rendered.as_bytes())
      .and_then(|_| out.flush())
      .map_err(Error::SinkWrite)
  }

  fn close(&mut self) -> Result<()> {
    match self.out.take() {
      Some(mut out) => out.flush().map_err(Error::SinkWrite),
      None => Ok(()),
    }
  }
}

/// Creates a [`FileWriter`] for a fixed path on every drain task start.
///
/// The file is reopened each time, so it may be rotated or deleted between
/// drain tasks.
#[derive(Debug, Clone)]
pub struct FileWriterFactory {
  path: PathBuf,
}

impl FileWriterFactory {
  pub fn path(&self) -> &Path {
    &self.path
  }
}

impl WriterFactory for FileWriterFactory {
  fn create(&self) -> Result<Box<dyn Writer>> {
    Ok(Box::new(FileWriter::open(&self.path)?))
  }
}

/// Returns a factory appending to `path`.
///
/// Missing parent directories are created and the file is opened once to
/// validate it, so an unusable path fails here rather than on first write.
pub fn file_writer(path: impl AsRef<Path>) -> Result<FileWriterFactory> {
  let path = path.as_ref().to_path_buf();

  if let Some(parent_dir) = path.parent() {
    if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
      fs::create_dir_all(parent_dir).map_err(|source| Error::SinkOpen {
        path: path.clone(),
        source,
      })?;
    }
  }

  drop(open_append(&path)?);
  Ok(FileWriterFactory { path })
}

fn open_append(path: &Path) -> Result<File> {
  let mut options = OpenOptions::new();
  options.create(true).append(true);
  #[cfg(unix)]
  {
    use std::os::unix::fs::OpenOptionsExt;
    options.mode(0o600);
  }
  options.open(path).map_err(|source| Error::SinkOpen {
    path: path.to_path_buf(),
    source,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  #[test]
  fn factory_creates_missing_parent_directories() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("deeper").join("app.log");

    let factory = file_writer(&path).unwrap();
    assert!(path.exists());
    assert_eq!(factory.path(), path.as_path());
  }

  #[test]
  fn factory_fails_fast_on_unopenable_path() {
    let dir = tempdir().unwrap();
    // A directory cannot be opened for appending.
    let result = file_writer(dir.path());
    assert!(matches!(result, Err(Error::SinkOpen { .. })));
  }

  #[test]
  fn each_writer_appends_to_the_same_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("app.log");
    let factory = file_writer(&path).unwrap();

    for text in ["[Info] first\n", "[Info] second\n"] {
      let mut writer = factory.create().unwrap();
      writer.write(text).unwrap();
      writer.close().unwrap();
    }

    let contents = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with("[Info] first"));
    assert!(lines[1].ends_with("[Info] second"));
  }

  #[test]
  fn deleted_file_is_recreated_by_next_writer() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("app.log");
    let factory = file_writer(&path).unwrap();

    fs::remove_file(&path).unwrap();
    let mut writer = factory.create().unwrap();
    writer.write("[Debug] back\n").unwrap();
    writer.close().unwrap();

    assert!(fs::read_to_string(&path).unwrap().ends_with("[Debug] back\n"));
  }

  #[test]
  fn write_after_close_is_an_error() {
    let dir = tempdir().unwrap();
    let mut writer = FileWriter::open(&dir.path().join("app.log")).unwrap();
    writer.close().unwrap();
    assert!(matches!(writer.write("late\n"), Err(Error::SinkWrite(_))));
    assert!(writer.close().is_ok());
  }
}
