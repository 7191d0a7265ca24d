#![allow(dead_code)]

use fibre_logcore::{Result, Writer, WriterFactory};
use parking_lot::Mutex;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

/// Shared state observed by every `ProbeWriter` a `ProbeFactory` creates.
#[derive(Default)]
pub struct Probe {
  pub lines: Mutex<Vec<String>>,
  pub creates: AtomicUsize,
  pub failed_creates: AtomicUsize,
  pub closes: AtomicUsize,
  active: AtomicUsize,
  pub max_active: AtomicUsize,
  pub available: AtomicBool,
  write_delay: Mutex<Option<Duration>>,
  // Each write signals `entered`, then blocks until `release` yields.
  gate: Mutex<Option<(mpsc::Sender<()>, mpsc::Receiver<()>)>>,
  // Same protocol for `close`.
  close_gate: Mutex<Option<(mpsc::Sender<()>, mpsc::Receiver<()>)>>,
}

impl Probe {
  pub fn new() -> Arc<Self> {
    let probe = Self::default();
    probe.available.store(true, Ordering::SeqCst);
    Arc::new(probe)
  }

  pub fn set_write_delay(&self, delay: Duration) {
    *self.write_delay.lock() = Some(delay);
  }

  /// Makes each write block until the returned sender is used (or dropped).
  /// The returned receiver yields once per write entered.
  pub fn install_gate(&self) -> (mpsc::Sender<()>, mpsc::Receiver<()>) {
    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    *self.gate.lock() = Some((entered_tx, release_rx));
    (release_tx, entered_rx)
  }

  /// Like [`install_gate`](Self::install_gate), but holds each `close`.
  pub fn install_close_gate(&self) -> (mpsc::Sender<()>, mpsc::Receiver<()>) {
    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    *self.close_gate.lock() = Some((entered_tx, release_rx));
    (release_tx, entered_rx)
  }

  pub fn lines(&self) -> Vec<String> {
    self.lines.lock().clone()
  }

  pub fn line_count(&self) -> usize {
    self.lines.lock().len()
  }

  pub fn factory(self: &Arc<Self>) -> ProbeFactory {
    ProbeFactory {
      probe: Arc::clone(self),
    }
  }
}

pub struct ProbeFactory {
  probe: Arc<Probe>,
}

impl WriterFactory for ProbeFactory {
  fn create(&self) -> Result<Box<dyn Writer>> {
    if !self.probe.available.load(Ordering::SeqCst) {
      self.probe.failed_creates.fetch_add(1, Ordering::SeqCst);
      return Err(fibre_logcore::Error::Io(io::Error::new(
        io::ErrorKind::NotFound,
        "sink unavailable",
      )));
    }
    self.probe.creates.fetch_add(1, Ordering::SeqCst);
    Ok(Box::new(ProbeWriter {
      probe: Arc::clone(&self.probe),
    }))
  }
}

pub struct ProbeWriter {
  probe: Arc<Probe>,
}

impl Writer for ProbeWriter {
  fn write(&mut self, line: &str) -> Result<()> {
    let now_active = self.probe.active.fetch_add(1, Ordering::SeqCst) + 1;
    self.probe.max_active.fetch_max(now_active, Ordering::SeqCst);

    {
      let gate = self.probe.gate.lock();
      if let Some((entered, release)) = gate.as_ref() {
        let _ = entered.send(());
        let _ = release.recv();
      }
    }
    let delay = *self.probe.write_delay.lock();
    if let Some(delay) = delay {
      thread::sleep(delay);
    }

    self.probe.lines.lock().push(line.to_string());
    self.probe.active.fetch_sub(1, Ordering::SeqCst);
    Ok(())
  }

  fn close(&mut self) -> Result<()> {
    {
      let gate = self.probe.close_gate.lock();
      if let Some((entered, release)) = gate.as_ref() {
        let _ = entered.send(());
        let _ = release.recv();
      }
    }
    self.probe.closes.fetch_add(1, Ordering::SeqCst);
    Ok(())
  }
}

/// Polls `condition` until it holds or five seconds pass.
pub fn wait_for(mut condition: impl FnMut() -> bool) -> bool {
  let deadline = Instant::now() + Duration::from_secs(5);
  while Instant::now() < deadline {
    if condition() {
      return true;
    }
    thread::sleep(Duration::from_millis(5));
  }
  condition()
}
