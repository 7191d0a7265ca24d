// src/subscriber/dispatcher.rs
// The asynchronous dispatcher: a lossy bounded buffer in front of a drain
// thread that is spawned on demand and exits when idle.

use crate::error_handling::{ErrorReporter, InternalErrorSource};
use crate::model::Message;
use crate::registry::Handler;
use crate::writer::{Writer, WriterFactory, LINE_SEPARATOR};

use crossbeam_channel::{self as channel, Receiver, Sender};
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Default number of messages buffered between drains.
pub const DEFAULT_BUFFER_CAPACITY: usize = 16;
/// Default tick period of the idle check.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60);
/// Default pause before respawning after the writer factory failed.
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_secs(1);

const DRAIN_THREAD_NAME: &str = "fibre-logcore-drain";
const MIN_IDLE_TIMEOUT: Duration = Duration::from_millis(1);

/// Snapshot of a dispatcher's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatcherState {
  /// No drain task is running.
  Idle,
  /// A drain task holds the permit.
  Draining,
  /// `close` was called and a drain task has not yet observed it.
  ShuttingDown,
  /// `close` was called and no drain task is left. Nothing is accepted or
  /// written any more.
  Closed,
}

/// Why a drain task stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DrainExit {
  /// A full tick passed without a single write.
  Idle,
  /// The liveness signal fired.
  Cancelled,
  /// The writer factory produced no sink.
  NoSink,
}

/// Builder for [`Dispatcher`].
pub struct DispatcherBuilder {
  factory: Box<dyn WriterFactory>,
  buffer_capacity: usize,
  idle_timeout: Duration,
  retry_backoff: Duration,
  reporter: ErrorReporter,
}

impl DispatcherBuilder {
  pub fn new<F>(factory: F) -> Self
  where
    F: WriterFactory + 'static,
  {
    Self {
      factory: Box::new(factory),
      buffer_capacity: DEFAULT_BUFFER_CAPACITY,
      idle_timeout: DEFAULT_IDLE_TIMEOUT,
      retry_backoff: DEFAULT_RETRY_BACKOFF,
      reporter: ErrorReporter::stderr(),
    }
  }

  /// Sets how many messages may wait for the drain task. At least one.
  pub fn buffer_capacity(mut self, capacity: usize) -> Self {
    self.buffer_capacity = capacity.max(1);
    self
  }

  /// Sets the idle-check period. A drain task exits on the first tick that
  /// follows a full period without writes.
  pub fn idle_timeout(mut self, timeout: Duration) -> Self {
    self.idle_timeout = timeout.max(MIN_IDLE_TIMEOUT);
    self
  }

  /// Sets how long `handle` waits before retrying after the writer factory
  /// failed. Zero retries on every call.
  pub fn retry_backoff(mut self, backoff: Duration) -> Self {
    self.retry_backoff = backoff;
    self
  }

  /// Sets where sink failures are reported.
  pub fn error_reporter(mut self, reporter: ErrorReporter) -> Self {
    self.reporter = reporter;
    self
  }

  pub fn build(self) -> Dispatcher {
    let (tx, rx) = channel::bounded(self.buffer_capacity);
    // Nothing is ever sent on this channel; dropping the sender disconnects
    // it, which makes every receive on it ready for good.
    let (done_tx, done_rx) = channel::bounded(0);

    Dispatcher {
      shared: Arc::new(Shared {
        factory: self.factory,
        tx,
        rx,
        running: AtomicBool::new(false),
        closed: AtomicBool::new(false),
        done_tx: Mutex::new(Some(done_tx)),
        done_rx,
        idle_timeout: self.idle_timeout,
        retry_backoff: self.retry_backoff,
        epoch: Instant::now(),
        sink_failed_at: AtomicU64::new(0),
        reporter: self.reporter,
      }),
    }
  }
}

impl fmt::Debug for DispatcherBuilder {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("DispatcherBuilder")
      .field("buffer_capacity", &self.buffer_capacity)
      .field("idle_timeout", &self.idle_timeout)
      .field("retry_backoff", &self.retry_backoff)
      .finish_non_exhaustive()
  }
}

/// A [`Handler`] that relays messages to a sink on a background thread.
///
/// `handle` never blocks: the message is offered to a bounded buffer (and
/// dropped if it is full), then a drain thread is started unless one already
/// holds the single permit. The drain thread opens a sink from the writer
/// factory, writes buffered messages in FIFO order and exits after an idle
/// period, on [`close`](Dispatcher::close), or when no sink can be created.
///
/// Dropping the dispatcher closes it.
pub struct Dispatcher {
  shared: Arc<Shared>,
}

impl Dispatcher {
  /// Creates a dispatcher with default settings.
  pub fn new<F>(factory: F) -> Self
  where
    F: WriterFactory + 'static,
  {
    DispatcherBuilder::new(factory).build()
  }

  pub fn builder<F>(factory: F) -> DispatcherBuilder
  where
    F: WriterFactory + 'static,
  {
    DispatcherBuilder::new(factory)
  }

  /// Sets the liveness signal. A running drain task exits at its next wait;
  /// messages still buffered are not written. Calling it again is a no-op.
  pub fn close(&self) -> crate::Result<()> {
    self.shared.closed.store(true, Ordering::Release);
    drop(self.shared.done_tx.lock().take());
    Ok(())
  }

  pub fn state(&self) -> DispatcherState {
    let running = self.shared.running.load(Ordering::Acquire);
    match (self.shared.is_closed(), running) {
      (true, true) => DispatcherState::ShuttingDown,
      (true, false) => DispatcherState::Closed,
      (false, true) => DispatcherState::Draining,
      (false, false) => DispatcherState::Idle,
    }
  }

  /// Number of messages waiting in the buffer.
  pub fn buffered(&self) -> usize {
    self.shared.rx.len()
  }

  pub fn capacity(&self) -> usize {
    self.shared.rx.capacity().unwrap_or(DEFAULT_BUFFER_CAPACITY)
  }
}

impl Handler for Dispatcher {
  fn handle(&self, msg: Box<dyn Message>) {
    if self.shared.is_closed() {
      return;
    }

    // A full buffer drops the newest message.
    let _ = self.shared.tx.try_send(msg);

    Shared::spawn_drain(&self.shared);
  }
}

impl Drop for Dispatcher {
  fn drop(&mut self) {
    let _ = self.close();
  }
}

impl fmt::Debug for Dispatcher {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Dispatcher")
      .field("state", &self.state())
      .field("buffered", &self.buffered())
      .finish_non_exhaustive()
  }
}

struct Shared {
  factory: Box<dyn WriterFactory>,
  tx: Sender<Box<dyn Message>>,
  rx: Receiver<Box<dyn Message>>,
  /// The drain permit: `true` while a drain task is running.
  running: AtomicBool,
  closed: AtomicBool,
  done_tx: Mutex<Option<Sender<()>>>,
  done_rx: Receiver<()>,
  idle_timeout: Duration,
  retry_backoff: Duration,
  epoch: Instant,
  /// Nanoseconds since `epoch` of the last failed sink creation, plus one.
  /// Zero when the last creation succeeded.
  sink_failed_at: AtomicU64,
  reporter: ErrorReporter,
}

/// Returns the drain permit when dropped, including during a panic unwind.
struct Permit<'a> {
  running: &'a AtomicBool,
}

impl Drop for Permit<'_> {
  fn drop(&mut self) {
    self.running.store(false, Ordering::Release);
  }
}

impl Shared {
  fn is_closed(&self) -> bool {
    self.closed.load(Ordering::Acquire)
  }

  fn try_acquire(&self) -> bool {
    self
      .running
      .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
      .is_ok()
  }

  fn in_backoff(&self) -> bool {
    let failed_at = self.sink_failed_at.load(Ordering::Acquire);
    if failed_at == 0 || self.retry_backoff.is_zero() {
      return false;
    }
    let since_failure = self.elapsed_nanos().saturating_sub(failed_at - 1);
    since_failure < self.retry_backoff.as_nanos() as u64
  }

  fn elapsed_nanos(&self) -> u64 {
    u64::try_from(self.epoch.elapsed().as_nanos()).unwrap_or(u64::MAX)
  }

  /// Starts a drain thread if the permit is free.
  fn spawn_drain(shared: &Arc<Shared>) {
    if shared.is_closed() || shared.in_backoff() || !shared.try_acquire() {
      return;
    }

    let task_shared = Arc::clone(shared);
    let spawned = thread::Builder::new()
      .name(DRAIN_THREAD_NAME.to_string())
      .spawn(move || Shared::drain_task(task_shared));

    if let Err(e) = spawned {
      shared.running.store(false, Ordering::Release);
      shared
        .reporter
        .report(InternalErrorSource::TaskSpawn, &e, None);
    }
  }

  /// Body of a drain thread. The caller already holds the permit.
  fn drain_task(shared: Arc<Shared>) {
    loop {
      let exit = {
        let _permit = Permit {
          running: &shared.running,
        };
        shared.run()
      };

      // A message may have been enqueued after the last idle tick but before
      // the permit was released; its producer saw the permit taken.
      let resume = exit == DrainExit::Idle
        && !shared.is_closed()
        && !shared.rx.is_empty()
        && shared.try_acquire();
      if !resume {
        return;
      }
    }
  }

  fn run(&self) -> DrainExit {
    // `close` may land between `handle`'s check and the permit acquisition.
    if self.is_closed() {
      return DrainExit::Cancelled;
    }

    let mut writer = match self.factory.create() {
      Ok(writer) => writer,
      Err(e) => {
        self
          .sink_failed_at
          .store(self.elapsed_nanos().saturating_add(1), Ordering::Release);
        self.reporter.report(
          InternalErrorSource::SinkCreate,
          &e,
          Some(format!("{} message(s) remain buffered", self.rx.len())),
        );
        return DrainExit::NoSink;
      }
    };
    self.sink_failed_at.store(0, Ordering::Release);

    let exit = self.relay(writer.as_mut());

    if let Err(e) = writer.close() {
      self
        .reporter
        .report(InternalErrorSource::SinkClose, &e, None);
    }
    exit
  }

  fn relay(&self, writer: &mut dyn Writer) -> DrainExit {
    let ticker = channel::tick(self.idle_timeout);
    let mut data_written = false;

    loop {
      if self.is_closed() {
        return DrainExit::Cancelled;
      }

      channel::select! {
        recv(self.done_rx) -> _ => return DrainExit::Cancelled,
        recv(self.rx) -> msg => {
          let Ok(msg) = msg else {
            return DrainExit::Cancelled;
          };
          let line = format!("{}{}", msg, LINE_SEPARATOR);
          if let Err(e) = writer.write(&line) {
            self
              .reporter
              .report(InternalErrorSource::SinkWrite, &e, None);
          }
          data_written = true;
        },
        recv(ticker) -> _ => {
          if !data_written {
            return DrainExit::Idle;
          }
          data_written = false;
        },
      }
    }
  }
}
