//! The single-slot handler registry and the process-wide instance.
//!
//! Every [`record`] call takes the registry's read lock and forwards the
//! message to whichever [`Handler`] is registered. Registration swaps the slot
//! under the write lock. Neither path performs I/O: the default handler only
//! hands the message to a dispatcher's buffer.

use crate::model::{GeneralMessage, Message, Severity};
use crate::subscriber::Dispatcher;
use crate::writer::stdout_writer;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// The component `record` forwards messages to.
pub trait Handler: Send + Sync {
  /// Accepts a message. Must not block on I/O and must not fail.
  fn handle(&self, msg: Box<dyn Message>);
}

/// A slot holding the active handler, swappable at runtime.
///
/// The registry can be constructed and passed around explicitly; [`global`]
/// is the lifecycle-scoped, process-wide instance.
#[derive(Default)]
pub struct HandlerRegistry {
  slot: RwLock<Option<Arc<dyn Handler>>>,
}

impl HandlerRegistry {
  /// Creates an empty registry. `record` on it is a no-op until a handler is
  /// registered.
  pub fn new() -> Self {
    Self::default()
  }

  /// Creates a registry with `handler` already installed.
  pub fn with_handler(handler: Arc<dyn Handler>) -> Self {
    Self {
      slot: RwLock::new(Some(handler)),
    }
  }

  /// Replaces the active handler. The previous one is dropped.
  ///
  /// # Panics
  ///
  /// Panics when `handler` is `None`. An absent handler is a wiring mistake,
  /// not a runtime condition.
  pub fn register(&self, handler: Option<Arc<dyn Handler>>) {
    let handler = match handler {
      Some(handler) => handler,
      None => panic!("log handler is absent"),
    };
    let previous = self.slot.write().replace(handler);
    // Dropped outside the lock: a dispatcher closes itself on drop.
    drop(previous);
  }

  /// Forwards `msg` to the active handler, or drops it if none is registered.
  pub fn record(&self, msg: Box<dyn Message>) {
    let guard = self.slot.read();
    if let Some(handler) = guard.as_ref() {
      handler.handle(msg);
    }
  }

  pub fn is_registered(&self) -> bool {
    self.slot.read().is_some()
  }
}

impl fmt::Debug for HandlerRegistry {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("HandlerRegistry")
      .field("registered", &self.is_registered())
      .finish()
  }
}

// Boots with a dispatcher over a terminal-aware stdout writer.
static GLOBAL_REGISTRY: Lazy<HandlerRegistry> = Lazy::new(|| {
  let dispatcher: Arc<dyn Handler> = Arc::new(Dispatcher::new(stdout_writer()));
  HandlerRegistry::with_handler(dispatcher)
});

/// Provides a reference to the process-wide registry.
pub fn global() -> &'static HandlerRegistry {
  &GLOBAL_REGISTRY
}

/// Installs `handler` as the process-wide handler, replacing the previous one.
pub fn register_handler(handler: Arc<dyn Handler>) {
  global().register(Some(handler));
}

/// Writes a message into the process-wide log stream.
pub fn record<M: Message>(msg: M) {
  global().record(Box::new(msg));
}

/// Records a [`GeneralMessage`] built from `severity` and `content`.
pub fn record_general<C>(severity: Severity, content: C)
where
  C: fmt::Display + Send + Sync + 'static,
{
  record(GeneralMessage::new(severity, content));
}

#[cfg(test)]
mod tests {
  use super::*;
  use parking_lot::Mutex;

  #[derive(Default)]
  struct Collecting {
    seen: Mutex<Vec<String>>,
  }

  impl Handler for Collecting {
    fn handle(&self, msg: Box<dyn Message>) {
      self.seen.lock().push(msg.to_string());
    }
  }

  #[test]
  fn record_without_handler_is_a_noop() {
    let registry = HandlerRegistry::new();
    assert!(!registry.is_registered());
    registry.record(Box::new("dropped"));
  }

  #[test]
  fn register_replaces_the_previous_handler() {
    let registry = HandlerRegistry::new();
    let first = Arc::new(Collecting::default());
    let second = Arc::new(Collecting::default());

    registry.register(Some(first.clone()));
    registry.record(Box::new(GeneralMessage::new(Severity::Info, "one")));
    registry.register(Some(second.clone()));
    registry.record(Box::new(GeneralMessage::new(Severity::Error, "two")));

    assert_eq!(*first.seen.lock(), vec!["[Info] one".to_string()]);
    assert_eq!(*second.seen.lock(), vec!["[Error] two".to_string()]);
  }

  #[test]
  #[should_panic(expected = "log handler is absent")]
  fn registering_an_absent_handler_panics() {
    HandlerRegistry::new().register(None);
  }
}
