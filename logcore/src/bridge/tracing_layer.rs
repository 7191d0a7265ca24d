// src/bridge/tracing_layer.rs
use super::RegistryRef;
use crate::model::{GeneralMessage, Severity};
use crate::registry::HandlerRegistry;

use std::fmt::{self, Write};
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// A `tracing` layer that records every event as a [`GeneralMessage`].
///
/// The event's `message` field leads the content, other fields follow as
/// `key=value` pairs in recording order.
#[derive(Clone, Default)]
pub struct RecordLayer {
  registry: RegistryRef,
}

impl RecordLayer {
  /// Records into the process-wide registry.
  pub fn global() -> Self {
    Self {
      registry: RegistryRef::Global,
    }
  }

  /// Records into a caller-owned registry.
  pub fn with_registry(registry: Arc<HandlerRegistry>) -> Self {
    Self {
      registry: RegistryRef::Owned(registry),
    }
  }

  fn severity(level: &Level) -> Severity {
    match *level {
      Level::ERROR => Severity::Error,
      Level::WARN => Severity::Warning,
      Level::INFO => Severity::Info,
      _ => Severity::Debug,
    }
  }
}

impl<S> Layer<S> for RecordLayer
where
  S: Subscriber + for<'span> LookupSpan<'span>,
{
  fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
    let mut visitor = ContentVisitor::default();
    event.record(&mut visitor);

    let severity = Self::severity(event.metadata().level());
    let msg = GeneralMessage::new(severity, visitor.finish());
    self.registry.get().record(Box::new(msg));
  }
}

#[derive(Default)]
struct ContentVisitor {
  message: Option<String>,
  fields: String,
}

impl ContentVisitor {
  fn push_field(&mut self, name: &str, value: fmt::Arguments<'_>) {
    if !self.fields.is_empty() {
      self.fields.push(' ');
    }
    let _ = write!(self.fields, "{}={}", name, value);
  }

  fn finish(self) -> String {
    match self.message {
      Some(mut message) if !self.fields.is_empty() => {
        message.push(' ');
        message.push_str(&self.fields);
        message
      }
      Some(message) => message,
      None => self.fields,
    }
  }
}

impl Visit for ContentVisitor {
  fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
    if field.name() == "message" && self.message.is_none() {
      self.message = Some(format!("{:?}", value));
    } else {
      self.push_field(field.name(), format_args!("{:?}", value));
    }
  }

  fn record_str(&mut self, field: &Field, value: &str) {
    if field.name() == "message" && self.message.is_none() {
      self.message = Some(value.to_string());
    } else {
      self.push_field(field.name(), format_args!("{}", value));
    }
  }
}
