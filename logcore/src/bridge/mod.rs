//! Entry points from the `log` and `tracing` ecosystems.
//!
//! Both bridges turn foreign records into [`GeneralMessage`](crate::GeneralMessage)s
//! and hand them to a [`HandlerRegistry`], the process-wide one by default.

use crate::registry::{global, HandlerRegistry};
use std::sync::Arc;

pub mod log_bridge;
pub mod tracing_layer;

pub use log_bridge::{init_log_bridge, LogBridge};
pub use tracing_layer::RecordLayer;

#[derive(Clone, Default)]
pub(crate) enum RegistryRef {
  #[default]
  Global,
  Owned(Arc<HandlerRegistry>),
}

impl RegistryRef {
  pub(crate) fn get(&self) -> &HandlerRegistry {
    match self {
      RegistryRef::Global => global(),
      RegistryRef::Owned(registry) => registry,
    }
  }
}
