pub mod dispatcher;

pub use dispatcher::{
  Dispatcher, DispatcherBuilder, DispatcherState, DEFAULT_BUFFER_CAPACITY, DEFAULT_IDLE_TIMEOUT,
  DEFAULT_RETRY_BACKOFF,
};
