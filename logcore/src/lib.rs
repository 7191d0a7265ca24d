//! `fibre_logcore` - an in-process logging core.
//!
//! Producers call [`record`] from any thread. The message is forwarded to the
//! handler in the process-wide [`HandlerRegistry`], by default a
//! [`Dispatcher`] over a terminal-aware stdout writer. The dispatcher buffers
//! up to a fixed number of messages without ever blocking the caller (excess
//! messages are dropped) and lazily starts a single drain thread that writes
//! them to the sink. The drain thread exits after an idle period and is
//! started again by the next message.
//!
//! ```no_run
//! use fibre_logcore::{record_general, register_handler, Dispatcher, Severity};
//! use std::sync::Arc;
//!
//! let factory = fibre_logcore::writer::file_writer("/var/log/app/access.log")?;
//! register_handler(Arc::new(Dispatcher::new(factory)));
//!
//! record_general(Severity::Info, "accepted tcp:example.com:443 [proxy]");
//! # Ok::<(), fibre_logcore::Error>(())
//! ```

pub mod bridge;
pub mod config;
pub mod encoders;
pub mod error;
pub mod error_handling;
pub mod init;
pub mod model;
pub mod registry;
pub mod subscriber;
pub mod writer;

// Re-export key public types for easier use by library consumers.
pub use error::{Error, Result};
pub use error_handling::{ErrorReporter, InternalErrorReport, InternalErrorSource};
pub use model::{GeneralMessage, Message, Severity};
pub use registry::{global, record, record_general, register_handler, Handler, HandlerRegistry};
pub use subscriber::{Dispatcher, DispatcherBuilder, DispatcherState};
pub use writer::{Writer, WriterFactory, LINE_SEPARATOR};

// Public initialization functions
pub use init::{find_config_file, init_from_config, init_from_file, InitResult};
