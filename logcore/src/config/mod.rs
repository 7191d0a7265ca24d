// Configuration: `raw` mirrors the file format, `processed` is the validated form.

pub mod processed;
pub mod raw;

pub use processed::{process_raw_config, ConfigInternal, SinkInternal};
pub use raw::ConfigRaw;
