// Terminal styling applied to already-rendered log lines.

pub mod color;

pub use color::{colorize_line, detect_severity, Brush};
