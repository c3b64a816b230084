//! Trace output: filters, formatters and the logger that applies them

pub mod filters;
pub mod format;
pub mod logger;

pub use filters::{
    EventFilter, FilterChain, FilterConfig, MaxDepthFilter, MaxLevelFilter, MaxLibraryLevelFilter,
    DEFAULT_MAX_LIBRARY_LEVEL,
};
pub use format::{RawFormatter, RecordFormatter, RenderMode, TreeFormatter};
pub use logger::{Destination, TraceLogger};
