//! Trace export functionality
//!
//! Exports the full load timeline in Chrome Trace Event Format for
//! visualization in Perfetto or chrome://tracing.

pub mod chrome_trace;

pub use chrome_trace::ChromeTraceExporter;
