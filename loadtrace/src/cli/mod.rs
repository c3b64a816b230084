//! Command-line interface for loadtrace
//!
//! This module contains CLI argument parsing and conversion into a
//! [`TraceConfig`](crate::config::TraceConfig).

pub mod args;

pub use args::Args;
