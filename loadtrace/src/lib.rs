//! # loadtrace - Module Load Profiler
//!
//! loadtrace runs a program on an instrumented module runtime and records,
//! for every module load the program triggers, when it started, how long it
//! took, how much resident memory it added and how it nests inside other
//! loads. It is meant for diagnosing slow or memory-heavy startup caused by
//! transitive imports.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Target Program                           │
//! │                  (executed as __main__)                         │
//! └───────────────────────┬─────────────────────────────────────────┘
//!                         │ import a.b
//!                         ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Host Runtime (host)                          │
//! │  search path → path hooks → file finders → ModuleLoader         │
//! └───────────────────────┬─────────────────────────────────────────┘
//!                         │ exec_module (wrapped)
//!                         ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                  Profiling (this crate)                         │
//! │                                                                 │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────┐        │
//! │  │ProfiledLoader│──▶│  Profiling   │──▶│ TraceLogger  │        │
//! │  │  (wrapper)   │   │   Session    │   │filters+format│        │
//! │  └──────────────┘   └──────┬───────┘   └──────────────┘        │
//! │                            │                                    │
//! │                            ▼                                    │
//! │                     ┌──────────────┐                            │
//! │                     │    Export    │                            │
//! │                     │ (trace.json) │                            │
//! │                     └──────────────┘                            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Structure
//!
//! - [`profiling`]: the instrumentation core
//!   - `session`: start time, nesting depth, record emission
//!   - `wrapper`: `ProfiledLoader`, the loader decorator
//!   - `install`: `install_hooks`, routing lookups through wrapped loaders
//!   - `memory`: resident memory sampling via `getrusage`
//!
//! - [`host`]: the module runtime being traced (finders, loaders, programs)
//!
//! - [`output`]: filter chain, tree/raw formatters and the trace logger
//!
//! - [`export`]: Chrome Trace Event Format JSON for Perfetto / `chrome://tracing`
//!
//! - [`cli`] and [`config`]: command-line parsing and the resolved run config
//!
//! - [`tracer`]: one traced run from setup to export
//!
//! - [`domain`]: module names, loader kinds, error types
//!
//! ## Limitations
//!
//! - The nesting depth is plain single-threaded state; loads must happen on
//!   one logical call stack.
//! - Installing hooks twice wraps the loaders twice and counts every load at
//!   two depths.
//!
//! ## Typical Usage
//!
//! ```bash
//! # Tree trace in loadtime.log
//! loadtrace app/main.src
//!
//! # Raw rows on stderr, no filters, plus a Perfetto timeline
//! loadtrace --raw -E --full --export trace.json app/main.src
//! ```

pub mod cli;
pub mod config;
pub mod domain;
pub mod export;
pub mod host;
pub mod output;
pub mod profiling;
pub mod tracer;
