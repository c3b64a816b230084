//! Load instrumentation core
//!
//! - `session`: profiling session (start time, nesting depth, handlers)
//! - `wrapper`: loader decorator emitting enter/leave records
//! - `install`: wraps the runtime's loaders and installs them as a path hook
//! - `memory`: resident memory sampling

pub mod install;
pub mod memory;
pub mod session;
pub mod wrapper;

pub use install::install_hooks;
pub use memory::{MemoryProbe, RusageProbe};
pub use session::{EventHandler, LoadFrame, LoadStats, ProfilingSession};
pub use wrapper::ProfiledLoader;
