//! # Shared Data Structures (Instrumentation ↔ Consumers)
//!
//! Defines the trace event model produced by the load instrumentation and
//! consumed by filters, formatters and exporters. Every consumer works on the
//! typed fields of [`EventRecord`]; there is no open-ended attribute bag.
//!
//! ## Key Types
//!
//! - [`EventRecord`] - One enter or leave observation of a module load
//! - [`EventKind`] - Which boundary of the load a record marks
//!
//! ## Pairing
//!
//! Every `Enter` record is followed, after the records of any nested loads,
//! by exactly one `Leave` record with the same `depth` and `module_name`.

use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

// ============================================================================
// Event Kind
// ============================================================================

/// Boundary of a module load that an [`EventRecord`] marks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(rename_all = "lowercase"))]
pub enum EventKind {
    /// The loader is about to execute the module
    Enter,
    /// The loader returned, successfully or not
    Leave,
}

impl EventKind {
    /// Lowercase label used in raw output and exports
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Enter => "enter",
            EventKind::Leave => "leave",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Event Record
// ============================================================================

/// One observation of a module load boundary
///
/// Records are immutable once emitted. Build them with [`EventRecord::enter`]
/// or [`EventRecord::leave`], which keep the enter-side invariants
/// (`duration == 0`, `memory_delta == 0`, `failed == false`).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EventRecord {
    // ========================================================================
    // Timing
    // ========================================================================
    /// Wall-clock moment of observation
    pub timestamp: SystemTime,

    /// Time since the profiling session started
    pub elapsed: Duration,

    /// Time spent inside the load
    ///
    /// **Value**:
    /// - `Enter`: always zero
    /// - `Leave`: `elapsed(leave) - elapsed(enter)` of the matching pair
    pub duration: Duration,

    // ========================================================================
    // Nesting
    // ========================================================================
    /// Which boundary this record marks
    pub kind: EventKind,

    /// Nesting depth of the load at the time of observation (1-based)
    ///
    /// Equal to the number of wrapped loader invocations on the call stack.
    pub depth: u32,

    // ========================================================================
    // Memory
    // ========================================================================
    /// Resident memory sampled at this boundary (KiB)
    pub total_memory: u64,

    /// `total_memory(leave) - total_memory(enter)`, zero for `Enter`
    pub memory_delta: i64,

    // ========================================================================
    // Module
    // ========================================================================
    /// Dotted identifier of the module being loaded
    pub module_name: String,

    /// Source location of the module
    pub module_file: PathBuf,

    /// Number of dot-separated segments in `module_name`
    pub module_level: u32,

    /// Whether the load raised (only ever set on `Leave`)
    pub failed: bool,
}

/// Module identity shared by both records of a pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRef {
    pub name: String,
    pub file: PathBuf,
    pub level: u32,
}

impl EventRecord {
    /// Build the record emitted before the loader runs
    #[must_use]
    pub fn enter(
        module: &ModuleRef,
        timestamp: SystemTime,
        elapsed: Duration,
        depth: u32,
        total_memory: u64,
    ) -> Self {
        Self {
            timestamp,
            elapsed,
            duration: Duration::ZERO,
            kind: EventKind::Enter,
            depth,
            total_memory,
            memory_delta: 0,
            module_name: module.name.clone(),
            module_file: module.file.clone(),
            module_level: module.level,
            failed: false,
        }
    }

    /// Build the record emitted after the loader returned
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn leave(
        module: &ModuleRef,
        timestamp: SystemTime,
        elapsed: Duration,
        duration: Duration,
        depth: u32,
        total_memory: u64,
        memory_delta: i64,
        failed: bool,
    ) -> Self {
        Self {
            timestamp,
            elapsed,
            duration,
            kind: EventKind::Leave,
            depth,
            total_memory,
            memory_delta,
            module_name: module.name.clone(),
            module_file: module.file.clone(),
            module_level: module.level,
            failed,
        }
    }

    #[must_use]
    pub fn is_enter(&self) -> bool {
        self.kind == EventKind::Enter
    }
}
