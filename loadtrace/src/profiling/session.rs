//! # Profiling Session
//!
//! Owns the state every wrapped loader shares: the session start time, the
//! current load nesting depth, the memory probe, and the handlers that
//! receive [`EventRecord`]s.
//!
//! ## Threading
//!
//! The depth counter is a plain `Cell`: the session is `!Send` and assumes
//! module loads happen on one logical call stack in strict nested order.
//! Loads issued concurrently from several threads (which this type does not
//! allow without an external wrapper) would interleave depths and produce an
//! unreliable tree.

use loadtrace_common::{EventRecord, ModuleRef};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::{Duration, Instant, SystemTime};

use super::memory::{MemoryProbe, RusageProbe};

/// Consumer of trace records
pub trait EventHandler {
    fn handle(&self, record: &EventRecord);
}

/// Counters over the leave records of a session
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadStats {
    pub loads: u64,
    pub failed: u64,
}

/// An in-flight load between its enter and leave records
#[derive(Debug)]
pub struct LoadFrame {
    module: ModuleRef,
    depth: u32,
    memory_before: u64,
    started: Instant,
}

impl LoadFrame {
    #[must_use]
    pub fn depth(&self) -> u32 {
        self.depth
    }
}

pub struct ProfilingSession {
    start: Cell<Instant>,
    started_at: Cell<SystemTime>,
    depth: Cell<u32>,
    probe: Box<dyn MemoryProbe>,
    handlers: RefCell<Vec<Rc<dyn EventHandler>>>,
    stats: Cell<LoadStats>,
}

impl ProfilingSession {
    #[must_use]
    pub fn new(probe: impl MemoryProbe + 'static) -> Self {
        Self {
            start: Cell::new(Instant::now()),
            started_at: Cell::new(SystemTime::now()),
            depth: Cell::new(0),
            probe: Box::new(probe),
            handlers: RefCell::new(Vec::new()),
            stats: Cell::new(LoadStats::default()),
        }
    }

    /// Session sampling the process's resident set size
    #[must_use]
    pub fn with_rusage() -> Self {
        Self::new(RusageProbe)
    }

    pub fn add_handler(&self, handler: Rc<dyn EventHandler>) {
        self.handlers.borrow_mut().push(handler);
    }

    /// Mark the session start and reset the depth
    ///
    /// Called once by hook installation, before any traced load.
    pub fn start(&self) {
        self.start.set(Instant::now());
        self.started_at.set(SystemTime::now());
        self.depth.set(0);
    }

    /// Number of loads currently on the call stack
    #[must_use]
    pub fn depth(&self) -> u32 {
        self.depth.get()
    }

    #[must_use]
    pub fn stats(&self) -> LoadStats {
        self.stats.get()
    }

    /// Open a load: bump the depth and emit its enter record
    pub fn enter(&self, module: ModuleRef) -> LoadFrame {
        let depth = self.depth.get() + 1;
        self.depth.set(depth);

        let memory_before = self.probe.sample();
        let started = Instant::now();
        let (timestamp, elapsed) = self.clock(started);

        self.emit(&EventRecord::enter(&module, timestamp, elapsed, depth, memory_before));

        LoadFrame { module, depth, memory_before, started }
    }

    /// Close a load: emit its leave record and drop the depth
    pub fn leave(&self, frame: LoadFrame, failed: bool) {
        let memory_after = self.probe.sample();
        let ended = Instant::now();
        let (timestamp, elapsed) = self.clock(ended);

        self.emit(&EventRecord::leave(
            &frame.module,
            timestamp,
            elapsed,
            ended.saturating_duration_since(frame.started),
            frame.depth,
            memory_after,
            memory_delta(frame.memory_before, memory_after),
            failed,
        ));

        self.depth.set(self.depth.get().saturating_sub(1));

        let mut stats = self.stats.get();
        stats.loads += 1;
        if failed {
            stats.failed += 1;
        }
        self.stats.set(stats);
    }

    fn clock(&self, at: Instant) -> (SystemTime, Duration) {
        let elapsed = at.saturating_duration_since(self.start.get());
        (self.started_at.get() + elapsed, elapsed)
    }

    fn emit(&self, record: &EventRecord) {
        for handler in self.handlers.borrow().iter() {
            handler.handle(record);
        }
    }
}

#[allow(clippy::cast_possible_wrap)]
fn memory_delta(before: u64, after: u64) -> i64 {
    after as i64 - before as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use loadtrace_common::EventKind;
    use std::path::PathBuf;

    #[derive(Default)]
    struct Collector(RefCell<Vec<EventRecord>>);

    impl EventHandler for Collector {
        fn handle(&self, record: &EventRecord) {
            self.0.borrow_mut().push(record.clone());
        }
    }

    fn module(name: &str) -> ModuleRef {
        ModuleRef {
            name: name.to_string(),
            file: PathBuf::from(format!("/srv/{name}.src")),
            level: 1,
        }
    }

    #[test]
    fn test_enter_leave_tracks_depth() {
        let session = ProfilingSession::new(|| 100u64);
        session.start();

        let outer = session.enter(module("a"));
        assert_eq!(session.depth(), 1);
        let inner = session.enter(module("b"));
        assert_eq!(inner.depth(), 2);

        session.leave(inner, false);
        assert_eq!(session.depth(), 1);
        session.leave(outer, false);
        assert_eq!(session.depth(), 0);
    }

    #[test]
    fn test_leave_reports_memory_delta_from_probe() {
        let samples = Cell::new(1000u64);
        let session = ProfilingSession::new(move || {
            let value = samples.get();
            samples.set(value + 250);
            value
        });
        let collector = Rc::new(Collector::default());
        session.add_handler(collector.clone());
        session.start();

        let frame = session.enter(module("a"));
        session.leave(frame, true);

        let records = collector.0.borrow();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].kind, EventKind::Enter);
        assert_eq!(records[0].total_memory, 1000);
        assert_eq!(records[1].total_memory, 1250);
        assert_eq!(records[1].memory_delta, 250);
        assert!(records[1].failed);
        assert_eq!(records[1].duration, records[1].elapsed - records[0].elapsed);
        assert_eq!(session.stats(), LoadStats { loads: 1, failed: 1 });
    }

    #[test]
    fn test_memory_delta_can_be_negative() {
        assert_eq!(memory_delta(500, 300), -200);
    }
}
