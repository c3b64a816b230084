//! Trace logger: filters, formats and writes records

use log::warn;
use loadtrace_common::EventRecord;
use std::cell::{Cell, Ref, RefCell};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use super::{FilterChain, RecordFormatter, RenderMode};
use crate::domain::ConfigError;
use crate::profiling::EventHandler;

/// Where the trace goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Created (truncated) at setup
    File(PathBuf),
    Stderr,
}

/// Event sink writing one line per accepted record
///
/// The header is written on construction, before any record. Each line is
/// flushed as it is written so the trace survives a crashing program. Write
/// failures are logged and otherwise ignored: tracing never changes the
/// outcome of a load.
pub struct TraceLogger<W: Write> {
    writer: RefCell<W>,
    formatter: Box<dyn RecordFormatter>,
    filters: FilterChain,
    written: Cell<u64>,
}

impl<W: Write> TraceLogger<W> {
    /// Wrap `writer` and write the header for `mode`
    ///
    /// # Errors
    /// Returns [`ConfigError::HeaderWriteFailed`] if the header cannot be written.
    pub fn new(mut writer: W, mode: RenderMode, filters: FilterChain) -> Result<Self, ConfigError> {
        let formatter = mode.formatter();
        writeln!(writer, "{}", formatter.header())
            .and_then(|()| writer.flush())
            .map_err(ConfigError::HeaderWriteFailed)?;

        Ok(Self { writer: RefCell::new(writer), formatter, filters, written: Cell::new(0) })
    }

    /// Number of records written so far
    #[must_use]
    pub fn written(&self) -> u64 {
        self.written.get()
    }

    pub fn writer(&self) -> Ref<'_, W> {
        self.writer.borrow()
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl TraceLogger<Box<dyn Write>> {
    /// Open `destination` for writing
    ///
    /// # Errors
    /// Returns [`ConfigError::OutputUnavailable`] if the trace file cannot be
    /// created.
    pub fn open(
        destination: &Destination,
        mode: RenderMode,
        filters: FilterChain,
    ) -> Result<Self, ConfigError> {
        let writer: Box<dyn Write> = match destination {
            Destination::File(path) => {
                let file = File::create(path).map_err(|source| ConfigError::OutputUnavailable {
                    path: path.clone(),
                    source,
                })?;
                Box::new(BufWriter::new(file))
            }
            Destination::Stderr => Box::new(io::stderr()),
        };
        Self::new(writer, mode, filters)
    }
}

impl<W: Write> EventHandler for TraceLogger<W> {
    fn handle(&self, record: &EventRecord) {
        if !self.filters.accepts(record) {
            return;
        }

        let line = self.formatter.format(record);
        let mut writer = self.writer.borrow_mut();
        match writeln!(writer, "{line}").and_then(|()| writer.flush()) {
            Ok(()) => self.written.set(self.written.get() + 1),
            Err(e) => warn!("failed to write trace record for {}: {e}", record.module_name),
        }
    }
}
