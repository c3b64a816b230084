use loadtrace_common::{EventKind, EventRecord};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::domain::ExportError;
use crate::profiling::EventHandler;

/// Chrome Trace Event format
/// Format reference: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU/preview
#[derive(Debug, Clone, Serialize)]
struct ChromeTraceEvent {
    /// Event name (module name)
    name: String,
    /// Category for filtering/coloring
    cat: String,
    /// Phase: "B" = begin, "E" = end, "M" = metadata
    ph: String,
    /// Timestamp in microseconds since the session start
    ts: f64,
    pid: u32,
    tid: u32,
    /// Optional arguments (metadata)
    #[serde(skip_serializing_if = "Option::is_none")]
    args: Option<BTreeMap<String, JsonValue>>,
}

/// Chrome Trace Format container
#[derive(Debug, Serialize)]
struct ChromeTrace<'a> {
    #[serde(rename = "traceEvents")]
    trace_events: &'a [ChromeTraceEvent],
    #[serde(rename = "displayTimeUnit")]
    display_time_unit: &'static str,
}

/// Collects every load record (unfiltered) for timeline visualization
///
/// Enter records become "B" events and leave records "E" events, so nested
/// loads show up as nested slices in Perfetto or `chrome://tracing`.
pub struct ChromeTraceExporter {
    events: RefCell<Vec<ChromeTraceEvent>>,
    pid: u32,
}

impl Default for ChromeTraceExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ChromeTraceExporter {
    #[must_use]
    pub fn new() -> Self {
        Self { events: RefCell::new(Vec::new()), pid: std::process::id() }
    }

    /// Add a load record to the trace
    pub fn add_record(&self, record: &EventRecord) {
        let mut args = BTreeMap::new();
        args.insert("depth".to_string(), serde_json::json!(record.depth));
        args.insert("module_level".to_string(), serde_json::json!(record.module_level));
        args.insert("file".to_string(), serde_json::json!(record.module_file.display().to_string()));
        args.insert("total_memory_kib".to_string(), serde_json::json!(record.total_memory));

        let ph = match record.kind {
            EventKind::Enter => "B",
            EventKind::Leave => {
                args.insert("memory_delta_kib".to_string(), serde_json::json!(record.memory_delta));
                args.insert("failed".to_string(), serde_json::json!(record.failed));
                "E"
            }
        };

        self.events.borrow_mut().push(ChromeTraceEvent {
            name: record.module_name.clone(),
            cat: "load".to_string(),
            ph: ph.to_string(),
            ts: record.elapsed.as_secs_f64() * 1_000_000.0,
            pid: self.pid,
            tid: 0,
            args: Some(args),
        });
    }

    /// Export the trace to any writer (file, stdout, buffer, etc.)
    ///
    /// # Errors
    /// Returns an error if serialization or writing fails.
    pub fn export<W: Write>(&self, mut writer: W) -> Result<(), ExportError> {
        let mut all_events = self.events.borrow().clone();

        let mut args = BTreeMap::new();
        args.insert("name".to_string(), serde_json::json!("module loading"));
        all_events.push(ChromeTraceEvent {
            name: "thread_name".to_string(),
            cat: String::new(),
            ph: "M".to_string(), // Metadata
            ts: 0.0,
            pid: self.pid,
            tid: 0,
            args: Some(args),
        });

        let trace = ChromeTrace { trace_events: &all_events, display_time_unit: "ms" };
        serde_json::to_writer_pretty(&mut writer, &trace)?;
        writer.flush()?;
        Ok(())
    }

    /// Export to a freshly created file
    ///
    /// # Errors
    /// Returns an error if the file cannot be created or written.
    pub fn export_to_file(&self, path: &Path) -> Result<(), ExportError> {
        let file = File::create(path)
            .map_err(|source| ExportError::CreateFailed { path: path.to_path_buf(), source })?;
        self.export(BufWriter::new(file))
    }

    /// Get the number of events collected
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.events.borrow().len()
    }
}

impl EventHandler for ChromeTraceExporter {
    fn handle(&self, record: &EventRecord) {
        self.add_record(record);
    }
}
