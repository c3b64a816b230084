//! Record formatters
//!
//! Two renderings of the same record stream:
//!
//! ```text
//! tree:
//! start      duration   mem     mem+   module_name
//! 0.0001021  0.0000000  10240   0      > a
//! 0.0001530  0.0000000  10240   0       | > a.b
//! 0.0042810  0.0041280  12288   2048    | < a.b
//! 0.0043011  0.0041990  12288   2048   < a
//!
//! raw:
//! start, duration, mem, mem+, depth, event, module_name
//! 0.0001021, 0, 10240, 0, 1, enter, a
//! ```

use loadtrace_common::{EventKind, EventRecord};

/// Indentation unit for each nesting level below the first
const LEVEL_MARK: &str = " | ";
const ENTER_MARK: &str = "> ";
const LEAVE_MARK: &str = "< ";
const ERROR_MARK: &str = "(error) ";

/// Exactly one rendering is active per trace
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RenderMode {
    #[default]
    Tree,
    Raw,
}

impl RenderMode {
    #[must_use]
    pub fn formatter(self) -> Box<dyn RecordFormatter> {
        match self {
            RenderMode::Tree => Box::new(TreeFormatter),
            RenderMode::Raw => Box::new(RawFormatter),
        }
    }
}

pub trait RecordFormatter {
    /// Column line written once before any record
    fn header(&self) -> String;

    /// One output line for `record`, without the trailing newline
    fn format(&self, record: &EventRecord) -> String;
}

/// Fixed-width columns with the module name indented by load depth
#[derive(Debug, Default, Clone, Copy)]
pub struct TreeFormatter;

impl TreeFormatter {
    fn label(record: &EventRecord) -> String {
        let mut label = String::new();
        if record.depth > 1 {
            label.push_str(&LEVEL_MARK.repeat(record.depth as usize - 1));
        }
        label.push_str(match record.kind {
            EventKind::Enter => ENTER_MARK,
            EventKind::Leave => LEAVE_MARK,
        });
        if record.failed {
            label.push_str(ERROR_MARK);
        }
        label.push_str(&record.module_name);
        label
    }
}

impl RecordFormatter for TreeFormatter {
    fn header(&self) -> String {
        format!("{:<10} {:<10} {:<7} {:<6} {}", "start", "duration", "mem", "mem+", "module_name")
    }

    fn format(&self, record: &EventRecord) -> String {
        format!(
            "{:<10.7} {:<10.7} {:<7} {:<6} {}",
            record.elapsed.as_secs_f64(),
            record.duration.as_secs_f64(),
            record.total_memory,
            record.memory_delta,
            Self::label(record)
        )
    }
}

/// Comma-separated rows, no indentation or markers
#[derive(Debug, Default, Clone, Copy)]
pub struct RawFormatter;

impl RecordFormatter for RawFormatter {
    fn header(&self) -> String {
        "start, duration, mem, mem+, depth, event, module_name".to_string()
    }

    fn format(&self, record: &EventRecord) -> String {
        format!(
            "{}, {}, {}, {}, {}, {}, {}",
            record.elapsed.as_secs_f64(),
            record.duration.as_secs_f64(),
            record.total_memory,
            record.memory_delta,
            record.depth,
            record.kind,
            record.module_name
        )
    }
}
