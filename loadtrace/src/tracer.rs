//! One traced run: setup, hook installation, program execution, export

use log::{info, warn};
use std::rc::Rc;

use crate::config::TraceConfig;
use crate::domain::{ConfigError, LoadError, TraceError};
use crate::export::ChromeTraceExporter;
use crate::host::Runtime;
use crate::output::{FilterChain, TraceLogger};
use crate::profiling::{install_hooks, LoadStats, ProfilingSession};

/// Outcome of a traced run
#[derive(Debug)]
pub struct TraceReport {
    pub stats: LoadStats,
    /// Records that passed the filters and reached the output
    pub records_written: u64,
    /// The program's own result, exactly as the runtime returned it
    pub outcome: Result<(), LoadError>,
}

/// Run `config.program` with every module load traced
///
/// Output setup happens before hooks are installed, so an unusable
/// destination is reported without running anything. A failing program is
/// not an error of this function: its failure is in
/// [`TraceReport::outcome`], after the trace has been completed.
///
/// # Errors
/// Returns [`TraceError::Config`] for setup failures and
/// [`TraceError::Export`] if the Chrome trace cannot be written after a
/// successful run. When the program itself failed, an export failure is only
/// logged so that the program's error stays in the report.
pub fn trace_program(config: &TraceConfig) -> Result<TraceReport, TraceError> {
    if !config.program.is_file() {
        return Err(ConfigError::ProgramNotFound(config.program.clone()).into());
    }

    let filters = FilterChain::from_config(&config.filters, config.stdlib.as_deref());
    let logger = Rc::new(TraceLogger::open(&config.destination, config.mode, filters)?);
    let exporter = config.export.as_ref().map(|_| Rc::new(ChromeTraceExporter::new()));

    let session = Rc::new(ProfilingSession::with_rusage());
    session.add_handler(logger.clone());
    if let Some(exporter) = &exporter {
        session.add_handler(exporter.clone());
    }

    let runtime = Runtime::new(config.runtime_search_path());
    install_hooks(&runtime, &session);

    let outcome = runtime.run_main(&config.program);

    if let (Some(exporter), Some(path)) = (&exporter, &config.export) {
        match exporter.export_to_file(path) {
            Ok(()) => {
                info!("exported {} trace events to {}", exporter.event_count(), path.display());
            }
            // a failed program keeps its own error as the outcome
            Err(e) if outcome.is_err() => warn!("failed to export {}: {e}", path.display()),
            Err(e) => return Err(e.into()),
        }
    }

    Ok(TraceReport { stats: session.stats(), records_written: logger.written(), outcome })
}
