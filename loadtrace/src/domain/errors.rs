//! Structured error types for loadtrace
//!
//! Using thiserror for automatic Display implementation and error chaining.

use std::path::PathBuf;
use thiserror::Error;

use super::types::ModuleName;

#[derive(Error, Debug)]
#[error("Invalid module name: {0:?}")]
pub struct InvalidModuleName(pub String);

/// Failure of a single module load
///
/// Produced by loaders and the import machinery. The tracing layer passes
/// these through untouched.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("No module named '{0}'")]
    ModuleNotFound(ModuleName),

    #[error("{module}: {message}")]
    Raised { module: ModuleName, message: String },

    #[error("{}:{line}: {message}", file.display())]
    Syntax { file: PathBuf, line: usize, message: String },

    #[error("Corrupt precompiled module {}: {source}", file.display())]
    Corrupt {
        file: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to read {}: {source}", file.display())]
    Io {
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Setup failures, surfaced before any hook is installed
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot open trace output {}: {source}", path.display())]
    OutputUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write trace header: {0}")]
    HeaderWriteFailed(#[source] std::io::Error),

    #[error("Program not found: {}", .0.display())]
    ProgramNotFound(PathBuf),
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to create export file {}: {source}", path.display())]
    CreateFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Failures of a traced run other than the traced program's own failure
#[derive(Error, Debug)]
pub enum TraceError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_not_found_display() {
        let err = LoadError::ModuleNotFound(ModuleName::parse("missing.mod").unwrap());
        assert_eq!(err.to_string(), "No module named 'missing.mod'");
    }

    #[test]
    fn test_syntax_error_display() {
        let err = LoadError::Syntax {
            file: PathBuf::from("/lib/a.src"),
            line: 3,
            message: "unknown directive 'frobnicate'".to_string(),
        };
        assert!(err.to_string().contains("/lib/a.src:3"));
        assert!(err.to_string().contains("frobnicate"));
    }

    #[test]
    fn test_output_unavailable_error() {
        let err = ConfigError::OutputUnavailable {
            path: PathBuf::from("/nonexistent/dir/trace.log"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(err.to_string().contains("/nonexistent/dir/trace.log"));
    }
}
