//! Resolved configuration of a traced run

use std::path::PathBuf;

use crate::output::{Destination, FilterConfig, RenderMode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceConfig {
    /// Target program, executed as `__main__`
    pub program: PathBuf,
    pub destination: Destination,
    pub mode: RenderMode,
    pub filters: FilterConfig,
    /// Extra module directories, searched after the program's directory
    pub search_path: Vec<PathBuf>,
    /// Standard library directory, searched last
    pub stdlib: Option<PathBuf>,
    /// Chrome trace export file
    pub export: Option<PathBuf>,
}

impl TraceConfig {
    /// Config with default output settings for `program`
    #[must_use]
    pub fn new(program: impl Into<PathBuf>, destination: Destination) -> Self {
        Self {
            program: program.into(),
            destination,
            mode: RenderMode::default(),
            filters: FilterConfig::default(),
            search_path: Vec::new(),
            stdlib: None,
            export: None,
        }
    }

    /// Directories handed to the runtime (program directory is added by the bootstrap)
    #[must_use]
    pub fn runtime_search_path(&self) -> Vec<PathBuf> {
        self.search_path.iter().cloned().chain(self.stdlib.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stdlib_is_searched_last() {
        let mut config = TraceConfig::new("main.src", Destination::Stderr);
        config.search_path = vec![PathBuf::from("/app/vendor")];
        config.stdlib = Some(PathBuf::from("/opt/std"));

        assert_eq!(
            config.runtime_search_path(),
            vec![PathBuf::from("/app/vendor"), PathBuf::from("/opt/std")]
        );
    }
}
