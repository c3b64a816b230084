//! Record filters
//!
//! A record reaches the output only if every active filter accepts it. The
//! filters look at disjoint fields, so their order does not matter.

use loadtrace_common::EventRecord;
use std::path::{Path, PathBuf};

/// Default ceiling for modules that live under the standard library
pub const DEFAULT_MAX_LIBRARY_LEVEL: u32 = 1;

pub trait EventFilter {
    fn accepts(&self, record: &EventRecord) -> bool;
}

/// Keep loads nested at most `max_depth` deep
#[derive(Debug, Clone, Copy)]
pub struct MaxDepthFilter {
    pub max_depth: u32,
}

impl EventFilter for MaxDepthFilter {
    fn accepts(&self, record: &EventRecord) -> bool {
        record.depth <= self.max_depth
    }
}

/// Keep modules whose dotted name has at most `max_level` segments
#[derive(Debug, Clone, Copy)]
pub struct MaxLevelFilter {
    pub max_level: u32,
}

impl EventFilter for MaxLevelFilter {
    fn accepts(&self, record: &EventRecord) -> bool {
        record.module_level <= self.max_level
    }
}

/// Level ceiling applied only to modules under the standard library
///
/// Records from files outside `stdlib` always pass. Without a configured
/// standard library location nothing is considered part of it.
#[derive(Debug, Clone)]
pub struct MaxLibraryLevelFilter {
    pub max_level: u32,
    pub stdlib: Option<PathBuf>,
}

impl EventFilter for MaxLibraryLevelFilter {
    fn accepts(&self, record: &EventRecord) -> bool {
        match &self.stdlib {
            Some(stdlib) if record.module_file.starts_with(stdlib) => {
                record.module_level <= self.max_level
            }
            _ => true,
        }
    }
}

/// Filter settings coming from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterConfig {
    pub max_depth: Option<u32>,
    pub max_level: Option<u32>,
    pub max_library_level: Option<u32>,
    /// Disable every filter
    pub full: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            max_level: None,
            max_library_level: Some(DEFAULT_MAX_LIBRARY_LEVEL),
            full: false,
        }
    }
}

/// Conjunction of the active filters
#[derive(Default)]
pub struct FilterChain {
    filters: Vec<Box<dyn EventFilter>>,
}

impl FilterChain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the chain described by `config`
    ///
    /// `stdlib` is the standard library location the library-level ceiling
    /// applies to.
    #[must_use]
    pub fn from_config(config: &FilterConfig, stdlib: Option<&Path>) -> Self {
        let mut chain = Self::new();
        if config.full {
            return chain;
        }

        if let Some(max_depth) = config.max_depth {
            chain.push(MaxDepthFilter { max_depth });
        }
        if let Some(max_level) = config.max_level {
            chain.push(MaxLevelFilter { max_level });
        }
        if let Some(max_level) = config.max_library_level {
            chain.push(MaxLibraryLevelFilter { max_level, stdlib: stdlib.map(Path::to_path_buf) });
        }
        chain
    }

    pub fn push(&mut self, filter: impl EventFilter + 'static) {
        self.filters.push(Box::new(filter));
    }

    #[must_use]
    pub fn accepts(&self, record: &EventRecord) -> bool {
        self.filters.iter().all(|filter| filter.accepts(record))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}
