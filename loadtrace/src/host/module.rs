//! Module descriptors handed to loaders

use loadtrace_common::ModuleRef;
use std::cell::RefCell;
use std::path::{Path, PathBuf};

use crate::domain::{LoaderKind, ModuleName};

/// A module being (or already) loaded by the runtime
///
/// Memory the module allocates while executing is retained here for the
/// lifetime of the runtime, the same way module globals outlive the load.
#[derive(Debug)]
pub struct Module {
    name: ModuleName,
    file: PathBuf,
    kind: LoaderKind,
    is_package: bool,
    retained: RefCell<Vec<Vec<u8>>>,
}

impl Module {
    #[must_use]
    pub fn new(name: ModuleName, file: PathBuf, kind: LoaderKind, is_package: bool) -> Self {
        Self { name, file, kind, is_package, retained: RefCell::new(Vec::new()) }
    }

    #[must_use]
    pub fn name(&self) -> &ModuleName {
        &self.name
    }

    #[must_use]
    pub fn file(&self) -> &Path {
        &self.file
    }

    #[must_use]
    pub fn kind(&self) -> LoaderKind {
        self.kind
    }

    #[must_use]
    pub fn is_package(&self) -> bool {
        self.is_package
    }

    /// Keep a buffer alive for as long as the module is loaded
    pub fn retain(&self, bytes: Vec<u8>) {
        self.retained.borrow_mut().push(bytes);
    }

    /// Total size of the buffers held by this module
    #[must_use]
    pub fn retained_bytes(&self) -> usize {
        self.retained.borrow().iter().map(Vec::len).sum()
    }

    /// Identity carried by the trace records of this module
    #[must_use]
    pub fn trace_ref(&self) -> ModuleRef {
        ModuleRef {
            name: self.name.as_str().to_string(),
            file: self.file.clone(),
            level: self.name.level(),
        }
    }
}
