//! Loader decorator emitting a paired enter/leave record around each load

use std::rc::Rc;

use super::ProfilingSession;
use crate::domain::{LoadError, LoaderKind};
use crate::host::{Module, ModuleLoader, Runtime};

/// Wraps a loader so every `exec_module` is traced
///
/// The inner loader's `Result` is returned as is: a failing load still gets
/// its leave record (marked failed) and the depth is restored before the
/// error reaches the caller.
pub struct ProfiledLoader {
    inner: Rc<dyn ModuleLoader>,
    session: Rc<ProfilingSession>,
}

impl ProfiledLoader {
    #[must_use]
    pub fn new(inner: Rc<dyn ModuleLoader>, session: Rc<ProfilingSession>) -> Self {
        Self { inner, session }
    }
}

impl ModuleLoader for ProfiledLoader {
    fn kind(&self) -> LoaderKind {
        self.inner.kind()
    }

    fn exec_module(&self, module: &Module, runtime: &Runtime) -> Result<(), LoadError> {
        let frame = self.session.enter(module.trace_ref());
        let outcome = self.inner.exec_module(module, runtime);
        self.session.leave(frame, outcome.is_err());
        outcome
    }
}
