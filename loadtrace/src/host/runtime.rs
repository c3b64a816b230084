//! The module runtime: search path, path hooks, finder cache, module table

use log::debug;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use super::finder::{default_path_hook, FileFinder, ModuleSpec, PathHook};
use super::{Module, Program};
use crate::domain::{LoadError, LoaderKind, ModuleName};

/// Single-threaded module runtime
///
/// All state lives behind `RefCell`s so that loaders can re-enter
/// [`Runtime::import`] while an outer import is still executing. No borrow
/// is held across a call into a loader.
pub struct Runtime {
    search_path: RefCell<Vec<PathBuf>>,
    path_hooks: RefCell<Vec<Rc<PathHook>>>,
    /// Finder per search-path directory (`None` when no hook serves it)
    finders: RefCell<HashMap<PathBuf, Option<Rc<FileFinder>>>>,
    modules: RefCell<HashMap<ModuleName, Rc<Module>>>,
}

impl Runtime {
    /// Create a runtime with the default path hook
    #[must_use]
    pub fn new(search_path: Vec<PathBuf>) -> Self {
        Self {
            search_path: RefCell::new(search_path),
            path_hooks: RefCell::new(vec![Rc::new(default_path_hook())]),
            finders: RefCell::new(HashMap::new()),
            modules: RefCell::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn search_path(&self) -> Vec<PathBuf> {
        self.search_path.borrow().clone()
    }

    pub fn prepend_search_path(&self, dir: PathBuf) {
        self.search_path.borrow_mut().insert(0, dir);
    }

    #[must_use]
    pub fn path_hooks(&self) -> Vec<Rc<PathHook>> {
        self.path_hooks.borrow().clone()
    }

    /// Insert a path hook; index is clamped to the current length
    pub fn insert_path_hook(&self, index: usize, hook: PathHook) {
        let mut hooks = self.path_hooks.borrow_mut();
        let index = index.min(hooks.len());
        hooks.insert(index, Rc::new(hook));
    }

    /// Forget cached finders so the next lookup consults the path hooks again
    pub fn invalidate_caches(&self) {
        self.finders.borrow_mut().clear();
    }

    /// Look up an already loaded (or currently loading) module
    #[must_use]
    pub fn module(&self, name: &ModuleName) -> Option<Rc<Module>> {
        self.modules.borrow().get(name).cloned()
    }

    #[must_use]
    pub fn loaded_count(&self) -> usize {
        self.modules.borrow().len()
    }

    /// Locate `name` on the search path without loading it
    #[must_use]
    pub fn find_spec(&self, name: &ModuleName) -> Option<ModuleSpec> {
        let dirs = self.search_path();
        dirs.iter().find_map(|dir| self.finder_for(dir)?.find_spec(name))
    }

    fn finder_for(&self, dir: &Path) -> Option<Rc<FileFinder>> {
        if let Some(cached) = self.finders.borrow().get(dir) {
            return cached.clone();
        }

        let finder =
            self.path_hooks.borrow().iter().find_map(|hook| hook.finder_for(dir)).map(Rc::new);
        self.finders.borrow_mut().insert(dir.to_path_buf(), finder.clone());
        finder
    }

    /// Load `name` (and its parent packages) if not loaded yet
    ///
    /// The module is registered before its body runs, so import cycles see
    /// the partially initialised module instead of recursing. A failed
    /// module is unregistered and its error returned unchanged.
    ///
    /// # Errors
    /// Returns [`LoadError::ModuleNotFound`] if no finder resolves the name,
    /// or whatever the loader returned.
    pub fn import(&self, name: &ModuleName) -> Result<Rc<Module>, LoadError> {
        if let Some(module) = self.module(name) {
            return Ok(module);
        }

        if let Some(parent) = name.parent() {
            self.import(&parent)?;
            // The parent body may have imported us already
            if let Some(module) = self.module(name) {
                return Ok(module);
            }
        }

        let spec = self.find_spec(name).ok_or_else(|| LoadError::ModuleNotFound(name.clone()))?;
        debug!("import {name}: {} ({} loader)", spec.file.display(), spec.loader.kind());

        let module =
            Rc::new(Module::new(name.clone(), spec.file, spec.loader.kind(), spec.is_package));
        self.modules.borrow_mut().insert(name.clone(), Rc::clone(&module));

        if let Err(err) = spec.loader.exec_module(&module, self) {
            debug!("import {name} failed: {err}");
            self.modules.borrow_mut().remove(name);
            return Err(err);
        }

        Ok(module)
    }

    /// Execute the target program as `__main__`
    ///
    /// The program's directory is put in front of the search path. The
    /// program body runs directly, not through a loader.
    ///
    /// # Errors
    /// Returns the program's own failure, including failed imports.
    pub fn run_main(&self, program: &Path) -> Result<(), LoadError> {
        let dir = match program.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        self.prepend_search_path(dir);

        let text = fs::read_to_string(program)
            .map_err(|source| LoadError::Io { file: program.to_path_buf(), source })?;
        let code = Program::parse(&text, program)?;

        let main =
            Rc::new(Module::new(ModuleName::main(), program.to_path_buf(), LoaderKind::Source, false));
        self.modules.borrow_mut().insert(ModuleName::main(), Rc::clone(&main));

        code.execute(&main, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> ModuleName {
        ModuleName::parse(s).unwrap()
    }

    fn write(root: &Path, rel: &str, text: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, text).unwrap();
    }

    #[test]
    fn test_import_loads_parent_first() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a/mod.src", "alloc 16\n");
        write(dir.path(), "a/b.src", "");

        let runtime = Runtime::new(vec![dir.path().to_path_buf()]);
        runtime.import(&name("a.b")).unwrap();

        assert!(runtime.module(&name("a")).unwrap().is_package());
        assert_eq!(runtime.module(&name("a")).unwrap().retained_bytes(), 16);
        assert!(runtime.module(&name("a.b")).is_some());
    }

    #[test]
    fn test_failed_import_is_unregistered() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "bad.src", "raise nope\n");

        let runtime = Runtime::new(vec![dir.path().to_path_buf()]);
        let err = runtime.import(&name("bad")).unwrap_err();

        assert!(matches!(err, LoadError::Raised { ref message, .. } if message == "nope"));
        assert!(runtime.module(&name("bad")).is_none());
    }

    #[test]
    fn test_import_cycle_terminates() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "ping.src", "import pong\n");
        write(dir.path(), "pong.src", "import ping\n");

        let runtime = Runtime::new(vec![dir.path().to_path_buf()]);
        runtime.import(&name("ping")).unwrap();

        assert_eq!(runtime.loaded_count(), 2);
    }

    #[test]
    fn test_missing_module() {
        let dir = tempfile::tempdir().unwrap();
        let runtime = Runtime::new(vec![dir.path().to_path_buf()]);

        let err = runtime.import(&name("ghost")).unwrap_err();
        assert!(matches!(err, LoadError::ModuleNotFound(ref n) if n.as_str() == "ghost"));
    }

    #[test]
    fn test_run_main_searches_program_directory() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "main.src", "import helper\n");
        write(dir.path(), "helper.src", "");

        let runtime = Runtime::new(Vec::new());
        runtime.run_main(&dir.path().join("main.src")).unwrap();

        assert!(runtime.module(&name("helper")).is_some());
        assert_eq!(runtime.search_path()[0], dir.path());
    }

    #[test]
    fn test_path_hook_inserted_after_lookup_needs_invalidation() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "m.src", "");

        let runtime = Runtime::new(vec![dir.path().to_path_buf()]);
        assert!(runtime.find_spec(&name("m")).is_some());

        runtime.insert_path_hook(0, PathHook::new(Vec::new()));
        // cached finder still answers
        assert!(runtime.find_spec(&name("m")).is_some());

        runtime.invalidate_caches();
        // the empty hook now serves the directory and knows no suffixes
        assert!(runtime.find_spec(&name("m")).is_none());
    }
}
