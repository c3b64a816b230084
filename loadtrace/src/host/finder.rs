//! Path hooks and file finders
//!
//! A [`PathHook`] is a table of loaders and the file suffixes each one
//! handles. For every search-path directory the runtime asks its path hooks,
//! in order, for a [`FileFinder`]; the finder then maps dotted names to
//! files in that directory.
//!
//! Resolution of `a.b` inside a directory tries, in order:
//!
//! 1. package init `a/b/mod<suffix>`
//! 2. module file `a/b<suffix>`
//!
//! and within each step the loaders in table order.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use super::loader::{
    ModuleLoader, NativeLoader, PrecompiledLoader, SourceLoader, NATIVE_SUFFIXES,
    PRECOMPILED_SUFFIXES, SOURCE_SUFFIXES,
};
use crate::domain::ModuleName;

/// Stem of the file that initialises a package directory
const PACKAGE_INIT: &str = "mod";

/// A loader together with the suffixes it claims
#[derive(Clone)]
pub struct LoaderEntry {
    pub loader: Rc<dyn ModuleLoader>,
    pub suffixes: &'static [&'static str],
}

impl LoaderEntry {
    #[must_use]
    pub fn new(loader: Rc<dyn ModuleLoader>, suffixes: &'static [&'static str]) -> Self {
        Self { loader, suffixes }
    }
}

/// Factory of finders for search-path directories
#[derive(Clone)]
pub struct PathHook {
    entries: Vec<LoaderEntry>,
}

impl PathHook {
    #[must_use]
    pub fn new(entries: Vec<LoaderEntry>) -> Self {
        Self { entries }
    }

    #[must_use]
    pub fn entries(&self) -> &[LoaderEntry] {
        &self.entries
    }

    /// Build a finder for `dir`, or `None` if this hook cannot serve it
    #[must_use]
    pub fn finder_for(&self, dir: &Path) -> Option<FileFinder> {
        dir.is_dir().then(|| FileFinder { dir: dir.to_path_buf(), entries: self.entries.clone() })
    }
}

/// The hook every runtime starts with: native, source, precompiled
#[must_use]
pub fn default_path_hook() -> PathHook {
    PathHook::new(vec![
        LoaderEntry::new(Rc::new(NativeLoader), NATIVE_SUFFIXES),
        LoaderEntry::new(Rc::new(SourceLoader), SOURCE_SUFFIXES),
        LoaderEntry::new(Rc::new(PrecompiledLoader), PRECOMPILED_SUFFIXES),
    ])
}

/// Where a module lives and which loader executes it
#[derive(Clone)]
pub struct ModuleSpec {
    pub name: ModuleName,
    pub file: PathBuf,
    pub loader: Rc<dyn ModuleLoader>,
    pub is_package: bool,
}

/// Resolves module names inside one directory
pub struct FileFinder {
    dir: PathBuf,
    entries: Vec<LoaderEntry>,
}

impl FileFinder {
    #[must_use]
    pub fn find_spec(&self, name: &ModuleName) -> Option<ModuleSpec> {
        let mut base = self.dir.clone();
        base.extend(name.segments());

        if base.is_dir() {
            if let Some((file, loader)) = self.first_match(&base.join(PACKAGE_INIT)) {
                return Some(ModuleSpec { name: name.clone(), file, loader, is_package: true });
            }
        }

        self.first_match(&base)
            .map(|(file, loader)| ModuleSpec { name: name.clone(), file, loader, is_package: false })
    }

    fn first_match(&self, stem: &Path) -> Option<(PathBuf, Rc<dyn ModuleLoader>)> {
        self.entries.iter().find_map(|entry| {
            entry
                .suffixes
                .iter()
                .map(|suffix| with_suffix(stem, suffix))
                .find(|candidate| candidate.is_file())
                .map(|file| (file, Rc::clone(&entry.loader)))
        })
    }
}

fn with_suffix(stem: &Path, suffix: &str) -> PathBuf {
    let mut path = OsString::from(stem.as_os_str());
    path.push(suffix);
    PathBuf::from(path)
}
