//! Module loaders
//!
//! A loader executes one kind of module file. The runtime never calls a
//! concrete loader type directly, only the [`ModuleLoader`] trait, so a
//! decorator implementing the same trait can be swapped in by installing a
//! new path hook.

use log::debug;
use std::fs;

use super::{Module, Program, Runtime};
use crate::domain::{LoadError, LoaderKind};

/// File suffixes of native extensions on this platform
#[cfg(target_os = "macos")]
pub const NATIVE_SUFFIXES: &[&str] = &[".dylib", ".so"];
#[cfg(not(target_os = "macos"))]
pub const NATIVE_SUFFIXES: &[&str] = &[".so"];

pub const SOURCE_SUFFIXES: &[&str] = &[".src"];

pub const PRECOMPILED_SUFFIXES: &[&str] = &[".srcc"];

/// Capability of executing a module
pub trait ModuleLoader {
    fn kind(&self) -> LoaderKind;

    /// Execute `module`'s body
    ///
    /// # Errors
    /// Returns the failure of the module body or of any import it triggers.
    fn exec_module(&self, module: &Module, runtime: &Runtime) -> Result<(), LoadError>;
}

/// Maps a native extension into the process
///
/// The file contents stay resident for the lifetime of the module. Native
/// modules trigger no nested imports.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeLoader;

impl ModuleLoader for NativeLoader {
    fn kind(&self) -> LoaderKind {
        LoaderKind::Native
    }

    fn exec_module(&self, module: &Module, _runtime: &Runtime) -> Result<(), LoadError> {
        let image = fs::read(module.file())
            .map_err(|source| LoadError::Io { file: module.file().to_path_buf(), source })?;
        debug!("mapped {} ({} bytes)", module.file().display(), image.len());
        module.retain(image);
        Ok(())
    }
}

/// Parses and runs a text module
#[derive(Debug, Default, Clone, Copy)]
pub struct SourceLoader;

impl ModuleLoader for SourceLoader {
    fn kind(&self) -> LoaderKind {
        LoaderKind::Source
    }

    fn exec_module(&self, module: &Module, runtime: &Runtime) -> Result<(), LoadError> {
        let text = fs::read_to_string(module.file())
            .map_err(|source| LoadError::Io { file: module.file().to_path_buf(), source })?;
        Program::parse(&text, module.file())?.execute(module, runtime)
    }
}

/// Decodes and runs a precompiled image
#[derive(Debug, Default, Clone, Copy)]
pub struct PrecompiledLoader;

impl ModuleLoader for PrecompiledLoader {
    fn kind(&self) -> LoaderKind {
        LoaderKind::Precompiled
    }

    fn exec_module(&self, module: &Module, runtime: &Runtime) -> Result<(), LoadError> {
        let image = fs::read(module.file())
            .map_err(|source| LoadError::Io { file: module.file().to_path_buf(), source })?;
        Program::from_image(&image, module.file())?.execute(module, runtime)
    }
}
