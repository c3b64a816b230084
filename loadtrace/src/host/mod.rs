//! Host module runtime
//!
//! A small file-based module system with the same moving parts as a
//! path-hook import pipeline:
//! - `runtime`: search path, module table, import algorithm, program bootstrap
//! - `finder`: path hooks that build per-directory file finders
//! - `loader`: the `ModuleLoader` capability and its native/source/precompiled variants
//! - `program`: the directive language module bodies are written in
//! - `module`: module descriptors handed to loaders

pub mod finder;
pub mod loader;
pub mod module;
pub mod program;
pub mod runtime;

pub use finder::{default_path_hook, FileFinder, LoaderEntry, ModuleSpec, PathHook};
pub use loader::{ModuleLoader, NativeLoader, PrecompiledLoader, SourceLoader};
pub use module::Module;
pub use program::{Instruction, Program};
pub use runtime::Runtime;
