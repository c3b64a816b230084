//! Hook installation

use log::info;
use std::rc::Rc;

use super::{ProfiledLoader, ProfilingSession};
use crate::host::{default_path_hook, LoaderEntry, PathHook, Runtime};

/// Route every future module lookup through traced loaders
///
/// Starts the session clock, wraps each loader of the runtime's first path
/// hook in a [`ProfiledLoader`], inserts the wrapped table as the new first
/// hook and drops cached finders so that already visited directories pick it
/// up too.
///
/// Must run before the target program executes. Calling it twice wraps the
/// wrapped loaders again, so every load is counted twice at two depths.
pub fn install_hooks(runtime: &Runtime, session: &Rc<ProfilingSession>) {
    session.start();

    let base = runtime
        .path_hooks()
        .into_iter()
        .next()
        .map_or_else(default_path_hook, |hook| hook.as_ref().clone());

    let wrapped: Vec<LoaderEntry> = base
        .entries()
        .iter()
        .map(|entry| {
            let loader = ProfiledLoader::new(Rc::clone(&entry.loader), Rc::clone(session));
            LoaderEntry::new(Rc::new(loader), entry.suffixes)
        })
        .collect();

    let kinds: Vec<String> = wrapped.iter().map(|entry| entry.loader.kind().to_string()).collect();
    runtime.insert_path_hook(0, PathHook::new(wrapped));
    runtime.invalidate_caches();

    info!("load hooks installed for {} loaders", kinds.join(", "));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ModuleName;
    use std::fs;

    #[test]
    fn test_install_wraps_every_loader_kind() {
        let runtime = Runtime::new(Vec::new());
        let session = Rc::new(ProfilingSession::new(|| 0u64));

        install_hooks(&runtime, &session);

        let hooks = runtime.path_hooks();
        assert_eq!(hooks.len(), 2);
        assert_eq!(hooks[0].entries().len(), hooks[1].entries().len());
        for (wrapped, original) in hooks[0].entries().iter().zip(hooks[1].entries()) {
            assert_eq!(wrapped.loader.kind(), original.loader.kind());
            assert_eq!(wrapped.suffixes, original.suffixes);
            assert!(!Rc::ptr_eq(&wrapped.loader, &original.loader));
        }
    }

    #[test]
    fn test_install_reaches_directories_visited_before() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("early.src"), "").unwrap();
        fs::write(dir.path().join("late.src"), "").unwrap();

        let runtime = Runtime::new(vec![dir.path().to_path_buf()]);
        let session = Rc::new(ProfilingSession::new(|| 0u64));

        runtime.import(&ModuleName::parse("early").unwrap()).unwrap();
        install_hooks(&runtime, &session);
        runtime.import(&ModuleName::parse("late").unwrap()).unwrap();

        assert_eq!(session.stats().loads, 1);
    }

    #[test]
    fn test_double_install_double_counts() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("m.src"), "").unwrap();

        let runtime = Runtime::new(vec![dir.path().to_path_buf()]);
        let session = Rc::new(ProfilingSession::new(|| 0u64));

        install_hooks(&runtime, &session);
        install_hooks(&runtime, &session);
        runtime.import(&ModuleName::parse("m").unwrap()).unwrap();

        assert_eq!(session.stats().loads, 2);
        assert_eq!(session.depth(), 0);
    }
}
