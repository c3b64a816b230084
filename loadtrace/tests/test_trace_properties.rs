//! Properties of the record stream produced by hooked runtimes

use loadtrace::domain::{LoadError, ModuleName};
use loadtrace::host::{Instruction, Program, Runtime};
use loadtrace::profiling::{install_hooks, EventHandler, ProfilingSession};
use loadtrace_common::{EventKind, EventRecord};
use std::cell::{Cell, RefCell};
use std::fs;
use std::path::Path;
use std::rc::Rc;

#[derive(Default)]
struct Collector {
    records: RefCell<Vec<EventRecord>>,
}

impl EventHandler for Collector {
    fn handle(&self, record: &EventRecord) {
        self.records.borrow_mut().push(record.clone());
    }
}

fn write(root: &Path, rel: &str, contents: &[u8]) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn name(s: &str) -> ModuleName {
    ModuleName::parse(s).unwrap()
}

/// Hooked runtime over `root` recording into a collector
fn traced(root: &Path, session: ProfilingSession) -> (Runtime, Rc<Collector>) {
    let session = Rc::new(session);
    let collector = Rc::new(Collector::default());
    session.add_handler(collector.clone());

    let runtime = Runtime::new(vec![root.to_path_buf()]);
    install_hooks(&runtime, &session);
    (runtime, collector)
}

/// Every prefix has at least as many enters as leaves, every leave closes
/// the innermost open load, and each depth is one more than the open loads
/// before it.
fn assert_well_nested(records: &[EventRecord]) {
    let mut open: Vec<&EventRecord> = Vec::new();
    for record in records {
        match record.kind {
            EventKind::Enter => {
                assert_eq!(record.depth as usize, open.len() + 1, "enter {}", record.module_name);
                open.push(record);
            }
            EventKind::Leave => {
                let enter = open.pop().expect("leave without matching enter");
                assert_eq!(enter.module_name, record.module_name);
                assert_eq!(enter.depth, record.depth);
                assert_eq!(record.duration, record.elapsed - enter.elapsed);
            }
        }
    }
    assert!(open.is_empty(), "unclosed loads: {open:?}");
}

#[test]
fn test_tree_of_imports_is_well_nested() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "main.src", b"import a\nimport c\n");
    write(dir.path(), "a/mod.src", b"import a.b\nimport c\n");
    write(dir.path(), "a/b.src", b"import c\nalloc 64\n");
    write(dir.path(), "c.src", b"sleep 1\n");

    let (runtime, collector) = traced(dir.path(), ProfilingSession::new(|| 0u64));
    runtime.run_main(&dir.path().join("main.src")).unwrap();

    let records = collector.records.borrow();
    assert_well_nested(&records);

    let entered: Vec<&str> =
        records.iter().filter(|r| r.is_enter()).map(|r| r.module_name.as_str()).collect();
    // `c` is loaded once, from the deepest importer that reaches it first
    assert_eq!(entered, vec!["a", "a.b", "c"]);
    assert_eq!(records.iter().find(|r| r.module_name == "c").unwrap().depth, 3);
}

#[test]
fn test_memory_delta_is_difference_of_samples() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "main.src", b"import grow\n");
    write(dir.path(), "grow.src", b"alloc 1\n");

    let counter = Cell::new(1000u64);
    let probe = move || {
        let value = counter.get();
        counter.set(value + 250);
        value
    };

    let (runtime, collector) = traced(dir.path(), ProfilingSession::new(probe));
    runtime.run_main(&dir.path().join("main.src")).unwrap();

    let records = collector.records.borrow();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].total_memory, 1000);
    assert_eq!(records[0].memory_delta, 0);
    assert_eq!(records[1].total_memory, 1250);
    assert_eq!(records[1].memory_delta, 250);
}

#[test]
fn test_failed_load_inside_package_closes_every_level() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "main.src", b"import pkg\n");
    write(dir.path(), "pkg/mod.src", b"import pkg.broken\n");
    write(dir.path(), "pkg/broken.src", b"raise bad things\n");

    let (runtime, collector) = traced(dir.path(), ProfilingSession::new(|| 0u64));
    let err = runtime.run_main(&dir.path().join("main.src")).unwrap_err();

    assert!(matches!(err, LoadError::Raised { ref module, .. } if module.as_str() == "pkg.broken"));

    let records = collector.records.borrow();
    assert_well_nested(&records);
    let failed: Vec<&str> =
        records.iter().filter(|r| r.failed).map(|r| r.module_name.as_str()).collect();
    assert_eq!(failed, vec!["pkg.broken", "pkg"]);
    assert!(runtime.module(&name("pkg")).is_none());
}

#[test]
fn test_native_and_precompiled_loads_are_traced() {
    let dir = tempfile::tempdir().unwrap();
    let image = Program {
        instructions: vec![
            Instruction::Import { module: name("fast") },
            Instruction::Alloc { bytes: 32 },
        ],
    }
    .to_image()
    .unwrap();

    write(dir.path(), "main.src", b"import cached\n");
    write(dir.path(), "cached.srcc", &image);
    write(dir.path(), "fast.so", b"\x7fELF not really");

    let (runtime, collector) = traced(dir.path(), ProfilingSession::new(|| 0u64));
    runtime.run_main(&dir.path().join("main.src")).unwrap();

    let records = collector.records.borrow();
    assert_well_nested(&records);

    let fast = records.iter().find(|r| r.module_name == "fast").unwrap();
    assert_eq!(fast.depth, 2);
    assert!(fast.module_file.ends_with("fast.so"));
    assert!(runtime.module(&name("cached")).unwrap().retained_bytes() >= 32);
}

#[test]
fn test_unhooked_runtime_emits_nothing() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "main.src", b"import m\n");
    write(dir.path(), "m.src", b"");

    let session = Rc::new(ProfilingSession::new(|| 0u64));
    let collector = Rc::new(Collector::default());
    session.add_handler(collector.clone());

    let runtime = Runtime::new(vec![dir.path().to_path_buf()]);
    runtime.run_main(&dir.path().join("main.src")).unwrap();

    assert!(collector.records.borrow().is_empty());
    assert_eq!(session.stats().loads, 0);
}

#[test]
fn test_module_level_counts_segments() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "main.src", b"import x.y.z\n");
    write(dir.path(), "x/mod.src", b"");
    write(dir.path(), "x/y/mod.src", b"");
    write(dir.path(), "x/y/z.src", b"");

    let (runtime, collector) = traced(dir.path(), ProfilingSession::new(|| 0u64));
    runtime.run_main(&dir.path().join("main.src")).unwrap();

    let levels: Vec<(String, u32, u32)> = collector
        .records
        .borrow()
        .iter()
        .filter(|r| r.is_enter())
        .map(|r| (r.module_name.clone(), r.module_level, r.depth))
        .collect();

    // parents are imported before, not inside, the child load
    assert_eq!(
        levels,
        vec![
            ("x".to_string(), 1, 1),
            ("x.y".to_string(), 2, 1),
            ("x.y.z".to_string(), 3, 1),
        ]
    );
}
