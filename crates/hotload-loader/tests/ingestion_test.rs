//! Integration tests for the ingestion pipeline against the reference host.

mod support;

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use hotload_core::types::RuntimeOptions;
use hotload_host::{ExecutorState, HostEvent};
use hotload_loader::{IngestErrorKind, ModuleSource, TickOutcome, TrackerDirectory};
use support::{ModuleBuilder, TestHost, bar_module, foo_module};
use tokio::sync::watch;

#[test]
fn test_scenario_a_name_becomes_id() {
    let host = TestHost::new();
    let path = host.write_module("Foo.wasm", &foo_module());

    let record = host.pipeline().prepare(ModuleSource::file(&path)).unwrap();
    assert_eq!(record.id(), "Foo Mod");
    assert_eq!(record.entry_type().full_name, "Foo.Plugin");
    assert_eq!(record.runtime_options(), RuntimeOptions::SingleStartInit);
    assert!(!record.is_self());
    assert_eq!(record.source_location(), Some(path.as_path()));

    host.queue.enqueue(&path);
    let outcome = host.consumer.tick();

    let TickOutcome::Loaded(handle) = outcome else {
        panic!("expected a load, got {outcome:?}");
    };
    assert_eq!(handle.plugin_id, "Foo Mod");
    assert_eq!(host.tracker.snapshot(), vec!["Foo Mod"]);
    assert_eq!(host.manager.executor_state(handle.slot), Some(ExecutorState::Enabled));
    assert!(host.manager.is_enabled("Foo Mod"));
    assert_eq!(host.manager.restart_generation(), 1);
}

#[test]
fn test_scenario_b_missing_entry_type_and_queue_continues() {
    let host = TestHost::new();
    let bar = host.write_module("Bar.wasm", &bar_module());
    let foo = host.write_module("Foo.wasm", &foo_module());

    host.queue.enqueue(&bar);
    host.queue.enqueue(&foo);

    assert_eq!(
        host.consumer.tick(),
        TickOutcome::Failed {
            path: bar,
            kind: IngestErrorKind::EntryTypeNotFound,
        }
    );
    assert!(host.tracker.is_empty());
    assert_eq!(host.manager.plugin_count(), 0);

    assert!(matches!(host.consumer.tick(), TickOutcome::Loaded(_)));
    assert_eq!(host.tracker.snapshot(), vec!["Foo Mod"]);
}

#[test]
fn test_scenario_c_two_modules_load_in_enqueue_order() {
    let host = TestHost::new();
    let second = ModuleBuilder::counting("Second.Entry")
        .manifest("Second", r#"{"id":"second","name":"Second"}"#)
        .entry_type("Second.Entry", RuntimeOptions::DynamicInit)
        .build();
    let first = host.write_module("First.wasm", &foo_module());
    let second = host.write_module("Second.wasm", &second);

    host.queue.enqueue(&first);
    host.queue.enqueue(&second);
    assert_eq!(host.queue.len(), 2);

    assert!(matches!(host.consumer.tick(), TickOutcome::Loaded(_)));
    assert!(matches!(host.consumer.tick(), TickOutcome::Loaded(_)));
    assert_eq!(host.consumer.tick(), TickOutcome::Idle);

    assert_eq!(host.tracker.snapshot(), vec!["Foo Mod", "second"]);
    assert_eq!(host.manager.plugin_ids(), vec!["Foo Mod", "second"]);
    assert_eq!(host.manager.restart_generation(), 2);
}

#[test]
fn test_missing_manifest_leaves_registry_unchanged() {
    let host = TestHost::new();
    let bytes = ModuleBuilder::counting("Foo.Plugin")
        .entry_type("Foo.Plugin", RuntimeOptions::SingleStartInit)
        .build();
    let path = host.write_module("NoManifest.wasm", &bytes);

    host.queue.enqueue(&path);
    assert!(matches!(
        host.consumer.tick(),
        TickOutcome::Failed {
            kind: IngestErrorKind::ManifestNotFound,
            ..
        }
    ));
    assert!(host.tracker.is_empty());
    assert_eq!(host.manager.restart_generation(), 0);
}

#[test]
fn test_same_path_twice_loads_twice() {
    let host = TestHost::new();
    let path = host.write_module("Foo.wasm", &foo_module());

    host.queue.enqueue(&path);
    host.queue.enqueue(&path);
    host.consumer.tick();
    host.consumer.tick();

    assert_eq!(host.tracker.load_count("Foo Mod"), 2);
    assert_eq!(host.manager.plugin_count(), 2);
}

#[test]
fn test_entry_type_found_among_unrelated_types() {
    let host = TestHost::new();
    let bytes = ModuleBuilder::counting("Foo.Plugin")
        .manifest("Foo", r#"{"name":"Foo Mod"}"#)
        .entry_type("Other.Plugin", RuntimeOptions::SingleStartInit)
        .plain_type("Foo.A")
        .plain_type("Foo.B")
        .entry_type("Foo.Plugin", RuntimeOptions::DynamicInit)
        .plain_type("Foo.C")
        .build();

    let record = host.pipeline().prepare(ModuleSource::Bytes(bytes)).unwrap();
    assert_eq!(record.entry_type().full_name, "Foo.Plugin");
    assert_eq!(record.runtime_options(), RuntimeOptions::DynamicInit);
    assert!(record.source_location().is_none());
}

#[test]
fn test_entry_type_outside_namespace_is_not_found() {
    let host = TestHost::new();
    let bytes = ModuleBuilder::counting("Other.Plugin")
        .manifest("Foo", r#"{"name":"Foo Mod"}"#)
        .entry_type("Other.Plugin", RuntimeOptions::SingleStartInit)
        .build();

    let err = host.pipeline().load_from_bytes(bytes).unwrap_err();
    assert_eq!(err.kind(), IngestErrorKind::EntryTypeNotFound);
    assert!(host.tracker.is_empty());
}

#[test]
fn test_malformed_manifest_json() {
    let host = TestHost::new();
    let bytes = ModuleBuilder::counting("Foo.Plugin")
        .manifest("Foo", r#"{"name": "#)
        .entry_type("Foo.Plugin", RuntimeOptions::SingleStartInit)
        .build();

    let err = host.pipeline().load_from_bytes(bytes).unwrap_err();
    assert_eq!(err.kind(), IngestErrorKind::ManifestParse);
}

#[test]
fn test_stream_source() {
    let host = TestHost::new();
    let handle = host.pipeline().load_from_stream(Cursor::new(foo_module())).unwrap();
    assert_eq!(handle.plugin_id, "Foo Mod");
    assert!(host.tracker.has_loaded("Foo Mod"));
}

#[test]
fn test_unresolved_imports_do_not_abort_ingestion() {
    let host = TestHost::new();
    let wat = r#"(module
                   (import "missing_lib" "helper" (func))
                   (func (export "Imp.Plugin.init")))"#;
    let bytes = ModuleBuilder::new(wat)
        .manifest("Imp", r#"{"name":"Importer"}"#)
        .entry_type("Imp.Plugin", RuntimeOptions::SingleStartInit)
        .build();

    let handle = host.pipeline().load_from_bytes(bytes).unwrap();
    assert_eq!(handle.plugin_id, "Importer");
}

#[test]
fn test_failing_enable_is_not_rolled_back() {
    let host = TestHost::new();
    let wat = r#"(module (func (export "Bad.Plugin.on_enable") unreachable))"#;
    let bytes = ModuleBuilder::new(wat)
        .manifest("Bad", r#"{"name":"Bad"}"#)
        .entry_type("Bad.Plugin", RuntimeOptions::SingleStartInit)
        .build();
    let path = host.write_module("Bad.wasm", &bytes);

    host.queue.enqueue(&path);
    assert!(matches!(
        host.consumer.tick(),
        TickOutcome::Failed {
            kind: IngestErrorKind::Lifecycle,
            ..
        }
    ));

    assert_eq!(host.manager.plugin_count(), 1);
    assert_eq!(host.manager.executor_state(0), Some(ExecutorState::Created));
    assert!(!host.manager.is_enabled("Bad"));
    assert!(host.tracker.is_empty());
    assert_eq!(host.manager.restart_generation(), 0);
}

#[test]
fn test_unreadable_and_malformed_files() {
    let host = TestHost::new();
    let missing = host.plugins_dir.path().join("absent.wasm");
    let garbage = host.write_module("garbage.wasm", b"definitely not wasm");

    host.queue.enqueue(&missing);
    host.queue.enqueue(&garbage);

    assert!(matches!(
        host.consumer.tick(),
        TickOutcome::Failed {
            kind: IngestErrorKind::Io,
            ..
        }
    ));
    assert!(matches!(
        host.consumer.tick(),
        TickOutcome::Failed {
            kind: IngestErrorKind::MalformedModule,
            ..
        }
    ));
}

#[test]
fn test_cross_instance_query() {
    let host = TestHost::new();
    let directory = TrackerDirectory::new();
    directory.publish("HotLoader", Arc::clone(&host.tracker));

    host.pipeline().load_from_bytes(foo_module()).unwrap();

    assert!(directory.query("HotLoader", "Foo Mod"));
    assert!(!directory.query("HotLoader", "bar"));
    assert!(!directory.query("OtherLoader", "Foo Mod"));
}

#[tokio::test]
async fn test_load_triggers_soft_restart_event() {
    let host = TestHost::new();
    let mut events = host.manager.subscribe();

    host.pipeline().load_from_bytes(foo_module()).unwrap();

    assert_eq!(
        events.recv().await.unwrap(),
        HostEvent::SoftRestart { generation: 1 }
    );
}

#[tokio::test]
async fn test_run_loop_drains_queue_until_shutdown() {
    let host = TestHost::new();
    let path = host.write_module("Foo.wasm", &foo_module());
    host.queue.enqueue(&path);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let tracker = Arc::clone(&host.tracker);

    let stop = async move {
        for _ in 0..200 {
            if !tracker.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        shutdown_tx.send(true).unwrap();
    };

    tokio::join!(host.consumer.run(Duration::from_millis(1), shutdown_rx), stop);

    assert_eq!(host.tracker.snapshot(), vec!["Foo Mod"]);
    assert!(host.queue.is_empty());
}
