//! Integration tests for the SettingsStore:
//! - default reads, validated writes, delete-reverts-to-default
//! - synchronous observer fan-out in registration order
//! - snapshot export/load and file round-trip
//!
//! NOTE: temp files use a std-only unique-path helper; no extra
//! dev-dependencies needed.

use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use pretty_assertions::assert_eq;
use settings::{
    ChangeEvent, Constraint, Descriptor, DescriptorRegistry, SettingsError, SettingsStore,
    Snapshot, Value,
};

fn unique_temp_path(name: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    path.push(format!("settings_store_test_{name}_{nanos}.ron"));
    path
}

fn registry() -> Arc<DescriptorRegistry> {
    let mut registry = DescriptorRegistry::new();
    registry
        .register(Descriptor::group(
            "general",
            vec![
                Descriptor::item("autostart", Value::Bool(false)),
                Descriptor::item("tick_rate", Value::Integer(60))
                    .with_constraint(Constraint::IntegerRange { min: 1, max: 240 }),
                Descriptor::item("scale", Value::Float(1.0))
                    .with_constraint(Constraint::FloatRange { min: 0.5, max: 4.0 }),
                Descriptor::item("name", Value::Text("server".into()))
                    .with_constraint(Constraint::MaxLength(16)),
                Descriptor::item("theme", Value::Choice("dark".into())).with_constraint(
                    Constraint::OneOf(vec!["dark".into(), "light".into()]),
                ),
                Descriptor::item("accent", Value::Color([0x20, 0x66, 0xd0, 0xff])),
            ],
        ))
        .expect("register general");
    Arc::new(registry)
}

fn store() -> SettingsStore {
    SettingsStore::builder()
        .with_registry(registry())
        .build()
        .expect("build store")
}

#[test]
fn get_returns_default_before_first_write() {
    let store = store();
    assert_eq!(store.get("general.tick_rate").unwrap(), Value::Integer(60));
    assert!(!store.contains("general.tick_rate"));
}

#[test]
fn set_then_get_round_trips_every_kind() {
    let store = store();
    let writes = [
        ("general.autostart", Value::Bool(true)),
        ("general.tick_rate", Value::Integer(120)),
        ("general.scale", Value::Float(2.0)),
        ("general.name", Value::Text("render box".into())),
        ("general.theme", Value::Choice("light".into())),
        ("general.accent", Value::Color([1, 2, 3, 255])),
    ];
    for (key, value) in writes {
        store.set(key, value.clone()).expect(key);
        assert_eq!(store.get(key).unwrap(), value);
    }
}

#[test]
fn delete_reverts_to_default_for_every_kind() {
    let store = store();
    store.set("general.autostart", Value::Bool(true)).unwrap();
    store.set("general.tick_rate", Value::Integer(120)).unwrap();
    store.set("general.scale", Value::Float(2.0)).unwrap();
    store.set("general.name", Value::Text("other".into())).unwrap();
    store.set("general.theme", Value::Choice("light".into())).unwrap();
    store.set("general.accent", Value::Color([1, 2, 3, 4])).unwrap();

    for (key, _) in store.registry().leaves() {
        store.delete(&key).expect("delete");
        let descriptor = store.registry().resolve(&key).unwrap();
        assert_eq!(&store.get(&key).unwrap(), descriptor.default().unwrap());
    }
}

#[test]
fn delete_is_idempotent() {
    let store = store();
    store.delete("general.tick_rate").expect("first delete");
    store.delete("general.tick_rate").expect("second delete");
    assert_eq!(store.get("general.tick_rate").unwrap(), Value::Integer(60));
}

#[test]
fn set_rejects_kind_mismatch() {
    let store = store();
    match store.set("general.autostart", Value::Integer(1)) {
        Err(SettingsError::Validation(offenders)) => {
            assert_eq!(offenders.len(), 1);
            assert_eq!(offenders[0].0, "general.autostart");
        }
        other => panic!("expected Validation, got {other:?}"),
    }
    // Nothing was written.
    assert!(!store.contains("general.autostart"));
}

#[test]
fn set_rejects_constraint_violations() {
    let store = store();
    assert!(store.set("general.tick_rate", Value::Integer(500)).is_err());
    assert!(store
        .set("general.theme", Value::Choice("solarized".into()))
        .is_err());
    assert!(store
        .set("general.name", Value::Text("a".repeat(32)))
        .is_err());
    assert_eq!(store.export(), Snapshot::new());
}

#[test]
fn unknown_keys_fail() {
    let store = store();
    assert!(matches!(
        store.get("general.missing"),
        Err(SettingsError::UnknownKey(_))
    ));
    assert!(matches!(
        store.set("general.missing", Value::Bool(true)),
        Err(SettingsError::UnknownKey(_))
    ));
    assert!(matches!(
        store.delete("general.missing"),
        Err(SettingsError::UnknownKey(_))
    ));
}

#[test]
fn group_paths_hold_no_value() {
    let store = store();
    assert!(matches!(
        store.get("general"),
        Err(SettingsError::Validation(_))
    ));
    assert!(matches!(
        store.set("general", Value::Bool(true)),
        Err(SettingsError::Validation(_))
    ));
}

#[test]
fn observers_run_synchronously_in_registration_order() {
    let store = store();
    let events: Arc<Mutex<Vec<(&'static str, ChangeEvent)>>> = Arc::new(Mutex::new(Vec::new()));

    let sink = Arc::clone(&events);
    store.observe(move |event| sink.lock().unwrap().push(("first", event.clone())));
    let sink = Arc::clone(&events);
    store.observe(move |event| sink.lock().unwrap().push(("second", event.clone())));

    store.set("general.tick_rate", Value::Integer(90)).unwrap();
    store.delete("general.tick_rate").unwrap();

    let events = events.lock().unwrap();
    let expected_set = ChangeEvent {
        key: "general.tick_rate".into(),
        value: Value::Integer(90),
        is_default: false,
    };
    let expected_delete = ChangeEvent {
        key: "general.tick_rate".into(),
        value: Value::Integer(60),
        is_default: true,
    };
    assert_eq!(
        *events,
        vec![
            ("first", expected_set.clone()),
            ("second", expected_set),
            ("first", expected_delete.clone()),
            ("second", expected_delete),
        ]
    );
}

#[test]
fn observer_events_match_the_store_under_concurrent_writes() {
    let store = Arc::new(store());
    let mismatches: Arc<Mutex<Vec<(Value, Value)>>> = Arc::new(Mutex::new(Vec::new()));

    // A slow observer reading the key back: the value it sees must
    // still be the one its event carries, because a mutation and its
    // fan-out form one critical section.
    let sink = Arc::clone(&mismatches);
    let reader = Arc::clone(&store);
    store.observe(move |event| {
        thread::sleep(Duration::from_micros(50));
        let current = reader.get(&event.key).unwrap();
        if current != event.value {
            sink.lock().unwrap().push((event.value.clone(), current));
        }
    });

    let writers: Vec<_> = [0i64, 100]
        .into_iter()
        .map(|base| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for n in 1..=40 {
                    store
                        .set("general.tick_rate", Value::Integer(base + n))
                        .unwrap();
                }
            })
        })
        .collect();
    for writer in writers {
        writer.join().unwrap();
    }

    assert_eq!(*mismatches.lock().unwrap(), vec![]);
}

#[test]
fn unobserve_stops_notifications() {
    let store = store();
    let count = Arc::new(Mutex::new(0usize));

    let sink = Arc::clone(&count);
    let id = store.observe(move |_| *sink.lock().unwrap() += 1);

    store.set("general.autostart", Value::Bool(true)).unwrap();
    store.unobserve(id);
    store.set("general.autostart", Value::Bool(false)).unwrap();

    assert_eq!(*count.lock().unwrap(), 1);
}

#[test]
fn export_skips_overrides_equal_to_default() {
    let store = store();
    store.set("general.tick_rate", Value::Integer(60)).unwrap();
    store.set("general.autostart", Value::Bool(true)).unwrap();

    // The override exists but does not need persisting.
    assert!(store.contains("general.tick_rate"));
    let snapshot = store.export();
    assert_eq!(
        snapshot,
        Snapshot::from([("general.autostart".to_string(), Value::Bool(true))])
    );
}

#[test]
fn load_prunes_orphan_and_invalid_entries() {
    let store = store();
    let snapshot = Snapshot::from([
        ("general.autostart".to_string(), Value::Bool(true)),
        ("general.tick_rate".to_string(), Value::Integer(10_000)),
        ("general.gone".to_string(), Value::Bool(true)),
    ]);
    store.load(snapshot).expect("load");

    assert_eq!(store.get("general.autostart").unwrap(), Value::Bool(true));
    assert_eq!(store.get("general.tick_rate").unwrap(), Value::Integer(60));
    assert_eq!(
        store.export(),
        Snapshot::from([("general.autostart".to_string(), Value::Bool(true))])
    );
}

#[test]
fn snapshot_file_round_trip() {
    let path = unique_temp_path("round_trip");
    let _ = fs::remove_file(&path);

    let store = store();
    store.set("general.theme", Value::Choice("light".into())).unwrap();
    store.set("general.scale", Value::Float(2.0)).unwrap();
    store.write_snapshot(&path).expect("write snapshot");

    let reloaded = SettingsStore::builder()
        .with_registry(registry())
        .with_snapshot_file(&path)
        .build()
        .expect("build from file");

    assert_eq!(
        reloaded.get("general.theme").unwrap(),
        Value::Choice("light".into())
    );
    assert_eq!(reloaded.get("general.scale").unwrap(), Value::Float(2.0));
    assert_eq!(reloaded.get("general.tick_rate").unwrap(), Value::Integer(60));

    let _ = fs::remove_file(&path);
}

#[test]
fn builder_requires_a_registry() {
    assert!(matches!(
        SettingsStore::builder().build(),
        Err(SettingsError::Config(_))
    ));
}
