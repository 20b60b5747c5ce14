//! Record Store Tests
//!
//! Lifecycle guards, merge semantics, append history and snapshot reduction,
//! checked against the files the store leaves on disk.

use std::fs;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};

use exptrack::experiment::document::{read_document, META_FILE, PARAMS_FILE, VALUES_FILE};
use exptrack::experiment::series::{read_series, series_path};
use exptrack::experiment::{ExperimentMeta, RecordStore, Reduce, SeriesRow};
use exptrack::{Error, Map, StoreConfig, Value};
use tempfile::TempDir;

fn setup() -> (TempDir, RecordStore) {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = RecordStore::builder().log_root(dir.path()).build();
    (dir, store)
}

// =============================================================================
// Lifecycle
// =============================================================================

#[test]
fn test_logging_without_experiment_fails() {
    let (_dir, mut store) = setup();

    assert!(matches!(store.log_param("lr", 0.1), Err(Error::NoActiveExperiment)));
    assert!(matches!(
        store.log_params([("lr", 0.1)]),
        Err(Error::NoActiveExperiment)
    ));
    assert!(matches!(
        store.log_value("loss", 0.5, Some(0), None),
        Err(Error::NoActiveExperiment)
    ));
    assert!(matches!(
        store.log_values([("loss", 0.5)], None, Some(&Reduce::Minimum)),
        Err(Error::NoActiveExperiment)
    ));
    assert!(matches!(store.end_experiment(), Err(Error::NoActiveExperiment)));
}

#[test]
fn test_logging_after_end_fails() {
    let (_dir, mut store) = setup();
    store.start_experiment(Some("run1")).unwrap();
    store.end_experiment().unwrap();

    assert!(matches!(store.log_param("lr", 0.1), Err(Error::NoActiveExperiment)));
}

#[test]
fn test_colliding_id_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = RecordStore::builder()
        .log_root(dir.path())
        .id_generator(|| "fixed-id".to_string())
        .build();

    store.start_experiment(Some("first")).unwrap();
    let second = store.start_experiment(Some("second"));
    assert!(matches!(second, Err(Error::ExperimentExists(p)) if p.ends_with("fixed-id")));

    // The first experiment's metadata is untouched
    let meta: ExperimentMeta = read_document(&dir.path().join("fixed-id").join(META_FILE))
        .unwrap()
        .unwrap();
    assert_eq!(meta.experiment_name(), Some("first"));
}

#[test]
fn test_sequential_ids_do_not_collide() {
    let dir = tempfile::tempdir().unwrap();
    let counter = AtomicUsize::new(0);
    let mut store = RecordStore::builder()
        .log_root(dir.path())
        .id_generator(move || format!("exp-{}", counter.fetch_add(1, Ordering::SeqCst)))
        .build();

    let a = store.start_experiment(None).unwrap().experiment_id().to_string();
    let b = store.start_experiment(None).unwrap().experiment_id().to_string();
    assert_eq!(a, "exp-0");
    assert_eq!(b, "exp-1");
}

#[test]
fn test_invalid_name_creates_nothing() {
    let (dir, mut store) = setup();

    for name in ["", "has space", "../up", ".dot"] {
        let result = store.start_experiment(Some(name));
        assert!(matches!(result, Err(Error::InvalidName(_))), "{name:?} accepted");
    }
    assert!(store.active().is_none());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_resume_restores_identity_and_keeps_data() {
    let (_dir, mut store) = setup();
    let started = store.start_experiment(Some("resumable")).unwrap().clone();
    store.log_param("lr", 0.1).unwrap();
    store.end_experiment().unwrap();

    let resumed = store.resume_experiment(started.path()).unwrap().clone();
    assert_eq!(resumed, started);

    store.log_param("batch", 32).unwrap();
    let params: Map = read_document(&started.path().join(PARAMS_FILE)).unwrap().unwrap();
    assert_eq!(params["lr"], Value::Float(0.1));
    assert_eq!(params["batch"], Value::Int(32));
}

#[test]
fn test_resume_rejects_missing_or_uninitialized() {
    let (dir, mut store) = setup();

    let missing = dir.path().join("nope");
    assert!(matches!(
        store.resume_experiment(&missing),
        Err(Error::InvalidExperiment(_))
    ));

    let bare = dir.path().join("bare");
    fs::create_dir(&bare).unwrap();
    assert!(matches!(
        store.resume_experiment(&bare),
        Err(Error::InvalidExperiment(_))
    ));
    assert!(store.active().is_none());
}

#[test]
fn test_config_builder() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig {
        log_root: dir.path().join("from-config"),
    };
    let mut store = RecordStore::builder().config(config).build();
    let path = store.start_experiment(None).unwrap().path().to_path_buf();
    assert!(path.starts_with(dir.path().join("from-config")));
}

// =============================================================================
// Params
// =============================================================================

#[test]
fn test_params_merge_last_write_wins() {
    let (_dir, mut store) = setup();
    let path = store.start_experiment(Some("params")).unwrap().path().to_path_buf();

    store.log_param("param1", 1).unwrap();
    store.log_params([("param3", 3), ("param4", 4)]).unwrap();
    store.log_param("param2", 2).unwrap();
    store.log_param("param1", 10).unwrap();

    let params: Map = read_document(&path.join(PARAMS_FILE)).unwrap().unwrap();
    let keys: Vec<&str> = params.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["param1", "param3", "param4", "param2"]);
    assert_eq!(params["param1"], Value::Int(10));
    assert_eq!(params["param4"], Value::Int(4));
}

#[test]
fn test_nested_param_values() {
    let (_dir, mut store) = setup();
    let path = store.start_experiment(None).unwrap().path().to_path_buf();

    let mut optimizer = Map::new();
    optimizer.insert("name".into(), "adam".into());
    optimizer.insert("betas".into(), vec![0.9, 0.999].into());
    store.log_param("optimizer", optimizer.clone()).unwrap();

    let params: Map = read_document(&path.join(PARAMS_FILE)).unwrap().unwrap();
    assert_eq!(params["optimizer"], Value::Map(optimizer));
}

// =============================================================================
// Values
// =============================================================================

#[test]
fn test_end_to_end_scenario() {
    let (_dir, mut store) = setup();
    let path = store.start_experiment(Some("run1")).unwrap().path().to_path_buf();

    store.log_params([("lr", 0.1)]).unwrap();
    store.log_value("loss", 0.9, Some(0), Some(&Reduce::Minimum)).unwrap();
    store.log_value("loss", 0.5, Some(1), Some(&Reduce::Minimum)).unwrap();
    store.end_experiment().unwrap();

    let rows = read_series(&series_path(&path, "loss")).unwrap();
    assert_eq!(rows, vec![SeriesRow::new(Some(0), 0.9), SeriesRow::new(Some(1), 0.5)]);

    let snapshot: Map = read_document(&path.join(VALUES_FILE)).unwrap().unwrap();
    assert_eq!(snapshot["loss"], Value::Float(0.5));

    let params: Map = read_document(&path.join(PARAMS_FILE)).unwrap().unwrap();
    assert_eq!(params["lr"], Value::Float(0.1));
}

#[test]
fn test_log_values_in_mapping_order() {
    let (_dir, mut store) = setup();
    let path = store.start_experiment(None).unwrap().path().to_path_buf();

    for i in 0..10_i32 {
        store
            .log_values([("value5", 3 * i), ("value6", 4 * i)], Some(i64::from(i)), Some(&Reduce::Maximum))
            .unwrap();
    }

    let value6 = read_series(&series_path(&path, "value6")).unwrap();
    assert_eq!(value6.len(), 10);
    assert_eq!(value6[9], SeriesRow::new(Some(9), 36));

    let snapshot: Map = read_document(&path.join(VALUES_FILE)).unwrap().unwrap();
    let keys: Vec<&str> = snapshot.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["value5", "value6"]);
    assert_eq!(snapshot["value5"], Value::Int(27));
}

#[test]
fn test_reducers_are_per_call() {
    let (_dir, mut store) = setup();
    let path = store.start_experiment(None).unwrap().path().to_path_buf();

    store.log_value("acc", 0.6, Some(0), Some(&Reduce::Maximum)).unwrap();
    store.log_value("acc", 0.8, Some(1), Some(&Reduce::Maximum)).unwrap();
    store.log_value("acc", 0.7, Some(2), Some(&Reduce::Newest)).unwrap();
    // History-only append leaves the snapshot alone
    store.log_value("acc", 0.1, Some(3), None).unwrap();

    let snapshot: Map = read_document(&path.join(VALUES_FILE)).unwrap().unwrap();
    assert_eq!(snapshot["acc"], Value::Float(0.7));
    assert_eq!(read_series(&series_path(&path, "acc")).unwrap().len(), 4);
}

#[test]
fn test_custom_reducer_closure() {
    let (_dir, mut store) = setup();
    let path = store.start_experiment(None).unwrap().path().to_path_buf();

    let count = |_new: &Value, prev: Option<&Value>| match prev {
        Some(Value::Int(n)) => Value::Int(n + 1),
        _ => Value::Int(1),
    };
    for v in [5, 6, 7] {
        store.log_value("events", v, None, Some(&count)).unwrap();
    }

    let snapshot: Map = read_document(&path.join(VALUES_FILE)).unwrap().unwrap();
    assert_eq!(snapshot["events"], Value::Int(3));
}

#[test]
fn test_resume_after_torn_append_keeps_rows_separate() {
    let (_dir, mut store) = setup();
    let path = store.start_experiment(Some("torn")).unwrap().path().to_path_buf();
    store.log_value("loss", 0.9, Some(0), None).unwrap();
    store.end_experiment().unwrap();

    // Simulate a crash midway through writing the next row
    let table = series_path(&path, "loss");
    let mut file = fs::OpenOptions::new().append(true).open(&table).unwrap();
    file.write_all(b"1").unwrap();
    drop(file);

    store.resume_experiment(&path).unwrap();
    store.log_value("loss", 0.3, Some(2), None).unwrap();

    let rows = read_series(&table).unwrap();
    assert_eq!(rows, vec![SeriesRow::new(Some(0), 0.9), SeriesRow::new(Some(2), 0.3)]);
}

#[test]
fn test_string_values_keep_their_type_in_history() {
    let (_dir, mut store) = setup();
    let path = store.start_experiment(None).unwrap().path().to_path_buf();

    let logged = ["", "42", "inf", "true", "[1]", "\"quoted\"", "plain"];
    for (step, s) in (0_i64..).zip(logged) {
        store.log_value("note", s, Some(step), None).unwrap();
    }

    let values: Vec<Value> = read_series(&series_path(&path, "note"))
        .unwrap()
        .into_iter()
        .map(|row| row.value)
        .collect();
    let expected: Vec<Value> = logged.iter().map(|s| Value::from(*s)).collect();
    assert_eq!(values, expected);
}
