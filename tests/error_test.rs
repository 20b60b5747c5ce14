//! Tests for error types

use std::path::PathBuf;

use exptrack::Error;

#[test]
fn test_invalid_name_error() {
    let error = Error::InvalidName("bad name".to_string());
    let error_str = format!("{error}");
    assert!(error_str.contains("Invalid experiment name"));
    assert!(error_str.contains("\"bad name\""));
}

#[test]
fn test_experiment_exists_error() {
    let error = Error::ExperimentExists(PathBuf::from("/logs/abc"));
    let error_str = format!("{error}");
    assert!(error_str.contains("Experiment already exists"));
    assert!(error_str.contains("/logs/abc"));
}

#[test]
fn test_invalid_experiment_error() {
    let error = Error::InvalidExperiment(PathBuf::from("/logs/missing"));
    let error_str = format!("{error}");
    assert!(error_str.contains("Invalid experiment"));
    assert!(error_str.contains("meta.yaml"));
}

#[test]
fn test_no_active_experiment_error() {
    let error = Error::NoActiveExperiment;
    let error_str = format!("{error}");
    assert!(error_str.contains("No active experiment"));
    assert!(error_str.contains("start_experiment"));
}

#[test]
fn test_invalid_log_root_error() {
    let error = Error::InvalidLogRoot(PathBuf::from("/nowhere"));
    assert!(format!("{error}").contains("Invalid log root: /nowhere"));
}

#[test]
fn test_invalid_key_error() {
    let error = Error::InvalidKey("a/b".to_string());
    assert!(format!("{error}").contains("Invalid value key"));
}

#[test]
fn test_non_numeric_cell_error() {
    let error = Error::NonNumericCell {
        experiment_id: "exp-1".to_string(),
        step: 4,
    };
    let error_str = format!("{error}");
    assert!(error_str.contains("exp-1"));
    assert!(error_str.contains("step 4"));
}

#[test]
fn test_io_error_conversion() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let error: Error = io_error.into();
    let error_str = format!("{error}");
    assert!(error_str.contains("IO error"));
    assert!(error_str.contains("file not found"));
}

#[test]
fn test_document_error_conversion() {
    let yaml_error = serde_yaml::from_str::<u32>("not a number").unwrap_err();
    let error: Error = yaml_error.into();
    assert!(format!("{error}").starts_with("Document error"));
}

#[test]
fn test_error_debug() {
    let error = Error::NoActiveExperiment;
    let debug_str = format!("{error:?}");
    assert!(debug_str.contains("NoActiveExperiment"));
}
