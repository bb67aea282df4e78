//! Unit tests for common-config crate

use std::io::Write;

use common_config::{OptimizerSettings, PartitionPruningConfig, QuarryConfig};
use common_error::QuarryError;

#[test]
fn test_quarry_config_default() {
    let config = QuarryConfig::default();

    assert_eq!(config.optimizer.max_iterations, 100);
    assert!(!config.optimizer.enable_trace);

    assert!(config.partition_pruning.catalog_side_pruning);
    assert_eq!(config.partition_pruning.session_time_zone, "UTC");
}

#[test]
fn test_pruning_config_builders() {
    let config = PartitionPruningConfig::default()
        .with_catalog_side_pruning(false)
        .with_session_time_zone("+08:00");

    assert!(!config.catalog_side_pruning);
    assert_eq!(config.session_time_zone, "+08:00");
}

#[test]
fn test_quarry_config_serialization() {
    let mut config = QuarryConfig::default();
    config.optimizer.max_iterations = 8;
    config.optimizer.enable_trace = true;
    config.partition_pruning.catalog_side_pruning = false;
    config.partition_pruning.session_time_zone = "-05:00".to_string();

    let json = serde_json::to_string(&config).unwrap();
    let deserialized: QuarryConfig = serde_json::from_str(&json).unwrap();

    assert_eq!(deserialized, config);
}

#[test]
fn test_partial_json_uses_defaults() {
    let config =
        QuarryConfig::from_json_str(r#"{ "partition_pruning": { "catalog_side_pruning": false } }"#)
            .unwrap();

    assert!(!config.partition_pruning.catalog_side_pruning);
    assert_eq!(config.partition_pruning.session_time_zone, "UTC");
    assert_eq!(config.optimizer, OptimizerSettings::default());
}

#[test]
fn test_invalid_json_is_an_error() {
    let err = QuarryConfig::from_json_str("{ not json").unwrap_err();
    assert!(matches!(err, QuarryError::SerdeJsonError(_)));
}

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{ "optimizer": {{ "max_iterations": 3 }}, "partition_pruning": {{ "session_time_zone": "+09:00" }} }}"#
    )
    .unwrap();

    let config = QuarryConfig::from_file(file.path()).unwrap();
    assert_eq!(config.optimizer.max_iterations, 3);
    assert_eq!(config.partition_pruning.session_time_zone, "+09:00");
    assert!(config.partition_pruning.catalog_side_pruning);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = QuarryConfig::from_file(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, QuarryError::IoError(_)));
}
